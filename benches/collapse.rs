//! Benchmarks for the rule collapser and the glob matching it feeds.
//!
//! The synthetic tree mimics a large C++ project: a few hundred module
//! directories, each listed in the legacy file with the same extensions.

use std::path::Path;

use borsch_organizer::path::PatternSet;
use borsch_organizer::patterns::legacy_include_patterns;
use borsch_organizer::phases::collapse::{collapse_rules, promote_containers};
use borsch_organizer::phases::DirTree;
use borsch_organizer::rule::{Rule, RuleMap};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// `src/libN/moduleM` directories, each holding `.cpp` and `.h` files.
fn create_upstream_tree(libs: usize, modules: usize) -> DirTree {
    let mut tree = DirTree::new();
    for lib in 0..libs {
        for module in 0..modules {
            let dir = format!("src/lib{lib}/module{module}");
            tree.insert_file(Path::new(&format!("{dir}/impl.cpp")));
            tree.insert_file(Path::new(&format!("{dir}/api.h")));
        }
    }
    tree
}

/// One rule per leaf directory, as a legacy file would list them.
fn create_leaf_rules(tree: &DirTree) -> RuleMap {
    tree.dirs()
        .filter(|dir| tree.has_files(dir))
        .map(|dir| {
            let rule = Rule::new(&dir.to_string_lossy()).with_include(["*.cpp", "*.h"]);
            (rule.source_path(), rule)
        })
        .collect()
}

fn bench_collapse(c: &mut Criterion) {
    let mut group = c.benchmark_group("collapse");

    for (libs, modules) in [(5, 10), (20, 25)] {
        let tree = create_upstream_tree(libs, modules);
        let rules = create_leaf_rules(&tree);

        group.bench_function(format!("promote_{}x{}", libs, modules), |b| {
            b.iter(|| promote_containers(black_box(&rules), black_box(&tree)))
        });

        group.bench_function(format!("collapse_{}x{}", libs, modules), |b| {
            b.iter(|| collapse_rules(black_box(&rules), black_box(&tree)))
        });
    }

    group.finish();
}

fn bench_pattern_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("patterns");
    let include = PatternSet::new(&["**/*.cpp", "*.h"][..]).unwrap();
    let paths: Vec<String> = (0..200)
        .map(|i| {
            let ext = if i % 2 == 0 { "cpp" } else { "h" };
            format!("module{}/detail/file{}.{}", i % 20, i, ext)
        })
        .collect();

    group.bench_function("pattern_set_matches", |b| {
        b.iter(|| {
            paths
                .iter()
                .filter(|p| include.matches(Path::new(black_box(p.as_str()))))
                .count()
        })
    });

    group.bench_function("legacy_include_patterns", |b| {
        b.iter(|| legacy_include_patterns(black_box("cpp,h,hpp,ui,qrc,file[1-20].txt")).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_collapse, bench_pattern_matching);
criterion_main!(benches);

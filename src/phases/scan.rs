//! Phase 1: Tree Scanning
//!
//! Builds a [`DirTree`] snapshot of one root: every directory keyed by its
//! relative path, with its immediate child directories and the names of the
//! files it directly contains. The root is always present as `"."`.
//!
//! Version-control metadata and the build-output directory at the top of the
//! root are skipped together with everything below them.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use log::{debug, warn};
use walkdir::WalkDir;

use crate::defaults::IGNORED_DIRS;
use crate::error::{Error, Result};
use crate::path::{parent_of, to_posix, ROOT};

/// Directory structure of one tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirTree {
    children: BTreeMap<PathBuf, BTreeSet<PathBuf>>,
    files: BTreeMap<PathBuf, BTreeSet<String>>,
}

impl Default for DirTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DirTree {
    /// A tree holding only the root.
    pub fn new() -> Self {
        let mut children = BTreeMap::new();
        children.insert(PathBuf::from(ROOT), BTreeSet::new());
        Self {
            children,
            files: BTreeMap::new(),
        }
    }

    /// Build a tree from `/`-separated directory paths.
    pub fn from_dirs<I, S>(dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tree = Self::new();
        for dir in dirs {
            tree.insert_dir(Path::new(&crate::path::normalize(dir.as_ref())));
        }
        tree
    }

    /// Register a directory and all of its ancestors.
    pub fn insert_dir(&mut self, rel: &Path) {
        let rel = PathBuf::from(to_posix(rel));
        if self.children.contains_key(&rel) {
            return;
        }
        self.children.insert(rel.clone(), BTreeSet::new());
        let parent = parent_of(&rel);
        self.insert_dir(&parent);
        if let Some(siblings) = self.children.get_mut(&parent) {
            siblings.insert(rel);
        }
    }

    /// Register a file, creating its directory if needed.
    pub fn insert_file(&mut self, rel: &Path) {
        let Some(name) = rel.file_name() else {
            return;
        };
        let dir = parent_of(rel);
        self.insert_dir(&dir);
        self.files
            .entry(PathBuf::from(to_posix(&dir)))
            .or_default()
            .insert(name.to_string_lossy().into_owned());
    }

    pub fn contains(&self, rel: &Path) -> bool {
        self.children.contains_key(rel)
    }

    /// All directories in path order, starting with the root.
    pub fn dirs(&self) -> impl Iterator<Item = &PathBuf> {
        self.children.keys()
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Immediate subdirectories of `rel`.
    pub fn children(&self, rel: &Path) -> impl Iterator<Item = &PathBuf> {
        self.children.get(rel).into_iter().flatten()
    }

    /// Every directory below `rel`, at any depth.
    pub fn descendants(&self, rel: &Path) -> BTreeSet<PathBuf> {
        descendants_in(&self.children, rel)
    }

    /// Names of the files directly inside `rel`.
    pub fn files(&self, rel: &Path) -> impl Iterator<Item = &String> {
        self.files.get(rel).into_iter().flatten()
    }

    pub fn has_files(&self, rel: &Path) -> bool {
        self.files.get(rel).is_some_and(|names| !names.is_empty())
    }

    /// Lower-cased extensions of the files directly inside `rel`.
    pub fn extensions(&self, rel: &Path) -> BTreeSet<String> {
        self.files(rel)
            .filter_map(|name| Path::new(name).extension())
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect()
    }
}

/// Transitive closure of `rel`'s children in a parent → children map.
pub fn descendants_in(
    map: &BTreeMap<PathBuf, BTreeSet<PathBuf>>,
    rel: &Path,
) -> BTreeSet<PathBuf> {
    let mut result = BTreeSet::new();
    let mut stack = vec![rel.to_path_buf()];
    while let Some(current) = stack.pop() {
        if let Some(children) = map.get(&current) {
            for child in children {
                if result.insert(child.clone()) {
                    stack.push(child.clone());
                }
            }
        }
    }
    result
}

/// Execute Phase 1: snapshot the directory structure under `root`.
pub fn execute(root: &Path) -> Result<DirTree> {
    if !root.is_dir() {
        return Err(Error::Filesystem {
            message: format!("Root directory '{}' does not exist", root.display()),
        });
    }

    let mut tree = DirTree::new();
    let walker = WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| {
            !(entry.depth() == 1
                && entry.file_type().is_dir()
                && IGNORED_DIRS
                    .iter()
                    .any(|ignored| entry.file_name() == *ignored))
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                continue;
            }
        };
        let Ok(rel) = entry.path().strip_prefix(root) else {
            continue;
        };
        if entry.file_type().is_dir() || entry.path().is_dir() {
            tree.insert_dir(rel);
        } else if entry.path().is_file() {
            tree.insert_file(rel);
        }
    }

    debug!("Scanned {} directories under {}", tree.len(), root.display());
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, rel).unwrap();
    }

    #[test]
    fn test_scan_registers_root_for_empty_tree() {
        let temp_dir = TempDir::new().unwrap();
        let tree = execute(temp_dir.path()).unwrap();
        assert_eq!(tree.len(), 1);
        assert!(tree.contains(Path::new(".")));
        assert_eq!(tree.children(Path::new(".")).count(), 0);
    }

    #[test]
    fn test_scan_builds_child_sets() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "src/a/x.cpp");
        touch(temp_dir.path(), "src/b/x.cpp");
        fs::create_dir_all(temp_dir.path().join("docs/empty")).unwrap();

        let tree = execute(temp_dir.path()).unwrap();
        let root_children: Vec<_> = tree.children(Path::new(".")).cloned().collect();
        assert_eq!(root_children, vec![PathBuf::from("docs"), PathBuf::from("src")]);

        let src_children: Vec<_> = tree.children(Path::new("src")).cloned().collect();
        assert_eq!(src_children, vec![PathBuf::from("src/a"), PathBuf::from("src/b")]);

        assert!(tree.contains(Path::new("docs/empty")));
        assert_eq!(tree.children(Path::new("docs/empty")).count(), 0);
        assert!(tree.has_files(Path::new("src/a")));
        assert!(!tree.has_files(Path::new("src")));
    }

    #[test]
    fn test_scan_skips_vcs_and_build_dirs() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), ".git/objects/ab/cdef");
        touch(temp_dir.path(), "build/out/lib.o");
        touch(temp_dir.path(), "src/build/gen.h");

        let tree = execute(temp_dir.path()).unwrap();
        assert!(!tree.contains(Path::new(".git")));
        assert!(!tree.contains(Path::new(".git/objects")));
        assert!(!tree.contains(Path::new("build")));
        assert!(!tree.contains(Path::new("build/out")));
        assert!(tree.contains(Path::new("src/build")));
    }

    #[test]
    fn test_scan_missing_root() {
        assert!(execute(Path::new("/nonexistent/organizer/root")).is_err());
    }

    #[test]
    fn test_extensions_are_lowercased() {
        let mut tree = DirTree::new();
        tree.insert_file(Path::new("src/Main.CPP"));
        tree.insert_file(Path::new("src/util.h"));
        tree.insert_file(Path::new("src/Makefile"));
        let exts: Vec<_> = tree.extensions(Path::new("src")).into_iter().collect();
        assert_eq!(exts, vec!["cpp", "h"]);
        assert_eq!(tree.files(Path::new("src")).count(), 3);
    }

    #[test]
    fn test_descendants() {
        let tree = DirTree::from_dirs(["src/a/deep", "src/b", "docs"]);
        let nested = tree.descendants(Path::new("src"));
        let expected: BTreeSet<PathBuf> = ["src/a", "src/a/deep", "src/b"]
            .iter()
            .map(PathBuf::from)
            .collect();
        assert_eq!(nested, expected);
        assert!(tree.descendants(Path::new("docs")).is_empty());
    }
}

//! Property-based tests for pattern and path helpers.
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold for all possible inputs.

#[cfg(test)]
mod proptest_tests {
    use crate::path::{normalize, relative_to, to_posix, PatternSet};
    use crate::patterns::{expand_braced_range, legacy_include_patterns};
    use proptest::prelude::*;
    use std::path::Path;

    // ============================================================================
    // expand_braced_range property tests
    // ============================================================================

    proptest! {
        /// Property: a range expands to exactly finish - start + 1 tokens
        #[test]
        fn expand_braced_range_is_inclusive(
            prefix in "[a-z_]{0,8}",
            start in 0u64..50,
            len in 0u64..20,
            suffix in "(\\.[a-z]{1,4})?",
        ) {
            let finish = start + len;
            let token = format!("{prefix}[{start}-{finish}]{suffix}");
            let expanded = expand_braced_range(&token).unwrap();

            prop_assert_eq!(expanded.len() as u64, len + 1);
            prop_assert_eq!(&expanded[0], &format!("{prefix}{start}{suffix}"));
            prop_assert_eq!(expanded.last().unwrap(), &format!("{prefix}{finish}{suffix}"));
        }

        /// Property: a reversed range is always rejected
        #[test]
        fn expand_braced_range_rejects_reversed_bounds(start in 1u64..100, gap in 1u64..100) {
            let token = format!("f[{}-{}]", start + gap, start);
            prop_assert!(expand_braced_range(&token).is_err());
        }

        /// Property: tokens without brackets pass through unchanged
        #[test]
        fn expand_braced_range_passes_plain_tokens(token in "[a-zA-Z0-9._-]{1,20}") {
            prop_assert_eq!(expand_braced_range(&token).unwrap(), vec![token]);
        }
    }

    // ============================================================================
    // legacy_include_patterns property tests
    // ============================================================================

    proptest! {
        /// Property: converted include lists are sorted and free of duplicates
        #[test]
        fn legacy_include_patterns_sorted_and_unique(
            tokens in prop::collection::vec(
                prop::sample::select(vec!["h", "cpp", ".ui", "CMakeLists.txt", "README.md", "c"]),
                1..8,
            )
        ) {
            let patterns = legacy_include_patterns(&tokens.join(",")).unwrap();
            let mut expected = patterns.include.clone();
            expected.sort();
            expected.dedup();
            prop_assert_eq!(patterns.include, expected);
        }
    }

    // ============================================================================
    // normalize / relative path property tests
    // ============================================================================

    proptest! {
        /// Property: normalize is idempotent
        #[test]
        fn normalize_is_idempotent(input in "[a-z./\\\\]{0,24}") {
            let once = normalize(&input);
            prop_assert_eq!(normalize(&once), once.clone());
        }

        /// Property: normalized paths never carry empty, `.` or trailing segments
        #[test]
        fn normalize_has_no_empty_segments(input in "[a-z./]{0,24}") {
            let result = normalize(&input);
            if result != "." {
                for segment in result.split('/') {
                    prop_assert!(!segment.is_empty());
                    prop_assert_ne!(segment, ".");
                }
            }
        }

        /// Property: a child joined under a base is found again relative to it
        #[test]
        fn relative_to_inverts_join(
            base in "[a-z]{1,6}(/[a-z]{1,6}){0,2}",
            child in "[a-z]{1,6}(/[a-z]{1,6}){0,2}",
        ) {
            let joined = Path::new(&base).join(&child);
            let rel = relative_to(&joined, Path::new(&base)).unwrap();
            prop_assert_eq!(to_posix(&rel), child);
        }

        /// Property: `**/` prefixed patterns match at any depth
        #[test]
        fn recursive_glob_matches_any_depth(
            dirs in prop::collection::vec("[a-z]{1,6}", 0..4),
            stem in "[a-z]{1,8}",
        ) {
            let mut path = dirs.join("/");
            if !path.is_empty() {
                path.push('/');
            }
            path.push_str(&format!("{stem}.cpp"));
            let set = PatternSet::new(&["**/*.cpp"]).unwrap();
            prop_assert!(set.matches(Path::new(&path)));
        }
    }
}

// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Canonical remote paths
//!
//! A canonical path is either `""` (the root) or starts with a single `/`,
//! uses `/` separators and has no trailing separator. Case is preserved;
//! comparisons against the remote store are case-insensitive, so caches key
//! on [`cache_key`].

/// Marker the host uses for wildcard patterns
pub const WILDCARD: char = '*';

/// Canonicalize an arbitrary user path into the remote store's grammar
///
/// Leading and trailing `\` and `/` are stripped, remaining backslashes become
/// forward slashes, and the result gets a single leading `/`. An empty result
/// denotes the root.
#[must_use]
pub fn normalize<S: AsRef<str>>(path: S) -> String {
    let trimmed = path.as_ref().trim_matches(|c| c == '\\' || c == '/');
    if trimmed.is_empty() {
        return String::new();
    }
    format!("/{}", trimmed.replace('\\', "/"))
}

/// True for the canonical root path
#[must_use]
pub fn is_root(path: &str) -> bool {
    path.is_empty()
}

/// Split a canonical path at its last separator into `(parent, leaf)`
///
/// `"/a/b"` gives `("/a", "b")`, `"/a"` gives `("", "a")`, and the root gives
/// `("", "")`. A path without any separator is all leaf.
#[must_use]
pub fn split_path(path: &str) -> (&str, &str) {
    match path.rfind('/') {
        Some(idx) => (&path[..idx], &path[idx + 1..]),
        None => ("", path),
    }
}

/// Join a canonical parent with a leaf name
#[must_use]
pub fn join(parent: &str, name: &str) -> String {
    format!("{parent}/{name}")
}

/// Key used for case-insensitive lookups
#[must_use]
pub fn cache_key(path: &str) -> String {
    path.to_lowercase()
}

/// Characters a path may never contain
fn is_reserved(c: char) -> bool {
    c.is_control() || matches!(c, '"' | '<' | '>' | '|')
}

/// A path is valid iff it is non-empty and free of reserved characters
///
/// This is independent of [`normalize`]; it is applied to raw host input as
/// well as to canonical mutation targets.
#[must_use]
pub fn is_valid_path(path: &str) -> bool {
    !path.is_empty() && !path.chars().any(is_reserved)
}

/// True when the leaf of the path is a wildcard pattern
#[must_use]
pub fn has_wildcard(path: &str) -> bool {
    split_path(path).1.contains(WILDCARD)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_separators() {
        assert_eq!(normalize("\\foo\\bar"), "/foo/bar");
        assert_eq!(normalize("/foo/bar"), "/foo/bar");
        assert_eq!(normalize("foo/bar"), "/foo/bar");
        assert_eq!(normalize("foo\\bar/baz"), "/foo/bar/baz");
    }

    #[test]
    fn test_normalize_root() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("/"), "");
        assert_eq!(normalize("\\"), "");
        assert_eq!(normalize("//\\\\"), "");
    }

    #[test]
    fn test_normalize_strips_trailing_separator() {
        assert_eq!(normalize("/dir/"), "/dir");
        assert_eq!(normalize("\\dir\\sub\\"), "/dir/sub");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for raw in [
            "",
            "/",
            "a",
            "\\\\a\\b",
            "/A/B.txt/",
            "mixed/sep\\arators",
            "/dir/*.txt",
        ] {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once, "input {raw:?}");
        }
    }

    #[test]
    fn test_normalize_preserves_case() {
        assert_eq!(normalize("\\Work\\Report.PDF"), "/Work/Report.PDF");
    }

    #[test]
    fn test_split_path() {
        assert_eq!(split_path("/a/b/c.txt"), ("/a/b", "c.txt"));
        assert_eq!(split_path("/a"), ("", "a"));
        assert_eq!(split_path("leaf"), ("", "leaf"));
        assert_eq!(split_path(""), ("", ""));
    }

    #[test]
    fn test_join_and_split_agree() {
        let joined = join("/dir", "x.txt");
        assert_eq!(joined, "/dir/x.txt");
        assert_eq!(split_path(&joined), ("/dir", "x.txt"));
        assert_eq!(join("", "top"), "/top");
    }

    #[test]
    fn test_is_valid_path() {
        assert!(is_valid_path("Test\\Test.txt"));
        assert!(is_valid_path("Test/Test.txt"));
        assert!(is_valid_path("\\Test\\Test.txt"));
        assert!(is_valid_path("/Test/Test.txt"));

        assert!(!is_valid_path(""));
        assert!(!is_valid_path("te\"st.txt"));
        assert!(!is_valid_path("a|b"));
        assert!(!is_valid_path("nul\0byte"));
        assert!(!is_valid_path("te\u{1}st\\test.txt"));
    }

    #[test]
    fn test_has_wildcard() {
        assert!(has_wildcard("/dir/*.txt"));
        assert!(!has_wildcard("/dir*/file.txt"));
        assert!(!has_wildcard("/dir/file.txt"));
    }

    #[test]
    fn test_cache_key_folds_case() {
        assert_eq!(cache_key("/Dir/File.TXT"), cache_key("/dir/file.txt"));
    }
}

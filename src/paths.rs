//! Path classification and test-path mapping.
//!
//! Pure string predicates shared by discovery, coverage, and git-change
//! filtering. Every component that needs to know whether a path is source or
//! test code goes through these functions; the predicate is never reimplemented
//! elsewhere.

use std::path::{Path, PathBuf};

use crate::types::SOURCE_EXTENSIONS;

/// Error type for path transformations
#[derive(Debug)]
pub enum PathError {
    /// Empty or otherwise unusable input to a pure function
    InvalidArgument(String),
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
        }
    }
}

impl std::error::Error for PathError {}

/// Split off a recognized source extension, returning `(stem, ext)`.
fn split_source_extension(path: &str) -> Option<(&str, &'static str)> {
    SOURCE_EXTENSIONS.iter().find_map(|ext| {
        path.strip_suffix(ext)
            .and_then(|rest| rest.strip_suffix('.'))
            .map(|stem| (stem, *ext))
    })
}

/// True iff the path's final component ends in `.test.<ext>` or `.spec.<ext>`
/// for a recognized source extension. Empty input returns `false`, never errors.
pub fn is_test_file(path: &str) -> bool {
    if path.is_empty() {
        return false;
    }
    let name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    match split_source_extension(name) {
        Some((stem, _)) => stem.ends_with(".test") || stem.ends_with(".spec"),
        None => false,
    }
}

/// True iff the path has a recognized source extension and is not a test file.
/// Empty input returns `false`.
pub fn is_source_file(path: &str) -> bool {
    if path.is_empty() {
        return false;
    }
    split_source_extension(path).is_some() && !is_test_file(path)
}

/// Map a source file to its expected test file path under `test_dir`.
///
/// The source's directory structure is preserved beneath the test directory and
/// the original extension is kept in the generated `.test.<ext>` name:
/// `src/components/Button.tsx` maps to `__tests__/src/components/Button.test.tsx`.
/// A path without a recognized extension falls back to `.test.js`.
pub fn test_file_path(source_file: &str, test_dir: &str) -> Result<String, PathError> {
    if source_file.is_empty() {
        return Err(PathError::InvalidArgument(
            "source file path is empty".to_string(),
        ));
    }
    let relative = source_file.strip_prefix("./").unwrap_or(source_file);
    let (stem, ext) = split_source_extension(relative).unwrap_or((relative, "js"));
    Ok(format!("{}/{}.test.{}", test_dir, stem, ext))
}

/// Resolve a possibly-relative path against the current working directory.
/// Already-absolute paths pass through unchanged.
pub fn resolve_file_path(path: &str) -> Result<String, PathError> {
    if path.is_empty() {
        return Err(PathError::InvalidArgument("file path is empty".to_string()));
    }
    if Path::new(path).is_absolute() {
        return Ok(path.to_string());
    }
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    Ok(cwd.join(path).display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_suffixes_are_recognized() {
        assert!(is_test_file("foo.test.js"));
        assert!(is_test_file("foo.spec.ts"));
        assert!(is_test_file("src/components/Button.test.tsx"));
        assert!(is_test_file("deep/nested/util.spec.jsx"));
    }

    #[test]
    fn non_test_paths_are_rejected() {
        assert!(!is_test_file("index.js"));
        assert!(!is_test_file("file.txt"));
        assert!(!is_test_file("file.test"));
        assert!(!is_test_file("testfile.js"));
        assert!(!is_test_file(""));
    }

    #[test]
    fn test_suffix_is_case_sensitive() {
        assert!(!is_test_file("foo.TEST.js"));
        assert!(!is_test_file("foo.Spec.ts"));
    }

    #[test]
    fn source_files_exclude_tests() {
        assert!(is_source_file("index.js"));
        assert!(is_source_file("src/app.ts"));
        assert!(is_source_file("src/Button.tsx"));
        assert!(is_source_file("widget.jsx"));
        assert!(!is_source_file("index.test.js"));
        assert!(!is_source_file("index.spec.tsx"));
        assert!(!is_source_file("readme.md"));
        assert!(!is_source_file(""));
    }

    #[test]
    fn test_path_preserves_structure_and_extension() {
        assert_eq!(
            test_file_path("src/index.js", "__tests__").unwrap(),
            "__tests__/src/index.test.js"
        );
        assert_eq!(
            test_file_path("src/components/Button.tsx", "__tests__").unwrap(),
            "__tests__/src/components/Button.test.tsx"
        );
        assert_eq!(
            test_file_path("index.ts", "test").unwrap(),
            "test/index.test.ts"
        );
    }

    #[test]
    fn test_path_strips_leading_dot_segment() {
        assert_eq!(
            test_file_path("./index.js", "__tests__").unwrap(),
            "__tests__/index.test.js"
        );
    }

    #[test]
    fn test_path_without_extension_defaults_to_js() {
        assert_eq!(
            test_file_path("src/index", "__tests__").unwrap(),
            "__tests__/src/index.test.js"
        );
    }

    #[test]
    fn test_path_rejects_empty_source() {
        assert!(matches!(
            test_file_path("", "__tests__"),
            Err(PathError::InvalidArgument(_))
        ));
    }

    #[test]
    fn resolve_passes_absolute_through() {
        let abs = if cfg!(windows) { "C:\\tmp\\a.ts" } else { "/tmp/a.ts" };
        assert_eq!(resolve_file_path(abs).unwrap(), abs);
    }

    #[test]
    fn resolve_joins_relative_against_cwd() {
        let resolved = resolve_file_path("a.ts").unwrap();
        assert!(resolved.ends_with("a.ts"));
        assert!(Path::new(&resolved).is_absolute());
    }

    #[test]
    fn resolve_rejects_empty() {
        assert!(matches!(
            resolve_file_path(""),
            Err(PathError::InvalidArgument(_))
        ));
    }
}

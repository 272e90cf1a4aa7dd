//! Source and test file discovery.
//!
//! Recursively enumerates a project tree, applying the built-in directory
//! exclusions (`node_modules`, `dist`, `build`, `coverage`, hidden VCS dirs)
//! plus user-supplied exclude globs, then classifies each file through
//! [`crate::paths`] so discovery never disagrees with coverage or git-change
//! filtering about what counts as source code.

use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::paths::is_source_file;

/// Directories skipped during the walk, regardless of configured globs.
pub const EXCLUDED_DIRS: [&str; 4] = ["node_modules", "dist", "build", "coverage"];

/// Error type for directory walks
#[derive(Debug)]
pub enum DiscoveryError {
    /// Root directory is missing or not a directory
    InvalidRoot(PathBuf),
    /// Walk failed partway (permissions, IO)
    WalkFailed { root: PathBuf, message: String },
}

impl std::fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiscoveryError::InvalidRoot(path) => {
                write!(f, "not a directory: {}", path.display())
            }
            DiscoveryError::WalkFailed { root, message } => {
                write!(f, "failed to walk {}: {}", root.display(), message)
            }
        }
    }
}

impl std::error::Error for DiscoveryError {}

/// Result of discovering a project tree.
///
/// Invariant: no path appears in both lists.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DiscoveredFiles {
    pub source_files: Vec<String>,
    pub test_files: Vec<String>,
}

/// Build a globset from user patterns, warning on invalid globs.
pub fn build_globset(patterns: &[String]) -> Option<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    let mut added = false;
    for pat in patterns {
        if pat.trim().is_empty() {
            continue;
        }
        match Glob::new(pat) {
            Ok(glob) => {
                builder.add(glob);
                added = true;
            }
            Err(err) => eprintln!("[testgenie][warn] invalid glob '{}': {}", pat, err),
        }
    }
    if !added { None } else { builder.build().ok() }
}

/// True when the path matches the test-file placement convention: under a
/// `__tests__/` directory, or named `*.test.*` / `*.spec.*`.
fn matches_test_convention(relative: &str) -> bool {
    if relative.split('/').any(|component| component == "__tests__") {
        return true;
    }
    let name = relative.rsplit('/').next().unwrap_or(relative);
    name.contains(".test.") || name.contains(".spec.")
}

fn is_excluded_dir(name: &str) -> bool {
    name.starts_with('.') || EXCLUDED_DIRS.contains(&name)
}

/// Walk the tree under `root`, returning root-relative paths with `/` separators.
fn walk_files(root: &Path, exclude: &[String]) -> Result<Vec<String>, DiscoveryError> {
    if !root.is_dir() {
        return Err(DiscoveryError::InvalidRoot(root.to_path_buf()));
    }
    let exclude_set = build_globset(exclude);

    let mut files = Vec::new();
    let walker = WalkDir::new(root).into_iter().filter_entry(|entry| {
        // Never filter the root itself, even when the scan root is hidden.
        if entry.depth() == 0 {
            return true;
        }
        let name = entry.file_name().to_string_lossy();
        if entry.file_type().is_dir() {
            !is_excluded_dir(&name)
        } else {
            !name.starts_with('.')
        }
    });

    for entry in walker {
        let entry = entry.map_err(|e| DiscoveryError::WalkFailed {
            root: root.to_path_buf(),
            message: e.to_string(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(root)
            .unwrap_or(entry.path())
            .to_string_lossy()
            .replace('\\', "/");
        if let Some(set) = &exclude_set
            && set.is_match(&relative)
        {
            continue;
        }
        files.push(relative);
    }

    files.sort();
    Ok(files)
}

/// Find production source files under `root`.
///
/// The classifier predicate is authoritative over the walk: a file that matches
/// the test naming or placement convention is never returned here, even when a
/// configured glob would include it.
pub fn find_source_files(root: &Path, exclude: &[String]) -> Result<Vec<String>, DiscoveryError> {
    let files = walk_files(root, exclude)?;
    Ok(files
        .into_iter()
        .filter(|p| is_source_file(p) && !matches_test_convention(p))
        .collect())
}

/// Find existing test files under `root`: anything beneath a `__tests__/`
/// directory or matching `*.test.*` / `*.spec.*` anywhere in the tree.
pub fn find_test_files(root: &Path, exclude: &[String]) -> Result<Vec<String>, DiscoveryError> {
    let files = walk_files(root, exclude)?;
    Ok(files
        .into_iter()
        .filter(|p| matches_test_convention(p))
        .collect())
}

/// Run both discoveries over one tree. An empty directory yields two empty
/// lists, not an error.
pub fn discover_files(root: &Path, exclude: &[String]) -> Result<DiscoveredFiles, DiscoveryError> {
    let files = walk_files(root, exclude)?;
    let mut discovered = DiscoveredFiles::default();
    for path in files {
        if matches_test_convention(&path) {
            discovered.test_files.push(path);
        } else if is_source_file(&path) {
            discovered.source_files.push(path);
        }
    }
    Ok(discovered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fixture_tree() -> TempDir {
        let tmp = TempDir::new().expect("tmp dir");
        let root = tmp.path();
        std::fs::create_dir_all(root.join("src/components")).expect("mkdir src");
        std::fs::create_dir_all(root.join("__tests__/src")).expect("mkdir tests");
        std::fs::create_dir_all(root.join("node_modules/pkg")).expect("mkdir node_modules");
        std::fs::write(root.join("src/index.ts"), "export const a = 1;").expect("write");
        std::fs::write(root.join("src/components/Button.tsx"), "export {}").expect("write");
        std::fs::write(root.join("src/util.test.ts"), "test('x', () => {});").expect("write");
        std::fs::write(root.join("__tests__/src/index.test.ts"), "test()").expect("write");
        std::fs::write(root.join("__tests__/src/helper.ts"), "export {}").expect("write");
        std::fs::write(root.join("node_modules/pkg/index.js"), "module.exports = {}")
            .expect("write");
        std::fs::write(root.join("README.md"), "# readme").expect("write");
        tmp
    }

    #[test]
    fn source_discovery_skips_tests_and_node_modules() {
        let tmp = fixture_tree();
        let sources = find_source_files(tmp.path(), &[]).expect("discover");
        assert_eq!(
            sources,
            vec![
                "src/components/Button.tsx".to_string(),
                "src/index.ts".to_string(),
            ]
        );
    }

    #[test]
    fn test_discovery_finds_suffixes_and_tests_dir() {
        let tmp = fixture_tree();
        let tests = find_test_files(tmp.path(), &[]).expect("discover");
        assert!(tests.contains(&"src/util.test.ts".to_string()));
        assert!(tests.contains(&"__tests__/src/index.test.ts".to_string()));
        // Plain helper under __tests__/ counts as test placement, not source.
        assert!(tests.contains(&"__tests__/src/helper.ts".to_string()));
    }

    #[test]
    fn discover_files_keeps_lists_disjoint() {
        let tmp = fixture_tree();
        let discovered = discover_files(tmp.path(), &[]).expect("discover");
        for test in &discovered.test_files {
            assert!(
                !discovered.source_files.contains(test),
                "{} appears in both lists",
                test
            );
        }
    }

    #[test]
    fn exclude_globs_are_applied() {
        let tmp = fixture_tree();
        let sources =
            find_source_files(tmp.path(), &["src/components/**".to_string()]).expect("discover");
        assert_eq!(sources, vec!["src/index.ts".to_string()]);
    }

    #[test]
    fn empty_directory_yields_empty_lists() {
        let tmp = TempDir::new().expect("tmp dir");
        let discovered = discover_files(tmp.path(), &[]).expect("discover");
        assert!(discovered.source_files.is_empty());
        assert!(discovered.test_files.is_empty());
    }

    #[test]
    fn missing_root_is_an_error() {
        let tmp = TempDir::new().expect("tmp dir");
        let missing = tmp.path().join("nope");
        assert!(matches!(
            discover_files(&missing, &[]),
            Err(DiscoveryError::InvalidRoot(_))
        ));
    }
}

//! Test coverage resolution.
//!
//! Cross-references discovered source files against discovered test files to
//! compute which source files have no corresponding test. Matching is by
//! bidirectional substring containment against the expected test path, which
//! deliberately tolerates prefix and separator differences between discovery
//! output and the naming convention.

use serde::{Deserialize, Serialize};

use crate::paths::{PathError, test_file_path};

/// Which source files have tests, which do not, and the resulting percentage.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CoverageReport {
    pub untested: Vec<String>,
    pub tested: Vec<String>,
    pub coverage_percent: f32,
}

fn has_matching_test(expected: &str, test_files: &[String]) -> bool {
    test_files
        .iter()
        .any(|test| test.contains(expected) || expected.contains(test.as_str()))
}

/// Partition `source_files` into tested and untested sets.
///
/// A source file counts as tested when some discovered test file path contains
/// its expected test path (per the naming convention under `test_dir`) as a
/// substring, or vice versa. Zero source files yields 0.0 percent, not an error.
pub fn resolve_coverage(
    source_files: &[String],
    test_files: &[String],
    test_dir: &str,
) -> Result<CoverageReport, PathError> {
    let mut report = CoverageReport::default();

    for source in source_files {
        let expected = test_file_path(source, test_dir)?;
        if has_matching_test(&expected, test_files) {
            report.tested.push(source.clone());
        } else {
            report.untested.push(source.clone());
        }
    }

    let total = source_files.len();
    if total > 0 {
        let percent = report.tested.len() as f32 / total as f32 * 100.0;
        report.coverage_percent = (percent * 10.0).round() / 10.0;
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn partitions_sources_and_rounds_percentage() {
        let sources = strings(&["src/index.ts", "src/api.ts", "src/util.ts"]);
        let tests = strings(&[
            "__tests__/src/index.test.ts",
            "__tests__/src/api.test.ts",
        ]);

        let report = resolve_coverage(&sources, &tests, "__tests__").unwrap();
        assert_eq!(report.tested, strings(&["src/index.ts", "src/api.ts"]));
        assert_eq!(report.untested, strings(&["src/util.ts"]));
        assert_eq!(report.coverage_percent, 66.7);
    }

    #[test]
    fn empty_source_set_is_zero_percent() {
        let report = resolve_coverage(&[], &strings(&["__tests__/a.test.js"]), "__tests__")
            .unwrap();
        assert!(report.tested.is_empty());
        assert!(report.untested.is_empty());
        assert_eq!(report.coverage_percent, 0.0);
    }

    #[test]
    fn no_tests_means_everything_untested() {
        let sources = strings(&["src/a.ts", "src/b.ts"]);
        let report = resolve_coverage(&sources, &[], "__tests__").unwrap();
        assert_eq!(report.untested.len(), 2);
        assert_eq!(report.coverage_percent, 0.0);
    }

    #[test]
    fn matching_is_bidirectional() {
        // Discovery may report a test path without the test-dir prefix; the
        // expected path containing it still counts as a match.
        let sources = strings(&["src/index.js"]);
        let tests = strings(&["src/index.test.js"]);
        let report = resolve_coverage(&sources, &tests, "__tests__").unwrap();
        assert_eq!(report.tested, sources);
        assert_eq!(report.coverage_percent, 100.0);
    }

    #[test]
    fn extension_is_respected_in_expectation() {
        let sources = strings(&["src/Button.tsx"]);
        let tests = strings(&["__tests__/src/Button.test.tsx"]);
        let report = resolve_coverage(&sources, &tests, "__tests__").unwrap();
        assert_eq!(report.tested, sources);
    }
}

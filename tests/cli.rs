//! End-to-end CLI tests for testgenie.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn testgenie() -> Command {
    cargo_bin_cmd!("testgenie")
}

/// Project with two source files, one of which has a test.
fn fixture_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    std::fs::create_dir_all(root.join("src")).unwrap();
    std::fs::create_dir_all(root.join("__tests__/src")).unwrap();
    std::fs::write(
        root.join("src/covered.ts"),
        "export function covered() { return 1; }\n",
    )
    .unwrap();
    std::fs::write(
        root.join("src/orphan.ts"),
        "export async function orphan(a, b) { return a + b; }\n",
    )
    .unwrap();
    std::fs::write(
        root.join("__tests__/src/covered.test.ts"),
        "test('covered', () => {});\n",
    )
    .unwrap();
    tmp
}

fn git(path: &Path, args: &[&str]) {
    std::process::Command::new("git")
        .args(args)
        .current_dir(path)
        .output()
        .unwrap();
}

mod cli_basics {
    use super::*;

    #[test]
    fn shows_help() {
        testgenie()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("testgenie"))
            .stdout(predicate::str::contains("scan"))
            .stdout(predicate::str::contains("branch-info"));
    }

    #[test]
    fn shows_version() {
        testgenie()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn rejects_unknown_option() {
        testgenie()
            .arg("--frobnicate")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown option"));
    }

    #[test]
    fn rejects_missing_root() {
        testgenie()
            .args(["scan", "/nonexistent/project"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("not a directory"));
    }
}

mod scan_mode {
    use super::*;

    #[test]
    fn reports_untested_files() {
        let project = fixture_project();

        testgenie()
            .current_dir(project.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("src/orphan.ts"))
            .stdout(predicate::str::contains("Coverage: 50%"));
    }

    #[test]
    fn json_output_is_machine_readable() {
        let project = fixture_project();

        let output = testgenie()
            .args(["scan", "--json"])
            .current_dir(project.path())
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(report["mode"], "full");
        assert_eq!(report["total_source_files"], 2);
        assert_eq!(report["coverage_percent"], 50.0);
        let untested = report["untested"].as_array().unwrap();
        assert_eq!(untested.len(), 1);
        assert_eq!(untested[0]["file"], "src/orphan.ts");
        assert_eq!(
            untested[0]["expected_test"],
            "__tests__/src/orphan.test.ts"
        );
        let functions = untested[0]["functions"].as_array().unwrap();
        assert_eq!(functions[0]["name"], "orphan");
        assert_eq!(functions[0]["is_async"], true);
    }

    #[test]
    fn empty_project_scans_clean() {
        let tmp = TempDir::new().unwrap();

        testgenie()
            .current_dir(tmp.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("No files need tests"));
    }

    #[test]
    fn broken_file_is_a_warning_not_a_failure() {
        let project = fixture_project();
        std::fs::write(project.path().join("src/broken.ts"), "function oops( {\n").unwrap();

        testgenie()
            .current_dir(project.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("skipped src/broken.ts"));
    }
}

mod git_modes {
    use super::*;

    #[test]
    fn diff_outside_repo_fails_clearly() {
        let tmp = TempDir::new().unwrap();

        testgenie()
            .arg("--diff")
            .current_dir(tmp.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("not a git repository"));
    }

    #[test]
    fn diff_reports_changed_source_files() {
        let project = fixture_project();
        let root = project.path();
        git(root, &["init"]);
        git(root, &["config", "user.email", "test@test.com"]);
        git(root, &["config", "user.name", "Test User"]);
        git(root, &["add", "."]);
        git(root, &["commit", "-m", "Initial commit"]);
        std::fs::write(
            root.join("src/orphan.ts"),
            "export async function orphan(a, b, c) { return a; }\n",
        )
        .unwrap();

        testgenie()
            .args(["--diff", "--json"])
            .current_dir(root)
            .assert()
            .success()
            .stdout(predicate::str::contains("\"mode\": \"uncommitted\""))
            .stdout(predicate::str::contains("src/orphan.ts"));
    }

    #[test]
    fn diff_from_subdirectory_parses_changed_files() {
        let project = fixture_project();
        let root = project.path();
        git(root, &["init"]);
        git(root, &["config", "user.email", "test@test.com"]);
        git(root, &["config", "user.name", "Test User"]);
        git(root, &["add", "."]);
        git(root, &["commit", "-m", "Initial commit"]);
        std::fs::write(
            root.join("src/orphan.ts"),
            "export async function orphan(a, b, c) { return a; }\n",
        )
        .unwrap();

        // Invoked from src/, change paths still resolve against the repo root.
        testgenie()
            .args(["--diff", "--json"])
            .current_dir(root.join("src"))
            .assert()
            .success()
            .stdout(predicate::str::contains("\"name\": \"orphan\""))
            .stdout(predicate::str::contains("\"failures\": []"));
    }

    #[test]
    fn branch_info_shows_commits() {
        let project = fixture_project();
        let root = project.path();
        git(root, &["init"]);
        git(root, &["config", "user.email", "test@test.com"]);
        git(root, &["config", "user.name", "Test User"]);
        git(root, &["add", "."]);
        git(root, &["commit", "-m", "Initial commit"]);

        testgenie()
            .arg("branch-info")
            .current_dir(root)
            .assert()
            .success()
            .stdout(predicate::str::contains("Initial commit"));
    }
}

//! Scan orchestration: discovery or git changes, parsing, coverage, output.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use console::style;
use serde::Serialize;

use crate::args::ParsedArgs;
use crate::batch::{ParseFailure, parse_batch};
use crate::config::TestgenieConfig;
use crate::coverage::resolve_coverage;
use crate::discovery::discover_files;
use crate::git::{ChangeStatus, GitDiffInfo, GitFileChange, GitRepo};
use crate::paths::{is_source_file, test_file_path};
use crate::progress::{self, Spinner, format_count, format_duration};
use crate::types::{OutputMode, ParsedFunction};

#[derive(Clone, Debug, PartialEq, Eq)]
enum ScanMode {
    Full,
    Uncommitted,
    Staged,
    Since(String),
}

impl ScanMode {
    fn from_args(args: &ParsedArgs) -> Self {
        if args.diff {
            ScanMode::Uncommitted
        } else if args.staged {
            ScanMode::Staged
        } else if let Some(expr) = &args.since {
            ScanMode::Since(expr.clone())
        } else {
            ScanMode::Full
        }
    }

    fn label(&self) -> &'static str {
        match self {
            ScanMode::Full => "full",
            ScanMode::Uncommitted => "uncommitted",
            ScanMode::Staged => "staged",
            ScanMode::Since(_) => "since",
        }
    }
}

/// One source file needing attention, with its parsed function inventory.
#[derive(Debug, Serialize)]
pub struct FileReport {
    pub file: String,
    pub expected_test: String,
    pub functions: Vec<ParsedFunction>,
}

/// Full scan result, serialized as-is in `--json` mode.
#[derive(Debug, Serialize)]
pub struct ScanReport {
    pub root: String,
    pub mode: &'static str,
    pub test_dir: String,
    pub total_source_files: usize,
    pub total_test_files: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coverage_percent: Option<f32>,
    pub threshold: f32,
    pub untested: Vec<FileReport>,
    pub failures: Vec<ParseFailure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changes: Option<Vec<GitFileChange>>,
}

fn build_file_reports(
    root: &Path,
    files: &[String],
    test_dir: &str,
) -> Result<(Vec<FileReport>, Vec<ParseFailure>)> {
    let batch = parse_batch(root, files);
    let mut reports = Vec::with_capacity(files.len());
    for file in files {
        let functions = batch
            .parsed
            .iter()
            .find(|p| &p.file_path == file)
            .map(|p| p.functions.clone())
            .unwrap_or_default();
        reports.push(FileReport {
            expected_test: test_file_path(file, test_dir)
                .with_context(|| format!("cannot map {} to a test path", file))?,
            file: file.clone(),
            functions,
        });
    }
    Ok((reports, batch.failures))
}

/// Run a scan rooted at `root` according to the parsed arguments.
pub fn run_scan(root: &Path, args: &ParsedArgs) -> Result<()> {
    let started = Instant::now();
    let mode = ScanMode::from_args(args);
    let human = args.output == OutputMode::Human;

    let config = TestgenieConfig::load(root);
    let test_dir = args
        .test_dir
        .clone()
        .unwrap_or_else(|| config.test_dir.clone());
    let mut exclude = config.patterns.exclude.clone();
    exclude.extend(args.exclude.iter().cloned());

    let spinner = human.then(|| Spinner::new("Scanning project..."));

    let report = match &mode {
        ScanMode::Full => {
            let discovered = discover_files(root, &exclude).context("file discovery failed")?;
            let coverage =
                resolve_coverage(&discovered.source_files, &discovered.test_files, &test_dir)?;
            let (untested, failures) = build_file_reports(root, &coverage.untested, &test_dir)?;
            ScanReport {
                root: root.display().to_string(),
                mode: mode.label(),
                test_dir: test_dir.clone(),
                total_source_files: discovered.source_files.len(),
                total_test_files: discovered.test_files.len(),
                coverage_percent: Some(coverage.coverage_percent),
                threshold: config.coverage.threshold,
                untested,
                failures,
                changes: None,
            }
        }
        diff_mode => {
            let repo = GitRepo::discover(root)?;
            let info: GitDiffInfo = match diff_mode {
                ScanMode::Staged => repo.staged_diff()?,
                ScanMode::Since(expr) => repo.diff_since(expr)?,
                _ => repo.uncommitted_diff()?,
            };
            // Changed source files, skipping deletions (nothing left to parse).
            let candidates: Vec<String> = info
                .changes
                .iter()
                .filter(|c| c.status != ChangeStatus::Deleted && is_source_file(&c.file))
                .map(|c| c.file.clone())
                .collect();
            // Change paths are repository-root-relative, so parse them against
            // the repository root even when the scan starts in a subdirectory.
            let (untested, failures) = build_file_reports(repo.path(), &candidates, &test_dir)?;
            ScanReport {
                root: root.display().to_string(),
                mode: mode.label(),
                test_dir: test_dir.clone(),
                total_source_files: info.code_files,
                total_test_files: 0,
                coverage_percent: None,
                threshold: config.coverage.threshold,
                untested,
                failures,
                changes: Some(info.changes),
            }
        }
    };

    if let Some(spinner) = &spinner {
        spinner.finish_clear();
    }

    if human {
        print_human(&report, started.elapsed(), args.verbose);
    } else {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}

fn print_human(report: &ScanReport, elapsed: std::time::Duration, verbose: bool) {
    progress::success(&format!(
        "Scanned {} in {}",
        format_count(report.total_source_files, "source file", "source files"),
        format_duration(elapsed)
    ));

    if let Some(percent) = report.coverage_percent {
        let tested = report.total_source_files - report.untested.len();
        let line = format!(
            "Coverage: {}% ({}/{} files tested), threshold {}%",
            percent, tested, report.total_source_files, report.threshold
        );
        if percent >= report.threshold {
            progress::success(&line);
        } else {
            progress::warning(&line);
        }
    }

    if let Some(changes) = &report.changes {
        progress::info(&format!(
            "{} changed ({} source)",
            format_count(changes.len(), "file", "files"),
            report.total_source_files
        ));
        if verbose {
            for change in changes {
                println!("    {:?} {}", change.status, change.file);
            }
        }
    }

    if report.untested.is_empty() {
        progress::success("No files need tests");
    } else {
        let counted = if report.changes.is_some() {
            format_count(
                report.untested.len(),
                "changed source file to check",
                "changed source files to check",
            )
        } else {
            format_count(
                report.untested.len(),
                "file without tests",
                "files without tests",
            )
        };
        progress::warning(&format!("{}:", counted));
        for entry in &report.untested {
            println!(
                "    {} ({}) {} {}",
                style(&entry.file).cyan(),
                format_count(entry.functions.len(), "function", "functions"),
                style("→").dim(),
                style(&entry.expected_test).dim()
            );
            if verbose {
                for f in &entry.functions {
                    let marker = if f.is_exported { "export" } else { "local" };
                    println!(
                        "        {} {} ({}) line {}",
                        marker,
                        f.name,
                        f.params.join(", "),
                        f.start_line
                    );
                }
            }
        }
    }

    for failure in &report.failures {
        progress::warning(&format!("skipped {}: {}", failure.file, failure.message));
    }
}

/// Current branch and recent history, for prompt context.
#[derive(Debug, Serialize)]
pub struct BranchInfo {
    pub branch: String,
    pub commits: Vec<String>,
    pub changed_files: usize,
}

/// Print branch name, recent commits, and pending change count.
pub fn run_branch_info(root: &Path, args: &ParsedArgs) -> Result<()> {
    let repo = GitRepo::discover(root)?;
    let info = BranchInfo {
        branch: repo.current_branch(),
        commits: repo.recent_commits(5)?,
        changed_files: repo.status_changes()?.len(),
    };

    if args.output == OutputMode::Json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    progress::info(&format!("On branch {}", style(&info.branch).cyan().bold()));
    if info.commits.is_empty() {
        println!("    no commits yet");
    }
    for commit in &info.commits {
        println!("    {}", commit);
    }
    if info.changed_files > 0 {
        progress::warning(&format!(
            "{} with uncommitted changes",
            format_count(info.changed_files, "file", "files")
        ));
    }
    Ok(())
}

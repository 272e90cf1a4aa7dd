//! Git change resolution.
//!
//! This module wraps repository state queries (status, log, diff) behind a
//! [`GitRepo`] handle using libgit2 (git2 crate), normalizing them into the
//! change-set model consumed by diff-mode scans. Calls against one handle are
//! sequential; the handle is not shared across threads.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use git2::{DiffFormat, DiffOptions, Repository, Sort, StatusOptions};
use regex::Regex;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::paths::is_source_file;

/// Error type for git operations
#[derive(Debug)]
pub enum GitError {
    /// Not a git repository
    NotARepository(String),
    /// Relative-time expression could not be parsed
    InvalidTimeExpression(String),
    /// Git operation failed
    OperationFailed(String),
    /// IO error
    IoError(std::io::Error),
}

impl std::fmt::Display for GitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GitError::NotARepository(path) => {
                write!(f, "not a git repository: {}", path)
            }
            GitError::InvalidTimeExpression(expr) => {
                write!(f, "cannot parse time expression: {}", expr)
            }
            GitError::OperationFailed(msg) => {
                write!(f, "git operation failed: {}", msg)
            }
            GitError::IoError(e) => {
                write!(f, "IO error: {}", e)
            }
        }
    }
}

impl std::error::Error for GitError {}

impl From<git2::Error> for GitError {
    fn from(e: git2::Error) -> Self {
        GitError::OperationFailed(e.message().to_string())
    }
}

impl From<std::io::Error> for GitError {
    fn from(e: std::io::Error) -> Self {
        GitError::IoError(e)
    }
}

/// Status of a changed file
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeStatus {
    Added,
    Modified,
    Deleted,
    /// Present in the index only (no working-tree classification).
    Staged,
}

/// One changed file in the working tree or index. A single path yields at most
/// one entry; index and working-tree sightings are merged via the flags.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GitFileChange {
    pub file: String,
    pub status: ChangeStatus,
    pub staged: bool,
    pub modified: bool,
}

/// A resolved change set plus its unified diff text.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GitDiffInfo {
    pub changes: Vec<GitFileChange>,
    pub diff_text: String,
    pub total_files: usize,
    /// Count of changes whose path passes the source-file predicate.
    pub code_files: usize,
}

impl GitDiffInfo {
    fn new(changes: Vec<GitFileChange>, diff_text: String) -> Self {
        let total_files = changes.len();
        let code_files = changes.iter().filter(|c| is_source_file(&c.file)).count();
        Self {
            changes,
            diff_text,
            total_files,
            code_files,
        }
    }
}

/// True when `path` lives inside a git work tree. Never errors; a missing
/// repository, bare repo, or unusable git installation all resolve to `false`.
pub fn is_git_repository(path: &Path) -> bool {
    Repository::discover(path)
        .map(|repo| repo.workdir().is_some())
        .unwrap_or(false)
}

/// Wrapper around a git repository
pub struct GitRepo {
    repo: Repository,
    path: PathBuf,
}

impl GitRepo {
    /// Discover a git repository from the given path.
    /// Searches upward from the path to find the .git directory.
    pub fn discover(path: &Path) -> Result<Self, GitError> {
        let repo = Repository::discover(path)
            .map_err(|_| GitError::NotARepository(path.display().to_string()))?;

        let workdir = repo
            .workdir()
            .ok_or_else(|| GitError::NotARepository("bare repository".to_string()))?;

        Ok(Self {
            path: workdir.to_path_buf(),
            repo,
        })
    }

    /// Get the repository root path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current change set from repository status, one entry per path.
    pub fn status_changes(&self) -> Result<Vec<GitFileChange>, GitError> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(true).recurse_untracked_dirs(true);
        let statuses = self.repo.statuses(Some(&mut opts))?;

        let mut raw: Vec<(String, ChangeStatus, bool)> = Vec::new();
        for entry in statuses.iter() {
            let Some(file) = entry.path() else { continue };
            let status = entry.status();
            // Working-tree classifications first so they win the status
            // tie-break; index presence is merged as the staged flag.
            if status.is_wt_new() {
                raw.push((file.to_string(), ChangeStatus::Added, false));
            }
            if status.is_wt_modified() {
                raw.push((file.to_string(), ChangeStatus::Modified, false));
            }
            if status.is_wt_deleted() {
                raw.push((file.to_string(), ChangeStatus::Deleted, false));
            }
            if status.is_index_new()
                || status.is_index_modified()
                || status.is_index_deleted()
                || status.is_index_renamed()
                || status.is_index_typechange()
            {
                raw.push((file.to_string(), ChangeStatus::Staged, true));
            }
        }

        Ok(reconcile_changes(raw))
    }

    /// Working-tree modifications, with the unified diff of the work tree
    /// against the index. A file that is staged and then edited again still
    /// appears here: the filter keeps every entry carrying a working-tree
    /// classification and only drops index-only (`Staged`) entries.
    pub fn uncommitted_diff(&self) -> Result<GitDiffInfo, GitError> {
        let changes = self
            .status_changes()?
            .into_iter()
            .filter(|c| c.status != ChangeStatus::Staged)
            .collect();

        let mut opts = DiffOptions::new();
        opts.include_untracked(true);
        let diff = self.repo.diff_index_to_workdir(None, Some(&mut opts))?;
        Ok(GitDiffInfo::new(changes, diff_to_text(&diff)?))
    }

    /// Files present in the staging area, with the diff of the index against HEAD.
    pub fn staged_diff(&self) -> Result<GitDiffInfo, GitError> {
        let changes = self
            .status_changes()?
            .into_iter()
            .filter(|c| c.staged)
            .collect();

        // Unborn HEAD (fresh repo): diff the index against an empty tree.
        let head_tree = self.repo.head().ok().and_then(|h| h.peel_to_tree().ok());
        let diff = self
            .repo
            .diff_tree_to_index(head_tree.as_ref(), None, None)?;
        Ok(GitDiffInfo::new(changes, diff_to_text(&diff)?))
    }

    /// Diff against the oldest commit within a human-relative time window,
    /// e.g. `"2 hours ago"`.
    ///
    /// The change list always reflects current repository status. When no
    /// commit falls inside the window, `diff_text` is empty but the change
    /// list is still populated.
    pub fn diff_since(&self, time_expression: &str) -> Result<GitDiffInfo, GitError> {
        let window = parse_time_expression(time_expression)?;
        let cutoff = OffsetDateTime::now_utc().unix_timestamp() - window;
        self.diff_since_timestamp(cutoff)
    }

    fn diff_since_timestamp(&self, cutoff: i64) -> Result<GitDiffInfo, GitError> {
        let changes = self.status_changes()?;

        let diff_text = match self.oldest_commit_since(cutoff)? {
            Some(oid) => {
                let commit = self.repo.find_commit(oid)?;
                let tree = commit.tree()?;
                let diff = self
                    .repo
                    .diff_tree_to_workdir_with_index(Some(&tree), None)?;
                diff_to_text(&diff)?
            }
            None => String::new(),
        };

        Ok(GitDiffInfo::new(changes, diff_text))
    }

    /// Oldest commit whose timestamp is at or after `cutoff`, walking from HEAD.
    fn oldest_commit_since(&self, cutoff: i64) -> Result<Option<git2::Oid>, GitError> {
        let mut revwalk = self.repo.revwalk()?;
        if revwalk.push_head().is_err() {
            // Unborn HEAD: no history to walk.
            return Ok(None);
        }
        revwalk.set_sorting(Sort::TIME)?;

        let mut oldest = None;
        for oid_result in revwalk {
            let oid = oid_result?;
            let commit = self.repo.find_commit(oid)?;
            if commit.time().seconds() >= cutoff {
                oldest = Some(oid);
            } else {
                // TIME sorting is newest-first; everything past here is older.
                break;
            }
        }
        Ok(oldest)
    }

    /// Current branch name, or `"main"` when HEAD is detached or unborn.
    /// Never errors.
    pub fn current_branch(&self) -> String {
        match self.repo.head() {
            Ok(head) if head.is_branch() => head.shorthand().unwrap_or("main").to_string(),
            _ => "main".to_string(),
        }
    }

    /// Most recent commits formatted as `"<7-char-hash> - <message>"`,
    /// newest first, at most `count` entries.
    pub fn recent_commits(&self, count: usize) -> Result<Vec<String>, GitError> {
        let mut revwalk = self.repo.revwalk()?;
        if revwalk.push_head().is_err() {
            return Ok(Vec::new());
        }
        revwalk.set_sorting(Sort::TIME)?;

        let mut commits = Vec::new();
        for oid_result in revwalk {
            if commits.len() >= count {
                break;
            }
            let oid = oid_result?;
            let commit = self.repo.find_commit(oid)?;
            let short_hash: String = oid.to_string().chars().take(7).collect();
            let message = commit
                .message()
                .unwrap_or("")
                .lines()
                .next()
                .unwrap_or("")
                .to_string();
            commits.push(format!("{} - {}", short_hash, message));
        }
        Ok(commits)
    }
}

/// Collapse raw `(file, status, staged)` classifications into one entry per
/// path. The first classification wins the status; later sightings of the same
/// path only merge the `staged`/`modified` flags.
fn reconcile_changes(raw: Vec<(String, ChangeStatus, bool)>) -> Vec<GitFileChange> {
    let mut changes: Vec<GitFileChange> = Vec::new();
    let mut by_file: HashMap<String, usize> = HashMap::new();

    for (file, status, staged) in raw {
        match by_file.get(&file) {
            Some(&i) => {
                if staged {
                    changes[i].staged = true;
                }
                if status == ChangeStatus::Modified {
                    changes[i].modified = true;
                }
            }
            None => {
                by_file.insert(file.clone(), changes.len());
                changes.push(GitFileChange {
                    modified: status == ChangeStatus::Modified,
                    file,
                    status,
                    staged,
                });
            }
        }
    }

    changes
}

/// Parse a human-relative time expression (`"2 hours ago"`) into a window in
/// seconds.
pub fn parse_time_expression(expr: &str) -> Result<i64, GitError> {
    let re = Regex::new(r"(?i)^\s*(\d+)\s*(second|minute|hour|day|week|month)s?\s+ago\s*$")
        .map_err(|e| GitError::OperationFailed(e.to_string()))?;

    let captures = re
        .captures(expr)
        .ok_or_else(|| GitError::InvalidTimeExpression(expr.to_string()))?;

    let amount: i64 = captures[1]
        .parse()
        .map_err(|_| GitError::InvalidTimeExpression(expr.to_string()))?;
    let unit_seconds = match captures[2].to_ascii_lowercase().as_str() {
        "second" => 1,
        "minute" => 60,
        "hour" => 3_600,
        "day" => 86_400,
        "week" => 604_800,
        // Months are approximated at 30 days for log-window purposes.
        "month" => 2_592_000,
        _ => return Err(GitError::InvalidTimeExpression(expr.to_string())),
    };

    Ok(amount * unit_seconds)
}

fn diff_to_text(diff: &git2::Diff) -> Result<String, GitError> {
    let mut text = String::new();
    diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
        let origin = line.origin();
        if matches!(origin, '+' | '-' | ' ') {
            text.push(origin);
        }
        text.push_str(std::str::from_utf8(line.content()).unwrap_or(""));
        true
    })?;
    Ok(text)
}

//! Batch parsing with bounded parallelism.
//!
//! Parses many source files, isolating per-file failures so one broken file
//! never aborts the batch. Results keep the order of the input file list.

use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use serde::{Deserialize, Serialize};

use crate::parser::{ParseError, parse_file};
use crate::types::ParsedFile;

/// Maximum number of files parsed in parallel (bounded parallelism)
const MAX_PARALLEL_FILES: usize = 8;

/// One file that failed to parse during a batch run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParseFailure {
    pub file: String,
    pub message: String,
}

/// Outcome of a batch parse: successes and isolated failures.
#[derive(Debug, Default)]
pub struct ParseReport {
    pub parsed: Vec<ParsedFile>,
    pub failures: Vec<ParseFailure>,
}

fn parse_one(root: &Path, relative: &str) -> Result<ParsedFile, ParseError> {
    let mut parsed = parse_file(&root.join(relative))?;
    // Report results under the root-relative path the caller passed in.
    parsed.file_path = relative.to_string();
    Ok(parsed)
}

fn failure_from(relative: &str, err: ParseError) -> ParseFailure {
    ParseFailure {
        file: relative.to_string(),
        message: err.to_string(),
    }
}

/// Parse `files` (root-relative paths) under `root`.
///
/// Successes land in `parsed` and failures in `failures`, both in input
/// order. An empty input yields an empty report.
pub fn parse_batch(root: &Path, files: &[String]) -> ParseReport {
    parse_batch_with_cancel(root, files, &AtomicBool::new(false))
}

/// Like [`parse_batch`], but stops picking up new files once `cancelled` is
/// set. Cancellation is cooperative: files already being parsed run to
/// completion, files not yet started are left out of the report entirely.
pub fn parse_batch_with_cancel(
    root: &Path,
    files: &[String],
    cancelled: &AtomicBool,
) -> ParseReport {
    // For a single file, skip parallelization overhead
    if files.len() <= 1 {
        let mut report = ParseReport::default();
        if cancelled.load(Ordering::Relaxed) {
            return report;
        }
        if let Some(relative) = files.first() {
            match parse_one(root, relative) {
                Ok(parsed) => report.parsed.push(parsed),
                Err(err) => report.failures.push(failure_from(relative, err)),
            }
        }
        return report;
    }

    let parsed: Mutex<Vec<(usize, ParsedFile)>> = Mutex::new(Vec::new());
    let failures: Mutex<Vec<(usize, ParseFailure)>> = Mutex::new(Vec::new());

    thread::scope(|s| {
        // Process files in chunks for bounded parallelism
        for (chunk_index, chunk) in files.chunks(MAX_PARALLEL_FILES).enumerate() {
            if cancelled.load(Ordering::Relaxed) {
                break;
            }
            let base = chunk_index * MAX_PARALLEL_FILES;
            let handles: Vec<_> = chunk
                .iter()
                .map(|relative| s.spawn(|| parse_one(root, relative)))
                .collect();

            for (offset, (handle, relative)) in
                handles.into_iter().zip(chunk.iter()).enumerate()
            {
                let index = base + offset;
                match handle.join() {
                    Ok(Ok(file)) => {
                        parsed.lock().unwrap().push((index, file));
                    }
                    Ok(Err(err)) => {
                        failures
                            .lock()
                            .unwrap()
                            .push((index, failure_from(relative, err)));
                    }
                    Err(_) => {
                        failures.lock().unwrap().push((
                            index,
                            ParseFailure {
                                file: relative.clone(),
                                message: "parser thread panicked".to_string(),
                            },
                        ));
                    }
                }
            }
        }
    });

    let mut parsed = parsed.into_inner().unwrap_or_default();
    let mut failures = failures.into_inner().unwrap_or_default();
    parsed.sort_by_key(|(i, _)| *i);
    failures.sort_by_key(|(i, _)| *i);

    ParseReport {
        parsed: parsed.into_iter().map(|(_, f)| f).collect(),
        failures: failures.into_iter().map(|(_, f)| f).collect(),
    }
}

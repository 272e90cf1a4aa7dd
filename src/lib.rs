//! testgenie core: find JavaScript/TypeScript functions lacking Jest coverage.
//!
//! The pipeline runs in three stages. [`discovery`] (or [`git`], in diff mode)
//! produces a candidate file list, [`parser`] extracts the function inventory
//! per file, and [`coverage`] cross-references sources against existing tests
//! to compute the untested set. [`paths`] holds the source/test classification
//! predicate every stage shares.

pub mod args;
pub mod batch;
pub mod config;
pub mod coverage;
pub mod discovery;
pub mod git;
pub mod parser;
pub mod paths;
pub mod progress;
pub mod scan;
pub mod types;

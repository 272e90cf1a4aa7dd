//! Configuration file support for testgenie.
//!
//! Loads optional `testgenie.toml` from the project root.

use serde::Deserialize;
use std::path::Path;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TestgenieConfig {
    /// Directory where generated tests live (default `__tests__`)
    pub test_dir: String,
    pub patterns: PatternsConfig,
    pub coverage: CoverageConfig,
}

/// Glob patterns applied during discovery
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct PatternsConfig {
    /// Additional exclude globs on top of the built-in directory exclusions.
    pub exclude: Vec<String>,
}

/// Coverage reporting thresholds
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CoverageConfig {
    /// Minimum acceptable coverage percentage for the scan summary.
    pub threshold: f32,
}

impl Default for TestgenieConfig {
    fn default() -> Self {
        Self {
            test_dir: "__tests__".to_string(),
            patterns: PatternsConfig::default(),
            coverage: CoverageConfig::default(),
        }
    }
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self { threshold: 80.0 }
    }
}

impl TestgenieConfig {
    /// Load config from `testgenie.toml` in the given root directory.
    /// Returns default config if the file doesn't exist or is invalid.
    pub fn load(root: &Path) -> Self {
        Self::load_from_path(&root.join("testgenie.toml"))
    }

    /// Load config from a specific path.
    pub fn load_from_path(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("[testgenie][warn] Failed to parse {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("[testgenie][warn] Failed to read {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}

use std::path::PathBuf;

use crate::types::{Mode, OutputMode};

pub struct ParsedArgs {
    pub mode: Mode,
    pub root: Option<PathBuf>,
    /// Scan only uncommitted working-tree changes.
    pub diff: bool,
    /// Scan only staged changes.
    pub staged: bool,
    /// Scan changes since a relative time expression, e.g. "2 hours ago".
    pub since: Option<String>,
    /// Override for the configured test directory.
    pub test_dir: Option<String>,
    pub exclude: Vec<String>,
    pub output: OutputMode,
    pub verbose: bool,
    pub show_help: bool,
    pub show_version: bool,
}

impl Default for ParsedArgs {
    fn default() -> Self {
        Self {
            mode: Mode::Scan,
            root: None,
            diff: false,
            staged: false,
            since: None,
            test_dir: None,
            exclude: Vec::new(),
            output: OutputMode::Human,
            verbose: false,
            show_help: false,
            show_version: false,
        }
    }
}

fn parse_glob_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .filter_map(|segment| {
            let trimmed = segment.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
        .collect()
}

fn validate_globs(patterns: &[String], flag: &str) -> Result<(), String> {
    for pat in patterns {
        if pat.trim().is_empty() {
            continue;
        }
        globset::Glob::new(pat).map_err(|e| format!("{flag}: invalid glob '{pat}': {e}"))?;
    }
    Ok(())
}

fn require_value<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a String, String> {
    args.get(i + 1)
        .filter(|next| !next.starts_with('-'))
        .ok_or_else(|| format!("{flag} requires a value"))
}

pub fn parse_args() -> Result<ParsedArgs, String> {
    let args: Vec<String> = std::env::args_os()
        .skip(1)
        .map(|s| s.to_string_lossy().into_owned())
        .collect();
    parse_arg_list(&args)
}

pub fn parse_arg_list(args: &[String]) -> Result<ParsedArgs, String> {
    let mut parsed = ParsedArgs::default();
    let mut positional: Vec<String> = Vec::new();

    let mut i = 0;
    while i < args.len() {
        let arg = &args[i];
        match arg.as_str() {
            "scan" | "--scan" => {
                parsed.mode = Mode::Scan;
                i += 1;
            }
            "branch-info" | "--branch-info" => {
                parsed.mode = Mode::BranchInfo;
                i += 1;
            }
            "--diff" | "-d" => {
                parsed.diff = true;
                i += 1;
            }
            "--staged" => {
                parsed.staged = true;
                i += 1;
            }
            "--since" => {
                parsed.since = Some(require_value(args, i, "--since")?.clone());
                i += 2;
            }
            _ if arg.starts_with("--since=") => {
                let value = arg.trim_start_matches("--since=");
                if value.is_empty() {
                    return Err("--since requires a value".to_string());
                }
                parsed.since = Some(value.to_string());
                i += 1;
            }
            "--test-dir" => {
                parsed.test_dir = Some(require_value(args, i, "--test-dir")?.clone());
                i += 2;
            }
            "--exclude" | "-e" => {
                let globs = parse_glob_list(require_value(args, i, "--exclude")?);
                validate_globs(&globs, "--exclude")?;
                parsed.exclude.extend(globs);
                i += 2;
            }
            "--json" => {
                parsed.output = OutputMode::Json;
                i += 1;
            }
            "--verbose" | "-v" => {
                parsed.verbose = true;
                i += 1;
            }
            "--help" | "-h" => {
                parsed.show_help = true;
                i += 1;
            }
            "--version" | "-V" => {
                parsed.show_version = true;
                i += 1;
            }
            _ if arg.starts_with('-') => {
                return Err(format!("Unknown option: {}", arg));
            }
            _ => {
                positional.push(arg.clone());
                i += 1;
            }
        }
    }

    if [parsed.diff, parsed.staged, parsed.since.is_some()]
        .iter()
        .filter(|b| **b)
        .count()
        > 1
    {
        return Err("--diff, --staged and --since are mutually exclusive".to_string());
    }

    match positional.len() {
        0 => {}
        1 => parsed.root = Some(PathBuf::from(&positional[0])),
        _ => {
            return Err(format!(
                "Expected at most one path argument, got: {}",
                positional.join(", ")
            ));
        }
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(items: &[&str]) -> Result<ParsedArgs, String> {
        let args: Vec<String> = items.iter().map(|s| s.to_string()).collect();
        parse_arg_list(&args)
    }

    #[test]
    fn defaults_to_scan_of_cwd() {
        let parsed = parse(&[]).unwrap();
        assert_eq!(parsed.mode, Mode::Scan);
        assert!(parsed.root.is_none());
        assert!(!parsed.diff);
        assert_eq!(parsed.output, OutputMode::Human);
    }

    #[test]
    fn scan_with_path_and_flags() {
        let parsed = parse(&["scan", "frontend", "--json", "--verbose"]).unwrap();
        assert_eq!(parsed.mode, Mode::Scan);
        assert_eq!(parsed.root, Some(PathBuf::from("frontend")));
        assert_eq!(parsed.output, OutputMode::Json);
        assert!(parsed.verbose);
    }

    #[test]
    fn since_accepts_both_forms() {
        let parsed = parse(&["--since", "2 hours ago"]).unwrap();
        assert_eq!(parsed.since.as_deref(), Some("2 hours ago"));

        let parsed = parse(&["--since=1 day ago"]).unwrap();
        assert_eq!(parsed.since.as_deref(), Some("1 day ago"));
    }

    #[test]
    fn diff_modes_are_mutually_exclusive() {
        assert!(parse(&["--diff", "--staged"]).is_err());
        assert!(parse(&["--staged", "--since", "1 day ago"]).is_err());
    }

    #[test]
    fn exclude_accepts_comma_lists_and_repeats() {
        let parsed = parse(&["--exclude", "**/migrations/**,**/*.config.js", "-e", "gen/**"])
            .unwrap();
        assert_eq!(
            parsed.exclude,
            vec!["**/migrations/**", "**/*.config.js", "gen/**"]
        );
    }

    #[test]
    fn invalid_glob_is_rejected() {
        assert!(parse(&["--exclude", "src/[bad"]).is_err());
    }

    #[test]
    fn unknown_option_is_rejected() {
        assert!(parse(&["--frobnicate"]).is_err());
    }

    #[test]
    fn branch_info_mode() {
        let parsed = parse(&["branch-info"]).unwrap();
        assert_eq!(parsed.mode, Mode::BranchInfo);
    }

    #[test]
    fn at_most_one_path() {
        assert!(parse(&["a", "b"]).is_err());
    }
}

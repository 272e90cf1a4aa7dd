use std::panic;
use std::path::PathBuf;

use testgenie::args::parse_args;
use testgenie::progress;
use testgenie::scan::{run_branch_info, run_scan};
use testgenie::types::Mode;

fn install_broken_pipe_handler() {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let payload = info.payload();
        let is_broken = payload
            .downcast_ref::<&str>()
            .is_some_and(|s| s.contains("Broken pipe"))
            || payload
                .downcast_ref::<String>()
                .is_some_and(|s| s.contains("Broken pipe"));

        if is_broken {
            // Quietly exit when downstream closes the pipe (e.g. piping to `head`).
            std::process::exit(0);
        }

        default_hook(info);
    }));
}

fn format_usage() -> &'static str {
    "testgenie - find JS/TS functions without Jest coverage\n\n\
Usage: testgenie [command] [path] [options]\n\n\
Commands:\n  \
  scan (default)            Scan a project for source files lacking tests\n  \
  branch-info               Show current branch, recent commits, pending changes\n\n\
Scan options:\n  \
  --diff, -d                Only uncommitted working-tree changes\n  \
  --staged                  Only staged changes\n  \
  --since <expr>            Changes since e.g. \"2 hours ago\", \"1 day ago\"\n  \
  --test-dir <dir>          Test directory (default: __tests__ or testgenie.toml)\n  \
  --exclude, -e <globs>     Exclude globs, comma-separated (repeatable)\n\n\
Common:\n  \
  --json                    JSON output\n  \
  --verbose, -v             Show per-function detail and change lists\n  \
  --help, -h                Show this message\n  \
  --version, -V             Show version\n\n\
Examples:\n  \
  testgenie                            # Scan current directory\n  \
  testgenie scan frontend --json       # Machine-readable scan of ./frontend\n  \
  testgenie --diff                     # What did I just change without tests?\n  \
  testgenie --since \"2 hours ago\" -v   # Recent work, with function detail\n"
}

fn main() {
    install_broken_pipe_handler();

    let parsed = match parse_args() {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(1);
        }
    };

    if parsed.show_help {
        println!("{}", format_usage());
        return;
    }

    if parsed.show_version {
        println!("testgenie {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let root = parsed.root.clone().unwrap_or(cwd);
    if !root.is_dir() {
        progress::error(&format!("\"{}\" is not a directory", root.display()));
        std::process::exit(1);
    }

    let result = match parsed.mode {
        Mode::Scan => run_scan(&root, &parsed),
        Mode::BranchInfo => run_branch_info(&root, &parsed),
    };

    if let Err(err) = result {
        progress::error(&format!("{:#}", err));
        std::process::exit(1);
    }
}

pub mod engine;
pub mod items;
pub mod report;
pub mod runner;
pub mod scanner;
pub mod signature;
pub mod utils;

use crate::engine::Everyfunc;
use anyhow::{Context, Result};
use clap::Parser;
use regex::Regex;
use std::collections::HashSet;
use std::path::PathBuf;

/// Command line interface configuration using `clap`.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a Python module or a directory to scan recursively.
    /// Every top-level function found there becomes a test item.
    path: PathBuf,

    /// Only scan module paths matching this regular expression.
    /// Useful to opt a subset of a tree into invocation.
    #[arg(long)]
    include: Option<String>,

    /// Callable names (simple or module-qualified) to always skip.
    /// Repeat the flag for multiple names.
    #[arg(long = "exclude", value_name = "NAME")]
    exclude: Vec<String>,

    /// Treat skipped items as run failures (nonzero exit).
    #[arg(long)]
    fail_on_skip: bool,

    /// Interpreter executable used to invoke the discovered functions.
    #[arg(long, default_value = "python3")]
    python: String,

    /// Discover and classify only; do not invoke anything.
    #[arg(long)]
    collect_only: bool,

    /// Output raw JSON instead of the human-readable report.
    /// Useful for integrating with other tools or CI/CD pipelines.
    #[arg(long)]
    json: bool,
}

/// Main entry point of the application.
///
/// Parses arguments, runs the engine, prints the report, and exits nonzero
/// when the run found failures.
fn main() -> Result<()> {
    let cli = Cli::parse();

    if !cli.json {
        println!("Scanning path: {:?}", cli.path);
    }

    let include = cli
        .include
        .as_deref()
        .map(Regex::new)
        .transpose()
        .context("invalid --include pattern")?;
    let exclude_names: HashSet<String> = cli.exclude.iter().cloned().collect();

    let engine = Everyfunc::new(
        include,
        exclude_names,
        cli.fail_on_skip,
        cli.python,
        cli.collect_only,
    );

    let result = engine.run(&cli.path)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        report::print_report(&result);
    }

    let code = engine.exit_code(&result);
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

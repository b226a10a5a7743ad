use crate::engine::RunResult;
use colored::*;
use serde::{Deserialize, Serialize};

/// The outcome of exercising one test item.
///
/// Produced exactly once per invoked item and never mutated afterwards. The
/// variants map one-to-one onto the pass/fail/skip vocabulary of the report
/// surface, so no further aggregation logic is needed beyond counting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    /// The callable returned normally (any value, `None` included).
    Passed,
    /// The callable raised; `error` is the "ExcType: message" summary.
    Failed { error: String },
    /// The callable was never invoked; `reason` says why.
    Skipped { reason: String },
}

impl Outcome {
    /// Short status word for report lines.
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Passed => "pass",
            Outcome::Failed { .. } => "FAIL",
            Outcome::Skipped { .. } => "skip",
        }
    }
}

/// Prints the human-readable run report.
pub fn print_report(result: &RunResult) {
    println!("\n{}", "Function Invocation Results".bold());
    println!("===========================\n");

    for module in &result.modules {
        if module.items.is_empty() && module.load_error.is_none() {
            continue;
        }
        println!("{}", module.file.display().to_string().bold());
        if let Some(error) = &module.load_error {
            println!("  {} {}", "ERROR".red().bold(), error);
        }
        for item in &module.items {
            let status = match &item.outcome {
                Some(outcome @ Outcome::Passed) => outcome.label().green(),
                Some(outcome @ Outcome::Failed { .. }) => outcome.label().red().bold(),
                Some(outcome @ Outcome::Skipped { .. }) => outcome.label().yellow(),
                // Not invoked: collect-only mode or module load error.
                None => "-".normal(),
            };
            println!("  {:4}  {}", status, item.id);
        }
        println!();
    }

    // Failure details, numbered like the findings list.
    let failures: Vec<_> = result
        .modules
        .iter()
        .flat_map(|module| module.items.iter())
        .filter_map(|item| match &item.outcome {
            Some(Outcome::Failed { error }) => Some((item, error)),
            _ => None,
        })
        .collect();
    if !failures.is_empty() {
        println!(" - Failures");
        println!("===========");
        for (i, (item, error)) in failures.iter().enumerate() {
            println!(" {}. {}", i + 1, item.id);
            println!("    └─ {}:{}: {}", item.file.display(), item.line, error);
        }
        println!();
    }

    let skips: Vec<_> = result
        .modules
        .iter()
        .flat_map(|module| module.items.iter())
        .filter_map(|item| match &item.outcome {
            Some(Outcome::Skipped { reason }) => Some((item, reason)),
            _ => None,
        })
        .collect();
    if !skips.is_empty() {
        println!(" - Skipped");
        println!("==========");
        for (i, (item, reason)) in skips.iter().enumerate() {
            println!(" {}. {} ({})", i + 1, item.id, reason);
        }
        println!();
    }

    let load_errors: Vec<_> = result
        .modules
        .iter()
        .filter_map(|module| module.load_error.as_ref().map(|error| (module, error)))
        .collect();
    if !load_errors.is_empty() {
        println!(" - Module Errors");
        println!("================");
        for (i, (module, error)) in load_errors.iter().enumerate() {
            println!(" {}. {}", i + 1, module.file.display());
            println!("    └─ {}", error);
        }
        println!();
    }

    let summary = &result.summary;
    println!("Summary:");
    println!(" * Modules scanned: {}", summary.total_modules);
    println!(" * Items collected: {}", summary.collected);
    println!(
        " * {} passed, {} failed, {} skipped",
        summary.passed, summary.failed, summary.skipped
    );
    if summary.module_errors > 0 {
        println!(" * Module errors: {}", summary.module_errors);
    }
}

/// Translates a run into a process exit code.
///
/// Nonzero when any item failed or any module failed to load; with
/// `fail_on_skip`, skipped items count as failures too.
pub fn exit_code(result: &RunResult, fail_on_skip: bool) -> i32 {
    let summary = &result.summary;
    if summary.failed > 0 || summary.module_errors > 0 {
        return 1;
    }
    if fail_on_skip && summary.skipped > 0 {
        return 1;
    }
    0
}

use crate::items::{ItemGenerator, TestItem};
use crate::report;
use crate::runner::PythonRunner;
use crate::scanner::{self, ModuleScan};
use anyhow::Result;
use rayon::prelude::*;
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Per-module section of the run result.
#[derive(Debug, Serialize)]
pub struct ModuleReport {
    /// Module name derived from the file stem.
    pub module: String,
    /// Path of the scanned file.
    pub file: PathBuf,
    /// Set when the module could not be parsed or imported. Reported once
    /// for the whole module; eligible items then carry no outcome at all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_error: Option<String>,
    /// Test items in source declaration order.
    pub items: Vec<TestItem>,
}

/// Summary statistics for one run.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    /// Number of Python modules scanned.
    pub total_modules: usize,
    /// Number of test items collected (eligible and skipped alike).
    pub collected: usize,
    /// Items whose callable returned normally.
    pub passed: usize,
    /// Items whose callable raised.
    pub failed: usize,
    /// Items never invoked, with a reason.
    pub skipped: usize,
    /// Modules that failed to parse or import.
    pub module_errors: usize,
}

/// The full result of one run, serialized to JSON when requested.
#[derive(Debug, Serialize)]
pub struct RunResult {
    /// Per-module reports in sorted path order.
    pub modules: Vec<ModuleReport>,
    /// Aggregated counts.
    pub summary: RunSummary,
}

/// The discovery-and-invocation engine.
///
/// Configuration lives here; `run` drives the pipeline: walk the target for
/// Python files, scan them in parallel, then invoke eligible callables
/// sequentially, module by module.
pub struct Everyfunc {
    /// Only module paths matching this pattern are scanned.
    pub include: Option<Regex>,
    /// Callables (simple or qualified name) that are always skipped.
    pub exclude_names: HashSet<String>,
    /// Whether skipped items make the run exit nonzero.
    pub fail_on_skip: bool,
    /// Interpreter executable used for invocation.
    pub python: String,
    /// Discover and classify only; never spawn the interpreter.
    pub collect_only: bool,
}

impl Everyfunc {
    /// Creates a new engine instance with the given configuration.
    pub fn new(
        include: Option<Regex>,
        exclude_names: HashSet<String>,
        fail_on_skip: bool,
        python: String,
        collect_only: bool,
    ) -> Self {
        Self {
            include,
            exclude_names,
            fail_on_skip,
            python,
            collect_only,
        }
    }

    /// Runs discovery and invocation on the specified path.
    ///
    /// This method:
    /// 1. Walks the target (a `.py` file or a directory tree) for modules,
    ///    in sorted path order for reproducible output.
    /// 2. Scans files in parallel; `par_iter` preserves input order.
    /// 3. Builds one test item per discovered callable, with run-unique
    ///    identifiers.
    /// 4. Invokes pending items sequentially through the Python driver,
    ///    one subprocess per module.
    /// 5. Aggregates everything into a `RunResult`.
    pub fn run(&self, path: &Path) -> Result<RunResult> {
        let files = self.collect_files(path);

        let scans: Vec<ModuleScan> = files
            .par_iter()
            .map(|file| scanner::scan_file(file))
            .collect();

        // Identifier uniqueness spans the whole run, not just one module.
        let mut generator = ItemGenerator::new();
        let runner = PythonRunner::new(self.python.clone());
        let mut modules = Vec::new();

        for scan in scans {
            let mut items: Vec<TestItem> = scan
                .records
                .iter()
                .map(|record| generator.build(record, &self.exclude_names))
                .collect();
            let mut load_error = scan.load_error;

            if load_error.is_none() && !self.collect_only {
                let pending: Vec<String> = items
                    .iter()
                    .filter(|item| item.is_pending())
                    .map(|item| item.name.clone())
                    .collect();
                if !pending.is_empty() {
                    let module_run = runner.run_module(&scan.file, &pending)?;
                    if let Some(error) = module_run.load_error {
                        // Import failed at runtime: one module-level error,
                        // zero per-function outcomes.
                        load_error = Some(error);
                    } else {
                        let mut results = module_run.outcomes.into_iter();
                        for item in items.iter_mut().filter(|item| item.is_pending()) {
                            if let Some((_name, outcome)) = results.next() {
                                item.outcome = Some(outcome);
                            }
                        }
                    }
                }
            }

            modules.push(ModuleReport {
                module: scan.module,
                file: scan.file,
                load_error,
                items,
            });
        }

        let summary = summarize(&modules);
        Ok(RunResult { modules, summary })
    }

    /// Translates a run result into the process exit code, honoring the
    /// `fail_on_skip` configuration.
    pub fn exit_code(&self, result: &RunResult) -> i32 {
        report::exit_code(result, self.fail_on_skip)
    }

    /// Finds the Python files to scan, sorted for deterministic ordering.
    fn collect_files(&self, path: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = if path.is_file() {
            vec![path.to_path_buf()]
        } else {
            WalkDir::new(path)
                .into_iter()
                .filter_map(|entry| entry.ok())
                .filter(|entry| {
                    entry
                        .path()
                        .extension()
                        .map_or(false, |ext| ext == "py")
                })
                .map(|entry| entry.path().to_path_buf())
                .collect()
        };
        files.sort();

        if let Some(include) = &self.include {
            files.retain(|file| include.is_match(&file.to_string_lossy()));
        }
        files
    }
}

/// Counts outcomes across all modules.
fn summarize(modules: &[ModuleReport]) -> RunSummary {
    use crate::report::Outcome;

    let mut summary = RunSummary {
        total_modules: modules.len(),
        collected: 0,
        passed: 0,
        failed: 0,
        skipped: 0,
        module_errors: 0,
    };

    for module in modules {
        if module.load_error.is_some() {
            summary.module_errors += 1;
        }
        for item in &module.items {
            summary.collected += 1;
            match &item.outcome {
                Some(Outcome::Passed) => summary.passed += 1,
                Some(Outcome::Failed { .. }) => summary.failed += 1,
                Some(Outcome::Skipped { .. }) => summary.skipped += 1,
                None => {}
            }
        }
    }
    summary
}

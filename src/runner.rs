use crate::report::Outcome;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::process::Command;

/// The embedded invocation driver, passed to the interpreter via `-c`.
///
/// One driver process per module: the module is imported once, then each
/// requested function is called with zero arguments inside its own
/// try/except boundary. Because all calls share one interpreter, module
/// globals mutated by one invocation are observed by later siblings; this
/// is an accepted, documented risk, not something the engine isolates.
///
/// Results are JSON lines on the driver's real stdout; stdout produced by
/// the module import or the calls themselves is redirected into a sink so
/// it cannot corrupt the result stream.
const DRIVER: &str = r#"
import contextlib
import importlib.util
import io
import json
import os
import sys

module_path = sys.argv[1]
names = sys.argv[2:]
module_name = os.path.splitext(os.path.basename(module_path))[0]
out = sys.stdout
sink = io.StringIO()

def emit(record):
    print(json.dumps(record), file=out, flush=True)

sys.path.insert(0, os.path.dirname(os.path.abspath(module_path)))
spec = importlib.util.spec_from_file_location(module_name, module_path)
if spec is None or spec.loader is None:
    emit({"kind": "module_error", "error": "ImportError: cannot load " + module_path})
    sys.exit(0)
module = importlib.util.module_from_spec(spec)
sys.modules[module_name] = module
try:
    with contextlib.redirect_stdout(sink):
        spec.loader.exec_module(module)
except BaseException as exc:
    emit({"kind": "module_error", "error": type(exc).__name__ + ": " + str(exc)})
    sys.exit(0)

for name in names:
    fn = getattr(module, name, None)
    if not callable(fn):
        emit({"kind": "result", "name": name, "status": "failed",
              "error": "AttributeError: " + name + " is not callable after import"})
        continue
    try:
        with contextlib.redirect_stdout(sink):
            fn()
    except BaseException as exc:
        emit({"kind": "result", "name": name, "status": "failed",
              "error": type(exc).__name__ + ": " + str(exc)})
    else:
        emit({"kind": "result", "name": name, "status": "passed"})
"#;

/// One JSON line emitted by the driver.
#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum DriverRecord {
    /// The module itself failed to import.
    ModuleError { error: String },
    /// One per-function invocation result, in request order.
    Result {
        name: String,
        status: String,
        #[serde(default)]
        error: Option<String>,
    },
}

/// The outcome of driving one module.
#[derive(Debug)]
pub struct ModuleRun {
    /// Set when the module failed to import; no per-function outcomes then.
    pub load_error: Option<String>,
    /// One `(name, outcome)` pair per requested function, in request order.
    pub outcomes: Vec<(String, Outcome)>,
}

/// Invokes eligible callables through a Python subprocess.
pub struct PythonRunner {
    /// Interpreter executable, e.g. "python3".
    python: String,
}

impl PythonRunner {
    /// Creates a runner for the given interpreter executable.
    pub fn new(python: impl Into<String>) -> Self {
        Self {
            python: python.into(),
        }
    }

    /// Imports `file` once and invokes each of `names` with zero arguments.
    ///
    /// Invocation is strictly sequential, one call at a time, no retry. A
    /// failure to spawn the interpreter is a fatal run error, not a
    /// per-item outcome.
    pub fn run_module(&self, file: &Path, names: &[String]) -> Result<ModuleRun> {
        let mut run = ModuleRun {
            load_error: None,
            outcomes: Vec::new(),
        };
        if names.is_empty() {
            return Ok(run);
        }

        let output = Command::new(&self.python)
            .arg("-c")
            .arg(DRIVER)
            .arg(file)
            .args(names)
            .output()
            .with_context(|| format!("failed to spawn interpreter `{}`", self.python))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        for line in stdout.lines() {
            let record: DriverRecord = match serde_json::from_str(line) {
                Ok(record) => record,
                // Stray output that escaped the driver's redirection.
                Err(_) => continue,
            };
            match record {
                DriverRecord::ModuleError { error } => {
                    run.load_error = Some(error);
                    return Ok(run);
                }
                DriverRecord::Result {
                    name,
                    status,
                    error,
                } => {
                    let outcome = if status == "passed" {
                        Outcome::Passed
                    } else {
                        Outcome::Failed {
                            error: error
                                .unwrap_or_else(|| format!("unknown status `{}`", status)),
                        }
                    };
                    run.outcomes.push((name, outcome));
                }
            }
        }

        // A callable that kills the interpreter outright (os._exit, a
        // crashing extension) truncates the result stream. The first
        // unreported name is the one that died; the rest never ran.
        while run.outcomes.len() < names.len() {
            let name = names[run.outcomes.len()].clone();
            run.outcomes.push((
                name,
                Outcome::Failed {
                    error: format!(
                        "interpreter exited before reporting ({})",
                        output.status
                    ),
                },
            ));
        }

        Ok(run)
    }
}

/// Probes whether the given interpreter can be spawned at all.
///
/// Used by callers (and the test suite) to distinguish "no interpreter on
/// this machine" from a real failure.
pub fn python_available(python: &str) -> bool {
    Command::new(python)
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

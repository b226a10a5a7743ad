use crate::signature::{self, Eligibility};
use crate::utils::LineIndex;
use rustpython_ast::{self as ast, Stmt};
use rustpython_parser::{parse, Mode};
use std::fs;
use std::path::{Path, PathBuf};

/// One discovered top-level function, immutable after the scan pass.
///
/// The record identifies the callable by name and location; the callable
/// itself stays owned by the target module and is looked up by name at
/// invocation time.
#[derive(Debug, Clone)]
pub struct CallableRecord {
    /// Module name derived from the file stem (e.g. "mymodule").
    pub module: String,
    /// Path of the file the function is defined in.
    pub file: PathBuf,
    /// The simple function name (e.g. "my_function").
    pub name: String,
    /// The qualified name (e.g. "mymodule.my_function").
    pub qualified_name: String,
    /// 1-indexed line of the `def` statement.
    pub line: usize,
    /// Whether the function is declared `async def`.
    pub is_async: bool,
    /// Whether the body makes this a generator factory.
    pub is_generator: bool,
    /// Zero-argument invocation classification.
    pub eligibility: Eligibility,
}

/// The result of scanning one module file.
///
/// A module that cannot be read or parsed carries a load error and zero
/// records: an unimportable module is one top-level failure, never attributed
/// to any single function.
#[derive(Debug)]
pub struct ModuleScan {
    /// Module name derived from the file stem.
    pub module: String,
    /// Path of the scanned file.
    pub file: PathBuf,
    /// Discovered functions in source declaration order.
    pub records: Vec<CallableRecord>,
    /// Set when the module source could not be read or parsed.
    pub load_error: Option<String>,
}

/// Scans one Python file for top-level function definitions.
///
/// Pure introspection: the file is read and parsed, nothing is executed.
pub fn scan_file(path: &Path) -> ModuleScan {
    let module = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_default();

    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            return ModuleScan {
                module,
                file: path.to_path_buf(),
                records: Vec::new(),
                load_error: Some(format!("cannot read module: {}", err)),
            }
        }
    };

    scan_source(&source, path, &module)
}

/// Scans Python source text for top-level function definitions.
///
/// Only `def` / `async def` statements directly in the module body yield
/// records. Classes, imports, and assignments never do: a name merely
/// imported into or assigned in the module is not defined there, and
/// invoking third-party functions under the guise of testing this module
/// would produce failures attributable to code outside the user's control.
pub fn scan_source(source: &str, path: &Path, module: &str) -> ModuleScan {
    let mut scan = ModuleScan {
        module: module.to_string(),
        file: path.to_path_buf(),
        records: Vec::new(),
        load_error: None,
    };

    let tree = match parse(source, Mode::Module, &path.to_string_lossy()) {
        Ok(tree) => tree,
        Err(err) => {
            scan.load_error = Some(format!("SyntaxError: {}", err));
            return scan;
        }
    };

    let line_index = LineIndex::new(source);
    let ignored_lines = crate::utils::get_ignored_lines(source);

    if let ast::Mod::Module(module_node) = &tree {
        for stmt in &module_node.body {
            match stmt {
                Stmt::FunctionDef(node) => {
                    let line = line_index.line_index(node.range.start());
                    push_record(
                        &mut scan,
                        node.name.as_str(),
                        &node.args,
                        &node.body,
                        false,
                        line,
                        &ignored_lines,
                    );
                }
                Stmt::AsyncFunctionDef(node) => {
                    let line = line_index.line_index(node.range.start());
                    push_record(
                        &mut scan,
                        node.name.as_str(),
                        &node.args,
                        &node.body,
                        true,
                        line,
                        &ignored_lines,
                    );
                }
                // Everything else (classes, imports, assignments, control
                // flow) is not a direct function binding of this module.
                _ => {}
            }
        }
    }

    scan
}

fn push_record(
    scan: &mut ModuleScan,
    name: &str,
    args: &ast::Arguments,
    body: &[Stmt],
    is_async: bool,
    line: usize,
    ignored_lines: &std::collections::HashSet<usize>,
) {
    // Private helpers are not part of the module's surface.
    if name.starts_with('_') {
        return;
    }
    // Per-line opt-out for functions that are unsafe to call blindly.
    if ignored_lines.contains(&line) {
        return;
    }

    let qualified_name = if scan.module.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", scan.module, name)
    };

    scan.records.push(CallableRecord {
        module: scan.module.clone(),
        file: scan.file.clone(),
        name: name.to_string(),
        qualified_name,
        line,
        is_async,
        is_generator: signature::is_generator(body),
        eligibility: signature::classify(args),
    });
}

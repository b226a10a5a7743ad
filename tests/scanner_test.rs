use everyfunc_rs::scanner::{scan_file, scan_source};
use everyfunc_rs::signature::Eligibility;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tempfile::tempdir;

#[test]
fn test_scan_collects_only_top_level_defs() {
    let content = r#"
import os
from json import dumps

def first():
    return 1

CONSTANT = 42

class Helper:
    def method(self):
        pass

def second():
    return 2

alias = first
"#;
    let scan = scan_source(content, Path::new("mod.py"), "mod");

    assert!(scan.load_error.is_none());
    let names: Vec<&str> = scan.records.iter().map(|r| r.name.as_str()).collect();
    // Classes, imports, and assignments never yield records; methods are
    // not module-level bindings.
    assert_eq!(names, vec!["first", "second"]);
}

#[test]
fn test_scan_preserves_declaration_order() {
    let content = r#"
def charlie():
    pass

def alpha():
    pass

def bravo():
    pass
"#;
    let scan = scan_source(content, Path::new("mod.py"), "mod");

    let names: Vec<&str> = scan.records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["charlie", "alpha", "bravo"]);
    // Lines are 1-indexed and increasing.
    assert_eq!(scan.records[0].line, 2);
    assert!(scan.records[0].line < scan.records[1].line);
    assert!(scan.records[1].line < scan.records[2].line);
}

#[test]
fn test_scan_skips_private_names() {
    let content = r#"
def public():
    pass

def _private():
    pass

def __dunderish__():
    pass
"#;
    let scan = scan_source(content, Path::new("mod.py"), "mod");

    let names: Vec<&str> = scan.records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["public"]);
}

#[test]
fn test_scan_honors_pragma_opt_out() {
    let content = r#"
def safe():
    pass

def deletes_files():  # pragma: no everyfunc
    pass
"#;
    let scan = scan_source(content, Path::new("mod.py"), "mod");

    let names: Vec<&str> = scan.records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["safe"]);
}

#[test]
fn test_scan_records_eligibility() {
    let content = r#"
def no_args():
    return 1

def with_defaults(a=1, b=2):
    return a + b

def requires(x):
    return x
"#;
    let scan = scan_source(content, Path::new("mod.py"), "mod");

    assert_eq!(scan.records[0].eligibility, Eligibility::Eligible);
    assert_eq!(scan.records[1].eligibility, Eligibility::Eligible);
    assert_eq!(
        scan.records[2].eligibility,
        Eligibility::Ineligible {
            reason: "requires arguments".to_string()
        }
    );
}

#[test]
fn test_scan_records_async_and_generator_flags() {
    let content = r#"
def gen():
    yield 1

async def coro():
    pass

def plain():
    return None
"#;
    let scan = scan_source(content, Path::new("mod.py"), "mod");

    assert!(scan.records[0].is_generator);
    assert!(!scan.records[0].is_async);
    assert!(scan.records[1].is_async);
    assert!(!scan.records[2].is_generator);
}

#[test]
fn test_scan_qualified_names() {
    let content = "def func(): pass\n";
    let scan = scan_source(content, Path::new("pkg/mymodule.py"), "mymodule");

    assert_eq!(scan.records[0].qualified_name, "mymodule.func");
    assert_eq!(scan.records[0].module, "mymodule");
}

#[test]
fn test_syntax_error_is_a_module_load_error() {
    let content = "def broken(:\n    pass\n";
    let scan = scan_source(content, Path::new("mod.py"), "mod");

    // One top-level failure for the whole module, zero per-function records.
    assert!(scan.load_error.is_some());
    assert!(scan.load_error.as_ref().unwrap().contains("SyntaxError"));
    assert!(scan.records.is_empty());
}

#[test]
fn test_scan_file_derives_module_name() {
    let dir = tempdir().unwrap();
    let file_path = dir.path().join("submodule.py");
    let mut file = File::create(&file_path).unwrap();
    write!(file, "def func(): pass\n").unwrap();

    let scan = scan_file(&file_path);

    assert!(scan.load_error.is_none());
    assert_eq!(scan.module, "submodule");
    assert_eq!(scan.records[0].qualified_name, "submodule.func");
}

#[test]
fn test_scan_file_missing_file_is_load_error() {
    let dir = tempdir().unwrap();
    let scan = scan_file(&dir.path().join("nope.py"));

    assert!(scan.load_error.is_some());
    assert!(scan.records.is_empty());
}

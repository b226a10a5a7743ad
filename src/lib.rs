// Lib file to expose modules for testing and external usage.
// This file serves as the root for the library crate.

/// Module containing the core engine logic.
/// This includes the `Everyfunc` struct orchestrating the discover → classify
/// → invoke → report pipeline, and the `RunResult` data structures.
pub mod engine;

/// Module containing the module scanner.
/// This parses Python sources and enumerates top-level function definitions.
pub mod scanner;

/// Module containing the signature inspector.
/// This decides whether a callable can be invoked with zero arguments.
pub mod signature;

/// Module containing the test-item generator.
/// This maps discovered callables to uniquely identified test items.
pub mod items;

/// Module containing the invocation runner.
/// This drives a Python subprocess that calls each eligible function.
pub mod runner;

/// Module containing the outcome reporter.
/// This translates per-item outcomes into the pass/fail/skip report surface.
pub mod report;

/// Module containing utility functions.
/// This includes line-number mapping and the pragma opt-out detector.
pub mod utils;

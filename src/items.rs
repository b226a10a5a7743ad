use crate::report::Outcome;
use crate::scanner::CallableRecord;
use crate::signature::Eligibility;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

/// Skip reason for callables listed in the exclude configuration.
pub const EXCLUDED_BY_CONFIG: &str = "excluded by configuration";

/// One unit of work handed to the execution and reporting layer.
///
/// Wraps a discovered callable plus a session-unique identifier. Ineligible
/// and excluded callables still become items, pre-filled with a `Skipped`
/// outcome, so skip counts stay visible instead of silently absent.
#[derive(Debug, Clone, Serialize)]
pub struct TestItem {
    /// Session-unique identifier: `<file>::<module>.<function>`, with a
    /// `#n` suffix appended on collision.
    pub id: String,
    /// Module name derived from the file stem.
    pub module: String,
    /// Simple function name.
    pub name: String,
    /// Qualified name (`module.function`).
    pub qualified_name: String,
    /// Path of the defining file.
    pub file: PathBuf,
    /// 1-indexed line of the `def` statement.
    pub line: usize,
    /// Whether the function is declared `async def`.
    pub is_async: bool,
    /// Whether the call constructs a generator (the body never runs).
    pub is_generator: bool,
    /// Filled by the invocation runner; pre-filled for skipped items.
    /// `None` means not yet (or never) invoked, e.g. in collect-only mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
}

impl TestItem {
    /// Returns true if this item still awaits invocation.
    pub fn is_pending(&self) -> bool {
        self.outcome.is_none()
    }
}

/// Builds test items with session-unique identifiers.
///
/// The seen-map spans the whole run, so identifiers are unique across all
/// scanned modules. A redefined top-level function (same name twice in one
/// file) gets a numeric suffix on its second occurrence.
pub struct ItemGenerator {
    seen: HashMap<String, usize>,
}

impl ItemGenerator {
    /// Creates a generator with an empty identifier namespace.
    pub fn new() -> Self {
        Self {
            seen: HashMap::new(),
        }
    }

    /// Maps one callable record to exactly one test item.
    pub fn build(&mut self, record: &CallableRecord, exclude_names: &HashSet<String>) -> TestItem {
        let base = format!("{}::{}", record.file.display(), record.qualified_name);
        let count = self.seen.entry(base.clone()).or_insert(0);
        *count += 1;
        let id = if *count == 1 {
            base
        } else {
            format!("{}#{}", base, count)
        };

        // Exclusion wins over eligibility: an excluded callable is never
        // invoked even when it could be.
        let outcome = if exclude_names.contains(&record.name)
            || exclude_names.contains(&record.qualified_name)
        {
            Some(Outcome::Skipped {
                reason: EXCLUDED_BY_CONFIG.to_string(),
            })
        } else {
            match &record.eligibility {
                Eligibility::Eligible => None,
                Eligibility::Ineligible { reason } => Some(Outcome::Skipped {
                    reason: reason.clone(),
                }),
            }
        };

        TestItem {
            id,
            module: record.module.clone(),
            name: record.name.clone(),
            qualified_name: record.qualified_name.clone(),
            file: record.file.clone(),
            line: record.line,
            is_async: record.is_async,
            is_generator: record.is_generator,
            outcome,
        }
    }
}

impl Default for ItemGenerator {
    fn default() -> Self {
        Self::new()
    }
}

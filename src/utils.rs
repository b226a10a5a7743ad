use lazy_static::lazy_static;
use regex::Regex;
use rustpython_ast::TextSize;
use std::collections::HashSet;

lazy_static! {
    // Matches "# pragma: no everyfunc" with flexible whitespace.
    // Lines carrying this comment are excluded from discovery entirely.
    static ref PRAGMA_RE: Regex = Regex::new(r"#\s*pragma:\s*no\s+everyfunc").unwrap();
}

/// A utility struct to convert byte offsets to line numbers.
///
/// The AST parser reports positions as byte offsets, but test item
/// identifiers and reports use 1-indexed line numbers.
pub struct LineIndex {
    /// Stores the byte index of the start of each line.
    line_starts: Vec<usize>,
}

impl LineIndex {
    /// Creates a new `LineIndex` by scanning the source code for newlines.
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, ch) in source.char_indices() {
            if ch == '\n' {
                // Record the start of the next line (current newline index + 1)
                line_starts.push(i + 1);
            }
        }
        Self { line_starts }
    }

    /// Converts a `TextSize` (byte offset) to a 1-indexed line number.
    pub fn line_index(&self, offset: TextSize) -> usize {
        let offset = offset.to_usize();
        // Binary search to find which line range the offset falls into.
        match self.line_starts.binary_search(&offset) {
            Ok(line) => line + 1,
            Err(line) => line,
        }
    }
}

/// Detects lines with a `# pragma: no everyfunc` comment.
///
/// Returns a set of line numbers (1-indexed) whose definitions must never be
/// turned into test items. Blanket invocation is unsafe for functions with
/// external side effects, so users need a per-line opt-out.
pub fn get_ignored_lines(source: &str) -> HashSet<usize> {
    source
        .lines()
        .enumerate()
        .filter(|(_, line)| PRAGMA_RE.is_match(line))
        .map(|(i, _)| i + 1)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pragma_detection() {
        let source = r#"
def safe_function():
    return 42

def dangerous_function():  # pragma: no everyfunc
    return "ignored"

def also_ignored():  #pragma:  no  everyfunc
    pass
"#;
        let ignored = get_ignored_lines(source);

        assert!(ignored.contains(&5), "Should detect pragma on line 5");
        assert!(ignored.contains(&8), "Should detect pragma on line 8");
        assert_eq!(ignored.len(), 2, "Should find exactly 2 pragma lines");
    }

    #[test]
    fn test_no_pragmas() {
        let source = r#"
def regular_function():
    return 42
"#;
        let ignored = get_ignored_lines(source);
        assert_eq!(ignored.len(), 0, "Should find no pragma lines");
    }

    #[test]
    fn test_line_index_maps_offsets() {
        let source = "a = 1\nb = 2\nc = 3\n";
        let index = LineIndex::new(source);

        assert_eq!(index.line_index(TextSize::new(0)), 1);
        assert_eq!(index.line_index(TextSize::new(6)), 2);
        assert_eq!(index.line_index(TextSize::new(12)), 3);
    }
}

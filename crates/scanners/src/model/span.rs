use serde::{Deserialize, Serialize};

/// Source region of a syntax node. Lines are 1-based, columns 0-based,
/// matching what proc-macro2 reports for fallback spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start_line: usize,
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
}

impl Span {
    pub fn new(start_line: usize, start_column: usize, end_line: usize, end_column: usize) -> Self {
        Self {
            start_line,
            start_column,
            end_line,
            end_column,
        }
    }

    /// Interval containment over (line, column) pairs. Used for the
    /// structural checks where textual equality breaks down (a `&info.sender`
    /// argument prints differently from the `info.sender` access inside it,
    /// but its span still encloses it).
    pub fn contains(&self, other: &Span) -> bool {
        (self.start_line, self.start_column) <= (other.start_line, other.start_column)
            && (self.end_line, self.end_column) >= (other.end_line, other.end_column)
    }

    pub fn merge(&self, other: &Span) -> Span {
        let start = (self.start_line, self.start_column).min((other.start_line, other.start_column));
        let end = (self.end_line, self.end_column).max((other.end_line, other.end_column));
        Span::new(start.0, start.1, end.0, end.1)
    }
}

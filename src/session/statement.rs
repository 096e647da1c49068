/*!
 * Statement completeness detection for line-by-line ingestion.
 */

/// Decides whether buffered lines form a statement that can be translated
pub trait StatementDetector: Send + Sync {
    /// Whether `text` is a complete statement
    fn is_complete(&self, text: &str) -> bool;
}

/// Heuristic detector based on delimiter balance
///
/// A statement is complete when it is not blank, does not open a block
/// (trailing `:`), does not continue on the next line (trailing `\`) and has
/// no unclosed `(`, `[` or `{`.
///
/// Delimiters are counted on the raw text. Brackets inside string literals
/// count too, and a triple-quoted string spanning several lines is reported
/// complete as soon as its brackets happen to balance.
#[derive(Debug, Clone, Copy, Default)]
pub struct BalancedDelimiters;

impl StatementDetector for BalancedDelimiters {
    fn is_complete(&self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() || text.ends_with(':') || text.ends_with('\\') {
            return false;
        }

        let unclosed = |open: char, close: char| {
            let opened = text.chars().filter(|c| *c == open).count();
            let closed = text.chars().filter(|c| *c == close).count();
            opened > closed
        };
        !(unclosed('(', ')') || unclosed('[', ']') || unclosed('{', '}'))
    }
}

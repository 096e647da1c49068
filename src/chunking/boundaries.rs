/*!
 * Line indexing and top-level statement boundary detection.
 *
 * Boundaries come from a tree-sitter Python parse of the whole input: every
 * named child of the module node starts a new splittable unit. Units are
 * whole-line ranges, so a chunk cut at a unit boundary never ends mid-line.
 */

use log::debug;
use tree_sitter::{Node, Parser, Tree};

/// Byte offsets of every line start in a text
#[derive(Debug, Clone)]
pub(crate) struct LineIndex {
    starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    pub(crate) fn new(text: &str) -> Self {
        let mut starts = Vec::new();
        let mut offset = 0;
        for line in text.split_inclusive('\n') {
            starts.push(offset);
            offset += line.len();
        }
        Self {
            starts,
            len: text.len(),
        }
    }

    pub(crate) fn line_count(&self) -> usize {
        self.starts.len()
    }

    /// Byte range of a 0-based line, including its newline
    pub(crate) fn line_span(&self, line: usize) -> (usize, usize) {
        let start = self.starts.get(line).copied().unwrap_or(self.len);
        let end = self.starts.get(line + 1).copied().unwrap_or(self.len);
        (start, end)
    }

    /// 0-based line containing a byte offset
    pub(crate) fn line_at(&self, byte: usize) -> usize {
        self.starts
            .partition_point(|&start| start <= byte)
            .saturating_sub(1)
    }

    /// 1-based inclusive line range covered by a non-empty byte range
    pub(crate) fn line_range(&self, start_byte: usize, end_byte: usize) -> (usize, usize) {
        let first = self.line_at(start_byte);
        let last = self.line_at(end_byte.saturating_sub(1).max(start_byte));
        (first + 1, last + 1)
    }
}

/// Why boundary-aware splitting was abandoned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FallbackReason {
    SyntaxError,
    OversizedBoundary,
    ParserUnavailable,
}

impl FallbackReason {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::SyntaxError => "syntax_error",
            Self::OversizedBoundary => "oversized_boundary",
            Self::ParserUnavailable => "parser_unavailable",
        }
    }
}

/// A run of whole lines starting at one top-level statement
#[derive(Debug, Clone)]
pub(crate) struct BoundaryUnit {
    pub(crate) first_line: usize,
    pub(crate) last_line: usize,
    pub(crate) kind: &'static str,
}

impl BoundaryUnit {
    pub(crate) fn line_count(&self) -> usize {
        self.last_line - self.first_line + 1
    }

    pub(crate) fn byte_span(&self, index: &LineIndex) -> (usize, usize) {
        (index.line_span(self.first_line).0, index.line_span(self.last_line).1)
    }

    pub(crate) fn is_definition(&self) -> bool {
        matches!(self.kind, "function" | "class")
    }
}

fn parse_tree(text: &str) -> Option<Tree> {
    let mut parser = Parser::new();
    if parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .is_err()
    {
        return None;
    }
    parser.parse(text, None)
}

/// Map a top-level node kind to the boundary kind recorded on chunks
fn boundary_kind(node: Node<'_>) -> &'static str {
    match node.kind() {
        "function_definition" => "function",
        "class_definition" => "class",
        "decorated_definition" => node
            .child_by_field_name("definition")
            .map(boundary_kind)
            .unwrap_or("function"),
        "import_statement" | "import_from_statement" | "future_import_statement" => "import",
        "comment" => "comment",
        _ => "statement",
    }
}

/// Split the input into top-level statement units
///
/// Each unit extends from the line where its statement starts to the line
/// before the next statement starts, so blank lines and trailing comments are
/// kept with the statement above them. The first unit always starts at line 0.
pub(crate) fn top_level_units(
    text: &str,
    index: &LineIndex,
) -> Result<Vec<BoundaryUnit>, FallbackReason> {
    let tree = parse_tree(text).ok_or(FallbackReason::ParserUnavailable)?;
    let root = tree.root_node();
    if root.has_error() {
        debug!("Syntax tree contains errors, boundary splitting disabled");
        return Err(FallbackReason::SyntaxError);
    }

    let total_lines = index.line_count();
    if total_lines == 0 {
        return Ok(Vec::new());
    }

    let mut starts: Vec<(usize, &'static str)> = Vec::new();
    let mut cursor = root.walk();
    for child in root.named_children(&mut cursor) {
        let row = child.start_position().row.min(total_lines - 1);
        match starts.last() {
            Some(&(last_row, _)) if last_row >= row => {}
            _ => starts.push((row, boundary_kind(child))),
        }
    }

    if starts.is_empty() {
        return Ok(vec![BoundaryUnit {
            first_line: 0,
            last_line: total_lines - 1,
            kind: "statement",
        }]);
    }
    starts[0].0 = 0;

    let units = starts
        .iter()
        .enumerate()
        .map(|(i, &(first_line, kind))| {
            let last_line = starts
                .get(i + 1)
                .map(|&(next, _)| next - 1)
                .unwrap_or(total_lines - 1);
            BoundaryUnit {
                first_line,
                last_line,
                kind,
            }
        })
        .collect();
    Ok(units)
}

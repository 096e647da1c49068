/*!
 * Reference parser and assembler based on line heuristics.
 *
 * `LineClassifierParser` classifies each line as code, comment or natural
 * language using Python-shaped patterns, then groups consecutive lines of the
 * same kind into blocks. It is deliberately simple: the production grammar is
 * supplied by the embedding application through the `BlockParser` trait.
 */

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use super::{Block, BlockParser, BlockType, CodeAssembler, ParseOutcome};

const CODE_PATTERNS: &[&str] = &[
    // Block openers
    r"^\s*(async\s+)?(def|class)\s+\w+.*:\s*(#.*)?$",
    r"^\s*(if|elif|while|for|with|except|async\s+for|async\s+with)\b.*:\s*(#.*)?$",
    r"^\s*(else|try|finally)\s*:\s*(#.*)?$",
    // Imports
    r"^\s*import\s+[\w\.]+(\s+as\s+\w+)?(\s*,\s*[\w\.]+(\s+as\s+\w+)?)*\s*$",
    r"^\s*from\s+[\w\.]+\s+import\s+",
    // Simple statements
    r"^\s*(pass|break|continue|return)\s*$",
    r#"^\s*(return|raise|yield|await|del|assert)\s+[\w\.\[\]\(\)'"]+(\s*[-+*/%<>=!,&|]+\s*[\w\.\[\]\(\)'"]+)*\s*[\(\[\{,]?\s*$"#,
    // Assignments
    r"^\s*[A-Za-z_][\w\.]*(\[[^\]]*\])?\s*(=|\+=|-=|\*=|/=|//=|%=|\|=|&=)\s*[^=\s]",
    r"^\s*[A-Za-z_][\w\.]*(\s*,\s*[A-Za-z_][\w\.]*)+\s*=\s*[^=\s]",
    // Calls and decorators
    r"^\s*[A-Za-z_][\w\.]*\(.*[\)\(,\[\{]\s*$",
    r"^\s*@[\w\.]+",
    // Closing delimiters of a multi-line expression
    r"^\s*[\)\]\}]+\s*[,:]?\s*$",
];

static CODE_LINE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    CODE_PATTERNS
        .iter()
        .filter_map(|pattern| Regex::new(pattern).ok())
        .collect()
});

static IMPORT_LINE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(import\s+\S|from\s+\S+\s+import\s)").ok());

/// Net bracket depth of a text, ignoring string literals and comments
///
/// Returns `None` when a closing bracket appears without a matching opener.
pub fn delimiter_depth(text: &str) -> Option<usize> {
    let mut depth: usize = 0;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for line in text.lines() {
        for c in line.chars() {
            if let Some(q) = quote {
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == q {
                    quote = None;
                }
                continue;
            }
            match c {
                '#' => break,
                '\'' | '"' => quote = Some(c),
                '(' | '[' | '{' => depth += 1,
                ')' | ']' | '}' => depth = depth.checked_sub(1)?,
                _ => {}
            }
        }
        // Single-line string literals end with the line
        quote = None;
        escaped = false;
    }
    Some(depth)
}

/// Line-based block classifier
#[derive(Debug, Clone, Default)]
pub struct LineClassifierParser;

impl LineClassifierParser {
    /// Create a new parser
    pub fn new() -> Self {
        Self
    }

    fn classify(line: &str) -> BlockType {
        let trimmed = line.trim_start();
        if trimmed.starts_with('#') {
            BlockType::Comment
        } else if CODE_LINE.iter().any(|re| re.is_match(line)) {
            BlockType::Code
        } else if trimmed.contains('`') {
            BlockType::Mixed
        } else {
            BlockType::English
        }
    }
}

struct OpenBlock {
    kind: BlockType,
    lines: Vec<String>,
    first: usize,
    last: usize,
    pending_blanks: usize,
}

impl OpenBlock {
    fn into_block(self) -> Block {
        Block::new(self.kind, self.lines.join("\n"), (self.first, self.last))
    }
}

impl BlockParser for LineClassifierParser {
    fn parse(&self, text: &str) -> ParseOutcome {
        let mut blocks = Vec::new();
        let mut current: Option<OpenBlock> = None;

        for (i, line) in text.lines().enumerate() {
            let number = i + 1;

            if line.trim().is_empty() {
                match current.as_mut() {
                    Some(open) if open.kind == BlockType::Code => open.pending_blanks += 1,
                    _ => {
                        if let Some(open) = current.take() {
                            blocks.push(open.into_block());
                        }
                    }
                }
                continue;
            }

            let indented = line.starts_with(' ') || line.starts_with('\t');
            let kind = match current.as_ref() {
                // Inside an open bracket or an indented body of a code block
                Some(open)
                    if open.kind == BlockType::Code
                        && (indented || delimiter_depth(&open.lines.join("\n")) != Some(0)) =>
                {
                    BlockType::Code
                }
                _ => Self::classify(line),
            };

            match current.as_mut() {
                Some(open)
                    if open.kind == kind && (open.pending_blanks == 0 || (kind == BlockType::Code && indented)) =>
                {
                    for _ in 0..open.pending_blanks {
                        open.lines.push(String::new());
                    }
                    open.pending_blanks = 0;
                    open.lines.push(line.to_string());
                    open.last = number;
                }
                _ => {
                    if let Some(open) = current.take() {
                        blocks.push(open.into_block());
                    }
                    current = Some(OpenBlock {
                        kind,
                        lines: vec![line.to_string()],
                        first: number,
                        last: number,
                        pending_blanks: 0,
                    });
                }
            }
        }
        if let Some(open) = current.take() {
            blocks.push(open.into_block());
        }

        let errors: Vec<String> = blocks
            .iter()
            .filter(|b| matches!(b.kind, BlockType::Code | BlockType::Mixed))
            .filter(|b| delimiter_depth(&b.content) != Some(0))
            .map(|b| {
                format!(
                    "Unbalanced delimiters in lines {}-{}",
                    b.line_numbers.0, b.line_numbers.1
                )
            })
            .collect();

        ParseOutcome {
            success: errors.is_empty(),
            blocks,
            errors,
            warnings: Vec::new(),
        }
    }

    fn identify_blocks(&self, text: &str) -> Vec<String> {
        let mut blocks = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        let mut blank_run = false;

        for line in text.lines() {
            if line.trim().is_empty() {
                blank_run = true;
                if !current.is_empty() {
                    current.push(line);
                }
                continue;
            }
            let indented = line.starts_with(' ') || line.starts_with('\t');
            if blank_run && !indented && !current.is_empty() {
                blocks.push(current.join("\n").trim_end().to_string());
                current.clear();
            }
            blank_run = false;
            current.push(line);
        }
        if !current.is_empty() {
            blocks.push(current.join("\n").trim_end().to_string());
        }
        blocks
    }
}

/// Assembler that joins blocks and hoists de-duplicated imports to the top
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportHoistingAssembler;

impl CodeAssembler for ImportHoistingAssembler {
    fn assemble(&self, blocks: &[Block]) -> String {
        let mut imports: Vec<&str> = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        let mut sections: Vec<String> = Vec::new();

        for block in blocks {
            let mut body: Vec<&str> = Vec::new();
            for line in block.content.lines() {
                let is_import = block.kind == BlockType::Code
                    && IMPORT_LINE
                        .as_ref()
                        .is_some_and(|re| re.is_match(line));
                if is_import {
                    let line = line.trim_end();
                    if seen.insert(line) {
                        imports.push(line);
                    }
                } else {
                    body.push(line);
                }
            }

            let section = body.join("\n");
            let section = section.trim_matches('\n').trim_end();
            if !section.is_empty() {
                sections.push(section.to_string());
            }
        }

        let mut output = String::new();
        if !imports.is_empty() {
            output.push_str(&imports.join("\n"));
            output.push('\n');
            if !sections.is_empty() {
                output.push('\n');
            }
        }
        if !sections.is_empty() {
            output.push_str(&sections.join("\n\n"));
            output.push('\n');
        }
        output
    }
}

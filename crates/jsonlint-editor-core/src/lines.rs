//! Line model: logical lines of the buffer and their rendered projection.

use crate::highlight::{TokenKind, line_markup, tokenize_line};

/// One `\n`-separated line of the logical buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    pub index: usize,
    pub text: String,
    pub leading_whitespace: String,
}

impl LogicalLine {
    pub fn new(index: usize, text: &str) -> Self {
        let leading_whitespace = text
            .chars()
            .take_while(|c| *c == ' ' || *c == '\t')
            .collect();
        Self {
            index,
            text: text.to_string(),
            leading_whitespace,
        }
    }
}

/// Split text into logical lines. Always yields at least one line.
pub fn logical_lines(text: &str) -> Vec<LogicalLine> {
    text.split('\n')
        .enumerate()
        .map(|(i, line)| LogicalLine::new(i, line))
        .collect()
}

/// A line as shown on the surface.
///
/// `markup` is the inner markup of the line container. It differs from the
/// highlighted text only while the line is a collapsed fold opener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLine {
    pub index: usize,
    pub text: String,
    pub markup: String,
    /// The bracket that would open a fold here, if any.
    pub fold_opener: Option<char>,
    pub is_collapsed: bool,
    pub is_hidden: bool,
}

impl RenderedLine {
    pub fn from_logical(line: &LogicalLine) -> Self {
        Self {
            index: line.index,
            text: line.text.clone(),
            markup: line_markup(&line.text),
            fold_opener: unmatched_opener(&line.text),
            is_collapsed: false,
            is_hidden: false,
        }
    }

    pub fn is_foldable(&self) -> bool {
        self.fold_opener.is_some()
    }

    /// Full line container markup.
    pub fn to_html(&self) -> String {
        let class = match (self.is_collapsed, self.is_hidden) {
            (false, false) => "line",
            (true, false) => "line collapsed",
            (false, true) => "line hidden",
            (true, true) => "line collapsed hidden",
        };
        let inner = if self.markup.is_empty() {
            "<br>"
        } else {
            self.markup.as_str()
        };
        format!(
            "<div class=\"{class}\" data-line=\"{}\">{inner}</div>",
            self.index
        )
    }
}

/// The last opening bracket on the line that is not closed on the same line.
///
/// Only bracket tokens count, so brackets inside strings are ignored. A
/// closer with nothing open is skipped, depth never goes negative.
pub fn unmatched_opener(text: &str) -> Option<char> {
    let chars: Vec<char> = text.chars().collect();
    let mut stack = Vec::new();
    for token in tokenize_line(text) {
        if token.kind != TokenKind::Brace {
            continue;
        }
        match chars[token.range.start] {
            c @ ('{' | '[') => stack.push(c),
            _ => {
                stack.pop();
            }
        }
    }
    stack.pop()
}

/// The closer matching a fold opener bracket.
pub fn closer_for(opener: char) -> char {
    match opener {
        '[' => ']',
        _ => '}',
    }
}

/// Depth steps of `opener`-kind brackets on one line, in order: `+1` for
/// each opener and `-1` for each matching closer, with the bracket's char
/// position.
pub(crate) fn bracket_steps(text: &str, opener: char) -> Vec<(usize, i32)> {
    let closer = closer_for(opener);
    let chars: Vec<char> = text.chars().collect();
    tokenize_line(text)
        .into_iter()
        .filter(|t| t.kind == TokenKind::Brace)
        .filter_map(|t| match chars[t.range.start] {
            c if c == opener => Some((t.range.start, 1)),
            c if c == closer => Some((t.range.start, -1)),
            _ => None,
        })
        .collect()
}

/// The rendered line set for one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineView {
    lines: Vec<RenderedLine>,
}

impl LineView {
    /// Highlight `text` into a fresh view with nothing folded.
    pub fn from_text(text: &str) -> Self {
        let lines = logical_lines(text)
            .iter()
            .map(RenderedLine::from_logical)
            .collect();
        Self { lines }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&RenderedLine> {
        self.lines.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut RenderedLine> {
        self.lines.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RenderedLine> {
        self.lines.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut RenderedLine> {
        self.lines.iter_mut()
    }

    /// The line texts joined with `\n`. Always equals the buffer.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(&line.text);
        }
        out
    }

    /// Markup for the whole editable surface.
    pub fn to_html(&self) -> String {
        self.lines.iter().map(RenderedLine::to_html).collect()
    }

    /// Nearest line at or before `index` that is not hidden.
    pub fn visible_at_or_before(&self, index: usize) -> Option<usize> {
        (0..=index.min(self.lines.len().saturating_sub(1)))
            .rev()
            .find(|&i| !self.lines[i].is_hidden)
    }
}

use miette::Diagnostic;
use thiserror::Error;

/// Where and why a parse failed.
///
/// `offset` is a char offset into the parsed text; `line` and `column` are
/// 1-based and always agree with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    pub message: String,
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl ParseFailure {
    /// Build a failure from a char offset, deriving line and column.
    pub fn at_offset(text: &str, message: impl Into<String>, offset: usize) -> Self {
        let mut line = 1;
        let mut column = 1;
        for (i, c) in text.chars().enumerate() {
            if i == offset {
                break;
            }
            if c == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        let offset = offset.min(text.chars().count());
        Self {
            message: message.into(),
            offset,
            line,
            column,
        }
    }

    /// Build a failure from a 1-based line/column pair as reported by a parser.
    ///
    /// A column of 0 (reported at end of input on some parsers) is treated as
    /// the start of the line.
    pub fn at_line_column(
        text: &str,
        message: impl Into<String>,
        line: usize,
        column: usize,
    ) -> Self {
        let mut offset = 0;
        let mut current = 1;
        let mut line_len = 0;
        for segment in text.split('\n') {
            line_len = segment.chars().count();
            if current == line.max(1) {
                break;
            }
            offset += line_len + 1;
            current += 1;
        }
        let within = column.saturating_sub(1).min(line_len);
        Self::at_offset(text, message, offset + within)
    }
}

impl std::fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} at line {}, column {}",
            self.message, self.line, self.column
        )
    }
}

/// Every failure a session command can produce.
///
/// None of these escape [`Session::run`](crate::Session::run); they are turned
/// into error notices at that boundary.
#[derive(Debug, Error, Diagnostic)]
pub enum EditorError {
    #[error("Editor is empty")]
    #[diagnostic(
        code(jsonlint::empty_input),
        help("type or paste some JSON before running this command")
    )]
    EmptyInput,

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(jsonlint::parse))]
    Parse(ParseFailure),

    #[error("Invalid JSON: {message}")]
    #[diagnostic(code(jsonlint::repair), help("fix the reported problem by hand"))]
    RepairFailure { message: String },

    #[error("Filter error: {message}")]
    #[diagnostic(code(jsonlint::filter), help("check the query syntax"))]
    FilterFailure { message: String },

    #[error("No saved file named {name}")]
    #[diagnostic(code(jsonlint::storage::miss))]
    StorageMiss { name: String },

    #[error("Storage error: {0}")]
    #[diagnostic(code(jsonlint::storage))]
    Storage(String),

    #[error("Failed to copy content")]
    #[diagnostic(code(jsonlint::clipboard))]
    ClipboardFailure(String),

    #[error("Invalid share link")]
    #[diagnostic(
        code(jsonlint::share::token),
        help("the link may have been truncated when it was copied")
    )]
    InvalidShareToken,

    #[error("Invalid file name")]
    #[diagnostic(code(jsonlint::storage::name), help("file names cannot be empty"))]
    InvalidFileName,

    #[error("Platform error: {0}")]
    #[diagnostic(code(jsonlint::platform))]
    Platform(String),
}

impl From<crate::platform::PlatformError> for EditorError {
    fn from(err: crate::platform::PlatformError) -> Self {
        EditorError::Platform(err.0)
    }
}

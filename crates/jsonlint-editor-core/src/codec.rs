//! JSON parse/serialize, repair and filter collaborators.

use serde::Serialize;
use serde_json::Value;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::error::ParseFailure;

/// Parses and serializes JSON for the session.
pub trait JsonCodec {
    fn parse(&self, text: &str) -> Result<Value, ParseFailure>;

    /// Serialize `value`. `Some(n)` pretty prints with `n` spaces per level,
    /// `None` writes the compact form.
    fn serialize(&self, value: &Value, indent: Option<usize>) -> String;
}

/// [`JsonCodec`] over `serde_json`. Object keys keep their source order.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerdeJsonCodec;

impl JsonCodec for SerdeJsonCodec {
    fn parse(&self, text: &str) -> Result<Value, ParseFailure> {
        serde_json::from_str(text).map_err(|err| {
            let full = err.to_string();
            let suffix = format!(" at line {} column {}", err.line(), err.column());
            let message = full.strip_suffix(&suffix).unwrap_or(&full);
            let column = char_column(text, err.line(), err.column());
            ParseFailure::at_line_column(text, message, err.line(), column)
        })
    }

    fn serialize(&self, value: &Value, indent: Option<usize>) -> String {
        let Some(width) = indent else {
            return value.to_string();
        };
        let indent = " ".repeat(width);
        let mut out = Vec::new();
        let mut ser = Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(indent.as_bytes()));
        if let Err(err) = value.serialize(&mut ser) {
            tracing::warn!(target: "jsonlint::codec", %err, "pretty print failed, writing compact json");
            return value.to_string();
        }
        String::from_utf8(out).unwrap_or_else(|err| String::from_utf8_lossy(err.as_bytes()).into_owned())
    }
}

/// Turn serde_json's 1-based byte column into a 1-based char column.
fn char_column(text: &str, line: usize, byte_column: usize) -> usize {
    if byte_column == 0 {
        return 0;
    }
    let Some(line_text) = text.split('\n').nth(line.saturating_sub(1)) else {
        return byte_column;
    };
    let mut end = (byte_column - 1).min(line_text.len());
    while !line_text.is_char_boundary(end) {
        end -= 1;
    }
    line_text[..end].chars().count() + 1
}

/// Best-effort repair of malformed JSON.
pub trait Repairer {
    /// Repaired text, or a message saying why the input could not be repaired.
    fn repair(&self, text: &str) -> Result<String, String>;
}

impl<F> Repairer for F
where
    F: Fn(&str) -> Result<String, String>,
{
    fn repair(&self, text: &str) -> Result<String, String> {
        self(text)
    }
}

/// Repairer for hosts without one. Always fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRepair;

impl Repairer for NoRepair {
    fn repair(&self, _text: &str) -> Result<String, String> {
        Err("no repair tool available".into())
    }
}

/// Runs a jq-style query over a JSON document.
pub trait JsonFilter {
    /// The query's result, `None` when it produced nothing, or a message
    /// saying why it failed.
    fn apply(&self, text: &str, query: &str) -> Result<Option<Value>, String>;
}

impl<F> JsonFilter for F
where
    F: Fn(&str, &str) -> Result<Option<Value>, String>,
{
    fn apply(&self, text: &str, query: &str) -> Result<Option<Value>, String> {
        self(text, query)
    }
}

/// Filter for hosts without one. Always fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFilter;

impl JsonFilter for NoFilter {
    fn apply(&self, _text: &str, _query: &str) -> Result<Option<Value>, String> {
        Err("no filter available".into())
    }
}

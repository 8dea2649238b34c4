//! JSON syntax highlighting.
//!
//! Each line is scanned on its own by a small state machine with a fixed
//! priority: string, bracket, literal, number, comma. Anything else is plain
//! text. The scan never fails; malformed input still produces markup whose
//! text content is exactly the input.

use std::ops::Range;

use crate::lines::LineView;

/// Semantic class of a recognized token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    String,
    /// A string followed on the same line by optional spaces and `:`.
    Key,
    Number,
    Boolean,
    Null,
    Brace,
    Comma,
}

impl TokenKind {
    /// CSS class suffix for this token.
    pub fn class(self) -> &'static str {
        match self {
            TokenKind::String => "string",
            TokenKind::Key => "key",
            TokenKind::Number => "number",
            TokenKind::Boolean => "boolean",
            TokenKind::Null => "null",
            TokenKind::Brace => "brace",
            TokenKind::Comma => "comma",
        }
    }
}

/// A recognized token: its class and its char range within the line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub range: Range<usize>,
}

impl Token {
    fn new(kind: TokenKind, start: usize, end: usize) -> Self {
        Self {
            kind,
            range: start..end,
        }
    }
}

/// Tokenize one line of JSON.
///
/// Ranges are char offsets into `line`, ordered and non-overlapping. Text
/// between tokens is plain.
pub fn tokenize_line(line: &str) -> Vec<Token> {
    let chars: Vec<char> = line.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '"' => {
                let end = scan_string(&chars, i);
                let kind = if followed_by_colon(&chars, end) {
                    TokenKind::Key
                } else {
                    TokenKind::String
                };
                tokens.push(Token::new(kind, i, end));
                i = end;
            }
            '{' | '}' | '[' | ']' => {
                tokens.push(Token::new(TokenKind::Brace, i, i + 1));
                i += 1;
            }
            c if is_word_start(c) => {
                let end = scan_word(&chars, i);
                let word: String = chars[i..end].iter().collect();
                match word.as_str() {
                    "true" | "false" => tokens.push(Token::new(TokenKind::Boolean, i, end)),
                    "null" => tokens.push(Token::new(TokenKind::Null, i, end)),
                    _ => {}
                }
                i = end;
            }
            '-' | '0'..='9' if at_boundary(&chars, i) => match scan_number(&chars, i) {
                Some(end) => {
                    tokens.push(Token::new(TokenKind::Number, i, end));
                    i = end;
                }
                None => i += 1,
            },
            ',' => {
                tokens.push(Token::new(TokenKind::Comma, i, i + 1));
                i += 1;
            }
            _ => i += 1,
        }
    }

    tokens
}

/// Inner markup for a single line: escaped text with token spans.
pub fn line_markup(line: &str) -> String {
    let chars: Vec<char> = line.chars().collect();
    let mut out = String::with_capacity(line.len() * 2);
    let mut cursor = 0;

    for token in tokenize_line(line) {
        if token.range.start > cursor {
            push_escaped(&mut out, &chars[cursor..token.range.start]);
        }
        out.push_str("<span class=\"tok-");
        out.push_str(token.kind.class());
        out.push_str("\">");
        push_escaped(&mut out, &chars[token.range.clone()]);
        out.push_str("</span>");
        cursor = token.range.end;
    }
    if cursor < chars.len() {
        push_escaped(&mut out, &chars[cursor..]);
    }

    out
}

/// Highlight a whole buffer into line-container markup.
///
/// Pure and total: the same text always yields the same markup, and
/// stripping the markup gives back the text.
pub fn highlight(text: &str) -> String {
    LineView::from_text(text).to_html()
}

fn push_escaped(out: &mut String, chars: &[char]) {
    for &c in chars {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
}

/// End (exclusive) of a string starting at the quote at `start`.
///
/// Unterminated strings run to the end of the line.
fn scan_string(chars: &[char], start: usize) -> usize {
    let mut j = start + 1;
    while j < chars.len() {
        match chars[j] {
            '\\' => j += 2,
            '"' => return j + 1,
            _ => j += 1,
        }
    }
    chars.len()
}

fn followed_by_colon(chars: &[char], mut j: usize) -> bool {
    while j < chars.len() && (chars[j] == ' ' || chars[j] == '\t') {
        j += 1;
    }
    chars.get(j) == Some(&':')
}

fn is_word_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn scan_word(chars: &[char], start: usize) -> usize {
    let mut j = start;
    while j < chars.len() && (chars[j].is_alphanumeric() || chars[j] == '_') {
        j += 1;
    }
    j
}

/// A number may not continue an identifier or another number.
fn at_boundary(chars: &[char], i: usize) -> bool {
    match i.checked_sub(1).map(|p| chars[p]) {
        None => true,
        Some(p) => !(p.is_alphanumeric() || p == '_' || p == '.'),
    }
}

/// Match `-?\d+(\.\d+)?([eE][+-]?\d+)?` at `start`, returning its end.
fn scan_number(chars: &[char], start: usize) -> Option<usize> {
    let digits = |from: usize| {
        let mut j = from;
        while j < chars.len() && chars[j].is_ascii_digit() {
            j += 1;
        }
        j
    };

    let mut j = start;
    if chars[j] == '-' {
        j += 1;
    }
    let int_end = digits(j);
    if int_end == j {
        return None;
    }
    j = int_end;

    if chars.get(j) == Some(&'.') {
        let frac_end = digits(j + 1);
        if frac_end > j + 1 {
            j = frac_end;
        }
    }

    if matches!(chars.get(j), Some('e') | Some('E')) {
        let mut k = j + 1;
        if matches!(chars.get(k), Some('+') | Some('-')) {
            k += 1;
        }
        let exp_end = digits(k);
        if exp_end > k {
            j = exp_end;
        }
    }

    Some(j)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::strip_markup;

    fn kinds(line: &str) -> Vec<(TokenKind, String)> {
        let chars: Vec<char> = line.chars().collect();
        tokenize_line(line)
            .into_iter()
            .map(|t| (t.kind, chars[t.range].iter().collect()))
            .collect()
    }

    #[test]
    fn test_key_value_line() {
        assert_eq!(
            kinds(r#"  "age": 30,"#),
            vec![
                (TokenKind::Key, r#""age""#.to_string()),
                (TokenKind::Number, "30".to_string()),
                (TokenKind::Comma, ",".to_string()),
            ]
        );
    }

    #[test]
    fn test_key_with_space_before_colon() {
        assert_eq!(kinds(r#""a" : 1"#)[0].0, TokenKind::Key);
    }

    #[test]
    fn test_string_value_not_key() {
        assert_eq!(kinds(r#""a": "b""#)[1].0, TokenKind::String);
    }

    #[test]
    fn test_escapes_inside_string() {
        let toks = kinds(r#""say \"hi\" é": null"#);
        assert_eq!(toks[0].0, TokenKind::Key);
        assert_eq!(toks[0].1, r#""say \"hi\" é""#);
        assert_eq!(toks[1].0, TokenKind::Null);
    }

    #[test]
    fn test_unterminated_string_runs_to_end() {
        let toks = kinds(r#"{"open: 1, "#);
        assert_eq!(toks.len(), 2);
        assert_eq!(toks[1], (TokenKind::String, r#""open: 1, "#.to_string()));
    }

    #[test]
    fn test_literals_need_word_boundary() {
        assert!(kinds("trueish").is_empty());
        assert!(kinds("nullable").is_empty());
        assert_eq!(kinds("[true, false]")[1].0, TokenKind::Boolean);
        assert_eq!(kinds("[true, false]")[3].0, TokenKind::Boolean);
    }

    #[test]
    fn test_numbers() {
        assert_eq!(kinds("-12.5e+3")[0], (TokenKind::Number, "-12.5e+3".into()));
        assert_eq!(kinds("0.25")[0], (TokenKind::Number, "0.25".into()));
        assert!(kinds("abc123").is_empty());
        assert!(kinds("-").is_empty());
    }

    #[test]
    fn test_braces_and_commas() {
        let toks = kinds("},{");
        assert_eq!(
            toks.iter().map(|t| t.0).collect::<Vec<_>>(),
            vec![TokenKind::Brace, TokenKind::Comma, TokenKind::Brace]
        );
    }

    #[test]
    fn test_line_markup() {
        insta::assert_snapshot!(
            line_markup(r#""a": [1, true, null],"#),
            @r#"<span class="tok-key">"a"</span>: <span class="tok-brace">[</span><span class="tok-number">1</span><span class="tok-comma">,</span> <span class="tok-boolean">true</span><span class="tok-comma">,</span> <span class="tok-null">null</span><span class="tok-brace">]</span><span class="tok-comma">,</span>"#
        );
    }

    #[test]
    fn test_markup_escapes_text_runs() {
        assert_eq!(
            line_markup(r#""<b>&": 1"#),
            r#"<span class="tok-key">"&lt;b&gt;&amp;"</span>: <span class="tok-number">1</span>"#
        );
        assert_eq!(line_markup("a<b"), "a&lt;b");
    }

    #[test]
    fn test_highlight_lines() {
        insta::assert_snapshot!(
            highlight("{\n\n}"),
            @r#"<div class="line" data-line="0"><span class="tok-brace">{</span></div><div class="line" data-line="1"><br></div><div class="line" data-line="2"><span class="tok-brace">}</span></div>"#
        );
    }

    #[test]
    fn test_highlight_preserves_leading_whitespace() {
        let html = highlight("{\n    \"a\": 1\n}");
        assert!(html.contains(r#"<div class="line" data-line="1">    <span class="tok-key">"a"</span>"#));
    }

    #[test]
    fn test_highlight_strip_roundtrip() {
        let samples = [
            "",
            "{\"a\": 1}",
            "{\n  \"x\": [1, 2],\n\n  \"y\": \"<&>\"\n}",
            "not json at all",
            "{\"open: 1,\n  trueish -5e",
            "\n\n",
        ];
        for sample in samples {
            assert_eq!(strip_markup(&highlight(sample)), sample, "sample {sample:?}");
        }
    }

    #[test]
    fn test_highlight_is_deterministic() {
        let text = "{\n  \"a\": [1, 2]\n}";
        assert_eq!(highlight(text), highlight(text));
    }
}

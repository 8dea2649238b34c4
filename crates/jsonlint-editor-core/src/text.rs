//! The logical buffer: the editor's authoritative plain text.
//!
//! All offsets are in Unicode scalar values (chars), not bytes or UTF-16.
//! Conversions to the DOM's UTF-16 offsets live at the bottom of this module.

use std::ops::Range;

/// Ropey-backed text buffer owned by the session.
///
/// Rendered markup is always derived from this; nothing reads text back out
/// of the surface except the pass-through sync path.
#[derive(Clone, Default)]
pub struct LogicalBuffer {
    rope: ropey::Rope,
}

impl LogicalBuffer {
    /// Create a new empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from string.
    pub fn from_str(s: &str) -> Self {
        Self {
            rope: ropey::Rope::from_str(s),
        }
    }

    /// Total length in chars.
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// True when the buffer holds nothing but whitespace.
    pub fn is_blank(&self) -> bool {
        self.rope.chars().all(char::is_whitespace)
    }

    /// Replace the whole content.
    pub fn set(&mut self, text: &str) {
        self.rope = ropey::Rope::from_str(text);
    }

    /// Insert text at char offset. Offsets past the end append.
    pub fn insert(&mut self, char_offset: usize, text: &str) {
        let at = char_offset.min(self.len_chars());
        self.rope.insert(at, text);
    }

    /// Delete char range, clamped to the buffer.
    pub fn delete(&mut self, char_range: Range<usize>) {
        let range = self.clamp(char_range);
        if !range.is_empty() {
            self.rope.remove(range);
        }
    }

    /// Replace char range with text.
    pub fn replace(&mut self, char_range: Range<usize>, text: &str) {
        let range = self.clamp(char_range);
        self.delete(range.clone());
        self.insert(range.start, text);
    }

    /// Get character at offset. Returns None if out of bounds.
    pub fn char_at(&self, char_offset: usize) -> Option<char> {
        if char_offset >= self.len_chars() {
            return None;
        }
        Some(self.rope.char(char_offset))
    }

    /// Number of `\n` characters.
    pub fn newline_count(&self) -> usize {
        self.rope.chars().filter(|c| *c == '\n').count()
    }

    /// Zero-based line containing the char offset.
    pub fn line_of(&self, char_offset: usize) -> usize {
        self.rope.char_to_line(char_offset.min(self.len_chars()))
    }

    /// Char offset of the end of a line, before its `\n`.
    pub fn line_end(&self, line: usize) -> usize {
        let lines = self.rope.len_lines();
        if line + 1 >= lines {
            return self.len_chars();
        }
        self.rope.line_to_char(line + 1) - 1
    }

    /// Find word boundary backward from cursor.
    pub fn word_boundary_backward(&self, cursor: usize) -> usize {
        let mut pos = cursor.min(self.len_chars());

        // Skip any whitespace/punctuation immediately before cursor.
        while pos > 0 {
            match self.char_at(pos - 1) {
                Some(c) if is_word_char(c) => break,
                Some(_) => pos -= 1,
                None => break,
            }
        }

        while pos > 0 {
            match self.char_at(pos - 1) {
                Some(c) if is_word_char(c) => pos -= 1,
                _ => break,
            }
        }

        pos
    }

    /// Find word boundary forward from cursor.
    pub fn word_boundary_forward(&self, cursor: usize) -> usize {
        let len = self.len_chars();
        let mut pos = cursor.min(len);

        while pos < len {
            match self.char_at(pos) {
                Some(c) if is_word_char(c) => pos += 1,
                _ => break,
            }
        }

        // Then skip whitespace/punctuation.
        while pos < len {
            match self.char_at(pos) {
                Some(c) if is_word_char(c) => break,
                Some(_) => pos += 1,
                None => break,
            }
        }

        pos
    }

    fn clamp(&self, range: Range<usize>) -> Range<usize> {
        let len = self.len_chars();
        let start = range.start.min(len);
        let end = range.end.min(len).max(start);
        start..end
    }
}

impl std::fmt::Display for LogicalBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for chunk in self.rope.chunks() {
            f.write_str(chunk)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for LogicalBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("LogicalBuffer")
            .field(&self.rope.to_string())
            .finish()
    }
}

impl From<&str> for LogicalBuffer {
    fn from(s: &str) -> Self {
        Self::from_str(s)
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Convert a UTF-16 code unit offset within `text` to a char offset.
///
/// An offset that falls inside a surrogate pair rounds down to that char.
pub fn utf16_to_char_offset(text: &str, utf16_offset: usize) -> usize {
    let mut units = 0;
    for (i, c) in text.chars().enumerate() {
        let next = units + c.len_utf16();
        if next > utf16_offset {
            return i;
        }
        units = next;
    }
    text.chars().count()
}

/// Convert a char offset within `text` to a UTF-16 code unit offset.
pub fn char_to_utf16_offset(text: &str, char_offset: usize) -> usize {
    text.chars().take(char_offset).map(char::len_utf16).sum()
}

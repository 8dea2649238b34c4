//! Editor actions, commands and input types.
//!
//! Platform-agnostic definitions for what the session can be asked to do.
//! `EditorAction` is a text edit over a range, `Command` is a whole-buffer
//! or fold operation, and `InputType` is the semantic intent of an input
//! event (browser `beforeinput`, programmatic input).

/// A range in the document, measured in character offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub start: usize,
    pub end: usize,
}

impl Range {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn caret(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    pub fn is_caret(&self) -> bool {
        self.start == self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Normalize range so start <= end.
    pub fn normalize(self) -> Self {
        if self.start <= self.end {
            self
        } else {
            Self {
                start: self.end,
                end: self.start,
            }
        }
    }
}

impl From<std::ops::Range<usize>> for Range {
    fn from(r: std::ops::Range<usize>) -> Self {
        Self::new(r.start, r.end)
    }
}

impl From<Range> for std::ops::Range<usize> {
    fn from(r: Range) -> Self {
        r.start..r.end
    }
}

/// Semantic input types from input events.
///
/// Based on the W3C Input Events specification. Only the types the editor
/// acts on get their own variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputType {
    InsertText,
    InsertCompositionText,
    InsertLineBreak,
    InsertParagraph,
    InsertFromPaste,
    InsertFromDrop,
    InsertReplacementText,
    DeleteContentBackward,
    DeleteContentForward,
    DeleteWordBackward,
    DeleteWordForward,
    DeleteByCut,
    DeleteByDrag,
    DeleteContent,
    HistoryUndo,
    HistoryRedo,
    /// Any `format*` input. The editor holds plain text only.
    Format,
    /// Unrecognized input type.
    Unknown(String),
}

/// A text edit over a char range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorAction {
    /// Insert text at the given range (replacing any selected content).
    Insert { text: String, range: Range },

    /// Insert a `\n` (Enter, Shift+Enter).
    InsertLineBreak { range: Range },

    /// Delete content backward (Backspace).
    DeleteBackward { range: Range },

    /// Delete content forward (Delete key).
    DeleteForward { range: Range },

    /// Delete word backward (Ctrl/Alt+Backspace).
    DeleteWordBackward { range: Range },

    /// Delete word forward (Ctrl/Alt+Delete).
    DeleteWordForward { range: Range },
}

impl EditorAction {
    pub fn range(&self) -> Range {
        match self {
            Self::Insert { range, .. }
            | Self::InsertLineBreak { range }
            | Self::DeleteBackward { range }
            | Self::DeleteForward { range }
            | Self::DeleteWordBackward { range }
            | Self::DeleteWordForward { range } => *range,
        }
    }
}

/// What to do with an input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputDecision {
    /// Prevent the default and apply this edit.
    Apply(EditorAction),
    /// Let the platform edit the surface, then sync the text back.
    PassThrough,
    /// Prevent the default and do nothing.
    Ignore,
}

/// Map an input event to an edit.
pub fn action_for_input(input_type: &InputType, data: Option<&str>, range: Range) -> InputDecision {
    let range = range.normalize();
    match input_type {
        InputType::InsertText
        | InputType::InsertFromPaste
        | InputType::InsertFromDrop
        | InputType::InsertReplacementText => match data {
            Some(text) => InputDecision::Apply(EditorAction::Insert {
                text: text.to_string(),
                range,
            }),
            None => InputDecision::PassThrough,
        },
        InputType::InsertLineBreak | InputType::InsertParagraph => {
            InputDecision::Apply(EditorAction::InsertLineBreak { range })
        }
        InputType::DeleteContentBackward => {
            InputDecision::Apply(EditorAction::DeleteBackward { range })
        }
        InputType::DeleteContentForward => {
            InputDecision::Apply(EditorAction::DeleteForward { range })
        }
        InputType::DeleteWordBackward => {
            InputDecision::Apply(EditorAction::DeleteWordBackward { range })
        }
        InputType::DeleteWordForward => {
            InputDecision::Apply(EditorAction::DeleteWordForward { range })
        }
        InputType::DeleteByCut | InputType::DeleteByDrag | InputType::DeleteContent => {
            if range.is_caret() {
                InputDecision::Ignore
            } else {
                InputDecision::Apply(EditorAction::DeleteBackward { range })
            }
        }
        InputType::InsertCompositionText | InputType::Unknown(_) => InputDecision::PassThrough,
        InputType::HistoryUndo | InputType::HistoryRedo | InputType::Format => {
            InputDecision::Ignore
        }
    }
}

/// Synchronous session commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Lint,
    Minify,
    Repair,
    Clear,
    LoadExample,
    Download,
    Save(String),
    Load(String),
    Delete(String),
    Rename { from: String, to: String },
    /// Replace the buffer with the result of a jq-style query.
    Filter(String),
    ToggleFold(usize),
    CollapseAll,
    ExpandAll,
}

/// Keyboard shortcuts, all on Ctrl+Alt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    Lint,
    Minify,
    Clear,
    Copy,
    Download,
    Save,
    Filter,
}

impl Shortcut {
    /// Match a `KeyboardEvent.key` value with its modifier state.
    pub fn from_key(key: &str, ctrl: bool, alt: bool) -> Option<Self> {
        if !(ctrl && alt) {
            return None;
        }
        match key.to_ascii_lowercase().as_str() {
            "l" => Some(Self::Lint),
            "m" => Some(Self::Minify),
            "backspace" | "delete" => Some(Self::Clear),
            "c" => Some(Self::Copy),
            "d" => Some(Self::Download),
            "s" => Some(Self::Save),
            "q" => Some(Self::Filter),
            _ => None,
        }
    }

    /// The synchronous command this shortcut runs, if it has one without
    /// further input from the host.
    pub fn command(self) -> Option<Command> {
        match self {
            Self::Lint => Some(Command::Lint),
            Self::Minify => Some(Command::Minify),
            Self::Clear => Some(Command::Clear),
            Self::Download => Some(Command::Download),
            Self::Copy | Self::Save | Self::Filter => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Lint => "lint",
            Self::Minify => "minify",
            Self::Clear => "clear",
            Self::Copy => "copy",
            Self::Download => "download",
            Self::Save => "save",
            Self::Filter => "filter",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_with_data() {
        let decision = action_for_input(&InputType::InsertText, Some("x"), Range::caret(3));
        assert_eq!(
            decision,
            InputDecision::Apply(EditorAction::Insert {
                text: "x".into(),
                range: Range::caret(3)
            })
        );
    }

    #[test]
    fn test_paste_without_data_passes_through() {
        assert_eq!(
            action_for_input(&InputType::InsertFromPaste, None, Range::caret(0)),
            InputDecision::PassThrough
        );
    }

    #[test]
    fn test_reversed_range_is_normalized() {
        let decision = action_for_input(&InputType::DeleteContentBackward, None, Range::new(5, 2));
        assert_eq!(
            decision,
            InputDecision::Apply(EditorAction::DeleteBackward {
                range: Range::new(2, 5)
            })
        );
    }

    #[test]
    fn test_history_is_ignored() {
        assert_eq!(
            action_for_input(&InputType::HistoryUndo, None, Range::caret(0)),
            InputDecision::Ignore
        );
        assert_eq!(
            action_for_input(&InputType::InsertCompositionText, Some("é"), Range::caret(0)),
            InputDecision::PassThrough
        );
    }

    #[test]
    fn test_shortcuts_need_ctrl_alt() {
        assert_eq!(Shortcut::from_key("l", true, true), Some(Shortcut::Lint));
        assert_eq!(Shortcut::from_key("L", true, true), Some(Shortcut::Lint));
        assert_eq!(Shortcut::from_key("Backspace", true, true), Some(Shortcut::Clear));
        assert_eq!(Shortcut::from_key("l", true, false), None);
        assert_eq!(Shortcut::from_key("q", true, true), Some(Shortcut::Filter));
        assert_eq!(Shortcut::from_key("x", true, true), None);
        assert_eq!(Shortcut::Filter.command(), None);
        assert_eq!(Shortcut::Save.command(), None);
        assert_eq!(Shortcut::Minify.command(), Some(Command::Minify));
    }
}

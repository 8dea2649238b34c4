//! Core editor types: selection, session state and input outcomes.
//!
//! These types are framework-agnostic.

use std::ops::Range;

/// Text selection with anchor and head positions.
///
/// The anchor is where the selection started, the head is where the cursor is now.
/// They may be in any order - use `start()` and `end()` for ordered bounds.
#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub struct Selection {
    /// Where selection started
    pub anchor: usize,
    /// Where cursor is now
    pub head: usize,
}

impl Selection {
    pub fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    /// Create a collapsed selection (caret position).
    pub fn collapsed(offset: usize) -> Self {
        Self {
            anchor: offset,
            head: offset,
        }
    }

    pub fn start(&self) -> usize {
        self.anchor.min(self.head)
    }

    pub fn end(&self) -> usize {
        self.anchor.max(self.head)
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.head
    }

    /// Convert to a Range<usize> (ordered).
    pub fn to_range(&self) -> Range<usize> {
        self.start()..self.end()
    }
}

impl From<Selection> for crate::actions::Range {
    fn from(selection: Selection) -> Self {
        crate::actions::Range::new(selection.start(), selection.end())
    }
}

/// Session lifecycle. Commands run synchronously, so `Editing` is only
/// observable from inside a command (e.g. by a host callback).
#[derive(Clone, Debug, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Editing,
}

/// What the session did with an input.
#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// Buffer changed and the surface was re-rendered; the platform default
    /// must be prevented.
    Rendered,
    /// The platform edits the surface itself. The buffer either already holds
    /// the edit or picks it up on the next sync.
    PassThrough,
    /// Nothing changed.
    Ignored,
}

impl InputOutcome {
    /// Whether the platform's default handling should be prevented.
    pub fn prevents_default(self) -> bool {
        !matches!(self, InputOutcome::PassThrough)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_bounds() {
        let sel = Selection::new(7, 3);
        assert_eq!(sel.start(), 3);
        assert_eq!(sel.end(), 7);
        assert_eq!(sel.to_range(), 3..7);
        assert!(!sel.is_collapsed());
        assert_eq!(crate::actions::Range::from(sel), crate::actions::Range::new(3, 7));
    }

    #[test]
    fn test_outcome_default_handling() {
        assert!(InputOutcome::Rendered.prevents_default());
        assert!(InputOutcome::Ignored.prevents_default());
        assert!(!InputOutcome::PassThrough.prevents_default());
    }
}

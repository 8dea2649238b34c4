//! Fold engine: collapse and expand bracketed ranges of lines.
//!
//! Fold state is explicit. [`FoldState`] records which opener lines are
//! collapsed and what their markup was before collapsing, and rewrites the
//! flags and markup of a [`LineView`] from that record. Folding never touches
//! the buffer: a collapsed view still carries every line's text, the hidden
//! ones are just flagged.

use std::collections::BTreeMap;

use crate::highlight::line_markup;
use crate::lines::{LineView, bracket_steps, closer_for};

/// One collapsed range: opener line `opener`, hidden lines `(opener, closer]`
/// plus the lone comma line, if one was folded in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub opener: usize,
    pub closer: usize,
    /// The matched closer followed by the closers right after it on the same
    /// line, e.g. `}]` for a `}],` line.
    pub closing: String,
    pub trailing_comma: bool,
    pub comma_line: Option<usize>,
    saved_markup: String,
}

impl Fold {
    /// Opener line markup as it was before collapsing.
    pub fn saved_markup(&self) -> &str {
        &self.saved_markup
    }

    /// Every line this fold hides.
    pub fn hidden_lines(&self) -> impl Iterator<Item = usize> + '_ {
        (self.opener + 1..=self.closer).chain(self.comma_line)
    }

    /// The opaque summary appended to the opener line.
    pub fn indicator(&self) -> String {
        let comma = if self.trailing_comma { "," } else { "" };
        format!(
            "<span class=\"fold-indicator\" contenteditable=\"false\">…{}{comma}</span>",
            self.closing
        )
    }
}

/// What a toggle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoldChange {
    Collapsed,
    Expanded,
    Unchanged,
}

/// Line index of the closer matching the fold opener on `line`.
///
/// Scans forward from the next line with depth 1, counting only brackets of
/// the opener's kind. No match before the end of the view gives `None`.
pub fn find_match(view: &LineView, line: usize) -> Option<usize> {
    match_point(view, line).map(|(closer, _)| closer)
}

/// Line and char position of the matching closer.
fn match_point(view: &LineView, line: usize) -> Option<(usize, usize)> {
    let opener = view.get(line)?.fold_opener?;
    let mut depth: i32 = 1;
    for (index, candidate) in view.iter().enumerate().skip(line + 1) {
        for (position, step) in bracket_steps(&candidate.text, opener) {
            depth += step;
            if depth == 0 {
                return Some((index, position));
            }
        }
    }
    None
}

/// Explicit set of collapsed openers, keyed by line index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FoldState {
    folds: BTreeMap<usize, Fold>,
}

impl FoldState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.folds.is_empty()
    }

    pub fn len(&self) -> usize {
        self.folds.len()
    }

    pub fn is_collapsed(&self, line: usize) -> bool {
        self.folds.contains_key(&line)
    }

    pub fn get(&self, line: usize) -> Option<&Fold> {
        self.folds.get(&line)
    }

    pub fn collapsed_lines(&self) -> impl Iterator<Item = usize> + '_ {
        self.folds.keys().copied()
    }

    /// Forget every fold. The next render shows everything expanded.
    pub fn reset(&mut self) {
        self.folds.clear();
    }

    /// Collapse `line` if it is expanded, expand it if collapsed.
    pub fn toggle(&mut self, view: &mut LineView, line: usize) -> FoldChange {
        if self.expand(view, line) {
            FoldChange::Expanded
        } else if self.collapse(view, line) {
            FoldChange::Collapsed
        } else {
            FoldChange::Unchanged
        }
    }

    /// Collapse the fold opened on `line`. Ineligible or unmatched lines are a
    /// no-op and return `false`.
    pub fn collapse(&mut self, view: &mut LineView, line: usize) -> bool {
        if self.folds.contains_key(&line) {
            return false;
        }
        let Some(fold) = plan_fold(view, line) else {
            tracing::trace!(target: "jsonlint::fold", line, "line is not a matched fold opener");
            return false;
        };
        tracing::debug!(target: "jsonlint::fold", line, closer = fold.closer, "collapsing");
        self.folds.insert(line, fold);
        self.apply(view);
        true
    }

    /// Expand the fold opened on `line`, restoring its saved markup.
    pub fn expand(&mut self, view: &mut LineView, line: usize) -> bool {
        let Some(fold) = self.folds.remove(&line) else {
            return false;
        };
        tracing::debug!(target: "jsonlint::fold", line, "expanding");
        if let Some(rendered) = view.get_mut(line) {
            rendered.markup = fold.saved_markup;
        }
        self.apply(view);
        true
    }

    /// Collapse every matched opener. Returns how many folds were added.
    pub fn collapse_all(&mut self, view: &mut LineView) -> usize {
        let mut added = 0;
        for line in 0..view.len() {
            if self.folds.contains_key(&line) {
                continue;
            }
            if let Some(fold) = plan_fold(view, line) {
                self.folds.insert(line, fold);
                added += 1;
            }
        }
        self.apply(view);
        added
    }

    /// Expand every fold.
    pub fn expand_all(&mut self, view: &mut LineView) {
        for (line, fold) in std::mem::take(&mut self.folds) {
            if let Some(rendered) = view.get_mut(line) {
                rendered.markup = fold.saved_markup;
            }
        }
        self.apply(view);
    }

    /// Re-apply folds to a freshly highlighted view.
    ///
    /// Folds whose opener is no longer eligible or no longer matched are
    /// dropped; the rest are re-planned against the new text, so closer and
    /// comma bookkeeping follow edits inside the folded range.
    pub fn reconcile(&mut self, view: &mut LineView) {
        let openers: Vec<usize> = self.folds.keys().copied().collect();
        self.folds.clear();
        for line in openers {
            match plan_fold(view, line) {
                Some(fold) => {
                    self.folds.insert(line, fold);
                }
                None => {
                    tracing::debug!(target: "jsonlint::fold", line, "dropping stale fold");
                }
            }
        }
        self.apply(view);
    }

    /// Move folds below an edit when the edit changed the line count.
    ///
    /// Openers after `edit_line` move by `delta`; openers that fall inside the
    /// removed lines are dropped.
    pub fn shift(&mut self, edit_line: usize, delta: isize) {
        if delta == 0 {
            return;
        }
        let folds = std::mem::take(&mut self.folds);
        for (opener, mut fold) in folds {
            if opener <= edit_line {
                self.folds.insert(opener, fold);
                continue;
            }
            let moved = opener as isize + delta;
            if moved <= edit_line as isize {
                continue;
            }
            fold.opener = moved as usize;
            self.folds.insert(fold.opener, fold);
        }
    }

    /// Rewrite collapsed and hidden flags of every line from the fold set.
    fn apply(&self, view: &mut LineView) {
        for line in view.iter_mut() {
            line.is_collapsed = false;
            line.is_hidden = false;
        }
        for fold in self.folds.values() {
            if let Some(line) = view.get_mut(fold.opener) {
                line.is_collapsed = true;
                line.markup = format!("{}{}", fold.saved_markup, fold.indicator());
            }
            for hidden in fold.hidden_lines() {
                if let Some(line) = view.get_mut(hidden) {
                    line.is_hidden = true;
                }
            }
        }
    }
}

fn plan_fold(view: &LineView, line: usize) -> Option<Fold> {
    let rendered = view.get(line)?;
    let opener = rendered.fold_opener?;
    let (closer, position) = match_point(view, line)?;
    let closer_text = &view.get(closer)?.text;

    let mut closing = String::from(closer_for(opener));
    let mut trailing_comma = false;
    for c in closer_text.chars().skip(position + 1) {
        match c {
            '}' | ']' => closing.push(c),
            ' ' | '\t' => {}
            ',' => {
                trailing_comma = true;
                break;
            }
            _ => break,
        }
    }

    let comma_line = if !trailing_comma
        && closer_text.chars().skip(position + 1).all(|c| matches!(c, '}' | ']' | ' ' | '\t'))
        && view
            .get(closer + 1)
            .is_some_and(|next| next.text.trim() == ",")
    {
        trailing_comma = true;
        Some(closer + 1)
    } else {
        None
    };

    Some(Fold {
        opener: line,
        closer,
        closing,
        trailing_comma,
        comma_line,
        saved_markup: line_markup(&rendered.text),
    })
}

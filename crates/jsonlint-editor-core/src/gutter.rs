//! Line-number gutter markup.

use std::fmt::Write;

use crate::lines::LineView;

/// Glyph shown next to an expanded fold opener.
pub const EXPANDED_GLYPH: char = '▾';
/// Glyph shown next to a collapsed fold opener.
pub const COLLAPSED_GLYPH: char = '▸';

/// One gutter row per visible line, numbered by logical index.
///
/// Hidden lines emit nothing, so numbering skips across a fold instead of
/// renumbering what follows it.
pub fn render_gutter(view: &LineView) -> String {
    let mut out = String::new();
    for line in view.iter().filter(|l| !l.is_hidden) {
        out.push_str("<div class=\"line-number");
        if line.is_foldable() {
            out.push_str(" foldable");
        }
        if line.is_collapsed {
            out.push_str(" collapsed");
        }
        let _ = write!(out, "\" data-line=\"{}\">{}", line.index, line.index + 1);
        if line.is_foldable() {
            let glyph = if line.is_collapsed {
                COLLAPSED_GLYPH
            } else {
                EXPANDED_GLYPH
            };
            let _ = write!(out, "<span class=\"fold-toggle\">{glyph}</span>");
        }
        out.push_str("</div>");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fold::FoldState;

    #[test]
    fn test_plain_lines() {
        let view = LineView::from_text("1\n2");
        insta::assert_snapshot!(
            render_gutter(&view),
            @r#"<div class="line-number" data-line="0">1</div><div class="line-number" data-line="1">2</div>"#
        );
    }

    #[test]
    fn test_foldable_and_collapsed() {
        let mut view = LineView::from_text("{\n  \"a\": [\n    1\n  ]\n}");
        let mut folds = FoldState::new();
        folds.collapse(&mut view, 1);

        insta::assert_snapshot!(
            render_gutter(&view),
            @r#"<div class="line-number foldable" data-line="0">1<span class="fold-toggle">▾</span></div><div class="line-number foldable collapsed" data-line="1">2<span class="fold-toggle">▸</span></div><div class="line-number" data-line="4">5</div>"#
        );
    }
}

//! Editor session: owns the buffer and drives every render.
//!
//! A pass always goes the same way: mutate the logical buffer, re-highlight
//! the whole text, re-apply folds, hand the markup to the host, then put the
//! caret back by logical offset. The session is the only writer of the
//! surface and the gutter.

use serde_json::Value;

use crate::actions::{Command, EditorAction, InputDecision, InputType, Range, action_for_input};
use crate::codec::{JsonCodec, JsonFilter, NoFilter, NoRepair, Repairer, SerdeJsonCodec};
use crate::config::EditorConfig;
use crate::error::EditorError;
use crate::fold::{FoldChange, FoldState};
use crate::gutter::render_gutter;
use crate::lines::LineView;
use crate::platform::{Clipboard, EditorHost, Notice, Notifier};
use crate::share;
use crate::storage::{FileStore, KeyValueStore, StoredFile};
use crate::text::LogicalBuffer;
use crate::types::{InputOutcome, SessionState};

/// Acknowledgment shown after a successful copy.
pub const COPY_ACK: &str = "Copied!";
/// Acknowledgment shown after a share link was copied.
pub const SHARE_ACK: &str = "Share link copied";

/// One editor instance.
pub struct Session<H, S> {
    buffer: LogicalBuffer,
    caret: Option<usize>,
    view: LineView,
    folds: FoldState,
    state: SessionState,
    host: H,
    files: FileStore<S>,
    codec: Box<dyn JsonCodec>,
    repairer: Box<dyn Repairer>,
    filter: Box<dyn JsonFilter>,
    config: EditorConfig,
}

impl<H: EditorHost, S: KeyValueStore> Session<H, S> {
    /// Create an empty session. Nothing is rendered until [`refresh`](Self::refresh)
    /// or the first edit.
    pub fn new(host: H, store: S, config: EditorConfig) -> Self {
        let files = FileStore::new(store, config.storage_prefix.clone());
        Self {
            buffer: LogicalBuffer::new(),
            caret: None,
            view: LineView::from_text(""),
            folds: FoldState::new(),
            state: SessionState::Idle,
            host,
            files,
            codec: Box::new(SerdeJsonCodec),
            repairer: Box::new(NoRepair),
            filter: Box::new(NoFilter),
            config,
        }
    }

    pub fn with_repairer(mut self, repairer: impl Repairer + 'static) -> Self {
        self.repairer = Box::new(repairer);
        self
    }

    pub fn with_filter(mut self, filter: impl JsonFilter + 'static) -> Self {
        self.filter = Box::new(filter);
        self
    }

    pub fn with_codec(mut self, codec: impl JsonCodec + 'static) -> Self {
        self.codec = Box::new(codec);
        self
    }

    pub fn text(&self) -> String {
        self.buffer.to_string()
    }

    pub fn caret(&self) -> Option<usize> {
        self.caret
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn lines(&self) -> &LineView {
        &self.view
    }

    pub fn folds(&self) -> &FoldState {
        &self.folds
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn files(&self) -> &FileStore<S> {
        &self.files
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Re-render the current buffer.
    pub fn refresh(&mut self) {
        if let Err(err) = self.rerender() {
            self.report(&err);
        }
    }

    /// Replace the buffer without formatting it. Folds are reset and the
    /// caret goes to the end.
    pub fn set_text(&mut self, text: &str) {
        if let Err(err) = self.replace_all_caret_end(text) {
            self.report(&err);
        }
    }

    /// Run a command, reporting its outcome to the host's notifier.
    ///
    /// Returns whether the command succeeded. Errors never escape.
    pub fn run(&mut self, command: Command) -> bool {
        self.state = SessionState::Editing;
        if let Some(caret) = self.host.caret() {
            self.caret = Some(caret);
        }
        tracing::debug!(target: "jsonlint::session", ?command, "running command");
        let result = self.execute(command);
        self.state = SessionState::Idle;
        self.finish(result)
    }

    /// Show an error to the user.
    pub fn report(&self, err: &EditorError) {
        tracing::warn!(target: "jsonlint::session", error = %err, "command failed");
        self.host.notify(Notice::error(err.to_string()));
    }

    pub fn list_files(&self) -> Vec<StoredFile> {
        self.files.list()
    }

    /// Text to put on the clipboard for the copy command.
    pub fn clipboard_text(&self) -> String {
        self.text()
    }

    /// Link that reopens the current buffer, built on the page URL `base`.
    ///
    /// Only valid JSON is shared.
    pub fn share_url(&self, base: &str) -> Result<String, EditorError> {
        self.require_content()?;
        let text = self.text();
        self.codec.parse(&text).map_err(EditorError::Parse)?;
        share::share_url(base, &self.config.share_param, &text)
    }

    /// Load a document shared through the page query string.
    ///
    /// No share parameter is a no-op returning `false`. An undecodable token
    /// is reported to the user. Otherwise the decoded text is loaded and
    /// linted.
    pub fn load_from_query(&mut self, search: &str) -> bool {
        let Some(token) = share::token_from_query(search, &self.config.share_param) else {
            return false;
        };
        self.state = SessionState::Editing;
        let result = share::decode_token(&token).and_then(|text| {
            self.replace_all_caret_end(&text)?;
            self.lint()
        });
        self.state = SessionState::Idle;
        self.finish(result)
    }

    /// Handle an input event over `target`, or over the current selection
    /// when the event carries no target range.
    pub fn handle_input(
        &mut self,
        input_type: &InputType,
        data: Option<&str>,
        target: Option<Range>,
    ) -> InputOutcome {
        let range = target
            .or_else(|| self.host.selection().map(Range::from))
            .or_else(|| self.caret.map(Range::caret))
            .unwrap_or_else(|| Range::caret(self.buffer.len_chars()));
        match action_for_input(input_type, data, range) {
            InputDecision::Apply(action) => self.apply_input(action),
            InputDecision::PassThrough => InputOutcome::PassThrough,
            InputDecision::Ignore => InputOutcome::Ignored,
        }
    }

    /// Apply a text edit.
    ///
    /// Whitespace-only insertions at a caret update the buffer and gutter
    /// and leave the surface to the platform; everything else re-highlights.
    pub fn apply_input(&mut self, action: EditorAction) -> InputOutcome {
        self.state = SessionState::Editing;
        let outcome = self.apply_edit(action);
        self.state = SessionState::Idle;
        outcome
    }

    /// Adopt text the platform edited directly (composition, unhandled
    /// input types) and re-render it.
    pub fn sync_from_surface(&mut self, text: &str) -> InputOutcome {
        let current = self.text();
        if current == text {
            return InputOutcome::Ignored;
        }
        let changed_at = current
            .chars()
            .zip(text.chars())
            .take_while(|(a, b)| a == b)
            .count();
        let edit_line = self.buffer.line_of(changed_at);
        let newlines_before = self.buffer.newline_count();

        self.buffer.set(text);
        self.caret = self.host.caret().or(Some(changed_at));

        let delta = self.buffer.newline_count() as isize - newlines_before as isize;
        self.folds.shift(edit_line, delta);
        tracing::debug!(target: "jsonlint::session", changed_at, delta, "synced from surface");
        if let Err(err) = self.rerender() {
            tracing::warn!(target: "jsonlint::session", error = %err, "render after sync failed");
        }
        InputOutcome::Rendered
    }

    fn finish(&self, result: Result<Option<Notice>, EditorError>) -> bool {
        match result {
            Ok(notice) => {
                if let Some(notice) = notice {
                    self.host.notify(notice);
                }
                true
            }
            Err(err) => {
                self.report(&err);
                false
            }
        }
    }

    fn execute(&mut self, command: Command) -> Result<Option<Notice>, EditorError> {
        match command {
            Command::Lint => self.lint(),
            Command::Minify => self.minify(),
            Command::Repair => self.repair(),
            Command::Clear => {
                self.replace_all("", 0)?;
                Ok(None)
            }
            Command::LoadExample => {
                let example = self.config.example.clone();
                self.replace_all_caret_end(&example)?;
                self.lint()
            }
            Command::Download => {
                self.require_content()?;
                self.host
                    .download(&self.config.download_file_name, &self.text())?;
                Ok(None)
            }
            Command::Save(name) => {
                self.require_content()?;
                let text = self.text();
                let file = self.files.save(&name, &text)?;
                Ok(Some(Notice::success(format!("Saved {}", file.name))))
            }
            Command::Load(name) => {
                let file = self.files.load(&name)?;
                self.replace_all_caret_end(&file.content)?;
                Ok(Some(Notice::success(format!("Loaded {}", file.name))))
            }
            Command::Delete(name) => {
                self.files.delete(&name)?;
                Ok(Some(Notice::success(format!("Deleted {name}"))))
            }
            Command::Rename { from, to } => {
                self.files.rename(&from, &to)?;
                Ok(Some(Notice::success(format!(
                    "Renamed {from} to {}",
                    to.trim()
                ))))
            }
            Command::Filter(query) => self.filter(&query),
            Command::ToggleFold(line) => {
                self.refresh_view();
                if self.folds.toggle(&mut self.view, line) != FoldChange::Unchanged {
                    self.paint()?;
                }
                Ok(None)
            }
            Command::CollapseAll => {
                self.refresh_view();
                self.folds.collapse_all(&mut self.view);
                self.paint()?;
                Ok(None)
            }
            Command::ExpandAll => {
                self.refresh_view();
                self.folds.expand_all(&mut self.view);
                self.paint()?;
                Ok(None)
            }
        }
    }

    fn require_content(&self) -> Result<(), EditorError> {
        if self.buffer.is_blank() {
            return Err(EditorError::EmptyInput);
        }
        Ok(())
    }

    fn lint(&mut self) -> Result<Option<Notice>, EditorError> {
        self.require_content()?;
        let text = self.text();
        match self.codec.parse(&text) {
            Ok(value) => {
                let pretty = self.codec.serialize(&value, Some(self.config.indent));
                self.replace_all_caret_end(&pretty)?;
                Ok(None)
            }
            Err(failure) => {
                tracing::debug!(target: "jsonlint::session", %failure, "lint failed, attempting repair");
                self.repair()
            }
        }
    }

    fn repair(&mut self) -> Result<Option<Notice>, EditorError> {
        self.require_content()?;
        let text = self.text();
        let repaired = self
            .repairer
            .repair(&text)
            .map_err(|message| EditorError::RepairFailure { message })?;
        match self.codec.parse(&repaired) {
            Ok(value) => {
                let pretty = self.codec.serialize(&value, Some(self.config.indent));
                self.replace_all_caret_end(&pretty)?;
                Ok(Some(Notice::success("JSON fixed and formatted")))
            }
            Err(failure) => {
                tracing::debug!(target: "jsonlint::session", %failure, "repaired text still invalid, keeping it verbatim");
                self.replace_all_caret_end(&repaired)?;
                Ok(Some(Notice::info("JSON repaired")))
            }
        }
    }

    fn filter(&mut self, query: &str) -> Result<Option<Notice>, EditorError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(None);
        }
        self.require_content()?;
        let result = self
            .filter
            .apply(&self.text(), query)
            .map_err(|message| EditorError::FilterFailure { message })?;
        let Some(value) = result else {
            return Ok(Some(Notice::info("Filter returned no result")));
        };
        let output = match &value {
            Value::Object(_) | Value::Array(_) => {
                self.codec.serialize(&value, Some(self.config.indent))
            }
            Value::String(text) => text.clone(),
            primitive => primitive.to_string(),
        };
        tracing::debug!(target: "jsonlint::session", query, bytes = output.len(), "filter applied");
        self.replace_all_caret_end(&output)?;
        Ok(Some(Notice::success("Filter applied")))
    }

    fn minify(&mut self) -> Result<Option<Notice>, EditorError> {
        self.require_content()?;
        let text = self.text();
        let value = self.codec.parse(&text).map_err(EditorError::Parse)?;
        let compact = self.codec.serialize(&value, None);
        self.replace_all_caret_end(&compact)?;
        Ok(None)
    }

    fn replace_all_caret_end(&mut self, text: &str) -> Result<(), EditorError> {
        self.replace_all(text, text.chars().count())
    }

    /// Whole-buffer replacement: folds reset, caret at `caret`.
    fn replace_all(&mut self, text: &str, caret: usize) -> Result<(), EditorError> {
        self.buffer.set(text);
        self.folds.reset();
        self.caret = Some(caret);
        self.rerender()
    }

    fn apply_edit(&mut self, action: EditorAction) -> InputOutcome {
        let len = self.buffer.len_chars();
        let range = action.range().normalize();
        let start = range.start.min(len);
        let end = range.end.min(len);
        let edit_line = self.buffer.line_of(start);
        let newlines_before = self.buffer.newline_count();

        match action {
            EditorAction::Insert { text, .. } => {
                if text.is_empty() && start == end {
                    return InputOutcome::Ignored;
                }
                let whitespace_only = start == end
                    && !text.is_empty()
                    && text.chars().all(|c| c.is_whitespace() && c != '\n');
                self.buffer.replace(start..end, &text);
                self.caret = Some(start + text.chars().count());
                if whitespace_only {
                    tracing::trace!(target: "jsonlint::session", start, "whitespace insert, skipping highlight");
                    if let Err(err) = self.host.render_gutter(&render_gutter(&self.view)) {
                        tracing::warn!(target: "jsonlint::session", error = %err, "gutter refresh failed");
                    }
                    return InputOutcome::PassThrough;
                }
            }
            EditorAction::InsertLineBreak { .. } => {
                self.buffer.replace(start..end, "\n");
                self.caret = Some(start + 1);
            }
            EditorAction::DeleteBackward { .. } => {
                if start < end {
                    self.buffer.delete(start..end);
                    self.caret = Some(start);
                } else if start == 0 {
                    return InputOutcome::Ignored;
                } else {
                    self.buffer.delete(start - 1..start);
                    self.caret = Some(start - 1);
                }
            }
            EditorAction::DeleteForward { .. } => {
                if start < end {
                    self.buffer.delete(start..end);
                } else if start >= len {
                    return InputOutcome::Ignored;
                } else {
                    self.buffer.delete(start..start + 1);
                }
                self.caret = Some(start);
            }
            EditorAction::DeleteWordBackward { .. } => {
                let from = if start < end {
                    start
                } else {
                    self.buffer.word_boundary_backward(start)
                };
                if from == end {
                    return InputOutcome::Ignored;
                }
                self.buffer.delete(from..end);
                self.caret = Some(from);
            }
            EditorAction::DeleteWordForward { .. } => {
                let to = if start < end {
                    end
                } else {
                    self.buffer.word_boundary_forward(start)
                };
                if to == start {
                    return InputOutcome::Ignored;
                }
                self.buffer.delete(start..to);
                self.caret = Some(start);
            }
        }

        let delta = self.buffer.newline_count() as isize - newlines_before as isize;
        self.folds.shift(edit_line, delta);
        if let Err(err) = self.rerender() {
            tracing::warn!(target: "jsonlint::session", error = %err, "render after edit failed");
        }
        InputOutcome::Rendered
    }

    /// Re-highlight the buffer and re-apply folds, without painting.
    fn refresh_view(&mut self) {
        self.view = LineView::from_text(&self.text());
        self.folds.reconcile(&mut self.view);
    }

    fn rerender(&mut self) -> Result<(), EditorError> {
        self.refresh_view();
        self.paint()
    }

    /// Hand the current view to the host and restore the caret.
    fn paint(&mut self) -> Result<(), EditorError> {
        let caret = self.caret.map(|offset| self.visible_caret(offset));
        self.caret = caret;
        self.host
            .render(&self.view.to_html(), &render_gutter(&self.view))?;
        if let Some(offset) = caret {
            self.host.restore_caret(offset)?;
        }
        tracing::trace!(target: "jsonlint::session", lines = self.view.len(), ?caret, "rendered");
        Ok(())
    }

    /// A caret inside folded lines moves to the end of the nearest visible
    /// line above it.
    fn visible_caret(&self, offset: usize) -> usize {
        let offset = offset.min(self.buffer.len_chars());
        let line = self.buffer.line_of(offset);
        if !self.view.get(line).is_some_and(|l| l.is_hidden) {
            return offset;
        }
        match self.view.visible_at_or_before(line) {
            Some(visible) => self.buffer.line_end(visible),
            None => offset,
        }
    }
}

/// Write `text` to the clipboard and tell the user how it went.
///
/// Runs outside the session so a host can release its borrow of the
/// session before awaiting.
pub async fn copy_text<C, N>(clipboard: &C, notifier: &N, text: &str, ack: &str) -> Result<(), EditorError>
where
    C: Clipboard + ?Sized,
    N: Notifier + ?Sized,
{
    match clipboard.write_text(text).await {
        Ok(()) => {
            notifier.notify(Notice::success(ack));
            Ok(())
        }
        Err(err) => {
            tracing::warn!(target: "jsonlint::clipboard", error = %err, "clipboard write failed");
            let err = EditorError::ClipboardFailure(err.0);
            notifier.notify(Notice::error(err.to_string()));
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::highlight::highlight;
    use crate::markup::MarkupSurface;
    use crate::platform::{NoticeLevel, PlatformError, RenderSurface};
    use crate::storage::{MemoryStore, StoredRecord};

    const DOC: &str = "{\n  \"a\": 1,\n  \"nested\": {\n    \"b\": 2\n  },\n  \"c\": [\n    1\n  ]\n}";

    type TestSession = Session<MarkupSurface, MemoryStore>;

    fn session() -> TestSession {
        Session::new(MarkupSurface::new(), MemoryStore::new(), EditorConfig::default())
    }

    fn session_with(text: &str) -> TestSession {
        let mut s = session();
        s.set_text(text);
        s
    }

    fn last_message(s: &TestSession) -> Option<String> {
        s.host().last_notice().map(|n| n.message)
    }

    #[test]
    fn test_lint_pretty_prints() {
        let mut s = session_with(r#"{"a":1}"#);
        assert!(s.run(Command::Lint));
        assert_eq!(s.text(), "{\n  \"a\": 1\n}");
        assert_eq!(s.host().editor_markup(), highlight(&s.text()));
        assert_eq!(s.host().text(), s.text());
        assert_eq!(s.caret(), Some(s.text().chars().count()));
        assert_eq!(s.host().caret(), s.caret());
        assert_eq!(s.state(), SessionState::Idle);
    }

    #[test]
    fn test_lint_respects_indent() {
        let config = EditorConfig {
            indent: 4,
            ..EditorConfig::default()
        };
        let mut s = Session::new(MarkupSurface::new(), MemoryStore::new(), config);
        s.set_text(r#"{"a":1}"#);
        s.run(Command::Lint);
        assert_eq!(s.text(), "{\n    \"a\": 1\n}");
    }

    #[test]
    fn test_lint_empty_reports_error() {
        let mut s = session_with("   \n ");
        assert!(!s.run(Command::Lint));
        let notice = s.host().last_notice().unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.message, "Editor is empty");
    }

    #[test]
    fn test_lint_falls_back_to_repair_once() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let seen = calls.clone();
        let mut s = session().with_repairer(move |text: &str| -> Result<String, String> {
            seen.borrow_mut().push(text.to_string());
            Ok("{}".into())
        });
        s.set_text("{invalid");

        assert!(s.run(Command::Lint));
        assert_eq!(*calls.borrow(), vec!["{invalid".to_string()]);
        assert_eq!(s.text(), "{}");
        assert_eq!(s.host().editor_markup(), highlight("{}"));
        assert_eq!(last_message(&s).as_deref(), Some("JSON fixed and formatted"));
    }

    #[test]
    fn test_repair_failure_leaves_buffer() {
        let mut s = session_with("{invalid");
        assert!(!s.run(Command::Lint));
        assert_eq!(s.text(), "{invalid");
        let notice = s.host().last_notice().unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert!(notice.message.starts_with("Invalid JSON: "));
    }

    #[test]
    fn test_repair_output_that_does_not_parse_is_kept_verbatim() {
        let mut s = session()
            .with_repairer(|text: &str| -> Result<String, String> { Ok(format!("{text}]")) });
        s.set_text("[1,");
        assert!(s.run(Command::Repair));
        assert_eq!(s.text(), "[1,]");
        assert_eq!(s.host().last_notice().unwrap().level, NoticeLevel::Info);
    }

    #[test]
    fn test_minify() {
        let mut s = session_with("{\n  \"a\": 1\n}");
        assert!(s.run(Command::Minify));
        assert_eq!(s.text(), r#"{"a":1}"#);
    }

    #[test]
    fn test_minify_reports_position() {
        let mut s = session_with("{\n  \"a\": x\n}");
        assert!(!s.run(Command::Minify));
        let message = last_message(&s).unwrap();
        assert!(message.starts_with("Invalid JSON: "), "{message}");
        assert!(message.ends_with("at line 2, column 8"), "{message}");
        assert_eq!(s.text(), "{\n  \"a\": x\n}");
    }

    #[test]
    fn test_minify_position_counts_chars() {
        let mut s = session_with("{\"é\": x}");
        assert!(!s.run(Command::Minify));
        let message = last_message(&s).unwrap();
        assert!(message.ends_with("at line 1, column 7"), "{message}");
    }

    fn keys_filter(text: &str, query: &str) -> Result<Option<Value>, String> {
        let value: Value = serde_json::from_str(text).map_err(|e| e.to_string())?;
        match query {
            "keys" => Ok(value
                .as_object()
                .map(|map| Value::Array(map.keys().cloned().map(Value::String).collect()))),
            ".name" => Ok(value.get("name").cloned()),
            ".age" => Ok(value.get("age").cloned()),
            _ => Err(format!("{query} is not a valid filter")),
        }
    }

    #[test]
    fn test_filter_pretty_prints_structures() {
        let mut s = session().with_filter(keys_filter);
        s.set_text(DOC);
        s.run(Command::ToggleFold(2));

        assert!(s.run(Command::Filter("  keys ".into())));
        assert_eq!(s.text(), "[\n  \"a\",\n  \"nested\",\n  \"c\"\n]");
        assert!(s.folds().is_empty());
        assert_eq!(s.caret(), Some(s.text().chars().count()));
        let notice = s.host().last_notice().unwrap();
        assert_eq!(notice.level, NoticeLevel::Success);
        assert_eq!(notice.message, "Filter applied");
    }

    #[test]
    fn test_filter_writes_primitives_as_text() {
        let mut s = session().with_filter(keys_filter);
        s.set_text(r#"{"name": "John Doe", "age": 30}"#);
        assert!(s.run(Command::Filter(".name".into())));
        assert_eq!(s.text(), "John Doe");

        s.set_text(r#"{"name": "x", "age": 30}"#);
        assert!(s.run(Command::Filter(".age".into())));
        assert_eq!(s.text(), "30");
    }

    #[test]
    fn test_filter_without_result_keeps_buffer() {
        let mut s = session().with_filter(keys_filter);
        s.set_text("[1, 2]");
        assert!(s.run(Command::Filter("keys".into())));
        assert_eq!(s.text(), "[1, 2]");
        let notice = s.host().last_notice().unwrap();
        assert_eq!(notice.level, NoticeLevel::Info);
        assert_eq!(notice.message, "Filter returned no result");
    }

    #[test]
    fn test_filter_errors() {
        let mut s = session().with_filter(keys_filter);
        s.set_text("{}");
        assert!(!s.run(Command::Filter(".[".into())));
        assert_eq!(s.text(), "{}");
        let notice = s.host().last_notice().unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.message, "Filter error: .[ is not a valid filter");

        let notices = s.host().notices().len();
        assert!(s.run(Command::Filter("   ".into())));
        assert_eq!(s.host().notices().len(), notices);

        s.set_text(" ");
        assert!(!s.run(Command::Filter("keys".into())));
        assert_eq!(last_message(&s).as_deref(), Some("Editor is empty"));

        let mut plain = session_with("{}");
        assert!(!plain.run(Command::Filter(".".into())));
        assert_eq!(last_message(&plain).as_deref(), Some("Filter error: no filter available"));
    }

    #[test]
    fn test_clear() {
        let mut s = session_with(DOC);
        s.run(Command::ToggleFold(2));
        assert!(s.run(Command::Clear));
        assert_eq!(s.text(), "");
        assert_eq!(s.caret(), Some(0));
        assert!(s.folds().is_empty());
        insta::assert_snapshot!(
            s.host().gutter_markup(),
            @r#"<div class="line-number" data-line="0">1</div>"#
        );
    }

    #[test]
    fn test_load_example() {
        let mut s = session();
        assert!(s.run(Command::LoadExample));
        let text = s.text();
        assert!(text.starts_with("{\n  \"name\": \"John Doe\",\n  \"age\": 30,"));
        assert!(text.contains("\"courses\": [\n    \"Math\",\n    \"Science\"\n  ]"));
    }

    #[test]
    fn test_save_and_load() {
        let mut s = session_with("{\"a\": 1}");
        assert!(s.run(Command::Save("testFile".into())));
        assert_eq!(last_message(&s).as_deref(), Some("Saved testFile"));

        let raw = s.files().store().get("lnt_testFile").unwrap();
        let record: StoredRecord = serde_json::from_str(&raw).unwrap();
        assert_eq!(record.content, s.text());

        s.run(Command::Clear);
        assert!(s.run(Command::Load("testFile".into())));
        assert_eq!(s.text(), "{\"a\": 1}");
        assert_eq!(last_message(&s).as_deref(), Some("Loaded testFile"));
        assert_eq!(s.list_files().len(), 1);
    }

    #[test]
    fn test_save_empty_and_load_missing() {
        let mut s = session();
        assert!(!s.run(Command::Save("x".into())));
        assert_eq!(last_message(&s).as_deref(), Some("Editor is empty"));
        assert!(!s.run(Command::Load("missing".into())));
        assert_eq!(last_message(&s).as_deref(), Some("No saved file named missing"));
    }

    #[test]
    fn test_rename_and_delete() {
        let mut s = session_with("[]");
        s.run(Command::Save("one".into()));
        assert!(s.run(Command::Rename {
            from: "one".into(),
            to: "two".into()
        }));
        assert_eq!(last_message(&s).as_deref(), Some("Renamed one to two"));
        assert!(s.run(Command::Delete("two".into())));
        assert!(s.list_files().is_empty());
    }

    #[test]
    fn test_download() {
        let mut s = session();
        assert!(!s.run(Command::Download));
        assert!(s.host().downloads().is_empty());

        s.set_text("[1]");
        assert!(s.run(Command::Download));
        assert_eq!(
            s.host().downloads(),
            vec![("data.json".to_string(), "[1]".to_string())]
        );
    }

    #[test]
    fn test_toggle_fold_round_trip() {
        let mut s = session_with(DOC);
        let before = s.host().editor_markup();

        s.run(Command::ToggleFold(2));
        assert_eq!(s.text(), DOC);
        assert!(s.folds().is_collapsed(2));
        assert!(s.host().editor_markup().contains("fold-indicator"));
        assert!(!s.host().gutter_markup().contains(r#"data-line="3""#));

        s.run(Command::ToggleFold(2));
        assert_eq!(s.text(), DOC);
        assert_eq!(s.host().editor_markup(), before);
    }

    #[test]
    fn test_folds_follow_edits() {
        let mut s = session_with(DOC);
        s.run(Command::ToggleFold(2));

        // Same line count: the fold stays put.
        let at = s.text().find("1,").unwrap();
        s.apply_input(EditorAction::Insert {
            text: "0".into(),
            range: Range::caret(at + 1),
        });
        assert!(s.folds().is_collapsed(2));

        // A new line above moves it down.
        s.apply_input(EditorAction::InsertLineBreak {
            range: Range::caret(1),
        });
        assert!(s.folds().is_collapsed(3));
        assert_eq!(s.caret(), Some(2));
    }

    #[test]
    fn test_caret_in_hidden_lines_moves_up() {
        let mut s = session_with(DOC);
        s.run(Command::ToggleFold(2));

        let inside = s.text().find("\"b\"").unwrap();
        s.host().place_caret(Some(inside));
        s.run(Command::ToggleFold(5));

        let opener_end = s.text().find("{\n    \"b\"").unwrap() + 1;
        assert_eq!(s.caret(), Some(opener_end));
        assert_eq!(s.host().caret(), Some(opener_end));
    }

    #[test]
    fn test_collapse_all_then_expand_all() {
        let mut s = session_with(DOC);
        let before = s.host().editor_markup();
        s.run(Command::CollapseAll);
        assert_eq!(s.folds().len(), 3);
        s.run(Command::ExpandAll);
        assert_eq!(s.host().editor_markup(), before);
    }

    #[test]
    fn test_whitespace_insert_passes_through() {
        let mut s = session_with("{}");
        let markup = s.host().editor_markup();
        let outcome = s.apply_input(EditorAction::Insert {
            text: " ".into(),
            range: Range::caret(1),
        });
        assert_eq!(outcome, InputOutcome::PassThrough);
        assert_eq!(s.text(), "{ }");
        assert_eq!(s.host().editor_markup(), markup);

        // The next real edit renders the whitespace too.
        s.apply_input(EditorAction::Insert {
            text: "1".into(),
            range: Range::caret(2),
        });
        assert_eq!(s.host().text(), "{ 1}");
    }

    #[test]
    fn test_line_break_caret() {
        let mut s = session_with("{}");
        let outcome = s.apply_input(EditorAction::InsertLineBreak {
            range: Range::caret(1),
        });
        assert_eq!(outcome, InputOutcome::Rendered);
        assert_eq!(s.text(), "{\n}");
        assert_eq!(s.caret(), Some(2));
        assert_eq!(s.host().caret(), Some(2));
    }

    #[test]
    fn test_deletions() {
        let mut s = session_with("[true, 12]");
        assert_eq!(
            s.apply_input(EditorAction::DeleteBackward {
                range: Range::caret(0)
            }),
            InputOutcome::Ignored
        );
        s.apply_input(EditorAction::DeleteBackward {
            range: Range::caret(10),
        });
        assert_eq!(s.text(), "[true, 12");
        s.apply_input(EditorAction::DeleteForward {
            range: Range::caret(0),
        });
        assert_eq!(s.text(), "true, 12");
        s.apply_input(EditorAction::DeleteWordBackward {
            range: Range::caret(4),
        });
        assert_eq!(s.text(), ", 12");
        s.apply_input(EditorAction::DeleteWordForward {
            range: Range::caret(0),
        });
        assert_eq!(s.text(), "12");
        assert_eq!(
            s.apply_input(EditorAction::DeleteForward {
                range: Range::caret(2)
            }),
            InputOutcome::Ignored
        );
    }

    #[test]
    fn test_handle_input_uses_selection() {
        let mut s = session_with("[1]");
        s.host().place_caret(Some(2));
        let outcome = s.handle_input(&InputType::InsertText, Some("0"), None);
        assert_eq!(outcome, InputOutcome::Rendered);
        assert_eq!(s.text(), "[10]");

        assert_eq!(
            s.handle_input(&InputType::HistoryUndo, None, None),
            InputOutcome::Ignored
        );
        assert_eq!(s.text(), "[10]");
    }

    #[test]
    fn test_sync_from_surface() {
        let mut s = session_with("{\"k\": 1}");
        assert_eq!(s.sync_from_surface("{\"k\": 1}"), InputOutcome::Ignored);
        assert_eq!(s.sync_from_surface("{\"ké\": 1}"), InputOutcome::Rendered);
        assert_eq!(s.host().editor_markup(), highlight("{\"ké\": 1}"));
    }

    #[test]
    fn test_sync_shifts_folds_when_lines_change() {
        let mut s = session_with(DOC);
        s.run(Command::ToggleFold(2));

        let added = DOC.replacen("{\n", "{\n  \"z\": 0,\n", 1);
        assert_eq!(s.sync_from_surface(&added), InputOutcome::Rendered);
        assert_eq!(s.text(), added);
        assert_eq!(s.folds().collapsed_lines().collect::<Vec<_>>(), vec![3]);
        assert_eq!(s.lines().get(3).map(|l| l.is_collapsed), Some(true));
        assert!(s.host().editor_markup().contains("fold-indicator"));

        s.run(Command::ExpandAll);
        s.run(Command::ToggleFold(6));
        assert!(s.folds().is_collapsed(6));

        // Dropping the new line moves the array fold back up.
        assert_eq!(s.sync_from_surface(DOC), InputOutcome::Rendered);
        assert_eq!(s.folds().collapsed_lines().collect::<Vec<_>>(), vec![5]);
        let gutter = s.host().gutter_markup();
        assert!(gutter.contains(r#"data-line="5""#));
        assert!(!gutter.contains(r#"data-line="6""#));
        assert!(!gutter.contains(r#"data-line="7""#));
    }

    #[test]
    fn test_share_url() {
        let s = session_with(r#"{"test": "data", "number": 123}"#);
        let url = s.share_url("https://example.com/").unwrap();
        assert!(url.contains("?json="));
        let token = share::token_from_query(&url[url.find('?').unwrap()..], "json").unwrap();
        assert_eq!(share::decode_token(&token).unwrap(), s.text());

        let invalid = session_with("{invalid json}");
        assert!(matches!(
            invalid.share_url("https://example.com/"),
            Err(EditorError::Parse(_))
        ));
    }

    #[test]
    fn test_load_from_query() {
        let mut s = session();
        assert!(!s.load_from_query(""));
        assert!(s.host().notices().is_empty());

        let token = share::encode_token(r#"{"loaded": "from URL"}"#);
        assert!(s.load_from_query(&format!("?json={token}")));
        assert_eq!(s.text(), "{\n  \"loaded\": \"from URL\"\n}");
    }

    #[test]
    fn test_load_from_query_bad_token() {
        let mut s = session_with("[1]");
        assert!(!s.load_from_query("?json="));
        assert_eq!(last_message(&s).as_deref(), Some("Invalid share link"));
        assert_eq!(s.text(), "[1]");

        assert!(!s.load_from_query("?json=invalid_compressed_data"));
        assert_eq!(s.host().last_notice().unwrap().level, NoticeLevel::Error);
    }

    struct MockClipboard {
        fail: bool,
        written: RefCell<Vec<String>>,
    }

    impl Clipboard for MockClipboard {
        async fn write_text(&self, text: &str) -> Result<(), PlatformError> {
            if self.fail {
                return Err("denied".into());
            }
            self.written.borrow_mut().push(text.to_string());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_copy_success_acknowledges() {
        let clipboard = MockClipboard {
            fail: false,
            written: RefCell::new(Vec::new()),
        };
        let s = session_with("[1]");
        copy_text(&clipboard, s.host(), &s.clipboard_text(), COPY_ACK)
            .await
            .unwrap();
        assert_eq!(*clipboard.written.borrow(), vec!["[1]".to_string()]);
        assert_eq!(last_message(&s).as_deref(), Some("Copied!"));
    }

    #[tokio::test]
    async fn test_copy_failure_reports() {
        let clipboard = MockClipboard {
            fail: true,
            written: RefCell::new(Vec::new()),
        };
        let s = session_with("[1]");
        let result = copy_text(&clipboard, s.host(), "[1]", COPY_ACK).await;
        assert!(matches!(result, Err(EditorError::ClipboardFailure(_))));
        assert_eq!(last_message(&s).as_deref(), Some("Failed to copy content"));
    }

    #[test]
    fn test_restore_failure_is_reported_not_raised() {
        struct Broken(MarkupSurface);
        impl RenderSurface for Broken {
            fn render(&self, _: &str, _: &str) -> Result<(), PlatformError> {
                Err("detached".into())
            }
            fn render_gutter(&self, _: &str) -> Result<(), PlatformError> {
                Ok(())
            }
            fn caret(&self) -> Option<usize> {
                None
            }
            fn restore_caret(&self, _: usize) -> Result<(), PlatformError> {
                Ok(())
            }
        }
        impl Notifier for Broken {
            fn notify(&self, notice: Notice) {
                self.0.notify(notice);
            }
        }
        impl crate::platform::Downloader for Broken {
            fn download(&self, _: &str, _: &str) -> Result<(), PlatformError> {
                Ok(())
            }
        }

        let mut s = Session::new(Broken(MarkupSurface::new()), MemoryStore::new(), EditorConfig::default());
        s.set_text("[1]");
        assert!(!s.run(Command::Minify));
        assert_eq!(
            s.host().0.last_notice().map(|n| n.message).as_deref(),
            Some("Platform error: detached")
        );
    }
}

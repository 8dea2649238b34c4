//! Browser event handling for the editor.
//!
//! Provides browser-specific event extraction and input type parsing for
//! the `beforeinput` and `keydown` events.

use jsonlint_editor_core::{EditorHost, InputType, KeyValueStore, Range, Session, Shortcut};
use wasm_bindgen::prelude::*;

use crate::cursor::dom_point_to_offset;

// === StaticRange binding ===
//
// Custom wasm_bindgen binding for StaticRange since web-sys doesn't expose it.
// StaticRange is returned by InputEvent.getTargetRanges() and represents
// a fixed range that doesn't update when the DOM changes.

#[wasm_bindgen]
extern "C" {
    /// The StaticRange interface represents a static range of text in the DOM.
    pub type StaticRange;

    #[wasm_bindgen(method, getter, structural)]
    pub fn startContainer(this: &StaticRange) -> web_sys::Node;

    #[wasm_bindgen(method, getter, structural)]
    pub fn startOffset(this: &StaticRange) -> u32;

    #[wasm_bindgen(method, getter, structural)]
    pub fn endContainer(this: &StaticRange) -> web_sys::Node;

    #[wasm_bindgen(method, getter, structural)]
    pub fn endOffset(this: &StaticRange) -> u32;
}

// === InputType browser parsing ===

/// Parse a browser inputType string to an InputType enum.
///
/// This handles the W3C Input Events inputType values as returned by
/// `InputEvent.inputType` in browsers.
pub fn parse_browser_input_type(s: &str) -> InputType {
    match s {
        // Insertion
        "insertText" => InputType::InsertText,
        "insertCompositionText" => InputType::InsertCompositionText,
        "insertLineBreak" => InputType::InsertLineBreak,
        "insertParagraph" => InputType::InsertParagraph,
        "insertFromPaste" => InputType::InsertFromPaste,
        "insertFromDrop" => InputType::InsertFromDrop,
        "insertReplacementText" => InputType::InsertReplacementText,

        // Deletion
        "deleteContentBackward" => InputType::DeleteContentBackward,
        "deleteContentForward" => InputType::DeleteContentForward,
        "deleteWordBackward" | "deleteEntireWordBackward" => InputType::DeleteWordBackward,
        "deleteWordForward" | "deleteEntireWordForward" => InputType::DeleteWordForward,
        "deleteByCut" => InputType::DeleteByCut,
        "deleteByDrag" => InputType::DeleteByDrag,
        "deleteContent" => InputType::DeleteContent,

        // History
        "historyUndo" => InputType::HistoryUndo,
        "historyRedo" => InputType::HistoryRedo,

        other if other.starts_with("format") => InputType::Format,

        // Unknown
        other => InputType::Unknown(other.to_string()),
    }
}

// === BeforeInput event handling ===

/// Result of handling a beforeinput event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeforeInputResult {
    /// Event was handled, default browser behavior was prevented.
    Handled,
    /// Event should be handled by browser (e.g., during composition). Call
    /// [`Session::sync_from_surface`] once the browser has edited the DOM.
    PassThrough,
}

/// Extract target range from a beforeinput event.
///
/// Uses getTargetRanges() to get the browser's intended range for this operation.
pub fn get_target_range_from_event(
    event: &web_sys::InputEvent,
    editor: &web_sys::Node,
) -> Option<Range> {
    use wasm_bindgen::JsCast;

    let ranges = event.get_target_ranges();
    if ranges.length() == 0 {
        return None;
    }
    let static_range: StaticRange = ranges.get(0).unchecked_into();

    let start = dom_point_to_offset(editor, &static_range.startContainer(), static_range.startOffset())?;
    let end = dom_point_to_offset(editor, &static_range.endContainer(), static_range.endOffset())?;
    Some(Range::new(start, end))
}

/// Get data from a beforeinput event, handling different sources.
pub fn get_data_from_event(event: &web_sys::InputEvent) -> Option<String> {
    // First try the data property.
    if let Some(data) = event.data() {
        if !data.is_empty() {
            return Some(data);
        }
    }

    // For paste/drop, try dataTransfer. Only plain text is ever inserted.
    if let Some(data_transfer) = event.data_transfer() {
        if let Ok(text) = data_transfer.get_data("text/plain") {
            if !text.is_empty() {
                return Some(text);
            }
        }
    }

    None
}

/// Get input type from a beforeinput event.
pub fn get_input_type_from_event(event: &web_sys::InputEvent) -> InputType {
    parse_browser_input_type(&event.input_type())
}

/// Route a beforeinput event through the session.
///
/// IME composition is always left to the browser.
pub fn handle_beforeinput<H: EditorHost, S: KeyValueStore>(
    session: &mut Session<H, S>,
    event: &web_sys::InputEvent,
    editor: &web_sys::Node,
) -> BeforeInputResult {
    if event.is_composing() {
        return BeforeInputResult::PassThrough;
    }

    let input_type = get_input_type_from_event(event);
    let data = get_data_from_event(event);
    let target = get_target_range_from_event(event, editor);
    tracing::trace!(target: "jsonlint::session", ?input_type, ?target, "beforeinput");

    let outcome = session.handle_input(&input_type, data.as_deref(), target);
    if outcome.prevents_default() {
        event.prevent_default();
        BeforeInputResult::Handled
    } else {
        BeforeInputResult::PassThrough
    }
}

/// The Ctrl+Alt shortcut a keydown event triggers, if any.
pub fn shortcut_from_event(event: &web_sys::KeyboardEvent) -> Option<Shortcut> {
    Shortcut::from_key(&event.key(), event.ctrl_key(), event.alt_key())
}

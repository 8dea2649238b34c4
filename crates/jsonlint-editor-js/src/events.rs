//! Event handlers exposed to JavaScript.
//!
//! These handlers are called by the page when DOM events fire on the
//! editor or the gutter. The WASM side processes the event and calls
//! preventDefault itself where needed.

use wasm_bindgen::prelude::*;

use jsonlint_editor_browser::{
    BeforeInputResult, Command, Shortcut, handle_beforeinput, shortcut_from_event,
};

use crate::editor::JsEditor;

/// Result of handling an event.
#[wasm_bindgen]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    /// Event was handled and its default prevented.
    Handled,
    /// Event was left to the browser. Call `syncFromDom` on the following
    /// `input` event.
    PassThrough,
}

impl From<BeforeInputResult> for EventResult {
    fn from(r: BeforeInputResult) -> Self {
        match r {
            BeforeInputResult::Handled => EventResult::Handled,
            BeforeInputResult::PassThrough => EventResult::PassThrough,
        }
    }
}

#[wasm_bindgen]
impl JsEditor {
    // === Event handlers ===

    /// Handle a beforeinput event on the editor element.
    #[wasm_bindgen(js_name = handleBeforeInput)]
    pub fn handle_before_input(&mut self, event: &web_sys::InputEvent) -> EventResult {
        let editor: web_sys::Node = self.session.host().editor().clone().into();
        handle_beforeinput(&mut self.session, event, &editor).into()
    }

    /// Adopt edits the browser made on its own (composition, pass-through
    /// input) and re-render them.
    #[wasm_bindgen(js_name = syncFromDom)]
    pub fn sync_from_dom(&mut self) {
        let text = self.session.host().text();
        self.session.sync_from_surface(&text);
    }

    /// Handle a keydown event.
    ///
    /// Ctrl+Alt shortcuts run here. Returns the shortcut's name, so the page
    /// can follow up on the ones that need its input (`"save"` needs a file
    /// name, `"filter"` a query for `applyFilter`).
    #[wasm_bindgen(js_name = handleKeydown)]
    pub fn handle_keydown(&mut self, event: &web_sys::KeyboardEvent) -> Option<String> {
        let shortcut = shortcut_from_event(event)?;
        event.prevent_default();
        tracing::debug!(target: "jsonlint::session", shortcut = shortcut.name(), "shortcut");

        match (shortcut, shortcut.command()) {
            (_, Some(command)) => {
                self.session.run(command);
            }
            (Shortcut::Copy, None) => {
                // Outcome is reported through the notice callback.
                drop(self.copy());
            }
            (_, None) => {}
        }
        Some(shortcut.name().to_string())
    }

    /// Handle a click inside the gutter. Clicks on a fold toggle fold the
    /// line; returns whether one did.
    #[wasm_bindgen(js_name = handleGutterClick)]
    pub fn handle_gutter_click(&mut self, target: &web_sys::Element) -> bool {
        let Ok(Some(toggle)) = target.closest(".fold-toggle") else {
            return false;
        };
        let line = toggle
            .closest(".line-number")
            .ok()
            .flatten()
            .and_then(|row| row.get_attribute("data-line"))
            .and_then(|line| line.parse::<usize>().ok());
        match line {
            Some(line) => self.session.run(Command::ToggleFold(line)),
            None => false,
        }
    }
}

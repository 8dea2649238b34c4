//! JavaScript functions plugged into the session's seams.

use jsonlint_editor_core::{JsonFilter, Notice, Notifier, Repairer};
use serde_json::Value;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

/// Best-effort message from a thrown JavaScript value.
pub(crate) fn js_error_message(value: &JsValue) -> String {
    if let Some(message) = value.as_string() {
        return message;
    }
    match value.dyn_ref::<js_sys::Error>() {
        Some(err) => err.message().into(),
        None => format!("{:?}", value),
    }
}

/// Delivers notices to a `(notice) => void` callback.
///
/// Without a callback, notices only reach the console log.
#[derive(Clone, Default)]
pub struct JsNotifier {
    callback: Option<js_sys::Function>,
}

impl JsNotifier {
    pub fn new(callback: Option<js_sys::Function>) -> Self {
        Self { callback }
    }
}

impl Notifier for JsNotifier {
    fn notify(&self, notice: Notice) {
        tracing::debug!(target: "jsonlint::session", level = ?notice.level, message = %notice.message, "notice");
        let Some(callback) = &self.callback else {
            return;
        };
        match serde_wasm_bindgen::to_value(&notice) {
            Ok(value) => {
                if let Err(e) = callback.call1(&JsValue::NULL, &value) {
                    tracing::warn!("notice callback threw: {}", js_error_message(&e));
                }
            }
            Err(e) => tracing::warn!("could not convert notice: {}", e),
        }
    }
}

/// A `(text) => string` repair function, e.g. the `jsonrepair` package.
pub struct JsRepairer {
    function: js_sys::Function,
}

impl JsRepairer {
    pub fn new(function: js_sys::Function) -> Self {
        Self { function }
    }
}

impl Repairer for JsRepairer {
    fn repair(&self, text: &str) -> Result<String, String> {
        let result = self
            .function
            .call1(&JsValue::NULL, &JsValue::from_str(text))
            .map_err(|e| js_error_message(&e))?;
        result
            .as_string()
            .ok_or_else(|| "repair function did not return a string".to_string())
    }
}

/// A `(text, query) => any` jq-style filter. Returning `undefined` means the
/// query produced nothing; a throw is a filter error.
pub struct JsFilter {
    function: js_sys::Function,
}

impl JsFilter {
    pub fn new(function: js_sys::Function) -> Self {
        Self { function }
    }
}

impl JsonFilter for JsFilter {
    fn apply(&self, text: &str, query: &str) -> Result<Option<Value>, String> {
        let result = self
            .function
            .call2(&JsValue::NULL, &JsValue::from_str(text), &JsValue::from_str(query))
            .map_err(|e| js_error_message(&e))?;
        if result.is_undefined() {
            return Ok(None);
        }
        serde_wasm_bindgen::from_value(result)
            .map(Some)
            .map_err(|e| format!("filter returned a value that is not JSON: {}", e))
    }
}

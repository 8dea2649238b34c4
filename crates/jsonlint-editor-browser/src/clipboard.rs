//! Browser clipboard implementation.
//!
//! Uses the async Clipboard API, which needs no clipboard event and so
//! works from buttons and keyboard shortcuts alike.

use jsonlint_editor_core::{Clipboard, PlatformError};
use wasm_bindgen::JsValue;

/// `navigator.clipboard` as a [`Clipboard`].
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserClipboard;

impl Clipboard for BrowserClipboard {
    async fn write_text(&self, text: &str) -> Result<(), PlatformError> {
        write_clipboard_text(text)
            .await
            .map_err(|e| PlatformError(format!("{:?}", e)))
    }
}

/// Write plain text to the clipboard.
pub async fn write_clipboard_text(text: &str) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let clipboard = window.navigator().clipboard();
    wasm_bindgen_futures::JsFuture::from(clipboard.write_text(text)).await?;
    tracing::debug!(target: "jsonlint::clipboard", chars = text.chars().count(), "wrote text to clipboard");
    Ok(())
}

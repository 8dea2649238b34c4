//! Browser DOM layer for the jsonlint editor.
//!
//! This crate provides the browser implementations of the core's platform
//! traits. It assumes a `wasm32-unknown-unknown` target environment.
//!
//! # Architecture
//!
//! - `cursor`: caret translation over DOM nodes and the window selection
//! - `surface`: editor and gutter elements as a render host, downloads
//! - `storage`: LocalStorage as a key-value store
//! - `clipboard`: async Clipboard API
//! - `events`: beforeinput and keydown handling
//!
//! # Re-exports
//!
//! This crate re-exports `jsonlint-editor-core` for convenience, so consumers
//! only need to depend on `jsonlint-editor-browser`.

// Re-export core crate
pub use jsonlint_editor_core;
pub use jsonlint_editor_core::*;

pub mod clipboard;
pub mod cursor;
pub mod events;
pub mod storage;
pub mod surface;

pub use clipboard::BrowserClipboard;
pub use cursor::{BrowserCaret, DomNode, dom_point_to_offset, offset_to_dom_point};
pub use events::{
    BeforeInputResult, get_target_range_from_event, handle_beforeinput, parse_browser_input_type,
    shortcut_from_event,
};
pub use storage::LocalStore;
pub use surface::{DomSurface, download_text};

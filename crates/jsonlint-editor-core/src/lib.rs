//! jsonlint-editor-core: the JSON editor without a browser.
//!
//! This crate provides:
//! - `highlight` - line tokenizer and highlighted markup
//! - `caret` - logical offset <-> rendered tree point translation
//! - `fold` - collapsible bracket ranges over a `LineView`
//! - `gutter` - line numbers and fold toggles
//! - `Session` - the controller that owns the buffer and drives renders,
//!   generic over its host and key-value store
//!
//! Platform crates implement the traits in [`platform`] and
//! [`storage::KeyValueStore`]; [`markup::MarkupSurface`] is the headless host.

pub mod actions;
pub mod caret;
pub mod codec;
pub mod config;
pub mod error;
pub mod fold;
pub mod gutter;
pub mod highlight;
pub mod lines;
pub mod markup;
pub mod platform;
pub mod session;
pub mod share;
pub mod storage;
pub mod text;
pub mod types;

pub use actions::{Command, EditorAction, InputDecision, InputType, Range, Shortcut, action_for_input};
pub use caret::{CaretNode, CaretPoint, collect_text, get_position, set_position};
pub use codec::{JsonCodec, JsonFilter, NoFilter, NoRepair, Repairer, SerdeJsonCodec};
pub use config::{EXAMPLE_DOCUMENT, EditorConfig};
pub use error::{EditorError, ParseFailure};
pub use fold::{Fold, FoldChange, FoldState};
pub use gutter::render_gutter;
pub use highlight::{Token, TokenKind, highlight, tokenize_line};
pub use lines::{LineView, RenderedLine, logical_lines};
pub use markup::{MarkupSurface, MarkupTree, strip_markup};
pub use platform::{
    Clipboard, Downloader, EditorHost, Notice, NoticeLevel, Notifier, PlatformError, RenderSurface,
};
pub use session::{COPY_ACK, SHARE_ACK, Session, copy_text};
pub use storage::{FileStore, KeyValueStore, MemoryStore, SavedAt, StoredFile, StoredRecord};
pub use text::{LogicalBuffer, char_to_utf16_offset, utf16_to_char_offset};
pub use types::{InputOutcome, Selection, SessionState};

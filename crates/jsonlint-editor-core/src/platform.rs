//! Platform abstraction traits for the editor session.
//!
//! These define the seam between the session logic and whatever actually
//! shows the editor (browser DOM, a test double). The session is the only
//! writer of the surface; implementations only apply what they are given.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::types::Selection;

/// Error type for platform operations.
#[derive(Debug, Clone)]
pub struct PlatformError(pub String);

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for PlatformError {}

impl From<&str> for PlatformError {
    fn from(s: &str) -> Self {
        PlatformError(s.to_string())
    }
}

impl From<String> for PlatformError {
    fn from(s: String) -> Self {
        PlatformError(s)
    }
}

/// Severity of a user-visible notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NoticeLevel {
    Success,
    Error,
    Info,
}

/// A toast-style message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }
}

/// Receives notices produced by commands.
pub trait Notifier {
    fn notify(&self, notice: Notice);
}

/// Offers text to the user as a downloadable file.
pub trait Downloader {
    fn download(&self, file_name: &str, text: &str) -> Result<(), PlatformError>;
}

/// Writes text to the system clipboard.
///
/// The write settles asynchronously; callers always learn whether it worked.
pub trait Clipboard {
    fn write_text(&self, text: &str) -> impl Future<Output = Result<(), PlatformError>>;
}

/// The editable surface and its gutter.
///
/// The session hands over complete markup on every pass and reads the caret
/// back as a logical char offset, so implementations never need to know how
/// the markup was produced.
pub trait RenderSurface {
    /// Replace the editor's and the gutter's content.
    fn render(&self, editor_markup: &str, gutter_markup: &str) -> Result<(), PlatformError>;

    /// Replace only the gutter's content.
    fn render_gutter(&self, gutter_markup: &str) -> Result<(), PlatformError>;

    /// Current caret as a logical char offset, `None` when the selection is
    /// outside the editor.
    fn caret(&self) -> Option<usize>;

    /// Current selection as logical char offsets.
    fn selection(&self) -> Option<Selection> {
        self.caret().map(Selection::collapsed)
    }

    /// Place a collapsed caret at a logical char offset.
    fn restore_caret(&self, offset: usize) -> Result<(), PlatformError>;
}

/// Everything a session needs from its host besides storage.
pub trait EditorHost: RenderSurface + Notifier + Downloader {}

impl<T: RenderSurface + Notifier + Downloader> EditorHost for T {}

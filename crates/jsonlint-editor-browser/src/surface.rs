//! The editor and gutter elements as a render host.

use jsonlint_editor_core::{
    Downloader, Notice, Notifier, PlatformError, RenderSurface, Selection, collect_text,
};
use wasm_bindgen::{JsCast, JsValue};

use crate::cursor::{BrowserCaret, DomNode};

/// A `contenteditable` editor element, its gutter, and a notifier for
/// user-visible messages.
///
/// The session writes both elements wholesale on every pass; nothing here
/// edits them incrementally.
pub struct DomSurface<N> {
    editor: web_sys::HtmlElement,
    gutter: web_sys::HtmlElement,
    caret: BrowserCaret,
    notifier: N,
}

impl<N> DomSurface<N> {
    pub fn new(editor: web_sys::HtmlElement, gutter: web_sys::HtmlElement, notifier: N) -> Self {
        Self {
            caret: BrowserCaret::new(editor.clone()),
            editor,
            gutter,
            notifier,
        }
    }

    /// Look both elements up by id.
    pub fn from_ids(editor_id: &str, gutter_id: &str, notifier: N) -> Result<Self, PlatformError> {
        let document = web_sys::window()
            .ok_or("no window")?
            .document()
            .ok_or("no document")?;
        let find = |id: &str| -> Result<web_sys::HtmlElement, PlatformError> {
            document
                .get_element_by_id(id)
                .ok_or_else(|| format!("element not found: {id}"))?
                .dyn_into::<web_sys::HtmlElement>()
                .map_err(|_| format!("element is not an HtmlElement: {id}").into())
        };
        Ok(Self::new(find(editor_id)?, find(gutter_id)?, notifier))
    }

    pub fn editor(&self) -> &web_sys::HtmlElement {
        &self.editor
    }

    pub fn gutter(&self) -> &web_sys::HtmlElement {
        &self.gutter
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Text currently shown in the editor element, fold indicators excluded.
    pub fn text(&self) -> String {
        let root: &web_sys::Node = self.editor.as_ref();
        collect_text(&DomNode(root.clone()))
    }
}

impl<N> RenderSurface for DomSurface<N> {
    fn render(&self, editor_markup: &str, gutter_markup: &str) -> Result<(), PlatformError> {
        self.editor.set_inner_html(editor_markup);
        self.gutter.set_inner_html(gutter_markup);
        Ok(())
    }

    fn render_gutter(&self, gutter_markup: &str) -> Result<(), PlatformError> {
        self.gutter.set_inner_html(gutter_markup);
        Ok(())
    }

    fn caret(&self) -> Option<usize> {
        self.caret.caret()
    }

    fn selection(&self) -> Option<Selection> {
        self.caret.selection()
    }

    fn restore_caret(&self, offset: usize) -> Result<(), PlatformError> {
        self.caret.restore(offset)
    }
}

impl<N: Notifier> Notifier for DomSurface<N> {
    fn notify(&self, notice: Notice) {
        self.notifier.notify(notice);
    }
}

impl<N> Downloader for DomSurface<N> {
    fn download(&self, file_name: &str, text: &str) -> Result<(), PlatformError> {
        download_text(file_name, text).map_err(|e| format!("download failed: {:?}", e).into())
    }
}

/// Offer `text` as a JSON file download through a temporary object URL.
pub fn download_text(file_name: &str, text: &str) -> Result<(), JsValue> {
    use js_sys::Array;
    use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let parts = Array::new();
    parts.push(&JsValue::from_str(text));
    let opts = BlobPropertyBag::new();
    opts.set_type("application/json");
    let blob = Blob::new_with_str_sequence_and_options(&parts, &opts)?;
    let url = Url::create_object_url_with_blob(&blob)?;

    let anchor: HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
    anchor.set_href(&url);
    anchor.set_download(file_name);
    anchor.click();
    Url::revoke_object_url(&url)?;

    tracing::debug!(target: "jsonlint::session", file_name, bytes = text.len(), "offered download");
    Ok(())
}

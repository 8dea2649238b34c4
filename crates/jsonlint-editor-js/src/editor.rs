//! JsEditor - the main editor wrapper for JavaScript.

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::HtmlElement;

use jsonlint_editor_browser::{BrowserClipboard, DomSurface, LocalStore};
use jsonlint_editor_core::{COPY_ACK, Command, EditorConfig, SHARE_ACK, Session, copy_text};

use crate::callbacks::{JsFilter, JsNotifier, JsRepairer};
use crate::types::{JsEditorConfig, JsStoredFile};

pub(crate) type InnerSession = Session<DomSurface<JsNotifier>, LocalStore>;

/// The main editor instance exposed to JavaScript.
///
/// Wraps the core session with WASM bindings for browser use.
#[wasm_bindgen]
pub struct JsEditor {
    pub(crate) session: InnerSession,
}

#[wasm_bindgen]
impl JsEditor {
    /// Mount a new editor into `container`.
    ///
    /// Creates the gutter and the contenteditable element inside the
    /// container. `onNotice` receives `{ level, message }` objects,
    /// `repair` is an optional `(text) => string` used when linting fails,
    /// and `filter` an optional `(text, query) => any` jq-style filter.
    #[wasm_bindgen(constructor)]
    pub fn new(
        container: &HtmlElement,
        config: Option<JsEditorConfig>,
        on_notice: Option<js_sys::Function>,
        repair: Option<js_sys::Function>,
        filter: Option<js_sys::Function>,
    ) -> Result<JsEditor, JsError> {
        let config: EditorConfig = config.unwrap_or_default().into();
        let window = web_sys::window().ok_or_else(|| JsError::new("No window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsError::new("No document"))?;

        let create = |class: &str| -> Result<HtmlElement, JsError> {
            let el = document
                .create_element("div")
                .map_err(|e| JsError::new(&format!("Failed to create element: {:?}", e)))?;
            el.set_attribute("class", class)
                .map_err(|e| JsError::new(&format!("Failed to set class: {:?}", e)))?;
            container
                .append_child(&el)
                .map_err(|e| JsError::new(&format!("Failed to append child: {:?}", e)))?;
            el.dyn_into::<HtmlElement>()
                .map_err(|_| JsError::new("Created element is not an HtmlElement"))
        };

        let gutter = create(&config.gutter_class)?;
        let editor = create(&config.editor_class)?;
        editor
            .set_attribute("contenteditable", "true")
            .map_err(|e| JsError::new(&format!("Failed to set contenteditable: {:?}", e)))?;
        editor
            .set_attribute("spellcheck", "false")
            .map_err(|e| JsError::new(&format!("Failed to set spellcheck: {:?}", e)))?;

        let surface = DomSurface::new(editor, gutter, JsNotifier::new(on_notice));
        let mut session = Session::new(surface, LocalStore::new(), config);
        if let Some(function) = repair {
            session = session.with_repairer(JsRepairer::new(function));
        }
        if let Some(function) = filter {
            session = session.with_filter(JsFilter::new(function));
        }
        session.refresh();

        Ok(Self { session })
    }

    // === Content access ===

    #[wasm_bindgen(js_name = getText)]
    pub fn get_text(&self) -> String {
        self.session.text()
    }

    /// Replace the content without formatting it.
    #[wasm_bindgen(js_name = setText)]
    pub fn set_text(&mut self, text: &str) {
        self.session.set_text(text);
    }

    /// Caret as a char offset, `undefined` when the editor has none.
    #[wasm_bindgen(js_name = getCaret)]
    pub fn get_caret(&self) -> Option<usize> {
        self.session.caret()
    }

    // === Commands ===
    //
    // Each returns whether it succeeded; failures were already shown
    // through the notice callback.

    /// Format the content, repairing it first if it does not parse.
    #[wasm_bindgen]
    pub fn lint(&mut self) -> bool {
        self.session.run(Command::Lint)
    }

    #[wasm_bindgen]
    pub fn minify(&mut self) -> bool {
        self.session.run(Command::Minify)
    }

    #[wasm_bindgen]
    pub fn repair(&mut self) -> bool {
        self.session.run(Command::Repair)
    }

    #[wasm_bindgen]
    pub fn clear(&mut self) -> bool {
        self.session.run(Command::Clear)
    }

    #[wasm_bindgen(js_name = loadExample)]
    pub fn load_example(&mut self) -> bool {
        self.session.run(Command::LoadExample)
    }

    #[wasm_bindgen]
    pub fn download(&mut self) -> bool {
        self.session.run(Command::Download)
    }

    /// Replace the content with the result of a jq-style query.
    #[wasm_bindgen(js_name = applyFilter)]
    pub fn apply_filter(&mut self, query: &str) -> bool {
        self.session.run(Command::Filter(query.to_string()))
    }

    // === Saved files ===

    #[wasm_bindgen]
    pub fn save(&mut self, name: &str) -> bool {
        self.session.run(Command::Save(name.to_string()))
    }

    #[wasm_bindgen]
    pub fn load(&mut self, name: &str) -> bool {
        self.session.run(Command::Load(name.to_string()))
    }

    #[wasm_bindgen(js_name = deleteFile)]
    pub fn delete_file(&mut self, name: &str) -> bool {
        self.session.run(Command::Delete(name.to_string()))
    }

    #[wasm_bindgen(js_name = renameFile)]
    pub fn rename_file(&mut self, from: &str, to: &str) -> bool {
        self.session.run(Command::Rename {
            from: from.to_string(),
            to: to.to_string(),
        })
    }

    /// Saved files, sorted by name.
    #[wasm_bindgen(js_name = listFiles)]
    pub fn list_files(&self) -> Result<JsValue, JsError> {
        let files: Vec<JsStoredFile> = self
            .session
            .list_files()
            .into_iter()
            .map(JsStoredFile::from)
            .collect();
        serde_wasm_bindgen::to_value(&files)
            .map_err(|e| JsError::new(&format!("Failed to convert files: {}", e)))
    }

    // === Folding ===

    #[wasm_bindgen(js_name = toggleFold)]
    pub fn toggle_fold(&mut self, line: usize) -> bool {
        self.session.run(Command::ToggleFold(line))
    }

    #[wasm_bindgen(js_name = collapseAll)]
    pub fn collapse_all(&mut self) -> bool {
        self.session.run(Command::CollapseAll)
    }

    #[wasm_bindgen(js_name = expandAll)]
    pub fn expand_all(&mut self) -> bool {
        self.session.run(Command::ExpandAll)
    }

    // === Clipboard and sharing ===

    /// Copy the content to the clipboard.
    ///
    /// The promise resolves once the write settled; the outcome is also
    /// shown through the notice callback.
    #[wasm_bindgen]
    pub fn copy(&self) -> js_sys::Promise {
        self.spawn_copy(self.session.clipboard_text(), COPY_ACK)
    }

    /// Copy a link that reopens the current content, resolving to the link.
    #[wasm_bindgen]
    pub fn share(&self) -> js_sys::Promise {
        let href = web_sys::window()
            .and_then(|w| w.location().href().ok())
            .unwrap_or_default();
        match self.session.share_url(&href) {
            Ok(url) => self.spawn_copy(url, SHARE_ACK),
            Err(err) => {
                self.session.report(&err);
                js_sys::Promise::reject(&JsValue::from_str(&err.to_string()))
            }
        }
    }

    /// Load a document shared through the page's query string.
    ///
    /// Returns whether a shared document was loaded.
    #[wasm_bindgen(js_name = loadFromQuery)]
    pub fn load_from_query(&mut self) -> bool {
        let search = web_sys::window()
            .and_then(|w| w.location().search().ok())
            .unwrap_or_default();
        self.session.load_from_query(&search)
    }
}

impl JsEditor {
    fn spawn_copy(&self, text: String, ack: &'static str) -> js_sys::Promise {
        let notifier = self.session.host().notifier().clone();
        future_to_promise(async move {
            copy_text(&BrowserClipboard, &notifier, &text, ack)
                .await
                .map(|()| JsValue::from_str(&text))
                .map_err(|err| JsValue::from_str(&err.to_string()))
        })
    }
}

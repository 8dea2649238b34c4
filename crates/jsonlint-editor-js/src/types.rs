//! Types exposed to JavaScript via wasm-bindgen.

use jsonlint_editor_core::{EditorConfig, StoredFile};
use serde::{Deserialize, Serialize};
use tsify_next::Tsify;
use wasm_bindgen::prelude::*;

/// Editor options. Every field is optional and falls back to the default.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct JsEditorConfig {
    #[tsify(optional)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_prefix: Option<String>,
    #[tsify(optional)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indent: Option<usize>,
    #[tsify(optional)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_file_name: Option<String>,
    #[tsify(optional)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_param: Option<String>,
    #[tsify(optional)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    #[tsify(optional)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor_class: Option<String>,
    #[tsify(optional)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gutter_class: Option<String>,
}

impl From<JsEditorConfig> for EditorConfig {
    fn from(js: JsEditorConfig) -> Self {
        let defaults = EditorConfig::default();
        EditorConfig {
            storage_prefix: js.storage_prefix.unwrap_or(defaults.storage_prefix),
            indent: js.indent.unwrap_or(defaults.indent),
            download_file_name: js.download_file_name.unwrap_or(defaults.download_file_name),
            share_param: js.share_param.unwrap_or(defaults.share_param),
            example: js.example.unwrap_or(defaults.example),
            editor_class: js.editor_class.unwrap_or(defaults.editor_class),
            gutter_class: js.gutter_class.unwrap_or(defaults.gutter_class),
        }
    }
}

/// A saved file as listed to JavaScript.
#[derive(Debug, Clone, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct JsStoredFile {
    pub name: String,
    pub content: String,
    /// Time of the last save, RFC 3339 unless an older record stored
    /// another format.
    pub saved_at: String,
}

impl From<StoredFile> for JsStoredFile {
    fn from(file: StoredFile) -> Self {
        Self {
            name: file.name,
            content: file.content,
            saved_at: file.saved_at.to_string(),
        }
    }
}

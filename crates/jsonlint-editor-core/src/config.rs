//! Editor configuration.

use serde::{Deserialize, Serialize};

/// Sample document loaded by the "load example" command.
pub const EXAMPLE_DOCUMENT: &str = r#"{"name":"John Doe","age":30,"isStudent":false,"courses":["Math","Science"],"address":{"street":"123 Main St","city":"Anytown"}}"#;

/// Options for a [`Session`](crate::Session).
///
/// Every field has a default, so hosts can pass a partial object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Key prefix for saved files in the key-value store.
    pub storage_prefix: String,
    /// Spaces per level when pretty printing.
    pub indent: usize,
    /// File name offered by the download command.
    pub download_file_name: String,
    /// Query parameter that carries a shared document.
    pub share_param: String,
    /// Document loaded by the example command.
    pub example: String,
    /// Class set on the editable element.
    pub editor_class: String,
    /// Class set on the gutter element.
    pub gutter_class: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            storage_prefix: "lnt_".into(),
            indent: 2,
            download_file_name: "data.json".into(),
            share_param: "json".into(),
            example: EXAMPLE_DOCUMENT.into(),
            editor_class: "json-editor".into(),
            gutter_class: "line-numbers".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: EditorConfig = serde_json::from_str(r#"{"indent":4}"#).unwrap();
        assert_eq!(config.indent, 4);
        assert_eq!(config.storage_prefix, "lnt_");
        assert_eq!(config.share_param, "json");
    }

    #[test]
    fn test_example_is_valid_json() {
        let value: serde_json::Value = serde_json::from_str(EXAMPLE_DOCUMENT).unwrap();
        assert_eq!(value["age"], 30);
        assert_eq!(value["address"]["city"], "Anytown");
    }
}

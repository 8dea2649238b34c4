//! Saved files in a key-value store.
//!
//! ## Storage key strategy
//!
//! Each file lives under `"{prefix}{name}"`, prefix `lnt_` by default, so
//! saved files can share the store with unrelated keys. The value is a JSON
//! record `{"content": ..., "date": ...}`. Dates are written as RFC 3339;
//! records holding a free-form date string (e.g. a browser's
//! `toLocaleString()`) are still read, with the date kept verbatim.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EditorError;
use crate::platform::PlatformError;

/// String key-value storage, such as browser LocalStorage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), PlatformError>;
    fn remove(&mut self, key: &str);
    fn keys(&self) -> Vec<String>;
}

/// In-memory [`KeyValueStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PlatformError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

/// When a file was saved.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(untagged)]
pub enum SavedAt {
    Timestamp(DateTime<Utc>),
    /// A date string that is not RFC 3339, kept as written.
    Text(String),
}

impl SavedAt {
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            SavedAt::Timestamp(at) => Some(*at),
            SavedAt::Text(_) => None,
        }
    }
}

impl std::fmt::Display for SavedAt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SavedAt::Timestamp(at) => f.write_str(&at.to_rfc3339()),
            SavedAt::Text(text) => f.write_str(text),
        }
    }
}

impl From<DateTime<Utc>> for SavedAt {
    fn from(at: DateTime<Utc>) -> Self {
        SavedAt::Timestamp(at)
    }
}

/// The persisted value of one saved file.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct StoredRecord {
    pub content: String,
    pub date: SavedAt,
}

/// A saved file as listed to the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredFile {
    pub key: String,
    pub name: String,
    pub content: String,
    pub saved_at: SavedAt,
}

/// Saved files under one key prefix.
#[derive(Debug, Clone)]
pub struct FileStore<S> {
    store: S,
    prefix: String,
}

impl<S: KeyValueStore> FileStore<S> {
    pub fn new(store: S, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }

    /// Build the full storage key from a file name.
    pub fn storage_key(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Save `content` as `name`, stamped with the current time.
    pub fn save(&mut self, name: &str, content: &str) -> Result<StoredFile, EditorError> {
        self.save_at(name, content, Utc::now())
    }

    /// Save `content` as `name` with an explicit timestamp.
    pub fn save_at(
        &mut self,
        name: &str,
        content: &str,
        saved_at: DateTime<Utc>,
    ) -> Result<StoredFile, EditorError> {
        let name = valid_name(name)?;
        let record = StoredRecord {
            content: content.to_string(),
            date: saved_at.into(),
        };
        let value = serde_json::to_string(&record).map_err(|e| EditorError::Storage(e.to_string()))?;
        let key = self.storage_key(name);
        self.store
            .set(&key, &value)
            .map_err(|e| EditorError::Storage(e.0))?;
        tracing::debug!(target: "jsonlint::storage", %key, bytes = value.len(), "saved file");
        Ok(StoredFile {
            key,
            name: name.to_string(),
            content: record.content,
            saved_at: record.date,
        })
    }

    pub fn load(&self, name: &str) -> Result<StoredFile, EditorError> {
        let key = self.storage_key(name);
        let raw = self.store.get(&key).ok_or_else(|| EditorError::StorageMiss {
            name: name.to_string(),
        })?;
        let record: StoredRecord = serde_json::from_str(&raw).map_err(|e| {
            tracing::warn!(target: "jsonlint::storage", %key, error = %e, "unreadable record");
            EditorError::Storage("Error loading file".into())
        })?;
        Ok(StoredFile {
            key,
            name: name.to_string(),
            content: record.content,
            saved_at: record.date,
        })
    }

    pub fn delete(&mut self, name: &str) -> Result<(), EditorError> {
        let key = self.storage_key(name);
        if self.store.get(&key).is_none() {
            return Err(EditorError::StorageMiss {
                name: name.to_string(),
            });
        }
        self.store.remove(&key);
        tracing::debug!(target: "jsonlint::storage", %key, "deleted file");
        Ok(())
    }

    /// Move a file to a new name. The stored value is copied as is.
    ///
    /// Renaming to the same name is a no-op.
    pub fn rename(&mut self, from: &str, to: &str) -> Result<(), EditorError> {
        let to = valid_name(to)?;
        if from == to {
            return Ok(());
        }
        let old_key = self.storage_key(from);
        let raw = self.store.get(&old_key).ok_or_else(|| EditorError::StorageMiss {
            name: from.to_string(),
        })?;
        let new_key = self.storage_key(to);
        self.store
            .set(&new_key, &raw)
            .map_err(|e| EditorError::Storage(e.0))?;
        self.store.remove(&old_key);
        tracing::debug!(target: "jsonlint::storage", %old_key, %new_key, "renamed file");
        Ok(())
    }

    /// Every readable file under the prefix, ordered by name.
    ///
    /// Records that fail to parse are skipped.
    pub fn list(&self) -> Vec<StoredFile> {
        let mut files: Vec<StoredFile> = self
            .store
            .keys()
            .into_iter()
            .filter_map(|key| {
                let name = key.strip_prefix(&self.prefix)?.to_string();
                let raw = self.store.get(&key)?;
                let record: StoredRecord = serde_json::from_str(&raw).ok()?;
                Some(StoredFile {
                    key,
                    name,
                    content: record.content,
                    saved_at: record.date,
                })
            })
            .collect();
        files.sort_by(|a, b| a.name.cmp(&b.name));
        files
    }
}

fn valid_name(name: &str) -> Result<&str, EditorError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(EditorError::InvalidFileName);
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_save_uses_prefixed_key() {
        let mut files = FileStore::new(MemoryStore::new(), "lnt_");
        let saved = files.save_at("testFile", "{\"a\": 1}", fixed_time()).unwrap();
        assert_eq!(saved.key, "lnt_testFile");

        let raw = files.store().get("lnt_testFile").unwrap();
        let record: StoredRecord = serde_json::from_str(&raw).unwrap();
        assert_eq!(record.content, "{\"a\": 1}");
        assert_eq!(record.date, SavedAt::Timestamp(fixed_time()));
        assert!(raw.contains(r#""date":"2024-05-01T12:00:00Z""#));
    }

    #[test]
    fn test_load_roundtrip_and_miss() {
        let mut files = FileStore::new(MemoryStore::new(), "lnt_");
        files.save_at("a", "[1]", fixed_time()).unwrap();
        assert_eq!(files.load("a").unwrap().content, "[1]");
        assert!(matches!(
            files.load("b"),
            Err(EditorError::StorageMiss { name }) if name == "b"
        ));
    }

    #[test]
    fn test_reads_javascript_dates() {
        let mut store = MemoryStore::new();
        store
            .set(
                "lnt_old",
                r#"{"content":"{}","date":"2023-11-02T08:30:00.000Z"}"#,
            )
            .unwrap();
        let files = FileStore::new(store, "lnt_");
        let loaded = files.load("old").unwrap();
        assert_eq!(loaded.content, "{}");
        assert_eq!(loaded.saved_at.to_string(), "2023-11-02T08:30:00+00:00");
    }

    #[test]
    fn test_reads_locale_dates() {
        let mut store = MemoryStore::new();
        store
            .set("lnt_old", r#"{"content":"{}","date":"10/14/2026, 3:00:00 PM"}"#)
            .unwrap();
        let files = FileStore::new(store, "lnt_");

        let loaded = files.load("old").unwrap();
        assert_eq!(loaded.content, "{}");
        assert_eq!(loaded.saved_at, SavedAt::Text("10/14/2026, 3:00:00 PM".into()));
        assert_eq!(loaded.saved_at.timestamp(), None);

        let listed = files.list();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].saved_at.to_string(), "10/14/2026, 3:00:00 PM");
    }

    #[test]
    fn test_list_skips_foreign_and_broken_records() {
        let mut store = MemoryStore::new();
        store.set("theme", "dark").unwrap();
        store.set("lnt_broken", "not a record").unwrap();
        let mut files = FileStore::new(store, "lnt_");
        files.save_at("b", "2", fixed_time()).unwrap();
        files.save_at("a", "1", fixed_time()).unwrap();

        let names: Vec<String> = files.list().into_iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_rename_moves_raw_value() {
        let mut files = FileStore::new(MemoryStore::new(), "lnt_");
        files.save_at("old", "{}", fixed_time()).unwrap();
        let before = files.store().get("lnt_old").unwrap();

        files.rename("old", "new").unwrap();
        assert_eq!(files.store().get("lnt_new"), Some(before));
        assert_eq!(files.store().get("lnt_old"), None);

        files.rename("new", "new").unwrap();
        assert!(files.store().get("lnt_new").is_some());
        assert!(matches!(files.rename("ghost", "x"), Err(EditorError::StorageMiss { .. })));
    }

    #[test]
    fn test_delete_and_invalid_names() {
        let mut files = FileStore::new(MemoryStore::new(), "lnt_");
        files.save_at("a", "1", fixed_time()).unwrap();
        files.delete("a").unwrap();
        assert!(files.list().is_empty());
        assert!(matches!(files.delete("a"), Err(EditorError::StorageMiss { .. })));
        assert!(matches!(
            files.save_at("  ", "1", fixed_time()),
            Err(EditorError::InvalidFileName)
        ));
    }
}

//! Durable key-value storage backed by a single JSON document.
//!
//! The handle only remembers a path. Every call opens the document, does its work and
//! releases the file again; writes replace the whole document atomically.

use std::path::{Path, PathBuf};

use crate::error::StorageError;

#[derive(Debug, Clone)]
pub struct LocalStorage {
    path: PathBuf,
}

impl LocalStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Absent, unreadable and malformed documents all read as `None`.
    pub fn get(&self, key: &str) -> Option<serde_json::Value> {
        let mut document = self.read_document().ok()??;
        document.remove(key)
    }

    pub fn set(&self, key: &str, value: serde_json::Value) -> Result<(), StorageError> {
        let mut document = match self.read_document() {
            Ok(Some(document)) => document,
            Ok(None) => serde_json::Map::new(),
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    %err,
                    "replacing unreadable storage document"
                );
                serde_json::Map::new()
            }
        };
        document.insert(key.to_owned(), value);
        write_json_atomic(&self.path, &serde_json::Value::Object(document))
    }

    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        let Ok(Some(mut document)) = self.read_document() else {
            return Ok(());
        };
        if document.remove(key).is_none() {
            return Ok(());
        }
        write_json_atomic(&self.path, &serde_json::Value::Object(document))
    }

    fn read_document(
        &self,
    ) -> Result<Option<serde_json::Map<String, serde_json::Value>>, StorageError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StorageError::Io {
                    path: self.path.display().to_string(),
                    source,
                });
            }
        };
        let value: serde_json::Value = serde_json::from_slice(&bytes)?;
        match value {
            serde_json::Value::Object(map) => Ok(Some(map)),
            _ => Ok(None),
        }
    }
}

fn write_json_atomic(path: &Path, value: &serde_json::Value) -> Result<(), StorageError> {
    let io_err = |path: &Path| {
        let path = path.display().to_string();
        move |source: std::io::Error| StorageError::Io { path, source }
    };

    let parent = path.parent().ok_or_else(|| StorageError::NoParent {
        path: path.display().to_string(),
    })?;
    if !parent.as_os_str().is_empty() {
        std::fs::create_dir_all(parent).map_err(io_err(parent))?;
    }

    let tmp_path = path.with_extension(format!("tmp.{}", uuid::Uuid::new_v4().simple()));
    let data = serde_json::to_vec_pretty(value)?;
    std::fs::write(&tmp_path, &data).map_err(io_err(&tmp_path))?;
    if let Err(source) = std::fs::rename(&tmp_path, path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(StorageError::Io {
            path: path.display().to_string(),
            source,
        });
    }
    Ok(())
}

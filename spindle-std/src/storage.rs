//! JSON document storage with a backup copy.
//!
//! Documents live at `<root>/<parent>/<name>`. Before every write the current
//! file is copied to `<root>/<parent>/backup/<name>`, but only if it still
//! parses, so a corrupted write never overwrites the last good backup. On
//! load, an unreadable primary falls back to the backup.

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Errors from [`JsonStore`] operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// A file or directory could not be read or written.
    #[error("storage I/O on {path}: {source}")]
    Io {
        /// The path involved.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A document could not be serialized.
    #[error("failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> StorageError + '_ {
    move |source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Root of the JSON storage tree.
#[derive(Debug, Clone)]
pub struct JsonStore {
    root: PathBuf,
}

impl JsonStore {
    /// Create a store rooted at `root`. Nothing is touched until a document
    /// is opened.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The storage root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Open (or create) the document `parent/name`.
    pub fn document<T>(&self, parent: &str, name: &str) -> Result<StoredDocument<T>, StorageError>
    where
        T: Serialize + DeserializeOwned + Default,
    {
        let dir = self.root.join(parent);
        let backup_dir = dir.join("backup");
        fs::create_dir_all(&backup_dir).map_err(io_err(&backup_dir))?;

        let path = dir.join(name);
        let backup = backup_dir.join(name);
        let data = load(&path, &backup);
        Ok(StoredDocument { path, backup, data })
    }

    /// Open (or create) a string-keyed map document.
    pub fn map(&self, parent: &str, name: &str) -> Result<JsonMap, StorageError> {
        self.document(parent, name)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let content = fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
}

fn load<T: DeserializeOwned + Default>(path: &Path, backup: &Path) -> T {
    if let Some(data) = read_json(path) {
        return data;
    }
    if let Some(data) = read_json(backup) {
        tracing::warn!(path = %path.display(), "loaded backup copy");
        return data;
    }
    if path.exists() {
        tracing::error!(path = %path.display(), "could not load document, starting empty");
    }
    T::default()
}

/// A JSON document kept in memory and written back on [`sync`](Self::sync).
#[derive(Debug)]
pub struct StoredDocument<T> {
    path: PathBuf,
    backup: PathBuf,
    data: T,
}

impl<T: Serialize> StoredDocument<T> {
    /// The loaded value.
    pub fn data(&self) -> &T {
        &self.data
    }

    /// Mutable access. Changes are not persisted until [`sync`](Self::sync).
    pub fn data_mut(&mut self) -> &mut T {
        &mut self.data
    }

    /// Apply `f` and persist the result.
    pub fn update<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> Result<R, StorageError> {
        let out = f(&mut self.data);
        self.sync()?;
        Ok(out)
    }

    /// Refresh the backup from the current file, then write the document.
    pub fn sync(&self) -> Result<(), StorageError> {
        if read_json::<Value>(&self.path).is_some() {
            fs::copy(&self.path, &self.backup).map_err(io_err(&self.backup))?;
        } else if self.path.exists() {
            tracing::warn!(path = %self.path.display(), "current file is not valid, keeping old backup");
        }
        let content = serde_json::to_string_pretty(&self.data)?;
        fs::write(&self.path, content).map_err(io_err(&self.path))
    }

    /// Where the document is stored.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// A string-keyed JSON document. Every mutation is persisted immediately.
pub type JsonMap = StoredDocument<BTreeMap<String, Value>>;

impl StoredDocument<BTreeMap<String, Value>> {
    /// Value under `key`, if any.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Store `value` under `key` and persist.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<Option<Value>, StorageError> {
        let (key, value) = (key.into(), value.into());
        self.update(|data| data.insert(key, value))
    }

    /// Remove `key` and persist.
    pub fn remove(&mut self, key: &str) -> Result<Option<Value>, StorageError> {
        self.update(|data| data.remove(key))
    }
}

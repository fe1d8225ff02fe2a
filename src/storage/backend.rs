//! Storage backend interface
//!
//! The operations every storage backend offers, addressed by logical name.

use chrono::{DateTime, Local};
use std::fs::OpenOptions;
use std::io::{Read, Seek, Write};
use std::path::PathBuf;

use crate::error::StorageError;
use crate::storage::content::Content;
use crate::storage::results::ListResult;

/// How `open` should open an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Read an existing entry.
    Read,
    /// Create or truncate.
    Write,
    /// Create if missing, write at the end.
    Append,
    /// Read and write an existing entry.
    ReadWrite,
}

impl OpenMode {
    pub fn options(self) -> OpenOptions {
        let mut options = OpenOptions::new();
        match self {
            OpenMode::Read => options.read(true),
            OpenMode::Write => options.write(true).create(true).truncate(true),
            OpenMode::Append => options.append(true).create(true),
            OpenMode::ReadWrite => options.read(true).write(true),
        };
        options
    }
}

/// An open stored entry.
pub trait StorageFile: Read + Write + Seek + Send {}

impl<T: Read + Write + Seek + Send> StorageFile for T {}

/// A named byte-stream store.
pub trait Storage: Send + Sync {
    /// Identifier of the implementation, e.g. `FileSystemStorage`.
    fn backend_name(&self) -> &'static str;

    fn exists(&self, name: &str) -> Result<bool, StorageError>;

    fn open(&self, name: &str, mode: OpenMode) -> Result<Box<dyn StorageFile>, StorageError>;

    /// Store `content` and return the name it was stored under, which may
    /// differ from the requested one.
    fn save(&self, name: Option<&str>, content: &mut dyn Content) -> Result<String, StorageError>;

    fn delete(&self, name: &str) -> Result<(), StorageError>;

    fn listdir(&self, name: &str) -> Result<ListResult, StorageError>;

    fn path(&self, name: &str) -> Result<PathBuf, StorageError>;

    fn size(&self, name: &str) -> Result<u64, StorageError>;

    fn accessed_time(&self, name: &str) -> Result<DateTime<Local>, StorageError>;

    fn created_time(&self, name: &str) -> Result<DateTime<Local>, StorageError>;

    fn modified_time(&self, name: &str) -> Result<DateTime<Local>, StorageError>;

    fn uri(&self, name: &str) -> Result<String, StorageError>;
}

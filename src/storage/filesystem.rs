//! Filesystem storage
//!
//! Stores content as ordinary files beneath a root directory. Every logical
//! name is confined to that root before any system call is made.

use chrono::{DateTime, Local};
use log::{debug, error, info};
use std::fmt;
use std::fs::{self, Metadata};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use crate::error::StorageError;
use crate::storage::backend::{OpenMode, Storage, StorageFile};
use crate::storage::content::Content;
use crate::storage::naming::{MAX_NAME_ATTEMPTS, make_unique};
use crate::storage::operations::{FsOps, OsFs, ensure_directory, remove_entry};
use crate::storage::results::ListResult;
use crate::storage::transfer::{copy_chunked, discard_partial, move_file};
use crate::storage::uri::filepath_to_uri;
use crate::storage::validation::{absolute_path, safe_join, sanitize_name};

/// Storage backed by a local directory tree.
///
/// `base_uri` may be changed with [`set_base_uri`](Self::set_base_uri). That
/// takes `&mut self`, so a storage shared behind an `Arc` is effectively
/// immutable; callers that need to change it while other threads call
/// [`uri`](Self::uri) must add their own locking.
pub struct FileSystemStorage {
    base_location: String,
    location: PathBuf,
    base_uri: Option<String>,
    ops: Arc<dyn FsOps>,
}

impl fmt::Debug for FileSystemStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileSystemStorage")
            .field("location", &self.location)
            .field("base_uri", &self.base_uri)
            .finish()
    }
}

impl FileSystemStorage {
    /// Create a storage rooted at `location`. An empty location means the
    /// current working directory.
    pub fn new(location: &str, base_uri: Option<String>) -> Result<Self, StorageError> {
        let root = if location.is_empty() {
            std::env::current_dir()?
        } else {
            absolute_path(Path::new(location))?
        };

        debug!("FileSystemStorage rooted at {}", root.display());

        Ok(Self {
            base_location: location.to_string(),
            location: root,
            base_uri,
            ops: Arc::new(OsFs),
        })
    }

    /// Replace the filesystem calls used for creation, renames and removal.
    pub fn with_fs_ops(mut self, ops: Arc<dyn FsOps>) -> Self {
        self.ops = ops;
        self
    }

    /// The location as configured, before normalization.
    pub fn base_location(&self) -> &str {
        &self.base_location
    }

    /// The absolute storage root.
    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn base_uri(&self) -> Option<&str> {
        self.base_uri.as_deref()
    }

    pub fn set_base_uri(&mut self, base_uri: Option<String>) {
        self.base_uri = base_uri;
    }

    fn resolve(&self, name: &str) -> Result<PathBuf, StorageError> {
        safe_join(&self.location, &[name])
    }

    fn metadata(&self, name: &str) -> Result<Metadata, StorageError> {
        let path = self.resolve(name)?;
        fs::metadata(&path).map_err(|e| not_found_or(e, name))
    }

    /// Pick the name to save under: explicit name first, then the content's.
    fn requested_name(name: Option<&str>, content: &dyn Content) -> Result<String, StorageError> {
        match name.filter(|n| !n.is_empty()) {
            Some(n) => Ok(n.to_string()),
            None => content
                .name()
                .filter(|n| !n.is_empty())
                .map(str::to_string)
                .ok_or(StorageError::MissingName),
        }
    }

    /// Make sure the parent directory of `path` exists and is a directory.
    fn prepare_parent(&self, path: &Path, name: &str) -> Result<(), StorageError> {
        let Some(parent) = path.parent() else {
            return Ok(());
        };
        match fs::metadata(parent) {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(StorageError::NotADirectory(name.to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                ensure_directory(self.ops.as_ref(), parent)?;
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Pick a free name under `requested` and create its file exclusively.
    /// Losing a creation race to another saver means picking again.
    fn create_unique(&self, requested: &str) -> Result<(String, PathBuf, fs::File), StorageError> {
        for _ in 0..MAX_NAME_ATTEMPTS {
            let name = make_unique(requested, |candidate| self.exists(candidate))?;
            let path = self.resolve(&name)?;
            self.prepare_parent(&path, &name)?;

            match self.ops.create_new(&path) {
                Ok(file) => return Ok((name, path, file)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    debug!("{} was taken concurrently, picking another name", name);
                    continue;
                }
                Err(e) => {
                    error!("Failed to create {}: {}", path.display(), e);
                    return Err(e.into());
                }
            }
        }
        Err(StorageError::NameGeneration {
            name: requested.to_string(),
            attempts: MAX_NAME_ATTEMPTS,
        })
    }

    /// Move an existing file into storage and return its logical name.
    pub fn import(&self, name: &str, source: &Path) -> Result<String, StorageError> {
        let requested = sanitize_name(name)?;
        let final_name = make_unique(&requested, |candidate| self.exists(candidate))?;
        let path = self.resolve(&final_name)?;
        self.prepare_parent(&path, &final_name)?;

        move_file(self.ops.as_ref(), source, &path, false)
            .map_err(|e| not_found_or(e, &source.to_string_lossy()))?;

        info!("Imported {} as {}", source.display(), final_name);
        Ok(final_name)
    }
}

fn not_found_or(e: io::Error, name: &str) -> StorageError {
    if e.kind() == ErrorKind::NotFound {
        StorageError::FileNotFound(name.to_string())
    } else {
        StorageError::IoError(e)
    }
}

fn to_local(time: SystemTime) -> DateTime<Local> {
    DateTime::<Local>::from(time)
}

#[cfg(unix)]
fn status_changed(meta: &Metadata) -> io::Result<SystemTime> {
    use std::os::unix::fs::MetadataExt;
    use std::time::{Duration, UNIX_EPOCH};

    let secs = meta.ctime().max(0) as u64;
    Ok(UNIX_EPOCH + Duration::new(secs, meta.ctime_nsec() as u32))
}

#[cfg(not(unix))]
fn status_changed(_meta: &Metadata) -> io::Result<SystemTime> {
    Err(io::Error::new(
        ErrorKind::Unsupported,
        "creation time is not available on this platform",
    ))
}

impl Storage for FileSystemStorage {
    fn backend_name(&self) -> &'static str {
        "FileSystemStorage"
    }

    fn exists(&self, name: &str) -> Result<bool, StorageError> {
        let path = self.resolve(name)?;
        match fs::symlink_metadata(&path) {
            Ok(_) => Ok(true),
            // A file where a directory is expected means nothing below it exists.
            Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => {
                Ok(false)
            }
            Err(e) => {
                error!("Failed to stat {}: {}", path.display(), e);
                Err(e.into())
            }
        }
    }

    fn open(&self, name: &str, mode: OpenMode) -> Result<Box<dyn StorageFile>, StorageError> {
        let path = self.resolve(name)?;
        let file = mode.options().open(&path).map_err(|e| not_found_or(e, name))?;
        debug!("Opened {} ({:?})", path.display(), mode);
        Ok(Box::new(file))
    }

    fn save(&self, name: Option<&str>, content: &mut dyn Content) -> Result<String, StorageError> {
        let requested = sanitize_name(&Self::requested_name(name, content)?)?;
        let (final_name, path, mut file) = self.create_unique(&requested)?;

        match copy_chunked(content, &mut file) {
            Ok(bytes) => {
                info!(
                    "Saved {} (requested: {}, real: {}, {} bytes)",
                    final_name,
                    requested,
                    path.display(),
                    bytes
                );
                Ok(final_name)
            }
            Err(e) => {
                error!("Failed to write {}: {}", path.display(), e);
                drop(file);
                discard_partial(&path);
                Err(e.into())
            }
        }
    }

    fn delete(&self, name: &str) -> Result<(), StorageError> {
        let path = self.resolve(name)?;
        let is_dir = match fs::symlink_metadata(&path) {
            Ok(meta) => meta.is_dir(),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Delete of missing {} is a no-op", name);
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        remove_entry(self.ops.as_ref(), &path, is_dir)?;
        info!("Deleted {} (real: {})", name, path.display());
        Ok(())
    }

    fn listdir(&self, name: &str) -> Result<ListResult, StorageError> {
        let path = self.resolve(name)?;
        let entries = fs::read_dir(&path).map_err(|e| not_found_or(e, name))?;

        let mut result = ListResult::default();
        for entry in entries {
            let entry = entry?;
            let entry_name = entry.file_name().to_string_lossy().into_owned();
            // Follow symlinks so a link to a directory lists as a directory.
            if entry.path().is_dir() {
                result.directories.push(entry_name);
            } else {
                result.files.push(entry_name);
            }
        }

        debug!(
            "Listed {} (real: {}) - {} entries",
            name,
            path.display(),
            result.len()
        );
        Ok(result)
    }

    fn path(&self, name: &str) -> Result<PathBuf, StorageError> {
        self.resolve(name)
    }

    fn size(&self, name: &str) -> Result<u64, StorageError> {
        Ok(self.metadata(name)?.len())
    }

    fn accessed_time(&self, name: &str) -> Result<DateTime<Local>, StorageError> {
        Ok(to_local(self.metadata(name)?.accessed()?))
    }

    fn created_time(&self, name: &str) -> Result<DateTime<Local>, StorageError> {
        let meta = self.metadata(name)?;
        let created = meta.created().or_else(|_| status_changed(&meta))?;
        Ok(to_local(created))
    }

    fn modified_time(&self, name: &str) -> Result<DateTime<Local>, StorageError> {
        Ok(to_local(self.metadata(name)?.modified()?))
    }

    fn uri(&self, name: &str) -> Result<String, StorageError> {
        let base = self.base_uri.as_deref().ok_or(StorageError::MissingBaseUri)?;
        self.resolve(name)?;
        Ok(format!("{}{}", base, filepath_to_uri(name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::content::NamedContent;
    use std::io::Cursor;

    #[test]
    fn requested_name_prefers_explicit_name() {
        let content = NamedContent::new("from-content.txt", Cursor::new(b"x"));
        assert_eq!(
            FileSystemStorage::requested_name(Some("explicit.txt"), &content).unwrap(),
            "explicit.txt"
        );
        assert_eq!(
            FileSystemStorage::requested_name(Some(""), &content).unwrap(),
            "from-content.txt"
        );
    }

    #[test]
    fn requested_name_requires_some_name() {
        let content = Cursor::new(b"x");
        assert!(matches!(
            FileSystemStorage::requested_name(None, &content),
            Err(StorageError::MissingName)
        ));
    }

    #[test]
    fn debug_output_omits_fs_ops() {
        let storage = FileSystemStorage::new("/srv/media", None).unwrap();
        let rendered = format!("{:?}", storage);
        assert!(rendered.contains("FileSystemStorage"));
        assert!(rendered.contains("location"));
    }
}

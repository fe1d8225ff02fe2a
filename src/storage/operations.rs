//! Storage operations
//!
//! Low-level filesystem calls used by the storage backend. Directory creation,
//! exclusive file creation, renames and removals go through [`FsOps`] so they
//! can be replaced, and the two benign races (directory already created,
//! entry already removed) are absorbed here.

use log::{debug, error};
use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind};
use std::path::Path;

/// Filesystem calls the storage backend delegates to.
pub trait FsOps: Send + Sync {
    /// Create `path` and any missing parents.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Remove a file.
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Remove an empty directory.
    fn remove_dir(&self, path: &Path) -> io::Result<()>;

    /// Create a new file for writing, failing with `AlreadyExists` if
    /// anything is already at `path`.
    fn create_new(&self, path: &Path) -> io::Result<File> {
        OpenOptions::new().write(true).create_new(true).open(path)
    }

    /// Rename `from` to `to`.
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }
}

/// [`FsOps`] backed by `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFs;

impl FsOps for OsFs {
    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn remove_dir(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir(path)
    }
}

/// Create a directory, treating "already exists" as success.
pub fn ensure_directory(ops: &dyn FsOps, path: &Path) -> io::Result<()> {
    match ops.create_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            debug!("Directory {} was created concurrently", path.display());
            Ok(())
        }
        Err(e) => {
            error!("Failed to create directory {}: {}", path.display(), e);
            Err(e)
        }
    }
}

/// Remove a file or empty directory, treating "not found" as success.
pub fn remove_entry(ops: &dyn FsOps, path: &Path, is_dir: bool) -> io::Result<()> {
    let result = if is_dir {
        ops.remove_dir(path)
    } else {
        ops.remove_file(path)
    };

    match result {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("{} was already removed", path.display());
            Ok(())
        }
        Err(e) => {
            error!("Failed to remove {}: {}", path.display(), e);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing(ErrorKind);

    impl FsOps for Failing {
        fn create_dir_all(&self, _path: &Path) -> io::Result<()> {
            Err(io::Error::new(self.0, "simulated"))
        }

        fn remove_file(&self, _path: &Path) -> io::Result<()> {
            Err(io::Error::new(self.0, "simulated"))
        }

        fn remove_dir(&self, _path: &Path) -> io::Result<()> {
            Err(io::Error::new(self.0, "simulated"))
        }
    }

    #[test]
    fn already_exists_is_not_an_error_for_mkdir() {
        assert!(ensure_directory(&Failing(ErrorKind::AlreadyExists), Path::new("x")).is_ok());
    }

    #[test]
    fn not_found_is_not_an_error_for_remove() {
        let ops = Failing(ErrorKind::NotFound);
        assert!(remove_entry(&ops, Path::new("x"), false).is_ok());
        assert!(remove_entry(&ops, Path::new("x"), true).is_ok());
    }

    #[test]
    fn other_errors_propagate_unchanged() {
        let ops = Failing(ErrorKind::PermissionDenied);
        let err = ensure_directory(&ops, Path::new("x")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);

        let err = remove_entry(&ops, Path::new("x"), false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);

        // The benign kind for one call is not benign for the other.
        let err = ensure_directory(&Failing(ErrorKind::NotFound), Path::new("x")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}

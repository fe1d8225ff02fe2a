//! Error types
//!
//! Defines domain-specific error types for storage operations, backend
//! resolution and the command-line tool.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Storage module errors
#[derive(Debug)]
pub enum StorageError {
    /// The joined path would land outside the storage root.
    UnsafePath { path: PathBuf, base: PathBuf },
    FileNotFound(String),
    /// The unique-name search ran out of attempts.
    NameGeneration { name: String, attempts: usize },
    /// `save` was called without a name and the content carries none.
    MissingName,
    InvalidName(String),
    MissingBaseUri,
    NotADirectory(String),
    IoError(io::Error),
}

impl StorageError {
    /// Returns the underlying OS error kind, if this is an I/O failure.
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            StorageError::IoError(e) => Some(e.kind()),
            _ => None,
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::UnsafePath { path, base } => write!(
                f,
                "The joined path ({}) is located outside of the base path component ({})",
                path.display(),
                base.display()
            ),
            StorageError::FileNotFound(p) => write!(f, "File not found: {}", p),
            StorageError::NameGeneration { name, attempts } => write!(
                f,
                "Could not find a free name for {} after {} attempts",
                name, attempts
            ),
            StorageError::MissingName => {
                write!(f, "No name given and the content does not expose one")
            }
            StorageError::InvalidName(n) => write!(f, "Invalid file name: {:?}", n),
            StorageError::MissingBaseUri => {
                write!(f, "This storage has no base URI configured")
            }
            StorageError::NotADirectory(p) => write!(f, "Not a directory: {}", p),
            StorageError::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for StorageError {
    fn from(error: io::Error) -> Self {
        StorageError::IoError(error)
    }
}

/// Backend resolution errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The identifier has no `.` to split a module from an attribute.
    InvalidPath(String),
    ModuleNotFound(String),
    AttributeNotFound { module: String, attribute: String },
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::InvalidPath(id) => {
                write!(f, "{} isn't a dotted backend path", id)
            }
            ResolveError::ModuleNotFound(m) => write!(f, "No backend module named {}", m),
            ResolveError::AttributeNotFound { module, attribute } => write!(
                f,
                "Backend module {} does not define {}",
                module, attribute
            ),
        }
    }
}

impl std::error::Error for ResolveError {}

/// Top-level error for the command-line tool
#[derive(Debug)]
pub enum AppError {
    Storage(StorageError),
    Resolve(ResolveError),
    Config(config::ConfigError),
    IoError(io::Error),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Storage(e) => write!(f, "Storage error: {}", e),
            AppError::Resolve(e) => write!(f, "Backend error: {}", e),
            AppError::Config(e) => write!(f, "Configuration error: {}", e),
            AppError::IoError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for AppError {}

impl From<StorageError> for AppError {
    fn from(error: StorageError) -> Self {
        AppError::Storage(error)
    }
}

impl From<ResolveError> for AppError {
    fn from(error: ResolveError) -> Self {
        AppError::Resolve(error)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(error: config::ConfigError) -> Self {
        AppError::Config(error)
    }
}

impl From<io::Error> for AppError {
    fn from(error: io::Error) -> Self {
        AppError::IoError(error)
    }
}

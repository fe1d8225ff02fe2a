//! RAX Storage
//!
//! Named byte-stream storage confined to a root directory, with a
//! configuration-driven backend registry.

pub mod config;
pub mod error;
pub mod registry;
pub mod storage;

pub use crate::config::StorageConfig;
pub use error::{ResolveError, StorageError};
pub use registry::{BackendFactory, BackendRegistry};
pub use storage::{Content, FileSystemStorage, NamedContent, OpenMode, Storage};

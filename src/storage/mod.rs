//! File system storage management
//!
//! Handles named content storage, path confinement and the filesystem calls
//! behind them.

pub mod backend;
pub mod content;
pub mod filesystem;
pub mod naming;
pub mod operations;
pub mod results;
pub mod transfer;
pub mod uri;
pub mod validation;

// Re-export commonly used items
pub use backend::{OpenMode, Storage, StorageFile};
pub use content::{Content, NamedContent};
pub use filesystem::FileSystemStorage;
pub use naming::make_unique;
pub use operations::{FsOps, OsFs};
pub use results::ListResult;
pub use uri::filepath_to_uri;
pub use validation::{safe_join, sanitize_filename};

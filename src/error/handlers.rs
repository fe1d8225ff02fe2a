//! Error handlers
//!
//! Provides error reporting and exit-code mapping for the command-line tool.

use crate::error::types::{AppError, StorageError};
use log::error;

/// Log an application error
pub fn report_error(err: &AppError) {
    error!("rax-storage: {}", err);
}

/// Convert error to a process exit code
pub fn error_to_exit_code(err: &AppError) -> i32 {
    match err {
        AppError::Storage(e) => match e {
            StorageError::FileNotFound(_) => 2,
            StorageError::UnsafePath { .. } => 3,
            StorageError::NameGeneration { .. } => 4,
            StorageError::MissingName
            | StorageError::InvalidName(_)
            | StorageError::MissingBaseUri
            | StorageError::NotADirectory(_) => 5,
            StorageError::IoError(_) => 1,
        },
        AppError::Resolve(_) => 6,
        AppError::Config(_) => 7,
        AppError::IoError(_) => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResolveError;
    use std::path::PathBuf;

    #[test]
    fn distinct_kinds_get_distinct_codes() {
        let not_found = AppError::from(StorageError::FileNotFound("a".into()));
        let unsafe_path = AppError::from(StorageError::UnsafePath {
            path: PathBuf::from("/etc"),
            base: PathBuf::from("/data"),
        });
        let resolve = AppError::from(ResolveError::InvalidPath("x".into()));

        assert_eq!(error_to_exit_code(&not_found), 2);
        assert_eq!(error_to_exit_code(&unsafe_path), 3);
        assert_eq!(error_to_exit_code(&resolve), 6);
    }
}

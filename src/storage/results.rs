//! Storage result types
//!
//! Defines result structures returned by storage operations.

/// Result of a directory listing operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListResult {
    pub directories: Vec<String>,
    pub files: Vec<String>,
}

impl ListResult {
    /// Total number of entries
    pub fn len(&self) -> usize {
        self.directories.len() + self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directories.is_empty() && self.files.is_empty()
    }
}

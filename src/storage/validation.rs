//! Path validation
//!
//! Handles path confinement and file name sanitization.

use std::io;
use std::path::{Component, MAIN_SEPARATOR, Path, PathBuf};

use crate::error::StorageError;

/// Make `path` absolute against the current directory and collapse `.`,
/// `..` and repeated separators lexically. Symlinks are not resolved.
pub fn absolute_path(path: &Path) -> io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(normalize(path))
    } else {
        Ok(normalize(&std::env::current_dir()?.join(path)))
    }
}

/// Lexical normalization. `..` never climbs above the root.
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => normalized.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            Component::Normal(part) => normalized.push(part),
        }
    }
    normalized
}

fn normcase(path: &Path) -> String {
    let s = path.to_string_lossy();
    if cfg!(windows) {
        s.replace('/', "\\").to_lowercase()
    } else {
        s.into_owned()
    }
}

/// Join `segments` onto `base` and return the absolute, normalized result.
///
/// Fails with [`StorageError::UnsafePath`] unless the result is `base`
/// itself or lies beneath it. A sibling such as `/database` is not inside
/// `/data`: the character after the base prefix must be a separator.
pub fn safe_join<P: AsRef<Path>>(base: &Path, segments: &[P]) -> Result<PathBuf, StorageError> {
    let mut joined = base.to_path_buf();
    for segment in segments {
        joined.push(segment);
    }

    let final_path = absolute_path(&joined)?;
    let base_path = absolute_path(base)?;

    let final_case = normcase(&final_path);
    let base_case = normcase(&base_path);

    let inside = final_case.starts_with(&base_case)
        && (base_case.ends_with(MAIN_SEPARATOR)
            || final_case[base_case.len()..].is_empty()
            || final_case[base_case.len()..].starts_with(MAIN_SEPARATOR));

    if !inside {
        return Err(StorageError::UnsafePath {
            path: final_path,
            base: base_path,
        });
    }
    Ok(final_path)
}

/// Clean a proposed file name: trim it, turn inner spaces into underscores
/// and drop anything that is not alphanumeric, `-`, `_` or `.`.
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .trim()
        .replace(' ', "_")
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect()
}

/// Sanitize only the final component of a logical name, keeping its
/// directory part.
pub fn sanitize_name(name: &str) -> Result<String, StorageError> {
    let (dir, file) = match name.rfind(['/', MAIN_SEPARATOR]) {
        Some(idx) => (Some(&name[..idx]), &name[idx + 1..]),
        None => (None, name),
    };

    let clean = sanitize_filename(file);
    if clean.is_empty() || clean == "." || clean == ".." {
        return Err(StorageError::InvalidName(name.to_string()));
    }

    // An empty directory part is the root: `/x.txt` must stay absolute.
    match dir {
        Some(dir) => Ok(format!("{}/{}", dir, clean)),
        None => Ok(clean),
    }
}

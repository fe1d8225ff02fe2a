//! Unique name generation
//!
//! Finds a free variant of a logical name by inserting a random suffix
//! between its stem and extension.

use rand::Rng;
use rand::distr::Alphanumeric;

use crate::error::StorageError;

/// Upper bound on candidates tried before giving up.
pub const MAX_NAME_ATTEMPTS: usize = 100;

/// Length of the random suffix.
const SUFFIX_LEN: usize = 7;

/// Splits a logical name into directory prefix (with trailing `/`), stem and
/// extension (with leading `.`). A leading dot belongs to the stem.
fn split_name(name: &str) -> (&str, &str, &str) {
    let (dir, file) = match name.rfind(['/', '\\']) {
        Some(idx) => name.split_at(idx + 1),
        None => ("", name),
    };
    match file.rfind('.') {
        Some(idx) if idx > 0 => {
            let (stem, ext) = file.split_at(idx);
            (dir, stem, ext)
        }
        _ => (dir, file, ""),
    }
}

fn random_suffix<R: Rng + ?Sized>(rng: &mut R) -> String {
    rng.sample_iter(Alphanumeric)
        .take(SUFFIX_LEN)
        .map(char::from)
        .collect()
}

/// Return `name` if `exists` says it is free, otherwise the first free
/// `stem_XXXXXXX.ext` candidate.
///
/// The predicate may fail (e.g. a candidate that does not confine); that
/// error is returned as-is.
pub fn make_unique<F>(name: &str, exists: F) -> Result<String, StorageError>
where
    F: FnMut(&str) -> Result<bool, StorageError>,
{
    make_unique_with(name, exists, &mut rand::rng())
}

/// [`make_unique`] with a caller-supplied random source.
pub fn make_unique_with<F, R>(name: &str, mut exists: F, rng: &mut R) -> Result<String, StorageError>
where
    F: FnMut(&str) -> Result<bool, StorageError>,
    R: Rng + ?Sized,
{
    if !exists(name)? {
        return Ok(name.to_string());
    }

    let (dir, stem, ext) = split_name(name);
    for _ in 0..MAX_NAME_ATTEMPTS {
        let candidate = format!("{}{}_{}{}", dir, stem, random_suffix(rng), ext);
        if !exists(&candidate)? {
            return Ok(candidate);
        }
    }

    Err(StorageError::NameGeneration {
        name: name.to_string(),
        attempts: MAX_NAME_ATTEMPTS,
    })
}

//! Content handles
//!
//! Byte streams handed to `save`. A handle may optionally carry its own name,
//! which `save` falls back to when the caller gives none.

use std::fs::File;
use std::io::{self, Cursor, Read};

/// A readable stream that may know its own name.
pub trait Content: Read {
    fn name(&self) -> Option<&str> {
        None
    }
}

impl Content for File {}

impl<T: AsRef<[u8]>> Content for Cursor<T> {}

impl Content for &[u8] {}

/// Pairs a reader with an explicit name.
#[derive(Debug)]
pub struct NamedContent<R> {
    name: String,
    inner: R,
}

impl<R: Read> NamedContent<R> {
    pub fn new(name: impl Into<String>, inner: R) -> Self {
        Self {
            name: name.into(),
            inner,
        }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for NamedContent<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<R: Read> Content for NamedContent<R> {
    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }
}

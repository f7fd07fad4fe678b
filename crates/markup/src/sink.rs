//! Write sink - where a rendered page ends up on disk
//!
//! The document only knows how to produce a string. Persisting it is behind
//! a trait so tests (and other backends) can capture the output.

use std::fs;
use std::io;
use std::path::Path;

/// File name written inside the target directory
pub const INDEX_FILE: &str = "index.html";

/// Accepts a target path and UTF-8 contents, writes or overwrites
pub trait WriteSink {
    fn write(&self, path: &Path, contents: &str) -> io::Result<()>;
}

/// Filesystem sink
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSink;

impl WriteSink for FileSink {
    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        fs::write(path, contents)
    }
}

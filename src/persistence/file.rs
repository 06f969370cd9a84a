//! File-backed persistence.
//!
//! Each cache is stored as `<dir>/<stem>.json`, where the stem is the cache
//! name with every byte outside `[A-Za-z0-9_-]` percent-encoded. Writes go to
//! a temporary file first and are renamed into place, so a crash never leaves
//! a torn document.
//!
//! File calls block. On a multi-threaded tokio runtime they run under
//! `block_in_place` so the worker hands its other tasks off first; on a
//! current-thread runtime they run inline.

use std::fmt::Write as _;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::runtime::{Handle, RuntimeFlavor};

use super::PersistenceBackend;
use crate::error::Result;

/// Slots stored as JSON files under one directory.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Opens a backend rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the document holding `name`.
    pub fn slot_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem(name)))
    }
}

/// Maps a cache name to a file stem, one stem per name.
///
/// `%` is always escaped, so `%XX` in a stem only ever comes from encoding.
/// The empty name maps to a lone `%`, which no other name can produce.
fn file_stem(name: &str) -> String {
    if name.is_empty() {
        return "%".to_string();
    }

    let mut stem = String::with_capacity(name.len());
    for byte in name.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            stem.push(byte as char);
        } else {
            let _ = write!(stem, "%{:02X}", byte);
        }
    }
    stem
}

/// Runs a blocking file operation without stalling a multi-threaded runtime.
fn run_blocking<T>(op: impl FnOnce() -> T) -> T {
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(op)
        }
        _ => op(),
    }
}

impl PersistenceBackend for FileBackend {
    fn read_slot(&self, name: &str) -> Result<Option<String>> {
        match run_blocking(|| fs::read_to_string(self.slot_path(name))) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write_slot(&self, name: &str, contents: &str) -> Result<()> {
        let path = self.slot_path(name);
        let tmp = path.with_extension("json.tmp");
        run_blocking(|| {
            fs::write(&tmp, contents)?;
            fs::rename(&tmp, &path)
        })?;
        Ok(())
    }

    fn remove_slot(&self, name: &str) -> Result<()> {
        match run_blocking(|| fs::remove_file(self.slot_path(name))) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

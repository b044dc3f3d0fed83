//! Offset writer for the `.part` file of one fetch.

use anyhow::{Context, Result};
use std::fs::File;
#[cfg(unix)]
use std::os::unix::fs::FileExt;
use std::path::{Path, PathBuf};

/// Writer for a temp download file. Writes are positional, so a retried read
/// simply overwrites whatever a failed attempt may have left behind.
#[derive(Debug)]
pub struct StorageWriter {
    file: File,
    temp_path: PathBuf,
}

impl StorageWriter {
    /// Create a new, empty temp file at `temp_path`. Truncates an existing one.
    pub fn create(temp_path: &Path) -> Result<Self> {
        let file = File::options()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(temp_path)
            .with_context(|| format!("failed to create temp file: {}", temp_path.display()))?;
        Ok(Self {
            file,
            temp_path: temp_path.to_path_buf(),
        })
    }

    /// Open an existing temp file to resume into (no truncation).
    pub fn open_existing(temp_path: &Path) -> Result<Self> {
        let file = File::options()
            .read(true)
            .write(true)
            .open(temp_path)
            .with_context(|| format!("failed to open existing temp file: {}", temp_path.display()))?;
        Ok(Self {
            file,
            temp_path: temp_path.to_path_buf(),
        })
    }

    /// Current length of the temp file; for a sequential fetch this is the
    /// number of bytes already fetched.
    pub fn len(&self) -> Result<u64> {
        Ok(self
            .file
            .metadata()
            .with_context(|| format!("stat {}", self.temp_path.display()))?
            .len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Drop everything past `len` (e.g. a resumed file longer than the object).
    pub fn truncate(&self, len: u64) -> Result<()> {
        self.file.set_len(len).context("storage truncate failed")
    }

    /// Write all of `data` at `offset` without moving any cursor.
    #[cfg(unix)]
    pub fn write_at(&self, offset: u64, data: &[u8]) -> Result<()> {
        self.file
            .write_all_at(data, offset)
            .context("storage write_at failed")
    }

    /// Non-Unix fallback: seek + write on a cloned handle.
    #[cfg(not(unix))]
    pub fn write_at(&self, offset: u64, data: &[u8]) -> Result<()> {
        use std::io::{Seek, SeekFrom, Write};
        let mut f = self.file.try_clone()?;
        f.seek(SeekFrom::Start(offset))?;
        f.write_all(data).context("storage write failed")
    }

    /// Sync file data to disk. Call before `finalize` for durability.
    pub fn sync(&self) -> Result<()> {
        self.file.sync_all().context("storage sync failed")
    }

    /// Atomically rename the temp file to the final path, closing it.
    /// Fails if `final_path` is on a different filesystem.
    pub fn finalize(self, final_path: &Path) -> Result<()> {
        let temp_path = self.temp_path;
        drop(self.file);

        std::fs::rename(&temp_path, final_path).with_context(|| {
            format!(
                "failed to rename {} to {}",
                temp_path.display(),
                final_path.display()
            )
        })
    }
}

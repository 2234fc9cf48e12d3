//! Whole-file atomic writes and advisory locking for the backing file.
//!
//! - [`atomic_write()`] replaces a file's contents via temp file + rename
//! - [`FileLock`] is an RAII exclusive lock built on fs2
//!
//! The store persists by rewriting the complete snapshot, so an interrupted
//! write must never leave a truncated file behind. Writing a sibling temp
//! file, syncing it, and renaming it over the target means readers see either
//! the old snapshot or the new one.

use fs2::FileExt;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Sibling path used while a write is in flight: `contacts.json` -> `contacts.json.tmp`.
pub fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("snapshot"));
    name.push(".tmp");
    path.with_file_name(name)
}

/// Atomically replace `path` with `contents`.
///
/// Writes to [`temp_path`] with fsync, then renames onto the target. Parent
/// directories are created as needed.
///
/// # Errors
///
/// Returns an error if the temporary file cannot be created, written, synced,
/// or renamed. On a failed rename the temporary file is left in place and the
/// original target is untouched.
pub fn atomic_write(path: &Path, contents: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = temp_path(path);

    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&tmp_path)?;

    {
        let mut writer = BufWriter::new(&mut file);
        writer.write_all(contents)?;
        writer.flush()?;
    }

    // Sync to disk before rename
    file.sync_all()?;

    fs::rename(&tmp_path, path)?;

    Ok(())
}

/// RAII exclusive lock on a dedicated lock file.
///
/// Advisory only: every process that mutates the backing file must take the
/// same lock. Released on drop.
pub struct FileLock {
    file: File,
}

impl FileLock {
    /// Acquire the lock, blocking until it is available.
    ///
    /// Creates the lock file (and parent directories) if missing.
    pub fn acquire(lock_path: &Path) -> io::Result<Self> {
        let file = open_lock_file(lock_path)?;
        file.lock_exclusive()?;
        Ok(Self { file })
    }

    /// Try to acquire the lock without blocking.
    ///
    /// Returns `Ok(None)` when another holder has it.
    pub fn try_acquire(lock_path: &Path) -> io::Result<Option<Self>> {
        let file = open_lock_file(lock_path)?;

        match file.try_lock_exclusive() {
            Ok(()) => Ok(Some(Self { file })),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(None),
            // fs2 can surface a raw EAGAIN that doesn't map to WouldBlock
            // (11 on Linux, 35 on macOS)
            Err(e) if matches!(e.raw_os_error(), Some(11) | Some(35)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

fn open_lock_file(lock_path: &Path) -> io::Result<File> {
    if let Some(parent) = lock_path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(lock_path)
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

//! Low-level fsync operations for durability.
//!
//! On POSIX systems, creating or renaming a file updates the directory
//! entry, and that entry may not survive a power loss unless the directory
//! itself is synced. Archive writes therefore fsync both the file and its
//! parent directory.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;

/// Syncs a file's contents and metadata to disk (`fsync(2)`).
pub fn fsync_file(file: &File) -> io::Result<()> {
    file.sync_all()
}

/// Syncs a directory to disk, ensuring its entries are durable.
///
/// Required after a rename: without it the renamed file might revert to
/// its old name after a crash.
pub fn fsync_dir(dir_path: &Path) -> io::Result<()> {
    // Open the directory as a file (read-only is sufficient for fsync)
    let dir = OpenOptions::new().read(true).open(dir_path)?;
    dir.sync_all()
}

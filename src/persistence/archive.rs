//! Request archive: one JSON document per negotiation.
//!
//! The archive is an audit trail, not operational state: the bot never
//! reads it back, so a record is written (and overwritten) whenever a
//! negotiation changes state. Each write is atomic via the
//! write-to-temp-then-rename pattern:
//!
//! 1. Write to `<id>.json.tmp`
//! 2. fsync the file
//! 3. Rename to `<id>.json`
//! 4. fsync the directory
//!
//! A reader always sees either the previous or the new document, never a
//! partial write.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use super::fsync::{fsync_dir, fsync_file};
use crate::types::SwapRequest;

/// Errors that can occur while archiving a request.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Durable record of negotiation state changes.
///
/// Archiving is best-effort from the caller's point of view: a failed
/// write is logged by the engine and never blocks the negotiation.
pub trait RequestArchive: Send + Sync {
    /// Writes the request's current state, replacing any earlier document
    /// for the same request ID.
    fn record(&self, request: &SwapRequest) -> Result<(), ArchiveError>;
}

/// File-backed archive: `<dir>/<request_id>.json`.
#[derive(Debug, Clone)]
pub struct JsonArchive {
    dir: PathBuf,
}

impl JsonArchive {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        JsonArchive { dir: dir.into() }
    }
}

impl RequestArchive for JsonArchive {
    fn record(&self, request: &SwapRequest) -> Result<(), ArchiveError> {
        use std::fs::OpenOptions;
        use std::io::Write;

        std::fs::create_dir_all(&self.dir)?;

        let path = self.dir.join(format!("{}.json", request.request_id));
        let tmp_path = path.with_extension("json.tmp");
        let bytes = serde_json::to_vec_pretty(request)?;

        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&tmp_path)?;
            file.write_all(&bytes)?;
            fsync_file(&file)?;
        }

        std::fs::rename(&tmp_path, &path)?;
        fsync_dir(&self.dir)?;

        Ok(())
    }
}

/// Archive that keeps nothing, for deployments that do not configure an
/// archive directory and for tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoArchive;

impl RequestArchive for NoArchive {
    fn record(&self, _request: &SwapRequest) -> Result<(), ArchiveError> {
        Ok(())
    }
}

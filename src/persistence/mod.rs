//! Durable storage: the request archive and its fsync plumbing.

pub mod archive;
pub mod fsync;

pub use archive::{ArchiveError, JsonArchive, NoArchive, RequestArchive};

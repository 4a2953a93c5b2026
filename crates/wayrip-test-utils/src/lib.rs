#![forbid(unsafe_code)]

//! In-process fake of the archive for integration tests: serves canned
//! snapshots under `/web/{timestamp}id_/{original}` and a CDX index under
//! `/cdx`, while recording every request and the peak number in flight.

mod archive_server;

pub use crate::archive_server::{ArchiveServer, ArchiveServerBuilder};

#![forbid(unsafe_code)]

//! Archive-domain primitives: snapshot URL normalization, capture
//! timestamps, and the CDX snapshot-index client.

mod cdx;
mod error;
mod snapshot;
mod timestamp;

pub use crate::{
    cdx::{CdxClient, closest_to},
    error::{ArchiveError, ArchiveResult},
    snapshot::{
        ArchiveForm, SnapshotUrl, asset_key, display_url, is_archive_chrome, is_archive_host,
        raw_url, raw_url_with_base, resolve_relative,
    },
    timestamp::Timestamp,
};

#![forbid(unsafe_code)]

//! Page ripping pipeline: reference extraction, archive-chrome cleaning and
//! rewriting, the persistent download ledger, and the bounded fetch
//! scheduler that drains a page's asset closure.

mod error;
mod extract;
mod kind;
mod ledger;
mod options;
mod paths;
mod rewrite;
mod ripper;
mod scheduler;
mod verify;

pub use crate::{
    error::{RipError, RipResult},
    extract::{RawRef, extract},
    kind::ContentKind,
    ledger::{DownloadLedger, LEDGER_FILE},
    options::{MAX_CONCURRENCY, RipOptions},
    paths::{INDEX_FILE, LocalPathIndex},
    rewrite::{RewriteContext, clean},
    ripper::Ripper,
    scheduler::{AssetTask, FailedAsset, FetchScheduler, RipReport},
    verify::{Verifier, WrittenFileVerifier, content_hash},
};

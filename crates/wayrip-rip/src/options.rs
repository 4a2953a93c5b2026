use std::path::PathBuf;

use url::Url;
use wayrip_net::NetOptions;

/// Hard ceiling on parallel fetches. The archive rate-limits aggressively;
/// requested concurrency is clamped to this no matter what the caller asks
/// for.
pub const MAX_CONCURRENCY: usize = 3;

const CANONICAL_ARCHIVE_BASE: &str = "https://web.archive.org";

/// Configuration for a rip run.
#[derive(Clone, Debug)]
pub struct RipOptions {
    /// Directory all output lands in, flat.
    pub output_dir: PathBuf,
    /// Requested parallel fetches; clamped to [`MAX_CONCURRENCY`].
    pub concurrency: usize,
    /// Output filename override for the root page.
    pub savename: Option<String>,
    /// Clear the download ledger before running.
    pub reset: bool,
    /// Fetch attempts per asset when verification keeps failing.
    pub max_fetch_attempts: u32,
    /// Archive base URL (overridable for test servers).
    pub archive_base: Url,
    /// CDX index endpoint override (test servers).
    pub cdx_endpoint: Option<Url>,
    /// Transport configuration.
    pub net: NetOptions,
}

impl Default for RipOptions {
    /// # Panics
    ///
    /// Never in practice: the canonical archive base URL is valid.
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            concurrency: 1,
            savename: None,
            reset: false,
            max_fetch_attempts: 3,
            archive_base: Url::parse(CANONICAL_ARCHIVE_BASE).expect("archive base URL is valid"),
            cdx_endpoint: None,
            net: NetOptions::default(),
        }
    }
}

impl RipOptions {
    #[must_use]
    pub fn with_output_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.output_dir = dir.into();
        self
    }

    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    #[must_use]
    pub fn with_savename<S: Into<String>>(mut self, name: S) -> Self {
        self.savename = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_reset(mut self, reset: bool) -> Self {
        self.reset = reset;
        self
    }

    /// `min(requested, MAX_CONCURRENCY)`, and never zero.
    #[must_use]
    pub fn effective_concurrency(&self) -> usize {
        self.concurrency.clamp(1, MAX_CONCURRENCY)
    }
}

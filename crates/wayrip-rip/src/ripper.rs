use std::sync::{Arc, Mutex};

use tokio::fs;
use tracing::info;
use url::Url;
use wayrip_archive::{SnapshotUrl, raw_url_with_base};
use wayrip_net::Net;

use crate::{
    error::RipResult,
    kind::ContentKind,
    ledger::DownloadLedger,
    options::RipOptions,
    paths::{LocalPathIndex, sanitize},
    scheduler::{FetchScheduler, RipReport, process_document},
    verify::Verifier,
};

/// Top-level orchestrator: takes one archive snapshot URL and produces a
/// self-contained local copy of the page plus its full asset closure.
pub struct Ripper<N: Net> {
    net: Arc<N>,
    options: RipOptions,
    verifier: Option<Arc<dyn Verifier>>,
}

impl<N: Net> Ripper<N> {
    pub fn new(net: Arc<N>, options: RipOptions) -> Self {
        Self {
            net,
            options,
            verifier: None,
        }
    }

    #[must_use]
    pub fn with_verifier(mut self, verifier: Arc<dyn Verifier>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    /// Rips the page at `snapshot_url`.
    ///
    /// The root page itself fetches fatally: if the snapshot URL is
    /// malformed or the page cannot be retrieved there is nothing to rip.
    /// Individual assets failing only lands them in the report.
    ///
    /// # Errors
    ///
    /// [`crate::RipError::Archive`] for a malformed snapshot URL,
    /// [`crate::RipError::Net`] when the root page fetch fails, and
    /// [`crate::RipError::Io`] for output directory or ledger problems.
    pub async fn rip(&self, snapshot_url: &str) -> RipResult<RipReport> {
        let snapshot = SnapshotUrl::parse(snapshot_url)?;
        info!(
            url = %snapshot.original,
            timestamp = %snapshot.timestamp,
            "ripping snapshot"
        );

        fs::create_dir_all(&self.options.output_dir).await?;

        let mut ledger = DownloadLedger::load(&self.options.output_dir)?;
        let mut index = LocalPathIndex::load(&self.options.output_dir)?;
        if self.options.reset {
            ledger.reset()?;
            index.reset()?;
            info!("download ledger cleared, re-fetching everything");
        }

        let raw = raw_url_with_base(
            &self.options.archive_base,
            snapshot.timestamp,
            &snapshot.original,
        );
        let bytes = self.net.get_bytes(raw).await?;

        let page_name = page_file_name(self.options.savename.as_deref(), &snapshot.original);
        index.reserve(&page_name);
        let index = Arc::new(Mutex::new(index));

        let document = process_document(
            &bytes,
            ContentKind::Html,
            &snapshot.original,
            snapshot.timestamp,
            &index,
        )?;
        let page_path = self.options.output_dir.join(&page_name);
        fs::write(&page_path, &document.bytes).await?;
        info!(
            page = %page_path.display(),
            assets = document.discovered.len(),
            "page written, downloading assets"
        );

        let mut scheduler = FetchScheduler::new(
            Arc::clone(&self.net),
            self.options.clone(),
            index,
            Arc::new(Mutex::new(ledger)),
        );
        if let Some(verifier) = &self.verifier {
            scheduler = scheduler.with_verifier(Arc::clone(verifier));
        }
        scheduler.submit(document.discovered);
        let report = scheduler.run(page_path).await;

        info!(
            fetched = report.fetched,
            skipped = report.skipped,
            failed = report.failed.len(),
            "rip finished"
        );
        Ok(report)
    }
}

/// Name for the root page file: the savename override when given, otherwise
/// the page's own basename, always carrying an HTML extension.
fn page_file_name(savename: Option<&str>, original: &Url) -> String {
    if let Some(savename) = savename {
        let mut name = sanitize(savename.trim());
        if !name.contains('.') {
            name.push_str(".html");
        }
        return name;
    }

    let basename = original
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty());

    match basename {
        None => String::from("index.html"),
        Some(basename) => {
            let mut name = sanitize(basename);
            let lower = name.to_ascii_lowercase();
            if !lower.ends_with(".html") && !lower.ends_with(".htm") {
                name.push_str(".html");
            }
            name
        }
    }
}

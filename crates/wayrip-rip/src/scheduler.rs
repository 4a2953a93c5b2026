use std::{
    collections::{HashMap, HashSet},
    path::PathBuf,
    sync::{Arc, Mutex},
};

use bytes::Bytes;
use futures::{StreamExt, stream};
use tokio::fs;
use tracing::{debug, info, warn};
use url::Url;
use wayrip_archive::{CdxClient, Timestamp, asset_key, is_archive_chrome, raw_url_with_base, resolve_relative};
use wayrip_net::Net;

use crate::{
    error::{RipError, RipResult},
    extract::extract,
    kind::ContentKind,
    ledger::DownloadLedger,
    options::RipOptions,
    paths::LocalPathIndex,
    rewrite::{RewriteContext, clean},
    verify::{Verifier, WrittenFileVerifier, content_hash},
};

/// One asset queued for download: the original URL it was archived from, the
/// timestamp to look for it at, and the local file it will be written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetTask {
    pub original: Url,
    pub preferred: Timestamp,
    pub kind: ContentKind,
    pub local_path: String,
}

/// An asset the run gave up on, with the reason.
#[derive(Debug, Clone)]
pub struct FailedAsset {
    pub url: Url,
    pub reason: String,
}

/// What a completed run produced.
#[derive(Debug)]
pub struct RipReport {
    /// Local path of the rewritten root page.
    pub page: PathBuf,
    /// Assets downloaded and verified this run.
    pub fetched: usize,
    /// Assets skipped because the ledger already had them.
    pub skipped: usize,
    /// Assets that could not be downloaded.
    pub failed: Vec<FailedAsset>,
}

enum TaskStatus {
    Done,
    Skipped,
    Failed(String),
}

struct TaskOutcome {
    original: Url,
    status: TaskStatus,
    discovered: Vec<AssetTask>,
}

pub(crate) struct ProcessedDocument {
    pub bytes: Vec<u8>,
    pub discovered: Vec<AssetTask>,
}

/// Cleans a fetched document, extracts its references, claims local names
/// for them, and rewrites the document to point at those names. Synchronous
/// on purpose: the HTML parser types are not `Send`, so none of this may
/// live across an await.
pub(crate) fn process_document(
    bytes: &[u8],
    kind: ContentKind,
    original: &Url,
    timestamp: Timestamp,
    index: &Mutex<LocalPathIndex>,
) -> RipResult<ProcessedDocument> {
    if !kind.is_text() {
        return Ok(ProcessedDocument {
            bytes: bytes.to_vec(),
            discovered: Vec::new(),
        });
    }

    let text = String::from_utf8_lossy(bytes);
    let cleaned = clean(&text, kind);
    let refs = extract(&cleaned, kind);

    let mut mapping = HashMap::new();
    let mut discovered = Vec::new();
    {
        let mut index = index.lock().expect("path index lock");
        for reference in &refs {
            let resolved = match resolve_relative(original, &reference.target) {
                Ok(url) => url,
                Err(err) => {
                    debug!(target = %reference.target, %err, "unresolvable reference, leaving as-is");
                    continue;
                }
            };
            if is_archive_chrome(&resolved) || !matches!(resolved.scheme(), "http" | "https") {
                continue;
            }
            // The extractor's tag-derived kind wins; for bare references the
            // resolved URL's path is the cleaner thing to sniff.
            let asset_kind = if reference.kind == ContentKind::Binary {
                ContentKind::from_url(&resolved)
            } else {
                reference.kind
            };
            let local = index.claim(&resolved, asset_kind)?;
            mapping.insert(reference.target.clone(), local.clone());
            discovered.push(AssetTask {
                original: resolved,
                preferred: timestamp,
                kind: asset_kind,
                local_path: local,
            });
        }
    }

    let rewritten = RewriteContext::new(&mapping, original).rewrite(&cleaned, kind);
    Ok(ProcessedDocument {
        bytes: rewritten.into_bytes(),
        discovered,
    })
}

/// Drains the asset closure of a page in waves. Each wave fetches up to
/// `effective_concurrency()` assets in parallel; references discovered while
/// processing a wave are queued for the next one. A URL enters the queue at
/// most once per run, so cyclic references terminate.
pub struct FetchScheduler<N: Net> {
    net: Arc<N>,
    cdx: CdxClient<Arc<N>>,
    options: RipOptions,
    index: Arc<Mutex<LocalPathIndex>>,
    ledger: Arc<Mutex<DownloadLedger>>,
    verifier: Arc<dyn Verifier>,
    claimed: HashSet<String>,
    queue: Vec<AssetTask>,
}

impl<N: Net> FetchScheduler<N> {
    pub fn new(
        net: Arc<N>,
        options: RipOptions,
        index: Arc<Mutex<LocalPathIndex>>,
        ledger: Arc<Mutex<DownloadLedger>>,
    ) -> Self {
        let mut cdx = CdxClient::new(Arc::clone(&net));
        if let Some(endpoint) = options.cdx_endpoint.clone() {
            cdx = cdx.with_endpoint(endpoint);
        }

        Self {
            net,
            cdx,
            options,
            index,
            ledger,
            verifier: Arc::new(WrittenFileVerifier),
            claimed: HashSet::new(),
            queue: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_verifier(mut self, verifier: Arc<dyn Verifier>) -> Self {
        self.verifier = verifier;
        self
    }

    /// Queues tasks, dropping any URL already queued this run.
    pub fn submit(&mut self, tasks: Vec<AssetTask>) {
        for task in tasks {
            if self.claimed.insert(asset_key(&task.original)) {
                self.queue.push(task);
            }
        }
    }

    /// Runs waves until the queue is empty.
    pub async fn run(&mut self, page: PathBuf) -> RipReport {
        let mut fetched = 0;
        let mut skipped = 0;
        let mut failed = Vec::new();

        while !self.queue.is_empty() {
            let wave = std::mem::take(&mut self.queue);
            debug!(assets = wave.len(), "starting fetch wave");

            let outcomes: Vec<TaskOutcome> =
                stream::iter(wave.into_iter().map(|task| self.process(task)))
                    .buffer_unordered(self.options.effective_concurrency())
                    .collect()
                    .await;

            for outcome in outcomes {
                match outcome.status {
                    TaskStatus::Done => {
                        fetched += 1;
                        self.submit(outcome.discovered);
                    }
                    TaskStatus::Skipped => skipped += 1,
                    TaskStatus::Failed(reason) => {
                        warn!(url = %outcome.original, %reason, "asset failed");
                        failed.push(FailedAsset {
                            url: outcome.original,
                            reason,
                        });
                    }
                }
            }
        }

        RipReport {
            page,
            fetched,
            skipped,
            failed,
        }
    }

    async fn process(&self, task: AssetTask) -> TaskOutcome {
        {
            let ledger = self.ledger.lock().expect("ledger lock");
            if ledger.is_done(&task.local_path) {
                debug!(file = %task.local_path, "already downloaded, skipping");
                return TaskOutcome {
                    original: task.original,
                    status: TaskStatus::Skipped,
                    discovered: Vec::new(),
                };
            }
        }

        let mut resolved: Option<Timestamp> = None;
        let mut last_error = String::from("no fetch attempts made");

        for attempt in 1..=self.options.max_fetch_attempts {
            let bytes = match self.fetch_raw(&task, &mut resolved).await {
                Ok(bytes) => bytes,
                Err(err) => {
                    return TaskOutcome {
                        original: task.original,
                        status: TaskStatus::Failed(err.to_string()),
                        discovered: Vec::new(),
                    };
                }
            };

            let timestamp = resolved.unwrap_or(task.preferred);
            let document =
                match process_document(&bytes, task.kind, &task.original, timestamp, &self.index) {
                    Ok(document) => document,
                    Err(err) => {
                        return TaskOutcome {
                            original: task.original,
                            status: TaskStatus::Failed(err.to_string()),
                            discovered: Vec::new(),
                        };
                    }
                };
            let path = self.options.output_dir.join(&task.local_path);
            let hash = content_hash(&document.bytes);

            if let Err(err) = fs::write(&path, &document.bytes).await {
                return TaskOutcome {
                    original: task.original,
                    status: TaskStatus::Failed(err.to_string()),
                    discovered: Vec::new(),
                };
            }

            match self.verifier.verify(&path, &hash) {
                Ok(()) => {
                    let marked = self
                        .ledger
                        .lock()
                        .expect("ledger lock")
                        .mark_done(&task.local_path, &hash);
                    if let Err(err) = marked {
                        return TaskOutcome {
                            original: task.original,
                            status: TaskStatus::Failed(err.to_string()),
                            discovered: Vec::new(),
                        };
                    }
                    info!(url = %task.original, file = %task.local_path, "downloaded");
                    return TaskOutcome {
                        original: task.original,
                        status: TaskStatus::Done,
                        discovered: document.discovered,
                    };
                }
                Err(err) => {
                    warn!(
                        url = %task.original,
                        attempt,
                        %err,
                        "verification failed, re-fetching"
                    );
                    last_error = err.to_string();
                }
            }
        }

        TaskOutcome {
            original: task.original,
            status: TaskStatus::Failed(last_error),
            discovered: Vec::new(),
        }
    }

    /// Fetches the raw form of an asset. On the first definitive not-found
    /// the CDX index is consulted once for the nearest snapshot; the resolved
    /// timestamp then sticks for the rest of this task's attempts.
    async fn fetch_raw(
        &self,
        task: &AssetTask,
        resolved: &mut Option<Timestamp>,
    ) -> Result<Bytes, RipError> {
        let timestamp = resolved.unwrap_or(task.preferred);
        let url = raw_url_with_base(&self.options.archive_base, timestamp, &task.original);

        match self.net.get_bytes(url).await {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.is_not_found() && resolved.is_none() => {
                debug!(url = %task.original, %timestamp, "not at preferred timestamp, querying index");
                let nearest = self.cdx.nearest(&task.original, task.preferred).await?;
                *resolved = Some(nearest);
                let url = raw_url_with_base(&self.options.archive_base, nearest, &task.original);
                Ok(self.net.get_bytes(url).await?)
            }
            Err(err) => Err(err.into()),
        }
    }
}

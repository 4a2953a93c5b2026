use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::{
    error::{ArchiveError, ArchiveResult},
    timestamp::Timestamp,
};

/// Host serving archived snapshots.
pub const ARCHIVE_HOST: &str = "web.archive.org";

const ARCHIVE_BASE: &str = "https://web.archive.org";

/// Hosts serving archive chrome (toolbar scripts, analytics). References to
/// these are playback machinery, never part of the captured page.
const CHROME_HOSTS: &[&str] = &["web-static.archive.org", "archive.org", "analytics.archive.org"];

static SNAPSHOT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://web\.archive\.org/web/(\d{14})([a-z]{2}_)?/(https?://.+)$")
        .expect("snapshot regex is valid")
});

/// Which archive URL variant a snapshot reference was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveForm {
    /// Toolbar-wrapped display form (`/web/<ts>/<original>`).
    Display,
    /// Content-identical raw form (`/web/<ts>id_/<original>`), returning the
    /// captured bytes unmodified.
    Raw,
}

/// One archived object: the original URL plus its capture time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotUrl {
    pub original: Url,
    pub timestamp: Timestamp,
    pub form: ArchiveForm,
}

impl SnapshotUrl {
    /// Parses a snapshot URL in display or raw form. Bare `/web/...` paths
    /// are completed with the canonical archive host.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::MalformedUrl`] for anything that is not a
    /// direct snapshot URL with a canonical 14-digit timestamp.
    pub fn parse(input: &str) -> ArchiveResult<Self> {
        let input = input.trim();
        let completed;
        let candidate = if input.starts_with("/web/") {
            completed = format!("{ARCHIVE_BASE}{input}");
            completed.as_str()
        } else {
            input
        };

        let captures = SNAPSHOT_RE
            .captures(candidate)
            .ok_or_else(|| ArchiveError::MalformedUrl(input.to_string()))?;

        let timestamp = Timestamp::parse(&captures[1])?;
        let form = match captures.get(2).map(|m| m.as_str()) {
            Some("id_") => ArchiveForm::Raw,
            _ => ArchiveForm::Display,
        };
        let original = Url::parse(&captures[3])
            .map_err(|e| ArchiveError::MalformedUrl(format!("{input}: {e}")))?;

        Ok(Self {
            original,
            timestamp,
            form,
        })
    }

    /// The URL that fetches the captured bytes unmodified.
    #[must_use]
    pub fn raw_url(&self) -> Url {
        raw_url(self.timestamp, &self.original)
    }

    /// The toolbar-wrapped display URL.
    #[must_use]
    pub fn display_url(&self) -> Url {
        display_url(self.timestamp, &self.original)
    }
}

/// Emits the raw (`id_`) fetch URL for an original URL at a capture time.
///
/// # Panics
///
/// Never in practice: the composed string is always a valid URL.
#[must_use]
pub fn raw_url(timestamp: Timestamp, original: &Url) -> Url {
    Url::parse(&format!("{ARCHIVE_BASE}/web/{timestamp}id_/{original}"))
        .expect("raw snapshot URL is valid")
}

/// Emits the raw (`id_`) fetch URL against a non-canonical archive base
/// (test servers).
///
/// # Panics
///
/// Never in practice: the composed string is always a valid URL.
#[must_use]
pub fn raw_url_with_base(base: &Url, timestamp: Timestamp, original: &Url) -> Url {
    let base = base.as_str().trim_end_matches('/');
    Url::parse(&format!("{base}/web/{timestamp}id_/{original}"))
        .expect("raw snapshot URL is valid")
}

/// Emits the display URL for an original URL at a capture time.
///
/// # Panics
///
/// Never in practice: the composed string is always a valid URL.
#[must_use]
pub fn display_url(timestamp: Timestamp, original: &Url) -> Url {
    Url::parse(&format!("{ARCHIVE_BASE}/web/{timestamp}/{original}"))
        .expect("display snapshot URL is valid")
}

/// Identity key for a logical asset: the original URL with the fragment
/// dropped. Two references with the same key are the same asset no matter
/// which capture they were discovered in.
#[must_use]
pub fn asset_key(url: &Url) -> String {
    let mut key = url.clone();
    key.set_fragment(None);
    key.into()
}

/// True for the snapshot-serving archive host itself.
#[must_use]
pub fn is_archive_host(url: &Url) -> bool {
    url.host_str() == Some(ARCHIVE_HOST)
}

/// True for archive chrome hosts (toolbar assets, analytics).
#[must_use]
pub fn is_archive_chrome(url: &Url) -> bool {
    url.host_str()
        .is_some_and(|host| CHROME_HOSTS.contains(&host))
}

/// Resolves a raw reference against the *original* URL of the document that
/// contains it. Archive-wrapped references are unwrapped back to their
/// original URL first so archive path segments never leak into targets.
///
/// # Errors
///
/// Returns [`ArchiveError::MalformedUrl`] if the candidate cannot be
/// resolved to an absolute URL.
pub fn resolve_relative(base_original: &Url, candidate: &str) -> ArchiveResult<Url> {
    let candidate = candidate.trim();

    if let Ok(snapshot) = SnapshotUrl::parse(candidate) {
        return Ok(snapshot.original);
    }

    let joined = base_original
        .join(candidate)
        .map_err(|e| ArchiveError::MalformedUrl(format!("{candidate}: {e}")))?;

    // A reference that joined into the archive host was an absolute archive
    // path relative to a display-form document; unwrap it.
    if is_archive_host(&joined) {
        if let Ok(snapshot) = SnapshotUrl::parse(joined.as_str()) {
            return Ok(snapshot.original);
        }
    }

    Ok(joined)
}

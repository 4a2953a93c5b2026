use url::Url;
use wayrip_net::Net;

use crate::{
    error::{ArchiveError, ArchiveResult},
    timestamp::Timestamp,
};

const CDX_ENDPOINT: &str = "https://web.archive.org/cdx/search/cdx";

/// Result rows are capped; one page of captures is plenty to pick a nearest
/// timestamp from.
const CDX_ROW_LIMIT: u32 = 200;

/// Client for the archive's CDX snapshot-index lookup service.
///
/// Queries candidate capture timestamps for an original URL. Used as the
/// fallback when an asset is absent at the exact timestamp its referring
/// document was captured at.
pub struct CdxClient<N> {
    net: N,
    endpoint: Url,
}

impl<N: Net> CdxClient<N> {
    /// # Panics
    ///
    /// Never in practice: the built-in endpoint URL is valid.
    pub fn new(net: N) -> Self {
        Self {
            net,
            endpoint: Url::parse(CDX_ENDPOINT).expect("CDX endpoint URL is valid"),
        }
    }

    /// Point the client at a different index endpoint (test servers).
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// All known capture timestamps for `original`, unordered.
    ///
    /// # Errors
    ///
    /// [`ArchiveError::Net`] on transport failure, [`ArchiveError::Cdx`] when
    /// the response is not the expected JSON row format.
    pub async fn lookup(&self, original: &Url) -> ArchiveResult<Vec<Timestamp>> {
        let mut query = self.endpoint.clone();
        query
            .query_pairs_mut()
            .append_pair("url", original.as_str())
            .append_pair("output", "json")
            .append_pair("fl", "timestamp")
            .append_pair("filter", "statuscode:200")
            .append_pair("limit", &CDX_ROW_LIMIT.to_string());

        let bytes = self.net.get_bytes(query).await?;
        parse_cdx_rows(&bytes)
    }

    /// The snapshot closest to `preferred`, ties broken by the earlier
    /// capture.
    ///
    /// # Errors
    ///
    /// [`ArchiveError::NotFound`] when the index has no captures for
    /// `original`.
    pub async fn nearest(&self, original: &Url, preferred: Timestamp) -> ArchiveResult<Timestamp> {
        let candidates = self.lookup(original).await?;
        closest_to(&candidates, preferred).ok_or_else(|| ArchiveError::NotFound {
            url: original.to_string(),
        })
    }
}

/// Picks the candidate with minimal distance to `preferred`; on equal
/// distance the earlier timestamp wins.
#[must_use]
pub fn closest_to(candidates: &[Timestamp], preferred: Timestamp) -> Option<Timestamp> {
    candidates
        .iter()
        .copied()
        .min_by_key(|candidate| (candidate.distance(preferred), *candidate))
}

/// CDX `output=json` responses are a JSON array of string rows, the first
/// row being the field-name header. Rows that do not hold a canonical
/// timestamp are dropped rather than failing the lookup.
fn parse_cdx_rows(bytes: &[u8]) -> ArchiveResult<Vec<Timestamp>> {
    if bytes.is_empty() {
        return Ok(Vec::new());
    }

    let rows: Vec<Vec<String>> =
        serde_json::from_slice(bytes).map_err(|e| ArchiveError::Cdx(e.to_string()))?;

    Ok(rows
        .iter()
        .skip(1)
        .filter_map(|row| row.first())
        .filter_map(|field| Timestamp::parse(field).ok())
        .collect())
}

use thiserror::Error;

/// Archive-domain errors.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("not a direct archive snapshot URL: {0}")]
    MalformedUrl(String),

    #[error("no snapshot found for {url}")]
    NotFound { url: String },

    #[error("CDX index response could not be parsed: {0}")]
    Cdx(String),

    #[error("network error: {0}")]
    Net(#[from] wayrip_net::NetError),
}

pub type ArchiveResult<T> = Result<T, ArchiveError>;

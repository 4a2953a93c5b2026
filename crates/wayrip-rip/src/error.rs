use thiserror::Error;

/// Rip pipeline errors.
#[derive(Debug, Error)]
pub enum RipError {
    #[error("archive error: {0}")]
    Archive(#[from] wayrip_archive::ArchiveError),

    #[error("network error: {0}")]
    Net(#[from] wayrip_net::NetError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("verification failed for {path}: fetched {expected}, on disk {actual}")]
    Verification {
        path: String,
        expected: String,
        actual: String,
    },
}

pub type RipResult<T> = Result<T, RipError>;

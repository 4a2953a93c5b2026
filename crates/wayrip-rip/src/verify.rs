use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::{RipError, RipResult};

/// Hex sha256 of a content buffer. This is the hash stored in the download
/// ledger and checked by verification.
#[must_use]
pub fn content_hash(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Write-integrity seam: confirms that what landed on disk is what was
/// fetched. Mismatches trigger a re-fetch in the scheduler.
#[cfg_attr(test, unimock::unimock(api = VerifierMock))]
pub trait Verifier: Send + Sync {
    /// # Errors
    ///
    /// [`RipError::Verification`] when the on-disk hash differs from
    /// `expected_hash`; [`RipError::Io`] when the file cannot be read back.
    fn verify(&self, path: &Path, expected_hash: &str) -> RipResult<()>;
}

/// Default verifier: reads the written file back and compares sha256.
#[derive(Clone, Copy, Debug, Default)]
pub struct WrittenFileVerifier;

impl Verifier for WrittenFileVerifier {
    fn verify(&self, path: &Path, expected_hash: &str) -> RipResult<()> {
        let written = std::fs::read(path)?;
        let actual = content_hash(&written);

        if actual == expected_hash {
            Ok(())
        } else {
            Err(RipError::Verification {
                path: path.display().to_string(),
                expected: expected_hash.to_string(),
                actual,
            })
        }
    }
}

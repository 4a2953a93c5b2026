use std::{fmt, str::FromStr};

use crate::error::{ArchiveError, ArchiveResult};

/// Canonical 14-digit capture time (`YYYYMMDDhhmmss`).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(u64);

impl Timestamp {
    /// # Errors
    ///
    /// Returns [`ArchiveError::MalformedUrl`] unless `s` is exactly 14 ASCII
    /// digits.
    pub fn parse(s: &str) -> ArchiveResult<Self> {
        if s.len() != 14 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ArchiveError::MalformedUrl(format!(
                "invalid capture timestamp: {s:?}"
            )));
        }

        // 14 ASCII digits always fit in a u64.
        let value = s
            .parse::<u64>()
            .map_err(|e| ArchiveError::MalformedUrl(format!("invalid capture timestamp: {e}")))?;
        Ok(Self(value))
    }

    /// Absolute difference used for nearest-snapshot selection.
    #[must_use]
    pub fn distance(&self, other: Timestamp) -> u64 {
        self.0.abs_diff(other.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:014}", self.0)
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({:014})", self.0)
    }
}

impl FromStr for Timestamp {
    type Err = ArchiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

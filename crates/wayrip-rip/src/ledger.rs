use std::{
    collections::HashMap,
    fs::{self, File, OpenOptions},
    io::{BufRead, BufReader, Write},
    path::{Path, PathBuf},
};

use tracing::{debug, warn};

use crate::error::RipResult;

/// Ledger file name inside the output directory.
pub const LEDGER_FILE: &str = ".downloaded.txt";

/// Persistent record of verified downloads, enabling resumable runs.
///
/// One `sha256-hex<TAB>local-path` line per completed asset, appended and
/// flushed after each verified write. The whole file is loaded once at
/// startup; `reset` is the only operation that removes entries.
#[derive(Debug)]
pub struct DownloadLedger {
    path: PathBuf,
    entries: HashMap<String, String>,
}

impl DownloadLedger {
    /// Loads the ledger from `output_dir`, starting empty when no ledger
    /// file exists yet. Unparseable lines are dropped with a warning; the
    /// filesystem remains the source of truth.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if an existing ledger file cannot be read.
    pub fn load(output_dir: &Path) -> RipResult<Self> {
        let path = output_dir.join(LEDGER_FILE);
        let mut entries = HashMap::new();

        if path.exists() {
            let reader = BufReader::new(File::open(&path)?);
            for line in reader.lines() {
                let line = line?;
                match line.split_once('\t') {
                    Some((hash, local_path)) if !hash.is_empty() && !local_path.is_empty() => {
                        entries.insert(local_path.to_string(), hash.to_string());
                    }
                    _ => warn!(line, "skipping unparseable ledger line"),
                }
            }
            debug!(entries = entries.len(), path = %path.display(), "loaded download ledger");
        }

        Ok(Self { path, entries })
    }

    #[must_use]
    pub fn is_done(&self, local_path: &str) -> bool {
        self.entries.contains_key(local_path)
    }

    #[must_use]
    pub fn content_hash(&self, local_path: &str) -> Option<&str> {
        self.entries.get(local_path).map(String::as_str)
    }

    /// Records a verified download and flushes it to disk. Recording an
    /// already-present path is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the appended line cannot be persisted.
    pub fn mark_done(&mut self, local_path: &str, content_hash: &str) -> RipResult<()> {
        if self.entries.contains_key(local_path) {
            return Ok(());
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{content_hash}\t{local_path}")?;
        file.sync_data()?;

        self.entries
            .insert(local_path.to_string(), content_hash.to_string());
        Ok(())
    }

    /// Clears all entries and removes the backing file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the backing file cannot be removed.
    pub fn reset(&mut self) -> RipResult<()> {
        self.entries.clear();
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

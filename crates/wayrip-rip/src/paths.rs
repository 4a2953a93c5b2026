use std::{
    collections::{HashMap, HashSet},
    fs::{self, File, OpenOptions},
    io::{BufRead, BufReader, Write},
    path::{Path, PathBuf},
};

use sha2::{Digest, Sha256};
use tracing::{debug, warn};
use url::Url;
use wayrip_archive::asset_key;

use crate::{error::RipResult, kind::ContentKind};

/// Name-binding file inside the output directory.
pub const INDEX_FILE: &str = ".paths.txt";

/// Mapping from original URLs to flat local filenames.
///
/// Every component resolves names through one shared index so the same asset
/// referenced from multiple documents lands in exactly one file. The first
/// claim for an asset wins; later claims observe the established name.
///
/// Bindings are appended to a file next to the ledger as they are made.
/// Discovery order varies between runs, so a resumed run must not re-derive
/// names from scratch: it reloads the bindings and every asset keeps the
/// name its ledger entry was recorded under.
#[derive(Debug, Default)]
pub struct LocalPathIndex {
    file: Option<PathBuf>,
    by_key: HashMap<String, String>,
    taken: HashSet<String>,
}

impl LocalPathIndex {
    /// An in-memory index with no backing file.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the persistent index from `output_dir`, starting empty when no
    /// binding file exists yet. Unparseable lines are dropped with a warning.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if an existing binding file cannot be read.
    pub fn load(output_dir: &Path) -> RipResult<Self> {
        let file = output_dir.join(INDEX_FILE);
        let mut by_key = HashMap::new();
        let mut taken = HashSet::new();

        if file.exists() {
            let reader = BufReader::new(File::open(&file)?);
            for line in reader.lines() {
                let line = line?;
                match line.split_once('\t') {
                    Some((key, name)) if !key.is_empty() && !name.is_empty() => {
                        taken.insert(name.to_string());
                        by_key.insert(key.to_string(), name.to_string());
                    }
                    _ => warn!(line, "skipping unparseable name binding"),
                }
            }
            debug!(bindings = by_key.len(), path = %file.display(), "loaded local path index");
        }

        Ok(Self {
            file: Some(file),
            by_key,
            taken,
        })
    }

    /// The local filename for `url`, if one has been claimed.
    #[must_use]
    pub fn get(&self, url: &Url) -> Option<&str> {
        self.by_key.get(&asset_key(url)).map(String::as_str)
    }

    /// Claims a local filename for `url`, or returns the one already
    /// claimed. Basename collisions between distinct assets get a short
    /// hash suffix derived from the asset identity. New bindings are
    /// flushed to the backing file before they take effect.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the binding cannot be persisted.
    pub fn claim(&mut self, url: &Url, kind: ContentKind) -> RipResult<String> {
        let key = asset_key(url);
        if let Some(existing) = self.by_key.get(&key) {
            return Ok(existing.clone());
        }

        let mut name = file_name_for(url, kind);
        if self.taken.contains(&name) {
            name = insert_suffix(&name, &short_hash(&key));
        }

        if let Some(file) = &self.file {
            let mut out = OpenOptions::new().create(true).append(true).open(file)?;
            writeln!(out, "{key}\t{name}")?;
            out.sync_data()?;
        }

        self.taken.insert(name.clone());
        self.by_key.insert(key, name.clone());
        Ok(name)
    }

    /// Marks a filename as in use without binding it to an asset (the root
    /// page's own output name).
    pub fn reserve(&mut self, name: &str) {
        self.taken.insert(name.to_string());
    }

    /// Clears all bindings and removes the backing file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the backing file cannot be removed.
    pub fn reset(&mut self) -> RipResult<()> {
        self.by_key.clear();
        self.taken.clear();
        if let Some(file) = &self.file {
            if file.exists() {
                fs::remove_file(file)?;
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

/// Flat filename for an original URL: last path segment, query folded into
/// a hash suffix, extension inferred from the kind when missing.
fn file_name_for(url: &Url, kind: ContentKind) -> String {
    let basename = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
        .unwrap_or("index");

    let mut name = sanitize(basename);

    if let Some(query) = url.query() {
        name = insert_suffix(&name, &short_hash(query));
    }

    if !name.contains('.') {
        name.push('.');
        name.push_str(kind.default_extension());
    }

    name
}

pub(crate) fn sanitize(segment: &str) -> String {
    segment
        .chars()
        .map(|c| match c {
            '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            other => other,
        })
        .collect()
}

fn short_hash(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    hex::encode(&digest[..4])
}

/// `logo.png` + `abcd1234` -> `logo_abcd1234.png`.
fn insert_suffix(name: &str, suffix: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) => format!("{stem}_{suffix}.{ext}"),
        None => format!("{name}_{suffix}"),
    }
}

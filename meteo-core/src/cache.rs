//! Persistent place-name → coordinates cache.
//!
//! The whole store is read once at startup and rewritten in full whenever a
//! new entry is added. Entries never expire and are never overwritten.
//! Single writer only: two processes sharing one file may lose entries.

use std::{
    collections::{BTreeMap, btree_map::Entry},
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::{
    error::{Result, WeatherError},
    model::GeoRecord,
};

/// Lowercased, trimmed query; the identity of a cache entry.
pub fn normalize_key(query: &str) -> String {
    query.trim().to_lowercase()
}

#[derive(Debug, Clone)]
pub struct CacheStore {
    path: PathBuf,
    entries: BTreeMap<String, GeoRecord>,
}

impl CacheStore {
    /// Empty store backed by `path`; nothing is read or written yet.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), entries: BTreeMap::new() }
    }

    /// Read the backing file. A missing file yields an empty store; content
    /// that does not decode (bad JSON or not UTF-8) fails with
    /// [`WeatherError::CacheCorrupt`].
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no coordinate cache yet");
                return Ok(Self::empty(path));
            }
            Err(e) => return Err(WeatherError::io(path, e)),
        };

        let entries = match serde_json::from_slice(&bytes) {
            Ok(entries) => entries,
            Err(source) => return Err(WeatherError::CacheCorrupt { path, source }),
        };

        Ok(Self { path, entries })
    }

    /// Like [`CacheStore::load`], but a corrupt file is moved aside to
    /// `<path>.corrupt` (or `<path>.corrupt.N` if that name is taken) and an
    /// empty store is returned with a warning.
    pub fn load_or_recover(path: impl Into<PathBuf>) -> Result<Self> {
        match Self::load(path) {
            Err(WeatherError::CacheCorrupt { path, source }) => {
                let backup = corrupt_backup_path(&path);
                fs::rename(&path, &backup).map_err(|e| WeatherError::io(&path, e))?;
                warn!(
                    path = %path.display(),
                    backup = %backup.display(),
                    error = %source,
                    "coordinate cache is unreadable; starting with an empty cache",
                );
                Ok(Self::empty(path))
            }
            other => other,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&GeoRecord> {
        self.entries.get(&normalize_key(key))
    }

    /// Insert `record` under `key` unless the key is already present; the
    /// first record written for a key wins. Returns true if a new entry was added.
    pub fn put(&mut self, key: &str, record: GeoRecord) -> bool {
        match self.entries.entry(normalize_key(key)) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(record);
                true
            }
        }
    }

    /// Rewrite the backing file with the full store.
    ///
    /// The JSON is written to a temp file next to the target and renamed
    /// into place, so a crash leaves either the old file or the new one.
    pub fn persist(&self) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                fs::create_dir_all(parent).map_err(|e| WeatherError::io(parent, e))?;
                parent.to_path_buf()
            }
            _ => PathBuf::from("."),
        };

        let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| WeatherError::io(&dir, e))?;
        serde_json::to_writer_pretty(&mut tmp, &self.entries)
            .map_err(|e| WeatherError::io(tmp.path(), e.into()))?;
        tmp.write_all(b"\n").map_err(|e| WeatherError::io(tmp.path(), e))?;
        tmp.as_file().sync_all().map_err(|e| WeatherError::io(tmp.path(), e))?;

        tmp.persist(&self.path).map_err(|e| WeatherError::io(&self.path, e.error))?;

        debug!(
            path = %self.path.display(),
            entries = self.entries.len(),
            "coordinate cache written"
        );
        Ok(())
    }
}

/// First free backup name; earlier backups are never overwritten.
fn corrupt_backup_path(path: &Path) -> PathBuf {
    let mut base = path.as_os_str().to_owned();
    base.push(".corrupt");
    let base = PathBuf::from(base);

    let mut candidate = base.clone();
    let mut n = 1u32;
    while candidate.exists() {
        let mut name = base.as_os_str().to_owned();
        name.push(format!(".{n}"));
        candidate = PathBuf::from(name);
        n += 1;
    }
    candidate
}

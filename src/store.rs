// Persisted mapping from remote file id to the last time it was visited.
// The whole file is rewritten on every save; there is no locking, runs are
// expected not to overlap.

use crate::error::StoreError;
use crate::timestamp::{format_instant, parse_instant};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Stored value for one file id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LastVisit {
    At(DateTime<Utc>),
    /// Value that is not a timestamp we can read. Written back unchanged.
    Unreadable(Value),
}

impl LastVisit {
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        match self {
            LastVisit::At(at) => Some(*at),
            LastVisit::Unreadable(_) => None,
        }
    }

    fn from_json(value: Value) -> Self {
        match value.as_str().and_then(parse_instant) {
            Some(at) => LastVisit::At(at),
            None => LastVisit::Unreadable(value),
        }
    }

    fn to_json(&self) -> Value {
        match self {
            LastVisit::At(at) => Value::String(format_instant(at)),
            LastVisit::Unreadable(raw) => raw.clone(),
        }
    }
}

impl From<DateTime<Utc>> for LastVisit {
    fn from(at: DateTime<Utc>) -> Self {
        LastVisit::At(at)
    }
}

impl PartialEq<DateTime<Utc>> for LastVisit {
    fn eq(&self, other: &DateTime<Utc>) -> bool {
        self.instant().as_ref() == Some(other)
    }
}

/// In-memory form of the state file.
pub type Entries = BTreeMap<String, LastVisit>;

#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        StateStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the state file. `Ok(None)` when it does not exist yet,
    /// `StoreError::Corrupt` when it is not a JSON object. Values that are
    /// not readable timestamps are kept as `LastVisit::Unreadable`.
    pub fn load(&self) -> Result<Option<Entries>, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(self.io(source)),
        };

        let raw: BTreeMap<String, Value> =
            serde_json::from_slice(&bytes).map_err(|e| self.corrupt(e.to_string()))?;

        let entries: Entries = raw
            .into_iter()
            .map(|(id, value)| (id, LastVisit::from_json(value)))
            .collect();
        for (id, visit) in &entries {
            if let LastVisit::Unreadable(raw) = visit {
                warn!(%id, value = %raw, "unreadable timestamp in state file");
            }
        }
        Ok(Some(entries))
    }

    /// Replace the state file with `entries`, pretty-printed. Written to a
    /// sibling temp file first and renamed over the target.
    pub fn save(&self, entries: &Entries) -> Result<(), StoreError> {
        let raw: BTreeMap<&str, Value> = entries
            .iter()
            .map(|(id, visit)| (id.as_str(), visit.to_json()))
            .collect();
        let mut json = serde_json::to_string_pretty(&raw)?;
        json.push('\n');

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| self.io(source))?;
        }
        let tmp = self.tmp_path();
        fs::write(&tmp, &json).map_err(|source| self.io(source))?;
        fs::rename(&tmp, &self.path).map_err(|source| self.io(source))?;

        info!(path = %self.path.display(), entries = entries.len(), "state file written");
        debug!("state file contents:\n{json}");
        Ok(())
    }

    /// Record `id -> at`, overwriting any previous value for `id` and
    /// leaving every other record as it was. A file that is not valid JSON
    /// is replaced by a fresh one; the old records are lost.
    pub fn update(&self, id: &str, at: DateTime<Utc>) -> Result<Entries, StoreError> {
        let mut entries = match self.load() {
            Ok(Some(entries)) => entries,
            Ok(None) => Entries::new(),
            Err(StoreError::Corrupt { path, reason }) => {
                warn!(path = %path.display(), %reason, "state file is empty or corrupted, starting fresh");
                Entries::new()
            }
            Err(e) => return Err(e),
        };
        entries.insert(id.to_string(), LastVisit::At(at));
        self.save(&entries)?;
        Ok(entries)
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn corrupt(&self, reason: String) -> StoreError {
        StoreError::Corrupt {
            path: self.path.clone(),
            reason,
        }
    }
}

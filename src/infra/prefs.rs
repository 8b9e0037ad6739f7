//! Preference backends for the follow set.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::application::repos::FollowPrefs;

type PrefsMap = BTreeMap<String, BTreeSet<String>>;

/// String-set preferences stored as one JSON object in a file.
///
/// Every write replaces the whole file through a temp file in the same
/// directory followed by a rename, so a crash never leaves a torn file.
/// I/O failures are logged and otherwise ignored: reads fall back to an
/// empty set and a failed write leaves the previous file in place.
#[derive(Debug)]
pub struct JsonFilePrefs {
    path: PathBuf,
    write_guard: Mutex<()>,
}

impl JsonFilePrefs {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> io::Result<PrefsMap> {
        match fs::read(&self.path) {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(PrefsMap::new()),
            Err(err) => Err(err),
        }
    }

    fn write_map(&self, map: &PrefsMap) -> io::Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut file = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut file, map)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
        file.write_all(b"\n")?;
        file.as_file().sync_all()?;
        file.persist(&self.path).map_err(|err| err.error)?;
        Ok(())
    }
}

impl FollowPrefs for JsonFilePrefs {
    fn get_string_set(&self, key: &str) -> BTreeSet<String> {
        match self.read_map() {
            Ok(mut map) => map.remove(key).unwrap_or_default(),
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    key,
                    error = %err,
                    "Failed to read preferences, using empty set"
                );
                BTreeSet::new()
            }
        }
    }

    fn put_string_set(&self, key: &str, values: &BTreeSet<String>) {
        let _guard = self
            .write_guard
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut map = match self.read_map() {
            Ok(map) => map,
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "Existing preferences unreadable, rewriting"
                );
                PrefsMap::new()
            }
        };
        map.insert(key.to_string(), values.clone());

        match self.write_map(&map) {
            Ok(()) => debug!(path = %self.path.display(), key, count = values.len(), "Saved preferences"),
            Err(err) => warn!(
                path = %self.path.display(),
                key,
                error = %err,
                "Failed to save preferences"
            ),
        }
    }
}

/// In-process preferences, used when nothing needs to outlive the process.
#[derive(Debug, Default)]
pub struct MemoryPrefs {
    values: Mutex<PrefsMap>,
    writes: AtomicUsize,
}

impl MemoryPrefs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `put_string_set` calls observed.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl FollowPrefs for MemoryPrefs {
    fn get_string_set(&self, key: &str) -> BTreeSet<String> {
        self.values
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
            .cloned()
            .unwrap_or_default()
    }

    fn put_string_set(&self, key: &str, values: &BTreeSet<String>) {
        self.values
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key.to_string(), values.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().expect("temp dir");
        let prefs = JsonFilePrefs::new(dir.path().join("prefs.json"));
        assert!(prefs.get_string_set("followed_players").is_empty());
    }

    #[test]
    fn values_survive_a_new_instance() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nested").join("prefs.json");

        JsonFilePrefs::new(&path).put_string_set("followed_players", &set(&["a", "b"]));

        let reopened = JsonFilePrefs::new(&path);
        assert_eq!(reopened.get_string_set("followed_players"), set(&["a", "b"]));
    }

    #[test]
    fn keys_are_stored_independently() {
        let dir = tempfile::tempdir().expect("temp dir");
        let prefs = JsonFilePrefs::new(dir.path().join("prefs.json"));

        prefs.put_string_set("one", &set(&["x"]));
        prefs.put_string_set("two", &set(&["y"]));
        prefs.put_string_set("one", &set(&[]));

        assert!(prefs.get_string_set("one").is_empty());
        assert_eq!(prefs.get_string_set("two"), set(&["y"]));
    }

    #[test]
    fn corrupt_file_reads_as_empty_and_is_replaced() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("prefs.json");
        fs::write(&path, b"not json").expect("write corrupt file");

        let prefs = JsonFilePrefs::new(&path);
        assert!(prefs.get_string_set("followed_players").is_empty());

        prefs.put_string_set("followed_players", &set(&["z"]));
        assert_eq!(prefs.get_string_set("followed_players"), set(&["z"]));
    }

    #[test]
    fn memory_prefs_count_writes() {
        let prefs = MemoryPrefs::new();
        prefs.put_string_set("k", &set(&["a"]));
        prefs.put_string_set("k", &set(&["a", "b"]));

        assert_eq!(prefs.write_count(), 2);
        assert_eq!(prefs.get_string_set("k"), set(&["a", "b"]));
    }
}

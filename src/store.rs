use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Ordered, deduplicated set of track keys.
///
/// Iteration order equals insertion order, which is what makes track
/// processing deterministic and keeps the persisted files stable. Keys are
/// the fuzzy "title + primary artist" identity, so two distinct tracks
/// with the same title and artist collapse to one entry.
#[derive(Debug, Default, Clone)]
pub struct TrackSet {
    order: Vec<String>,
    seen: HashSet<String>,
}

impl TrackSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a key, returning false if it was already present
    pub fn insert(&mut self, key: impl Into<String>) -> bool {
        let key = key.into();
        if self.seen.contains(&key) {
            return false;
        }
        self.seen.insert(key.clone());
        self.order.push(key);
        true
    }

    pub fn contains(&self, key: &str) -> bool {
        self.seen.contains(key)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
}

impl FromIterator<String> for TrackSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut set = TrackSet::new();
        for key in iter {
            set.insert(key);
        }
        set
    }
}

/// Strip characters that are invalid in folder names on common filesystems
pub fn sanitize_playlist_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*'))
        .collect()
}

/// Durable mirror of one playlist transfer's state: a folder named after
/// the source playlist, holding an "added" file (superset, grows
/// monotonically) and a "failed" file (snapshot of the latest pass,
/// overwritten wholesale). A third file holds whatever the retry pass
/// could not resolve.
///
/// Every mutation is persisted synchronously with a full-file rewrite.
/// There is no locking; concurrent runs against the same folder would race.
pub struct PlaylistStore {
    added_file: PathBuf,
    failed_file: PathBuf,
    unresolved_file: PathBuf,
    added: TrackSet,
    prior_failures: TrackSet,
}

impl PlaylistStore {
    /// Open (creating lazily) the state folder for a playlist and load
    /// both sets. Absent files read as empty sets.
    pub fn open(state_dir: &Path, playlist_name: &str, playlist_id: &str) -> io::Result<Self> {
        let folder = state_dir.join(sanitize_playlist_name(playlist_name));
        fs::create_dir_all(&folder)?;

        let added_file = folder.join(format!("added_songs_{}.txt", playlist_id));
        let failed_file = folder.join(format!("failed_songs_{}.txt", playlist_id));
        let unresolved_file = folder.join(format!("unresolved_songs_{}.txt", playlist_id));

        let added = load_keys(&added_file)?;
        let prior_failures = load_keys(&failed_file)?;

        Ok(Self {
            added_file,
            failed_file,
            unresolved_file,
            added,
            prior_failures,
        })
    }

    /// Keys successfully transferred, this run or any earlier one
    pub fn added(&self) -> &TrackSet {
        &self.added
    }

    /// Keys the previous run left in its failed snapshot
    pub fn prior_failures(&self) -> &TrackSet {
        &self.prior_failures
    }

    pub fn is_added(&self, key: &str) -> bool {
        self.added.contains(key)
    }

    /// Record a successful transfer and rewrite the added file before
    /// returning, so the success survives any later abort.
    pub fn record_added(&mut self, key: &str) -> io::Result<()> {
        if self.added.insert(key) {
            write_keys(&self.added_file, &self.added)?;
        }
        Ok(())
    }

    /// Overwrite the failed snapshot with this pass's failures
    pub fn write_failed(&self, failed: &TrackSet) -> io::Result<()> {
        write_keys(&self.failed_file, failed)
    }

    /// Persist the tracks the retry pass could not resolve
    pub fn write_unresolved(&self, unresolved: &TrackSet) -> io::Result<()> {
        write_keys(&self.unresolved_file, unresolved)
    }

    pub fn unresolved_file(&self) -> &Path {
        &self.unresolved_file
    }
}

fn load_keys(path: &Path) -> io::Result<TrackSet> {
    if !path.exists() {
        return Ok(TrackSet::new());
    }
    let contents = fs::read_to_string(path)?;
    Ok(contents
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect())
}

fn write_keys(path: &Path, keys: &TrackSet) -> io::Result<()> {
    let contents = keys.iter().collect::<Vec<_>>().join("\n");
    fs::write(path, contents)
}

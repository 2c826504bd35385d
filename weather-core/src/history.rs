use std::{
    fs,
    path::{Path, PathBuf},
};

pub const MAX_RECENT_SEARCHES: usize = 5;

/// Most-recent-first list of past search texts, persisted as a JSON array.
///
/// Storage is best-effort: read and write failures are logged and otherwise
/// ignored, so a broken file never blocks a search.
#[derive(Debug, Clone, Default)]
pub struct RecentSearches {
    entries: Vec<String>,
    path: Option<PathBuf>,
}

impl RecentSearches {
    /// A list that is never written anywhere.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load the list stored at `path`; a missing or unreadable file yields an empty list.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match read_entries(&path) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "ignoring unreadable recent searches"
                );
                Vec::new()
            }
        };

        let mut list = Self {
            entries: Vec::new(),
            path: Some(path),
        };
        // Re-apply the invariants in case the file was edited by hand.
        for entry in entries.iter().rev() {
            list.insert(entry);
        }
        list
    }

    /// Move `query` to the front, dropping any earlier identical entry, and keep
    /// at most [`MAX_RECENT_SEARCHES`]. Blank text is ignored.
    pub fn record(&mut self, query: &str) {
        if query.trim().is_empty() {
            return;
        }
        self.insert(query);
        self.persist();
    }

    pub fn all(&self) -> &[String] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    fn insert(&mut self, query: &str) {
        self.entries.retain(|existing| existing != query);
        self.entries.insert(0, query.to_string());
        self.entries.truncate(MAX_RECENT_SEARCHES);
    }

    fn persist(&self) {
        let Some(path) = &self.path else {
            return;
        };
        if let Err(e) = write_entries(path, &self.entries) {
            tracing::warn!(path = %path.display(), error = %e, "failed to save recent searches");
        }
    }
}

fn read_entries(path: &Path) -> anyhow::Result<Vec<String>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

fn write_entries(path: &Path, entries: &[String]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string(entries)?)?;
    Ok(())
}

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::models::fingerprint::fingerprint;
use crate::models::frequency::{FrequencyTracker, HistoryEntry};
use crate::models::storage::{FREQUENCY_KEY, HISTORY_KEY, SNIPPETS_KEY, StorageBackend};
use crate::models::{Snippet, SnippetDraft};
use crate::search::{RankedSnippet, rank_snippets};

/// Owns every snippet and the fingerprint history.
///
/// Built once at startup and handed to whatever needs it. Without a storage
/// backend everything still works, but nothing outlives the session.
pub struct SnippetStore {
    snippets: Vec<Snippet>,
    tracker: FrequencyTracker,
    storage: Option<Box<dyn StorageBackend>>,
}

impl std::fmt::Debug for SnippetStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnippetStore")
            .field("snippets", &self.snippets.len())
            .field("tracked_fingerprints", &self.tracker.len())
            .field("persistent", &self.storage.is_some())
            .finish()
    }
}

impl SnippetStore {
    /// Loads the snippet list and occurrence history from `storage`.
    ///
    /// A table that cannot be read is logged and treated as empty. History
    /// older than `window` is expired straight away.
    pub fn load(storage: Option<Box<dyn StorageBackend>>, window: Duration) -> Self {
        let Some(backend) = storage.as_deref() else {
            debug!("No storage bound, snippet store is in-memory only");
            return Self::in_memory();
        };

        let snippets: Vec<Snippet> = read_table(backend, SNIPPETS_KEY);
        let history: Vec<HistoryEntry> = read_table(backend, HISTORY_KEY);

        let mut tracker = FrequencyTracker::from_history(history);
        tracker.prune(Utc::now(), window);
        info!(
            "Loaded {} snippets and {} tracked code blocks",
            snippets.len(),
            tracker.len()
        );

        Self {
            snippets,
            tracker,
            storage,
        }
    }

    pub fn in_memory() -> Self {
        Self {
            snippets: Vec::new(),
            tracker: FrequencyTracker::new(),
            storage: None,
        }
    }

    pub fn is_persistent(&self) -> bool {
        self.storage.is_some()
    }

    pub fn all(&self) -> &[Snippet] {
        &self.snippets
    }

    pub fn get(&self, id: &str) -> Option<&Snippet> {
        self.snippets.iter().find(|s| s.id == id)
    }

    pub fn by_language(&self, language: &str) -> Vec<&Snippet> {
        self.snippets
            .iter()
            .filter(|s| s.language == language)
            .collect()
    }

    /// Snippets carrying at least one of `tags`
    pub fn by_tags(&self, tags: &[String]) -> Vec<&Snippet> {
        self.snippets
            .iter()
            .filter(|s| tags.iter().any(|tag| s.tags.contains(tag)))
            .collect()
    }

    /// Case-insensitive substring match over name, description, code and tags
    pub fn search(&self, term: &str) -> Vec<&Snippet> {
        let term = term.to_lowercase();
        self.snippets
            .iter()
            .filter(|s| {
                s.name.to_lowercase().contains(&term)
                    || s.description
                        .as_ref()
                        .is_some_and(|d| d.to_lowercase().contains(&term))
                    || s.code.to_lowercase().contains(&term)
                    || s.tags.iter().any(|t| t.to_lowercase().contains(&term))
            })
            .collect()
    }

    /// Adds `snippet`, replacing any record that already uses its id
    pub fn add(&mut self, snippet: Snippet) {
        match self.snippets.iter_mut().find(|s| s.id == snippet.id) {
            Some(existing) => {
                warn!("Snippet id {} reused, replacing existing record", snippet.id);
                *existing = snippet;
            }
            None => {
                debug!("Added snippet {} ({})", snippet.id, snippet.name);
                self.snippets.push(snippet);
            }
        }
        self.save();
    }

    /// Creates and stores a new snippet from user input
    pub fn create(
        &mut self,
        draft: SnippetDraft,
        code: String,
        language: String,
        now: DateTime<Utc>,
    ) -> Snippet {
        let snippet = Snippet::from_draft(draft, code, language, now);
        self.add(snippet.clone());
        info!("Saved snippet \"{}\"", snippet.name);
        snippet
    }

    /// Replaces the matching record. Returns false when the id is unknown.
    pub fn update(&mut self, snippet: Snippet) -> bool {
        let Some(existing) = self.snippets.iter_mut().find(|s| s.id == snippet.id) else {
            return false;
        };
        existing.apply_edit(snippet);
        self.save();
        true
    }

    /// Returns false when the id is unknown
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.snippets.len();
        self.snippets.retain(|s| s.id != id);
        if self.snippets.len() == before {
            return false;
        }
        debug!("Deleted snippet {}", id);
        self.save();
        true
    }

    /// Returns false when the id is unknown
    pub fn increment_usage(&mut self, id: &str) -> bool {
        let Some(snippet) = self.snippets.iter_mut().find(|s| s.id == id) else {
            return false;
        };
        snippet.mark_used();
        self.save();
        true
    }

    pub fn suggest(&self, language: &str, context: &str, limit: usize) -> Vec<RankedSnippet<'_>> {
        rank_snippets(&self.snippets, language, context, limit)
    }

    pub fn tracker(&self) -> &FrequencyTracker {
        &self.tracker
    }

    /// Records an occurrence and expires everything outside `window`.
    ///
    /// Returns the fingerprint's frequency after pruning. Does not persist;
    /// callers batch occurrences and call [`SnippetStore::save`].
    pub fn record_occurrence(
        &mut self,
        fingerprint: &str,
        now: DateTime<Utc>,
        window: Duration,
    ) -> usize {
        self.tracker.record(fingerprint, now);
        self.tracker.prune(now, window);
        self.tracker.frequency_of(fingerprint)
    }

    /// True when a stored snippet's code has this fingerprint
    pub fn has_code_fingerprint(&self, code_fingerprint: &str) -> bool {
        self.snippets
            .iter()
            .any(|s| fingerprint(&s.code) == code_fingerprint)
    }

    /// Writes snippets and both tracking tables.
    ///
    /// Failures are logged, never returned: a broken disk must not break
    /// editing.
    pub fn save(&mut self) {
        let Some(storage) = self.storage.as_deref_mut() else {
            return;
        };

        if let Err(e) = write_all(storage, &self.snippets, &self.tracker) {
            warn!("Failed to persist snippet store: {:#}", e);
        }
    }
}

fn read_table<T: DeserializeOwned>(storage: &dyn StorageBackend, key: &str) -> Vec<T> {
    let value = match storage.get(key) {
        Ok(Some(value)) => value,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!("Failed to read {}: {:#}", key, e);
            return Vec::new();
        }
    };

    serde_json::from_value(value).unwrap_or_else(|e| {
        warn!("Discarding unreadable {} table: {}", key, e);
        Vec::new()
    })
}

fn write_all(
    storage: &mut dyn StorageBackend,
    snippets: &[Snippet],
    tracker: &FrequencyTracker,
) -> Result<()> {
    write_table(storage, SNIPPETS_KEY, snippets)?;
    write_table(storage, FREQUENCY_KEY, &tracker.frequency_entries())?;
    write_table(storage, HISTORY_KEY, &tracker.history_entries())
}

fn write_table<T: Serialize + ?Sized>(
    storage: &mut dyn StorageBackend,
    key: &str,
    value: &T,
) -> Result<()> {
    let value = serde_json::to_value(value).with_context(|| format!("Failed to serialize {}", key))?;
    storage
        .set(key, value)
        .with_context(|| format!("Failed to write {}", key))
}

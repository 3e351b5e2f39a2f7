use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Blocks shorter than this are never fingerprinted
pub const MIN_CODE_BLOCK_SIZE: usize = 50;

/// Recent occurrences needed before a block is offered as a snippet
pub const FREQUENCY_THRESHOLD: usize = 3;

/// Trailing window, in days, that occurrences count toward the threshold
pub const FREQUENCY_WINDOW_DAYS: i64 = 7;

pub fn default_window() -> Duration {
    Duration::days(FREQUENCY_WINDOW_DAYS)
}

/// Persisted form of the count map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrequencyEntry {
    pub fingerprint: String,
    pub occurrence_count: usize,
}

/// Persisted form of the occurrence history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub fingerprint: String,
    pub timestamps: Vec<DateTime<Utc>>,
}

/// Tracks when each fingerprint was seen.
///
/// `history` is authoritative; `counts` mirrors its lengths after every
/// prune and is kept for the persisted frequency table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrequencyTracker {
    counts: BTreeMap<String, usize>,
    history: BTreeMap<String, Vec<DateTime<Utc>>>,
}

impl FrequencyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the tracker from persisted history.
    ///
    /// Counts are derived from the timestamp lists, never read back, so a
    /// stale frequency table on disk cannot disagree with the history.
    pub fn from_history(history: Vec<HistoryEntry>) -> Self {
        let mut tracker = Self::new();

        for entry in history {
            if entry.timestamps.is_empty() {
                continue;
            }
            tracker
                .counts
                .insert(entry.fingerprint.clone(), entry.timestamps.len());
            tracker.history.insert(entry.fingerprint, entry.timestamps);
        }

        tracker
    }

    /// Appends an occurrence, creating the record if needed
    pub fn record(&mut self, fingerprint: &str, now: DateTime<Utc>) {
        self.history
            .entry(fingerprint.to_string())
            .or_default()
            .push(now);
        *self.counts.entry(fingerprint.to_string()).or_insert(0) += 1;
    }

    /// Drops occurrences older than `window` before `now`.
    ///
    /// Records left without timestamps are removed from both maps. A window
    /// reaching past the earliest representable time keeps everything.
    pub fn prune(&mut self, now: DateTime<Utc>, window: Duration) {
        let Some(cutoff) = now.checked_sub_signed(window) else {
            return;
        };
        let before = self.history.len();

        self.history.retain(|_, timestamps| {
            timestamps.retain(|ts| *ts >= cutoff);
            !timestamps.is_empty()
        });

        let history = &self.history;
        self.counts.retain(|fingerprint, count| match history.get(fingerprint) {
            Some(timestamps) => {
                *count = timestamps.len();
                true
            }
            None => false,
        });

        let removed = before - self.history.len();
        if removed > 0 {
            debug!("Pruned {} expired fingerprints", removed);
        }
    }

    /// Number of retained occurrences, zero when untracked
    pub fn frequency_of(&self, fingerprint: &str) -> usize {
        self.history.get(fingerprint).map_or(0, Vec::len)
    }

    pub fn contains(&self, fingerprint: &str) -> bool {
        self.history.contains_key(fingerprint)
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn frequency_entries(&self) -> Vec<FrequencyEntry> {
        self.counts
            .iter()
            .map(|(fingerprint, count)| FrequencyEntry {
                fingerprint: fingerprint.clone(),
                occurrence_count: *count,
            })
            .collect()
    }

    pub fn history_entries(&self) -> Vec<HistoryEntry> {
        self.history
            .iter()
            .map(|(fingerprint, timestamps)| HistoryEntry {
                fingerprint: fingerprint.clone(),
                timestamps: timestamps.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_record_and_frequency() {
        let mut tracker = FrequencyTracker::new();
        assert_eq!(tracker.frequency_of("abc"), 0);

        tracker.record("abc", at(0));
        tracker.record("abc", at(10));
        tracker.record("def", at(20));

        assert_eq!(tracker.frequency_of("abc"), 2);
        assert_eq!(tracker.frequency_of("def"), 1);
        assert_eq!(tracker.len(), 2);
    }

    #[test]
    fn test_prune_removes_expired_record() {
        let window = default_window();
        let mut tracker = FrequencyTracker::new();
        tracker.record("f", at(0));
        tracker.record("f", at(60));
        tracker.record("f", at(120));

        let t3 = at(120);
        tracker.prune(t3 + window + Duration::milliseconds(1), window);

        assert_eq!(tracker.frequency_of("f"), 0);
        assert!(!tracker.contains("f"));
        assert!(tracker.frequency_entries().is_empty());
        assert!(tracker.history_entries().is_empty());
    }

    #[test]
    fn test_prune_keeps_recent_and_resyncs_count() {
        let window = Duration::seconds(100);
        let mut tracker = FrequencyTracker::new();
        tracker.record("f", at(0));
        tracker.record("f", at(50));
        tracker.record("f", at(150));

        tracker.prune(at(150), window);

        assert_eq!(tracker.frequency_of("f"), 2);
        assert_eq!(
            tracker.frequency_entries(),
            vec![FrequencyEntry {
                fingerprint: "f".into(),
                occurrence_count: 2
            }]
        );
    }

    #[test]
    fn test_boundary_timestamp_is_retained() {
        let window = Duration::seconds(100);
        let mut tracker = FrequencyTracker::new();
        tracker.record("f", at(0));
        tracker.prune(at(100), window);
        assert_eq!(tracker.frequency_of("f"), 1);
    }

    #[test]
    fn test_from_history_derives_counts() {
        let tracker = FrequencyTracker::from_history(vec![
            HistoryEntry {
                fingerprint: "a".into(),
                timestamps: vec![at(0), at(1)],
            },
            HistoryEntry {
                fingerprint: "empty".into(),
                timestamps: vec![],
            },
        ]);

        assert_eq!(tracker.len(), 1);
        assert_eq!(tracker.frequency_of("a"), 2);
        assert!(!tracker.contains("empty"));
        assert_eq!(
            tracker.frequency_entries(),
            vec![FrequencyEntry {
                fingerprint: "a".into(),
                occurrence_count: 2
            }]
        );
    }

    #[test]
    fn test_prune_with_overflowing_window_keeps_everything() {
        let mut tracker = FrequencyTracker::new();
        tracker.record("f", at(0));
        tracker.record("f", at(10));

        tracker.prune(at(20), Duration::days(100_000_000));

        assert_eq!(tracker.frequency_of("f"), 2);
    }

    #[test]
    fn test_serialized_shape() {
        let mut tracker = FrequencyTracker::new();
        tracker.record("-1a2b", at(0));

        let json = serde_json::to_value(tracker.frequency_entries()).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{ "fingerprint": "-1a2b", "occurrenceCount": 1 }])
        );
    }
}

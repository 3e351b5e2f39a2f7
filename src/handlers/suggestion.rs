//! Frequent code block detection.
//!
//! Every sizeable inserted span is fingerprinted and recorded. Once the same
//! block shows up `threshold` times inside the tracking window, and nothing
//! in the library already holds it, a [`SuggestionEvent`] goes out so the
//! host can offer to save it.

use chrono::{DateTime, Utc};
use flume::{Receiver, Sender};
use tracing::{debug, info};

use crate::config::TrackingConfig;
use crate::models::{Snippet, SnippetDraft, SnippetStore, fingerprint};

/// One editor change: the document's language and each inserted span
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub language: String,
    pub inserted: Vec<String>,
}

impl ChangeEvent {
    pub fn new(language: impl Into<String>, inserted: Vec<String>) -> Self {
        Self {
            language: language.into(),
            inserted,
        }
    }

    pub fn single(language: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(language, vec![text.into()])
    }
}

/// A repeated block that should be offered as a snippet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionEvent {
    pub code: String,
    pub language: String,
    pub fingerprint: String,
    pub frequency: usize,
}

impl SuggestionEvent {
    pub fn prompt_message(&self) -> String {
        format!(
            "You've used this code block {} times recently. Save it as a snippet?",
            self.frequency
        )
    }
}

/// How the user answered a save-as-snippet prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuggestionResponse {
    Save(SnippetDraft),
    Declined,
    Cancelled,
}

pub struct SuggestionTrigger {
    policy: TrackingConfig,
    sender: Sender<SuggestionEvent>,
    receiver: Receiver<SuggestionEvent>,
}

impl SuggestionTrigger {
    pub fn new(policy: TrackingConfig) -> Self {
        let (sender, receiver) = flume::unbounded();
        Self {
            policy,
            sender,
            receiver,
        }
    }

    /// Receiver the host reads suggestions from
    pub fn subscribe(&self) -> Receiver<SuggestionEvent> {
        self.receiver.clone()
    }

    /// Drains every suggestion emitted so far without blocking
    pub fn pending(&self) -> Vec<SuggestionEvent> {
        self.receiver.try_iter().collect()
    }

    /// Processes one change event to completion.
    ///
    /// Returns how many suggestions were emitted.
    pub fn handle_change(
        &self,
        store: &mut SnippetStore,
        event: &ChangeEvent,
        now: DateTime<Utc>,
    ) -> usize {
        let mut recorded = false;
        let mut emitted = 0;

        for code in &event.inserted {
            // Measured in UTF-16 units, like the editor reports offsets
            if code.encode_utf16().count() < self.policy.min_block_size {
                continue;
            }

            let code_fingerprint = fingerprint(code);
            let frequency = store.record_occurrence(&code_fingerprint, now, self.policy.window());
            recorded = true;
            debug!("Code block {} seen {} times", code_fingerprint, frequency);

            if store.has_code_fingerprint(&code_fingerprint) {
                continue;
            }

            if frequency >= self.policy.threshold {
                info!(
                    "Suggesting code block {} as a snippet ({} recent uses)",
                    code_fingerprint, frequency
                );
                let suggestion = SuggestionEvent {
                    code: code.clone(),
                    language: event.language.clone(),
                    fingerprint: code_fingerprint,
                    frequency,
                };
                // Receiver lives in self, so the channel cannot be disconnected
                let _ = self.sender.send(suggestion);
                emitted += 1;
            }
        }

        if recorded {
            store.save();
        }

        emitted
    }

    /// Applies the user's answer. Only an explicit save touches the store.
    pub fn resolve(
        &self,
        store: &mut SnippetStore,
        event: SuggestionEvent,
        response: SuggestionResponse,
        now: DateTime<Utc>,
    ) -> Option<Snippet> {
        match response {
            SuggestionResponse::Save(draft) => {
                Some(store.create(draft, event.code, event.language, now))
            }
            SuggestionResponse::Declined | SuggestionResponse::Cancelled => {
                debug!("Suggestion for {} dismissed", event.fingerprint);
                None
            }
        }
    }
}

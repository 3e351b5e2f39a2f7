pub mod fingerprint;
pub mod frequency;
pub mod language;
pub mod snippet;
pub mod storage;
pub mod store;

pub use fingerprint::{fingerprint, normalize_code};
pub use frequency::{FrequencyEntry, FrequencyTracker, HistoryEntry};
pub use language::SnippetLanguage;
pub use snippet::{Snippet, SnippetDraft, parse_tags};
pub use storage::{JsonFileStorage, MemoryStorage, StorageBackend};
pub use store::SnippetStore;

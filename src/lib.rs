//! snipwatch - snippet library and repeated-code detection for editors
//!
//! The host editor forwards change events and snippet commands; snipwatch
//! keeps the snippet library, notices code blocks that keep being pasted,
//! ranks snippets against the code around the cursor, and talks to the
//! code-assistant backend for generation, conversion, analysis and
//! optimization.

pub mod cli;
pub mod config;
pub mod handlers;
pub mod models;
pub mod search;

pub use config::Config;
pub use handlers::SnippetError;
pub use handlers::suggestion::{ChangeEvent, SuggestionEvent, SuggestionResponse, SuggestionTrigger};
pub use models::{Snippet, SnippetDraft, SnippetStore};
pub use search::{RankedSnippet, extract_keywords, rank_snippets};

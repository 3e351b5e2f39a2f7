//! Event Handling Module
//!
//! Everything that reacts to the host editor: change events feeding the
//! frequency tracker, editor commands, library panel messages and the remote
//! backend the AI commands talk to.
//!
//! # Module Organization
//!
//! - **`suggestion`**: turns repeated code blocks into save-as-snippet prompts
//! - **`commands`**: editor-bound actions mapped onto the snippet store
//! - **`library`**: messages posted by the snippet library panel
//! - **`backend`**: HTTP client for generation, conversion, analysis and optimization

pub mod backend;
pub mod commands;
pub mod library;
pub mod suggestion;

use thiserror::Error;

/// Problems with what the user asked for. Nothing is mutated when one is
/// returned.
#[derive(Debug, Error)]
pub enum SnippetError {
    #[error("Snippet name is required")]
    EmptyName,

    #[error("No active editor found")]
    NoContext,

    #[error("No code selected")]
    NothingSelected,

    #[error("Snippet not found: {0}")]
    UnknownSnippet(String),
}

use chrono::{DateTime, Utc};
use tracing::info;

use crate::handlers::SnippetError;
use crate::handlers::library::library_view;
use crate::models::{Snippet, SnippetDraft, SnippetStore};

/// Lines above and below the cursor used as ranking context
pub const CONTEXT_RADIUS: usize = 10;

/// Editor-bound snippet actions
#[derive(Debug, Clone, PartialEq)]
pub enum EditorCommand {
    SaveSnippet {
        selection: String,
        language: String,
        draft: SnippetDraft,
    },
    SuggestSnippets {
        language: String,
        context: String,
    },
    OpenLibrary,
    EditSnippet {
        snippet: Snippet,
    },
    DeleteSnippet {
        id: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    Saved(Snippet),
    Suggestions(Vec<Snippet>),
    Library(Vec<Snippet>),
    Updated(Snippet),
    Deleted(String),
}

/// Runs one editor command against the store
pub fn execute(
    store: &mut SnippetStore,
    command: EditorCommand,
    max_suggestions: usize,
    now: DateTime<Utc>,
) -> Result<CommandOutcome, SnippetError> {
    match command {
        EditorCommand::SaveSnippet {
            selection,
            language,
            draft,
        } => {
            if selection.trim().is_empty() {
                return Err(SnippetError::NothingSelected);
            }
            Ok(CommandOutcome::Saved(store.create(draft, selection, language, now)))
        }
        EditorCommand::SuggestSnippets { language, context } => {
            let suggestions: Vec<Snippet> = store
                .suggest(&language, &context, max_suggestions)
                .into_iter()
                .map(|ranked| ranked.snippet.clone())
                .collect();
            info!("{} snippet suggestions for {}", suggestions.len(), language);
            Ok(CommandOutcome::Suggestions(suggestions))
        }
        EditorCommand::OpenLibrary => Ok(CommandOutcome::Library(library_view(store))),
        EditorCommand::EditSnippet { snippet } => {
            if snippet.name.trim().is_empty() {
                return Err(SnippetError::EmptyName);
            }
            let id = snippet.id.clone();
            if !store.update(snippet) {
                return Err(SnippetError::UnknownSnippet(id));
            }
            store
                .get(&id)
                .cloned()
                .map(CommandOutcome::Updated)
                .ok_or(SnippetError::UnknownSnippet(id))
        }
        EditorCommand::DeleteSnippet { id } => {
            if !store.delete(&id) {
                return Err(SnippetError::UnknownSnippet(id));
            }
            Ok(CommandOutcome::Deleted(id))
        }
    }
}

/// The lines within `radius` of `cursor_line` (zero-based), joined back up
pub fn context_window(text: &str, cursor_line: usize, radius: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    if lines.is_empty() {
        return String::new();
    }

    let cursor = cursor_line.min(lines.len() - 1);
    let start = cursor.saturating_sub(radius);
    let end = (cursor + radius + 1).min(lines.len());
    lines[start..end].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str) -> SnippetDraft {
        SnippetDraft::from_input(name, None, None).unwrap()
    }

    #[test]
    fn test_save_requires_selection() {
        let mut store = SnippetStore::in_memory();
        let err = execute(
            &mut store,
            EditorCommand::SaveSnippet {
                selection: "  \n".into(),
                language: "rust".into(),
                draft: draft("empty"),
            },
            5,
            Utc::now(),
        )
        .unwrap_err();

        assert!(matches!(err, SnippetError::NothingSelected));
        assert!(store.all().is_empty());
    }

    #[test]
    fn test_save_then_suggest() {
        let mut store = SnippetStore::in_memory();
        let now = Utc::now();
        let CommandOutcome::Saved(saved) = execute(
            &mut store,
            EditorCommand::SaveSnippet {
                selection: "fn parse_config() {}".into(),
                language: "rust".into(),
                draft: SnippetDraft::from_input("parse config", Some("toml loader"), Some("config"))
                    .unwrap(),
            },
            5,
            now,
        )
        .unwrap() else {
            panic!("expected save");
        };
        assert_eq!(saved.date_created, now);
        assert_eq!(saved.usage, 0);

        let outcome = execute(
            &mut store,
            EditorCommand::SuggestSnippets {
                language: "rust".into(),
                context: "load the config file".into(),
            },
            5,
            now,
        )
        .unwrap();
        assert_eq!(outcome, CommandOutcome::Suggestions(vec![saved]));
    }

    #[test]
    fn test_edit_and_delete_unknown() {
        let mut store = SnippetStore::in_memory();
        let ghost = Snippet::new("ghost".into(), "x".into(), "go".into(), Utc::now());

        let err = execute(
            &mut store,
            EditorCommand::EditSnippet { snippet: ghost },
            5,
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, SnippetError::UnknownSnippet(_)));

        let err = execute(
            &mut store,
            EditorCommand::DeleteSnippet { id: "nope".into() },
            5,
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, SnippetError::UnknownSnippet(id) if id == "nope"));
    }

    #[test]
    fn test_context_window() {
        let text = (0..30).map(|i| format!("line{}", i)).collect::<Vec<_>>().join("\n");

        let window = context_window(&text, 15, 2);
        assert_eq!(window, "line13\nline14\nline15\nline16\nline17");

        assert_eq!(context_window(&text, 0, 1), "line0\nline1");
        assert_eq!(context_window(&text, 500, 1), "line28\nline29");
        assert_eq!(context_window("", 3, CONTEXT_RADIUS), "");
    }
}

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::handlers::SnippetError;
use crate::models::{Snippet, SnippetStore};

/// Messages posted by the snippet library panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum LibraryMessage {
    Refresh,
    Insert { id: String },
    Delete { id: String },
    Edit { snippet: Snippet },
    Search { term: String },
    FilterByTags { tags: Vec<String> },
    FilterByLanguage { language: String },
}

/// What the panel host should do after a message was handled
#[derive(Debug, Clone, PartialEq)]
pub enum LibraryAction {
    /// Re-render with this list
    Render(Vec<Snippet>),
    /// Insert this code at the cursor
    InsertCode(String),
}

/// Snippets in library order: most used first, store order for ties
pub fn library_view(store: &SnippetStore) -> Vec<Snippet> {
    sorted_by_usage(store.all().iter())
}

fn sorted_by_usage<'a>(snippets: impl Iterator<Item = &'a Snippet>) -> Vec<Snippet> {
    let mut list: Vec<Snippet> = snippets.cloned().collect();
    list.sort_by(|a, b| b.usage.cmp(&a.usage));
    list
}

/// Parses a raw panel message
pub fn parse_library_message(raw: &str) -> Result<LibraryMessage, serde_json::Error> {
    serde_json::from_str(raw)
}

pub fn handle_library_message(
    store: &mut SnippetStore,
    message: LibraryMessage,
) -> Result<LibraryAction, SnippetError> {
    match message {
        LibraryMessage::Refresh => Ok(LibraryAction::Render(library_view(store))),
        LibraryMessage::Insert { id } => {
            let code = store
                .get(&id)
                .map(|s| s.code.clone())
                .ok_or_else(|| SnippetError::UnknownSnippet(id.clone()))?;
            store.increment_usage(&id);
            debug!("Inserted snippet {}", id);
            Ok(LibraryAction::InsertCode(code))
        }
        LibraryMessage::Delete { id } => {
            if !store.delete(&id) {
                warn!("Library asked to delete unknown snippet {}", id);
            }
            Ok(LibraryAction::Render(library_view(store)))
        }
        LibraryMessage::Edit { snippet } => {
            if snippet.name.trim().is_empty() {
                return Err(SnippetError::EmptyName);
            }
            if !store.update(snippet) {
                warn!("Library edited a snippet that no longer exists");
            }
            Ok(LibraryAction::Render(library_view(store)))
        }
        LibraryMessage::Search { term } => Ok(LibraryAction::Render(sorted_by_usage(
            store.search(&term).into_iter(),
        ))),
        LibraryMessage::FilterByTags { tags } => Ok(LibraryAction::Render(sorted_by_usage(
            store.by_tags(&tags).into_iter(),
        ))),
        LibraryMessage::FilterByLanguage { language } => Ok(LibraryAction::Render(
            sorted_by_usage(store.by_language(&language).into_iter()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn store_with(names: &[(&str, u32, &str)]) -> SnippetStore {
        let mut store = SnippetStore::in_memory();
        for (name, usage, language) in names {
            let mut s = Snippet::new(
                name.to_string(),
                format!("// {}", name),
                language.to_string(),
                Utc::now(),
            );
            s.usage = *usage;
            store.add(s);
        }
        store
    }

    #[test]
    fn test_parse_messages() {
        assert_eq!(
            parse_library_message(r#"{"command":"refresh"}"#).unwrap(),
            LibraryMessage::Refresh
        );
        assert_eq!(
            parse_library_message(r#"{"command":"insert","id":"42"}"#).unwrap(),
            LibraryMessage::Insert { id: "42".into() }
        );
        assert_eq!(
            parse_library_message(r#"{"command":"filterByTags","tags":["io"]}"#).unwrap(),
            LibraryMessage::FilterByTags {
                tags: vec!["io".into()]
            }
        );
        assert!(parse_library_message(r#"{"command":"explode"}"#).is_err());
    }

    #[test]
    fn test_refresh_orders_by_usage() {
        let mut store = store_with(&[("a", 1, "go"), ("b", 5, "go"), ("c", 1, "go")]);
        let LibraryAction::Render(list) =
            handle_library_message(&mut store, LibraryMessage::Refresh).unwrap()
        else {
            panic!("expected render");
        };
        let names: Vec<&str> = list.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_insert_counts_usage() {
        let mut store = store_with(&[("a", 0, "go")]);
        let id = store.all()[0].id.clone();

        let action =
            handle_library_message(&mut store, LibraryMessage::Insert { id: id.clone() }).unwrap();

        assert_eq!(action, LibraryAction::InsertCode("// a".into()));
        assert_eq!(store.get(&id).unwrap().usage, 1);
    }

    #[test]
    fn test_insert_unknown_is_error() {
        let mut store = store_with(&[]);
        let err = handle_library_message(&mut store, LibraryMessage::Insert { id: "x".into() })
            .unwrap_err();
        assert!(matches!(err, SnippetError::UnknownSnippet(id) if id == "x"));
    }

    #[test]
    fn test_edit_rejects_blank_name() {
        let mut store = store_with(&[("a", 0, "go")]);
        let mut edited = store.all()[0].clone();
        edited.name = "  ".into();

        let err = handle_library_message(&mut store, LibraryMessage::Edit { snippet: edited })
            .unwrap_err();
        assert!(matches!(err, SnippetError::EmptyName));
        assert_eq!(store.all()[0].name, "a");
    }

    #[test]
    fn test_delete_and_filters() {
        let mut store = store_with(&[("a", 0, "go"), ("b", 0, "rust")]);
        let id = store.all()[0].id.clone();

        let LibraryAction::Render(list) =
            handle_library_message(&mut store, LibraryMessage::Delete { id }).unwrap()
        else {
            panic!("expected render");
        };
        assert_eq!(list.len(), 1);

        let LibraryAction::Render(list) = handle_library_message(
            &mut store,
            LibraryMessage::FilterByLanguage {
                language: "go".into(),
            },
        )
        .unwrap() else {
            panic!("expected render");
        };
        assert!(list.is_empty());
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::handlers::SnippetError;

/// A named, tagged, language-scoped block of code kept in the library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub description: Option<String>,
    pub code: String,
    pub language: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub date_created: DateTime<Utc>,
    #[serde(default)]
    pub usage: u32,
}

/// Older stores wrote an empty string for a missing description
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

impl Snippet {
    pub fn new(name: String, code: String, language: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            description: None,
            code,
            language,
            tags: Vec::new(),
            date_created: now,
            usage: 0,
        }
    }

    /// Builds a snippet from user-supplied details
    pub fn from_draft(draft: SnippetDraft, code: String, language: String, now: DateTime<Utc>) -> Self {
        let mut snippet = Self::new(draft.name, code, language, now);
        snippet.description = draft.description;
        snippet.tags = draft.tags;
        snippet
    }

    /// Applies an edit while keeping the identity fields untouched
    pub fn apply_edit(&mut self, edited: Snippet) {
        self.name = edited.name;
        self.description = edited.description;
        self.code = edited.code;
        self.language = edited.language;
        self.tags = edited.tags;
        self.usage = self.usage.max(edited.usage);
    }

    pub fn mark_used(&mut self) {
        self.usage = self.usage.saturating_add(1);
    }

    /// Text the relevance ranker extracts keywords from
    pub fn metadata_text(&self) -> String {
        format!(
            "{} {} {}",
            self.name,
            self.description.as_deref().unwrap_or_default(),
            self.tags.join(" ")
        )
    }
}

/// Name, description and tags collected from the user before a save
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetDraft {
    pub name: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
}

impl SnippetDraft {
    /// Validates raw prompt input. A blank name rejects the whole draft.
    pub fn from_input(
        name: &str,
        description: Option<&str>,
        tags: Option<&str>,
    ) -> Result<Self, SnippetError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SnippetError::EmptyName);
        }

        let description = description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        Ok(Self {
            name: name.to_string(),
            description,
            tags: tags.map(parse_tags).unwrap_or_default(),
        })
    }
}

/// Splits a comma-separated tag list, dropping blanks
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_rejects_blank_name() {
        let err = SnippetDraft::from_input("   ", Some("desc"), Some("a,b")).unwrap_err();
        assert!(matches!(err, SnippetError::EmptyName));
    }

    #[test]
    fn test_draft_parses_optional_fields() {
        let draft = SnippetDraft::from_input(" fetch retry ", Some(""), Some(" http, ,retry ")).unwrap();
        assert_eq!(draft.name, "fetch retry");
        assert_eq!(draft.description, None);
        assert_eq!(draft.tags, vec!["http".to_string(), "retry".to_string()]);
    }

    #[test]
    fn test_apply_edit_keeps_identity() {
        let now = Utc::now();
        let mut original = Snippet::new("a".into(), "code".into(), "rust".into(), now);
        original.usage = 4;
        let mut edited = Snippet::new("b".into(), "new code".into(), "python".into(), Utc::now());
        edited.tags = vec!["x".into()];

        let id = original.id.clone();
        original.apply_edit(edited);

        assert_eq!(original.id, id);
        assert_eq!(original.date_created, now);
        assert_eq!(original.name, "b");
        assert_eq!(original.language, "python");
        assert_eq!(original.usage, 4);
    }

    #[test]
    fn test_deserialize_legacy_record() {
        let json = r#"{
            "id": "1718000000000",
            "name": "array sort",
            "description": "",
            "code": "items.sort()",
            "language": "typescript",
            "tags": ["sort"],
            "dateCreated": "2024-06-10T08:00:00.000Z",
            "usage": 2
        }"#;
        let snippet: Snippet = serde_json::from_str(json).unwrap();
        assert_eq!(snippet.description, None);
        assert_eq!(snippet.usage, 2);
        assert_eq!(snippet.metadata_text(), "array sort  sort");
    }
}

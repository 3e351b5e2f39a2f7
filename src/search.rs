use crate::models::Snippet;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// How many suggestions the ranker returns by default
pub const MAX_SUGGESTIONS: usize = 5;

/// Score bonus per recorded use of a snippet
pub const USAGE_WEIGHT: f64 = 0.5;

/// Language keywords and connectives that carry no matching signal
const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "var", "let", "const", "function", "import", "export", "from", "class",
    "interface", "type", "return", "this", "if", "else", "while", "do", "switch", "case",
    "break", "continue", "try", "catch",
];

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_\s]").unwrap());

/// Splits text into lower-cased significant words.
///
/// Punctuation becomes a separator, words of two chars or fewer and stop
/// words are dropped. Order and repeats are kept.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let cleaned = NON_WORD.replace_all(&lowered, " ");

    cleaned
        .split_whitespace()
        .filter(|word| word.len() > 2)
        .filter(|word| !STOP_WORDS.contains(word))
        .map(str::to_string)
        .collect()
}

/// A snippet paired with its relevance score for one request
#[derive(Debug, Clone, PartialEq)]
pub struct RankedSnippet<'a> {
    pub snippet: &'a Snippet,
    pub score: f64,
}

/// Ranks `snippets` of `language` against the editing `context`.
///
/// Score is the number of the snippet's metadata keywords found in the
/// context plus a usage bonus. Ties keep store order. Snippets of other
/// languages are never suggested.
pub fn rank_snippets<'a>(
    snippets: &'a [Snippet],
    language: &str,
    context: &str,
    limit: usize,
) -> Vec<RankedSnippet<'a>> {
    let candidates: Vec<&Snippet> = snippets.iter().filter(|s| s.language == language).collect();
    if candidates.is_empty() {
        return Vec::new();
    }

    let context_words: HashSet<String> = extract_keywords(context).into_iter().collect();

    let mut ranked: Vec<RankedSnippet> = candidates
        .into_iter()
        .map(|snippet| {
            let snippet_words = extract_keywords(&snippet.metadata_text());
            RankedSnippet {
                snippet,
                score: relevance_score(&context_words, &snippet_words)
                    + f64::from(snippet.usage) * USAGE_WEIGHT,
            }
        })
        .collect();

    // sort_by is stable
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked.truncate(limit);
    ranked
}

fn relevance_score(context_words: &HashSet<String>, snippet_words: &[String]) -> f64 {
    snippet_words
        .iter()
        .filter(|word| context_words.contains(*word))
        .count() as f64
}

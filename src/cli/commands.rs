use anyhow::{Context, Result};
use chrono::Utc;
use colored::Colorize;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tokio::runtime::Runtime;
use tracing::warn;

use crate::cli::prompt::ask_suggestion;
use crate::config::Config;
use crate::handlers::SnippetError;
use crate::handlers::backend::{BackendClient, BackendError, ConvertRequest, GenerateRequest};
use crate::handlers::commands::{CONTEXT_RADIUS, CommandOutcome, EditorCommand, context_window, execute};
use crate::handlers::library::{LibraryAction, LibraryMessage, handle_library_message};
use crate::handlers::suggestion::{ChangeEvent, SuggestionTrigger};
use crate::models::{JsonFileStorage, Snippet, SnippetDraft, SnippetLanguage, SnippetStore};

static COMMENT_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\s*//|\s*#|\s*--|\s*/\*|\s*\*)\s*").unwrap());

/// Opens the persistent store, or an in-memory one if storage is unavailable
fn open_store(config: &Config) -> SnippetStore {
    let storage = match &config.storage.data_dir {
        Some(dir) => JsonFileStorage::open(dir.clone()),
        None => JsonFileStorage::new(),
    };

    match storage {
        Ok(storage) => SnippetStore::load(Some(Box::new(storage)), config.tracking.window()),
        Err(e) => {
            warn!("Snippet storage unavailable, changes will not be kept: {:#}", e);
            SnippetStore::in_memory()
        }
    }
}

/// Reads a source file and derives the editor language id from its extension
fn read_source(file: &str) -> Result<(String, String)> {
    let path = Path::new(file);
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_string())
        .unwrap_or_default();
    let language = SnippetLanguage::from_extension(&extension)
        .language_id()
        .to_string();

    Ok((content, language))
}

fn print_error(message: &str) {
    println!("{}  {}", "┃".bright_magenta(), message.red());
}

fn print_snippet_error(error: &SnippetError) {
    print_error(&error.to_string());
}

fn print_backend_error(error: &BackendError, action: &str) {
    print_error(&error.user_message(action));
}

fn display_snippet_row(snippet: &Snippet) {
    let language = SnippetLanguage::from_language_id(&snippet.language);
    println!(
        "{}  {} {} {}",
        "┃".bright_magenta(),
        snippet.name.bright_white().bold(),
        format!("[{}]", language.display_name()).bright_yellow(),
        format!("used {}x", snippet.usage).dimmed()
    );
    println!("{}    {}", "┃".bright_magenta(), snippet.id.dimmed());
    if let Some(description) = &snippet.description {
        println!("{}    {}", "┃".bright_magenta(), description);
    }
    if !snippet.tags.is_empty() {
        let tags: Vec<String> = snippet.tags.iter().map(|t| format!("#{}", t)).collect();
        println!("{}    {}", "┃".bright_magenta(), tags.join(" ").bright_blue());
    }
}

fn display_list(title: &str, snippets: &[Snippet]) {
    println!(
        "{}  {} {}",
        "┃".bright_magenta(),
        title.bright_green().bold(),
        format!("({})", snippets.len()).dimmed()
    );
    println!("{}", "─".repeat(60).bright_magenta());

    if snippets.is_empty() {
        println!("{}  No snippets found", "┃".bright_magenta());
        return;
    }

    for snippet in snippets {
        display_snippet_row(snippet);
    }
}

fn display_code(code: &str) {
    println!("{}", "─".repeat(60).bright_magenta());
    for (i, line) in code.lines().enumerate() {
        println!("{}  {:>4} {}", "┃".bright_magenta(), (i + 1).to_string().dimmed(), line);
    }
    println!("{}", "─".repeat(60).bright_magenta());
}

/// Shows the library, optionally limited to one language
pub fn list_snippets(config: &Config, language: Option<&str>) -> Result<()> {
    let mut store = open_store(config);
    let message = match language {
        Some(language) => LibraryMessage::FilterByLanguage {
            language: language.to_string(),
        },
        None => LibraryMessage::Refresh,
    };

    if let LibraryAction::Render(snippets) = handle_library_message(&mut store, message)? {
        display_list("SNIPPET LIBRARY", &snippets);
    }
    Ok(())
}

pub fn search_snippets(config: &Config, query: &str) -> Result<()> {
    let mut store = open_store(config);
    let message = LibraryMessage::Search {
        term: query.to_string(),
    };

    if let LibraryAction::Render(snippets) = handle_library_message(&mut store, message)? {
        display_list(&format!("RESULTS FOR \"{}\"", query), &snippets);
    }
    Ok(())
}

/// Shows a snippet by ID or name and counts it as a use
pub fn show_snippet(config: &Config, name_or_id: &str) -> Result<()> {
    let mut store = open_store(config);

    let snippet = store.get(name_or_id).cloned().or_else(|| {
        let name = name_or_id.to_lowercase();
        // Try exact match first, then partial
        store
            .all()
            .iter()
            .find(|s| s.name.to_lowercase() == name)
            .or_else(|| store.all().iter().find(|s| s.name.to_lowercase().contains(&name)))
            .cloned()
    });

    let Some(snippet) = snippet else {
        print_error(&format!("No snippet found with name: {}", name_or_id));
        return Ok(());
    };

    match handle_library_message(
        &mut store,
        LibraryMessage::Insert {
            id: snippet.id.clone(),
        },
    ) {
        Ok(LibraryAction::InsertCode(code)) => {
            display_snippet_row(&snippet);
            display_code(&code);
        }
        Ok(LibraryAction::Render(_)) => {}
        Err(e) => print_snippet_error(&e),
    }
    Ok(())
}

/// Ranks snippets against the lines around `line`, or the whole file
pub fn suggest_snippets(config: &Config, file: &str, line: Option<usize>) -> Result<()> {
    let (content, language) = read_source(file)?;
    let context = match line {
        Some(line) => context_window(&content, line, CONTEXT_RADIUS),
        None => content,
    };

    let mut store = open_store(config);
    let outcome = execute(
        &mut store,
        EditorCommand::SuggestSnippets { language, context },
        config.suggestions.max_results,
        Utc::now(),
    )?;

    if let CommandOutcome::Suggestions(snippets) = outcome {
        display_list("SUGGESTED SNIPPETS", &snippets);
    }
    Ok(())
}

/// Feeds a file through the tracker as if it had just been pasted
pub fn track_file(config: &Config, file: &str) -> Result<()> {
    let (content, language) = read_source(file)?;
    let mut store = open_store(config);
    let trigger = SuggestionTrigger::new(config.tracking.clone());

    let now = Utc::now();
    trigger.handle_change(&mut store, &ChangeEvent::single(language, content), now);

    let pending = trigger.pending();
    if pending.is_empty() {
        println!(
            "{}  Recorded. Nothing to suggest yet.",
            "┃".bright_magenta()
        );
        return Ok(());
    }

    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut output = std::io::stdout();
    for event in pending {
        let response = ask_suggestion(&mut input, &mut output, &event)?;
        if let Some(snippet) = trigger.resolve(&mut store, event, response, now) {
            println!(
                "{}  {}",
                "┃".bright_magenta(),
                format!("✅ Snippet \"{}\" saved successfully!", snippet.name).bright_green()
            );
        }
    }
    Ok(())
}

pub fn save_snippet(
    config: &Config,
    file: &str,
    name: &str,
    description: Option<&str>,
    tags: Option<&str>,
) -> Result<()> {
    let (content, language) = read_source(file)?;

    let draft = match SnippetDraft::from_input(name, description, tags) {
        Ok(draft) => draft,
        Err(e) => {
            print_snippet_error(&e);
            return Ok(());
        }
    };

    let mut store = open_store(config);
    let command = EditorCommand::SaveSnippet {
        selection: content,
        language,
        draft,
    };

    match execute(&mut store, command, config.suggestions.max_results, Utc::now()) {
        Ok(CommandOutcome::Saved(snippet)) => {
            println!(
                "{}  {}",
                "┃".bright_magenta(),
                format!("✅ Snippet \"{}\" saved successfully!", snippet.name).bright_green()
            );
            display_snippet_row(&snippet);
        }
        Ok(_) => {}
        Err(e) => print_snippet_error(&e),
    }
    Ok(())
}

pub fn delete_snippet(config: &Config, id: &str) -> Result<()> {
    let mut store = open_store(config);
    let command = EditorCommand::DeleteSnippet { id: id.to_string() };

    match execute(&mut store, command, config.suggestions.max_results, Utc::now()) {
        Ok(_) => println!("{}  Deleted {}", "┃".bright_magenta(), id),
        Err(e) => print_snippet_error(&e),
    }
    Ok(())
}

/// Strips the comment marker from the line the cursor is on
fn comment_prompt(line: &str) -> String {
    COMMENT_PREFIX.replace(line, "").trim().to_string()
}

pub fn generate_code(config: &Config, file: &str, line: usize) -> Result<()> {
    let (content, language) = read_source(file)?;

    let Some(raw_line) = content.lines().nth(line) else {
        print_snippet_error(&SnippetError::NoContext);
        return Ok(());
    };
    let prompt = comment_prompt(raw_line);
    if prompt.is_empty() {
        print_error("Empty AI comment. Please provide a prompt.");
        return Ok(());
    }

    let client = BackendClient::new(&config.backend)?;
    let request = GenerateRequest {
        prompt,
        file_content: content,
        cursor_line: u32::try_from(line).unwrap_or(u32::MAX),
        language_id: language,
    };

    let rt = Runtime::new()?;
    match rt.block_on(client.generate(&request)) {
        Ok(code) if code.is_empty() => print_error("AI returned an empty response."),
        Ok(code) => display_code(&code),
        Err(e) => print_backend_error(&e, "code generation"),
    }
    Ok(())
}

pub fn convert_code(config: &Config, file: &str, target_language: &str) -> Result<()> {
    let (code, language) = read_source(file)?;
    if code.trim().is_empty() {
        print_snippet_error(&SnippetError::NothingSelected);
        return Ok(());
    }

    let client = BackendClient::new(&config.backend)?;
    let request = ConvertRequest {
        code,
        source_language: language,
        target_language: target_language.to_string(),
    };

    let rt = Runtime::new()?;
    match rt.block_on(client.convert(&request)) {
        Ok(converted) => display_code(&converted),
        Err(e) => print_backend_error(&e, "code conversion"),
    }
    Ok(())
}

pub fn analyze_code(config: &Config, file: &str) -> Result<()> {
    let (code, language) = read_source(file)?;
    if code.trim().is_empty() {
        print_error("No code found in the current editor");
        return Ok(());
    }

    let client = BackendClient::new(&config.backend)?;
    let rt = Runtime::new()?;
    let analysis = match rt.block_on(client.analyze(&code, &language)) {
        Ok(analysis) => analysis,
        Err(e) => {
            print_backend_error(&e, "bug analysis");
            return Ok(());
        }
    };

    println!(
        "{}  {} {}",
        "┃".bright_magenta(),
        "ANALYSIS".bright_green().bold(),
        analysis.summary
    );
    println!("{}", "─".repeat(60).bright_magenta());
    for issue in &analysis.issues {
        let line = issue
            .line
            .map(|l| l.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        println!(
            "{}  {} line {}: {}",
            "┃".bright_magenta(),
            format!("[{}]", issue.kind).bright_red(),
            line.bright_yellow(),
            issue.description
        );
        if let Some(fix) = &issue.fix {
            println!("{}    fix: {}", "┃".bright_magenta(), fix.bright_green());
        }
    }
    Ok(())
}

pub fn optimize_code(config: &Config, file: &str) -> Result<()> {
    let (code, language) = read_source(file)?;
    if code.trim().is_empty() {
        print_error("No code found to optimize");
        return Ok(());
    }

    let client = BackendClient::new(&config.backend)?;
    let rt = Runtime::new()?;
    let report = match rt.block_on(client.optimize(&code, &language)) {
        Ok(report) => report,
        Err(e) => {
            print_backend_error(&e, "code optimization");
            return Ok(());
        }
    };

    println!(
        "{}  {} {}",
        "┃".bright_magenta(),
        "OPTIMIZATIONS".bright_green().bold(),
        report.summary.as_deref().unwrap_or_default()
    );
    for (index, optimization) in report.optimizations.iter().enumerate() {
        let line = optimization
            .line
            .map(|l| l.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        println!(
            "{}  #{} {} (line {})",
            "┃".bright_magenta(),
            index + 1,
            optimization.kind.bright_yellow(),
            line
        );
        println!("{}    {}", "┃".bright_magenta(), optimization.description);
        println!("{}    - {}", "┃".bright_magenta(), optimization.original.red());
        println!("{}    + {}", "┃".bright_magenta(), optimization.optimized.green());
    }
    Ok(())
}

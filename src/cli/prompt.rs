use colored::Colorize;
use std::io::{self, BufRead, Write};

use crate::handlers::suggestion::{SuggestionEvent, SuggestionResponse};
use crate::models::SnippetDraft;

/// Reads one answer. `None` means the input was closed (prompt cancelled).
pub fn ask_line<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
) -> io::Result<Option<String>> {
    write!(output, "{}  {} ", "┃".bright_magenta(), prompt)?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

/// Walks the user through the save-as-snippet prompt.
///
/// Closing the input or leaving the name blank cancels the whole flow.
pub fn ask_suggestion<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    event: &SuggestionEvent,
) -> io::Result<SuggestionResponse> {
    writeln!(output, "{}  {}", "┃".bright_magenta(), event.prompt_message().bold())?;

    let Some(answer) = ask_line(input, output, "Save as snippet? [y/N]")? else {
        return Ok(SuggestionResponse::Cancelled);
    };
    if !matches!(answer.trim().to_lowercase().as_str(), "y" | "yes" | "s" | "save") {
        return Ok(SuggestionResponse::Declined);
    }

    let Some(name) = ask_line(input, output, "Give your code snippet a descriptive name:")? else {
        return Ok(SuggestionResponse::Cancelled);
    };
    let Some(description) = ask_line(input, output, "Description (optional):")? else {
        return Ok(SuggestionResponse::Cancelled);
    };
    let Some(tags) = ask_line(input, output, "Tags separated by commas (optional):")? else {
        return Ok(SuggestionResponse::Cancelled);
    };

    match SnippetDraft::from_input(&name, Some(&description), Some(&tags)) {
        Ok(draft) => Ok(SuggestionResponse::Save(draft)),
        Err(e) => {
            writeln!(output, "{}  {}", "┃".bright_magenta(), e.to_string().red())?;
            Ok(SuggestionResponse::Cancelled)
        }
    }
}

//! CLI Module for snipwatch
//! Drives the snippet store and the code-assistant backend from a terminal,
//! standing in for the editor that normally hosts these commands.

pub mod commands;
pub mod prompt;

use crate::config::Config;
use anyhow::Result;
use colored::Colorize;

/// Executes CLI commands based on the provided arguments
pub fn execute_cli(args: &[String], config: &Config) -> Result<()> {
    if args.is_empty() {
        print_help();
        return Ok(());
    }

    let arg = |index: usize| args.get(index).map(String::as_str);

    match args[0].as_str() {
        "list" | "ls" => commands::list_snippets(config, arg(1))?,
        "search" | "find" => match arg(1) {
            Some(query) => commands::search_snippets(config, query)?,
            None => usage_error("Missing search query", "snipwatch search <QUERY>"),
        },
        "show" | "view" | "cat" => match arg(1) {
            Some(name_or_id) => commands::show_snippet(config, name_or_id)?,
            None => usage_error("Missing snippet name or ID", "snipwatch show <NAME_OR_ID>"),
        },
        "suggest" => match arg(1) {
            Some(file) => commands::suggest_snippets(config, file, parse_line(arg(2)))?,
            None => usage_error("Missing file", "snipwatch suggest <FILE> [LINE]"),
        },
        "track" => match arg(1) {
            Some(file) => commands::track_file(config, file)?,
            None => usage_error("Missing file", "snipwatch track <FILE>"),
        },
        "save" => match (arg(1), arg(2)) {
            (Some(file), Some(name)) => commands::save_snippet(config, file, name, arg(3), arg(4))?,
            _ => usage_error(
                "Missing file or snippet name",
                "snipwatch save <FILE> <NAME> [DESCRIPTION] [TAGS]",
            ),
        },
        "delete" | "rm" => match arg(1) {
            Some(id) => commands::delete_snippet(config, id)?,
            None => usage_error("Missing snippet ID", "snipwatch delete <ID>"),
        },
        "generate" | "gen" => match (arg(1), parse_line(arg(2))) {
            (Some(file), Some(line)) => commands::generate_code(config, file, line)?,
            _ => usage_error("Missing file or line", "snipwatch generate <FILE> <LINE>"),
        },
        "convert" => match (arg(1), arg(2)) {
            (Some(file), Some(target)) => commands::convert_code(config, file, target)?,
            _ => usage_error(
                "Missing file or target language",
                "snipwatch convert <FILE> <TARGET_LANGUAGE>",
            ),
        },
        "analyze" => match arg(1) {
            Some(file) => commands::analyze_code(config, file)?,
            None => usage_error("Missing file", "snipwatch analyze <FILE>"),
        },
        "optimize" => match arg(1) {
            Some(file) => commands::optimize_code(config, file)?,
            None => usage_error("Missing file", "snipwatch optimize <FILE>"),
        },
        "help" => print_help(),
        other => {
            println!("{}  Unknown command: {}", "┃".bright_magenta(), other);
            print_help();
        }
    }

    Ok(())
}

/// Lines are given one-based on the command line
fn parse_line(raw: Option<&str>) -> Option<usize> {
    raw.and_then(|s| s.parse::<usize>().ok())
        .map(|line| line.saturating_sub(1))
}

fn usage_error(message: &str, usage: &str) {
    println!("{}  Error: {}", "┃".bright_magenta(), message);
    println!("{}  Usage: {}", "┃".bright_magenta(), usage);
}

/// Prints the help message with available commands
fn print_help() {
    println!(
        "{}  {}",
        "┃".bright_magenta(),
        "SNIPWATCH - SNIPPET ENGINE".bold()
    );

    println!("{}  {}", "┃".bright_magenta(), "USAGE:".bright_yellow());
    println!("{}  snipwatch [COMMAND] [ARGS]", "┃".bright_magenta());
    println!("{}  {}", "┃".bright_magenta(), "COMMANDS:".bright_yellow());

    let commands = [
        ("list, ls [LANGUAGE]", "Open the snippet library, most used first"),
        ("search, find <QUERY>", "Search names, descriptions, code and tags"),
        ("show, view <NAME_OR_ID>", "Display a snippet and count it as used"),
        ("suggest <FILE> [LINE]", "Rank snippets against the code around LINE"),
        ("track <FILE>", "Record FILE as a pasted block, offer to save repeats"),
        ("save <FILE> <NAME> [DESC] [TAGS]", "Save FILE as a snippet (tags comma-separated)"),
        ("delete, rm <ID>", "Delete a snippet"),
        ("generate, gen <FILE> <LINE>", "Generate code from the comment on LINE"),
        ("convert <FILE> <TARGET>", "Convert FILE to another language"),
        ("analyze <FILE>", "Look for bugs in FILE"),
        ("optimize <FILE>", "Suggest optimizations for FILE"),
        ("help", "Display this help message"),
    ];

    for (name, description) in commands {
        println!(
            "{}  {:<34} {}",
            "┃".bright_magenta(),
            name.bright_white(),
            description
        );
    }

    println!("{}  {}", "┃".bright_magenta(), "TIP:".bright_green());
    println!(
        "{}  Set RUST_LOG=snipwatch=debug to see tracking decisions",
        "┃".bright_magenta()
    );
}

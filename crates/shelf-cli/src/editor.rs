//! Interactive prompts
//!
//! Line-based prompts used by `book edit` and `book delete`.

use anyhow::Result;
use std::io::{self, BufRead, Write};

/// Whether stdin is attached to a terminal
pub fn is_interactive() -> bool {
    atty::is(atty::Stream::Stdin)
}

/// Prompt for confirmation
///
/// Returns true if user confirms, false otherwise.
/// In non-interactive mode (no TTY), returns false.
pub fn confirm(prompt: &str) -> Result<bool> {
    if !is_interactive() {
        return Ok(false);
    }

    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(is_yes(&input))
}

/// Prompt with a default value, returns None if user keeps default
///
/// A single `-` clears the value and is returned as an empty string.
pub fn prompt_with_default(prompt: &str, default: &str) -> Result<Option<String>> {
    if default.is_empty() {
        print!("{}: ", prompt);
    } else {
        print!("{} [{}]: ", prompt, default);
    }
    io::stdout().flush()?;

    read_answer(&mut io::stdin().lock())
}

fn read_answer(reader: &mut impl BufRead) -> Result<Option<String>> {
    let mut input = String::new();
    reader.read_line(&mut input)?;
    Ok(parse_answer(&input))
}

fn parse_answer(input: &str) -> Option<String> {
    match input.trim() {
        "" => None,
        "-" => Some(String::new()),
        answer => Some(answer.to_string()),
    }
}

fn is_yes(input: &str) -> bool {
    let input = input.trim().to_lowercase();
    input == "y" || input == "yes"
}

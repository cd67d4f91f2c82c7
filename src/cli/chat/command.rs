use std::path::PathBuf;

use super::paths::sanitize_path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `None` when `/upload` was given without a path.
    Upload(Option<PathBuf>),
    History,
    Help,
    Quit,
    Ask(String),
}

impl Command {
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();

        match trimmed.split_once(char::is_whitespace) {
            Some(("/upload", rest)) => Command::Upload(Some(sanitize_path(rest))),
            _ => match trimmed {
                "/upload" => Command::Upload(None),
                "/history" => Command::History,
                "/help" => Command::Help,
                "/quit" | "/exit" => Command::Quit,
                // Questions stay untrimmed here; ask() trims before sending
                _ => Command::Ask(input.to_string()),
            },
        }
    }
}

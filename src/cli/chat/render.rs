use crossterm::style::Stylize;

use crate::models::{Exchange, Role};

pub const FALLBACK_WIDTH: usize = 80;

pub fn terminal_width() -> usize {
    crossterm::terminal::size()
        .map(|(cols, _)| cols as usize)
        .ok()
        .filter(|cols| *cols > 0)
        .unwrap_or(FALLBACK_WIDTH)
}

/// Greedy word wrap. Words longer than `max` are split.
pub fn wrap(text: &str, max: usize) -> Vec<String> {
    let max = max.max(1);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let mut word = word;
            while word.chars().count() > max {
                if !line.is_empty() {
                    lines.push(std::mem::take(&mut line));
                }
                let split = word.char_indices().nth(max).map(|(i, _)| i).unwrap_or(word.len());
                lines.push(word[..split].to_string());
                word = &word[split..];
            }

            let needed = if line.is_empty() { 0 } else { 1 } + word.chars().count();
            if line.chars().count() + needed > max && !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
        }
        lines.push(line);
    }

    lines
}

/// Human turns hug the right edge, bot turns the left, each wrapped to 70%
/// of `width`.
pub fn render_exchange(exchange: &Exchange, width: usize, color: bool) -> String {
    let bubble = (width * 7 / 10).max(10);
    let lines = wrap(exchange.text(), bubble);

    lines
        .iter()
        .map(|line| {
            let styled = match (exchange.role(), color) {
                (Role::Human, true) => line.as_str().green().to_string(),
                (Role::Bot, true) => line.as_str().blue().to_string(),
                (_, false) => line.clone(),
            };
            match exchange.role() {
                Role::Human => {
                    let pad = width.saturating_sub(line.chars().count());
                    format!("{}{}", " ".repeat(pad), styled)
                }
                Role::Bot => styled,
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Local};
use crossterm::style::Stylize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub level: Level,
    pub text: String,
    pub raised_at: DateTime<Local>,
}

impl Notification {
    pub fn new(level: Level, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
            raised_at: Local::now(),
        }
    }

    /// Styled single line for the terminal.
    pub fn render(&self, color: bool) -> String {
        let stamp = self.raised_at.format("%H:%M:%S").to_string();
        let tag = match self.level {
            Level::Info => "info",
            Level::Warning => "warning",
            Level::Error => "error",
        };

        if !color {
            return format!("[{}] {}: {}", stamp, tag, self.text);
        }

        let tag = match self.level {
            Level::Info => tag.cyan(),
            Level::Warning => tag.yellow(),
            Level::Error => tag.red().bold(),
        };
        format!("{} {}: {}", format!("[{}]", stamp).dark_grey(), tag, self.text)
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(false))
    }
}

/// FIFO of notifications waiting to be shown. Pushing never blocks; the
/// chat loop drains the queue after each operation.
#[derive(Debug, Default)]
pub struct NotificationQueue {
    pending: VecDeque<Notification>,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, level: Level, text: impl Into<String>) {
        let notification = Notification::new(level, text);

        match notification.level {
            Level::Info => tracing::info!("{}", notification.text),
            Level::Warning => tracing::warn!("{}", notification.text),
            Level::Error => tracing::error!("{}", notification.text),
        }

        self.pending.push_back(notification);
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.push(Level::Info, text);
    }

    pub fn warning(&mut self, text: impl Into<String>) {
        self.push(Level::Warning, text);
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.push(Level::Error, text);
    }

    pub fn drain(&mut self) -> impl Iterator<Item = Notification> + '_ {
        self.pending.drain(..)
    }
}

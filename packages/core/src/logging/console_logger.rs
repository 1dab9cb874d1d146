// Console Logger
//
// Logger that writes leveled, optionally tagged lines to the console.

use super::logger::{LogLevel, Logger};

/// Console logger. Info goes to stdout, everything else to stderr.
pub struct ConsoleLogger {
    level: LogLevel,
    tag: Option<String>,
}

impl ConsoleLogger {
    pub fn new(level: LogLevel) -> Self {
        Self { level, tag: None }
    }

    /// Prefix every line with `[tag]`, e.g. the name of the front end.
    pub fn with_tag(level: LogLevel, tag: impl Into<String>) -> Self {
        Self {
            level,
            tag: Some(tag.into()),
        }
    }

    fn format(&self, label: &str, msg: &str) -> String {
        match &self.tag {
            Some(tag) => format!("[{}] [{}] {}", tag, label, msg),
            None => format!("[{}] {}", label, msg),
        }
    }
}

impl Logger for ConsoleLogger {
    fn level(&self) -> LogLevel {
        self.level
    }

    fn debug(&self, msg: &str) {
        if self.is_enabled(LogLevel::Debug) {
            eprintln!("{}", self.format("DEBUG", msg));
        }
    }

    fn info(&self, msg: &str) {
        if self.is_enabled(LogLevel::Info) {
            println!("{}", self.format("INFO", msg));
        }
    }

    fn warn(&self, msg: &str) {
        if self.is_enabled(LogLevel::Warn) {
            eprintln!("{}", self.format("WARN", msg));
        }
    }

    fn error(&self, msg: &str) {
        if self.is_enabled(LogLevel::Error) {
            eprintln!("{}", self.format("ERROR", msg));
        }
    }
}

// src/utils/log.rs

//! Console report formatting for the CLI.
//!
//! Reports go to stdout with the same `[timestamp] [LEVEL]` prefix as the
//! log records, so interleaved output reads as one stream.

use chrono::Local;

/// Report line level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
}

impl Level {
    fn as_str(&self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Warn => "WARN",
        }
    }
}

/// Format a report line with timestamp and level
fn format_line(level: Level, message: &str) -> String {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
    format!("[{}] [{}] {}", timestamp, level.as_str(), message)
}

pub fn line(message: &str) {
    println!("{}", format_line(Level::Info, message));
}

pub fn warn_line(message: &str) {
    println!("{}", format_line(Level::Warn, message));
}

/// Print a header
pub fn header(title: &str) {
    let border = "═".repeat(60);
    println!("{}", format_line(Level::Info, &border));
    println!("{}", format_line(Level::Info, &format!("  {}", title)));
    println!("{}", format_line(Level::Info, &border));
}

/// Print a sub-item (indented)
pub fn sub_item(message: &str) {
    println!("{}", format_line(Level::Info, &format!("    {}", message)));
}

/// Print a summary section
pub fn summary(title: &str, items: &[(&str, String)]) {
    println!();
    println!(
        "{}",
        format_line(Level::Info, &format!("[SUMMARY] {}", title))
    );
    for (key, value) in items {
        println!("{}", format_line(Level::Info, &format!("    {}: {}", key, value)));
    }
}

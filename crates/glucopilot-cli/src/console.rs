//! CLI console utilities

use chrono::{DateTime, Utc};
use colored::*;

/// CLI console for formatted output
pub struct CliConsole {
    verbose: bool,
}

impl CliConsole {
    /// Create a new CLI console
    pub const fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Print an info message (verbose only)
    pub fn info(&self, message: &str) {
        if self.verbose {
            println!("{} {}", "ℹ".blue().bold(), message);
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        println!("{} {}", "✓".green().bold(), message.green());
    }

    /// Print a warning message
    pub fn warn(&self, message: &str) {
        println!("{} {}", "⚠".yellow().bold(), message.yellow());
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red().bold(), message.red());
    }

    /// Print a header
    pub fn print_header(&self, title: &str) {
        println!();
        println!("{}", title.bold().underline());
        println!("{}", "=".repeat(title.len()).dimmed());
    }

    /// Print a key/value line
    pub fn field(&self, label: &str, value: &str) {
        println!("  {:<16} {}", format!("{}:", label).dimmed(), value);
    }

    /// Print any serializable value as pretty JSON
    pub fn json<T: serde::Serialize>(&self, value: &T) -> anyhow::Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}

/// Colored label for a job or rule status
pub fn status_label(status: &str) -> ColoredString {
    match status.trim().to_ascii_uppercase().as_str() {
        "SUCCESS" | "NO_MATCH" => status.green(),
        "FAILED" | "BLOCKED" => status.red(),
        "TRIGGERED" => status.yellow().bold(),
        _ => status.normal(),
    }
}

/// Format unix milliseconds for display
pub fn format_ts(ts: Option<i64>) -> String {
    ts.and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "-".to_string())
}

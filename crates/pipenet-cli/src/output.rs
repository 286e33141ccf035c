//! Terminal and JSON rendering for pipenet commands.
//!
//! Human mode prints sections, key/value lines and rounded tables to stdout.
//! JSON mode prints nothing but the final `{"status", "data"}` document, so
//! `pipenet ... --json | jq` always sees a single value; warnings go to
//! stderr in both modes.

use console::style;
use serde::Serialize;
use serde_json::{json, Value};
use std::fmt::Display;
use tabled::{settings::Style, Table, Tabled};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Human,
    Json,
}

pub struct OutputWriter {
    mode: Mode,
}

impl OutputWriter {
    pub fn new(json: bool) -> Self {
        Self {
            mode: if json { Mode::Json } else { Mode::Human },
        }
    }

    pub fn is_json(&self) -> bool {
        self.mode == Mode::Json
    }

    fn human(&self) -> bool {
        self.mode == Mode::Human
    }

    /// Closing summary line of a command
    pub fn success(&self, message: impl Display) {
        if self.human() {
            println!("{} {}", style("✓").green().bold(), message);
        }
    }

    pub fn info(&self, message: impl Display) {
        if self.human() {
            println!("{} {}", style("ℹ").blue().bold(), message);
        }
    }

    /// Rejected rows, unresolved applications and the like
    pub fn warning(&self, message: impl Display) {
        if self.human() {
            eprintln!("{} {}", style("⚠").yellow().bold(), message);
        } else {
            eprintln!("{}", envelope("warning", "message", json!(message.to_string())));
        }
    }

    pub fn section(&self, title: impl Display) {
        if self.human() {
            println!("\n{}", style(title).bold().underlined());
        }
    }

    pub fn kv(&self, key: impl Display, value: impl Display) {
        if self.human() {
            println!("{}: {}", style(key).bold(), value);
        }
    }

    pub fn table<T: Tabled>(&self, rows: Vec<T>) {
        if !self.human() {
            return;
        }
        if rows.is_empty() {
            println!("{}", style("(nothing to show)").dim());
        } else {
            let mut table = Table::new(rows);
            table.with(Style::rounded());
            println!("{}", table);
        }
    }

    /// Print a command's result document
    pub fn result<T: Serialize>(&self, data: T) -> anyhow::Result<()> {
        let document = envelope("success", "data", serde_json::to_value(data)?);
        println!("{}", serde_json::to_string_pretty(&document)?);
        Ok(())
    }
}

fn envelope(status: &str, field: &str, payload: Value) -> Value {
    let mut document = json!({ "status": status });
    document[field] = payload;
    document
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope() {
        assert_eq!(
            envelope("success", "data", json!({"pipes": []})),
            json!({"status": "success", "data": {"pipes": []}})
        );
        assert_eq!(
            envelope("warning", "message", json!("2 rows skipped")),
            json!({"status": "warning", "message": "2 rows skipped"})
        );
    }

    #[test]
    fn test_mode() {
        assert!(OutputWriter::new(true).is_json());
        assert!(!OutputWriter::new(false).is_json());
    }
}

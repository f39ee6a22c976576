//! Console reporter.

use std::io::{Stdout, Write};
use std::sync::Mutex;

use chrono::{DateTime, Local};

use crate::traits::Reporter;
use crate::types::record::Record;

const BANNER_RULE: &str = "**********************************************************";
const ITEM_RULE: &str = "========================================";

/// Writes each batch as a "Refresh" banner followed by one block per record.
pub struct ConsoleReporter<W: Write + Send> {
    out: Mutex<W>,
}

impl ConsoleReporter<Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// Recover the writer (tests inspect what was written).
    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(|e| e.into_inner())
    }
}

impl<W: Write + Send> Reporter for ConsoleReporter<W> {
    fn report(&self, records: &[Record], at: DateTime<Local>) {
        let text = render(records, at);
        let mut out = self.out.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(e) = out.write_all(text.as_bytes()).and_then(|_| out.flush()) {
            tracing::warn!(error = %e, "Failed to write report");
        }
    }
}

/// Render a batch. Fields with an empty value are left out.
pub fn render(records: &[Record], at: DateTime<Local>) -> String {
    let mut text = String::new();

    text.push('\n');
    text.push_str(BANNER_RULE);
    text.push('\n');
    text.push_str("************************ Refresh *************************\n");
    text.push_str(&format!(
        "****************** {} *******************\n",
        at.format("%d %b %y %H:%M %Z")
    ));
    text.push_str(BANNER_RULE);
    text.push_str("\n\n");

    for record in records {
        text.push_str(ITEM_RULE);
        text.push('\n');
        text.push_str(&format!("{:<12} - {}\n", "Source", record.source));
        text.push_str(&format!("{:<12} - {}\n", "Title", record.title));
        for field in record.fields.iter().filter(|f| !f.value.is_empty()) {
            text.push_str(&format!("{:<12} - {}\n", field.name, field.value));
        }
        text.push('\n');
    }

    text
}

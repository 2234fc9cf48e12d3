//! Rendering records for the terminal.

use contactbook_core::{FieldErrors, Record};
use std::io::{self, Write};

/// Writes records either as tab-separated lines or as JSON.
pub struct OutputHandler {
    json: bool,
}

impl OutputHandler {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    pub fn records(&self, records: &[Record]) -> io::Result<()> {
        let mut out = io::stdout().lock();
        if self.json {
            serde_json::to_writer_pretty(&mut out, records)?;
            writeln!(out)?;
        } else {
            for record in records {
                writeln!(out, "{}", format_line(record))?;
            }
        }
        Ok(())
    }

    pub fn record(&self, record: &Record) -> io::Result<()> {
        let mut out = io::stdout().lock();
        if self.json {
            serde_json::to_writer_pretty(&mut out, record)?;
            writeln!(out)?;
        } else {
            writeln!(out, "{}", format_line(record))?;
        }
        Ok(())
    }

    pub fn message(&self, text: &str) -> io::Result<()> {
        writeln!(io::stdout().lock(), "{}", text)
    }
}

fn format_line(record: &Record) -> String {
    format!(
        "{}\t{}\t{}\t{}\t{}",
        record.id, record.first, record.last, record.phone, record.email
    )
}

/// Field-level messages, indented under a heading, for stderr.
pub fn format_field_errors(errors: &FieldErrors) -> String {
    let mut text = String::from("contact not saved:");
    for line in errors.to_string().lines() {
        text.push_str("\n  ");
        text.push_str(line);
    }
    text
}

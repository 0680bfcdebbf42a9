use std::io::{self, Write};

use serde::Serialize;

use crate::app::{ProgressEvent, ProgressSink, QcSummary};
use crate::columns::ColumnCheck;
use crate::set_file::SetFileResult;

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Text,
    Json,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_summary(result: &QcSummary) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_set_file(result: &SetFileResult) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_columns(result: &ColumnCheck) -> io::Result<()> {
        Self::print_json(result)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

pub struct TextOutput;

impl TextOutput {
    pub fn print_columns(result: &ColumnCheck) -> io::Result<()> {
        let mut stdout = io::stdout();
        write_columns(&mut stdout, result)
    }
}

pub fn write_columns<W: Write>(writer: &mut W, result: &ColumnCheck) -> io::Result<()> {
    let header = "Lines With Missing Columns";
    writeln!(writer, "\n\n{header}")?;
    writeln!(writer, "{}", "-".repeat(header.len()))?;
    for line in &result.short_lines {
        writeln!(
            writer,
            "lineNum: {}, columns: {:?} numColumns: {}",
            line.line_number,
            line.columns,
            line.column_count()
        )?;
    }
    Ok(())
}

/// Forwards pipeline progress to `tracing`.
pub struct TracingSink;

impl ProgressSink for TracingSink {
    fn event(&self, event: ProgressEvent) {
        match event.elapsed {
            Some(elapsed) => {
                tracing::info!(elapsed_ms = elapsed.as_millis() as u64, "{}", event.message)
            }
            None => tracing::info!("{}", event.message),
        }
    }
}

use crate::row::Row;
use crate::schema::SchemaRegistry;
use anyhow::{Context, Result};
use std::io::Write;

/// Writes rows as JSON Lines, one array per document
pub struct RowWriter<W: Write> {
    writer: W,
    rows_written: usize,
}

impl<W: Write> RowWriter<W> {
    pub fn new(writer: W) -> Self {
        RowWriter {
            writer,
            rows_written: 0,
        }
    }

    pub fn write_row(&mut self, row: &Row) -> Result<()> {
        let json = serde_json::to_string(row)
            .context("Failed to serialize row")?;
        writeln!(self.writer, "{}", json)
            .context("Failed to write row")?;
        self.rows_written += 1;
        Ok(())
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().context("Failed to flush writer")
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Write the `{name, position, type}` column listing as pretty JSON
pub fn write_schema<W: Write>(mut writer: W, registry: &SchemaRegistry) -> Result<()> {
    let json = serde_json::to_string_pretty(registry.columns())
        .context("Failed to serialize schema")?;
    writeln!(writer, "{}", json).context("Failed to write schema")?;
    writer.flush().context("Failed to flush schema writer")
}

// CSV sink: every cell quoted, embedded quotes doubled, rows end with \n

use anyhow::{Context, Result};
use std::io::Write;

use super::table::Table;

#[derive(Debug, Clone, Copy, Default)]
pub struct CsvWriter;

impl CsvWriter {
    pub fn new() -> Self {
        CsvWriter
    }

    /// Write header + rows to any sink
    pub fn write<W: Write>(&self, table: &Table, sink: W) -> Result<()> {
        let mut writer = ::csv::WriterBuilder::new()
            .quote_style(::csv::QuoteStyle::Always)
            .double_quote(true)
            .terminator(::csv::Terminator::Any(b'\n'))
            .flexible(true)
            .from_writer(sink);

        writer
            .write_record(&table.headers)
            .context("Failed to write CSV header")?;

        for (i, row) in table.rows.iter().enumerate() {
            writer
                .write_record(row)
                .with_context(|| format!("Failed to write CSV row {}", i + 1))?;
        }

        writer.flush().context("Failed to flush CSV output")?;
        Ok(())
    }

    /// Render to bytes (the downloadable blob)
    pub fn to_bytes(&self, table: &Table) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.write(table, &mut buffer)?;
        Ok(buffer)
    }

    pub fn to_string(&self, table: &Table) -> Result<String> {
        let bytes = self.to_bytes(table)?;
        String::from_utf8(bytes).context("CSV output is not valid UTF-8")
    }

    /// Header + data rows as parsed back from CSV output
    pub fn rows(&self, table: &Table) -> Result<Vec<Vec<String>>> {
        let bytes = self.to_bytes(table)?;
        let mut reader = ::csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(bytes.as_slice());

        let mut rows = Vec::new();
        for (i, result) in reader.records().enumerate() {
            let record = result.with_context(|| format!("Failed to read back CSV line {}", i + 1))?;
            rows.push(record.iter().map(str::to_string).collect());
        }
        Ok(rows)
    }
}

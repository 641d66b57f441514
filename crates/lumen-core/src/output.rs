//! Output formatting for JSON and JSONL output.
//!
//! Records are written as they are produced, so a long batch never holds its
//! results in memory. JSON output is a single array that is opened on the
//! first record and closed by [`OutputWriter::finish`].

use serde::Serialize;
use std::io::{self, Write};

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// A JSON array of records
    Json,
    /// One JSON object per line (newline-delimited JSON)
    JsonLines,
}

impl OutputFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "jsonl" | "jsonlines" | "ndjson" => Some(Self::JsonLines),
            _ => None,
        }
    }
}

/// A writer that streams records as JSON or JSONL.
pub struct OutputWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    pretty: bool,
    items_written: usize,
}

impl<W: Write> OutputWriter<W> {
    /// Create a new output writer.
    ///
    /// `pretty` only affects JSON output; JSONL is always one object per line.
    pub fn new(writer: W, format: OutputFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
            items_written: 0,
        }
    }

    /// Write a single record.
    pub fn write<T: Serialize>(&mut self, item: &T) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => {
                let separator = if self.items_written == 0 { "[" } else { "," };
                if self.pretty {
                    writeln!(self.writer, "{separator}")?;
                    serde_json::to_writer_pretty(&mut self.writer, item)
                        .map_err(io::Error::other)?;
                } else {
                    write!(self.writer, "{separator}")?;
                    serde_json::to_writer(&mut self.writer, item).map_err(io::Error::other)?;
                }
            }
            OutputFormat::JsonLines => {
                serde_json::to_writer(&mut self.writer, item).map_err(io::Error::other)?;
                writeln!(self.writer)?;
            }
        }
        self.items_written += 1;
        Ok(())
    }

    /// Close the JSON array (an empty batch yields `[]`) and flush.
    pub fn finish(&mut self) -> io::Result<()> {
        if self.format == OutputFormat::Json {
            match (self.items_written, self.pretty) {
                (0, _) => writeln!(self.writer, "[]")?,
                (_, true) => writeln!(self.writer, "\n]")?,
                (_, false) => writeln!(self.writer, "]")?,
            }
        }
        self.writer.flush()
    }

    /// Get the number of items written.
    pub fn items_written(&self) -> usize {
        self.items_written
    }

    /// Consume the writer and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

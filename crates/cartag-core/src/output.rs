//! Streaming JSON / JSON Lines output for tagged samples.
//!
//! JSON output is written as a single array whose elements are streamed one
//! at a time, so a batch never has to be collected in memory before writing.
//! Call [`OutputWriter::finish`] to close the array.

use serde::Serialize;
use std::io::{self, Write};

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// A single JSON array
    #[default]
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

/// A writer that serializes items as a streamed JSON array or as JSONL.
pub struct OutputWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    pretty: bool,
    items_written: usize,
}

impl<W: Write> OutputWriter<W> {
    /// Create a new output writer.
    ///
    /// `pretty` only affects the JSON format; JSONL is always one object per line.
    pub fn new(writer: W, format: OutputFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
            items_written: 0,
        }
    }

    /// Write a single item.
    pub fn write<T: Serialize>(&mut self, item: &T) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => {
                let sep: &[u8] = if self.items_written == 0 { b"[\n" } else { b",\n" };
                self.writer.write_all(sep)?;
                if self.pretty {
                    serde_json::to_writer_pretty(&mut self.writer, item)
                        .map_err(io::Error::other)?;
                } else {
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

    /// Write every item from an iterator.
    pub fn write_all<'a, T, I>(&mut self, items: I) -> io::Result<()>
    where
        T: Serialize + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        for item in items {
            self.write(item)?;
        }
        Ok(())
    }

    /// Get the number of items written.
    pub fn items_written(&self) -> usize {
        self.items_written
    }

    /// Close the JSON array (if any), flush, and return the underlying writer.
    pub fn finish(mut self) -> io::Result<W> {
        if self.format == OutputFormat::Json {
            if self.items_written == 0 {
                self.writer.write_all(b"[]\n")?;
            } else {
                self.writer.write_all(b"\n]\n")?;
            }
        }
        self.writer.flush()?;
        Ok(self.writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct TestItem {
        name: String,
        value: i32,
    }

    fn items() -> Vec<TestItem> {
        vec![
            TestItem {
                name: "a".to_string(),
                value: 1,
            },
            TestItem {
                name: "b".to_string(),
                value: 2,
            },
        ]
    }

    #[test]
    fn test_json_stream_is_valid_array() {
        let mut writer = OutputWriter::new(Vec::new(), OutputFormat::Json, false);
        writer.write_all(&items()).unwrap();
        assert_eq!(writer.items_written(), 2);
        let buffer = writer.finish().unwrap();

        let parsed: Vec<TestItem> = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(parsed, items());
    }

    #[test]
    fn test_pretty_json_stream_is_valid_array() {
        let mut writer = OutputWriter::new(Vec::new(), OutputFormat::Json, true);
        writer.write_all(&items()).unwrap();
        let buffer = writer.finish().unwrap();

        let output = String::from_utf8(buffer.clone()).unwrap();
        assert!(output.contains("\n  \"name\": \"a\""));
        let parsed: Vec<TestItem> = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn test_empty_json_stream() {
        let writer = OutputWriter::new(Vec::new(), OutputFormat::Json, false);
        let buffer = writer.finish().unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "[]\n");
    }

    #[test]
    fn test_write_jsonl() {
        let mut writer = OutputWriter::new(Vec::new(), OutputFormat::JsonLines, true);
        writer.write_all(&items()).unwrap();
        let buffer = writer.finish().unwrap();

        let output = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = output.trim().split('\n').collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], r#"{"name":"a","value":1}"#);
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(OutputFormat::parse("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse("jsonl"), Some(OutputFormat::JsonLines));
        assert_eq!(OutputFormat::parse("NDJSON"), Some(OutputFormat::JsonLines));
        assert_eq!(OutputFormat::parse("csv"), None);
    }
}

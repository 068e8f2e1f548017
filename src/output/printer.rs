//! Printer for settings and listings

use crate::error::Result;
use crate::storage::{BucketSummary, ObjectSummary};
use console::Style;
use serde::Serialize;
use std::io::{self, Write};

/// Header color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accent {
    /// SFTP sections
    Blue,
    /// AWS sections
    Yellow,
}

/// Writes labelled sections to an output sink
pub struct Printer<W: Write> {
    out: W,
    color: bool,
}

impl Printer<io::Stdout> {
    /// Printer for standard output
    pub fn stdout(color: bool) -> Self {
        Self::new(io::stdout(), color)
    }
}

impl<W: Write> Printer<W> {
    /// Create a printer over any writer
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    /// Printer without styling
    pub fn plain(out: W) -> Self {
        Self::new(out, false)
    }

    /// Consume the printer and return the writer
    pub fn into_inner(self) -> W {
        self.out
    }

    fn paint(&self, text: &str, style: Style) -> String {
        if self.color {
            style.force_styling(true).apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }

    /// Write a section label
    pub fn header(&mut self, label: &str, accent: Accent) -> Result<()> {
        let style = match accent {
            Accent::Blue => Style::new().blue(),
            Accent::Yellow => Style::new().yellow(),
        };
        let line = self.paint(label, style);
        writeln!(self.out, "{}", line)?;
        Ok(())
    }

    /// Pretty-print any serializable value
    pub fn value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        let rendered = serde_json::to_string_pretty(value)?;
        writeln!(self.out, "{}", rendered)?;
        Ok(())
    }

    /// A single `name: value` line
    pub fn field(&mut self, name: &str, value: &str) -> Result<()> {
        writeln!(self.out, "{}: {}", name, value)?;
        Ok(())
    }

    /// One object per line: `<last-modified>\t<size>\t<key>`
    pub fn objects(&mut self, objects: &[ObjectSummary]) -> Result<()> {
        for object in objects {
            let line = if self.color {
                let timestamp = object
                    .last_modified
                    .map(|ts| ts.to_string())
                    .unwrap_or_default();
                format!(
                    "{}\t{}\t{}",
                    self.paint(&timestamp, Style::new().green()),
                    self.paint(&object.size.to_string(), Style::new().blue()),
                    self.paint(&object.key, Style::new().yellow()),
                )
            } else {
                object.to_string()
            };
            writeln!(self.out, "{}", line)?;
        }
        Ok(())
    }

    /// The bucket sequence as name/creation date pairs
    pub fn buckets(&mut self, buckets: &[BucketSummary]) -> Result<()> {
        self.value(buckets)
    }

    /// Flush the underlying writer
    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

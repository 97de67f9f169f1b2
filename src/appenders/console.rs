//! Console appender implementation

use crate::core::{Appender, EncodedLine, Result};
use colored::Colorize;
use std::io::Write;

/// Writes each line synchronously to stderr, or to an injected writer.
pub struct ConsoleAppender {
    writer: Box<dyn Write + Send + Sync>,
    use_colors: bool,
}

impl ConsoleAppender {
    pub fn new() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
            use_colors: false,
        }
    }

    /// Write to `writer` instead of stderr
    ///
    /// # Example
    ///
    /// ```
    /// use rust_log_dispatch::appenders::ConsoleAppender;
    ///
    /// let appender = ConsoleAppender::with_writer(Box::new(std::io::sink()));
    /// ```
    pub fn with_writer(writer: Box<dyn Write + Send + Sync>) -> Self {
        Self {
            writer,
            use_colors: false,
        }
    }

    /// Color the whole line by level. Meant for text output on a terminal.
    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }
}

impl Default for ConsoleAppender {
    fn default() -> Self {
        Self::new()
    }
}

impl Appender for ConsoleAppender {
    fn append(&mut self, line: &EncodedLine) -> Result<()> {
        if self.use_colors {
            writeln!(self.writer, "{}", line.text.as_str().color(line.level.color_code()))?;
        } else {
            writeln!(self.writer, "{}", line.text)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}

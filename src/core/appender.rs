//! Appender trait for log output destinations

use super::{error::Result, log_level::LogLevel};

/// A record after encoding: what sinks actually receive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedLine {
    pub level: LogLevel,
    pub text: String,
}

impl EncodedLine {
    pub fn new(level: LogLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }
}

pub trait Appender: Send + Sync {
    fn append(&mut self, line: &EncodedLine) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn name(&self) -> &str;
}

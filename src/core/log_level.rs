//! Log level definitions

use super::error::LoggerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity of a log record, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Default)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum LogLevel {
    Verbose = 0,
    #[default]
    Debug = 1,
    Success = 2,
    Info = 3,
    Warn = 4,
    Error = 5,
    Fatal = 6,
}

/// Recognized configuration tokens. Matching is case-insensitive.
pub const LEVEL_ALIASES: &[(&str, LogLevel)] = &[
    ("v", LogLevel::Verbose),
    ("verbose", LogLevel::Verbose),
    ("d", LogLevel::Debug),
    ("dbg", LogLevel::Debug),
    ("debug", LogLevel::Debug),
    ("success", LogLevel::Success),
    ("ok", LogLevel::Success),
    ("standard", LogLevel::Info),
    ("std", LogLevel::Info),
    ("info", LogLevel::Info),
    ("w", LogLevel::Warn),
    ("warn", LogLevel::Warn),
    ("warning", LogLevel::Warn),
    ("warnings", LogLevel::Warn),
    ("e", LogLevel::Error),
    ("err", LogLevel::Error),
    ("error", LogLevel::Error),
    ("errors", LogLevel::Error),
    ("f", LogLevel::Fatal),
    ("fatal", LogLevel::Fatal),
];

impl LogLevel {
    /// All levels, least severe first.
    pub const ALL: [LogLevel; 7] = [
        LogLevel::Verbose,
        LogLevel::Debug,
        LogLevel::Success,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Fatal,
    ];

    pub fn to_str(&self) -> &'static str {
        match self {
            LogLevel::Verbose => "VERBOSE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Success => "SUCCESS",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
        }
    }

    /// Look up a configuration token such as `"w"`, `"Warning"` or `" dbg "`.
    pub fn from_alias(token: &str) -> Option<Self> {
        let token = token.trim();
        LEVEL_ALIASES
            .iter()
            .find(|(alias, _)| alias.eq_ignore_ascii_case(token))
            .map(|(_, level)| *level)
    }

    pub(crate) fn from_u8(raw: u8) -> Self {
        match raw {
            0 => LogLevel::Verbose,
            1 => LogLevel::Debug,
            2 => LogLevel::Success,
            3 => LogLevel::Info,
            4 => LogLevel::Warn,
            5 => LogLevel::Error,
            _ => LogLevel::Fatal,
        }
    }

    pub fn color_code(&self) -> colored::Color {
        use colored::Color::*;
        match self {
            LogLevel::Verbose => BrightBlack,
            LogLevel::Debug => Blue,
            LogLevel::Success => BrightGreen,
            LogLevel::Info => Green,
            LogLevel::Warn => Yellow,
            LogLevel::Error => Red,
            LogLevel::Fatal => BrightRed,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for LogLevel {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_alias(s).ok_or_else(|| LoggerError::unknown_level(s))
    }
}

/// Deserialization accepts the same alias table as `LOG_LEVEL`
impl TryFrom<String> for LogLevel {
    type Error = LoggerError;

    fn try_from(value: String) -> Result<Self, <LogLevel as TryFrom<String>>::Error> {
        value.parse()
    }
}

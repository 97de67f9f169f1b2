//! Log record structure

use super::call_site::CallSite;
use super::log_fields::LogFields;
use super::log_level::LogLevel;
use chrono::{DateTime, Utc};

/// Attribute key whose value is read as a `module.symbol` call-site qualifier.
pub const CALL_SITE_KEY: &str = "func";

/// One log call: constructed, filtered, encoded, then discarded.
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub level: LogLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub fields: LogFields,
    call_site: Option<CallSite>,
}

impl LogRecord {
    /// Sanitize log message to prevent log injection attacks
    ///
    /// Replaces newlines, carriage returns, and tabs with escape sequences
    /// to prevent attackers from injecting fake log entries.
    fn sanitize_message(message: &str) -> String {
        message
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t")
    }

    pub fn new(level: LogLevel, message: impl AsRef<str>) -> Self {
        Self {
            level,
            message: Self::sanitize_message(message.as_ref()),
            timestamp: Utc::now(),
            fields: LogFields::new(),
            call_site: None,
        }
    }

    pub fn with_fields(mut self, fields: LogFields) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_call_site(mut self, call_site: CallSite) -> Self {
        self.call_site = Some(call_site);
        self
    }

    /// Set `call_site` only when the record does not already name one,
    /// explicitly or through a `func` field.
    pub fn or_call_site(self, call_site: CallSite) -> Self {
        if self.call_site().is_some() {
            self
        } else {
            self.with_call_site(call_site)
        }
    }

    /// The explicit call site, or one parsed from the first `func` field.
    pub fn call_site(&self) -> Option<CallSite> {
        if let Some(site) = &self.call_site {
            return Some(site.clone());
        }
        self.fields
            .get(CALL_SITE_KEY)
            .and_then(|value| value.as_str())
            .and_then(CallSite::parse)
    }

    /// The call site set through `with_call_site` or `or_call_site`, ignoring fields.
    pub fn explicit_call_site(&self) -> Option<&CallSite> {
        self.call_site.as_ref()
    }

    /// Module identifier used for override lookups, borrowed from the record.
    pub fn module(&self) -> Option<&str> {
        if let Some(site) = &self.call_site {
            return Some(site.module());
        }
        let qualifier = self.fields.get(CALL_SITE_KEY)?.as_str()?;
        qualifier.split_once('.').map(|(module, _)| module)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_is_sanitized() {
        let record = LogRecord::new(LogLevel::Info, "a\nb\tc\r");
        assert_eq!(record.message, "a\\nb\\tc\\r");
    }

    #[test]
    fn test_call_site_from_func_field() {
        let record = LogRecord::new(LogLevel::Debug, "msg").with_fields(
            LogFields::new().with("peer", 7).with("func", "net.Dial"),
        );
        assert_eq!(record.module(), Some("net"));
    }

    #[test]
    fn test_explicit_call_site_wins() {
        let record = LogRecord::new(LogLevel::Debug, "msg")
            .with_fields(LogFields::new().with("func", "net.Dial"))
            .with_call_site(CallSite::new("storage", "Flush"));
        assert_eq!(record.module(), Some("storage"));
    }

    #[test]
    fn test_or_call_site_keeps_existing() {
        let record = LogRecord::new(LogLevel::Debug, "msg")
            .with_fields(LogFields::new().with("func", "net.Dial"))
            .or_call_site(CallSite::from_module_path("my_app::storage"));
        assert_eq!(record.module(), Some("net"));

        let record = LogRecord::new(LogLevel::Debug, "msg")
            .or_call_site(CallSite::from_module_path("my_app::storage"));
        assert_eq!(record.module(), Some("storage"));
    }

    #[test]
    fn test_no_call_site() {
        let record = LogRecord::new(LogLevel::Debug, "msg")
            .with_fields(LogFields::new().with("func", 12).with("other", "x.y"));
        assert!(record.call_site().is_none());

        let record = LogRecord::new(LogLevel::Debug, "msg")
            .with_fields(LogFields::new().with("func", "nodot"));
        assert!(record.module().is_none());
    }

    #[test]
    fn test_only_first_func_field_counts() {
        let record = LogRecord::new(LogLevel::Debug, "msg")
            .with_fields(LogFields::new().with("func", 12).with("func", "net.Dial"));
        assert!(record.module().is_none());
        assert!(record.call_site().is_none());
    }

    #[test]
    fn test_module_agrees_with_call_site() {
        let record = LogRecord::new(LogLevel::Debug, "msg")
            .with_fields(LogFields::new().with("func", "a.b.c"));
        assert_eq!(record.module(), Some("a"));
        assert_eq!(record.call_site().unwrap().module(), "a");
        assert!(record.explicit_call_site().is_none());

        let record = record.with_call_site(CallSite::new("storage", "Flush"));
        assert_eq!(record.explicit_call_site().map(CallSite::module), Some("storage"));
    }
}

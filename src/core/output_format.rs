//! Line encoders for accepted records
//!
//! - Json: one JSON object per line (default, what the collector ingests)
//! - Text: human-readable
//! - Logfmt: key=value pairs

use super::log_fields::FieldValue;
use super::log_record::{LogRecord, CALL_SITE_KEY};
use super::timestamp::TimestampFormat;
use serde::{Deserialize, Serialize};

/// Output format for encoded lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Example: `{"timestamp":"2025-01-08T10:30:45.123Z","level":"INFO","message":"Request processed"}`
    #[default]
    Json,

    /// Example: `[2025-01-08T10:30:45.123Z] [INFO   ] Request processed user=alice`
    Text,

    /// Example: `timestamp=2025-01-08T10:30:45.123Z level=INFO message="Request processed"`
    Logfmt,
}

impl OutputFormat {
    /// Encode a record as a single line (no trailing newline)
    pub fn format(&self, record: &LogRecord, timestamp_format: &TimestampFormat) -> String {
        match self {
            OutputFormat::Json => self.format_json(record, timestamp_format),
            OutputFormat::Text => self.format_text(record, timestamp_format),
            OutputFormat::Logfmt => self.format_logfmt(record, timestamp_format),
        }
    }

    /// Typed call site, which replaces any `func` field in the output so the
    /// encoded line names the module the filter saw
    fn explicit_caller(record: &LogRecord) -> Option<String> {
        record.explicit_call_site().map(ToString::to_string)
    }

    fn format_text(&self, record: &LogRecord, timestamp_format: &TimestampFormat) -> String {
        let mut line = format!(
            "[{}] [{:7}] {}",
            timestamp_format.format(&record.timestamp),
            record.level.to_str(),
            record.message
        );

        let caller = Self::explicit_caller(record);
        if let Some(caller) = &caller {
            line.push_str(&format!(" {}={}", CALL_SITE_KEY, caller));
        }
        let skip = caller.as_ref().map(|_| CALL_SITE_KEY);
        let fields = record.fields.format_fields_except(skip);
        if !fields.is_empty() {
            line.push(' ');
            line.push_str(&fields);
        }

        line
    }

    fn format_json(&self, record: &LogRecord, timestamp_format: &TimestampFormat) -> String {
        let mut json_obj = serde_json::Map::new();

        json_obj.insert(
            "timestamp".to_string(),
            timestamp_format.to_json_value(&record.timestamp),
        );
        json_obj.insert(
            "level".to_string(),
            serde_json::Value::String(record.level.to_str().to_string()),
        );
        json_obj.insert(
            "message".to_string(),
            serde_json::Value::String(record.message.clone()),
        );
        if let Some(caller) = Self::explicit_caller(record) {
            json_obj.insert(CALL_SITE_KEY.to_string(), serde_json::Value::String(caller));
        }

        // Duplicate keys: the first occurrence wins, matching override lookups
        for (key, value) in record.fields.iter() {
            json_obj
                .entry(key.to_string())
                .or_insert_with(|| value.to_json_value());
        }

        serde_json::to_string(&serde_json::Value::Object(json_obj)).unwrap_or_default()
    }

    fn format_logfmt(&self, record: &LogRecord, timestamp_format: &TimestampFormat) -> String {
        let mut parts = Vec::with_capacity(4 + record.fields.len());

        parts.push(format!(
            "timestamp={}",
            self.escape_logfmt_value(&timestamp_format.format(&record.timestamp))
        ));
        parts.push(format!("level={}", record.level.to_str()));
        parts.push(format!("message={}", self.quote_logfmt_value(&record.message)));
        let caller = Self::explicit_caller(record);
        if let Some(caller) = &caller {
            parts.push(format!("{}={}", CALL_SITE_KEY, self.escape_logfmt_value(caller)));
        }

        for (key, value) in record.fields.iter() {
            if caller.is_some() && key == CALL_SITE_KEY {
                continue;
            }
            let formatted_value = match value {
                FieldValue::String(s) => self.quote_logfmt_value(s),
                other => other.to_string(),
            };
            parts.push(format!("{}={}", self.escape_logfmt_key(key), formatted_value));
        }

        parts.join(" ")
    }

    fn escape_logfmt_key(&self, key: &str) -> String {
        key.chars()
            .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
            .collect()
    }

    fn escape_logfmt_value(&self, value: &str) -> String {
        if value.contains(|c: char| c == ' ' || c == '"' || c == '=' || c == '\n' || c == '\r') {
            self.quote_logfmt_value(value)
        } else {
            value.to_string()
        }
    }

    fn quote_logfmt_value(&self, value: &str) -> String {
        let escaped = value
            .replace('\\', "\\\\")
            .replace('"', "\\\"")
            .replace('\n', "\\n")
            .replace('\r', "\\r");
        format!("\"{}\"", escaped)
    }
}

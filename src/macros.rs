//! Logging macros for ergonomic log message formatting.
//!
//! These macros format their arguments like `format!`, tag the record with the
//! calling module (`module_path!()`, last segment) unless a `func` field
//! already names one, and route it through the dispatcher: `verbose!`,
//! `debug!`, `success!`, `info!` and `log!` are filtered, `warn!`, `error!`
//! and `fatal!` are not.
//!
//! # Examples
//!
//! ```
//! use rust_log_dispatch::prelude::*;
//! use rust_log_dispatch::{info, warn};
//!
//! let dispatcher = Dispatcher::builder().build();
//!
//! info!(dispatcher, "Server started");
//!
//! let port = 8080;
//! info!(dispatcher, "Server listening on port {}", port);
//!
//! let fields = LogFields::new().with("func", "net.Listen").with("port", 8080);
//! warn!(dispatcher, fields: fields, "Port {} already bound", port);
//! ```

#[doc(hidden)]
#[macro_export]
macro_rules! __log_record {
    ($level:expr, $fields:expr, $($arg:tt)+) => {
        $crate::LogRecord::new($level, format!($($arg)+))
            .with_fields($fields)
            .or_call_site($crate::CallSite::from_module_path(module_path!()))
    };
}

/// Log a message at `level` through the filter.
///
/// # Examples
///
/// ```
/// # use rust_log_dispatch::prelude::*;
/// # let dispatcher = Dispatcher::builder().build();
/// use rust_log_dispatch::log;
/// log!(dispatcher, LogLevel::Info, "Simple message");
/// log!(dispatcher, LogLevel::Success, "Migrated {} rows", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($d:expr, $level:expr, fields: $fields:expr, $($arg:tt)+) => {{
        $d.dispatch($crate::__log_record!($level, $fields, $($arg)+));
    }};
    ($d:expr, $level:expr, $($arg:tt)+) => {{
        $d.dispatch($crate::__log_record!($level, $crate::LogFields::new(), $($arg)+));
    }};
}

/// Log a verbose-level message.
///
/// # Examples
///
/// ```
/// # use rust_log_dispatch::prelude::*;
/// # let dispatcher = Dispatcher::builder().threshold(LogLevel::Verbose).build();
/// use rust_log_dispatch::verbose;
/// verbose!(dispatcher, "Entering function: calculate()");
/// ```
#[macro_export]
macro_rules! verbose {
    ($d:expr, fields: $fields:expr, $($arg:tt)+) => {
        $crate::log!($d, $crate::LogLevel::Verbose, fields: $fields, $($arg)+)
    };
    ($d:expr, $($arg:tt)+) => {
        $crate::log!($d, $crate::LogLevel::Verbose, $($arg)+)
    };
}

/// Log a debug-level message.
///
/// # Examples
///
/// ```
/// # use rust_log_dispatch::prelude::*;
/// # let dispatcher = Dispatcher::builder().build();
/// use rust_log_dispatch::debug;
/// debug!(dispatcher, "Counter value: {}", 10);
/// ```
#[macro_export]
macro_rules! debug {
    ($d:expr, fields: $fields:expr, $($arg:tt)+) => {
        $crate::log!($d, $crate::LogLevel::Debug, fields: $fields, $($arg)+)
    };
    ($d:expr, $($arg:tt)+) => {
        $crate::log!($d, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log a success-level message.
#[macro_export]
macro_rules! success {
    ($d:expr, fields: $fields:expr, $($arg:tt)+) => {
        $crate::log!($d, $crate::LogLevel::Success, fields: $fields, $($arg)+)
    };
    ($d:expr, $($arg:tt)+) => {
        $crate::log!($d, $crate::LogLevel::Success, $($arg)+)
    };
}

/// Log an info-level message.
///
/// # Examples
///
/// ```
/// # use rust_log_dispatch::prelude::*;
/// # let dispatcher = Dispatcher::builder().build();
/// use rust_log_dispatch::info;
/// info!(dispatcher, "Processing {} items", 100);
/// ```
#[macro_export]
macro_rules! info {
    ($d:expr, fields: $fields:expr, $($arg:tt)+) => {
        $crate::log!($d, $crate::LogLevel::Info, fields: $fields, $($arg)+)
    };
    ($d:expr, $($arg:tt)+) => {
        $crate::log!($d, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning. Never filtered.
///
/// # Examples
///
/// ```
/// # use rust_log_dispatch::prelude::*;
/// # let dispatcher = Dispatcher::builder().build();
/// use rust_log_dispatch::warn;
/// warn!(dispatcher, "Retry attempt {} of {}", 3, 5);
/// ```
#[macro_export]
macro_rules! warn {
    ($d:expr, fields: $fields:expr, $($arg:tt)+) => {
        $d.emit($crate::__log_record!($crate::LogLevel::Warn, $fields, $($arg)+))
    };
    ($d:expr, $($arg:tt)+) => {
        $d.emit($crate::__log_record!($crate::LogLevel::Warn, $crate::LogFields::new(), $($arg)+))
    };
}

/// Log an error. Never filtered.
///
/// # Examples
///
/// ```
/// # use rust_log_dispatch::prelude::*;
/// # let dispatcher = Dispatcher::builder().build();
/// use rust_log_dispatch::error;
/// error!(dispatcher, "Error code: {}, message: {}", 500, "Internal error");
/// ```
#[macro_export]
macro_rules! error {
    ($d:expr, fields: $fields:expr, $($arg:tt)+) => {
        $d.emit($crate::__log_record!($crate::LogLevel::Error, $fields, $($arg)+))
    };
    ($d:expr, $($arg:tt)+) => {
        $d.emit($crate::__log_record!($crate::LogLevel::Error, $crate::LogFields::new(), $($arg)+))
    };
}

/// Log a fatal message, flush every sink, then run the dispatcher's fatal
/// action (process exit by default).
///
/// # Examples
///
/// ```
/// # use rust_log_dispatch::prelude::*;
/// # use std::sync::Arc;
/// # let dispatcher = Dispatcher::builder().on_fatal(Arc::new(|| {})).build();
/// use rust_log_dispatch::fatal;
/// fatal!(dispatcher, "Unable to recover from error: {}", "disk full");
/// ```
#[macro_export]
macro_rules! fatal {
    ($d:expr, fields: $fields:expr, $($arg:tt)+) => {
        $d.emit_fatal($crate::__log_record!($crate::LogLevel::Fatal, $fields, $($arg)+))
    };
    ($d:expr, $($arg:tt)+) => {
        $d.emit_fatal($crate::__log_record!($crate::LogLevel::Fatal, $crate::LogFields::new(), $($arg)+))
    };
}

#[cfg(test)]
mod tests {
    use crate::core::{Appender, Dispatcher, EncodedLine, LogFields, LogLevel, OutputFormat, Result};
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<EncodedLine>>>);

    impl Appender for Capture {
        fn append(&mut self, line: &EncodedLine) -> Result<()> {
            self.0.lock().push(line.clone());
            Ok(())
        }
        fn flush(&mut self) -> Result<()> {
            Ok(())
        }
        fn name(&self) -> &str {
            "capture"
        }
    }

    fn setup(threshold: LogLevel) -> (Dispatcher, Capture) {
        let capture = Capture::default();
        let dispatcher = Dispatcher::builder()
            .threshold(threshold)
            .format(OutputFormat::Json)
            .appender(capture.clone())
            .on_fatal(Arc::new(|| {}))
            .build();
        (dispatcher, capture)
    }

    fn json_lines(capture: &Capture) -> Vec<serde_json::Value> {
        capture
            .0
            .lock()
            .iter()
            .map(|line| serde_json::from_str(&line.text).unwrap())
            .collect()
    }

    #[test]
    fn test_formats_message() {
        let (dispatcher, capture) = setup(LogLevel::Verbose);
        info!(dispatcher, "Items: {}", 100);
        log!(dispatcher, LogLevel::Success, "done");

        let lines = json_lines(&capture);
        assert_eq!(lines[0]["message"], "Items: 100");
        assert_eq!(lines[1]["level"], "SUCCESS");
    }

    #[test]
    fn test_tags_calling_module() {
        let (dispatcher, capture) = setup(LogLevel::Verbose);
        debug!(dispatcher, "from tests");

        let lines = json_lines(&capture);
        assert_eq!(lines[0]["func"], "tests");
    }

    #[test]
    fn test_module_override_uses_macro_call_site() {
        let (dispatcher, capture) = setup(LogLevel::Verbose);
        dispatcher.suppress_module("tests", LogLevel::Info);

        verbose!(dispatcher, "dropped");
        success!(dispatcher, "dropped");
        info!(dispatcher, fields: LogFields::new().with("func", "net.Dial"), "kept");
        warn!(dispatcher, "kept");

        assert_eq!(capture.0.lock().len(), 2);
    }

    #[test]
    fn test_severe_macros_bypass_threshold() {
        let (dispatcher, capture) = setup(LogLevel::Fatal);
        debug!(dispatcher, "dropped");
        warn!(dispatcher, "Retry {} of {}", 1, 3);
        error!(dispatcher, fields: LogFields::new().with("code", 500), "failed");
        fatal!(dispatcher, "Critical failure: {}", "system");

        let levels: Vec<LogLevel> = capture.0.lock().iter().map(|l| l.level).collect();
        assert_eq!(levels, vec![LogLevel::Warn, LogLevel::Error, LogLevel::Fatal]);
        assert_eq!(json_lines(&capture)[1]["code"], 500);
    }
}

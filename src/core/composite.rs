//! Composite sink: the set of appenders an accepted record fans out to

use super::{
    appender::{Appender, EncodedLine},
    error::Result,
    log_record::LogRecord,
    metrics::DispatchMetrics,
    output_format::OutputFormat,
    timestamp::TimestampFormat,
};
use parking_lot::Mutex;
use std::any::Any;

/// Immutable set of appenders sharing one encoder.
///
/// Each accepted record is encoded once and handed to every appender in
/// order. A failing or panicking appender is reported on stderr and never
/// stops the others from receiving the line.
pub struct CompositeSink {
    format: OutputFormat,
    timestamp_format: TimestampFormat,
    appenders: Vec<Mutex<Box<dyn Appender>>>,
    /// Set only on the sink installed by `Dispatcher::disable`
    discard: bool,
}

impl CompositeSink {
    pub fn new(format: OutputFormat, appenders: Vec<Box<dyn Appender>>) -> Self {
        Self {
            format,
            timestamp_format: TimestampFormat::default(),
            appenders: appenders.into_iter().map(Mutex::new).collect(),
            discard: false,
        }
    }

    /// A sink that accepts and discards everything without encoding it.
    pub fn dead() -> Self {
        Self {
            discard: true,
            ..Self::new(OutputFormat::default(), Vec::new())
        }
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    pub fn is_dead(&self) -> bool {
        self.discard
    }

    pub fn len(&self) -> usize {
        self.appenders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.appenders.is_empty()
    }

    pub fn appender_names(&self) -> Vec<String> {
        self.appenders
            .iter()
            .map(|appender| appender.lock().name().to_string())
            .collect()
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Encode `record` and deliver it to every appender.
    ///
    /// Returns `true` when every appender accepted the line.
    pub fn emit(&self, record: &LogRecord, metrics: &DispatchMetrics) -> bool {
        if self.discard || self.appenders.is_empty() {
            return true;
        }

        let line = EncodedLine::new(record.level, self.format.format(record, &self.timestamp_format));
        let mut has_error = false;

        for (idx, appender) in self.appenders.iter().enumerate() {
            let mut appender = appender.lock();
            let append_result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                appender.append(&line)
            }));

            match append_result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    eprintln!(
                        "[LOGGER ERROR] Appender #{} ({}) failed: {}",
                        idx,
                        appender.name(),
                        e
                    );
                    has_error = true;
                }
                Err(panic_info) => {
                    eprintln!(
                        "[LOGGER CRITICAL] Appender #{} ({}) panicked: {}. \
                         Other appenders continue to function.",
                        idx,
                        appender.name(),
                        panic_message(panic_info.as_ref())
                    );
                    has_error = true;
                }
            }
        }

        if has_error {
            metrics.record_sink_failure();
        } else {
            metrics.record_delivered();
        }

        !has_error
    }

    /// Flush every appender, continuing past failures. Returns the first error.
    pub fn flush(&self) -> Result<()> {
        let mut first_error = None;

        for (idx, appender) in self.appenders.iter().enumerate() {
            let mut appender = appender.lock();
            let flush_result =
                std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| appender.flush()));

            match flush_result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    eprintln!("[LOGGER ERROR] Appender #{} flush failed: {}", idx, e);
                    first_error.get_or_insert(e);
                }
                Err(panic_info) => {
                    eprintln!(
                        "[LOGGER CRITICAL] Appender #{} panicked during flush: {}",
                        idx,
                        panic_message(panic_info.as_ref())
                    );
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for CompositeSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeSink")
            .field("format", &self.format)
            .field("appenders", &self.appender_names())
            .finish()
    }
}

/// Extract a printable message from a caught panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

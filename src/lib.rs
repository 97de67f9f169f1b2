//! # Rust Log Dispatch
//!
//! Leveled, structured log dispatch with per-module overrides and best-effort
//! fan-out to several sinks.
//!
//! ## Features
//!
//! - **Seven severities**: `Verbose < Debug < Success < Info < Warn < Error < Fatal`
//! - **Module overrides**: suppress or force-allow a module independently of
//!   the global threshold, configured with `module=level` directive lists
//! - **Severe calls always land**: warn, error and fatal bypass filtering
//! - **Composite sinks**: console always, plus an optional remote HTTP
//!   collector and an optional error tracker
//! - **Fire-and-forget remote delivery**: a bounded worker pool posts lines
//!   with a short timeout; failures never reach the caller
//!
//! ## Example
//!
//! ```
//! use rust_log_dispatch::prelude::*;
//!
//! let dispatcher = Dispatcher::builder()
//!     .threshold(LogLevel::Info)
//!     .appender(ConsoleAppender::new())
//!     .build();
//!
//! dispatcher.force_allow_module("net", LogLevel::Debug);
//! dispatcher.debug_with_fields("dialing", LogFields::new().with("func", "net.Dial"));
//! dispatcher.debug("filtered out");
//! dispatcher.warn("always emitted");
//! ```

pub mod appenders;
pub mod config;
pub mod core;
pub mod global;
pub mod macros;

pub mod prelude {
    pub use crate::appenders::{ConsoleAppender, ErrorTrackingAppender, RemoteAppender};
    pub use crate::config::{compose_sinks, DispatchConfig};
    pub use crate::core::{
        Appender, CallSite, CompositeSink, DispatchMetrics, Dispatcher, DispatcherBuilder,
        EncodedLine, FieldValue, FilterDecision, FilterPolicy, LogFields, LogLevel, LogRecord,
        LoggerError, OutputFormat, Result, TimestampFormat,
    };
}

pub use appenders::{ConsoleAppender, ErrorTrackingAppender, RemoteAppender};
pub use config::{compose_sinks, DispatchConfig};
pub use core::{
    Appender, CallSite, CompositeSink, DispatchMetrics, Dispatcher, DispatcherBuilder,
    EncodedLine, FatalHook, FieldValue, FilterDecision, FilterPolicy, LogFields, LogLevel,
    LogRecord, LoggerError, OutputFormat, Result, TimestampFormat,
};

//! Core dispatch types and traits

pub mod appender;
pub mod call_site;
pub mod composite;
pub mod directive;
pub mod dispatcher;
pub mod error;
pub mod filter;
pub mod log_fields;
pub mod log_level;
pub mod log_record;
pub mod metrics;
pub mod output_format;
pub mod timestamp;

pub use appender::{Appender, EncodedLine};
pub use call_site::CallSite;
pub use composite::CompositeSink;
pub use directive::{load_directives, DirectiveKind, DirectiveList, ModuleDirective};
pub use dispatcher::{Dispatcher, DispatcherBuilder, FatalHook};
pub use error::{LoggerError, Result};
pub use filter::{FilterDecision, FilterPolicy};
pub use log_fields::{FieldValue, LogFields};
pub use log_level::{LogLevel, LEVEL_ALIASES};
pub use log_record::{LogRecord, CALL_SITE_KEY};
pub use metrics::DispatchMetrics;
pub use output_format::OutputFormat;
pub use timestamp::TimestampFormat;

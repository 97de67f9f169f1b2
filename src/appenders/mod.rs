//! Appender implementations

pub mod console;
pub mod delivery;
pub mod error_tracking;
pub mod remote;

pub use console::ConsoleAppender;
pub use delivery::{DeliveryOptions, DeliveryPool, DeliveryRequest, DEFAULT_DELIVERY_TIMEOUT};
pub use error_tracking::{parse_dsn, ErrorTracker, ErrorTrackingAppender, SentryTracker};
pub use remote::{
    resolve_collector_endpoint, RemoteAppender, INTERNAL_COLLECTOR_ENDPOINT,
    LOOPBACK_COLLECTOR_ENDPOINT,
};

pub use crate::core::Appender;

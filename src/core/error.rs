//! Error types for the dispatch layer

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// Configuration token that names no severity level
    #[error("Unknown log level: '{token}'")]
    UnknownLevel { token: String },

    /// Module directive that cannot be interpreted
    #[error("Malformed log directive '{directive}': {reason}")]
    MalformedDirective { directive: String, reason: String },

    /// An enabled sink is missing required configuration or cannot be built
    #[error("Cannot initialize {sink} sink: {message}")]
    SinkInitialization { sink: String, message: String },

    /// Transport-level delivery failure
    #[error("Delivery to '{endpoint}' failed: {message}")]
    DeliveryFailed { endpoint: String, message: String },

    /// Collector answered with something other than 200
    #[error("Collector replied {status}: '{body}'")]
    HttpStatus { status: u16, body: String },

    /// Delivery routine panicked
    #[error("Delivery panicked: {0}")]
    DeliveryPanicked(String),

    /// Delivery queue had no room for another line
    #[error("Delivery queue full ({capacity} lines buffered)")]
    QueueFull { capacity: usize },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    pub fn unknown_level(token: impl AsRef<str>) -> Self {
        LoggerError::UnknownLevel {
            token: token.as_ref().trim().to_string(),
        }
    }

    pub fn malformed_directive(directive: impl Into<String>, reason: impl Into<String>) -> Self {
        LoggerError::MalformedDirective {
            directive: directive.into(),
            reason: reason.into(),
        }
    }

    pub fn sink_init(sink: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::SinkInitialization {
            sink: sink.into(),
            message: message.into(),
        }
    }

    pub fn delivery(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::DeliveryFailed {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        LoggerError::HttpStatus {
            status,
            body: body.into(),
        }
    }

    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }

    /// Errors that are reported and skipped instead of aborting startup.
    pub fn is_recoverable_config(&self) -> bool {
        matches!(
            self,
            LoggerError::UnknownLevel { .. } | LoggerError::MalformedDirective { .. }
        )
    }
}

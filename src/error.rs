//! Error types for dhara

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// dhara error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Endpoint string is not of the form `tcp://host:port`
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Operation attempted before bind/connect
    #[error("Socket not bound or connected")]
    NotConnected,

    /// Unsubscribe for a topic that was never subscribed
    #[error("Not subscribed to topic: {0}")]
    NotSubscribed(String),

    /// Send or receive window elapsed
    #[error("Operation timed out")]
    Timeout,

    /// Configuration file could not be parsed
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration could not be serialized
    #[error("Config write error: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

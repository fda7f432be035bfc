use thiserror::Error;

/// Failures that abort a quotation call. Both indicate a defect or a bad
/// configuration, never a carrier-side condition.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Request encoding error: {0}")]
    Encoding(#[from] std::io::Error),
}

/// Network/HTTP failure for a single candidate date.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Gateway returned HTTP {status}")]
    Status { status: u16, body: String },

    #[error("Request timed out")]
    Timeout,

    #[error("Fetch task failed: {0}")]
    Task(String),
}

/// A response body the codec could not read.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResponseError {
    #[error("Malformed response: {0}")]
    Malformed(String),
}

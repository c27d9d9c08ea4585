use thiserror::Error;

/// Result type for receiver operations
pub type Result<T> = std::result::Result<T, AvrError>;

/// Result type for a single JSON-RPC call
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Outcome of a failed JSON-RPC call
///
/// Every device interaction fails with one of these. None of them is fatal:
/// callers log, surface the failure to the host and try again on the next poll.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Timeout, connection failure or non-2xx HTTP status
    #[error("Device unreachable: {0}")]
    Unreachable(String),

    /// The device answered with a JSON-RPC error
    #[error("Device rejected request ({code}): {message}")]
    Rejected {
        /// Error code reported by the device
        code: i64,
        /// Error message reported by the device
        message: String,
    },

    /// The device answered, but not with anything we can decode
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Whether the device could not be reached at all
    pub fn is_unreachable(&self) -> bool {
        matches!(self, ApiError::Unreachable(_))
    }
}

/// Errors that can occur when discovering or setting up receivers
#[derive(Error, Debug)]
pub enum AvrError {
    /// A JSON-RPC call failed
    #[error(transparent)]
    Api(#[from] ApiError),

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// XML parse error in a device descriptor
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Device descriptor is missing required data
    #[error("Invalid device descriptor: {0}")]
    InvalidDescriptor(String),

    /// Configuration supplied by the host is unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Source index outside the source catalog
    #[error("Source index {0} is not in the source catalog")]
    InvalidSource(usize),
}

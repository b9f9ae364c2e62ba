use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Failed to encode DNS query: {0}")]
    Encode(String),

    #[error("Failed to connect to DNS server {server}: {reason}")]
    Connection { server: String, reason: String },

    #[error("Failed to send DNS query to {server}: {reason}")]
    Write { server: String, reason: String },

    #[error("Failed to read DNS response from {server}: {reason}")]
    Read { server: String, reason: String },

    #[error("Truncated response from {server}: expected {expected} bytes, received {received}")]
    TruncatedResponse {
        server: String,
        expected: usize,
        received: usize,
    },

    #[error("Failed to decode DNS response: {0}")]
    Decode(String),

    #[error("Request to {url} failed: {reason}")]
    Network { url: String, reason: String },

    #[error("DoH server {url} returned HTTP {status}: {body}")]
    Server {
        url: String,
        status: u16,
        body: String,
    },

    #[error("Response from {source_name} exceeds {limit} bytes (announced {size})")]
    ResponseTooLarge {
        source_name: String,
        size: usize,
        limit: usize,
    },

    #[error("Timeout after {timeout_ms}ms {operation} {server}")]
    Timeout {
        server: String,
        operation: &'static str,
        timeout_ms: u64,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Lookup cancelled")]
    Cancelled,
}

impl DomainError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, DomainError::Timeout { .. })
    }

    /// Short stable name of the error kind, used in structured log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            DomainError::Encode(_) => "encode",
            DomainError::Connection { .. } => "connection",
            DomainError::Write { .. } => "write",
            DomainError::Read { .. } => "read",
            DomainError::TruncatedResponse { .. } => "truncated_response",
            DomainError::Decode(_) => "decode",
            DomainError::Network { .. } => "network",
            DomainError::Server { .. } => "server",
            DomainError::ResponseTooLarge { .. } => "response_too_large",
            DomainError::Timeout { .. } => "timeout",
            DomainError::Configuration(_) => "configuration",
            DomainError::Cancelled => "cancelled",
        }
    }
}

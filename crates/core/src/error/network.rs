use thiserror::Error;

/// Network and HTTP-related errors
#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("HTTP request failed: {message}")]
    HttpRequest {
        message: String,
        status: Option<u16>,
    },

    #[error("Network error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Connection timeout")]
    Timeout,

    #[error("Connection reset by peer")]
    ConnectionReset,

    #[error("DNS resolution failed for {host}")]
    DnsResolution { host: String },

    #[error("Connection refused to {host}:{port}")]
    ConnectionRefused { host: String, port: u16 },

    #[error("Service unavailable: {service}")]
    ServiceUnavailable { service: String },
}

impl NetworkError {
    pub fn http_request(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::HttpRequest {
            message: message.into(),
            status,
        }
    }

    pub fn dns_resolution(host: impl Into<String>) -> Self {
        Self::DnsResolution { host: host.into() }
    }

    pub fn connection_refused(host: impl Into<String>, port: u16) -> Self {
        Self::ConnectionRefused {
            host: host.into(),
            port,
        }
    }

    pub fn service_unavailable(service: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            service: service.into(),
        }
    }

    /// HTTP status carried by this error, when one exists.
    pub fn status(&self) -> Option<u16> {
        match self {
            NetworkError::HttpRequest { status, .. } => *status,
            NetworkError::Reqwest(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            NetworkError::HttpRequest { status: Some(s), .. } => *s >= 500 || *s == 429,
            NetworkError::Reqwest(e) => {
                e.is_timeout() || e.is_connect() || e.status().map_or(true, |s| s.is_server_error())
            }
            NetworkError::Timeout
            | NetworkError::ConnectionReset
            | NetworkError::ConnectionRefused { .. }
            | NetworkError::DnsResolution { .. }
            | NetworkError::ServiceUnavailable { .. } => true,
            NetworkError::HttpRequest { status: None, .. } => false,
        }
    }

    /// Check if this error is temporary
    pub fn is_temporary(&self) -> bool {
        matches!(
            self,
            NetworkError::Timeout
                | NetworkError::ConnectionReset
                | NetworkError::ConnectionRefused { .. }
                | NetworkError::ServiceUnavailable { .. }
        )
    }
}

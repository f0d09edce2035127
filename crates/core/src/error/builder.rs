use super::{ConfigError, ContentError, Error, NetworkError, QuotaError, StorageError};

/// Builder for creating errors with a fluent API
pub struct ErrorBuilder;

impl ErrorBuilder {
    /// Network errors
    pub fn network() -> NetworkErrorBuilder {
        NetworkErrorBuilder
    }

    /// Quota and rate-limit errors
    pub fn quota() -> QuotaErrorBuilder {
        QuotaErrorBuilder
    }

    /// Content errors
    pub fn content() -> ContentErrorBuilder {
        ContentErrorBuilder
    }

    /// Storage errors
    pub fn storage() -> StorageErrorBuilder {
        StorageErrorBuilder
    }

    /// Configuration errors
    pub fn config() -> ConfigErrorBuilder {
        ConfigErrorBuilder
    }

    /// Internal error
    pub fn internal(message: impl Into<String>) -> Error {
        Error::Internal(message.into())
    }
}

pub struct NetworkErrorBuilder;

impl NetworkErrorBuilder {
    pub fn http_request(self, message: impl Into<String>, status: Option<u16>) -> Error {
        NetworkError::http_request(message, status).into()
    }

    pub fn timeout(self) -> Error {
        NetworkError::Timeout.into()
    }

    pub fn connection_reset(self) -> Error {
        NetworkError::ConnectionReset.into()
    }

    pub fn dns_resolution(self, host: impl Into<String>) -> Error {
        NetworkError::dns_resolution(host).into()
    }

    pub fn connection_refused(self, host: impl Into<String>, port: u16) -> Error {
        NetworkError::connection_refused(host, port).into()
    }

    pub fn service_unavailable(self, service: impl Into<String>) -> Error {
        NetworkError::service_unavailable(service).into()
    }
}

pub struct QuotaErrorBuilder;

impl QuotaErrorBuilder {
    pub fn rate_limited(self, retry_after: Option<u64>) -> Error {
        QuotaError::rate_limited(retry_after).into()
    }

    pub fn quota_exceeded(self, quota: impl Into<String>) -> Error {
        QuotaError::quota_exceeded(quota).into()
    }
}

pub struct ContentErrorBuilder;

impl ContentErrorBuilder {
    pub fn quality_not_available(
        self,
        requested: impl Into<String>,
        available: impl Into<String>,
    ) -> Error {
        ContentError::quality_not_available(requested, available).into()
    }

    pub fn format_unavailable(self, format: impl Into<String>) -> Error {
        ContentError::format_unavailable(format).into()
    }

    pub fn unavailable(self, reason: impl Into<String>) -> Error {
        ContentError::unavailable(reason).into()
    }

    pub fn parse_error(self, reason: impl Into<String>) -> Error {
        ContentError::parse_error(reason).into()
    }
}

pub struct StorageErrorBuilder;

impl StorageErrorBuilder {
    pub fn write_failed(self, path: impl Into<String>, reason: impl Into<String>) -> Error {
        StorageError::write_failed(path, reason).into()
    }

    pub fn disk_full(self, needed: u64, available: u64) -> Error {
        StorageError::disk_full(needed, available).into()
    }

    pub fn permission_denied(self, path: impl Into<String>) -> Error {
        StorageError::permission_denied(path).into()
    }
}

pub struct ConfigErrorBuilder;

impl ConfigErrorBuilder {
    pub fn invalid_field(self, field: impl Into<String>, reason: impl Into<String>) -> Error {
        ConfigError::invalid_field(field, reason).into()
    }

    pub fn out_of_range(
        self,
        field: impl Into<String>,
        value: impl Into<String>,
        expected: impl Into<String>,
    ) -> Error {
        ConfigError::out_of_range(field, value, expected).into()
    }

    pub fn missing_field(self, field: impl Into<String>) -> Error {
        ConfigError::missing_field(field).into()
    }
}

use thiserror::Error;

/// Failures rooted in the content itself rather than the transport.
///
/// These are permanent: no amount of retrying makes a removed video or a
/// never-published quality tier appear.
#[derive(Error, Debug)]
pub enum ContentError {
    #[error("Quality not available: requested {requested}, best available {available}")]
    QualityNotAvailable {
        requested: String,
        available: String,
    },

    #[error("Format not available: {format}")]
    FormatUnavailable { format: String },

    #[error("Content unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("Failed to parse content metadata: {reason}")]
    ParseError { reason: String },
}

impl ContentError {
    pub fn quality_not_available(
        requested: impl Into<String>,
        available: impl Into<String>,
    ) -> Self {
        Self::QualityNotAvailable {
            requested: requested.into(),
            available: available.into(),
        }
    }

    pub fn format_unavailable(format: impl Into<String>) -> Self {
        Self::FormatUnavailable {
            format: format.into(),
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn parse_error(reason: impl Into<String>) -> Self {
        Self::ParseError {
            reason: reason.into(),
        }
    }

    pub fn is_recoverable(&self) -> bool {
        false
    }
}

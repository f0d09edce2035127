use super::ServiceErrorHandler;
use fetchguard_core::error::{ContentError, QuotaError};
use fetchguard_core::{Error, ErrorContext};

/// Handler for the metadata API dependency.
///
/// The metadata service is quota-metered; throttling is expected and never
/// terminal. Malformed responses are, since re-fetching returns the same
/// payload.
pub struct MetadataErrorHandler;

impl ServiceErrorHandler for MetadataErrorHandler {
    fn handle_error(&self, error: &Error, _context: &ErrorContext) -> bool {
        matches!(
            error,
            Error::Content(ContentError::ParseError { .. }) | Error::Config(_)
        )
    }

    fn recovery_suggestions(&self, error: &Error) -> Vec<String> {
        match error {
            Error::Quota(QuotaError::RateLimited { retry_after }) => {
                let mut hints = Vec::new();
                if let Some(secs) = retry_after {
                    hints.push(format!("Honor the server's Retry-After of {secs}s"));
                }
                hints.push("Reduce metadata request concurrency".to_string());
                hints
            }
            Error::Quota(QuotaError::QuotaExceeded { quota }) => vec![
                format!("Wait for the {quota} quota window to reset"),
                "Rotate to a secondary API credential".to_string(),
            ],
            Error::Content(ContentError::ParseError { .. }) => vec![
                "Check for a metadata API schema change".to_string(),
            ],
            _ => Vec::new(),
        }
    }

    fn domain(&self) -> &'static str {
        "metadata"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fetchguard_core::error::NetworkError;

    fn ctx() -> ErrorContext {
        ErrorContext::new("probe", "metadata")
    }

    #[test]
    fn quota_pressure_is_never_terminal() {
        let handler = MetadataErrorHandler;
        assert!(!handler.handle_error(&QuotaError::rate_limited(Some(30)).into(), &ctx()));
        assert!(!handler.handle_error(&QuotaError::quota_exceeded("daily").into(), &ctx()));
        assert!(!handler.handle_error(&NetworkError::Timeout.into(), &ctx()));
    }

    #[test]
    fn parse_errors_are_terminal() {
        let handler = MetadataErrorHandler;
        let err: Error = ContentError::parse_error("unexpected field").into();
        assert!(handler.handle_error(&err, &ctx()));
    }

    #[test]
    fn rate_limit_suggestions_honor_retry_after() {
        let handler = MetadataErrorHandler;
        let hints =
            handler.recovery_suggestions(&QuotaError::rate_limited(Some(42)).into());
        assert!(hints[0].contains("42"));
    }
}

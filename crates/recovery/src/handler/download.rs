use super::ServiceErrorHandler;
use fetchguard_core::error::{ContentError, NetworkError};
use fetchguard_core::{Error, ErrorContext};
use tracing::debug;

/// Handler for the media download dependency.
///
/// Content failures (missing quality tiers, removed items) are terminal:
/// the bytes will not appear however often we ask. Transport failures defer
/// to the strategy.
pub struct DownloadErrorHandler;

impl ServiceErrorHandler for DownloadErrorHandler {
    fn handle_error(&self, error: &Error, context: &ErrorContext) -> bool {
        let terminal = match error {
            Error::Content(_) => true,
            Error::Config(_) => true,
            Error::Network(e) => match e.status() {
                // Client errors won't heal on retry, except throttling and
                // request timeout.
                Some(status) => (400..500).contains(&status) && status != 429 && status != 408,
                None => false,
            },
            _ => false,
        };
        if terminal {
            debug!(
                operation = context.operation_name(),
                error = %error,
                "download failure is terminal"
            );
        }
        terminal
    }

    fn recovery_suggestions(&self, error: &Error) -> Vec<String> {
        match error {
            Error::Content(ContentError::QualityNotAvailable { available, .. }) => vec![
                format!("Request an available quality instead (best: {available})"),
                "Drop the quality constraint and take the best available".to_string(),
            ],
            Error::Content(ContentError::FormatUnavailable { .. }) => vec![
                "Request a different container format".to_string(),
            ],
            Error::Content(_) => vec![
                "Verify the item still exists at the source".to_string(),
                "Check region and account restrictions".to_string(),
            ],
            Error::Network(NetworkError::Timeout) => vec![
                "Increase the per-request timeout".to_string(),
                "Check connectivity to the content host".to_string(),
            ],
            Error::Network(_) => vec![
                "Check connectivity to the content host".to_string(),
            ],
            _ => Vec::new(),
        }
    }

    fn domain(&self) -> &'static str {
        "download"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fetchguard_core::error::QuotaError;

    fn ctx() -> ErrorContext {
        ErrorContext::new("fetch_video", "download")
    }

    #[test]
    fn content_errors_are_terminal() {
        let handler = DownloadErrorHandler;
        let err: Error = ContentError::quality_not_available("1080p", "720p").into();
        assert!(handler.handle_error(&err, &ctx()));
    }

    #[test]
    fn transport_errors_defer_to_the_strategy() {
        let handler = DownloadErrorHandler;
        assert!(!handler.handle_error(&NetworkError::Timeout.into(), &ctx()));
        assert!(!handler.handle_error(&NetworkError::ConnectionReset.into(), &ctx()));
        assert!(!handler.handle_error(&QuotaError::rate_limited(None).into(), &ctx()));
    }

    #[test]
    fn http_404_is_terminal_but_429_is_not() {
        let handler = DownloadErrorHandler;
        let not_found: Error = NetworkError::http_request("not found", Some(404)).into();
        assert!(handler.handle_error(&not_found, &ctx()));
        let throttled: Error = NetworkError::http_request("slow down", Some(429)).into();
        assert!(!handler.handle_error(&throttled, &ctx()));
        let server: Error = NetworkError::http_request("boom", Some(500)).into();
        assert!(!handler.handle_error(&server, &ctx()));
    }

    #[test]
    fn quality_suggestions_lead_with_the_available_tier() {
        let handler = DownloadErrorHandler;
        let err: Error = ContentError::quality_not_available("4k", "1080p").into();
        let hints = handler.recovery_suggestions(&err);
        assert!(!hints.is_empty());
        assert!(hints[0].contains("1080p"));
    }
}

use super::ServiceErrorHandler;
use fetchguard_core::error::StorageError;
use fetchguard_core::{Error, ErrorContext};

/// Handler for the local storage dependency.
///
/// Full disks and permission problems need operator action; retrying only
/// burns attempts that a later re-enqueue would want.
pub struct StorageErrorHandler;

impl ServiceErrorHandler for StorageErrorHandler {
    fn handle_error(&self, error: &Error, _context: &ErrorContext) -> bool {
        matches!(
            error,
            Error::Storage(StorageError::DiskFull { .. })
                | Error::Storage(StorageError::PermissionDenied { .. })
        )
    }

    fn recovery_suggestions(&self, error: &Error) -> Vec<String> {
        match error {
            Error::Storage(StorageError::DiskFull { needed, available }) => vec![
                format!(
                    "Free at least {} bytes (have {available})",
                    needed.saturating_sub(*available)
                ),
                "Move the target directory to a larger volume".to_string(),
            ],
            Error::Storage(StorageError::PermissionDenied { path }) => vec![
                format!("Fix permissions on {path}"),
            ],
            Error::Storage(StorageError::WriteFailed { .. }) => vec![
                "Retry after checking the target filesystem".to_string(),
            ],
            _ => Vec::new(),
        }
    }

    fn domain(&self) -> &'static str {
        "storage"
    }
}

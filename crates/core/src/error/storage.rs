use thiserror::Error;

/// Local storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Write failed: {path} - {reason}")]
    WriteFailed { path: String, reason: String },

    #[error("Disk full: need {needed} bytes, {available} available")]
    DiskFull { needed: u64, available: u64 },

    #[error("Permission denied: {path}")]
    PermissionDenied { path: String },
}

impl StorageError {
    pub fn write_failed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::WriteFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn disk_full(needed: u64, available: u64) -> Self {
        Self::DiskFull { needed, available }
    }

    pub fn permission_denied(path: impl Into<String>) -> Self {
        Self::PermissionDenied { path: path.into() }
    }

    /// Check if this error is recoverable
    ///
    /// A failed write may succeed on a clean retry; full disks and missing
    /// permissions need operator action first.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, StorageError::WriteFailed { .. })
    }
}

use std::collections::HashMap;
use std::fmt;

/// Identity and metadata of one logical operation passed through the
/// recovery engine.
///
/// Built by the caller, one per `execute_with_retry` call, and read-only to
/// the manager, strategies, handlers and reporters afterwards.
#[derive(Debug, Clone)]
pub struct ErrorContext {
    operation_name: String,
    service_name: String,
    metadata: HashMap<String, String>,
}

impl ErrorContext {
    /// Create a context for an operation against a named service.
    ///
    /// The service name selects the registered `ServiceErrorHandler`; the
    /// operation name identifies the call in reports and the in-flight
    /// registry.
    pub fn new(operation_name: impl Into<String>, service_name: impl Into<String>) -> Self {
        Self {
            operation_name: operation_name.into(),
            service_name: service_name.into(),
            metadata: HashMap::new(),
        }
    }

    /// Attach a metadata entry (chainable).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn operation_name(&self) -> &str {
        &self.operation_name
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn metadata(&self) -> &HashMap<String, String> {
        &self.metadata
    }

    /// Look up a single metadata entry.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    /// Key identifying this call in the in-flight registry.
    ///
    /// Includes the `item_id` metadata entry when present, so two concurrent
    /// calls for distinct items of the same operation do not collide.
    pub fn operation_key(&self) -> String {
        match self.get("item_id") {
            Some(id) => format!("{}/{}#{}", self.service_name, self.operation_name, id),
            None => format!("{}/{}", self.service_name, self.operation_name),
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.operation_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_key_without_item_id() {
        let ctx = ErrorContext::new("fetch_video", "download");
        assert_eq!(ctx.operation_key(), "download/fetch_video");
    }

    #[test]
    fn operation_key_includes_item_id() {
        let ctx = ErrorContext::new("fetch_video", "download").with("item_id", "abc123");
        assert_eq!(ctx.operation_key(), "download/fetch_video#abc123");
    }

    #[test]
    fn metadata_lookup() {
        let ctx = ErrorContext::new("probe", "metadata")
            .with("url", "https://example.com/v/1")
            .with("quality", "1080p");
        assert_eq!(ctx.get("quality"), Some("1080p"));
        assert_eq!(ctx.get("missing"), None);
        assert_eq!(ctx.metadata().len(), 2);
    }
}

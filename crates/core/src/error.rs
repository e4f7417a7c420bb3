use thiserror::Error;

/// Errors surfaced by resource listers and by operations on a single resource.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// The remote service rejected the call. The message is passed through
    /// verbatim so operators can see exactly what the provider reported.
    #[error("{operation} failed: {message}")]
    Remote {
        /// Remote operation that failed (e.g. `DeleteRule`).
        operation: String,
        /// Provider-originated error message.
        message: String,
    },

    /// A network or transport-level error occurred.
    #[error("connection error: {0}")]
    Connection(String),

    /// The remote call did not complete in time.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// The caller cancelled the in-flight call.
    #[error("operation cancelled")]
    Cancelled,

    /// The lister or client was given invalid configuration.
    #[error("invalid configuration: {0}")]
    Configuration(String),
}

impl ResourceError {
    /// Build a [`ResourceError::Remote`] for the given operation.
    pub fn remote(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Remote {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Returns `true` if the call never got an answer from the service and
    /// may succeed if the caller tries again. Service-reported errors are
    /// never retryable here, whatever their message says.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Timeout(_))
    }
}

/// Errors raised while building or querying the resource-kind registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// A lister was already registered under this kind name.
    #[error("resource kind already registered: {0}")]
    DuplicateKind(String),

    /// No lister is registered under this kind name.
    #[error("unknown resource kind: {0}")]
    UnknownKind(String),

    /// The process-wide registry has already been installed.
    #[error("resource kind registry already installed")]
    AlreadyInstalled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_errors() {
        assert!(ResourceError::Connection("reset".into()).is_retryable());
        assert!(ResourceError::Timeout("30s".into()).is_retryable());
    }

    #[test]
    fn non_retryable_errors() {
        assert!(!ResourceError::remote("DeleteRule", "RuleNotFound").is_retryable());
        let throttled = ResourceError::remote("DescribeRules", "Throttling: Rate exceeded");
        assert!(!throttled.is_retryable());
        assert!(!ResourceError::Cancelled.is_retryable());
        assert!(!ResourceError::Configuration("x".into()).is_retryable());
    }

    #[test]
    fn error_display() {
        let err = ResourceError::remote("DeleteRule", "RuleNotFound: One or more rules not found");
        assert_eq!(
            err.to_string(),
            "DeleteRule failed: RuleNotFound: One or more rules not found"
        );
        assert_eq!(ResourceError::Cancelled.to_string(), "operation cancelled");

        let err = RegistryError::DuplicateKind("ELBv2ListenerRule".into());
        assert_eq!(
            err.to_string(),
            "resource kind already registered: ELBv2ListenerRule"
        );
    }
}

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a collection fetch failed.
///
/// Carried by the failure phase so views can render a message and decide
/// whether a retry control makes sense.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "message")]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("invalid request: {0}")]
    InvalidArgument(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl FetchError {
    /// Transport-level failures are worth retrying; auth and argument
    /// failures are not.
    pub fn retryable(&self) -> bool {
        matches!(self, FetchError::Network(_) | FetchError::Timeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        assert!(FetchError::Network("connection reset".into()).retryable());
        assert!(FetchError::Timeout("deadline exceeded".into()).retryable());

        assert!(!FetchError::Unauthorized("token expired".into()).retryable());
        assert!(!FetchError::PermissionDenied("viewer role".into()).retryable());
        assert!(!FetchError::InvalidArgument("bad cursor".into()).retryable());
        assert!(!FetchError::Internal("boom".into()).retryable());
    }

    #[test]
    fn serde_carries_kind_and_message() {
        let err = FetchError::PermissionDenied("viewer role".into());
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, r#"{"kind":"permissionDenied","message":"viewer role"}"#);

        let back: FetchError = serde_json::from_str(&json).unwrap();
        assert_eq!(back, err);
    }

    #[test]
    fn display_is_lowercase_prefixed() {
        let err = FetchError::Network("connection reset".into());
        assert_eq!(err.to_string(), "network error: connection reset");
    }
}

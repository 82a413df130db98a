//! Domain Layer - Errors
//!
//! Error taxonomy for the live-view layer. Remote failures arrive as
//! [`RemoteError`] and are turned into [`LiveViewError`] with the operation
//! and document path attached.

use serde::{Deserialize, Serialize};

/// Common result type for live-view operations
pub type LiveResult<T> = Result<T, LiveViewError>;

/// Remote operation a failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Update,
    Delete,
    List,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::List => "list",
        }
    }
}

/// Live-view errors surfaced to the UI layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LiveViewError {
    /// The remote store's access rules rejected the request
    PermissionDenied { operation: Operation, path: String },
    /// Any other remote failure (network, backend, missing document)
    Remote {
        operation: Operation,
        path: String,
        message: String,
    },
    /// The live query failed; last delivered records stay visible
    Subscription(String),
    /// Local input rejected before a write was issued
    Validation(String),
    /// The local edit guard refused the action
    NotPermitted(String),
    /// A remote document could not be decoded into a record
    Decode { path: String, message: String },
    /// Invalid console configuration
    Config(String),
}

impl std::fmt::Display for LiveViewError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LiveViewError::PermissionDenied { operation, path } => {
                write!(f, "Permission denied: {} {}", operation.as_str(), path)
            }
            LiveViewError::Remote {
                operation,
                path,
                message,
            } => write!(f, "Remote {} {} failed: {}", operation.as_str(), path, message),
            LiveViewError::Subscription(msg) => write!(f, "Live query failed: {}", msg),
            LiveViewError::Validation(msg) => write!(f, "Invalid input: {}", msg),
            LiveViewError::NotPermitted(msg) => write!(f, "Not permitted: {}", msg),
            LiveViewError::Decode { path, message } => {
                write!(f, "Cannot decode {}: {}", path, message)
            }
            LiveViewError::Config(msg) => write!(f, "Invalid config: {}", msg),
        }
    }
}

impl std::error::Error for LiveViewError {}

/// Error code reported by the remote store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemoteErrorCode {
    PermissionDenied,
    Unavailable,
    NotFound,
    Unknown,
}

impl RemoteErrorCode {
    /// Parse the store's wire code (`permission-denied`, `unavailable`, ...)
    pub fn from_code(code: &str) -> Self {
        match code {
            "permission-denied" => RemoteErrorCode::PermissionDenied,
            "unavailable" => RemoteErrorCode::Unavailable,
            "not-found" => RemoteErrorCode::NotFound,
            _ => RemoteErrorCode::Unknown,
        }
    }
}

/// Transport-level failure reported by a remote collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteError {
    pub code: RemoteErrorCode,
    pub message: String,
}

impl RemoteError {
    pub fn new(code: RemoteErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(RemoteErrorCode::PermissionDenied, message)
    }

    /// Attach the operation and document path
    pub fn into_live(self, operation: Operation, path: impl Into<String>) -> LiveViewError {
        let path = path.into();
        match self.code {
            RemoteErrorCode::PermissionDenied => LiveViewError::PermissionDenied { operation, path },
            _ => LiveViewError::Remote {
                operation,
                path,
                message: self.message,
            },
        }
    }
}

impl std::fmt::Display for RemoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for RemoteError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_code_maps_to_permission_denied() {
        let err = RemoteError::new(RemoteErrorCode::from_code("permission-denied"), "rules")
            .into_live(Operation::Update, "tasks/t1");
        assert_eq!(
            err,
            LiveViewError::PermissionDenied {
                operation: Operation::Update,
                path: "tasks/t1".to_string(),
            }
        );
        assert_eq!(err.to_string(), "Permission denied: update tasks/t1");
    }

    #[test]
    fn test_other_codes_keep_message() {
        let err = RemoteError::new(RemoteErrorCode::from_code("unavailable"), "offline")
            .into_live(Operation::Create, "tasks");
        match err {
            LiveViewError::Remote { message, .. } => assert_eq!(message, "offline"),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(RemoteErrorCode::from_code("weird"), RemoteErrorCode::Unknown);
    }
}

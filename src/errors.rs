//! Typed error hierarchy for the MarketLens client.
//!
//! One enum per subsystem:
//! - `TransportError`: any remote call, normalized to one of four kinds
//! - `SessionError`: session store writes
//! - `AuthError`: login and registration
//! - `RemoveError`: research deletion and the reload that follows it
//! - `GenerationError`: advertorial generation submits
//! - `DeleteDialogError`: illegal delete-confirmation transitions

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classification of a failed remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportErrorKind {
    /// No response: connectivity, timeout, undecodable body
    Network,
    /// Bad or expired credential
    Unauthorized,
    /// Input rejected by the server (or locally, before sending)
    Validation,
    /// 5xx or an application-level failure flag
    Server,
}

impl TransportErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Unauthorized => "unauthorized",
            Self::Validation => "validation",
            Self::Server => "server",
        }
    }
}

impl std::fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized failure for any remote operation.
///
/// Cloneable so it can be stored inside view snapshots (list error banners,
/// failed advertorial slots).
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind} error: {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Network, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Unauthorized, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Validation, message)
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Server, message)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind == TransportErrorKind::Unauthorized
    }

    /// Only connectivity failures are worth retrying, and only for idempotent calls.
    pub fn is_retryable(&self) -> bool {
        self.kind == TransportErrorKind::Network
    }
}

/// Errors from the session store.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Refusing to store an empty auth token")]
    EmptyToken,

    #[error("Session storage failed for key '{key}': {source}")]
    Storage {
        key: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Errors from login / registration.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl AuthError {
    pub fn transport(&self) -> Option<&TransportError> {
        match self {
            Self::Transport(e) => Some(e),
            Self::Session(_) => None,
        }
    }
}

/// Outcome of a failed research removal.
///
/// `Reload` means the record is gone on the server and only the list
/// refresh afterwards failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoveError {
    #[error("Delete failed: {0}")]
    Delete(TransportError),

    #[error("Deleted, but the list could not be reloaded: {0}")]
    Reload(TransportError),
}

impl RemoveError {
    pub fn transport(&self) -> &TransportError {
        match self {
            Self::Delete(e) | Self::Reload(e) => e,
        }
    }

    pub fn into_transport(self) -> TransportError {
        match self {
            Self::Delete(e) | Self::Reload(e) => e,
        }
    }

    /// The server no longer has the record.
    pub fn deleted(&self) -> bool {
        matches!(self, Self::Reload(_))
    }
}

/// Errors from submitting an advertorial generation request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("A generation cycle is already in flight ({phase})")]
    CycleInFlight { phase: String },

    #[error("Invalid generation request: {0}")]
    InvalidRequest(String),
}

/// Illegal transitions of the delete-confirmation dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeleteDialogError {
    #[error("A delete confirmation is already open")]
    AlreadyOpen,

    #[error("No delete confirmation is open")]
    NotOpen,

    #[error("Delete is already being confirmed")]
    AlreadyConfirming,

    #[error("No delete is being confirmed")]
    NotConfirming,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_error_display_carries_kind_and_message() {
        let err = TransportError::server("boom");
        assert_eq!(err.to_string(), "server error: boom");
        assert_eq!(err.kind, TransportErrorKind::Server);
    }

    #[test]
    fn only_network_errors_are_retryable() {
        assert!(TransportError::network("down").is_retryable());
        assert!(!TransportError::server("500").is_retryable());
        assert!(!TransportError::validation("bad").is_retryable());
        assert!(!TransportError::unauthorized("expired").is_retryable());
    }

    #[test]
    fn transport_error_kind_serializes_snake_case() {
        let json = serde_json::to_string(&TransportErrorKind::Unauthorized).unwrap();
        assert_eq!(json, "\"unauthorized\"");
    }

    #[test]
    fn session_error_storage_carries_key() {
        let err = SessionError::Storage {
            key: "auth_token".to_string(),
            source: anyhow::anyhow!("disk full"),
        };
        match &err {
            SessionError::Storage { key, .. } => assert_eq!(key, "auth_token"),
            _ => panic!("Expected Storage variant"),
        }
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn generation_error_cycle_in_flight_names_phase() {
        let err = GenerationError::CycleInFlight {
            phase: "generating".to_string(),
        };
        assert!(err.to_string().contains("generating"));
    }

    #[test]
    fn all_error_types_implement_std_error_trait() {
        fn assert_std_error<E: std::error::Error>(_: &E) {}
        assert_std_error(&TransportError::network("x"));
        assert_std_error(&SessionError::EmptyToken);
        assert_std_error(&GenerationError::InvalidRequest("x".into()));
        assert_std_error(&DeleteDialogError::NotOpen);
        assert_std_error(&RemoveError::Reload(TransportError::network("x")));
    }

    #[test]
    fn remove_error_tells_whether_the_record_is_gone() {
        let reload = RemoveError::Reload(TransportError::network("offline"));
        assert!(reload.deleted());
        assert_eq!(reload.transport().message, "offline");
        assert!(!RemoveError::Delete(TransportError::server("500")).deleted());
    }
}

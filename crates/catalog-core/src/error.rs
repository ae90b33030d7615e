// ── Core error types ──
//
// User-facing errors from catalog-core. Consumers never see HTTP status
// codes or JSON parse failures directly; `From<catalog_api::Error>`
// translates transport-layer errors into the taxonomy below.

use serde::Serialize;
use strum::{Display, IntoStaticStr};
use thiserror::Error;

use catalog_api::ErrorClass;

/// The failure taxonomy every public operation reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Missing or malformed local input; never reaches the network.
    Validation,
    /// Stale local reference to an entity the server no longer has.
    NotFound,
    /// Referential-integrity block.
    Conflict,
    /// Expired or missing credential.
    Unauthorized,
    /// Transport failure.
    Network,
    /// Unexpected server failure or rejected payload.
    Server,
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Local errors ─────────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    // ── Referential blocks ───────────────────────────────────────────
    #[error("{}", blocked_message(entity_type, name, *linked_games))]
    DeleteBlocked {
        entity_type: &'static str,
        name: String,
        linked_games: Option<u32>,
    },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    // ── Session ──────────────────────────────────────────────────────
    #[error("Not signed in: {message}")]
    Unauthorized { message: String },

    // ── Remote failures ──────────────────────────────────────────────
    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Server error: {message}")]
    Server { message: String },

    #[error("Request rejected: {message}")]
    Rejected { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

fn blocked_message(entity_type: &str, name: &str, linked_games: Option<u32>) -> String {
    match linked_games {
        Some(1) => format!("Cannot delete {entity_type} \"{name}\": it is linked to 1 game"),
        Some(n) => format!("Cannot delete {entity_type} \"{name}\": it is linked to {n} games"),
        None => format!("Cannot delete {entity_type} \"{name}\": it is still in use"),
    }
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::DeleteBlocked { .. } | Self::Conflict { .. } => ErrorKind::Conflict,
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::Network { .. } => ErrorKind::Network,
            Self::Server { .. } | Self::Rejected { .. } | Self::Internal(_) => ErrorKind::Server,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind() == ErrorKind::Unauthorized
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<catalog_api::Error> for CoreError {
    fn from(err: catalog_api::Error) -> Self {
        let class = err.class();
        match err {
            catalog_api::Error::Unauthorized { message } => Self::Unauthorized { message },
            catalog_api::Error::Conflict { message, .. } => Self::Conflict { message },
            catalog_api::Error::NotFound { message } => Self::NotFound {
                entity_type: "resource",
                identifier: message,
            },
            catalog_api::Error::Rejected { message, .. } => Self::Rejected { message },
            catalog_api::Error::Server { message, .. } => Self::Server { message },
            catalog_api::Error::Deserialization { message, body: _ } => {
                Self::Internal(format!("Deserialization error: {message}"))
            }
            other => match class {
                ErrorClass::ServerError => Self::Server {
                    message: other.to_string(),
                },
                _ => Self::Network {
                    message: other.to_string(),
                },
            },
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("payload conversion failed: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocked_message_names_entity_and_count() {
        let err = CoreError::DeleteBlocked {
            entity_type: "category",
            name: "Slots".into(),
            linked_games: Some(3),
        };
        let msg = err.to_string();
        assert!(msg.contains("Slots"));
        assert!(msg.contains('3'));
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn blocked_message_without_count() {
        let err = CoreError::DeleteBlocked {
            entity_type: "provider",
            name: "NetEnt".into(),
            linked_games: None,
        };
        assert_eq!(
            err.to_string(),
            "Cannot delete provider \"NetEnt\": it is still in use"
        );
    }

    #[test]
    fn api_errors_translate_to_taxonomy() {
        let cases = [
            (catalog_api::Error::from_status(401, ""), ErrorKind::Unauthorized),
            (catalog_api::Error::from_status(404, ""), ErrorKind::NotFound),
            (catalog_api::Error::from_status(409, ""), ErrorKind::Conflict),
            (catalog_api::Error::from_status(422, ""), ErrorKind::Server),
            (catalog_api::Error::from_status(500, ""), ErrorKind::Server),
            (catalog_api::Error::Tls("bad".into()), ErrorKind::Network),
        ];
        for (api, expected) in cases {
            assert_eq!(CoreError::from(api).kind(), expected);
        }
    }
}

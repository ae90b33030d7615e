use strum::{Display, IntoStaticStr};
use thiserror::Error;

/// Coarse, HTTP-status-derived failure class.
///
/// Every failed call maps onto exactly one class so that consumers can
/// branch on the kind of failure without looking at status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorClass {
    Unauthorized,
    Conflict,
    NotFound,
    BadRequest,
    ServerError,
    NetworkError,
}

/// Top-level error type for the `catalog-api` crate.
///
/// Covers transport failures, non-2xx responses, and payload decoding.
/// `catalog-core` maps these into its own user-facing taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Missing, expired, or rejected bearer credential (HTTP 401/403).
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    // ── Resource state ──────────────────────────────────────────────
    /// Referential-integrity refusal (HTTP 409).
    ///
    /// `linked_games` carries the number of blocking references when
    /// the server reports it.
    #[error("Conflict: {message}")]
    Conflict {
        message: String,
        linked_games: Option<u32>,
    },

    /// The addressed resource does not exist (HTTP 404).
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// Any other 4xx: the server refused the payload.
    #[error("Request rejected (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    /// Unexpected 5xx.
    #[error("Server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS or client construction error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Classify this error into its [`ErrorClass`].
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Unauthorized { .. } => ErrorClass::Unauthorized,
            Self::Conflict { .. } => ErrorClass::Conflict,
            Self::NotFound { .. } => ErrorClass::NotFound,
            Self::Rejected { .. } => ErrorClass::BadRequest,
            Self::Server { .. } | Self::Deserialization { .. } => ErrorClass::ServerError,
            Self::Transport(e) => match e.status() {
                Some(s) if s.is_server_error() => ErrorClass::ServerError,
                _ => ErrorClass::NetworkError,
            },
            Self::InvalidUrl(_) | Self::Tls(_) => ErrorClass::NetworkError,
        }
    }

    /// Returns `true` if the credential is missing or no longer accepted.
    pub fn is_unauthorized(&self) -> bool {
        self.class() == ErrorClass::Unauthorized
    }

    /// Returns `true` if this is a referential-integrity conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Server { status, .. } => matches!(status, 502..=504),
            _ => false,
        }
    }

    /// Build an error from a non-2xx status and the response body.
    ///
    /// The body is inspected for a `message` field and, on conflicts,
    /// a `linkedGames` count.
    pub fn from_status(status: u16, body: &str) -> Self {
        let parsed: Option<ErrorBody> = serde_json::from_str(body).ok();
        let message = parsed
            .as_ref()
            .and_then(|b| b.message.clone().or_else(|| b.error.clone()))
            .unwrap_or_else(|| {
                if body.is_empty() {
                    format!("HTTP {status}")
                } else {
                    body.chars().take(200).collect()
                }
            });

        match status {
            401 | 403 => Self::Unauthorized { message },
            404 => Self::NotFound { message },
            409 => Self::Conflict {
                message,
                linked_games: parsed.and_then(|b| b.linked_games),
            },
            400..=499 => Self::Rejected { status, message },
            _ => Self::Server { status, message },
        }
    }
}

/// Error payload shape returned by the catalog API.
#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    linked_games: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_map_to_classes() {
        assert_eq!(Error::from_status(401, "").class(), ErrorClass::Unauthorized);
        assert_eq!(Error::from_status(403, "").class(), ErrorClass::Unauthorized);
        assert_eq!(Error::from_status(404, "").class(), ErrorClass::NotFound);
        assert_eq!(Error::from_status(409, "").class(), ErrorClass::Conflict);
        assert_eq!(Error::from_status(422, "").class(), ErrorClass::BadRequest);
        assert_eq!(Error::from_status(503, "").class(), ErrorClass::ServerError);
    }

    #[test]
    fn conflict_body_carries_linked_count() {
        let err = Error::from_status(
            409,
            r#"{"message":"Category is in use","linkedGames":3}"#,
        );
        match err {
            Error::Conflict {
                message,
                linked_games,
            } => {
                assert_eq!(message, "Category is in use");
                assert_eq!(linked_games, Some(3));
            }
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn plain_text_body_becomes_message() {
        let err = Error::from_status(500, "boom");
        assert_eq!(err.to_string(), "Server error (HTTP 500): boom");
    }

    #[test]
    fn empty_body_falls_back_to_status() {
        let err = Error::from_status(404, "");
        assert_eq!(err.to_string(), "Not found: HTTP 404");
    }
}

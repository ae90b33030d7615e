// ── Uniform operation result ──
//
// The `{success, data?, error?}` shape handed to presentation code so it
// never has to inspect error internals.

use serde::Serialize;

use crate::error::{CoreError, ErrorKind};

/// Serializable description of a failed operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorDescriptor {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&CoreError> for ErrorDescriptor {
    fn from(err: &CoreError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Outcome of a public store operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionResult<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDescriptor>,
}

impl<T> ActionResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failed(err: &CoreError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ErrorDescriptor::from(err)),
        }
    }

    /// The user-facing error message, if the operation failed.
    pub fn message(&self) -> Option<&str> {
        self.error.as_ref().map(|e| e.message.as_str())
    }
}

impl<T> From<Result<T, CoreError>> for ActionResult<T> {
    fn from(result: Result<T, CoreError>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(err) => Self::failed(&err),
        }
    }
}

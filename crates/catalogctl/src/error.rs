//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use catalog_config::ConfigError;
use catalog_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the catalog API")]
    #[diagnostic(
        code(catalogctl::connection_failed),
        help(
            "Check that the API is running and reachable.\n\
             Reason: {reason}\n\
             Use --insecure (-k) for self-signed development servers."
        )
    )]
    ConnectionFailed { reason: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Not signed in")]
    #[diagnostic(
        code(catalogctl::not_signed_in),
        help(
            "Run: catalogctl auth login --profile {profile}\n\
             Or set CATALOG_PASSWORD to sign in automatically."
        )
    )]
    NotSignedIn { profile: String },

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(catalogctl::auth_failed),
        help("Verify your username and password, then run: catalogctl auth login")
    )]
    AuthFailed { message: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(catalogctl::no_credentials),
        help(
            "Configure credentials with: catalogctl config init\n\
             Or set CATALOG_USERNAME and CATALOG_PASSWORD."
        )
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(catalogctl::not_found),
        help("Run: catalogctl {list_command} to see available entries")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("{message}")]
    #[diagnostic(
        code(catalogctl::conflict),
        help("Reassign or remove the linked games first.")
    )]
    Conflict { message: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error: {message}")]
    #[diagnostic(code(catalogctl::api_error))]
    ApiError { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(catalogctl::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(catalogctl::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: catalogctl config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No API URL configured")]
    #[diagnostic(
        code(catalogctl::no_config),
        help(
            "Create a profile with: catalogctl config init\n\
             Or pass --api-url. Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(catalogctl::config))]
    Config(ConfigError),

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(catalogctl::json), help("Check the JSON file contents and try again."))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::NotSignedIn { .. } | Self::AuthFailed { .. } | Self::NoCredentials { .. } => {
                exit_code::AUTH
            }
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Conflict { .. } => exit_code::CONFLICT,
            Self::Validation { .. } | Self::ProfileNotFound { .. } | Self::NoConfig { .. } => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::NotFound {
                entity_type,
                identifier,
            } => CliError::NotFound {
                list_command: list_command(entity_type),
                resource_type: entity_type.into(),
                identifier,
            },

            blocked @ CoreError::DeleteBlocked { .. } => CliError::Conflict {
                message: blocked.to_string(),
            },

            CoreError::Conflict { message } => CliError::Conflict { message },

            CoreError::Unauthorized { message } => CliError::AuthFailed { message },

            CoreError::Network { message } => CliError::ConnectionFailed { reason: message },

            CoreError::Server { message }
            | CoreError::Rejected { message }
            | CoreError::Internal(message) => CliError::ApiError { message },
        }
    }
}

fn list_command(entity_type: &str) -> String {
    match entity_type {
        "category" => "categories list".into(),
        "provider" => "providers list".into(),
        "tag" => "tags list".into(),
        "manager game" => "manager list".into(),
        _ => "games list".into(),
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::UnknownProfile { profile } => CliError::ProfileNotFound {
                name: profile,
                available: available_profiles(),
            },
            other => CliError::Config(other),
        }
    }
}

fn available_profiles() -> String {
    let cfg = catalog_config::load_config_or_default();
    let mut names: Vec<_> = cfg.profiles.keys().cloned().collect();
    if names.is_empty() {
        return "(none)".into();
    }
    names.sort();
    names.join(", ")
}

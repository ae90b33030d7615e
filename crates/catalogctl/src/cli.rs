//! Clap derive structures for the `catalogctl` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// catalogctl -- administer the game catalog from the command line
#[derive(Debug, Parser)]
#[command(
    name = "catalogctl",
    version,
    about = "Administer the game catalog from the command line",
    long_about = "Manage catalog categories, providers, tags, store games and the\n\
        curated manager list against the catalog admin API.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config profile to use
    #[arg(long, short = 'p', env = "CATALOG_PROFILE", global = true)]
    pub profile: Option<String>,

    /// API base URL (overrides profile)
    #[arg(long, short = 'u', env = "CATALOG_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "CATALOG_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "CATALOG_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "CATALOG_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in, sign out, and inspect the session
    Auth(AuthArgs),

    /// Manage game categories
    #[command(alias = "cat")]
    Categories(EntityArgs),

    /// Manage game providers
    #[command(alias = "prov")]
    Providers(EntityArgs),

    /// Manage tags
    Tags(EntityArgs),

    /// Browse the full game store
    #[command(alias = "g")]
    Games(GamesArgs),

    /// Manage the curated manager list
    #[command(alias = "m")]
    Manager(ManagerArgs),

    /// Show the category and provider dropdown lookups
    Lookups,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Auth ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommand,
}

#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    /// Sign in and keep the session token in the system keyring
    Login {
        /// Username (defaults to the profile's username)
        #[arg(long)]
        username: Option<String>,
    },

    /// End the session and clear stored credentials
    Logout,

    /// Show whether a session is active
    Status,
}

// ── Shared page arguments ────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PageArgs {
    /// Page number (1-based)
    #[arg(long, default_value = "1")]
    pub page: u32,

    /// Free-text search
    #[arg(long, short = 's')]
    pub search: Option<String>,
}

// ── Categories / providers / tags ────────────────────────────────────

#[derive(Debug, Args)]
pub struct EntityArgs {
    #[command(subcommand)]
    pub command: EntityCommand,
}

#[derive(Debug, Subcommand)]
pub enum EntityCommand {
    /// List one page
    #[command(alias = "ls")]
    List(PageArgs),

    /// Create a new entry
    Create {
        /// Display name
        #[arg(long)]
        name: Option<String>,

        /// Extra field as key=value (value parsed as JSON when possible)
        #[arg(long = "set", value_parser = parse_field)]
        fields: Vec<(String, serde_json::Value)>,

        /// Read the full payload from a JSON file
        #[arg(long, short = 'F', conflicts_with_all = ["name", "fields"])]
        from_file: Option<PathBuf>,
    },

    /// Update fields of an existing entry
    Update {
        /// Numeric id
        id: i64,

        /// New display name
        #[arg(long)]
        name: Option<String>,

        /// Field to change as key=value (value parsed as JSON when possible)
        #[arg(long = "set", value_parser = parse_field)]
        fields: Vec<(String, serde_json::Value)>,

        /// Read the changed fields from a JSON file
        #[arg(long, short = 'F', conflicts_with_all = ["name", "fields"])]
        from_file: Option<PathBuf>,
    },

    /// Delete an entry (checks references first)
    #[command(alias = "rm")]
    Delete {
        /// Numeric id
        id: i64,
    },
}

// ── Games ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GamesArgs {
    #[command(subcommand)]
    pub command: GamesCommand,
}

#[derive(Debug, Subcommand)]
pub enum GamesCommand {
    /// List store games
    #[command(alias = "ls")]
    List(GameFilterArgs),
}

/// Filters accepted by game listings.
#[derive(Debug, Args)]
pub struct GameFilterArgs {
    #[command(flatten)]
    pub page: PageArgs,

    /// Category id
    #[arg(long)]
    pub category: Option<String>,

    /// Provider id
    #[arg(long)]
    pub provider: Option<String>,

    /// Tag id (repeatable)
    #[arg(long = "tag")]
    pub tags: Vec<String>,

    /// Visibility flag (repeatable)
    #[arg(long = "visibility")]
    pub visibility: Vec<String>,

    /// Start of the date range (YYYY-MM-DD)
    #[arg(long, requires = "to")]
    pub from: Option<NaiveDate>,

    /// End of the date range (YYYY-MM-DD)
    #[arg(long, requires = "from")]
    pub to: Option<NaiveDate>,
}

// ── Manager ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ManagerArgs {
    #[command(subcommand)]
    pub command: ManagerCommand,
}

#[derive(Debug, Subcommand)]
pub enum ManagerCommand {
    /// List games in the manager
    #[command(alias = "ls")]
    List(GameFilterArgs),

    /// Add a store game to the manager
    Add {
        /// Store game id
        id: i64,
    },

    /// Remove a store game from the manager
    #[command(alias = "rm")]
    Remove {
        /// Store game id
        id: i64,
    },

    /// Flip a store game's manager membership
    Toggle {
        /// Store game id
        id: i64,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive setup wizard
    Init,

    /// Show the resolved configuration
    Show,

    /// Print the config file path
    Path,

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name
        name: String,
    },

    /// Store a profile's password in the system keyring
    SetPassword,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

// ── Value parsers ────────────────────────────────────────────────────

/// Parse `key=value`; the value is read as JSON when it parses, else as a string.
fn parse_field(raw: &str) -> Result<(String, serde_json::Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err("field name cannot be empty".into());
    }
    let value = serde_json::from_str(value)
        .unwrap_or_else(|_| serde_json::Value::String(value.to_owned()));
    Ok((key.to_owned(), value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn field_values_prefer_json() {
        assert_eq!(
            parse_field("isActive=false").unwrap(),
            ("isActive".into(), serde_json::Value::Bool(false))
        );
        assert_eq!(
            parse_field("color=#ff0000").unwrap(),
            ("color".into(), serde_json::Value::String("#ff0000".into()))
        );
        assert!(parse_field("novalue").is_err());
        assert!(parse_field("=x").is_err());
    }
}

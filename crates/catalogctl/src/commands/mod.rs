//! Command dispatch: bridges CLI args -> catalog operations -> output formatting.

pub mod auth;
pub mod config_cmd;
pub mod entities;
pub mod games;
pub mod lookups;
pub mod util;

use crate::cli::{Command, GlobalOpts};
use crate::config::Connection;
use crate::error::CliError;

use entities::{CategoryRow, ProviderRow, TagRow};

/// Dispatch a session-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    conn: &Connection,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let catalog = &conn.catalog;
    let store = catalog.store();
    match cmd {
        Command::Auth(args) => auth::handle(conn, args, global).await,
        Command::Categories(args) => {
            entities::handle::<_, CategoryRow>(store.categories(), args, global).await
        }
        Command::Providers(args) => {
            entities::handle::<_, ProviderRow>(store.providers(), args, global).await
        }
        Command::Tags(args) => entities::handle::<_, TagRow>(store.tags(), args, global).await,
        Command::Games(args) => games::handle_games(catalog, args, global).await,
        Command::Manager(args) => games::handle_manager(catalog, args, global).await,
        Command::Lookups => lookups::handle(catalog, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}

//! Store game and manager list command handlers.

use tabled::Tabled;

use catalog_core::{
    Catalog, CatalogEntity, DomainCache, EntityId, ManagerGame, MembershipTx, StoreGame, TxPhase,
};

use crate::cli::{
    GameFilterArgs, GamesArgs, GamesCommand, GlobalOpts, ManagerArgs, ManagerCommand, OutputFormat,
};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct GameRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Provider")]
    provider: String,
    #[tabled(rename = "Tags")]
    tags: String,
    #[tabled(rename = "Manager")]
    in_manager: String,
}

impl From<&StoreGame> for GameRow {
    fn from(g: &StoreGame) -> Self {
        Self {
            id: g.id.map(|id| id.to_string()).unwrap_or_default(),
            name: g.name.clone(),
            category: g.category_name.clone().unwrap_or_default(),
            provider: g.provider_name.clone().unwrap_or_default(),
            tags: join_ids(&g.tag_ids),
            in_manager: if g.in_manager { "✓" } else { "" }.into(),
        }
    }
}

#[derive(Tabled)]
struct ManagerRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Game")]
    game_id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Provider")]
    provider: String,
    #[tabled(rename = "Added")]
    added: String,
}

impl From<&ManagerGame> for ManagerRow {
    fn from(g: &ManagerGame) -> Self {
        Self {
            id: g.id.map(|id| id.to_string()).unwrap_or_default(),
            game_id: g.game_id.map(|id| id.to_string()).unwrap_or_default(),
            name: g.name.clone(),
            category: g.category_name.clone().unwrap_or_default(),
            provider: g.provider_name.clone().unwrap_or_default(),
            added: g
                .added_at
                .map(|t| t.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        }
    }
}

fn join_ids(ids: &[i64]) -> String {
    ids.iter().map(ToString::to_string).collect::<Vec<_>>().join(",")
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn handle_games(
    catalog: &Catalog,
    args: GamesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        GamesCommand::List(filter) => {
            let games = catalog.store().store_games();
            fetch_filtered(games, &filter).await?;
            let state = games.snapshot();
            let views: Vec<StoreGame> = state.items.iter().map(|r| r.view.clone()).collect();
            let out = output::render_list(&global.output, &views, |g| GameRow::from(g), |g| {
                g.id.map(|id| id.to_string()).unwrap_or_default()
            });
            output::print_output(&out, global.quiet);
            if matches!(global.output, OutputFormat::Table) {
                output::print_output(&output::page_footer(&state.pagination), global.quiet);
            }
            Ok(())
        }
    }
}

pub async fn handle_manager(
    catalog: &Catalog,
    args: ManagerArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let coordinator = catalog.manager_membership();
    let tx = match args.command {
        ManagerCommand::List(filter) => {
            let manager = catalog.store().manager_games();
            fetch_filtered(manager, &filter).await?;
            let state = manager.snapshot();
            let views: Vec<ManagerGame> = state.items.iter().map(|r| r.view.clone()).collect();
            let out = output::render_list(&global.output, &views, |g| ManagerRow::from(g), |g| {
                g.game_id.map(|id| id.to_string()).unwrap_or_default()
            });
            output::print_output(&out, global.quiet);
            if matches!(global.output, OutputFormat::Table) {
                output::print_output(&output::page_footer(&state.pagination), global.quiet);
            }
            return Ok(());
        }
        ManagerCommand::Add { id } => coordinator.set_membership(EntityId::new(id), true).await?,
        ManagerCommand::Remove { id } => {
            coordinator.set_membership(EntityId::new(id), false).await?
        }
        ManagerCommand::Toggle { id } => {
            let id = EntityId::new(id);
            // toggling reads the cached flag, so the game must be on a loaded page
            util::locate(catalog.store().store_games(), id).await?;
            coordinator.toggle(id).await?
        }
    };

    report_tx(&tx, global);
    Ok(())
}

async fn fetch_filtered<T: CatalogEntity>(
    domain: &DomainCache<T>,
    filter: &GameFilterArgs,
) -> Result<(), CliError> {
    let snapshot = util::filter_input(filter).snapshot();
    domain.fetch(filter.page.page, &snapshot).await?;
    Ok(())
}

fn report_tx(tx: &MembershipTx, global: &GlobalOpts) {
    let out = output::render_single(&global.output, tx, |_| String::new(), |t| t.id.to_string());
    output::print_output(&out, global.quiet);

    let verb = if tx.requested { "Added" } else { "Removed" };
    let preposition = if tx.requested { "to" } else { "from" };
    match (tx.phase, tx.previous) {
        (TxPhase::Confirmed, Some(previous)) if previous == tx.requested => {
            output::status(global, &format!("Game {} was already in that state", tx.id));
        }
        _ => output::status(global, &format!("{verb} game {} {preposition} the manager", tx.id)),
    }
}

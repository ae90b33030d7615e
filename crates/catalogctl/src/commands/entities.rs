//! Category, provider, and tag command handlers.
//!
//! The three domains share one command shape; only the table row differs.

use serde_json::Value;
use tabled::Tabled;

use catalog_core::{
    CatalogEntity, Category, DomainCache, EntityId, FilterEdit, FilterInput, Provider, Record,
    RecordKey, Tag,
};

use crate::cli::{EntityArgs, EntityCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

fn id_cell(id: Option<EntityId>) -> String {
    id.map(|id| id.to_string()).unwrap_or_default()
}

fn active_cell(active: bool) -> String {
    if active { "yes" } else { "no" }.into()
}

#[derive(Tabled)]
pub struct CategoryRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Slug")]
    slug: String,
    #[tabled(rename = "Active")]
    active: String,
    #[tabled(rename = "Games")]
    games: String,
}

impl From<&Category> for CategoryRow {
    fn from(c: &Category) -> Self {
        Self {
            id: id_cell(c.id),
            name: c.name.clone(),
            slug: c.slug.clone().unwrap_or_default(),
            active: active_cell(c.is_active),
            games: c.game_count.map(|n| n.to_string()).unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
pub struct ProviderRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Website")]
    website: String,
    #[tabled(rename = "Active")]
    active: String,
    #[tabled(rename = "Games")]
    games: String,
}

impl From<&Provider> for ProviderRow {
    fn from(p: &Provider) -> Self {
        Self {
            id: id_cell(p.id),
            name: p.name.clone(),
            website: p.website.clone().unwrap_or_default(),
            active: active_cell(p.is_active),
            games: p.game_count.map(|n| n.to_string()).unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
pub struct TagRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Color")]
    color: String,
}

impl From<&Tag> for TagRow {
    fn from(t: &Tag) -> Self {
        Self {
            id: id_cell(t.id),
            name: t.name.clone(),
            color: t.color.clone().unwrap_or_default(),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle<T, R>(
    domain: &DomainCache<T>,
    args: EntityArgs,
    global: &GlobalOpts,
) -> Result<(), CliError>
where
    T: CatalogEntity,
    R: Tabled + for<'a> From<&'a T>,
{
    match args.command {
        EntityCommand::List(page) => {
            let mut input = FilterInput::default();
            input.apply(FilterEdit::Search(page.search.unwrap_or_default()));
            domain.fetch(page.page, &input.snapshot()).await?;
            let state = domain.snapshot();
            let views: Vec<T> = state.items.iter().map(|r| r.view.clone()).collect();
            let out = output::render_list(&global.output, &views, |v| R::from(v), |v| {
                id_cell(v.id())
            });
            output::print_output(&out, global.quiet);
            if matches!(global.output, OutputFormat::Table) {
                output::print_output(&output::page_footer(&state.pagination), global.quiet);
            }
            Ok(())
        }

        EntityCommand::Create {
            name,
            fields,
            from_file,
        } => {
            let payload = util::payload(name, fields, from_file.as_deref())?;
            let entity: T = serde_json::from_value(Value::Object(payload)).map_err(|e| {
                CliError::Validation {
                    field: T::LABEL.into(),
                    reason: e.to_string(),
                }
            })?;
            let record = domain.create(&entity).await?;
            print_record(&record, global);
            output::status(global, &format!("Created {} '{}'", T::LABEL, record.name()));
            Ok(())
        }

        EntityCommand::Update {
            id,
            name,
            fields,
            from_file,
        } => {
            let partial = util::payload(name, fields, from_file.as_deref())?;
            if partial.is_empty() {
                return Err(CliError::Validation {
                    field: "fields".into(),
                    reason: "nothing to update; pass --name, --set, or --from-file".into(),
                });
            }
            let key = util::locate(domain, EntityId::new(id)).await?;
            let record = domain.update(&key, &partial).await?;
            print_record(&record, global);
            output::status(global, &format!("Updated {} {id}", T::LABEL));
            Ok(())
        }

        EntityCommand::Delete { id } => {
            let key = util::locate(domain, EntityId::new(id)).await?;
            domain.open_delete(&key)?;
            let outcome = delete_confirmed(domain, &key, global).await;
            domain.close_delete();
            if let Some(record) = outcome? {
                output::status(global, &format!("Deleted {} '{}'", T::LABEL, record.name()));
            }
            Ok(())
        }
    }
}

/// Probe first, so a referential block is reported before asking.
async fn delete_confirmed<T: CatalogEntity>(
    domain: &DomainCache<T>,
    key: &RecordKey,
    global: &GlobalOpts,
) -> Result<Option<Record<T>>, CliError> {
    domain.probe_delete(key).await?;
    let name = domain
        .get(key)
        .map(|r| r.name().to_owned())
        .unwrap_or_else(|| key.to_string());
    if !util::confirm(&format!("Delete {} '{name}'?", T::LABEL), global.yes)? {
        return Ok(None);
    }
    Ok(Some(domain.delete(key).await?))
}

fn print_record<T: CatalogEntity>(record: &Record<T>, global: &GlobalOpts) {
    let out = output::render_single(
        &global.output,
        &record.full_data,
        |_| String::new(),
        |_| id_cell(record.id),
    );
    output::print_output(&out, global.quiet);
}

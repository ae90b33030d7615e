//! Shared helpers for command handlers.

use std::path::Path;

use serde_json::{Map, Value};

use catalog_core::{
    CatalogEntity, CoreError, DomainCache, EntityId, FilterEdit, FilterInput, FilterSnapshot,
    RecordKey,
};

use crate::cli::GameFilterArgs;
use crate::error::CliError;

/// Resolve a numeric id to the cache key of its record, walking pages of
/// the unfiltered list until it shows up.
pub async fn locate<T: CatalogEntity>(
    domain: &DomainCache<T>,
    id: EntityId,
) -> Result<RecordKey, CliError> {
    let filters = FilterSnapshot::default();
    let mut page = 1;
    loop {
        domain.fetch(page, &filters).await?;
        let state = domain.snapshot();
        if let Some(record) = state.find_by_id(id) {
            return Ok(record.key.clone());
        }
        if u64::from(page) >= state.pagination.total_pages() {
            break;
        }
        page += 1;
    }
    Err(CoreError::NotFound {
        entity_type: T::LABEL,
        identifier: id.to_string(),
    }
    .into())
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Read and parse a JSON object file for `--from-file` flags.
pub fn read_json_object(path: &Path) -> Result<Map<String, Value>, CliError> {
    let contents = std::fs::read_to_string(path)?;
    match serde_json::from_str(&contents)? {
        Value::Object(map) => Ok(map),
        other => Err(CliError::Validation {
            field: "from-file".into(),
            reason: format!("expected a JSON object, got {other}"),
        }),
    }
}

/// Collect `--name` / `--set` flags (or a `--from-file` payload) into a
/// field map.
pub fn payload(
    name: Option<String>,
    fields: Vec<(String, Value)>,
    from_file: Option<&Path>,
) -> Result<Map<String, Value>, CliError> {
    if let Some(path) = from_file {
        return read_json_object(path);
    }
    let mut map: Map<String, Value> = fields.into_iter().collect();
    if let Some(name) = name {
        map.insert("name".into(), Value::String(name));
    }
    Ok(map)
}

/// Translate game listing flags into the same filter input the console
/// edits field by field.
pub fn filter_input(args: &GameFilterArgs) -> FilterInput {
    let mut input = FilterInput::default();
    for edit in [
        FilterEdit::Search(args.page.search.clone().unwrap_or_default()),
        FilterEdit::Category(args.category.clone()),
        FilterEdit::Provider(args.provider.clone()),
        FilterEdit::Tags(args.tags.clone()),
        FilterEdit::Visibility(args.visibility.clone()),
        FilterEdit::DateRange(args.from.zip(args.to)),
    ] {
        input.apply(edit);
    }
    input
}

//! Dropdown lookup handler.

use serde::Serialize;
use tabled::Tabled;

use catalog_api::LookupList;
use catalog_core::Catalog;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Clone, Serialize, Tabled)]
struct LookupRow {
    #[tabled(rename = "List")]
    list: String,
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
}

pub async fn handle(catalog: &Catalog, global: &GlobalOpts) -> Result<(), CliError> {
    let entry = catalog.store().dropdowns().get().await?;
    let rows: Vec<LookupRow> = [LookupList::Categories, LookupList::Providers]
        .into_iter()
        .flat_map(|list| {
            entry.list(list).iter().map(move |item| LookupRow {
                list: list.to_string(),
                id: item.id,
                name: item.name.clone(),
            })
        })
        .collect();

    let out = output::render_list(
        &global.output,
        &rows,
        LookupRow::clone,
        |r| format!("{}\t{}", r.list, r.id),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

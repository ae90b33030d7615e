// ── Catalog domain model ──
//
// Typed views of catalog entities, the records that wrap them in the
// cache, and the normalized filter values used to query them.

pub mod entities;
pub mod entity_id;
pub mod filter;
pub mod record;

// ── Re-exports ──────────────────────────────────────────────────────
// Flat access: `use catalog_core::model::*` gives you everything.

pub use entities::{CatalogEntity, Category, ManagerGame, Membership, Provider, StoreGame, Tag};
pub use entity_id::{EntityId, RecordKey};
pub use filter::{FilterEdit, FilterInput, FilterSnapshot};
pub use record::Record;

// ── Domain state store ──
//
// Per-domain caches with push-based change notification.

mod data_store;
mod domain;
mod dropdown;
mod state;

pub use data_store::DataStore;
pub use domain::DomainCache;
pub use dropdown::{DropdownCache, DropdownEntry};
pub use state::{DomainState, FetchOutcome, ModalState, Pagination};

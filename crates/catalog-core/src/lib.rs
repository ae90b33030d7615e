//! Client-side domain state store for the catalog admin console.
//!
//! - **[`Catalog`]**: Facade wiring the remote client, the store, the
//!   session broadcaster and the optimistic coordinator together.
//!   [`start()`](Catalog::start) spawns the session tasks.
//!
//! - **[`DataStore`]**: One [`DomainCache<T>`] per domain (categories,
//!   providers, store games, manager games, tags) plus the shared
//!   [`DropdownCache`]. Each domain state is a pure [`DomainState<T>`]
//!   published through a `tokio::sync::watch` channel; fetch responses
//!   carry a generation so a slow, superseded response never overwrites
//!   a newer one.
//!
//! - **[`FilterDebounce`]**: Collapses bursts of filter edits into one
//!   fetch after a quiet period. Edits that do not change the normalized
//!   [`FilterSnapshot`] neither fetch nor reset the timer.
//!
//! - **[`MembershipCoordinator`]**: Optimistic membership toggles with
//!   rollback, serialized per entity.
//!
//! - **[`SessionBroadcaster`]**: Authenticated / Unauthenticated state
//!   driven by explicit logout, other tabs, and Unauthorized responses.
//!
//! Every operation returns `Result<_, CoreError>`; [`ActionResult`] is the
//! serializable `{success, data, error}` shape for presentation layers.

pub mod catalog;
pub mod config;
pub mod debounce;
pub mod error;
pub mod model;
pub mod optimistic;
pub mod result;
pub mod session;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use catalog::Catalog;
pub use config::StoreConfig;
pub use debounce::{DebounceMachine, DebouncePhase, EditEffect, FilterDebounce, FilterTarget};
pub use error::{CoreError, ErrorKind};
pub use optimistic::{MembershipCoordinator, MembershipTx, TxPhase};
pub use result::{ActionResult, ErrorDescriptor};
pub use session::{AuthState, CredentialTier, SessionBroadcaster, SessionBus, SessionSignal};
pub use store::{DataStore, DomainCache, DomainState, DropdownCache, DropdownEntry, FetchOutcome};
pub use stream::DomainStream;

pub use model::{
    CatalogEntity, Category, EntityId, FilterEdit, FilterInput, FilterSnapshot, ManagerGame,
    Membership, Provider, Record, RecordKey, StoreGame, Tag,
};

// ── Session lifecycle ──
//
// Credential storage tiers, the in-process signal bus, and the
// broadcaster that turns credential loss into the logged-out state.

mod broadcaster;
mod bus;
mod storage;

pub use broadcaster::{AuthState, SessionBroadcaster};
pub use bus::{SessionBus, SessionSignal};
pub use storage::{
    AUTH_TOKEN_KEY, AUTH_USER_KEY, CREDENTIAL_KEYS, CredentialTier, MemoryTier, REFRESH_TOKEN_KEY,
    SharedStorage, StorageHandle, TabEvent, TabEventKind, TabEvents, TabId,
};

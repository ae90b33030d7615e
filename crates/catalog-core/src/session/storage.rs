// ── Credential storage tiers ──
//
// A session keeps its credential artifacts in two tiers: a short-lived
// store private to one tab, and a persisted store shared by every tab.
// `SharedStorage` models the shared store together with the change
// notifications other tabs receive when it is mutated.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::broadcast;
use tracing::warn;
use uuid::Uuid;

use crate::error::CoreError;

pub const AUTH_TOKEN_KEY: &str = "auth_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
pub const AUTH_USER_KEY: &str = "auth_user";

/// Every key that counts as a credential artifact.
pub const CREDENTIAL_KEYS: [&str; 3] = [AUTH_TOKEN_KEY, REFRESH_TOKEN_KEY, AUTH_USER_KEY];

const TAB_CHANNEL_SIZE: usize = 64;

/// A key/value store holding credential artifacts.
pub trait CredentialTier: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    fn get(&self, key: &str) -> Result<Option<String>, CoreError>;

    fn set(&self, key: &str, value: &str) -> Result<(), CoreError>;

    /// Remove `key`. Removing an absent key is a no-op.
    fn remove(&self, key: &str) -> Result<(), CoreError>;

    /// Remove every credential artifact, continuing past failures.
    fn clear_credentials(&self) {
        for key in CREDENTIAL_KEYS {
            if let Err(err) = self.remove(key) {
                warn!(tier = self.name(), key, error = %err, "failed to clear credential");
            }
        }
    }
}

// ── MemoryTier ──────────────────────────────────────────────────────

/// Process-local tier that disappears with the session.
#[derive(Debug, Default)]
pub struct MemoryTier {
    values: DashMap<String, String>,
}

impl MemoryTier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialTier for MemoryTier {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        Ok(self.values.get(key).map(|v| v.value().clone()))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CoreError> {
        self.values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CoreError> {
        self.values.remove(key);
        Ok(())
    }
}

// ── Cross-tab storage ───────────────────────────────────────────────

/// Identity of one tab sharing a [`SharedStorage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TabId(Uuid);

impl TabId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TabId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TabId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabEventKind {
    /// A key was written or removed. `None` means the whole store was cleared.
    Storage { key: Option<String> },
    /// Another tab logged out explicitly.
    Logout,
}

/// Notification delivered to every tab except the one that caused it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabEvent {
    pub origin: TabId,
    pub kind: TabEventKind,
}

struct SharedInner {
    values: DashMap<String, String>,
    events: broadcast::Sender<TabEvent>,
}

/// Persisted key/value store shared by all tabs.
#[derive(Clone)]
pub struct SharedStorage {
    inner: Arc<SharedInner>,
}

impl SharedStorage {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(TAB_CHANNEL_SIZE);
        Self {
            inner: Arc::new(SharedInner {
                values: DashMap::new(),
                events,
            }),
        }
    }

    /// Open the store from a new tab.
    pub fn open_tab(&self) -> StorageHandle {
        StorageHandle {
            tab: TabId::new(),
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Default for SharedStorage {
    fn default() -> Self {
        Self::new()
    }
}

/// One tab's view of a [`SharedStorage`].
#[derive(Clone)]
pub struct StorageHandle {
    tab: TabId,
    inner: Arc<SharedInner>,
}

impl StorageHandle {
    pub fn tab(&self) -> TabId {
        self.tab
    }

    /// Events caused by other tabs.
    pub fn subscribe(&self) -> TabEvents {
        TabEvents {
            tab: self.tab,
            rx: self.inner.events.subscribe(),
        }
    }

    /// Remove every key, notifying other tabs with a `None` key.
    pub fn clear(&self) {
        if self.inner.values.is_empty() {
            return;
        }
        self.inner.values.clear();
        self.emit(TabEventKind::Storage { key: None });
    }

    /// Tell other tabs this tab logged out.
    pub fn post_logout(&self) {
        self.emit(TabEventKind::Logout);
    }

    fn emit(&self, kind: TabEventKind) {
        // No other tab listening is fine.
        let _ = self.inner.events.send(TabEvent {
            origin: self.tab,
            kind,
        });
    }
}

impl CredentialTier for StorageHandle {
    fn name(&self) -> &'static str {
        "shared"
    }

    fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        Ok(self.inner.values.get(key).map(|v| v.value().clone()))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CoreError> {
        let previous = self.inner.values.insert(key.to_owned(), value.to_owned());
        if previous.as_deref() != Some(value) {
            self.emit(TabEventKind::Storage {
                key: Some(key.to_owned()),
            });
        }
        Ok(())
    }

    /// Only an actual removal notifies other tabs, so tabs reacting to a
    /// removal by clearing their own view do not echo it back.
    fn remove(&self, key: &str) -> Result<(), CoreError> {
        if self.inner.values.remove(key).is_some() {
            self.emit(TabEventKind::Storage {
                key: Some(key.to_owned()),
            });
        }
        Ok(())
    }
}

/// Receiver of [`TabEvent`]s, skipping those the owning tab caused.
pub struct TabEvents {
    tab: TabId,
    rx: broadcast::Receiver<TabEvent>,
}

impl TabEvents {
    /// Next event from another tab. A lagged receiver yields a full-clear
    /// event so the caller re-checks storage. `None` once closed.
    pub async fn recv(&mut self) -> Option<TabEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) if event.origin == self.tab => {}
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "tab event receiver lagged, forcing re-check");
                    return Some(TabEvent {
                        origin: self.tab,
                        kind: TabEventKind::Storage { key: None },
                    });
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

// ── Session invalidation ──
//
// Tracks whether this tab holds a credential and forces the logged-out
// state whenever the credential disappears: explicit logout, another
// tab's logout or storage wipe, or an Unauthorized response.

use std::sync::{Arc, Mutex};

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use strum::Display;
use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::bus::{SessionBus, SessionSignal};
use super::storage::{
    AUTH_TOKEN_KEY, AUTH_USER_KEY, CREDENTIAL_KEYS, CredentialTier, StorageHandle, TabEvent,
    TabEventKind, TabEvents,
};
use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AuthState {
    Authenticated,
    Unauthenticated,
}

pub struct SessionBroadcaster {
    bus: SessionBus,
    short_lived: Arc<dyn CredentialTier>,
    persisted: Arc<dyn CredentialTier>,
    /// Present when the persisted tier is shared with other tabs.
    tab: Option<StorageHandle>,
    state: watch::Sender<AuthState>,
    /// Receivers opened at construction and handed to the first `run`.
    listeners: Mutex<Option<Listeners>>,
}

struct Listeners {
    signals: broadcast::Receiver<SessionSignal>,
    tab_events: Option<TabEvents>,
}

impl SessionBroadcaster {
    /// The initial state follows whether a token is already stored.
    pub fn new(
        bus: SessionBus,
        short_lived: Arc<dyn CredentialTier>,
        persisted: Arc<dyn CredentialTier>,
    ) -> Self {
        Self::build(bus, short_lived, persisted, None)
    }

    /// Like [`new`](Self::new), with the persisted tier shared across tabs.
    pub fn with_shared_storage(
        bus: SessionBus,
        short_lived: Arc<dyn CredentialTier>,
        tab: StorageHandle,
    ) -> Self {
        let persisted: Arc<dyn CredentialTier> = Arc::new(tab.clone());
        Self::build(bus, short_lived, persisted, Some(tab))
    }

    fn build(
        bus: SessionBus,
        short_lived: Arc<dyn CredentialTier>,
        persisted: Arc<dyn CredentialTier>,
        tab: Option<StorageHandle>,
    ) -> Self {
        let (state, _) = watch::channel(AuthState::Unauthenticated);
        let listeners = Listeners {
            signals: bus.subscribe(),
            tab_events: tab.as_ref().map(StorageHandle::subscribe),
        };
        let this = Self {
            bus,
            short_lived,
            persisted,
            tab,
            state,
            listeners: Mutex::new(Some(listeners)),
        };
        if this.token().is_some() {
            this.state.send_replace(AuthState::Authenticated);
        }
        this
    }

    // ── Reads ────────────────────────────────────────────────────────

    pub fn state(&self) -> AuthState {
        *self.state.borrow()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state() == AuthState::Authenticated
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn bus(&self) -> &SessionBus {
        &self.bus
    }

    /// Stored token, short-lived tier first.
    pub fn token(&self) -> Option<SecretString> {
        [&self.short_lived, &self.persisted]
            .into_iter()
            .find_map(|tier| match tier.get(AUTH_TOKEN_KEY) {
                Ok(token) => token.filter(|t| !t.is_empty()),
                Err(err) => {
                    warn!(tier = tier.name(), error = %err, "failed to read stored token");
                    None
                }
            })
            .map(SecretString::from)
    }

    /// Stored user profile, if any.
    pub fn user(&self) -> Option<serde_json::Value> {
        let raw = [&self.short_lived, &self.persisted]
            .into_iter()
            .find_map(|tier| tier.get(AUTH_USER_KEY).ok().flatten())?;
        serde_json::from_str(&raw).ok()
    }

    // ── Transitions ──────────────────────────────────────────────────

    /// Store a freshly issued credential in both tiers and enter
    /// Authenticated.
    pub fn sign_in(
        &self,
        token: &SecretString,
        user: Option<&serde_json::Value>,
    ) -> Result<(), CoreError> {
        for tier in [&self.short_lived, &self.persisted] {
            tier.set(AUTH_TOKEN_KEY, token.expose_secret())?;
            if let Some(user) = user {
                tier.set(AUTH_USER_KEY, &user.to_string())?;
            }
        }
        self.transition(AuthState::Authenticated, "sign-in");
        Ok(())
    }

    /// Explicit logout: clear every artifact, tell other tabs and local
    /// subscribers, enter Unauthenticated.
    pub fn logout(&self) {
        self.clear_all();
        if let Some(tab) = &self.tab {
            tab.post_logout();
        }
        self.transition(AuthState::Unauthenticated, "logout");
        self.bus.publish(SessionSignal::Logout);
    }

    /// React to a change another tab made.
    pub fn handle_tab_event(&self, event: &TabEvent) {
        match &event.kind {
            TabEventKind::Logout => {
                debug!(origin = %event.origin, "logout broadcast from another tab");
                self.invalidate("logout in another tab");
            }
            TabEventKind::Storage { key } => {
                let relevant = key
                    .as_deref()
                    .is_none_or(|k| CREDENTIAL_KEYS.contains(&k));
                if !relevant {
                    return;
                }
                // The shared tier is authoritative; this tab's private copy
                // may outlive a wipe made elsewhere.
                match self.persisted_token() {
                    Some(token) => {
                        if let Err(err) = self.short_lived.set(AUTH_TOKEN_KEY, &token) {
                            warn!(error = %err, "failed to mirror credential from another tab");
                        }
                        if self.state() == AuthState::Unauthenticated {
                            self.transition(AuthState::Authenticated, "credential added in another tab");
                        }
                    }
                    None => self.invalidate("credential removed in another tab"),
                }
            }
        }
    }

    /// React to a signal published in this process.
    pub fn handle_signal(&self, signal: SessionSignal) {
        match signal {
            SessionSignal::Logout => self.invalidate("logout signal"),
            SessionSignal::Unauthorized => self.invalidate("request unauthorized"),
        }
    }

    /// Drive the broadcaster until `cancel` fires.
    ///
    /// The first run consumes the receivers opened at construction, so
    /// signals and tab events sent before the task is first polled are
    /// still delivered.
    pub async fn run(self: Arc<Self>, cancel: CancellationToken) {
        let Listeners {
            mut signals,
            mut tab_events,
        } = self.take_listeners();

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                signal = signals.recv() => match signal {
                    Ok(signal) => self.handle_signal(signal),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "session signal receiver lagged");
                        if self.token().is_none() {
                            self.invalidate("credential missing after lag");
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
                event = next_tab_event(&mut tab_events) => match event {
                    Some(event) => self.handle_tab_event(&event),
                    None => tab_events = None,
                },
            }
        }
        debug!("session broadcaster stopped");
    }

    // ── Internals ────────────────────────────────────────────────────

    fn take_listeners(&self) -> Listeners {
        let pending = match self.listeners.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        pending.unwrap_or_else(|| Listeners {
            signals: self.bus.subscribe(),
            tab_events: self.tab.as_ref().map(StorageHandle::subscribe),
        })
    }

    fn persisted_token(&self) -> Option<String> {
        match self.persisted.get(AUTH_TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(err) => {
                warn!(tier = self.persisted.name(), error = %err, "failed to read stored token");
                None
            }
        }
    }

    /// Enter Unauthenticated, clearing whatever artifacts remain. Safe to
    /// call repeatedly.
    fn invalidate(&self, reason: &str) {
        self.clear_all();
        self.transition(AuthState::Unauthenticated, reason);
    }

    fn clear_all(&self) {
        self.short_lived.clear_credentials();
        self.persisted.clear_credentials();
    }

    fn transition(&self, next: AuthState, reason: &str) {
        let changed = self.state.send_if_modified(|state| {
            if *state == next {
                return false;
            }
            *state = next;
            true
        });
        if changed {
            info!(state = %next, reason, "session state changed");
        }
    }
}

async fn next_tab_event(events: &mut Option<TabEvents>) -> Option<TabEvent> {
    match events {
        Some(events) => events.recv().await,
        None => std::future::pending().await,
    }
}

// ── Catalog facade ──
//
// Wires the remote client, the domain store, the session broadcaster
// and the optimistic coordinator together, and owns the background
// tasks that keep them consistent.

use std::sync::Arc;

use secrecy::SecretString;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use catalog_api::CatalogApi;

use crate::config::StoreConfig;
use crate::debounce::{DebounceMachine, FilterDebounce, FilterTarget};
use crate::error::CoreError;
use crate::model::{CatalogEntity, FilterInput, ManagerGame, StoreGame};
use crate::optimistic::MembershipCoordinator;
use crate::session::{
    AuthState, CredentialTier, MemoryTier, SessionBroadcaster, SessionBus, StorageHandle,
};
use crate::store::{DataStore, DomainCache};

/// The main entry point for consumers.
///
/// Cheaply cloneable. Construction does not touch the network; call
/// [`start`](Self::start) to run the session tasks.
#[derive(Clone)]
pub struct Catalog {
    inner: Arc<CatalogInner>,
}

struct CatalogInner {
    config: StoreConfig,
    api: Arc<dyn CatalogApi>,
    store: Arc<DataStore>,
    session: Arc<SessionBroadcaster>,
    manager_membership: MembershipCoordinator<StoreGame, ManagerGame>,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Catalog {
    /// Build a catalog whose persisted credentials live in `persisted`.
    pub fn new(
        api: Arc<dyn CatalogApi>,
        config: StoreConfig,
        persisted: Arc<dyn CredentialTier>,
    ) -> Self {
        let bus = SessionBus::new();
        let session =
            SessionBroadcaster::new(bus.clone(), Arc::new(MemoryTier::new()), persisted);
        Self::assemble(api, config, bus, session)
    }

    /// Build a catalog for one tab of a shared persisted store.
    pub fn with_shared_storage(
        api: Arc<dyn CatalogApi>,
        config: StoreConfig,
        tab: StorageHandle,
    ) -> Self {
        let bus = SessionBus::new();
        let session =
            SessionBroadcaster::with_shared_storage(bus.clone(), Arc::new(MemoryTier::new()), tab);
        Self::assemble(api, config, bus, session)
    }

    fn assemble(
        api: Arc<dyn CatalogApi>,
        config: StoreConfig,
        bus: SessionBus,
        session: SessionBroadcaster,
    ) -> Self {
        let store = Arc::new(DataStore::new(&api, &bus, &config));
        let manager_membership = MembershipCoordinator::new(
            Arc::clone(&api),
            bus,
            Arc::clone(store.store_games()),
            Arc::clone(store.manager_games()),
        );

        let catalog = Self {
            inner: Arc::new(CatalogInner {
                config,
                api,
                store,
                session: Arc::new(session),
                manager_membership,
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        };
        if catalog.inner.session.is_authenticated() {
            catalog.apply_auth_state(AuthState::Authenticated);
        }
        catalog
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<DataStore> {
        &self.inner.store
    }

    pub fn session(&self) -> &Arc<SessionBroadcaster> {
        &self.inner.session
    }

    pub fn api(&self) -> &Arc<dyn CatalogApi> {
        &self.inner.api
    }

    /// Optimistic add/remove of store games to the manager list.
    pub fn manager_membership(&self) -> &MembershipCoordinator<StoreGame, ManagerGame> {
        &self.inner.manager_membership
    }

    pub fn auth_state(&self) -> AuthState {
        self.inner.session.state()
    }

    pub fn subscribe_auth(&self) -> watch::Receiver<AuthState> {
        self.inner.session.subscribe()
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Spawn the session broadcaster and the task that projects auth
    /// state changes onto the store and the client.
    pub async fn start(&self) {
        let mut handles = self.inner.task_handles.lock().await;
        if !handles.is_empty() {
            return;
        }

        let session = Arc::clone(&self.inner.session);
        handles.push(tokio::spawn(session.run(self.inner.cancel.child_token())));

        let catalog = self.clone();
        let auth = self.subscribe_auth();
        let cancel = self.inner.cancel.child_token();
        handles.push(tokio::spawn(auth_projection_task(catalog, auth, cancel)));
        debug!("catalog background tasks started");
    }

    /// Cancel background tasks and wait for them to finish.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            if let Err(err) = handle.await {
                warn!(error = %err, "background task ended abnormally");
            }
        }
        debug!("catalog shut down");
    }

    // ── Session ──────────────────────────────────────────────────────

    /// Exchange credentials for a token and enter Authenticated.
    pub async fn sign_in(&self, username: &str, password: &SecretString) -> Result<(), CoreError> {
        if username.trim().is_empty() {
            return Err(CoreError::validation("username is required"));
        }
        let response = self.inner.api.sign_in(username, password).await?;
        let token = SecretString::from(response.token);
        self.inner.session.sign_in(&token, response.user.as_ref())?;
        self.apply_auth_state(AuthState::Authenticated);
        info!(username, "signed in");
        Ok(())
    }

    /// End the session. The sign-out call is best effort; local state is
    /// cleared regardless.
    pub async fn logout(&self) {
        if self.inner.api.has_token() {
            if let Err(err) = self.inner.api.sign_out().await {
                warn!(error = %err, "sign-out request failed (non-fatal)");
            }
        }
        self.inner.session.logout();
        self.apply_auth_state(AuthState::Unauthenticated);
    }

    // ── Filters ──────────────────────────────────────────────────────

    /// Start a debounce pipeline feeding `domain`.
    pub fn filter_pipeline<T: CatalogEntity>(&self, domain: &Arc<DomainCache<T>>) -> FilterDebounce {
        self.filter_pipeline_from(domain, FilterInput::default())
    }

    /// Like [`filter_pipeline`](Self::filter_pipeline), starting from
    /// `input` treated as already applied.
    pub fn filter_pipeline_from<T: CatalogEntity>(
        &self,
        domain: &Arc<DomainCache<T>>,
        input: FilterInput,
    ) -> FilterDebounce {
        let target: Arc<dyn FilterTarget> = Arc::clone(domain) as Arc<dyn FilterTarget>;
        FilterDebounce::spawn_with(
            target,
            DebounceMachine::with_input(self.inner.config.debounce_quiet, input),
            self.inner.cancel.child_token(),
        )
    }

    // ── Internals ────────────────────────────────────────────────────

    fn apply_auth_state(&self, state: AuthState) {
        match state {
            AuthState::Authenticated => {
                self.inner.api.set_token(self.inner.session.token());
            }
            AuthState::Unauthenticated => {
                self.inner.api.set_token(None);
                self.inner.store.logout_projection();
            }
        }
    }
}

// ── Background tasks ────────────────────────────────────────────────

async fn auth_projection_task(
    catalog: Catalog,
    mut auth: watch::Receiver<AuthState>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            changed = auth.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = *auth.borrow_and_update();
                debug!(%state, "projecting session state");
                catalog.apply_auth_state(state);
            }
        }
    }
}

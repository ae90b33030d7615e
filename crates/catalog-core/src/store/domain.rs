// ── Domain cache module ──
//
// Imperative shell around one `DomainState`. Every network call happens
// here; every state change is a `DomainState` transition applied through
// the `watch` channel so subscribers see whole transitions only.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::{Map, Value};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use catalog_api::{CatalogApi, LookupItem};

use super::dropdown::DropdownCache;
use super::state::{DomainState, FetchOutcome};
use crate::error::CoreError;
use crate::model::{CatalogEntity, EntityId, FilterSnapshot, Membership, Record, RecordKey};
use crate::session::{SessionBus, SessionSignal};
use crate::stream::DomainStream;

pub struct DomainCache<T: CatalogEntity> {
    api: Arc<dyn CatalogApi>,
    bus: SessionBus,
    state: watch::Sender<Arc<DomainState<T>>>,
    /// Last issued fetch generation.
    generation: AtomicU64,
    /// Set for domains that feed a dropdown list.
    dropdown: Option<Arc<DropdownCache>>,
}

impl<T: CatalogEntity> DomainCache<T> {
    pub fn new(
        api: Arc<dyn CatalogApi>,
        bus: SessionBus,
        page_size: u32,
        dropdown: Option<Arc<DropdownCache>>,
    ) -> Self {
        let (state, _) = watch::channel(Arc::new(DomainState::new(page_size)));
        Self {
            api,
            bus,
            state,
            generation: AtomicU64::new(0),
            dropdown: dropdown.filter(|_| T::DROPDOWN.is_some()),
        }
    }

    // ── Reads ────────────────────────────────────────────────────────

    pub fn snapshot(&self) -> Arc<DomainState<T>> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> DomainStream<T> {
        DomainStream::new(self.state.subscribe())
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn get(&self, key: &RecordKey) -> Option<Record<T>> {
        self.state.borrow().find(key).cloned()
    }

    // ── Fetch ────────────────────────────────────────────────────────

    /// Fetch `page` with `filters`, replacing the cached page on success.
    ///
    /// Responses to fetches that were overtaken by a newer one are
    /// discarded and reported as [`FetchOutcome::Superseded`].
    pub async fn fetch(
        &self,
        page: u32,
        filters: &FilterSnapshot,
    ) -> Result<FetchOutcome, CoreError> {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let page = page.max(1);
        let page_size = self.apply(|s| {
            s.begin_fetch(generation, page, filters.clone());
            s.pagination.page_size
        });

        debug!(domain = T::LABEL, generation, page, "fetching");
        let query = filters.to_query(page, page_size);
        let result = match self.api.list(T::RESOURCE, &query).await {
            Ok(response) => response
                .items
                .into_iter()
                .map(Record::from_server)
                .collect::<Result<Vec<_>, _>>()
                .map(|items| (items, response.total_count)),
            Err(err) => Err(CoreError::from(err)),
        };

        match result {
            Ok((items, total)) => {
                let outcome = self.apply(|s| s.finish_fetch_ok(generation, items, total));
                match outcome {
                    FetchOutcome::Applied { truncated, .. } if truncated > 0 => {
                        warn!(
                            domain = T::LABEL,
                            truncated, "server returned more than one page, extra items dropped"
                        );
                    }
                    FetchOutcome::Superseded => {
                        debug!(domain = T::LABEL, generation, "discarding superseded response");
                    }
                    FetchOutcome::Applied { .. } => {
                        debug!(domain = T::LABEL, generation, total, "fetch applied");
                    }
                }
                Ok(outcome)
            }
            Err(err) => {
                let message = (!err.is_unauthorized()).then(|| err.to_string());
                if !self.apply(|s| s.finish_fetch_err(generation, message)) {
                    debug!(domain = T::LABEL, generation, "discarding superseded failure");
                }
                Err(self.surface(err))
            }
        }
    }

    /// Re-issue the most recent query (page, size and filters).
    pub async fn refetch_current(&self) -> Result<FetchOutcome, CoreError> {
        let (page, filters) = {
            let state = self.state.borrow();
            (state.pagination.current_page, state.filters.clone())
        };
        self.fetch(page, &filters).await
    }

    /// Fetch the current query only if nothing has been loaded yet and
    /// no fetch is outstanding.
    pub async fn ensure_loaded(&self) -> Result<Option<FetchOutcome>, CoreError> {
        let needed = {
            let state = self.state.borrow();
            !state.populated && !state.loading
        };
        if needed {
            self.refetch_current().await.map(Some)
        } else {
            Ok(None)
        }
    }

    /// Set the page the next fetch should request. Does not fetch.
    pub fn set_page(&self, page: u32) {
        self.apply(|s| s.set_page(page));
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Create `entity` on the server and append the canonical result.
    pub async fn create(&self, entity: &T) -> Result<Record<T>, CoreError> {
        entity.validate()?;
        let payload = serde_json::to_value(entity)?;
        let created = self
            .api
            .create(T::RESOURCE, &payload)
            .await
            .map_err(|e| self.surface(e.into()))?;
        let record = Record::<T>::from_server(created)?;

        self.apply(|s| {
            s.insert_created(record.clone());
            s.close_add_edit();
        });
        self.sync_dropdown(&record);
        info!(domain = T::LABEL, key = %record.key, "created");
        Ok(record)
    }

    /// Merge `partial` into the cached full representation, send it, and
    /// overwrite the cached record with the server's canonical response.
    pub async fn update(
        &self,
        key: &RecordKey,
        partial: &Map<String, Value>,
    ) -> Result<Record<T>, CoreError> {
        let existing = self.require(key)?;
        let id = require_id::<T>(&existing)?;

        let merged = existing.merged_payload(partial);
        let candidate: T = serde_json::from_value(Value::Object(merged.clone()))
            .map_err(|e| CoreError::validation(format!("invalid {} fields: {e}", T::LABEL)))?;
        candidate.validate()?;

        let updated = self
            .api
            .update(T::RESOURCE, id.get(), &Value::Object(merged))
            .await
            .map_err(|e| self.surface(e.into()))?;
        let mut record = Record::<T>::from_server(updated)?;
        record.key = existing.key.clone();
        record.id = Some(id);

        let applied = self.apply(|s| {
            let applied = s.apply_update(key, record.clone());
            s.close_add_edit();
            applied
        });
        if !applied {
            debug!(domain = T::LABEL, %key, "updated record left the page before confirmation");
        }
        self.sync_dropdown(&record);
        info!(domain = T::LABEL, %key, "updated");
        Ok(record)
    }

    /// Ask the server whether `key` may be deleted.
    ///
    /// Domains without referential blocking always pass.
    pub async fn probe_delete(&self, key: &RecordKey) -> Result<(), CoreError> {
        let record = self.require(key)?;
        let id = require_id::<T>(&record)?;
        if !T::REFERENTIAL {
            return Ok(());
        }

        let probe = self
            .api
            .probe_delete(T::RESOURCE, id.get())
            .await
            .map_err(|e| self.surface(e.into()))?;
        if probe.deletable {
            Ok(())
        } else {
            debug!(domain = T::LABEL, %key, linked = ?probe.linked_games, "delete blocked by probe");
            Err(CoreError::DeleteBlocked {
                entity_type: T::LABEL,
                name: record.name().to_owned(),
                linked_games: probe.linked_games,
            })
        }
    }

    /// Delete `key` on the server and drop it from the cached page.
    ///
    /// If that empties a page past the first, the previous page is fetched.
    pub async fn delete(&self, key: &RecordKey) -> Result<Record<T>, CoreError> {
        let record = self.require(key)?;
        let id = require_id::<T>(&record)?;

        if let Err(err) = self.api.delete(T::RESOURCE, id.get()).await {
            return Err(match err {
                catalog_api::Error::Conflict { linked_games, .. } => CoreError::DeleteBlocked {
                    entity_type: T::LABEL,
                    name: record.name().to_owned(),
                    linked_games,
                },
                other => self.surface(other.into()),
            });
        }

        let removed = self.apply(|s| s.remove(key)).unwrap_or(record);
        if let (Some(list), Some(dropdown), Some(id)) = (T::DROPDOWN, &self.dropdown, removed.id) {
            dropdown.remove(list, id.get());
        }
        info!(domain = T::LABEL, %key, "deleted");

        let fallback = self.state.borrow().emptied_page_fallback();
        if let Some(page) = fallback {
            let filters = self.state.borrow().filters.clone();
            if let Err(err) = self.fetch(page, &filters).await {
                warn!(domain = T::LABEL, error = %err, "refetch after delete failed");
            }
        }
        Ok(removed)
    }

    /// Probe, then delete only if the probe allows it.
    pub async fn delete_checked(&self, key: &RecordKey) -> Result<Record<T>, CoreError> {
        self.probe_delete(key).await?;
        self.delete(key).await
    }

    // ── Modal intent ─────────────────────────────────────────────────

    pub fn open_add(&self) {
        self.apply(DomainState::open_add);
    }

    pub fn open_edit(&self, key: &RecordKey) -> Result<(), CoreError> {
        if self.apply(|s| s.open_edit(key)) {
            Ok(())
        } else {
            Err(not_found::<T>(key))
        }
    }

    pub fn close_add_edit(&self) {
        self.apply(DomainState::close_add_edit);
    }

    pub fn open_delete(&self, key: &RecordKey) -> Result<(), CoreError> {
        if self.apply(|s| s.open_delete(key)) {
            Ok(())
        } else {
            Err(not_found::<T>(key))
        }
    }

    pub fn close_delete(&self) {
        self.apply(DomainState::close_delete);
    }

    // ── Session ──────────────────────────────────────────────────────

    /// Apply the logged-out projection. In-flight fetches are discarded
    /// when they resolve.
    pub fn reset(&self) {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        self.apply(|s| s.reset(generation));
    }

    // ── Internals ────────────────────────────────────────────────────

    /// Run `f` against the state as one atomic transition and notify
    /// subscribers.
    fn apply<R: Default>(&self, f: impl FnOnce(&mut DomainState<T>) -> R) -> R {
        let mut output = R::default();
        self.state.send_modify(|state| output = f(Arc::make_mut(state)));
        output
    }

    fn require(&self, key: &RecordKey) -> Result<Record<T>, CoreError> {
        self.get(key).ok_or_else(|| not_found::<T>(key))
    }

    /// Route session failures to the bus before handing the error back.
    fn surface(&self, err: CoreError) -> CoreError {
        if err.is_unauthorized() {
            warn!(domain = T::LABEL, "request unauthorized, invalidating session");
            self.bus.publish(SessionSignal::Unauthorized);
        }
        err
    }

    fn sync_dropdown(&self, record: &Record<T>) {
        if let (Some(list), Some(dropdown), Some(id)) = (T::DROPDOWN, &self.dropdown, record.id) {
            dropdown.upsert(
                list,
                &LookupItem {
                    id: id.get(),
                    name: record.name().to_owned(),
                },
            );
        }
    }
}

impl<T: Membership> DomainCache<T> {
    /// Set the cached membership flag on record `id`, returning its
    /// previous value. `None` if the record is not on the cached page.
    pub(crate) fn set_member_flag(&self, id: EntityId, member: bool) -> Option<bool> {
        self.apply(|s| s.set_member_flag(id, member))
    }

    pub fn is_member(&self, id: EntityId) -> Option<bool> {
        self.state.borrow().find_by_id(id).map(|r| r.view.is_member())
    }
}

fn not_found<T: CatalogEntity>(key: &RecordKey) -> CoreError {
    CoreError::NotFound {
        entity_type: T::LABEL,
        identifier: key.to_string(),
    }
}

fn require_id<T: CatalogEntity>(record: &Record<T>) -> Result<EntityId, CoreError> {
    record.id.ok_or_else(|| not_found::<T>(&record.key))
}

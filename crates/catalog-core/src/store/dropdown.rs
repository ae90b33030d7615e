// ── Shared dropdown lookups ──
//
// Category and provider `{id, name}` lists read by several domains.
// The whole entry (both lists plus timestamp) is swapped atomically, so
// readers never observe a list paired with the wrong timestamp.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use arc_swap::ArcSwap;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

use catalog_api::{CatalogApi, LookupItem, LookupList};

use crate::error::CoreError;
use crate::session::{SessionBus, SessionSignal};

/// One immutable generation of the dropdown cache.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DropdownEntry {
    pub categories: Vec<LookupItem>,
    pub providers: Vec<LookupItem>,
    /// `None` until the first successful refresh, and after invalidation.
    pub fetched_at: Option<Instant>,
}

impl DropdownEntry {
    pub fn list(&self, list: LookupList) -> &[LookupItem] {
        match list {
            LookupList::Categories => &self.categories,
            LookupList::Providers => &self.providers,
        }
    }

    fn list_mut(&mut self, list: LookupList) -> &mut Vec<LookupItem> {
        match list {
            LookupList::Categories => &mut self.categories,
            LookupList::Providers => &mut self.providers,
        }
    }

    /// Fresh iff younger than `ttl` and both lists are non-empty.
    pub fn is_fresh(&self, now: Instant, ttl: Duration) -> bool {
        self.fetched_at
            .is_some_and(|at| now.saturating_duration_since(at) < ttl)
            && !self.categories.is_empty()
            && !self.providers.is_empty()
    }
}

pub struct DropdownCache {
    api: Arc<dyn CatalogApi>,
    bus: SessionBus,
    ttl: Duration,
    entry: ArcSwap<DropdownEntry>,
    loading: AtomicBool,
    /// Bumped by `clear`; a refresh started under an older epoch is discarded.
    epoch: AtomicU64,
    /// Serializes refreshes so concurrent stale readers share one fetch.
    refresh_lock: Mutex<()>,
}

impl DropdownCache {
    pub fn new(api: Arc<dyn CatalogApi>, bus: SessionBus, ttl: Duration) -> Self {
        Self {
            api,
            bus,
            ttl,
            entry: ArcSwap::from_pointee(DropdownEntry::default()),
            loading: AtomicBool::new(false),
            epoch: AtomicU64::new(0),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Current entry without any freshness check.
    pub fn snapshot(&self) -> Arc<DropdownEntry> {
        self.entry.load_full()
    }

    pub fn is_fresh(&self) -> bool {
        self.entry.load().is_fresh(Instant::now(), self.ttl)
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    /// Return the lookups, refetching first if the cached entry is stale.
    ///
    /// On failure the previous entry stays in place.
    pub async fn get(&self) -> Result<Arc<DropdownEntry>, CoreError> {
        let current = self.entry.load_full();
        if current.is_fresh(Instant::now(), self.ttl) {
            return Ok(current);
        }

        let _guard = self.refresh_lock.lock().await;
        // Another caller may have refreshed while we waited.
        let current = self.entry.load_full();
        if current.is_fresh(Instant::now(), self.ttl) {
            return Ok(current);
        }
        self.refresh().await
    }

    async fn refresh(&self) -> Result<Arc<DropdownEntry>, CoreError> {
        let epoch = self.epoch.load(Ordering::Acquire);
        self.loading.store(true, Ordering::Release);
        debug!("refreshing dropdown lookups");

        let result = tokio::try_join!(
            self.api.lookups(LookupList::Categories),
            self.api.lookups(LookupList::Providers),
        );
        self.loading.store(false, Ordering::Release);

        match result {
            Ok(_) if self.epoch.load(Ordering::Acquire) != epoch => {
                debug!("dropdown cache cleared during refresh, discarding lookups");
                Ok(self.entry.load_full())
            }
            Ok((categories, providers)) => {
                let entry = Arc::new(DropdownEntry {
                    categories,
                    providers,
                    fetched_at: Some(Instant::now()),
                });
                self.entry.store(Arc::clone(&entry));
                debug!(
                    categories = entry.categories.len(),
                    providers = entry.providers.len(),
                    "dropdown lookups refreshed"
                );
                Ok(entry)
            }
            Err(err) => {
                let err = CoreError::from(err);
                if err.is_unauthorized() {
                    self.bus.publish(SessionSignal::Unauthorized);
                } else {
                    warn!(error = %err, "dropdown refresh failed, keeping previous lookups");
                }
                Err(err)
            }
        }
    }

    // ── Mutation sync ────────────────────────────────────────────────

    /// Insert or rename `item` in `list`, keeping the timestamp.
    pub fn upsert(&self, list: LookupList, item: &LookupItem) {
        self.entry.rcu(|current| {
            let mut next = DropdownEntry::clone(current);
            let items = next.list_mut(list);
            match items.iter_mut().find(|i| i.id == item.id) {
                Some(existing) => existing.name.clone_from(&item.name),
                None => items.push(item.clone()),
            }
            next
        });
    }

    pub fn remove(&self, list: LookupList, id: i64) {
        self.entry.rcu(|current| {
            let mut next = DropdownEntry::clone(current);
            next.list_mut(list).retain(|i| i.id != id);
            next
        });
    }

    /// Force the next `get` to refetch.
    pub fn invalidate(&self) {
        self.entry.rcu(|current| DropdownEntry {
            fetched_at: None,
            ..DropdownEntry::clone(current)
        });
    }

    /// Drop everything (logged-out projection).
    pub fn clear(&self) {
        self.epoch.fetch_add(1, Ordering::AcqRel);
        self.entry.store(Arc::new(DropdownEntry::default()));
    }
}

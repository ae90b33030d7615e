// ── Central domain store ──
//
// One `DomainCache` per catalog domain plus the shared dropdown lookups.
// Created empty at startup and kept for the life of the process.

use std::sync::Arc;

use catalog_api::CatalogApi;
use tracing::info;

use super::domain::DomainCache;
use super::dropdown::DropdownCache;
use crate::config::StoreConfig;
use crate::model::{Category, ManagerGame, Provider, StoreGame, Tag};
use crate::session::SessionBus;

pub struct DataStore {
    categories: Arc<DomainCache<Category>>,
    providers: Arc<DomainCache<Provider>>,
    store_games: Arc<DomainCache<StoreGame>>,
    manager_games: Arc<DomainCache<ManagerGame>>,
    tags: Arc<DomainCache<Tag>>,
    dropdowns: Arc<DropdownCache>,
}

impl DataStore {
    pub fn new(api: &Arc<dyn CatalogApi>, bus: &SessionBus, config: &StoreConfig) -> Self {
        let dropdowns = Arc::new(DropdownCache::new(
            Arc::clone(api),
            bus.clone(),
            config.dropdown_ttl,
        ));
        let size = config.page_size;

        Self {
            categories: Arc::new(DomainCache::new(
                Arc::clone(api),
                bus.clone(),
                size,
                Some(Arc::clone(&dropdowns)),
            )),
            providers: Arc::new(DomainCache::new(
                Arc::clone(api),
                bus.clone(),
                size,
                Some(Arc::clone(&dropdowns)),
            )),
            store_games: Arc::new(DomainCache::new(Arc::clone(api), bus.clone(), size, None)),
            manager_games: Arc::new(DomainCache::new(Arc::clone(api), bus.clone(), size, None)),
            tags: Arc::new(DomainCache::new(Arc::clone(api), bus.clone(), size, None)),
            dropdowns,
        }
    }

    // ── Domain accessors ─────────────────────────────────────────────

    pub fn categories(&self) -> &Arc<DomainCache<Category>> {
        &self.categories
    }

    pub fn providers(&self) -> &Arc<DomainCache<Provider>> {
        &self.providers
    }

    pub fn store_games(&self) -> &Arc<DomainCache<StoreGame>> {
        &self.store_games
    }

    pub fn manager_games(&self) -> &Arc<DomainCache<ManagerGame>> {
        &self.manager_games
    }

    pub fn tags(&self) -> &Arc<DomainCache<Tag>> {
        &self.tags
    }

    pub fn dropdowns(&self) -> &Arc<DropdownCache> {
        &self.dropdowns
    }

    // ── Session ──────────────────────────────────────────────────────

    /// Reset every domain and drop the dropdown lookups.
    pub fn logout_projection(&self) {
        self.categories.reset();
        self.providers.reset();
        self.store_games.reset();
        self.manager_games.reset();
        self.tags.reset();
        self.dropdowns.clear();
        info!("applied logged-out projection to all domains");
    }
}

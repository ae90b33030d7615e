// ── Per-domain state tree ──
//
// `DomainState` is a plain value mutated only through the transition
// functions below. None of them perform I/O; `DomainCache` owns the
// network calls and applies these transitions atomically through its
// `watch` channel.

use serde::Serialize;
use serde_json::Value;

use crate::model::{CatalogEntity, EntityId, FilterSnapshot, Membership, Record, RecordKey};

// ── Pagination ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Page requested by the client, never derived from `items`.
    pub current_page: u32,
    pub page_size: u32,
    /// Server-reported total across all pages.
    pub total_items: u64,
}

impl Pagination {
    pub fn new(page_size: u32) -> Self {
        Self {
            current_page: 1,
            page_size: page_size.max(1),
            total_items: 0,
        }
    }

    pub fn total_pages(&self) -> u64 {
        self.total_items.div_ceil(u64::from(self.page_size)).max(1)
    }
}

// ── Modal intent ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModalState<T> {
    pub add_edit_open: bool,
    pub delete_open: bool,
    pub editing_item: Option<Record<T>>,
    pub item_to_delete: Option<Record<T>>,
}

impl<T> Default for ModalState<T> {
    fn default() -> Self {
        Self {
            add_edit_open: false,
            delete_open: false,
            editing_item: None,
            item_to_delete: None,
        }
    }
}

// ── Fetch outcome ───────────────────────────────────────────────────

/// What happened to a fetch response when it was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchOutcome {
    /// The response replaced the cached page.
    Applied {
        count: usize,
        total: u64,
        /// Items dropped because the server sent more than a page.
        truncated: usize,
    },
    /// A newer fetch was issued first; the response was discarded.
    #[default]
    Superseded,
}

// ── DomainState ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainState<T> {
    /// One page of records in server response order.
    pub items: Vec<Record<T>>,
    pub pagination: Pagination,
    pub loading: bool,
    pub error: Option<String>,
    pub modals: ModalState<T>,
    /// Filters of the most recently issued fetch.
    pub filters: FilterSnapshot,
    /// Set by the first successful fetch, cleared by `reset`.
    pub populated: bool,
    /// Generation of the most recently issued fetch.
    #[serde(skip)]
    pub(crate) generation: u64,
}

impl<T: CatalogEntity> DomainState<T> {
    pub fn new(page_size: u32) -> Self {
        Self {
            items: Vec::new(),
            pagination: Pagination::new(page_size),
            loading: false,
            error: None,
            modals: ModalState::default(),
            filters: FilterSnapshot::default(),
            populated: false,
            generation: 0,
        }
    }

    // ── Lookups ──────────────────────────────────────────────────────

    pub fn find(&self, key: &RecordKey) -> Option<&Record<T>> {
        self.items.iter().find(|r| &r.key == key)
    }

    pub fn find_by_id(&self, id: EntityId) -> Option<&Record<T>> {
        self.items.iter().find(|r| r.id == Some(id))
    }

    fn position(&self, key: &RecordKey) -> Option<usize> {
        self.items.iter().position(|r| &r.key == key)
    }

    // ── Fetch lifecycle ──────────────────────────────────────────────

    /// Record a newly issued fetch. Later responses are matched against
    /// `generation`.
    pub(crate) fn begin_fetch(&mut self, generation: u64, page: u32, filters: FilterSnapshot) {
        self.generation = generation;
        self.loading = true;
        self.error = None;
        self.pagination.current_page = page.max(1);
        self.filters = filters;
    }

    pub(crate) fn finish_fetch_ok(
        &mut self,
        generation: u64,
        mut items: Vec<Record<T>>,
        total: u64,
    ) -> FetchOutcome {
        if generation != self.generation {
            return FetchOutcome::Superseded;
        }
        let limit = usize::try_from(self.pagination.page_size).unwrap_or(usize::MAX);
        let truncated = items.len().saturating_sub(limit);
        items.truncate(limit);

        self.loading = false;
        self.error = None;
        self.populated = true;
        self.pagination.total_items = total;
        self.items = items;
        FetchOutcome::Applied {
            count: self.items.len(),
            total,
            truncated,
        }
    }

    /// Apply a failed fetch. `message` is `None` for failures handled
    /// elsewhere (expired sessions), which only clear `loading`. Cached
    /// items are kept.
    pub(crate) fn finish_fetch_err(&mut self, generation: u64, message: Option<String>) -> bool {
        if generation != self.generation {
            return false;
        }
        self.loading = false;
        self.error = message;
        true
    }

    // ── Confirmed mutations ──────────────────────────────────────────

    pub(crate) fn insert_created(&mut self, record: Record<T>) {
        self.items.push(record);
        self.pagination.total_items += 1;
    }

    /// Overwrite the record at `key`. Returns `false` if it is no longer cached.
    pub(crate) fn apply_update(&mut self, key: &RecordKey, record: Record<T>) -> bool {
        let Some(pos) = self.position(key) else {
            return false;
        };
        if self
            .modals
            .item_to_delete
            .as_ref()
            .is_some_and(|r| &r.key == key)
        {
            self.modals.item_to_delete = Some(record.clone());
        }
        self.items[pos] = record;
        true
    }

    pub(crate) fn remove(&mut self, key: &RecordKey) -> Option<Record<T>> {
        let pos = self.position(key)?;
        let removed = self.items.remove(pos);
        self.pagination.total_items = self.pagination.total_items.saturating_sub(1);

        if self
            .modals
            .item_to_delete
            .as_ref()
            .is_some_and(|r| &r.key == key)
        {
            self.modals.item_to_delete = None;
            self.modals.delete_open = false;
        }
        if self
            .modals
            .editing_item
            .as_ref()
            .is_some_and(|r| &r.key == key)
        {
            self.modals.editing_item = None;
            self.modals.add_edit_open = false;
        }
        Some(removed)
    }

    /// Page to step back to when the current page (> 1) was just emptied.
    pub fn emptied_page_fallback(&self) -> Option<u32> {
        (self.items.is_empty() && self.pagination.current_page > 1)
            .then(|| self.pagination.current_page - 1)
    }

    pub(crate) fn set_page(&mut self, page: u32) {
        self.pagination.current_page = page.max(1);
    }

    // ── Modals ───────────────────────────────────────────────────────

    pub(crate) fn open_add(&mut self) {
        self.modals.add_edit_open = true;
        self.modals.editing_item = None;
    }

    pub(crate) fn open_edit(&mut self, key: &RecordKey) -> bool {
        let Some(record) = self.find(key).cloned() else {
            return false;
        };
        self.modals.add_edit_open = true;
        self.modals.editing_item = Some(record);
        true
    }

    pub(crate) fn close_add_edit(&mut self) {
        self.modals.add_edit_open = false;
        self.modals.editing_item = None;
    }

    pub(crate) fn open_delete(&mut self, key: &RecordKey) -> bool {
        let Some(record) = self.find(key).cloned() else {
            return false;
        };
        self.modals.delete_open = true;
        self.modals.item_to_delete = Some(record);
        true
    }

    pub(crate) fn close_delete(&mut self) {
        self.modals.delete_open = false;
        self.modals.item_to_delete = None;
    }

    // ── Session ──────────────────────────────────────────────────────

    /// Logged-out projection. Any fetch issued before `generation` is
    /// discarded when it resolves.
    pub(crate) fn reset(&mut self, generation: u64) {
        *self = Self::new(self.pagination.page_size);
        self.generation = generation;
    }
}

impl<T: Membership> DomainState<T> {
    /// Set the membership flag on the cached record with server id `id`,
    /// in both the view and `full_data`. Returns the previous value, or
    /// `None` if the record is not on the current page.
    pub(crate) fn set_member_flag(&mut self, id: EntityId, member: bool) -> Option<bool> {
        let record = self.items.iter_mut().find(|r| r.id == Some(id))?;
        let previous = record.view.is_member();
        record.view.set_member(member);
        record
            .full_data
            .insert(T::FLAG_FIELD.to_owned(), Value::Bool(member));
        Some(previous)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::model::{Category, StoreGame};

    fn category(id: i64, name: &str) -> Record<Category> {
        Record::from_server(json!({ "id": id, "name": name })).unwrap()
    }

    fn page(ids: std::ops::RangeInclusive<i64>) -> Vec<Record<Category>> {
        ids.map(|i| category(i, &format!("c{i}"))).collect()
    }

    #[test]
    fn stale_generation_is_discarded() {
        let mut state = DomainState::<Category>::new(20);
        state.begin_fetch(1, 1, FilterSnapshot::default());
        state.begin_fetch(2, 1, FilterSnapshot::default());

        assert_eq!(state.finish_fetch_ok(1, page(1..=3), 3), FetchOutcome::Superseded);
        assert!(state.loading);
        assert!(state.items.is_empty());

        let outcome = state.finish_fetch_ok(2, page(1..=2), 2);
        assert!(matches!(outcome, FetchOutcome::Applied { count: 2, .. }));
        assert!(!state.loading);
    }

    #[test]
    fn oversized_page_is_truncated() {
        let mut state = DomainState::<Category>::new(5);
        state.begin_fetch(1, 1, FilterSnapshot::default());
        let outcome = state.finish_fetch_ok(1, page(1..=8), 40);
        assert_eq!(
            outcome,
            FetchOutcome::Applied {
                count: 5,
                total: 40,
                truncated: 3
            }
        );
        assert_eq!(state.pagination.total_items, 40);
        assert_eq!(state.pagination.total_pages(), 8);
    }

    #[test]
    fn failed_fetch_keeps_items() {
        let mut state = DomainState::<Category>::new(20);
        state.begin_fetch(1, 1, FilterSnapshot::default());
        state.finish_fetch_ok(1, page(1..=2), 2);

        state.begin_fetch(2, 2, FilterSnapshot::default());
        assert!(state.error.is_none());
        assert!(state.finish_fetch_err(2, Some("boom".into())));
        assert_eq!(state.items.len(), 2);
        assert_eq!(state.error.as_deref(), Some("boom"));
        assert_eq!(state.pagination.current_page, 2);
    }

    #[test]
    fn remove_clears_matching_delete_modal() {
        let mut state = DomainState::<Category>::new(20);
        state.begin_fetch(1, 1, FilterSnapshot::default());
        state.finish_fetch_ok(1, page(1..=2), 2);

        let key = state.items[0].key.clone();
        assert!(state.open_delete(&key));
        state.remove(&key).unwrap();

        assert!(!state.modals.delete_open);
        assert!(state.modals.item_to_delete.is_none());
        assert_eq!(state.pagination.total_items, 1);
    }

    #[test]
    fn emptied_page_steps_back() {
        let mut state = DomainState::<Category>::new(20);
        state.begin_fetch(1, 3, FilterSnapshot::default());
        state.finish_fetch_ok(1, page(41..=41), 41);
        let key = state.items[0].key.clone();
        state.remove(&key);
        assert_eq!(state.emptied_page_fallback(), Some(2));
    }

    #[test]
    fn reset_discards_in_flight_fetch() {
        let mut state = DomainState::<Category>::new(20);
        state.begin_fetch(1, 1, FilterSnapshot::default());
        state.finish_fetch_ok(1, page(1..=2), 2);
        state.begin_fetch(2, 1, FilterSnapshot::default());

        state.reset(3);
        assert!(!state.populated);
        assert_eq!(state.finish_fetch_ok(2, page(1..=2), 2), FetchOutcome::Superseded);
        assert!(state.items.is_empty());
        assert_eq!(state.pagination.page_size, 20);
    }

    #[test]
    fn member_flag_updates_view_and_full_data() {
        let mut state = DomainState::<StoreGame>::new(20);
        let rec = Record::from_server(json!({ "id": 9, "name": "Sol", "inManager": false })).unwrap();
        state.begin_fetch(1, 1, FilterSnapshot::default());
        state.finish_fetch_ok(1, vec![rec], 1);

        assert_eq!(state.set_member_flag(EntityId::new(9), true), Some(false));
        let rec = state.find_by_id(EntityId::new(9)).unwrap();
        assert!(rec.view.in_manager);
        assert_eq!(rec.full_data["inManager"], true);
        assert_eq!(state.set_member_flag(EntityId::new(10), true), None);
    }
}

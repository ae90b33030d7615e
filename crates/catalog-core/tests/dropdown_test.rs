#![allow(clippy::unwrap_used)]

mod support;

use std::time::Duration;

use tokio::time::advance;

use catalog_api::{Error, LookupList};
use catalog_core::config::DEFAULT_DROPDOWN_TTL;

use support::{FakeApi, Op, catalog, lookup};

const MS: Duration = Duration::from_millis(1);

fn lookups_api() -> std::sync::Arc<FakeApi> {
    let api = FakeApi::new();
    api.set_lookups(LookupList::Categories, vec![lookup(1, "Slots")]);
    api.set_lookups(LookupList::Providers, vec![lookup(7, "NetEnt")]);
    api
}

#[tokio::test(start_paused = true)]
async fn refetches_only_after_ttl() {
    let api = lookups_api();
    let catalog = catalog(&api, 20);
    let dropdowns = catalog.store().dropdowns();

    dropdowns.get().await.unwrap();
    assert_eq!(api.calls(Op::Lookups), 2);

    advance(DEFAULT_DROPDOWN_TTL - MS).await;
    dropdowns.get().await.unwrap();
    assert_eq!(api.calls(Op::Lookups), 2);

    advance(2 * MS).await;
    dropdowns.get().await.unwrap();
    assert_eq!(api.calls(Op::Lookups), 4);
}

#[tokio::test(start_paused = true)]
async fn empty_list_is_never_fresh() {
    let api = FakeApi::new();
    api.set_lookups(LookupList::Categories, vec![lookup(1, "Slots")]);
    let catalog = catalog(&api, 20);
    let dropdowns = catalog.store().dropdowns();

    dropdowns.get().await.unwrap();
    dropdowns.get().await.unwrap();
    assert_eq!(api.calls(Op::Lookups), 4);
}

#[tokio::test(start_paused = true)]
async fn concurrent_stale_readers_share_one_refresh() {
    let api = lookups_api();
    let catalog = catalog(&api, 20);
    let dropdowns = catalog.store().dropdowns();

    let (a, b, c) = tokio::join!(dropdowns.get(), dropdowns.get(), dropdowns.get());
    assert!(a.is_ok() && b.is_ok() && c.is_ok());
    assert_eq!(api.calls(Op::Lookups), 2);
}

#[tokio::test(start_paused = true)]
async fn failed_refresh_keeps_previous_entry() {
    let api = lookups_api();
    let catalog = catalog(&api, 20);
    let dropdowns = catalog.store().dropdowns();
    dropdowns.get().await.unwrap();

    advance(DEFAULT_DROPDOWN_TTL + MS).await;
    api.fail_next(Op::Lookups, Error::from_status(502, ""));
    assert!(dropdowns.get().await.is_err());

    let entry = dropdowns.snapshot();
    assert_eq!(entry.categories, vec![lookup(1, "Slots")]);
    assert!(!dropdowns.is_loading());
}

#[tokio::test(start_paused = true)]
async fn deleting_a_provider_removes_its_lookup() {
    let api = lookups_api();
    api.seed(
        catalog_api::Resource::Providers,
        vec![serde_json::json!({ "id": 7, "name": "NetEnt" })],
    );
    let catalog = catalog(&api, 20);
    let providers = catalog.store().providers();
    let dropdowns = catalog.store().dropdowns();
    dropdowns.get().await.unwrap();
    providers
        .fetch(1, &catalog_core::FilterSnapshot::default())
        .await
        .unwrap();

    providers
        .delete(&catalog_core::RecordKey::from("provider:7"))
        .await
        .unwrap();
    assert!(dropdowns.snapshot().providers.is_empty());
    assert!(!dropdowns.is_fresh());
}

#[tokio::test(start_paused = true)]
async fn clear_during_refresh_discards_old_lookups() {
    let api = lookups_api();
    api.delay_next_lookups(100 * MS);
    let catalog = catalog(&api, 20);
    let dropdowns = std::sync::Arc::clone(catalog.store().dropdowns());

    let pending = tokio::spawn({
        let dropdowns = std::sync::Arc::clone(&dropdowns);
        async move { dropdowns.get().await }
    });
    tokio::task::yield_now().await;
    assert!(dropdowns.is_loading());

    catalog.store().logout_projection();
    let returned = pending.await.unwrap().unwrap();

    assert!(returned.categories.is_empty());
    assert!(dropdowns.snapshot().categories.is_empty());
    assert!(!dropdowns.is_fresh());
}

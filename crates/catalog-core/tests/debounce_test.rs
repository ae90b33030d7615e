#![allow(clippy::unwrap_used)]

mod support;

use std::time::Duration;

use tokio::time::sleep;

use catalog_api::Resource;
use catalog_core::FilterEdit;

use support::{FakeApi, catalog, game};

fn games_api() -> std::sync::Arc<FakeApi> {
    let api = FakeApi::new();
    api.seed(
        Resource::StoreGames,
        vec![
            game(1, "Book of Ra", false),
            game(2, "Book of Dead", true),
            game(3, "Starburst", false),
        ],
    );
    api
}

#[tokio::test(start_paused = true)]
async fn burst_of_edits_collapses_into_one_fetch() {
    let api = games_api();
    let catalog = catalog(&api, 20);
    let pipeline = catalog.filter_pipeline(catalog.store().store_games());

    for text in ["b", "bo", "boo", "book"] {
        pipeline.edit(FilterEdit::Search(text.into())).await.unwrap();
        sleep(Duration::from_millis(100)).await;
    }
    assert_eq!(api.calls_to(support::Op::List, Resource::StoreGames), 0);

    sleep(Duration::from_millis(400)).await;
    assert_eq!(api.calls_to(support::Op::List, Resource::StoreGames), 1);

    let query = api.last_query().unwrap();
    assert_eq!(query.search.as_deref(), Some("book"));
    assert_eq!(query.page, 1);
    assert_eq!(catalog.store().store_games().snapshot().items.len(), 2);
    assert_eq!(pipeline.applied().search.as_deref(), Some("book"));
}

#[tokio::test(start_paused = true)]
async fn burst_ending_on_applied_snapshot_fetches_nothing() {
    let api = games_api();
    let catalog = catalog(&api, 20);
    let pipeline = catalog.filter_pipeline(catalog.store().store_games());

    pipeline.edit(FilterEdit::Search("star".into())).await.unwrap();
    sleep(Duration::from_millis(50)).await;
    pipeline
        .edit(FilterEdit::Category(Some("4".into())))
        .await
        .unwrap();
    sleep(Duration::from_millis(50)).await;
    pipeline.edit(FilterEdit::Search(String::new())).await.unwrap();
    pipeline
        .edit(FilterEdit::Category(Some("All".into())))
        .await
        .unwrap();

    sleep(Duration::from_secs(1)).await;
    assert_eq!(api.calls(support::Op::List), 0);
}

#[tokio::test(start_paused = true)]
async fn semantically_equal_edit_does_not_restart_timer() {
    let api = games_api();
    let catalog = catalog(&api, 20);
    let pipeline = catalog.filter_pipeline(catalog.store().store_games());

    pipeline
        .edit(FilterEdit::Tags(vec!["2".into(), "1".into()]))
        .await
        .unwrap();
    sleep(Duration::from_millis(200)).await;
    pipeline
        .edit(FilterEdit::Tags(vec!["1".into(), "2".into(), "2".into()]))
        .await
        .unwrap();

    // deadline is still 300ms after the first edit
    sleep(Duration::from_millis(150)).await;
    assert_eq!(api.calls(support::Op::List), 1);
    assert_eq!(api.last_query().unwrap().tag_ids, vec![1, 2]);
}

#[tokio::test(start_paused = true)]
async fn explicit_search_bypasses_quiet_period() {
    let api = games_api();
    let catalog = catalog(&api, 20);
    let pipeline = catalog.filter_pipeline(catalog.store().store_games());

    pipeline.edit(FilterEdit::Search("star".into())).await.unwrap();
    pipeline.search().await.unwrap();
    sleep(Duration::from_millis(1)).await;
    assert_eq!(api.calls(support::Op::List), 1);

    sleep(Duration::from_secs(1)).await;
    assert_eq!(api.calls(support::Op::List), 1);
}

#[tokio::test(start_paused = true)]
async fn settled_change_resets_to_first_page() {
    let api = games_api();
    let catalog = catalog(&api, 1);
    let games = catalog.store().store_games();
    games.fetch(3, &catalog_core::FilterSnapshot::default()).await.unwrap();
    assert_eq!(games.snapshot().pagination.current_page, 3);

    let pipeline = catalog.filter_pipeline(games);
    pipeline.edit(FilterEdit::Search("book".into())).await.unwrap();
    sleep(Duration::from_millis(350)).await;

    assert_eq!(games.snapshot().pagination.current_page, 1);
    assert_eq!(games.snapshot().pagination.total_items, 2);
    pipeline.shutdown().await;
}

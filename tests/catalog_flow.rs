//! End-to-end list view behaviour against an in-process catalog
//!
//! Drives `CatalogSession` the way the terminal front end does and checks the
//! paging, category, favorites and detail contracts.

use std::sync::Arc;

use pokedex::catalog::{Completion, FetchTicket, Transition};
use pokedex::{
    CatalogError, CatalogFetcher, CatalogSession, Category, DetailView, DispatchOutcome,
    EntityRef, FavoriteSet, FavoritesStore, FileKeyValueStore, FixtureApi, FixtureCatalog,
    KeyValueStore, MemoryKeyValueStore, ViewEvent, ViewState, VisibleEntry,
};

const FIRE: [u32; 12] = [4, 5, 6, 37, 38, 58, 59, 77, 78, 126, 136, 146];

fn kanto() -> FixtureCatalog {
    let mut catalog = FixtureCatalog::new();
    for id in 1..=151 {
        let types: &[&str] = if FIRE.contains(&id) { &["fire"] } else { &["normal"] };
        catalog = catalog.with_entity(id, &format!("entity-{}", id), types);
    }
    catalog
        .with_category(Category::Fire, &FIRE)
        .with_category(Category::Electric, &[25, 26, 81, 82, 100, 101, 125, 135, 145])
}

fn ids(refs: &[EntityRef]) -> Vec<u32> {
    refs.iter().filter_map(EntityRef::id).collect()
}

fn expect_ticket(transition: Transition) -> FetchTicket {
    match transition {
        Transition::Fetch(ticket) => ticket,
        other => panic!("expected a fetch, got {:?}", other),
    }
}

#[tokio::test]
async fn first_page_is_ids_one_to_twenty_in_order() {
    let session =
        CatalogSession::start(FixtureApi::new(kanto()), MemoryKeyValueStore::new(), 20).await;

    assert_eq!(ids(session.view().loaded_entities()), (1..=20).collect::<Vec<_>>());
    assert_eq!(session.view().cursor(), 0);
    assert!(!session.view().is_loading());
}

#[tokio::test]
async fn load_more_appends_following_page() {
    let mut session =
        CatalogSession::start(FixtureApi::new(kanto()), MemoryKeyValueStore::new(), 20).await;

    session.dispatch(ViewEvent::LoadMore).await;
    session.dispatch(ViewEvent::LoadMore).await;

    assert_eq!(session.view().cursor(), 40);
    assert_eq!(ids(session.view().loaded_entities()), (1..=60).collect::<Vec<_>>());
}

#[tokio::test]
async fn paging_stops_at_end_of_catalog() {
    let mut session =
        CatalogSession::start(FixtureApi::new(kanto()), MemoryKeyValueStore::new(), 50).await;

    for _ in 0..3 {
        session.dispatch(ViewEvent::LoadMore).await;
    }
    assert_eq!(session.view().loaded_entities().len(), 151);
    assert!(!session.view().has_more());
    assert_eq!(
        session.dispatch(ViewEvent::LoadMore).await,
        DispatchOutcome::Ignored("end of catalog reached")
    );
}

#[tokio::test]
async fn category_returns_full_membership_regardless_of_cursor() {
    let mut session =
        CatalogSession::start(FixtureApi::new(kanto()), MemoryKeyValueStore::new(), 5).await;
    session.dispatch(ViewEvent::LoadMore).await;
    session.dispatch(ViewEvent::LoadMore).await;
    assert_eq!(session.view().cursor(), 10);

    let outcome = session
        .dispatch(ViewEvent::SelectCategory(Category::Fire))
        .await;

    assert_eq!(
        outcome,
        DispatchOutcome::Fetched(Completion::Applied { received: FIRE.len() })
    );
    assert_eq!(session.view().cursor(), 0);
    assert_eq!(ids(session.view().loaded_entities()), FIRE.to_vec());
}

#[tokio::test]
async fn switching_categories_replaces_rather_than_appends() {
    let mut session =
        CatalogSession::start(FixtureApi::new(kanto()), MemoryKeyValueStore::new(), 20).await;

    session.dispatch(ViewEvent::SelectCategory(Category::Fire)).await;
    session
        .dispatch(ViewEvent::SelectCategory(Category::Electric))
        .await;
    assert_eq!(session.view().loaded_entities().len(), 9);
    assert_eq!(session.view().active_category(), Some(Category::Electric));

    session.dispatch(ViewEvent::ClearCategory).await;
    assert_eq!(session.view().cursor(), 0);
    assert_eq!(ids(session.view().loaded_entities()), (1..=20).collect::<Vec<_>>());
}

#[tokio::test]
async fn stale_page_cannot_overwrite_newer_category() {
    let api = FixtureApi::new(kanto());
    let fetcher = CatalogFetcher::new(&api);
    let mut view = ViewState::new(20);

    let initial = view.begin_initial();
    let first = fetcher.fetch_page(initial.cursor, initial.page_size, initial.category).await;
    view.complete(initial, first);

    // Page 2 is requested, then the user picks a category before it lands.
    let page_two = expect_ticket(view.begin(ViewEvent::LoadMore));
    let fire = expect_ticket(view.begin(ViewEvent::SelectCategory(Category::Fire)));

    let fire_result = fetcher.fetch_page(fire.cursor, fire.page_size, fire.category).await;
    let page_result = fetcher
        .fetch_page(page_two.cursor, page_two.page_size, page_two.category)
        .await;

    assert_eq!(view.complete(fire, fire_result), Completion::Applied { received: FIRE.len() });
    assert_eq!(view.complete(page_two, page_result), Completion::Stale);
    assert_eq!(ids(view.loaded_entities()), FIRE.to_vec());
    assert_eq!(view.cursor(), 0);
}

#[tokio::test]
async fn failed_fetch_preserves_displayed_list() {
    let mut session =
        CatalogSession::start(FixtureApi::new(kanto()), MemoryKeyValueStore::new(), 20).await;
    session.api().set_list_failure(true);

    let outcome = session
        .dispatch(ViewEvent::SelectCategory(Category::Fire))
        .await;

    assert_eq!(outcome, DispatchOutcome::Fetched(Completion::Failed));
    assert_eq!(session.view().active_category(), None);
    assert_eq!(ids(session.view().loaded_entities()), (1..=20).collect::<Vec<_>>());
    assert!(!session.view().is_loading());
    assert!(session.view().last_error().is_some());
}

#[tokio::test]
async fn toggled_favorite_survives_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");

    let mut session =
        CatalogSession::start(FixtureApi::new(kanto()), FileKeyValueStore::new(&path), 20).await;
    assert!(session.favorites().is_empty());
    assert!(session.toggle_favorite(25).unwrap());

    let reloaded = FavoritesStore::new(FileKeyValueStore::new(&path)).load();
    assert_eq!(reloaded, FavoriteSet::from_iter([25]));
}

#[tokio::test]
async fn malformed_store_starts_empty() {
    let store = Arc::new(MemoryKeyValueStore::with_slot("favorites", "not json at all"));
    let session = CatalogSession::start(FixtureApi::new(kanto()), store.clone(), 20).await;

    assert!(session.favorites().is_empty());
    assert!(matches!(
        FavoritesStore::new(store).load_checked(),
        Err(CatalogError::MalformedStore { .. })
    ));
}

#[tokio::test]
async fn favorites_only_view_shows_details_for_favorites() {
    let store = Arc::new(MemoryKeyValueStore::with_slot("favorites", "[146, 25, 25, 4]"));
    let api = FixtureApi::new(kanto()).failing_detail(146);
    let mut session = CatalogSession::start(api, store.clone(), 20).await;

    session.dispatch(ViewEvent::ToggleFavoritesOnly).await;
    let rows = session.visible().await;

    let shown: Vec<_> = rows.iter().filter_map(VisibleEntry::id).collect();
    assert_eq!(shown, vec![4, 25]);
    assert!(rows.iter().all(|r| matches!(r, VisibleEntry::Detail(_))));
    assert_eq!(session.view().loaded_entities().len(), 20);

    session.dispatch(ViewEvent::ToggleFavoritesOnly).await;
    assert_eq!(session.visible().await.len(), 20);
    assert_eq!(store.get("favorites").unwrap().as_deref(), Some("[146, 25, 25, 4]"));
}

#[tokio::test]
async fn unknown_detail_id_is_not_found() {
    let api = FixtureApi::new(kanto());
    let err = DetailView::new(&api).get_detail(99999).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn detail_without_relationship_data_still_opens() {
    let api = FixtureApi::new(kanto());
    let page = DetailView::new(&api).open(25).await.unwrap();
    assert_eq!(page.detail.id, 25);
    assert!(page.levels.is_empty());
}

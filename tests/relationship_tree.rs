//! Relationship levels built from the bundled fixture catalog
//! (`tests/fixtures/catalog.json`, the same format `--offline` reads).

use pokedex::{Category, DetailView, FixtureApi, PokeApi, RelationshipLevel, RelationshipTreeBuilder};

fn fixture_api() -> FixtureApi {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/catalog.json");
    FixtureApi::from_json_file(path).expect("fixture catalog loads")
}

fn names(levels: &[RelationshipLevel]) -> Vec<Vec<&str>> {
    levels.iter().map(RelationshipLevel::names).collect()
}

#[tokio::test]
async fn entity_without_evolutions_is_single_level() {
    let api = fixture_api();
    let levels = RelationshipTreeBuilder::new(&api).build_tree("tauros").await;

    assert_eq!(names(&levels), vec![vec!["tauros"]]);
    assert_eq!(levels[0].depth, 0);
}

#[tokio::test]
async fn split_evolution_shares_one_level() {
    let api = fixture_api();
    let levels = RelationshipTreeBuilder::new(&api).build_tree("jolteon").await;

    assert_eq!(
        names(&levels),
        vec![vec!["eevee"], vec!["vaporeon", "jolteon", "flareon"]]
    );
    assert!(levels[1].members[2].image_url.ends_with("/136.png"));
}

#[tokio::test]
async fn chain_root_may_be_outside_the_catalog() {
    let api = fixture_api();
    let levels = RelationshipTreeBuilder::new(&api).build_tree("pikachu").await;

    assert_eq!(
        names(&levels),
        vec![vec!["pichu"], vec!["pikachu"], vec!["raichu"]]
    );
}

#[tokio::test]
async fn unknown_species_yields_empty_levels() {
    let api = fixture_api();
    assert!(RelationshipTreeBuilder::new(&api)
        .build_tree("missingno")
        .await
        .is_empty());
}

#[tokio::test]
async fn detail_page_carries_levels() {
    let api = fixture_api();
    let page = DetailView::new(&api).open_route("5").await.unwrap();

    assert_eq!(page.detail.name, "charmeleon");
    assert_eq!(page.detail.types, vec!["fire"]);
    assert_eq!(
        names(&page.levels),
        vec![vec!["charmander"], vec!["charmeleon"], vec!["charizard"]]
    );
}

#[tokio::test]
async fn fixture_category_listing_is_complete() {
    let api = fixture_api();
    let fire = api.category_members(Category::Fire).await.unwrap();
    let names: Vec<_> = fire.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["charmander", "charmeleon", "charizard", "vulpix", "ninetales", "flareon"]
    );
}

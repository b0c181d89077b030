// ABOUTME: Integration tests for merged recipe search: name plus ingredient-shadow matches
// ABOUTME: De-duplication, name-first ordering, result cap, and dish-type filtering
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Toque.dev
#![allow(clippy::unwrap_used)]

mod common;

use serde_json::json;
use toque_api_server::constants::tables;
use toque_api_server::services::SearchMerger;
use toque_api_server::store::RecordStore;

use common::{field_map, seed_ingredient, seed_join, test_store};

async fn seed_typed_recipe(
    store: &dyn RecordStore,
    name: &str,
    dish_type: &str,
) -> String {
    let created = store
        .create(
            tables::RECIPES,
            vec![field_map(json!({"Name": name, "DishType": dish_type}))],
        )
        .await
        .unwrap();
    created[0].id.clone()
}

#[tokio::test]
async fn test_name_and_ingredient_matches_merge_with_name_first() {
    let store = test_store();
    let by_name = seed_typed_recipe(store.as_ref(), "Poulet rôti", "Plat").await;
    let by_ingredient = seed_typed_recipe(store.as_ref(), "Riz sauté", "Plat").await;
    seed_typed_recipe(store.as_ref(), "Tarte aux pommes", "Dessert").await;

    let chicken = seed_ingredient(store.as_ref(), json!({"Name": "Blanc de poulet"})).await;
    seed_join(
        store.as_ref(),
        Some(&by_ingredient),
        &chicken,
        200.0,
        "g",
        "Blanc de poulet",
    )
    .await;

    let merger = SearchMerger::new(store);
    let hits = merger.search("poulet", None).await.unwrap();

    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].id, by_name);
    assert_eq!(hits[1].id, by_ingredient);
}

#[tokio::test]
async fn test_recipe_matching_both_ways_appears_once() {
    let store = test_store();
    let recipe = seed_typed_recipe(store.as_ref(), "Curry de poulet", "Plat").await;
    let chicken = seed_ingredient(store.as_ref(), json!({"Name": "Poulet fermier"})).await;
    seed_join(
        store.as_ref(),
        Some(&recipe),
        &chicken,
        300.0,
        "g",
        "Poulet fermier",
    )
    .await;

    let merger = SearchMerger::new(store);
    let hits = merger.search("poulet", None).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, recipe);
}

#[tokio::test]
async fn test_merged_results_cap_at_ten() {
    let store = test_store();
    for i in 0..14 {
        seed_typed_recipe(store.as_ref(), &format!("Salade niçoise {i}"), "Entrée").await;
    }

    let merger = SearchMerger::new(store);
    let hits = merger.search("salade", None).await.unwrap();
    assert_eq!(hits.len(), 10);
}

#[tokio::test]
async fn test_dish_type_filter_applies_only_for_known_values() {
    let store = test_store();
    seed_typed_recipe(store.as_ref(), "Gaspacho", "Entrée").await;
    seed_typed_recipe(store.as_ref(), "Gaspacho royal", "Plat").await;

    let merger = SearchMerger::new(store);

    let entrees = merger.search("gaspacho", Some("Entrée")).await.unwrap();
    assert_eq!(entrees.len(), 1);
    assert_eq!(entrees[0].dish_type.as_deref(), Some("Entrée"));

    // an unrecognized type is silently ignored: no filtering at all
    let all = merger.search("gaspacho", Some("Brunch")).await.unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn test_blank_query_returns_nothing() {
    let store = test_store();
    seed_typed_recipe(store.as_ref(), "Quiche", "Plat").await;

    let merger = SearchMerger::new(store);
    let hits = merger.search("   ", None).await.unwrap();
    assert!(hits.is_empty());
}

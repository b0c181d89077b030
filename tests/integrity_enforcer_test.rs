// ABOUTME: Integration tests for referential integrity: blocked deletes and cascades
// ABOUTME: Verifies destroy batching stays within the store's bulk limit
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Toque.dev
#![allow(clippy::unwrap_used)]

mod common;

use serde_json::{json, Value};
use toque_api_server::constants::tables;
use toque_api_server::errors::ErrorCode;
use toque_api_server::services::IntegrityEnforcer;
use toque_api_server::store::RecordStore;

use common::{field_map, seed_ingredient, seed_join, seed_recipe, test_store};

#[tokio::test]
async fn test_ingredient_delete_blocked_while_a_recipe_uses_it() {
    let store = test_store();
    let recipe = seed_recipe(store.as_ref(), "Gratin").await;
    let ingredient = seed_ingredient(store.as_ref(), json!({"Name": "Pomme de terre"})).await;
    let join = seed_join(
        store.as_ref(),
        Some(&recipe),
        &ingredient,
        500.0,
        "g",
        "Pomme de terre",
    )
    .await;

    let enforcer = IntegrityEnforcer::new(store.clone());
    assert!(!enforcer.can_delete_ingredient(&ingredient).await.unwrap());
    let err = enforcer
        .ensure_ingredient_deletable(&ingredient)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::IntegrityViolation);

    // clearing the join's recipe link releases the ingredient
    store
        .update(
            tables::RECIPE_ITEMS,
            &join,
            field_map(json!({ "Recipe": Value::Array(vec![]) })),
        )
        .await
        .unwrap();
    assert!(enforcer.can_delete_ingredient(&ingredient).await.unwrap());
    enforcer
        .ensure_ingredient_deletable(&ingredient)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_cascade_delete_removes_every_referencing_join() {
    let store = test_store();
    let recipe = seed_recipe(store.as_ref(), "Ratatouille").await;
    let other_recipe = seed_recipe(store.as_ref(), "Soupe").await;
    let ingredient = seed_ingredient(store.as_ref(), json!({"Name": "Courgette"})).await;

    // 12 joins force two destroy batches under the store's limit of 10
    for i in 0..12 {
        seed_join(
            store.as_ref(),
            Some(&recipe),
            &ingredient,
            f64::from(i + 1),
            "g",
            "Courgette",
        )
        .await;
    }
    let unrelated = seed_join(
        store.as_ref(),
        Some(&other_recipe),
        &ingredient,
        1.0,
        "g",
        "Courgette",
    )
    .await;

    let enforcer = IntegrityEnforcer::new(store.clone());
    enforcer.cascade_delete_recipe(&recipe).await.unwrap();

    // the recipe is gone and no join references it anymore
    assert!(store.find(tables::RECIPES, &recipe).await.is_err());
    let remaining = store.dump(tables::RECIPE_ITEMS).await;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, unrelated);

    // every destroy batch respected the bulk limit
    let batches = store.destroy_batch_sizes().await;
    assert!(batches.iter().all(|&size| size <= 10));
    assert_eq!(batches.iter().sum::<usize>(), 12 + 1); // joins + the recipe itself
}

#[tokio::test]
async fn test_ingredient_with_only_orphan_joins_is_deletable() {
    let store = test_store();
    let ingredient = seed_ingredient(store.as_ref(), json!({"Name": "Basilic"})).await;
    // join record with no recipe link (mid-write leftover)
    seed_join(store.as_ref(), None, &ingredient, 5.0, "g", "Basilic").await;

    let enforcer = IntegrityEnforcer::new(store.clone());
    assert!(enforcer.can_delete_ingredient(&ingredient).await.unwrap());
}

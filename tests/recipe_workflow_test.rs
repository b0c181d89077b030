// ABOUTME: End-to-end tests of the recipe write sagas against the in-memory store
// ABOUTME: Create with compensation, update join replacement, detail assembly, AI generation
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Toque.dev
#![allow(clippy::unwrap_used)]

mod common;

use std::sync::Arc;

use serde_json::json;
use toque_api_server::constants::{fields, ids, tables};
use toque_api_server::errors::ErrorCode;
use toque_api_server::models::{RecipeDraft, RecipeInput};
use toque_api_server::services::RecipeService;
use toque_api_server::store::RecordStore;

use common::{seed_ingredient, test_store, FailingStore, StubAdvisor};

fn recipe_input(value: serde_json::Value) -> RecipeInput {
    serde_json::from_value(value).unwrap()
}

#[tokio::test]
async fn test_create_persists_join_set_and_derived_totals() {
    let store = test_store();
    seed_ingredient(
        store.as_ref(),
        json!({"Name": "Farine", "Calories": 364.0, "Proteines": 10.0, "Glucides": 76.0, "Lipides": 1.0, "Vitamines": "B1, B9", "Mineraux": "Fer"}),
    )
    .await;
    seed_ingredient(
        store.as_ref(),
        json!({"Name": "Lait", "Calories": 42.0, "Proteines": 3.4, "Glucides": 5.0, "Lipides": 1.0, "Unit": "mL", "Vitamines": "B12, D", "Mineraux": "Calcium"}),
    )
    .await;

    let service = RecipeService::new(store.clone(), Arc::new(StubAdvisor::default()));
    let summary = service
        .create(recipe_input(json!({
            "Name": "Crêpes",
            "Instructions": "Mélanger puis cuire.",
            "Servings": 4,
            "DishType": "Dessert",
            "IngredientsDetails": [
                {"Nom": "Farine", "Quantite": 250.0, "Unite": "g"},
                {"Nom": "Lait", "Quantite": 0.5, "Unite": "L"},
            ],
        })))
        .await
        .unwrap();

    // 364*2.5 + 42*5 = 910 + 210
    assert!((summary.calories_total.unwrap() - 1120.0).abs() < 1e-9);
    assert!((summary.proteines_total.unwrap() - 42.0).abs() < 1e-9);
    assert_eq!(summary.recipe_items.len(), 2);
    assert_eq!(summary.vitamines.as_deref(), Some("B1, B9, B12, D"));
    assert_eq!(summary.mineraux.as_deref(), Some("Fer, Calcium"));

    // the persisted record carries the same derived totals
    let persisted = store.find(tables::RECIPES, &summary.id).await.unwrap();
    assert_eq!(persisted.f64_field(fields::CALORIES_TOTAL), Some(1120.0));
    assert_eq!(
        persisted.id_list_field(fields::RECIPE_ITEMS),
        summary.recipe_items
    );

    // join records link back to the recipe and shadow the ingredient name
    let joins = store.dump(tables::RECIPE_ITEMS).await;
    assert_eq!(joins.len(), 2);
    for join in &joins {
        assert_eq!(join.id_list_field(fields::RECIPE), vec![summary.id.clone()]);
        assert!(!join.str_field(fields::INGREDIENT_NAME).unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_create_requires_name_and_ingredients() {
    let store = test_store();
    let service = RecipeService::new(store, Arc::new(StubAdvisor::default()));

    let err = service
        .create(recipe_input(json!({"Name": "Vide"})))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::MissingRequiredField);

    let err = service
        .create(recipe_input(json!({
            "IngredientsDetails": [{"Nom": "Sel", "Quantite": 1.0, "Unite": "pince"}],
        })))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::MissingRequiredField);
}

#[tokio::test]
async fn test_create_with_unknown_ingredient_compensates() {
    let store = test_store();
    let service = RecipeService::new(store.clone(), Arc::new(StubAdvisor::default()));

    let err = service
        .create(recipe_input(json!({
            "Name": "Mystère",
            "IngredientsDetails": [{"Nom": "introuvable", "Quantite": 1.0, "Unite": "g"}],
        })))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);

    // the half-created recipe was deleted again
    assert!(store.dump(tables::RECIPES).await.is_empty());
}

#[tokio::test]
async fn test_create_compensates_when_join_creation_fails() {
    let inner = test_store();
    seed_ingredient(inner.as_ref(), json!({"Name": "Riz", "Calories": 130.0})).await;

    let store = Arc::new(FailingStore {
        inner: inner.clone(),
        fail_create_on: tables::RECIPE_ITEMS,
    });
    let service = RecipeService::new(store, Arc::new(StubAdvisor::default()));

    let err = service
        .create(recipe_input(json!({
            "Name": "Riz pilaf",
            "IngredientsDetails": [{"Nom": "Riz", "Quantite": 200.0, "Unite": "g"}],
        })))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::StoreError);

    assert!(inner.dump(tables::RECIPES).await.is_empty());
}

#[tokio::test]
async fn test_update_replaces_the_join_set_completely() {
    let store = test_store();
    seed_ingredient(store.as_ref(), json!({"Name": "Farine", "Calories": 364.0})).await;
    seed_ingredient(store.as_ref(), json!({"Name": "Sucre", "Calories": 400.0})).await;

    let service = RecipeService::new(store.clone(), Arc::new(StubAdvisor::default()));
    let created = service
        .create(recipe_input(json!({
            "Name": "Pâte",
            "IngredientsDetails": [{"Nom": "Farine", "Quantite": 100.0, "Unite": "g"}],
        })))
        .await
        .unwrap();
    let old_join_ids = created.recipe_items.clone();

    let updated = service
        .update(
            &created.id,
            recipe_input(json!({
                "Name": "Pâte sucrée",
                "IngredientsDetails": [
                    {"Nom": "Farine", "Quantite": 100.0, "Unite": "g"},
                    {"Nom": "Sucre", "Quantite": 50.0, "Unite": "g"},
                ],
            })),
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "Pâte sucrée");
    assert_eq!(updated.recipe_items.len(), 2);
    // 364 + 400*0.5
    assert!((updated.calories_total.unwrap() - 564.0).abs() < 1e-9);

    // no join record from the previous set survives
    let joins = store.dump(tables::RECIPE_ITEMS).await;
    assert_eq!(joins.len(), 2);
    for old_id in &old_join_ids {
        assert!(joins.iter().all(|j| j.id != *old_id));
    }
}

#[tokio::test]
async fn test_get_assembles_ingredient_details() {
    let store = test_store();
    seed_ingredient(store.as_ref(), json!({"Name": "Oeuf", "Calories": 155.0})).await;

    let service = RecipeService::new(store, Arc::new(StubAdvisor::default()));
    let created = service
        .create(recipe_input(json!({
            "Name": "Omelette",
            "IngredientsDetails": [{"Nom": "Oeuf", "Quantite": 3.0, "Unite": "piece"}],
        })))
        .await
        .unwrap();

    let detail = service.get(&created.id).await.unwrap();
    assert_eq!(detail.ingredients_details.len(), 1);
    assert_eq!(detail.ingredients_details[0].nom, "Oeuf");
    assert!((detail.ingredients_details[0].quantite - 3.0).abs() < f64::EPSILON);
    assert_eq!(detail.ingredients_details[0].unite, "piece");
}

#[tokio::test]
async fn test_delete_cascades_over_join_records() {
    let store = test_store();
    seed_ingredient(store.as_ref(), json!({"Name": "Thon", "Calories": 132.0})).await;

    let service = RecipeService::new(store.clone(), Arc::new(StubAdvisor::default()));
    let created = service
        .create(recipe_input(json!({
            "Name": "Salade de thon",
            "IngredientsDetails": [{"Nom": "Thon", "Quantite": 150.0, "Unite": "g"}],
        })))
        .await
        .unwrap();

    service.delete(&created.id).await.unwrap();

    assert!(store.find(tables::RECIPES, &created.id).await.is_err());
    assert!(store.dump(tables::RECIPE_ITEMS).await.is_empty());
}

#[tokio::test]
async fn test_generation_coerces_vocabularies_and_resolves_ingredients() {
    let store = test_store();
    let pomme = seed_ingredient(store.as_ref(), json!({"Name": "pomme"})).await;

    let draft = RecipeDraft {
        name: "Compote maison".to_owned(),
        instructions: "Cuire doucement.".to_owned(),
        servings: 2,
        dish_type: "Goûter".to_owned(),
        intolerances: String::new(),
        ingredients_details: vec![
            serde_json::from_value(json!({"Nom": "pommes", "Quantite": 1.0, "Unite": "KG"}))
                .unwrap(),
            serde_json::from_value(json!({"Nom": "fève tonka", "Quantite": 1.0, "Unite": "poignée"}))
                .unwrap(),
        ],
    };
    let service = RecipeService::new(store.clone(), Arc::new(StubAdvisor::with_draft(draft)));

    let generated = service.generate("compote de pommes").await.unwrap();

    // vocabulary coercions
    assert_eq!(generated.dish_type, "Autre");
    assert_eq!(generated.ingredients_details[0].unite, "kg");
    assert_eq!(generated.ingredients_details[1].unite, "g");

    // "pommes" resolved to the existing "pomme", not a duplicate
    assert_eq!(generated.ingredients_details[0].nom, pomme);
    // the unknown ingredient was auto-created and its id substituted
    let tonka = &generated.ingredients_details[1].nom;
    assert!(tonka.starts_with(ids::RECORD_ID_PREFIX));
    assert!(store.find(tables::INGREDIENTS, tonka).await.is_ok());
}

#[tokio::test]
async fn test_generation_failures_are_fatal() {
    let store = test_store();
    let service = RecipeService::new(store, Arc::new(StubAdvisor::default()));

    let err = service.generate("   ").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    let err = service.generate("une recette").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::CollaboratorError);
}

// ABOUTME: Integration tests for case-insensitive name uniqueness with self-exclusion
// ABOUTME: Covers the guard directly and through the ingredient service
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Toque.dev
#![allow(clippy::unwrap_used)]

mod common;

use std::sync::Arc;

use common::{seed_ingredient, test_store, StubAdvisor};
use serde_json::json;
use toque_api_server::constants::tables;
use toque_api_server::errors::ErrorCode;
use toque_api_server::models::IngredientInput;
use toque_api_server::services::{IngredientService, NameUniquenessGuard};

fn input_named(name: &str) -> IngredientInput {
    serde_json::from_value(json!({ "Name": name })).unwrap()
}

#[tokio::test]
async fn test_guard_is_case_insensitive() {
    let store = test_store();
    seed_ingredient(store.as_ref(), json!({"Name": "Beurre"})).await;

    let guard = NameUniquenessGuard::new(store);
    assert!(guard
        .is_name_taken(tables::INGREDIENTS, "BEURRE", None)
        .await
        .unwrap());
    assert!(!guard
        .is_name_taken(tables::INGREDIENTS, "Margarine", None)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_guard_excludes_the_record_under_update() {
    let store = test_store();
    let id = seed_ingredient(store.as_ref(), json!({"Name": "Beurre"})).await;

    let guard = NameUniquenessGuard::new(store);
    // a record keeping its own name is not a duplicate of itself
    assert!(!guard
        .is_name_taken(tables::INGREDIENTS, "Beurre", Some(&id))
        .await
        .unwrap());
    assert!(guard
        .is_name_taken(tables::INGREDIENTS, "beurre", Some("recSomethingElse"))
        .await
        .unwrap());
}

#[tokio::test]
async fn test_duplicate_create_is_rejected() {
    let store = test_store();
    let service = IngredientService::new(store, Arc::new(StubAdvisor::default()));

    service.create(input_named("Crème")).await.unwrap();
    let err = service.create(input_named("crème")).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::DuplicateName);
}

#[tokio::test]
async fn test_update_to_own_name_passes_and_stealing_a_name_fails() {
    let store = test_store();
    let service = IngredientService::new(store, Arc::new(StubAdvisor::default()));

    let creme = service.create(input_named("Crème")).await.unwrap();
    service.create(input_named("Lait")).await.unwrap();

    // unchanged name on update must not trip the guard
    let kept = service
        .update(&creme.id, input_named("Crème"))
        .await
        .unwrap();
    assert_eq!(kept.name, "Crème");

    // renaming onto another record's name must
    let err = service
        .update(&creme.id, input_named("lait"))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::DuplicateName);
}

#[tokio::test]
async fn test_create_without_name_is_a_validation_error() {
    let store = test_store();
    let service = IngredientService::new(store, Arc::new(StubAdvisor::default()));

    let err = service
        .create(serde_json::from_value(json!({ "Calories": 10 })).unwrap())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::MissingRequiredField);
}

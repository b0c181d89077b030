// ABOUTME: Shared test utilities: in-memory store seeding and a stub AI advisor
// ABOUTME: Provides fixture helpers used across the integration tests
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Toque.dev
#![allow(dead_code, clippy::unwrap_used, clippy::missing_panics_doc)]

//! Shared test utilities for `toque_api_server`

use std::sync::{Arc, Once};

use async_trait::async_trait;
use serde_json::Value;

use toque_api_server::constants::{fields, tables};
use toque_api_server::errors::{AppError, AppResult};
use toque_api_server::llm::RecipeAdvisor;
use toque_api_server::models::{NutritionFacts, RecipeDraft};
use toque_api_server::store::{FieldMap, MemoryStore, Record, RecordStore, SelectQuery};

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_test_writer()
            .init();
    });
}

/// Fresh in-memory store
pub fn test_store() -> Arc<MemoryStore> {
    init_test_logging();
    Arc::new(MemoryStore::new())
}

/// Turn a JSON object literal into a field map
pub fn field_map(value: Value) -> FieldMap {
    match value {
        Value::Object(map) => map,
        other => unreachable!("field_map expects an object, got {other}"),
    }
}

/// Seed an ingredient with nutrition facts, returning its id
pub async fn seed_ingredient(store: &dyn RecordStore, json: Value) -> String {
    let created = store
        .create(tables::INGREDIENTS, vec![field_map(json)])
        .await
        .unwrap();
    created[0].id.clone()
}

/// Seed a bare recipe record, returning its id
pub async fn seed_recipe(store: &dyn RecordStore, name: &str) -> String {
    let created = store
        .create(
            tables::RECIPES,
            vec![field_map(serde_json::json!({ "Name": name }))],
        )
        .await
        .unwrap();
    created[0].id.clone()
}

/// Seed a join record; `recipe_id` may be absent to model a cleared link
pub async fn seed_join(
    store: &dyn RecordStore,
    recipe_id: Option<&str>,
    ingredient_id: &str,
    quantity: f64,
    unit: &str,
    ingredient_name: &str,
) -> String {
    let mut join = field_map(serde_json::json!({
        "Ingredient": [ingredient_id],
        "Quantity": quantity,
        "Unit": unit,
        "IngredientName": ingredient_name,
    }));
    if let Some(recipe_id) = recipe_id {
        join.insert(
            fields::RECIPE.to_owned(),
            Value::from(vec![recipe_id.to_owned()]),
        );
    }
    let created = store
        .create(tables::RECIPE_ITEMS, vec![join])
        .await
        .unwrap();
    created[0].id.clone()
}

/// Canned AI advisor: fixed nutrition facts and/or a fixed draft, or failure
#[derive(Default)]
pub struct StubAdvisor {
    /// Facts returned for any name; `None` with `fail_nutrition == false`
    /// yields empty facts
    pub nutrition: Option<NutritionFacts>,
    /// Make nutrition inference fail
    pub fail_nutrition: bool,
    /// Draft returned by generation; `None` makes generation fail
    pub draft: Option<RecipeDraft>,
}

impl StubAdvisor {
    pub fn with_nutrition(facts: NutritionFacts) -> Self {
        Self {
            nutrition: Some(facts),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_nutrition: true,
            ..Self::default()
        }
    }

    pub fn with_draft(draft: RecipeDraft) -> Self {
        Self {
            draft: Some(draft),
            ..Self::default()
        }
    }

    /// Facts with every numeric field zero and empty vitamin/mineral sets
    pub fn empty_facts() -> NutritionFacts {
        NutritionFacts {
            unit: "g".to_owned(),
            calories: 0.0,
            proteines: 0.0,
            glucides: 0.0,
            lipides: 0.0,
            vitamines: String::new(),
            mineraux: String::new(),
        }
    }
}

#[async_trait]
impl RecipeAdvisor for StubAdvisor {
    async fn infer_nutrition(&self, _name: &str) -> AppResult<NutritionFacts> {
        if self.fail_nutrition {
            return Err(AppError::collaborator("nutrition inference", "stubbed failure"));
        }
        Ok(self.nutrition.clone().unwrap_or_else(Self::empty_facts))
    }

    async fn generate_recipe(&self, _prompt: &str) -> AppResult<RecipeDraft> {
        self.draft
            .clone()
            .ok_or_else(|| AppError::collaborator("recipe generation", "stubbed failure"))
    }
}

/// Store wrapper that fails every create on one table, for compensation tests
pub struct FailingStore {
    pub inner: Arc<MemoryStore>,
    pub fail_create_on: &'static str,
}

#[async_trait]
impl RecordStore for FailingStore {
    async fn find(&self, table: &str, id: &str) -> AppResult<Record> {
        self.inner.find(table, id).await
    }

    async fn select(&self, table: &str, query: SelectQuery) -> AppResult<Vec<Record>> {
        self.inner.select(table, query).await
    }

    async fn create(&self, table: &str, records: Vec<FieldMap>) -> AppResult<Vec<Record>> {
        if table == self.fail_create_on {
            return Err(AppError::store(format!("injected create failure on {table}")));
        }
        self.inner.create(table, records).await
    }

    async fn update(&self, table: &str, id: &str, fields: FieldMap) -> AppResult<Record> {
        self.inner.update(table, id, fields).await
    }

    async fn destroy(&self, table: &str, ids: &[String]) -> AppResult<()> {
        self.inner.destroy(table, ids).await
    }
}

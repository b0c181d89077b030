// ABOUTME: Materializes and replaces the recipe-to-ingredient join records for a recipe
// ABOUTME: Also hosts the single full-scan reverse-index utility over the join table
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Toque.dev

//! Join record management
//!
//! The store has no multi-record transaction, so a join replacement is a
//! saga with a fixed phase order: destroy the old joins (chunked to the bulk
//! limit), create the new ones (parallel fan-out), then rewrite the recipe's
//! forward list. A crash between the create and relink phases leaves orphan
//! join records whose `Recipe` back-reference is set while the recipe's
//! forward list is stale — detectable, recoverable by hand, and not
//! reconciled automatically.
//!
//! The store also has no indexed reverse lookup, so "which joins reference
//! this id" is a full table scan filtered client-side. Every caller that
//! needs a reverse lookup goes through [`JoinManager::referencing_items`] so
//! a future secondary index changes one place.

use std::sync::Arc;

use futures_util::future::try_join_all;
use serde_json::{Map, Value};

use crate::constants::{fields, tables};
use crate::errors::{AppError, AppResult};
use crate::store::{destroy_in_batches, Record, RecordStore, SelectQuery};

/// One join record to materialize: resolved ingredient id, quantity, unit
#[derive(Debug, Clone, PartialEq)]
pub struct JoinSpec {
    /// Resolved ingredient record id
    pub ingredient_id: String,
    /// Quantity expressed in `unit`
    pub quantity: f64,
    /// Measure unit
    pub unit: String,
}

/// Join table manager over one store handle
pub struct JoinManager {
    store: Arc<dyn RecordStore>,
}

impl JoinManager {
    /// Create a manager
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Replace every join record of a recipe with the given specs
    ///
    /// Phase order is fixed: destroy-old, create-new, relink. Returns the
    /// ids of the new join records in spec order.
    ///
    /// # Errors
    ///
    /// Propagates the first failing store call; completed phases are not
    /// rolled back (the store cannot).
    pub async fn replace_joins(
        &self,
        recipe_id: &str,
        specs: &[JoinSpec],
    ) -> AppResult<Vec<String>> {
        let recipe = self.store.find(tables::RECIPES, recipe_id).await?;
        let old_ids = recipe.id_list_field(fields::RECIPE_ITEMS);
        destroy_in_batches(self.store.as_ref(), tables::RECIPE_ITEMS, &old_ids).await?;

        let new_ids = try_join_all(
            specs
                .iter()
                .map(|spec| self.create_join(recipe_id, spec)),
        )
        .await?;

        let mut relink = Map::new();
        relink.insert(
            fields::RECIPE_ITEMS.to_owned(),
            Value::from(new_ids.clone()),
        );
        self.store
            .update(tables::RECIPES, recipe_id, relink)
            .await?;

        Ok(new_ids)
    }

    /// Create one join record, denormalizing the ingredient name into the
    /// shadow field used by search
    async fn create_join(&self, recipe_id: &str, spec: &JoinSpec) -> AppResult<String> {
        let ingredient = self
            .store
            .find(tables::INGREDIENTS, &spec.ingredient_id)
            .await?;
        let ingredient_name = ingredient.str_field(fields::NAME).unwrap_or_default();

        let mut join_fields = Map::new();
        join_fields.insert(
            fields::RECIPE.to_owned(),
            Value::from(vec![recipe_id.to_owned()]),
        );
        join_fields.insert(
            fields::INGREDIENT.to_owned(),
            Value::from(vec![spec.ingredient_id.clone()]),
        );
        join_fields.insert(fields::QUANTITY.to_owned(), Value::from(spec.quantity));
        join_fields.insert(fields::UNIT.to_owned(), Value::from(spec.unit.clone()));
        join_fields.insert(
            fields::INGREDIENT_NAME.to_owned(),
            Value::from(ingredient_name),
        );

        let created = self
            .store
            .create(tables::RECIPE_ITEMS, vec![join_fields])
            .await?;
        created
            .into_iter()
            .next()
            .map(|r| r.id)
            .ok_or_else(|| AppError::store("join create returned no record"))
    }

    /// All join records whose `link_field` list contains `id`.
    ///
    /// O(total join records) per call; acceptable at the expected scale and
    /// inherited from the store's query model.
    ///
    /// # Errors
    ///
    /// `StoreError` when the scan fails.
    pub async fn referencing_items(&self, link_field: &str, id: &str) -> AppResult<Vec<Record>> {
        let items = self
            .store
            .select(
                tables::RECIPE_ITEMS,
                SelectQuery::all().fields([fields::RECIPE, fields::INGREDIENT]),
            )
            .await?;

        Ok(items
            .into_iter()
            .filter(|item| item.id_list_field(link_field).iter().any(|v| v == id))
            .collect())
    }
}

// ABOUTME: Blocks deletes that would strand join records; cascades recipe deletion
// ABOUTME: Both checks ride the shared reverse-index scan over the join table
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Toque.dev

//! Referential integrity enforcement
//!
//! The store knows nothing about references, so integrity is enforced here:
//! an ingredient cannot be deleted while any join record simultaneously
//! links it and a recipe, and deleting a recipe first removes every join
//! record that references it. Both operations share the join manager's
//! reverse-index utility; like every check in this layer they are
//! best-effort check-then-act against a store without locking.

use std::sync::Arc;

use crate::constants::{fields, tables};
use crate::errors::{AppError, AppResult};
use crate::services::joins::JoinManager;
use crate::store::{destroy_in_batches, RecordStore};

/// Integrity enforcer over one store handle
pub struct IntegrityEnforcer {
    store: Arc<dyn RecordStore>,
    joins: JoinManager,
}

impl IntegrityEnforcer {
    /// Create an enforcer sharing the store handle with its join manager
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        let joins = JoinManager::new(Arc::clone(&store));
        Self { store, joins }
    }

    /// Whether the ingredient can be deleted: true iff no join record has
    /// both a non-empty recipe reference and this ingredient
    ///
    /// # Errors
    ///
    /// `StoreError` when the reverse scan fails.
    pub async fn can_delete_ingredient(&self, ingredient_id: &str) -> AppResult<bool> {
        let referencing = self
            .joins
            .referencing_items(fields::INGREDIENT, ingredient_id)
            .await?;
        Ok(!referencing
            .iter()
            .any(|item| !item.id_list_field(fields::RECIPE).is_empty()))
    }

    /// Fail with `IntegrityViolation` when the ingredient is still in use
    ///
    /// # Errors
    ///
    /// `IntegrityViolation` (409) when a live reference exists; `StoreError`
    /// when the reverse scan fails.
    pub async fn ensure_ingredient_deletable(&self, ingredient_id: &str) -> AppResult<()> {
        if !self.can_delete_ingredient(ingredient_id).await? {
            return Err(AppError::integrity_violation(
                "ingredient is still used by at least one recipe",
            ));
        }
        Ok(())
    }

    /// Delete a recipe together with every join record that references it
    ///
    /// The join records go first, chunked to the store's bulk-destroy limit,
    /// then the recipe itself. After completion no join record references
    /// the recipe.
    ///
    /// # Errors
    ///
    /// Propagates the first failing store call; join records already
    /// destroyed stay destroyed.
    pub async fn cascade_delete_recipe(&self, recipe_id: &str) -> AppResult<()> {
        let referencing = self
            .joins
            .referencing_items(fields::RECIPE, recipe_id)
            .await?;
        let item_ids: Vec<String> = referencing.into_iter().map(|item| item.id).collect();

        destroy_in_batches(self.store.as_ref(), tables::RECIPE_ITEMS, &item_ids).await?;
        self.store
            .destroy(tables::RECIPES, &[recipe_id.to_owned()])
            .await?;
        Ok(())
    }
}

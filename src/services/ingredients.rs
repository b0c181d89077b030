// ABOUTME: Ingredient CRUD with uniqueness and integrity guards plus AI nutrition lookup
// ABOUTME: Normalizes vitamins/minerals input forms before writing to the store
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Toque.dev

//! Ingredient operations
//!
//! Creation and update run through the uniqueness guard (self-excluded on
//! update) and drop empty fields before writing. Deletion is blocked while
//! any join record still links the ingredient to a recipe. The nutrition
//! lookup calls the inference collaborator directly and surfaces its
//! failures — unlike resolver-driven enrichment, nothing degrades here.

use std::sync::Arc;

use crate::constants::{fields, tables};
use crate::errors::{AppError, AppResult};
use crate::llm::RecipeAdvisor;
use crate::models::{IngredientInput, IngredientView, NutritionFacts};
use crate::services::integrity::IntegrityEnforcer;
use crate::services::uniqueness::NameUniquenessGuard;
use crate::store::{RecordStore, SelectQuery};

/// Fields projected by the ingredient list endpoint
const LIST_FIELDS: [&str; 8] = [
    fields::NAME,
    fields::CALORIES,
    fields::PROTEINES,
    fields::GLUCIDES,
    fields::LIPIDES,
    fields::VITAMINES,
    fields::MINERAUX,
    fields::RECIPE_ITEMS,
];

/// Ingredient service
pub struct IngredientService {
    store: Arc<dyn RecordStore>,
    advisor: Arc<dyn RecipeAdvisor>,
    guard: NameUniquenessGuard,
    enforcer: IntegrityEnforcer,
}

impl IngredientService {
    /// Create the service over shared store and advisor handles
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>, advisor: Arc<dyn RecipeAdvisor>) -> Self {
        Self {
            guard: NameUniquenessGuard::new(Arc::clone(&store)),
            enforcer: IntegrityEnforcer::new(Arc::clone(&store)),
            store,
            advisor,
        }
    }

    /// List every ingredient
    ///
    /// # Errors
    ///
    /// `StoreError` when the listing fails.
    pub async fn list(&self) -> AppResult<Vec<IngredientView>> {
        let records = self
            .store
            .select(tables::INGREDIENTS, SelectQuery::all().fields(LIST_FIELDS))
            .await?;
        Ok(records.iter().map(IngredientView::from_record).collect())
    }

    /// Fetch one ingredient
    ///
    /// # Errors
    ///
    /// `ResourceNotFound` for an unknown id.
    pub async fn get(&self, ingredient_id: &str) -> AppResult<IngredientView> {
        let record = self.store.find(tables::INGREDIENTS, ingredient_id).await?;
        Ok(IngredientView::from_record(&record))
    }

    /// Create an ingredient
    ///
    /// # Errors
    ///
    /// `MissingRequiredField` without a name, `DuplicateName` on a taken
    /// name, `StoreError` on store failures.
    pub async fn create(&self, input: IngredientInput) -> AppResult<IngredientView> {
        let name = input
            .name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| AppError::missing_field(fields::NAME))?;
        self.guard
            .ensure_available(tables::INGREDIENTS, name, None)
            .await?;

        let created = self
            .store
            .create(tables::INGREDIENTS, vec![input.to_fields()])
            .await?;
        created
            .first()
            .map(IngredientView::from_record)
            .ok_or_else(|| AppError::store("ingredient create returned no record"))
    }

    /// Update an ingredient
    ///
    /// # Errors
    ///
    /// `DuplicateName` when renaming onto a taken name (the record's own
    /// unchanged name passes), `ResourceNotFound` for an unknown id.
    pub async fn update(
        &self,
        ingredient_id: &str,
        input: IngredientInput,
    ) -> AppResult<IngredientView> {
        if let Some(name) = input.name.as_deref().filter(|n| !n.trim().is_empty()) {
            self.guard
                .ensure_available(tables::INGREDIENTS, name, Some(ingredient_id))
                .await?;
        }

        let record = self
            .store
            .update(tables::INGREDIENTS, ingredient_id, input.to_fields())
            .await?;
        Ok(IngredientView::from_record(&record))
    }

    /// Delete an ingredient unless a recipe still uses it
    ///
    /// # Errors
    ///
    /// `IntegrityViolation` (409) while a join record links the ingredient
    /// to a recipe; `StoreError` on store failures.
    pub async fn delete(&self, ingredient_id: &str) -> AppResult<()> {
        self.enforcer
            .ensure_ingredient_deletable(ingredient_id)
            .await?;
        self.store
            .destroy(tables::INGREDIENTS, &[ingredient_id.to_owned()])
            .await
    }

    /// Infer nutrition facts for a name without touching the store
    ///
    /// # Errors
    ///
    /// `MissingRequiredField` on a blank name; `CollaboratorError` when the
    /// inference collaborator fails (surfaced, not swallowed).
    pub async fn nutrition(&self, name: &str) -> AppResult<NutritionFacts> {
        if name.trim().is_empty() {
            return Err(AppError::missing_field("name"));
        }
        self.advisor.infer_nutrition(name).await
    }
}

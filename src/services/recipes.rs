// ABOUTME: Recipe orchestration sagas: create, update, cascade delete, AI generation
// ABOUTME: Drives resolver, join manager, and aggregator in fixed phase order with compensation
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Toque.dev

//! Recipe orchestration
//!
//! A recipe write is a saga over a store without transactions: resolve every
//! ingredient reference, replace the join set, recompute the derived totals,
//! persist them, refetch. Phases are strictly ordered; items within the
//! resolve and fetch phases fan out in parallel. Creation carries the single
//! compensating action of this system: if anything fails after the recipe
//! record exists, the record is best-effort deleted once and the original
//! error surfaces. Updates are not compensated.

use std::sync::Arc;

use futures_util::future::try_join_all;
use tracing::{info, warn};

use crate::constants::{fields, tables};
use crate::errors::{AppError, AppResult};
use crate::llm::RecipeAdvisor;
use crate::models::{
    require_details, DishType, IngredientDetail, MeasureUnit, RecipeDetail, RecipeDraft,
    RecipeInput, RecipeSummary,
};
use crate::services::integrity::IntegrityEnforcer;
use crate::services::joins::{JoinManager, JoinSpec};
use crate::services::nutrition::NutritionAggregator;
use crate::services::resolver::IngredientResolver;
use crate::services::uniqueness::NameUniquenessGuard;
use crate::store::{RecordStore, SelectQuery};

/// Summary fields projected by the recipe list endpoint
const LIST_FIELDS: [&str; 12] = [
    fields::NAME,
    fields::INSTRUCTIONS,
    fields::SERVINGS,
    fields::INTOLERANCES,
    fields::DISH_TYPE,
    fields::RECIPE_ITEMS,
    fields::CALORIES_TOTAL,
    fields::PROTEINES_TOTAL,
    fields::GLUCIDES_TOTAL,
    fields::LIPIDES_TOTAL,
    fields::VITAMINES,
    fields::MINERAUX,
];

/// Recipe service wiring the consistency components together
pub struct RecipeService {
    store: Arc<dyn RecordStore>,
    advisor: Arc<dyn RecipeAdvisor>,
    guard: NameUniquenessGuard,
    resolver: IngredientResolver,
    joins: JoinManager,
    aggregator: NutritionAggregator,
    enforcer: IntegrityEnforcer,
}

impl RecipeService {
    /// Create the service over shared store and advisor handles
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>, advisor: Arc<dyn RecipeAdvisor>) -> Self {
        Self {
            guard: NameUniquenessGuard::new(Arc::clone(&store)),
            resolver: IngredientResolver::new(Arc::clone(&store)),
            joins: JoinManager::new(Arc::clone(&store)),
            aggregator: NutritionAggregator::new(Arc::clone(&store)),
            enforcer: IntegrityEnforcer::new(Arc::clone(&store)),
            store,
            advisor,
        }
    }

    /// List every recipe summary
    ///
    /// # Errors
    ///
    /// `StoreError` when the listing fails.
    pub async fn list(&self) -> AppResult<Vec<RecipeSummary>> {
        let records = self
            .store
            .select(tables::RECIPES, SelectQuery::all().fields(LIST_FIELDS))
            .await?;
        Ok(records.iter().map(RecipeSummary::from_record).collect())
    }

    /// Fetch one recipe with its assembled ingredient lines
    ///
    /// Join records are fetched with a parallel fan-out, then each line's
    /// ingredient name is resolved; a join without an ingredient reference
    /// yields an empty name rather than an error.
    ///
    /// # Errors
    ///
    /// `ResourceNotFound` for an unknown recipe id; `StoreError` otherwise.
    pub async fn get(&self, recipe_id: &str) -> AppResult<RecipeDetail> {
        let record = self.store.find(tables::RECIPES, recipe_id).await?;
        let summary = RecipeSummary::from_record(&record);

        let joins = try_join_all(
            summary
                .recipe_items
                .iter()
                .map(|id| self.store.find(tables::RECIPE_ITEMS, id)),
        )
        .await?;

        let ingredients_details = try_join_all(joins.iter().map(|join| async {
            let nom = match join.id_list_field(fields::INGREDIENT).into_iter().next() {
                Some(ingredient_id) => self
                    .store
                    .find(tables::INGREDIENTS, &ingredient_id)
                    .await?
                    .str_field(fields::NAME)
                    .unwrap_or_default(),
                None => String::new(),
            };
            Ok::<_, AppError>(IngredientDetail {
                nom,
                quantite: join.f64_field(fields::QUANTITY).unwrap_or(0.0),
                unite: join.str_field(fields::UNIT).unwrap_or_default(),
            })
        }))
        .await?;

        Ok(RecipeDetail {
            summary,
            ingredients_details,
        })
    }

    /// Create a recipe together with its join set and derived totals
    ///
    /// # Errors
    ///
    /// `MissingRequiredField` without a name or ingredient lines,
    /// `DuplicateName` on a taken name, `ResourceNotFound` for an unknown
    /// ingredient reference, `StoreError` on store failures. Failures after
    /// the recipe record exists trigger one compensating destroy.
    pub async fn create(&self, input: RecipeInput) -> AppResult<RecipeSummary> {
        require_details(&input.ingredients_details)?;
        let name = input
            .name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| AppError::missing_field(fields::NAME))?;
        self.guard
            .ensure_available(tables::RECIPES, name, None)
            .await?;

        let created = self
            .store
            .create(tables::RECIPES, vec![input.to_fields()])
            .await?;
        let recipe_id = created
            .into_iter()
            .next()
            .map(|r| r.id)
            .ok_or_else(|| AppError::store("recipe create returned no record"))?;

        match self
            .finish_write(&recipe_id, &input.ingredients_details)
            .await
        {
            Ok(summary) => Ok(summary),
            Err(e) => {
                // Single best-effort compensation; its own failure is logged,
                // never propagated over the original error.
                if let Err(compensation) = self
                    .store
                    .destroy(tables::RECIPES, &[recipe_id.clone()])
                    .await
                {
                    warn!("compensating delete of recipe {recipe_id} failed: {compensation}");
                }
                Err(e)
            }
        }
    }

    /// Update a recipe's fields and replace its join set
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`Self::create`], minus the compensation: a failure
    /// mid-update leaves detectable partial state, as the original system
    /// does.
    pub async fn update(&self, recipe_id: &str, input: RecipeInput) -> AppResult<RecipeSummary> {
        require_details(&input.ingredients_details)?;
        if let Some(name) = input.name.as_deref().filter(|n| !n.trim().is_empty()) {
            self.guard
                .ensure_available(tables::RECIPES, name, Some(recipe_id))
                .await?;
        }

        let scalar_fields = input.to_fields();
        if !scalar_fields.is_empty() {
            self.store
                .update(tables::RECIPES, recipe_id, scalar_fields)
                .await?;
        }

        self.finish_write(recipe_id, &input.ingredients_details)
            .await
    }

    /// Shared tail of the write sagas: resolve-all, replace joins, aggregate,
    /// persist totals, refetch. Phase order is fixed.
    async fn finish_write(
        &self,
        recipe_id: &str,
        details: &[IngredientDetail],
    ) -> AppResult<RecipeSummary> {
        let specs = try_join_all(details.iter().map(|detail| async {
            let ingredient_id = self.resolver.lookup(&detail.nom).await?;
            Ok::<_, AppError>(JoinSpec {
                ingredient_id,
                quantity: detail.quantite,
                unit: detail.unite.clone(),
            })
        }))
        .await?;

        let join_ids = self.joins.replace_joins(recipe_id, &specs).await?;
        let totals = self.aggregator.aggregate(&join_ids).await?;
        self.store
            .update(tables::RECIPES, recipe_id, totals.to_fields())
            .await?;

        let full = self.store.find(tables::RECIPES, recipe_id).await?;
        Ok(RecipeSummary::from_record(&full))
    }

    /// Delete a recipe and cascade over its join records
    ///
    /// # Errors
    ///
    /// `StoreError` when a store call fails; already-destroyed join records
    /// stay destroyed.
    pub async fn delete(&self, recipe_id: &str) -> AppResult<()> {
        self.enforcer.cascade_delete_recipe(recipe_id).await?;
        info!("recipe {recipe_id} deleted with its join records");
        Ok(())
    }

    /// Draft a recipe with the generation collaborator
    ///
    /// The draft's dish type and units are coerced into their vocabularies
    /// and every ingredient reference is resolved — auto-creating and
    /// enriching unknown ingredients — before the draft is returned. Nothing
    /// is persisted here except auto-created ingredients; the client submits
    /// the draft through the create endpoint.
    ///
    /// References resolve sequentially: a draft may repeat a new ingredient,
    /// and resolving the repeats concurrently would race duplicate creates.
    ///
    /// # Errors
    ///
    /// `InvalidInput` on a blank prompt; `CollaboratorError` when generation
    /// fails (fatal, unlike enrichment); `StoreError` on store failures.
    pub async fn generate(&self, prompt: &str) -> AppResult<RecipeDraft> {
        if prompt.trim().is_empty() {
            return Err(AppError::invalid_input("prompt is required"));
        }

        let mut draft = self.advisor.generate_recipe(prompt).await?;
        draft.dish_type = DishType::coerce(&draft.dish_type).as_str().to_owned();

        for detail in &mut draft.ingredients_details {
            detail.unite = MeasureUnit::coerce(&detail.unite).as_str().to_owned();
            detail.nom = self
                .resolver
                .resolve_or_create(&detail.nom, self.advisor.as_ref())
                .await?;
        }

        Ok(draft)
    }
}

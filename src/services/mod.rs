// ABOUTME: Domain service layer turning the flat record store into a consistent relational model
// ABOUTME: Uniqueness, resolution, join management, aggregation, integrity, search, orchestration
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Toque.dev

//! Domain service layer
//!
//! The record store offers per-table CRUD and nothing relational. These
//! services layer the actual model on top: names stay unique, ingredient
//! references resolve to real records, the recipe↔ingredient join table is
//! maintained by hand, derived nutrition totals are recomputed after every
//! join-set change, and deletes respect live references.

/// Ingredient CRUD and AI nutrition lookup
pub mod ingredients;
/// Referential integrity enforcement
pub mod integrity;
/// Join record management and the reverse-index scan
pub mod joins;
/// Derived nutrition aggregation
pub mod nutrition;
/// Recipe orchestration sagas
pub mod recipes;
/// Free-text ingredient reference resolution
pub mod resolver;
/// Merged recipe search
pub mod search;
/// Case-insensitive name uniqueness guard
pub mod uniqueness;

pub use ingredients::IngredientService;
pub use integrity::IntegrityEnforcer;
pub use joins::{JoinManager, JoinSpec};
pub use nutrition::NutritionAggregator;
pub use recipes::RecipeService;
pub use resolver::IngredientResolver;
pub use search::{SearchHit, SearchMerger};
pub use uniqueness::NameUniquenessGuard;

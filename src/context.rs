// ABOUTME: Dependency-injection container wiring store, advisor, and services for the routes
// ABOUTME: Built once at startup and shared as axum state
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Toque.dev

//! Server resources
//!
//! One container holds the shared store and advisor handles plus the
//! services constructed over them. Routes receive it as `State<Arc<…>>`;
//! tests build it over the in-memory store and a stub advisor.

use std::sync::Arc;

use crate::llm::RecipeAdvisor;
use crate::services::{IngredientService, RecipeService, SearchMerger};
use crate::store::RecordStore;

/// Shared server dependencies
pub struct ServerResources {
    /// Recipe orchestration service
    pub recipes: RecipeService,
    /// Ingredient service
    pub ingredients: IngredientService,
    /// Search merger
    pub search: SearchMerger,
}

impl ServerResources {
    /// Wire the services over shared store and advisor handles
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>, advisor: Arc<dyn RecipeAdvisor>) -> Self {
        Self {
            recipes: RecipeService::new(Arc::clone(&store), Arc::clone(&advisor)),
            ingredients: IngredientService::new(Arc::clone(&store), advisor),
            search: SearchMerger::new(store),
        }
    }
}

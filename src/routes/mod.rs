// ABOUTME: Route module organization and router composition for the HTTP surface
// ABOUTME: Domain routers mount under /api with trace and permissive CORS layers
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Toque.dev

//! Route module
//!
//! Each domain module contains only route definitions and thin handler
//! functions that delegate to the service layer. The transport is an
//! external collaborator by design: nothing here holds an invariant.

/// Health check and system status routes
pub mod health;
/// Ingredient CRUD and nutrition lookup routes
pub mod ingredients;
/// Recipe CRUD and generation routes
pub mod recipes;
/// Merged search route
pub mod search;

pub use health::HealthRoutes;
pub use ingredients::IngredientRoutes;
pub use recipes::RecipeRoutes;
pub use search::SearchRoutes;

use std::sync::Arc;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::context::ServerResources;

/// Compose the full application router
#[must_use]
pub fn router(resources: Arc<ServerResources>) -> Router {
    let api = Router::new()
        .merge(RecipeRoutes::routes(Arc::clone(&resources)))
        .merge(IngredientRoutes::routes(Arc::clone(&resources)))
        .merge(SearchRoutes::routes(resources));

    Router::new()
        .nest("/api", api)
        .merge(HealthRoutes::routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

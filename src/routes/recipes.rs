// ABOUTME: Route handlers for the recipe REST API including AI generation
// ABOUTME: Thin axum handlers delegating every decision to the recipe service
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Toque.dev

//! Recipe routes

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::context::ServerResources;
use crate::errors::AppError;
use crate::models::{RecipeDetail, RecipeDraft, RecipeInput, RecipeSummary};

/// Generation request payload
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    /// Free-text description of the wanted recipe
    #[serde(default)]
    pub prompt: String,
}

/// Recipe routes implementation
pub struct RecipeRoutes;

impl RecipeRoutes {
    /// Create all recipe routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/recettes", get(list_handler).post(create_handler))
            .route("/recettes/generate", post(generate_handler))
            .route(
                "/recettes/:id",
                get(get_handler).put(update_handler).delete(delete_handler),
            )
            .with_state(resources)
    }
}

async fn list_handler(
    State(resources): State<Arc<ServerResources>>,
) -> Result<Json<Vec<RecipeSummary>>, AppError> {
    Ok(Json(resources.recipes.list().await?))
}

async fn get_handler(
    State(resources): State<Arc<ServerResources>>,
    Path(id): Path<String>,
) -> Result<Json<RecipeDetail>, AppError> {
    Ok(Json(resources.recipes.get(&id).await?))
}

async fn create_handler(
    State(resources): State<Arc<ServerResources>>,
    Json(input): Json<RecipeInput>,
) -> Result<Json<RecipeSummary>, AppError> {
    Ok(Json(resources.recipes.create(input).await?))
}

async fn update_handler(
    State(resources): State<Arc<ServerResources>>,
    Path(id): Path<String>,
    Json(input): Json<RecipeInput>,
) -> Result<Json<RecipeSummary>, AppError> {
    Ok(Json(resources.recipes.update(&id, input).await?))
}

async fn delete_handler(
    State(resources): State<Arc<ServerResources>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    resources.recipes.delete(&id).await?;
    Ok(Json(serde_json::json!({
        "message": "recipe and its join records deleted",
        "id": id,
    })))
}

async fn generate_handler(
    State(resources): State<Arc<ServerResources>>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<RecipeDraft>, AppError> {
    Ok(Json(resources.recipes.generate(&request.prompt).await?))
}

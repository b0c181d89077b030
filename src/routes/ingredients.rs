// ABOUTME: Route handlers for the ingredient REST API and the AI nutrition lookup
// ABOUTME: The literal /nutrition path registers beside /:id; literal segments win
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Toque.dev

//! Ingredient routes

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::context::ServerResources;
use crate::errors::AppError;
use crate::models::{IngredientInput, IngredientView, NutritionFacts};

/// Query parameters of the nutrition lookup
#[derive(Debug, Deserialize)]
pub struct NutritionParams {
    /// Ingredient name to look up
    #[serde(default)]
    pub name: String,
}

/// Ingredient routes implementation
pub struct IngredientRoutes;

impl IngredientRoutes {
    /// Create all ingredient routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/ingredients", get(list_handler).post(create_handler))
            .route("/ingredients/nutrition", get(nutrition_handler))
            .route(
                "/ingredients/:id",
                get(get_handler).put(update_handler).delete(delete_handler),
            )
            .with_state(resources)
    }
}

async fn list_handler(
    State(resources): State<Arc<ServerResources>>,
) -> Result<Json<Vec<IngredientView>>, AppError> {
    Ok(Json(resources.ingredients.list().await?))
}

async fn get_handler(
    State(resources): State<Arc<ServerResources>>,
    Path(id): Path<String>,
) -> Result<Json<IngredientView>, AppError> {
    Ok(Json(resources.ingredients.get(&id).await?))
}

async fn create_handler(
    State(resources): State<Arc<ServerResources>>,
    Json(input): Json<IngredientInput>,
) -> Result<Json<IngredientView>, AppError> {
    Ok(Json(resources.ingredients.create(input).await?))
}

async fn update_handler(
    State(resources): State<Arc<ServerResources>>,
    Path(id): Path<String>,
    Json(input): Json<IngredientInput>,
) -> Result<Json<IngredientView>, AppError> {
    Ok(Json(resources.ingredients.update(&id, input).await?))
}

async fn delete_handler(
    State(resources): State<Arc<ServerResources>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    resources.ingredients.delete(&id).await?;
    Ok(Json(serde_json::json!({
        "message": "ingredient deleted",
        "id": id,
    })))
}

async fn nutrition_handler(
    State(resources): State<Arc<ServerResources>>,
    Query(params): Query<NutritionParams>,
) -> Result<Json<NutritionFacts>, AppError> {
    Ok(Json(resources.ingredients.nutrition(&params.name).await?))
}

// ABOUTME: Route handler for the merged recipe search endpoint
// ABOUTME: Accepts a free-text query and an optional dish-type filter
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Toque.dev

//! Search routes

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::context::ServerResources;
use crate::errors::AppError;
use crate::services::SearchHit;

/// Query parameters of the search endpoint
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    /// Free-text query
    #[serde(default)]
    pub q: String,
    /// Optional dish-type filter; unrecognized values are ignored
    #[serde(rename = "type", default)]
    pub dish_type: Option<String>,
}

/// Search routes implementation
pub struct SearchRoutes;

impl SearchRoutes {
    /// Create the search route
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/recherche", get(search_handler))
            .with_state(resources)
    }
}

async fn search_handler(
    State(resources): State<Arc<ServerResources>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<SearchHit>>, AppError> {
    Ok(Json(
        resources
            .search
            .search(&params.q, params.dish_type.as_deref())
            .await?,
    ))
}

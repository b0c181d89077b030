// ABOUTME: AI collaborator abstraction: nutrition inference and recipe generation
// ABOUTME: Defines the RecipeAdvisor trait and tolerant parsing of model JSON output
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Toque.dev

//! # AI Collaborator Abstraction
//!
//! Two capabilities sit behind the [`RecipeAdvisor`] trait: inferring
//! nutrition facts for an ingredient name, and drafting a complete recipe
//! from a free-text prompt. The production implementation is the
//! OpenAI-compatible [`ChatClient`]; tests substitute a canned advisor.
//!
//! Model output is JSON-by-instruction, not JSON-by-contract: responses are
//! unwrapped from markdown code fences when present, numbers are accepted as
//! strings, and vitamins/minerals are tolerated as either a flat string or a
//! key→value mapping. Nutrition parsing degrades field-by-field to zero/empty
//! defaults; a generation response that is not valid JSON at all is a fatal
//! collaborator error.

/// OpenAI-compatible chat completion client
pub mod client;
/// Prompt builders for both advisor capabilities
pub mod prompts;

pub use client::ChatClient;

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::{AppError, AppResult};
use crate::models::{
    format_name_value_list, lenient_f64, IngredientDetail, NutritionFacts, RecipeDraft,
};

/// AI collaborator contract used by the resolver and the generation saga
#[async_trait]
pub trait RecipeAdvisor: Send + Sync {
    /// Infer per-100-unit nutrition facts for an ingredient name
    ///
    /// # Errors
    ///
    /// Returns `CollaboratorError` on transport failure or a response that
    /// is not JSON. Callers on the enrichment path swallow and log this.
    async fn infer_nutrition(&self, name: &str) -> AppResult<NutritionFacts>;

    /// Draft a recipe from a free-text prompt
    ///
    /// # Errors
    ///
    /// Returns `CollaboratorError` on transport failure or malformed output;
    /// generation failures are fatal and surface to the caller.
    async fn generate_recipe(&self, prompt: &str) -> AppResult<RecipeDraft>;
}

/// Strip a surrounding markdown code fence from model output, if present
#[must_use]
pub fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the language tag line, then the closing fence.
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim().trim_end_matches("```").trim()
}

/// Build nutrition facts from a parsed model response, defaulting missing
/// fields to zero/empty and normalizing vitamins/minerals
#[must_use]
pub fn nutrition_from_value(value: &Value) -> NutritionFacts {
    NutritionFacts {
        unit: value
            .get("Unit")
            .and_then(Value::as_str)
            .filter(|u| !u.is_empty())
            .unwrap_or("g")
            .to_owned(),
        calories: lenient_f64(value.get("Calories")),
        proteines: lenient_f64(value.get("Proteines")),
        glucides: lenient_f64(value.get("Glucides")),
        lipides: lenient_f64(value.get("Lipides")),
        vitamines: format_name_value_list(value.get("Vitamines")),
        mineraux: format_name_value_list(value.get("Mineraux")),
    }
}

/// Build a recipe draft from a parsed generation response
///
/// # Errors
///
/// Returns `CollaboratorError` when the ingredient list is missing or not a
/// list; individual fields degrade to defaults like the nutrition path.
pub fn draft_from_value(value: &Value) -> AppResult<RecipeDraft> {
    let details = value
        .get("IngredientsDetails")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            AppError::collaborator("recipe generation", "response carries no IngredientsDetails")
        })?;

    let ingredients_details = details
        .iter()
        .map(|det| IngredientDetail {
            nom: det
                .get("Nom")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned(),
            quantite: lenient_f64(det.get("Quantite")),
            unite: det
                .get("Unite")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned(),
        })
        .collect();

    Ok(RecipeDraft {
        name: value
            .get("Name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned(),
        instructions: value
            .get("Instructions")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned(),
        servings: lenient_f64(value.get("Servings")).max(0.0) as u32,
        dish_type: value
            .get("DishType")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned(),
        intolerances: value
            .get("Intolerances")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned(),
        ingredients_details,
    })
}

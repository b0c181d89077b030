// ABOUTME: Merges name-matched and ingredient-matched recipe search results
// ABOUTME: Name matches rank first; de-duplicated by id and capped at ten results
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Toque.dev

//! Recipe search
//!
//! Two result sets feed the merge: recipes whose name contains the query as
//! a lowercased substring, and recipes reachable through join records whose
//! denormalized ingredient-name field contains it. Name matches come first,
//! duplicates keep their first occurrence, and the merged list is capped.
//! A dish-type filter applies only when the value is one of the four
//! enumerated types; anything else is silently ignored.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::constants::{fields, limits, tables};
use crate::errors::AppResult;
use crate::models::DishType;
use crate::store::{Filter, Record, RecordStore, SelectQuery};

/// One search result row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "DishType", skip_serializing_if = "Option::is_none")]
    pub dish_type: Option<String>,
}

impl SearchHit {
    fn from_record(record: &Record) -> Self {
        Self {
            id: record.id.clone(),
            name: record.str_field(fields::NAME).unwrap_or_default(),
            dish_type: record.str_field(fields::DISH_TYPE),
        }
    }
}

/// Search merger over one store handle
pub struct SearchMerger {
    store: Arc<dyn RecordStore>,
}

impl SearchMerger {
    /// Create a merger
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Run a merged search for `query`, optionally filtered by dish type
    ///
    /// # Errors
    ///
    /// `StoreError` when any lookup fails.
    pub async fn search(&self, query: &str, dish_type: Option<&str>) -> AppResult<Vec<SearchHit>> {
        let needle = query.trim().to_lowercase();

        let mut by_name = Vec::new();
        let mut by_ingredient = Vec::new();

        if !needle.is_empty() {
            by_name = self
                .store
                .select(
                    tables::RECIPES,
                    SelectQuery::all()
                        .filter(Filter::ContainsIgnoreCase {
                            field: fields::NAME.to_owned(),
                            value: needle.clone(),
                        })
                        .fields([fields::NAME, fields::DISH_TYPE])
                        .max_records(limits::SEARCH_CAP),
                )
                .await?;

            let recipe_ids = self.recipe_ids_by_ingredient(&needle).await?;
            if !recipe_ids.is_empty() {
                by_ingredient = self
                    .store
                    .select(
                        tables::RECIPES,
                        SelectQuery::all()
                            .filter(Filter::RecordIdIn(recipe_ids))
                            .fields([fields::NAME, fields::DISH_TYPE]),
                    )
                    .await?;
            }
        }

        let mut merged: Vec<SearchHit> = Vec::new();
        for record in by_name.iter().chain(by_ingredient.iter()) {
            if merged.len() >= limits::SEARCH_CAP {
                break;
            }
            if !merged.iter().any(|hit| hit.id == record.id) {
                merged.push(SearchHit::from_record(record));
            }
        }

        // An unrecognized dish type means no filtering, not an empty result.
        if let Some(wanted) = dish_type.and_then(DishType::parse) {
            merged.retain(|hit| hit.dish_type.as_deref() == Some(wanted.as_str()));
        }

        Ok(merged)
    }

    /// Recipe ids reachable through join records whose ingredient-name
    /// shadow field contains the needle, first-encountered order, capped
    /// before the summary re-fetch
    async fn recipe_ids_by_ingredient(&self, needle: &str) -> AppResult<Vec<String>> {
        let items = self
            .store
            .select(
                tables::RECIPE_ITEMS,
                SelectQuery::all()
                    .filter(Filter::ContainsIgnoreCase {
                        field: fields::INGREDIENT_NAME.to_owned(),
                        value: needle.to_owned(),
                    })
                    .fields([fields::RECIPE]),
            )
            .await?;

        let mut ids: Vec<String> = Vec::new();
        for item in items {
            for id in item.id_list_field(fields::RECIPE) {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }
        ids.truncate(limits::SEARCH_CAP);
        Ok(ids)
    }
}

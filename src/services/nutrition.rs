// ABOUTME: Recomputes a recipe's derived nutrition totals from its join records
// ABOUTME: Fixed unit conversion to the per-100 reference basis; vitamin/mineral set union
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Toque.dev

//! Nutrition aggregation
//!
//! Every join record's quantity is converted to the common reference basis
//! (grams or millilitres, per 100) with a fixed table, then each ingredient's
//! per-100 macros contribute `macro * qtyRef / 100` to the totals. Vitamins
//! and minerals are a presence union of trimmed comma tokens, serialized in
//! first-encountered order. The aggregator performs no writes; the caller
//! persists the totals, which are derived state and never client-settable.

use std::sync::Arc;

use futures_util::future::try_join_all;

use crate::constants::{fields, tables};
use crate::errors::AppResult;
use crate::models::NutritionTotals;
use crate::store::RecordStore;

/// Quantity conversion to the per-100 reference basis.
///
/// `piece` is treated as one average 100-unit portion; an unrecognized unit
/// passes through unconverted.
#[must_use]
pub fn reference_quantity(quantity: f64, unit: &str) -> f64 {
    match unit {
        "kg" | "L" => quantity * 1000.0,
        "cuillere" => quantity * 15.0,
        "piece" => quantity * 100.0,
        // "g", "mL", "pince", and anything unrecognized
        _ => quantity,
    }
}

/// Round half away from zero to 2 decimal places
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Nutrition aggregator over one store handle
pub struct NutritionAggregator {
    store: Arc<dyn RecordStore>,
}

impl NutritionAggregator {
    /// Create an aggregator
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Compute the derived totals for an ordered list of join-record ids
    ///
    /// Join records and their ingredients are fetched with parallel
    /// fan-outs; accumulation runs in join-list order so the serialized
    /// vitamin/mineral sets are deterministic. A join record without an
    /// ingredient reference contributes nothing.
    ///
    /// # Errors
    ///
    /// `ResourceNotFound`/`StoreError` when a join record or a referenced
    /// ingredient cannot be loaded.
    pub async fn aggregate(&self, join_ids: &[String]) -> AppResult<NutritionTotals> {
        let joins = try_join_all(
            join_ids
                .iter()
                .map(|id| self.store.find(tables::RECIPE_ITEMS, id)),
        )
        .await?;

        let linked: Vec<_> = joins
            .iter()
            .filter_map(|join| {
                join.id_list_field(fields::INGREDIENT)
                    .into_iter()
                    .next()
                    .map(|ingredient_id| (join, ingredient_id))
            })
            .collect();

        let ingredients = try_join_all(
            linked
                .iter()
                .map(|(_, ingredient_id)| self.store.find(tables::INGREDIENTS, ingredient_id)),
        )
        .await?;

        let mut calories = 0.0;
        let mut proteines = 0.0;
        let mut glucides = 0.0;
        let mut lipides = 0.0;
        let mut vitamines: Vec<String> = Vec::new();
        let mut mineraux: Vec<String> = Vec::new();

        for ((join, _), ingredient) in linked.iter().zip(&ingredients) {
            let quantity = join.f64_field(fields::QUANTITY).unwrap_or(0.0);
            let unit = join.str_field(fields::UNIT).unwrap_or_default();
            let qty_ref = reference_quantity(quantity, &unit);
            let weight = qty_ref / 100.0;

            calories += ingredient.f64_field(fields::CALORIES).unwrap_or(0.0) * weight;
            proteines += ingredient.f64_field(fields::PROTEINES).unwrap_or(0.0) * weight;
            glucides += ingredient.f64_field(fields::GLUCIDES).unwrap_or(0.0) * weight;
            lipides += ingredient.f64_field(fields::LIPIDES).unwrap_or(0.0) * weight;

            collect_tokens(
                &mut vitamines,
                ingredient.str_field(fields::VITAMINES).as_deref(),
            );
            collect_tokens(
                &mut mineraux,
                ingredient.str_field(fields::MINERAUX).as_deref(),
            );
        }

        Ok(NutritionTotals {
            calories_total: round2(calories),
            proteines_total: round2(proteines),
            glucides_total: round2(glucides),
            lipides_total: round2(lipides),
            vitamines: vitamines.join(", "),
            mineraux: mineraux.join(", "),
        })
    }
}

/// Union comma-separated tokens into `out`, preserving first-encountered
/// order and dropping duplicates and blanks
fn collect_tokens(out: &mut Vec<String>, raw: Option<&str>) {
    let Some(raw) = raw else { return };
    for token in raw.split(',') {
        let token = token.trim();
        if !token.is_empty() && !out.iter().any(|t| t == token) {
            out.push(token.to_owned());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_table_is_exact() {
        assert!((reference_quantity(1.0, "kg") - 1000.0).abs() < f64::EPSILON);
        assert!((reference_quantity(1.0, "g") - 1.0).abs() < f64::EPSILON);
        assert!((reference_quantity(1.0, "L") - 1000.0).abs() < f64::EPSILON);
        assert!((reference_quantity(1.0, "mL") - 1.0).abs() < f64::EPSILON);
        assert!((reference_quantity(1.0, "cuillere") - 15.0).abs() < f64::EPSILON);
        assert!((reference_quantity(1.0, "pince") - 1.0).abs() < f64::EPSILON);
        assert!((reference_quantity(1.0, "piece") - 100.0).abs() < f64::EPSILON);
        // unrecognized units pass through
        assert!((reference_quantity(7.0, "poignée") - 7.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rounding_half_away_from_zero() {
        // 0.125 is exactly representable; the half rounds away from zero
        assert!((round2(0.125) - 0.13).abs() < 1e-9);
        assert!((round2(-0.125) - (-0.13)).abs() < 1e-9);
        assert!((round2(2.675_4) - 2.68).abs() < 1e-9);
        assert!((round2(-2.675_4) - (-2.68)).abs() < 1e-9);
        assert!((round2(4000.0) - 4000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_token_union_preserves_first_encounter_order() {
        let mut out = Vec::new();
        collect_tokens(&mut out, Some("A, C , B"));
        collect_tokens(&mut out, Some("C, D,,"));
        assert_eq!(out, ["A", "C", "B", "D"]);
    }
}

// ABOUTME: Resolves free-text ingredient references to stable record ids
// ABOUTME: Exact match, singular/plural-tolerant fuzzy match, then create-and-enrich
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Toque.dev

//! Ingredient resolution
//!
//! A reference is either a store record id (recognized by the id prefix and
//! trusted without a verifying round trip) or a free-text name. Two modes:
//!
//! - [`IngredientResolver::lookup`] — pure lookup for manual ingredient
//!   detail conversion: id prefix, then exact case-insensitive match, else
//!   `ResourceNotFound`. Never creates anything.
//! - [`IngredientResolver::resolve_or_create`] — the AI-assisted path: adds
//!   a singular/plural-tolerant fuzzy match, and finally creates the
//!   ingredient with only its name populated and enriches it through the
//!   nutrition advisor. Enrichment failure is logged and swallowed: an
//!   ingredient without nutrition facts is an accepted terminal state, not a
//!   retry target.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::warn;

use crate::constants::{fields, ids, tables};
use crate::errors::{AppError, AppResult};
use crate::llm::RecipeAdvisor;
use crate::store::{Filter, RecordStore, SelectQuery};

/// Ingredient reference resolver over one store handle
pub struct IngredientResolver {
    store: Arc<dyn RecordStore>,
}

impl IngredientResolver {
    /// Create a resolver
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Pure lookup: id prefix, then exact case-insensitive name match
    ///
    /// # Errors
    ///
    /// `ResourceNotFound` when no ingredient carries the name; `StoreError`
    /// when the lookup fails.
    pub async fn lookup(&self, reference: &str) -> AppResult<String> {
        if reference.starts_with(ids::RECORD_ID_PREFIX) {
            return Ok(reference.to_owned());
        }
        self.exact_match(reference)
            .await?
            .ok_or_else(|| AppError::not_found(format!("ingredient '{reference}'")))
    }

    /// Resolving lookup for the AI-assisted path: id prefix, exact match,
    /// fuzzy singular/plural match, then create-and-enrich
    ///
    /// # Errors
    ///
    /// `StoreError` when a lookup or the creation fails. Enrichment failures
    /// do not propagate.
    pub async fn resolve_or_create(
        &self,
        reference: &str,
        advisor: &dyn RecipeAdvisor,
    ) -> AppResult<String> {
        if reference.starts_with(ids::RECORD_ID_PREFIX) {
            return Ok(reference.to_owned());
        }
        let name = reference.trim();

        if let Some(id) = self.exact_match(name).await? {
            return Ok(id);
        }
        if let Some(id) = self.fuzzy_match(name).await? {
            return Ok(id);
        }
        self.create_and_enrich(name, advisor).await
    }

    /// Exact case-insensitive name match, single hit
    async fn exact_match(&self, name: &str) -> AppResult<Option<String>> {
        let hits = self
            .store
            .select(
                tables::INGREDIENTS,
                SelectQuery::all()
                    .filter(Filter::NameEqualsIgnoreCase {
                        field: fields::NAME.to_owned(),
                        value: name.to_owned(),
                    })
                    .max_records(1),
            )
            .await?;
        Ok(hits.into_iter().next().map(|r| r.id))
    }

    /// Fuzzy match folding simple French singular/plural variants: the
    /// stemmed name followed by an optional "e" and/or trailing "s"
    async fn fuzzy_match(&self, name: &str) -> AppResult<Option<String>> {
        let stem = plural_stem(&name.to_lowercase());
        let hits = self
            .store
            .select(
                tables::INGREDIENTS,
                SelectQuery::all()
                    .filter(Filter::MatchesIgnoreCase {
                        field: fields::NAME.to_owned(),
                        pattern: format!("^{stem}(e?s)?$"),
                    })
                    .max_records(1),
            )
            .await?;
        Ok(hits.into_iter().next().map(|r| r.id))
    }

    /// Create the ingredient with only its name, then best-effort enrich it
    /// with inferred nutrition facts
    async fn create_and_enrich(
        &self,
        name: &str,
        advisor: &dyn RecipeAdvisor,
    ) -> AppResult<String> {
        let mut record_fields = Map::new();
        record_fields.insert(fields::NAME.to_owned(), Value::from(name));

        let created = self
            .store
            .create(tables::INGREDIENTS, vec![record_fields])
            .await?;
        let id = created
            .into_iter()
            .next()
            .map(|r| r.id)
            .ok_or_else(|| AppError::store("ingredient create returned no record"))?;

        // The whole enrichment step is best-effort: a failure of either the
        // inference call or the follow-up write leaves the ingredient with
        // empty nutrition, which is an accepted terminal state.
        let enriched = match advisor.infer_nutrition(name).await {
            Ok(facts) => {
                self.store
                    .update(tables::INGREDIENTS, &id, facts.to_fields())
                    .await
                    .map(|_| ())
            }
            Err(e) => Err(e),
        };
        if let Err(e) = enriched {
            warn!("nutrition enrichment failed for '{name}': {e}");
        }

        Ok(id)
    }
}

/// Stem a lowercased name for the fuzzy plural match.
///
/// A trailing "es" is stripped only when it stands at a word boundary, which
/// for ordinary French plurals means never ("pommes" keeps its "e"); a plain
/// trailing "s" is stripped otherwise. The match pattern re-admits the "e"
/// and "s" as optional suffixes.
#[must_use]
pub fn plural_stem(name: &str) -> String {
    if let Some(prefix) = name.strip_suffix("es") {
        let boundary = prefix
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        if boundary {
            return prefix.to_owned();
        }
    }
    name.strip_suffix('s').unwrap_or(name).to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plural_stem_folds_simple_plurals() {
        assert_eq!(plural_stem("pommes"), "pomme");
        assert_eq!(plural_stem("patates"), "patate");
        assert_eq!(plural_stem("carottes"), "carotte");
        assert_eq!(plural_stem("riz"), "riz");
        assert_eq!(plural_stem("pomme"), "pomme");
    }

    #[test]
    fn test_stem_pattern_accepts_both_numbers() {
        let stem = plural_stem("pommes");
        let pattern = format!("^{stem}(e?s)?$");
        let re = regex::Regex::new(&pattern).ok();
        assert!(re.as_ref().is_some_and(|r| r.is_match("pomme")));
        assert!(re.as_ref().is_some_and(|r| r.is_match("pommes")));
        assert!(re.as_ref().is_some_and(|r| !r.is_match("pommeau")));
    }
}

// ABOUTME: Record store abstraction: trait, record type, structured filters, batching helpers
// ABOUTME: Re-models the hosted store's string-formula query surface as an injectable contract
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Toque.dev

//! Record store abstraction layer
//!
//! The hosted record store offers per-table CRUD with string-formula filters
//! and nothing else: no foreign keys, no transactions, no server-side
//! aggregation. This module re-models that surface as the [`RecordStore`]
//! trait so the consistency layer can be exercised against an in-memory
//! implementation of the same contract.
//!
//! Filters are structured ([`Filter`]) rather than raw formula strings; the
//! hosted adapter renders them to the store's formula language and the
//! in-memory store evaluates them directly. Both honor the same semantics:
//! case-insensitive equality, substring search, anchored regex match, and
//! id exclusion/inclusion, composable with AND/OR.
//!
//! Bulk destroys are limited by the store to [`limits::MAX_DESTROY_BATCH`]
//! ids per call; [`destroy_in_batches`] chunks larger sets client-side.

/// Hosted record store adapter (HTTP)
pub mod airtable;
/// In-memory store implementing the same contract, for tests
pub mod memory;

pub use airtable::{AirtableStore, AirtableStoreConfig};
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::constants::limits;
use crate::errors::AppResult;

/// Field name/value map carried by a record
pub type FieldMap = Map<String, Value>;

/// One row of a store table
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Opaque store-issued identifier (`rec…`)
    pub id: String,
    /// Populated fields; the store omits empty ones
    pub fields: FieldMap,
}

impl Record {
    /// String field accessor
    #[must_use]
    pub fn str_field(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .and_then(Value::as_str)
            .map(ToOwned::to_owned)
    }

    /// Numeric field accessor; tolerates numbers stored as strings
    #[must_use]
    pub fn f64_field(&self, name: &str) -> Option<f64> {
        match self.fields.get(name) {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Unsigned integer field accessor
    #[must_use]
    pub fn u32_field(&self, name: &str) -> Option<u32> {
        self.f64_field(name).map(|v| v.max(0.0) as u32)
    }

    /// Link-list field accessor; a scalar id is treated as a one-element list
    #[must_use]
    pub fn id_list_field(&self, name: &str) -> Vec<String> {
        match self.fields.get(name) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(ToOwned::to_owned)
                .collect(),
            Some(Value::String(s)) if !s.is_empty() => vec![s.clone()],
            _ => Vec::new(),
        }
    }
}

/// Structured query predicate, rendered to the store's formula language by
/// the hosted adapter and evaluated client-side by the in-memory store
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// `LOWER({field}) = LOWER("value")`
    NameEqualsIgnoreCase {
        /// Field to compare
        field: String,
        /// Candidate value
        value: String,
    },
    /// `FIND("value", LOWER({field})) > 0`; `value` must already be lowercase
    ContainsIgnoreCase {
        /// Field to search
        field: String,
        /// Lowercased needle
        value: String,
    },
    /// `REGEX_MATCH(LOWER({field}), "pattern")`
    MatchesIgnoreCase {
        /// Field to match
        field: String,
        /// Anchored regex applied to the lowercased field
        pattern: String,
    },
    /// `NOT(RECORD_ID() = "id")` — self-exclusion for update-time checks
    NotRecordId(String),
    /// `OR(RECORD_ID() = "a", RECORD_ID() = "b", …)`
    RecordIdIn(Vec<String>),
    /// Boolean conjunction
    And(Vec<Filter>),
    /// Boolean disjunction
    Or(Vec<Filter>),
}

/// Select call options: filter, projection, and result cap
#[derive(Debug, Clone, Default)]
pub struct SelectQuery {
    /// Optional predicate
    pub filter: Option<Filter>,
    /// Fields to return; empty means all
    pub fields: Vec<String>,
    /// Result cap; `None` fetches every page
    pub max_records: Option<usize>,
}

impl SelectQuery {
    /// Query returning everything in a table
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Set the predicate
    #[must_use]
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Set the projection
    #[must_use]
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Cap the number of returned records
    #[must_use]
    pub fn max_records(mut self, max: usize) -> Self {
        self.max_records = Some(max);
        self
    }
}

/// Remote tabular record store contract
///
/// No call composes atomically with any other; multi-step writes are sagas
/// with explicit phase ordering and best-effort compensation at the call
/// sites. Select accumulates all pages and is restartable per call, not
/// mid-iteration.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch one record by id
    ///
    /// # Errors
    ///
    /// `ResourceNotFound` when the id does not exist; `StoreError` on
    /// transport or store failures.
    async fn find(&self, table: &str, id: &str) -> AppResult<Record>;

    /// Fetch records matching a query, accumulating every page
    ///
    /// # Errors
    ///
    /// `StoreError` on transport or store failures.
    async fn select(&self, table: &str, query: SelectQuery) -> AppResult<Vec<Record>>;

    /// Create records from field maps, returning them with issued ids
    ///
    /// # Errors
    ///
    /// `StoreError` on transport or store failures; `InvalidInput` when the
    /// store rejects the field payload.
    async fn create(&self, table: &str, records: Vec<FieldMap>) -> AppResult<Vec<Record>>;

    /// Update the given fields of one record
    ///
    /// # Errors
    ///
    /// `ResourceNotFound` when the id does not exist; `StoreError` otherwise.
    async fn update(&self, table: &str, id: &str, fields: FieldMap) -> AppResult<Record>;

    /// Destroy up to [`limits::MAX_DESTROY_BATCH`] records
    ///
    /// # Errors
    ///
    /// `InvalidInput` when the batch exceeds the store limit; `StoreError`
    /// on transport or store failures.
    async fn destroy(&self, table: &str, ids: &[String]) -> AppResult<()>;
}

/// Destroy an arbitrary number of records, chunked to the store's bulk limit
///
/// # Errors
///
/// Propagates the first failing batch; earlier batches stay destroyed (the
/// store has no transactions to roll them back).
pub async fn destroy_in_batches(
    store: &dyn RecordStore,
    table: &str,
    ids: &[String],
) -> AppResult<()> {
    for chunk in ids.chunks(limits::MAX_DESTROY_BATCH) {
        store.destroy(table, chunk).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(fields: Value) -> Record {
        let Value::Object(map) = fields else {
            unreachable!("test fixture is always an object")
        };
        Record {
            id: "rec0".to_owned(),
            fields: map,
        }
    }

    #[test]
    fn test_numeric_accessor_tolerates_strings() {
        let rec = record(json!({"Quantity": "2.5", "Servings": 4}));
        assert_eq!(rec.f64_field("Quantity"), Some(2.5));
        assert_eq!(rec.u32_field("Servings"), Some(4));
        assert_eq!(rec.f64_field("Missing"), None);
    }

    #[test]
    fn test_id_list_accessor_accepts_scalar() {
        let rec = record(json!({"Recipe": ["recA"], "Ingredient": "recB"}));
        assert_eq!(rec.id_list_field("Recipe"), vec!["recA".to_owned()]);
        assert_eq!(rec.id_list_field("Ingredient"), vec!["recB".to_owned()]);
        assert!(rec.id_list_field("Other").is_empty());
    }
}

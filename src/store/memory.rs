// ABOUTME: In-memory record store implementing the same contract as the hosted adapter
// ABOUTME: Evaluates structured filters client-side; used by integration tests
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Toque.dev

//! In-memory record store
//!
//! Implements [`RecordStore`] against process-local tables so the consistency
//! layer can be tested without the hosted service. Semantics mirror the
//! hosted adapter: insertion-ordered tables, merge-on-update, the bulk
//! destroy limit, and the same filter behavior (case-insensitive equality,
//! substring, anchored regex, id in/exclusion).

use std::collections::HashMap;

use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{FieldMap, Filter, Record, RecordStore, SelectQuery};
use crate::constants::{ids, limits};
use crate::errors::{AppError, AppResult};

/// Process-local record store
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Vec<Record>>>,
    destroy_batches: RwLock<Vec<usize>>,
}

impl MemoryStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a store-style record id
    fn mint_id() -> String {
        let suffix: String = Uuid::new_v4()
            .simple()
            .to_string()
            .chars()
            .take(14)
            .collect();
        format!("{}{suffix}", ids::RECORD_ID_PREFIX)
    }

    /// Snapshot a whole table (assertion helper)
    pub async fn dump(&self, table: &str) -> Vec<Record> {
        self.tables
            .read()
            .await
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    /// Sizes of every destroy batch issued so far (batching assertions)
    pub async fn destroy_batch_sizes(&self) -> Vec<usize> {
        self.destroy_batches.read().await.clone()
    }

    /// Render a field to the text the store's formula functions operate on
    fn field_text(record: &Record, field: &str) -> String {
        match record.fields.get(field) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|v| match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(", "),
            _ => String::new(),
        }
    }

    /// Evaluate a structured filter against one record
    fn matches(record: &Record, filter: &Filter) -> bool {
        match filter {
            Filter::NameEqualsIgnoreCase { field, value } => {
                Self::field_text(record, field).to_lowercase() == value.to_lowercase()
            }
            Filter::ContainsIgnoreCase { field, value } => Self::field_text(record, field)
                .to_lowercase()
                .contains(&value.to_lowercase()),
            Filter::MatchesIgnoreCase { field, pattern } => {
                let text = Self::field_text(record, field).to_lowercase();
                Regex::new(pattern).is_ok_and(|re| re.is_match(&text))
            }
            Filter::NotRecordId(id) => record.id != *id,
            Filter::RecordIdIn(ids) => ids.contains(&record.id),
            Filter::And(parts) => parts.iter().all(|f| Self::matches(record, f)),
            Filter::Or(parts) => parts.iter().any(|f| Self::matches(record, f)),
        }
    }

    /// Apply a field projection the way the store does
    fn project(record: &Record, fields: &[String]) -> Record {
        if fields.is_empty() {
            return record.clone();
        }
        Record {
            id: record.id.clone(),
            fields: record
                .fields
                .iter()
                .filter(|(name, _)| fields.iter().any(|f| f == *name))
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
        }
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn find(&self, table: &str, id: &str) -> AppResult<Record> {
        self.tables
            .read()
            .await
            .get(table)
            .and_then(|rows| rows.iter().find(|r| r.id == id))
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("record {id} in {table}")))
    }

    async fn select(&self, table: &str, query: SelectQuery) -> AppResult<Vec<Record>> {
        let tables = self.tables.read().await;
        let rows = tables.get(table).map(Vec::as_slice).unwrap_or_default();

        let mut out: Vec<Record> = rows
            .iter()
            .filter(|r| query.filter.as_ref().map_or(true, |f| Self::matches(r, f)))
            .map(|r| Self::project(r, &query.fields))
            .collect();

        if let Some(max) = query.max_records {
            out.truncate(max);
        }
        Ok(out)
    }

    async fn create(&self, table: &str, records: Vec<FieldMap>) -> AppResult<Vec<Record>> {
        let mut tables = self.tables.write().await;
        let rows = tables.entry(table.to_owned()).or_default();

        let mut created = Vec::with_capacity(records.len());
        for fields in records {
            let record = Record {
                id: Self::mint_id(),
                fields,
            };
            rows.push(record.clone());
            created.push(record);
        }
        Ok(created)
    }

    async fn update(&self, table: &str, id: &str, fields: FieldMap) -> AppResult<Record> {
        let mut tables = self.tables.write().await;
        let rows = tables
            .get_mut(table)
            .ok_or_else(|| AppError::not_found(format!("record {id} in {table}")))?;
        let record = rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| AppError::not_found(format!("record {id} in {table}")))?;

        for (name, value) in fields {
            record.fields.insert(name, value);
        }
        Ok(record.clone())
    }

    async fn destroy(&self, table: &str, ids: &[String]) -> AppResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        if ids.len() > limits::MAX_DESTROY_BATCH {
            return Err(AppError::invalid_input(format!(
                "destroy batch of {} exceeds the store limit of {}",
                ids.len(),
                limits::MAX_DESTROY_BATCH
            )));
        }

        self.destroy_batches.write().await.push(ids.len());

        let mut tables = self.tables.write().await;
        let rows = tables
            .get_mut(table)
            .ok_or_else(|| AppError::not_found(format!("table {table}")))?;
        rows.retain(|r| !ids.contains(&r.id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> FieldMap {
        let Value::Object(map) = value else {
            unreachable!("test fixture is always an object")
        };
        map
    }

    #[tokio::test]
    async fn test_filter_evaluation() {
        let store = MemoryStore::new();
        let created = store
            .create(
                "Ingredients",
                vec![
                    fields(json!({"Name": "Pomme"})),
                    fields(json!({"Name": "Poulet fermier"})),
                ],
            )
            .await
            .unwrap();

        let eq = store
            .select(
                "Ingredients",
                SelectQuery::all().filter(Filter::NameEqualsIgnoreCase {
                    field: "Name".to_owned(),
                    value: "POMME".to_owned(),
                }),
            )
            .await
            .unwrap();
        assert_eq!(eq.len(), 1);
        assert_eq!(eq[0].id, created[0].id);

        let substr = store
            .select(
                "Ingredients",
                SelectQuery::all().filter(Filter::ContainsIgnoreCase {
                    field: "Name".to_owned(),
                    value: "poulet".to_owned(),
                }),
            )
            .await
            .unwrap();
        assert_eq!(substr.len(), 1);

        let fuzzy = store
            .select(
                "Ingredients",
                SelectQuery::all().filter(Filter::MatchesIgnoreCase {
                    field: "Name".to_owned(),
                    pattern: "^pomme(e?s)?$".to_owned(),
                }),
            )
            .await
            .unwrap();
        assert_eq!(fuzzy.len(), 1);
    }

    #[tokio::test]
    async fn test_destroy_enforces_batch_limit() {
        let store = MemoryStore::new();
        let rows: Vec<FieldMap> = (0..11).map(|i| fields(json!({"n": i}))).collect();
        let created = store.create("Recipe Items", rows).await.unwrap();
        let ids: Vec<String> = created.into_iter().map(|r| r.id).collect();

        let err = store.destroy("Recipe Items", &ids).await.unwrap_err();
        assert_eq!(err.code, crate::errors::ErrorCode::InvalidInput);

        store.destroy("Recipe Items", &ids[..10]).await.unwrap();
        assert_eq!(store.dump("Recipe Items").await.len(), 1);
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let store = MemoryStore::new();
        let created = store
            .create("Ingredients", vec![fields(json!({"Name": "Lait"}))])
            .await
            .unwrap();
        let id = created[0].id.clone();

        store
            .update("Ingredients", &id, fields(json!({"Calories": 42})))
            .await
            .unwrap();
        let record = store.find("Ingredients", &id).await.unwrap();
        assert_eq!(record.str_field("Name").as_deref(), Some("Lait"));
        assert_eq!(record.f64_field("Calories"), Some(42.0));
    }
}

// ABOUTME: Case-insensitive name uniqueness guard for recipes and ingredients
// ABOUTME: Self-excludes the record under update; best-effort check-then-act by store contract
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Toque.dev

//! Name uniqueness guard
//!
//! The store enforces no uniqueness itself, so names are checked with a
//! one-record lookup before every write. Two concurrent creates of the same
//! name can both pass the check before either commits; the store offers no
//! compare-and-swap to close that window, so the race is an accepted
//! limitation of the contract rather than something this layer pretends to
//! fix.

use std::sync::Arc;

use crate::constants::fields;
use crate::errors::AppResult;
use crate::store::{Filter, RecordStore, SelectQuery};

/// Uniqueness guard over one store handle
pub struct NameUniquenessGuard {
    store: Arc<dyn RecordStore>,
}

impl NameUniquenessGuard {
    /// Create a guard
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Whether `name` is already taken in `table`, ignoring case and the
    /// record identified by `exclude_id` (the record being updated)
    ///
    /// # Errors
    ///
    /// `StoreError` when the lookup fails.
    pub async fn is_name_taken(
        &self,
        table: &str,
        name: &str,
        exclude_id: Option<&str>,
    ) -> AppResult<bool> {
        let name_match = Filter::NameEqualsIgnoreCase {
            field: fields::NAME.to_owned(),
            value: name.to_owned(),
        };
        let filter = match exclude_id {
            Some(id) => Filter::And(vec![name_match, Filter::NotRecordId(id.to_owned())]),
            None => name_match,
        };

        let hits = self
            .store
            .select(
                table,
                SelectQuery::all()
                    .filter(filter)
                    .fields([fields::NAME])
                    .max_records(1),
            )
            .await?;
        Ok(!hits.is_empty())
    }

    /// Fail with `DuplicateName` when the name is taken
    ///
    /// # Errors
    ///
    /// `DuplicateName` (400) when taken; `StoreError` when the lookup fails.
    pub async fn ensure_available(
        &self,
        table: &str,
        name: &str,
        exclude_id: Option<&str>,
    ) -> AppResult<()> {
        if self.is_name_taken(table, name, exclude_id).await? {
            return Err(crate::errors::AppError::duplicate_name(name));
        }
        Ok(())
    }
}

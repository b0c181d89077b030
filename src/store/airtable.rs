// ABOUTME: Hosted record store adapter speaking the Airtable-style HTTP API over reqwest
// ABOUTME: Renders structured filters to formula strings and iterates offset-cursor pages
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Toque.dev

//! Hosted record store adapter
//!
//! Speaks the store's REST surface: per-table CRUD with `filterByFormula`
//! predicates, `fields[]` projections, `maxRecords` caps, and offset-cursor
//! pagination. Pages are accumulated per call; iteration restarts from the
//! first page on every call (the cursor is not resumable across calls).
//!
//! No call retries. Transport and store failures map to `StoreError`
//! (502-equivalent); a missing record maps to `ResourceNotFound`; a rejected
//! field payload maps to `InvalidInput`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use tracing::debug;

use super::{FieldMap, Filter, Record, RecordStore, SelectQuery};
use crate::config::StoreConfig;
use crate::constants::limits;
use crate::errors::{AppError, AppResult};

/// Connection settings for the hosted store
#[derive(Debug, Clone)]
pub struct AirtableStoreConfig {
    /// Bearer token
    pub api_key: String,
    /// Workspace (base) identifier
    pub base_id: String,
    /// API base URL
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl From<&StoreConfig> for AirtableStoreConfig {
    fn from(config: &StoreConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            base_id: config.base_id.clone(),
            base_url: config.base_url.clone(),
            timeout_secs: config.timeout_secs,
        }
    }
}

/// Wire shape of a record
#[derive(Debug, Deserialize)]
struct WireRecord {
    id: String,
    #[serde(default)]
    fields: FieldMap,
}

impl From<WireRecord> for Record {
    fn from(wire: WireRecord) -> Self {
        Self {
            id: wire.id,
            fields: wire.fields,
        }
    }
}

/// Wire shape of a record page
#[derive(Debug, Deserialize)]
struct WirePage {
    records: Vec<WireRecord>,
    #[serde(default)]
    offset: Option<String>,
}

/// Wire shape of a create/destroy batch response
#[derive(Debug, Deserialize)]
struct WireBatch {
    #[serde(default)]
    records: Vec<WireRecord>,
}

/// Wire shape of a store error body
#[derive(Debug, Deserialize)]
struct WireError {
    error: WireErrorDetail,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireErrorDetail {
    Detail {
        #[serde(rename = "type")]
        error_type: String,
        #[serde(default)]
        message: Option<String>,
    },
    Plain(String),
}

/// Hosted record store client
pub struct AirtableStore {
    config: AirtableStoreConfig,
    http_client: Client,
}

impl AirtableStore {
    /// Create a new store client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: AirtableStoreConfig) -> AppResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::internal(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Build the URL for a table, optionally narrowed to one record
    fn table_url(&self, table: &str, record_id: Option<&str>) -> AppResult<Url> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| AppError::config(format!("invalid store base URL: {e}")))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| AppError::config("store base URL cannot be a base"))?;
            segments.push(&self.config.base_id).push(table);
            if let Some(id) = record_id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    /// Map a non-success response to the error taxonomy
    async fn response_error(table: &str, response: reqwest::Response) -> AppError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<WireError>(&body)
            .map(|w| match w.error {
                WireErrorDetail::Detail {
                    error_type,
                    message,
                } => message.unwrap_or(error_type),
                WireErrorDetail::Plain(s) => s,
            })
            .unwrap_or_else(|_| body.chars().take(200).collect());

        match status {
            StatusCode::NOT_FOUND => AppError::not_found(format!("record in {table}")),
            StatusCode::UNPROCESSABLE_ENTITY => {
                AppError::invalid_input(format!("store rejected fields for {table}: {detail}"))
            }
            _ => AppError::store(format!("{table}: HTTP {status}: {detail}")),
        }
    }

    async fn parse_page(table: &str, response: reqwest::Response) -> AppResult<WirePage> {
        if !response.status().is_success() {
            return Err(Self::response_error(table, response).await);
        }
        response
            .json()
            .await
            .map_err(|e| AppError::store(format!("{table}: malformed page: {e}")))
    }
}

/// Render a structured filter to the store's formula language
#[must_use]
pub fn render_formula(filter: &Filter) -> String {
    match filter {
        Filter::NameEqualsIgnoreCase { field, value } => {
            format!(
                "LOWER({{{field}}}) = LOWER(\"{}\")",
                escape_quotes(value)
            )
        }
        Filter::ContainsIgnoreCase { field, value } => {
            format!("FIND(\"{}\", LOWER({{{field}}}))>0", escape_quotes(value))
        }
        Filter::MatchesIgnoreCase { field, pattern } => {
            format!(
                "REGEX_MATCH(LOWER({{{field}}}), \"{}\")",
                escape_quotes(pattern)
            )
        }
        Filter::NotRecordId(id) => format!("NOT(RECORD_ID() = \"{}\")", escape_quotes(id)),
        Filter::RecordIdIn(ids) => {
            let clauses = ids
                .iter()
                .map(|id| format!("RECORD_ID()=\"{}\"", escape_quotes(id)))
                .collect::<Vec<_>>()
                .join(",");
            format!("OR({clauses})")
        }
        Filter::And(parts) => {
            let clauses = parts
                .iter()
                .map(render_formula)
                .collect::<Vec<_>>()
                .join(",");
            format!("AND({clauses})")
        }
        Filter::Or(parts) => {
            let clauses = parts
                .iter()
                .map(render_formula)
                .collect::<Vec<_>>()
                .join(",");
            format!("OR({clauses})")
        }
    }
}

fn escape_quotes(value: &str) -> String {
    value.replace('"', "\\\"")
}

#[async_trait]
impl RecordStore for AirtableStore {
    async fn find(&self, table: &str, id: &str) -> AppResult<Record> {
        let url = self.table_url(table, Some(id))?;
        let response = self
            .http_client
            .get(url)
            .bearer_auth(&self.config.api_key)
            .send()
            .await
            .map_err(|e| AppError::store(format!("{table}: {e}")))?;

        if !response.status().is_success() {
            return Err(Self::response_error(table, response).await);
        }
        let wire: WireRecord = response
            .json()
            .await
            .map_err(|e| AppError::store(format!("{table}: malformed record: {e}")))?;
        Ok(wire.into())
    }

    async fn select(&self, table: &str, query: SelectQuery) -> AppResult<Vec<Record>> {
        let mut records = Vec::new();
        let mut offset: Option<String> = None;

        loop {
            let url = self.table_url(table, None)?;
            let mut request = self.http_client.get(url).bearer_auth(&self.config.api_key);

            if let Some(filter) = &query.filter {
                request = request.query(&[("filterByFormula", render_formula(filter))]);
            }
            for field in &query.fields {
                request = request.query(&[("fields[]", field)]);
            }
            if let Some(max) = query.max_records {
                request = request.query(&[("maxRecords", max.to_string())]);
            }
            request = request.query(&[("pageSize", limits::SELECT_PAGE_SIZE.to_string())]);
            if let Some(cursor) = &offset {
                request = request.query(&[("offset", cursor)]);
            }

            let response = request
                .send()
                .await
                .map_err(|e| AppError::store(format!("{table}: {e}")))?;
            let page = Self::parse_page(table, response).await?;

            records.extend(page.records.into_iter().map(Record::from));
            if let Some(max) = query.max_records {
                if records.len() >= max {
                    records.truncate(max);
                    break;
                }
            }

            match page.offset {
                Some(cursor) => offset = Some(cursor),
                None => break,
            }
        }

        debug!("select {table}: {} records", records.len());
        Ok(records)
    }

    async fn create(&self, table: &str, records: Vec<FieldMap>) -> AppResult<Vec<Record>> {
        let mut created = Vec::with_capacity(records.len());

        // The store caps write batches the same way it caps destroys.
        for chunk in records.chunks(limits::MAX_DESTROY_BATCH) {
            let url = self.table_url(table, None)?;
            let body = serde_json::json!({
                "records": chunk
                    .iter()
                    .map(|fields| serde_json::json!({ "fields": fields }))
                    .collect::<Vec<_>>(),
            });

            let response = self
                .http_client
                .post(url)
                .bearer_auth(&self.config.api_key)
                .json(&body)
                .send()
                .await
                .map_err(|e| AppError::store(format!("{table}: {e}")))?;

            if !response.status().is_success() {
                return Err(Self::response_error(table, response).await);
            }
            let batch: WireBatch = response
                .json()
                .await
                .map_err(|e| AppError::store(format!("{table}: malformed batch: {e}")))?;
            created.extend(batch.records.into_iter().map(Record::from));
        }

        Ok(created)
    }

    async fn update(&self, table: &str, id: &str, fields: FieldMap) -> AppResult<Record> {
        let url = self.table_url(table, Some(id))?;
        let response = self
            .http_client
            .patch(url)
            .bearer_auth(&self.config.api_key)
            .json(&serde_json::json!({ "fields": fields }))
            .send()
            .await
            .map_err(|e| AppError::store(format!("{table}: {e}")))?;

        if !response.status().is_success() {
            return Err(Self::response_error(table, response).await);
        }
        let wire: WireRecord = response
            .json()
            .await
            .map_err(|e| AppError::store(format!("{table}: malformed record: {e}")))?;
        Ok(wire.into())
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

        let url = self.table_url(table, None)?;
        let params: Vec<(&str, &str)> = ids.iter().map(|id| ("records[]", id.as_str())).collect();
        let response = self
            .http_client
            .delete(url)
            .bearer_auth(&self.config.api_key)
            .query(&params)
            .send()
            .await
            .map_err(|e| AppError::store(format!("{table}: {e}")))?;

        if !response.status().is_success() {
            return Err(Self::response_error(table, response).await);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formula_rendering_matches_store_language() {
        let eq = Filter::NameEqualsIgnoreCase {
            field: "Name".to_owned(),
            value: "Poulet".to_owned(),
        };
        assert_eq!(render_formula(&eq), "LOWER({Name}) = LOWER(\"Poulet\")");

        let excl = Filter::And(vec![eq, Filter::NotRecordId("rec123".to_owned())]);
        assert_eq!(
            render_formula(&excl),
            "AND(LOWER({Name}) = LOWER(\"Poulet\"),NOT(RECORD_ID() = \"rec123\"))"
        );

        let fuzzy = Filter::MatchesIgnoreCase {
            field: "Name".to_owned(),
            pattern: "^pomme(e?s)?$".to_owned(),
        };
        assert_eq!(
            render_formula(&fuzzy),
            "REGEX_MATCH(LOWER({Name}), \"^pomme(e?s)?$\")"
        );
    }

    #[test]
    fn test_formula_escapes_embedded_quotes() {
        let filter = Filter::ContainsIgnoreCase {
            field: "Name".to_owned(),
            value: "a\"b".to_owned(),
        };
        assert_eq!(render_formula(&filter), "FIND(\"a\\\"b\", LOWER({Name}))>0");
    }
}

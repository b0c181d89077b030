// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Parses store credentials, collaborator endpoints, and HTTP settings from env vars
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Toque.dev

//! Environment-based configuration management
//!
//! All runtime configuration comes from environment variables. The record
//! store credentials are mandatory; the LLM collaborator settings fall back
//! to defaults suitable for an OpenAI-compatible endpoint.

use std::env;

use crate::constants::env_config;
use crate::errors::{AppError, AppResult};

/// Default base URL of the hosted record store API
const DEFAULT_STORE_BASE_URL: &str = "https://api.airtable.com/v0";

/// Default base URL of the OpenAI-compatible chat completion API
const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";

/// Default chat model used for nutrition inference and recipe generation
const DEFAULT_LLM_MODEL: &str = "gpt-3.5-turbo";

/// Timeout applied to collaborator calls; enrichment must never hang a write
const DEFAULT_LLM_TIMEOUT_SECS: u64 = 30;

/// Timeout applied to record store calls
const DEFAULT_STORE_TIMEOUT_SECS: u64 = 15;

/// Top-level server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP API port
    pub http_port: u16,
    /// Hosted record store settings
    pub store: StoreConfig,
    /// Chat-completion collaborator settings
    pub llm: LlmConfig,
}

/// Hosted record store connection settings
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// API key (bearer token)
    pub api_key: String,
    /// Base (workspace) identifier
    pub base_id: String,
    /// API base URL
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

/// Chat-completion collaborator settings
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// API key; optional for local OpenAI-compatible servers
    pub api_key: Option<String>,
    /// API base URL
    pub base_url: String,
    /// Model identifier
    pub model: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_LLM_BASE_URL.to_owned(),
            model: DEFAULT_LLM_MODEL.to_owned(),
            timeout_secs: DEFAULT_LLM_TIMEOUT_SECS,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// Reads:
    /// - `HTTP_PORT` (default 3000)
    /// - `STORE_API_KEY` / `STORE_BASE_ID` (required)
    /// - `STORE_BASE_URL`, `STORE_TIMEOUT_SECS`
    /// - `LLM_API_KEY`, `LLM_BASE_URL`, `LLM_MODEL`, `LLM_TIMEOUT_SECS`
    ///
    /// # Errors
    ///
    /// Returns `ConfigMissing` when a required variable is absent and
    /// `ConfigError` when a numeric variable cannot be parsed.
    pub fn from_env() -> AppResult<Self> {
        let store = StoreConfig {
            api_key: required_var("STORE_API_KEY")?,
            base_id: required_var("STORE_BASE_ID")?,
            base_url: env::var("STORE_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_STORE_BASE_URL.to_owned()),
            timeout_secs: parsed_var("STORE_TIMEOUT_SECS", DEFAULT_STORE_TIMEOUT_SECS)?,
        };

        let llm = LlmConfig {
            api_key: env::var("LLM_API_KEY").ok().filter(|k| !k.is_empty()),
            base_url: env::var("LLM_BASE_URL").unwrap_or_else(|_| DEFAULT_LLM_BASE_URL.to_owned()),
            model: env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_LLM_MODEL.to_owned()),
            timeout_secs: parsed_var("LLM_TIMEOUT_SECS", DEFAULT_LLM_TIMEOUT_SECS)?,
        };

        Ok(Self {
            http_port: env_config::http_port(),
            store,
            llm,
        })
    }

    /// One-line startup summary safe for logs (no secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "http_port={} store_base={} llm_model={} llm_timeout={}s",
            self.http_port, self.store.base_id, self.llm.model, self.llm.timeout_secs
        )
    }
}

fn required_var(name: &str) -> AppResult<String> {
    env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::config_missing(name))
}

fn parsed_var(name: &str, default: u64) -> AppResult<u64> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| AppError::config(format!("invalid {name}: {e}"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_defaults() {
        let llm = LlmConfig::default();
        assert_eq!(llm.timeout_secs, 30);
        assert_eq!(llm.model, "gpt-3.5-turbo");
        assert!(llm.api_key.is_none());
    }
}

// ABOUTME: OpenAI-compatible chat completion client backing the RecipeAdvisor trait
// ABOUTME: Bounded by a 30s timeout; maps transport and API failures to CollaboratorError
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Toque.dev

//! # Chat Completion Client
//!
//! Speaks the `OpenAI` chat completions API: one `POST /chat/completions`
//! per advisor call, no streaming, no retries. Works against the hosted API
//! or any compatible endpoint via `LLM_BASE_URL`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{draft_from_value, nutrition_from_value, prompts, strip_code_fences, RecipeAdvisor};
use crate::config::LlmConfig;
use crate::errors::{AppError, AppResult};
use crate::models::{NutritionFacts, RecipeDraft};

/// Sampling temperature for nutrition inference: deterministic facts
const NUTRITION_TEMPERATURE: f32 = 0.0;

/// Sampling temperature for recipe drafting: some creative freedom
const GENERATION_TEMPERATURE: f32 = 0.7;

/// Chat completions request body
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

/// One chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

impl ChatMessage {
    fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_owned(),
            content: content.into(),
        }
    }

    fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_owned(),
            content: content.into(),
        }
    }
}

/// Chat completions response body
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// Error body of an OpenAI-compatible endpoint
#[derive(Debug, Deserialize)]
struct ChatErrorResponse {
    error: ChatErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ChatErrorDetail {
    message: String,
}

/// OpenAI-compatible chat client implementing [`RecipeAdvisor`]
pub struct ChatClient {
    client: Client,
    config: LlmConfig,
}

impl ChatClient {
    /// Create a new client from collaborator settings
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: LlmConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::internal(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Perform one chat completion and return the first choice's content
    async fn complete(&self, messages: Vec<ChatMessage>, temperature: f32) -> AppResult<String> {
        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        let body = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages,
            temperature,
        };

        let mut request = self.client.post(&url).json(&body);
        if let Some(api_key) = &self.config.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::collaborator("chat completion", e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ChatErrorResponse>(&text)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| text.chars().take(200).collect());
            return Err(AppError::collaborator(
                "chat completion",
                format!("HTTP {status}: {detail}"),
            ));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AppError::collaborator("chat completion", e.to_string()))?;

        let content = completion
            .choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AppError::collaborator("chat completion", "empty response"))?;

        debug!("chat completion returned {} chars", content.len());
        Ok(content.to_owned())
    }
}

#[async_trait]
impl RecipeAdvisor for ChatClient {
    async fn infer_nutrition(&self, name: &str) -> AppResult<NutritionFacts> {
        let messages = vec![ChatMessage::user(prompts::nutrition_prompt(name))];
        let content = self.complete(messages, NUTRITION_TEMPERATURE).await?;

        let value: serde_json::Value = serde_json::from_str(strip_code_fences(&content))
            .map_err(|e| {
                AppError::collaborator("nutrition inference", format!("malformed JSON: {e}"))
            })?;
        Ok(nutrition_from_value(&value))
    }

    async fn generate_recipe(&self, prompt: &str) -> AppResult<RecipeDraft> {
        let messages = vec![
            ChatMessage::system(prompts::generation_system_prompt()),
            ChatMessage::user(prompt),
        ];
        let content = self.complete(messages, GENERATION_TEMPERATURE).await?;

        let value: serde_json::Value = serde_json::from_str(strip_code_fences(&content))
            .map_err(|e| {
                AppError::collaborator("recipe generation", format!("malformed JSON: {e}"))
            })?;
        draft_from_value(&value)
    }
}

// ABOUTME: Configuration module grouping environment-driven settings
// ABOUTME: Re-exports the server configuration types for convenient access
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Toque.dev

//! Configuration management

/// Environment-based configuration management
pub mod environment;

pub use environment::{LlmConfig, ServerConfig, StoreConfig};

// ABOUTME: Main library entry point for the Toque Kitchen API server
// ABOUTME: Recipes and ingredients over a hosted record store with AI-assisted nutrition
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Toque.dev

#![deny(unsafe_code)]

//! # Toque API Server
//!
//! A recipe and ingredient API backed by a hosted tabular record store that
//! offers no foreign keys, no transactions, and no server-side aggregation.
//! The heart of this crate is the consistency layer that turns the flat
//! store into a relational model:
//!
//! - **Uniqueness**: recipe and ingredient names stay unique
//!   case-insensitively, enforced with best-effort check-then-act lookups.
//! - **Resolution**: free-text ingredient references resolve to stable ids —
//!   exact match, singular/plural-tolerant fuzzy match, or create-and-enrich
//!   through the nutrition inference collaborator.
//! - **Join management**: the recipe↔ingredient join table is maintained by
//!   hand with a fixed destroy → create → relink phase order.
//! - **Aggregation**: derived nutrition totals are recomputed from the join
//!   set after every change and never accepted from clients.
//! - **Integrity**: ingredients cannot be deleted while referenced by a live
//!   recipe; deleting a recipe cascades over its join records.
//!
//! The HTTP surface, the record store itself, and the AI collaborators are
//! thin adapters or remote services; the invariants all live in
//! [`services`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use toque_api_server::config::ServerConfig;
//! use toque_api_server::errors::AppResult;
//!
//! fn main() -> AppResult<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("Toque API server configured: {}", config.summary());
//!     Ok(())
//! }
//! ```

/// Configuration management
pub mod config;

/// Application constants: store schema, vocabularies, limits
pub mod constants;

/// Dependency-injection container for routes and tests
pub mod context;

/// Unified error handling with standard error codes and HTTP responses
pub mod errors;

/// AI collaborator abstraction (nutrition inference, recipe generation)
pub mod llm;

/// Production logging and structured output
pub mod logging;

/// Common data models and controlled vocabularies
pub mod models;

/// HTTP routes
pub mod routes;

/// Domain service layer: the consistency model over the record store
pub mod services;

/// Record store abstraction with hosted and in-memory implementations
pub mod store;

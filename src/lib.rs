// ABOUTME: Library root for the repsmith fitness backend
// ABOUTME: Wires the plan generation pipeline, storage, LLM providers, and HTTP routes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 repsmith contributors

//! # repsmith
//!
//! A fitness-tracking backend whose core is the daily workout plan
//! generation pipeline: build a grounded prompt from user state, workout
//! history, the exercise catalog, and retrieved reference snippets; invoke
//! a language model; robustly extract a JSON array from its possibly
//! malformed output; validate it against the record schema and domain
//! invariants; and persist the result atomically.
//!
//! ## Modules
//!
//! - **config**: explicit configuration objects loaded from the environment
//! - **database**: the `PlanStore` contract and its `sqlx` SQLite implementation
//! - **errors**: unified error handling with `AppError` and `ErrorCode`
//! - **llm**: the `LlmProvider` SPI with Groq and local backends
//! - **logging**: structured logging setup
//! - **models**: domain types shared across the pipeline
//! - **plan**: the generation pipeline (context, prompt, extract, normalize, validate)
//! - **retrieval**: the similarity-search collaborator (never fatal)
//! - **routes**: axum HTTP surface

/// Configuration management
pub mod config;
/// Persistence layer
pub mod database;
/// Unified error handling
pub mod errors;
/// LLM provider abstraction
pub mod llm;
/// Logging setup
pub mod logging;
/// Domain model types
pub mod models;
/// Plan generation pipeline
pub mod plan;
/// Retrieval collaborator
pub mod retrieval;
/// HTTP routes
pub mod routes;

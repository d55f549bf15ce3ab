// ABOUTME: Configuration management for server, LLM endpoint, and retrieval settings
// ABOUTME: Loads explicit config structs from environment variables, passed down by value
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 repsmith contributors

//! Configuration module for the repsmith server
//!
//! All runtime configuration lives in explicit structs loaded once at
//! startup and handed to the components that need them. The LLM endpoint
//! settings in particular are never ambient state: [`LlmConfig`] is passed
//! to the provider constructor.

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt::{self, Display, Formatter};
use tracing::info;

use crate::errors::{AppError, AppResult};

/// LLM provider selection for plan generation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProviderType {
    /// Groq provider - LPU-accelerated inference for open-source models (default)
    #[default]
    Groq,
    /// Local LLM provider - `OpenAI`-compatible endpoint (Ollama, vLLM, TGI)
    Local,
}

impl LlmProviderType {
    /// Environment variable name for LLM provider selection
    pub const ENV_VAR: &'static str = "REPSMITH_LLM_PROVIDER";

    /// Parse from string with fallback to default
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "local" | "ollama" | "vllm" | "tgi" => Self::Local,
            _ => Self::Groq,
        }
    }

    /// Load from environment variable
    #[must_use]
    pub fn from_env() -> Self {
        env::var(Self::ENV_VAR)
            .map(|s| Self::from_str_or_default(&s))
            .unwrap_or_default()
    }
}

impl Display for LlmProviderType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Groq => write!(f, "groq"),
            Self::Local => write!(f, "local"),
        }
    }
}

/// Explicit LLM endpoint configuration
///
/// Constructed once and passed to the provider constructor. Defaults match
/// the plan generation workload: low temperature for schema adherence, a
/// generous completion budget for 16-record plans.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Which provider backend to use
    pub provider: LlmProviderType,
    /// API key (optional for local endpoints)
    pub api_key: Option<String>,
    /// Base URL override (used by the local provider)
    pub base_url: Option<String>,
    /// Model identifier
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum tokens to generate
    pub max_new_tokens: u32,
}

impl LlmConfig {
    /// Default sampling temperature for plan generation
    pub const DEFAULT_TEMPERATURE: f32 = 0.2;
    /// Default completion token budget
    pub const DEFAULT_MAX_NEW_TOKENS: u32 = 3000;
    /// Default model for the Groq provider
    pub const DEFAULT_GROQ_MODEL: &'static str = "llama-3.3-70b-versatile";
    /// Default model for local `OpenAI`-compatible endpoints
    pub const DEFAULT_LOCAL_MODEL: &'static str = "qwen2.5:14b-instruct";

    /// Load LLM configuration from environment variables
    ///
    /// Reads `REPSMITH_LLM_PROVIDER`, `REPSMITH_LLM_MODEL`,
    /// `REPSMITH_LLM_API_KEY` (falling back to `GROQ_API_KEY` for the Groq
    /// provider), `REPSMITH_LLM_BASE_URL`, `REPSMITH_LLM_TEMPERATURE`, and
    /// `REPSMITH_LLM_MAX_NEW_TOKENS`.
    ///
    /// # Errors
    ///
    /// Returns an error if the Groq provider is selected and no API key is
    /// configured.
    pub fn from_env() -> AppResult<Self> {
        let provider = LlmProviderType::from_env();

        let api_key = env::var("REPSMITH_LLM_API_KEY")
            .or_else(|_| env::var("GROQ_API_KEY"))
            .ok();

        if provider == LlmProviderType::Groq && api_key.is_none() {
            return Err(AppError::config(
                "Groq provider selected but neither REPSMITH_LLM_API_KEY nor GROQ_API_KEY is set",
            ));
        }

        let model = env::var("REPSMITH_LLM_MODEL").unwrap_or_else(|_| {
            match provider {
                LlmProviderType::Groq => Self::DEFAULT_GROQ_MODEL,
                LlmProviderType::Local => Self::DEFAULT_LOCAL_MODEL,
            }
            .to_owned()
        });

        let temperature = env::var("REPSMITH_LLM_TEMPERATURE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(Self::DEFAULT_TEMPERATURE);

        let max_new_tokens = env::var("REPSMITH_LLM_MAX_NEW_TOKENS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(Self::DEFAULT_MAX_NEW_TOKENS);

        Ok(Self {
            provider,
            api_key,
            base_url: env::var("REPSMITH_LLM_BASE_URL").ok(),
            model,
            temperature,
            max_new_tokens,
        })
    }
}

/// Similarity-search collaborator configuration
#[derive(Debug, Clone)]
pub struct RetrievalConfig {
    /// Base URL of the similarity-search service; `None` disables retrieval
    pub base_url: Option<String>,
    /// Number of snippets to request
    pub top_k: usize,
}

impl RetrievalConfig {
    /// Default number of retrieved snippets
    pub const DEFAULT_TOP_K: usize = 5;

    /// Load retrieval configuration from environment variables
    ///
    /// Reads `REPSMITH_RETRIEVAL_URL` and `REPSMITH_RETRIEVAL_TOP_K`.
    /// A missing URL disables retrieval; the pipeline then runs with an
    /// empty reference-context block.
    #[must_use]
    pub fn from_env() -> Self {
        let top_k = env::var("REPSMITH_RETRIEVAL_TOP_K")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(Self::DEFAULT_TOP_K);

        Self {
            base_url: env::var("REPSMITH_RETRIEVAL_URL").ok(),
            top_k,
        }
    }
}

/// Top-level server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen port
    pub http_port: u16,
    /// Database connection URL
    pub database_url: String,
}

impl ServerConfig {
    /// Default HTTP port
    pub const DEFAULT_HTTP_PORT: u16 = 8081;
    /// Default database URL
    pub const DEFAULT_DATABASE_URL: &'static str = "sqlite:data/repsmith.db";

    /// Load server configuration from environment variables
    #[must_use]
    pub fn from_env() -> Self {
        info!("Loading configuration from environment variables");

        let http_port = env::var("HTTP_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(Self::DEFAULT_HTTP_PORT);

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| Self::DEFAULT_DATABASE_URL.to_owned());

        Self {
            http_port,
            database_url,
        }
    }

    /// One-line summary for startup logging
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "http_port={} database_url={}",
            self.http_port, self.database_url
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_type_parsing() {
        assert_eq!(
            LlmProviderType::from_str_or_default("ollama"),
            LlmProviderType::Local
        );
        assert_eq!(
            LlmProviderType::from_str_or_default("vllm"),
            LlmProviderType::Local
        );
        assert_eq!(
            LlmProviderType::from_str_or_default("groq"),
            LlmProviderType::Groq
        );
        // Unknown values fall back to the default
        assert_eq!(
            LlmProviderType::from_str_or_default("mystery"),
            LlmProviderType::Groq
        );
    }
}

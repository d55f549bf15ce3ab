// ABOUTME: Unified LLM provider selector built from explicit configuration
// ABOUTME: Abstracts over Groq and local OpenAI-compatible providers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 repsmith contributors

//! # LLM Provider Selector
//!
//! A unified interface over the configured provider backends. Unlike
//! ambient-environment designs, the selector is constructed from an
//! explicit [`LlmConfig`] so tests and callers control every endpoint
//! parameter.

use std::fmt;

use async_trait::async_trait;
use tracing::info;

use super::{
    ChatRequest, ChatResponse, GroqProvider, LlmProvider, OpenAiCompatibleConfig,
    OpenAiCompatibleProvider,
};
use crate::config::{LlmConfig, LlmProviderType};
use crate::errors::AppError;

/// Unified chat provider wrapping the configured backend
pub enum ChatProvider {
    /// Groq provider for fast, cost-effective inference
    Groq(GroqProvider),
    /// Local LLM provider via `OpenAI`-compatible API (Ollama, vLLM, TGI)
    Local(OpenAiCompatibleProvider),
}

impl ChatProvider {
    /// Create a provider from an explicit configuration object
    ///
    /// # Errors
    ///
    /// Returns an error if the configured provider requires an API key and
    /// none is present in the config.
    pub fn from_config(config: &LlmConfig) -> Result<Self, AppError> {
        info!(
            "Initializing LLM provider: {} (set {} to change)",
            config.provider,
            LlmProviderType::ENV_VAR
        );

        match config.provider {
            LlmProviderType::Groq => {
                let api_key = config.api_key.clone().ok_or_else(|| {
                    AppError::config("Groq provider requires an API key in LlmConfig")
                })?;
                Ok(Self::Groq(
                    GroqProvider::new(api_key).with_default_model(config.model.clone()),
                ))
            }
            LlmProviderType::Local => {
                let mut local = OpenAiCompatibleConfig {
                    default_model: config.model.clone(),
                    api_key: config.api_key.clone(),
                    ..OpenAiCompatibleConfig::default()
                };
                if let Some(base_url) = &config.base_url {
                    local.base_url.clone_from(base_url);
                }
                Ok(Self::Local(OpenAiCompatibleProvider::new(local)))
            }
        }
    }

    /// Get the provider type
    #[must_use]
    pub const fn provider_type(&self) -> LlmProviderType {
        match self {
            Self::Groq(_) => LlmProviderType::Groq,
            Self::Local(_) => LlmProviderType::Local,
        }
    }
}

impl fmt::Debug for ChatProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Groq(_) => f.debug_tuple("ChatProvider::Groq").finish(),
            Self::Local(_) => f.debug_tuple("ChatProvider::Local").finish(),
        }
    }
}

// Delegate the LlmProvider contract to the underlying provider
#[async_trait]
impl LlmProvider for ChatProvider {
    fn name(&self) -> &'static str {
        match self {
            Self::Groq(p) => p.name(),
            Self::Local(p) => p.name(),
        }
    }

    fn display_name(&self) -> &'static str {
        match self {
            Self::Groq(p) => p.display_name(),
            Self::Local(p) => p.display_name(),
        }
    }

    fn default_model(&self) -> &str {
        match self {
            Self::Groq(p) => p.default_model(),
            Self::Local(p) => p.default_model(),
        }
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        match self {
            Self::Groq(p) => p.complete(request).await,
            Self::Local(p) => p.complete(request).await,
        }
    }

    async fn health_check(&self) -> Result<bool, AppError> {
        match self {
            Self::Groq(p) => p.health_check().await,
            Self::Local(p) => p.health_check().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groq_requires_api_key() {
        let config = LlmConfig {
            provider: LlmProviderType::Groq,
            api_key: None,
            base_url: None,
            model: "llama-3.3-70b-versatile".to_owned(),
            temperature: 0.2,
            max_new_tokens: 3000,
        };
        assert!(ChatProvider::from_config(&config).is_err());
    }

    #[test]
    fn test_local_without_api_key() {
        let config = LlmConfig {
            provider: LlmProviderType::Local,
            api_key: None,
            base_url: Some("http://localhost:8000/v1".to_owned()),
            model: "qwen2.5:14b-instruct".to_owned(),
            temperature: 0.2,
            max_new_tokens: 3000,
        };
        let provider = ChatProvider::from_config(&config);
        assert!(provider.is_ok());
    }
}

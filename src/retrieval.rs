// ABOUTME: Similarity-search collaborator client for prompt grounding snippets
// ABOUTME: Degrades every failure to an empty result set; retrieval is never fatal
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 repsmith contributors

//! # Retrieval Collaborator
//!
//! The plan generation pipeline grounds its prompt with a handful of
//! reference snippets from an external similarity-search service. Grounding
//! is an enhancement, not a correctness requirement: the [`SnippetSource`]
//! contract is that `search` never fails: connection errors, bad payloads,
//! and empty indexes all degrade to an empty vec, logged at `warn` level.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::RetrievalConfig;

/// One retrieved reference snippet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snippet {
    /// Snippet body
    pub text: String,
    /// Optional source label
    #[serde(default)]
    pub title: Option<String>,
}

/// Source of reference snippets for prompt grounding
///
/// Implementations must not fail: any error path returns an empty vec.
#[async_trait]
pub trait SnippetSource: Send + Sync {
    /// Return up to `k` snippets ranked by similarity to `query`
    async fn search(&self, query: &str, k: usize) -> Vec<Snippet>;
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    k: usize,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<Snippet>,
}

/// HTTP client for an external similarity-search service
///
/// Posts `{ query, k }` to `{base_url}/search` and expects
/// `{ results: [{ text, title? }] }` back.
pub struct HttpSnippetSource {
    client: Client,
    base_url: Option<String>,
}

impl HttpSnippetSource {
    /// Create a client from the retrieval configuration
    ///
    /// A config without a base URL produces a permanently-empty source.
    #[must_use]
    pub fn new(config: &RetrievalConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.clone(),
        }
    }
}

#[async_trait]
impl SnippetSource for HttpSnippetSource {
    async fn search(&self, query: &str, k: usize) -> Vec<Snippet> {
        let Some(base_url) = &self.base_url else {
            debug!("Retrieval disabled (no base URL configured)");
            return Vec::new();
        };

        let url = format!("{}/search", base_url.trim_end_matches('/'));
        let request = SearchRequest { query, k };

        let response = match self.client.post(&url).json(&request).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Similarity search request failed, continuing without context: {e}");
                return Vec::new();
            }
        };

        if !response.status().is_success() {
            warn!(
                "Similarity search returned status {}, continuing without context",
                response.status()
            );
            return Vec::new();
        }

        match response.json::<SearchResponse>().await {
            Ok(body) => {
                debug!("Retrieved {} snippets for prompt grounding", body.results.len());
                body.results
            }
            Err(e) => {
                warn!("Similarity search payload unreadable, continuing without context: {e}");
                Vec::new()
            }
        }
    }
}

/// A snippet source that always returns nothing
///
/// Used when retrieval is disabled and as a stand-in for tests.
pub struct NoopSnippetSource;

#[async_trait]
impl SnippetSource for NoopSnippetSource {
    async fn search(&self, _query: &str, _k: usize) -> Vec<Snippet> {
        Vec::new()
    }
}

//! Pinecone vector index and the `SemanticSearch` built on it.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use waypoint_core::{BackendError, Embedder, SemanticMatch, SemanticSearch};

use crate::http;

const API_VERSION: &str = "2024-07";

/// Pinecone settings, from the `[pinecone]` section or `WAYPOINT_PINECONE__*`.
#[derive(Debug, Clone, Deserialize)]
pub struct PineconeConfig {
    #[serde(default)]
    pub api_key: String,
    /// Data-plane host of the index, with or without scheme.
    #[serde(default)]
    pub index_host: String,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for PineconeConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            index_host: String::new(),
            namespace: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    include_values: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<ScoredVector>,
}

#[derive(Debug, Deserialize)]
struct ScoredVector {
    id: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Thin client for one Pinecone index.
#[derive(Debug, Clone)]
pub struct PineconeIndex {
    http: reqwest::Client,
    query_url: String,
    api_key: String,
    namespace: Option<String>,
}

impl PineconeIndex {
    pub fn new(config: &PineconeConfig) -> Result<Self, BackendError> {
        let host = config.index_host.trim_end_matches('/');
        let base = if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("https://{host}")
        };

        Ok(Self {
            http: http::build_client(Duration::from_secs(config.timeout_secs))?,
            query_url: format!("{base}/query"),
            api_key: config.api_key.clone(),
            namespace: config.namespace.clone().filter(|ns| !ns.is_empty()),
        })
    }

    /// Nearest neighbours of `vector`, ranked 1..n in the index's order.
    pub async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<SemanticMatch>, BackendError> {
        let body = QueryRequest {
            vector,
            top_k,
            include_metadata: true,
            include_values: false,
            namespace: self.namespace.as_deref(),
        };
        let headers = [
            ("Api-Key", self.api_key.as_str()),
            ("X-Pinecone-API-Version", API_VERSION),
        ];

        let response: QueryResponse = http::post_json(&self.http, &self.query_url, &headers, &body).await?;

        Ok(response
            .matches
            .into_iter()
            .take(top_k)
            .enumerate()
            .map(|(i, m)| SemanticMatch {
                id: m.id,
                rank: i + 1,
                score: m.score,
                metadata: m.metadata.unwrap_or_default(),
            })
            .collect())
    }
}

/// Embeds the query text, then asks the index for its neighbours.
pub struct PineconeSearch {
    embedder: Arc<dyn Embedder>,
    index: PineconeIndex,
}

impl PineconeSearch {
    pub fn new(embedder: Arc<dyn Embedder>, index: PineconeIndex) -> Self {
        Self { embedder, index }
    }
}

#[async_trait]
impl SemanticSearch for PineconeSearch {
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<SemanticMatch>, BackendError> {
        let vector = self.embedder.embed(query).await?;
        let matches = self.index.query(&vector, top_k).await?;
        tracing::debug!(top_k, returned = matches.len(), "Pinecone query complete");
        Ok(matches)
    }
}

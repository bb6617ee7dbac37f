//! Backend ports the pipeline depends on.
//!
//! Concrete implementations live in `waypoint-graph` (Neo4j) and
//! `waypoint-providers` (Pinecone, OpenAI). The orchestrator only ever sees
//! these traits, so tests can inject in-process fakes.

use async_trait::async_trait;

use crate::error::BackendError;
use crate::types::{ChatMessage, GraphFact, SemanticMatch};

/// Vector-similarity retrieval.
#[async_trait]
pub trait SemanticSearch: Send + Sync {
    /// Return up to `top_k` matches in relevance order.
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<SemanticMatch>, BackendError>;
}

/// Relationship lookup for a set of entity ids.
#[async_trait]
pub trait GraphContext: Send + Sync {
    /// Return facts whose source is one of `ids`.
    ///
    /// Implementations must return an empty list for empty input without
    /// touching the backend.
    async fn expand(&self, ids: &[String]) -> Result<Vec<GraphFact>, BackendError>;

    /// Release any persistent connection. Calling it more than once is harmless.
    async fn close(&self) {}
}

/// Text generation from a structured message list.
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, BackendError>;
}

/// Text → embedding vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, BackendError>;
}

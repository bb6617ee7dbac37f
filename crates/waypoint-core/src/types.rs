//! Core domain types for the Waypoint pipeline.
//!
//! These types flow from the retrieval backends through prompt assembly to the
//! caller, and a `PipelineResult` is also the unit stored in the result cache.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ── Retrieval ─────────────────────────────────────────────────────

/// An item ranked by vector similarity to the query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SemanticMatch {
    /// Opaque identifier, unique within one response. Also the graph node id.
    pub id: String,
    /// 1-based position in relevance order.
    pub rank: usize,
    /// Similarity score reported by the index.
    pub score: f32,
    /// Free-form metadata attached to the indexed item.
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl SemanticMatch {
    /// The item's category, read from the `type` or `category` metadata field.
    pub fn category(&self) -> Option<&str> {
        self.metadata
            .get("type")
            .or_else(|| self.metadata.get("category"))
            .and_then(|v| v.as_str())
    }

    /// The indexed text snippet, if the metadata carries one.
    pub fn text(&self) -> Option<&str> {
        self.metadata.get("text").and_then(|v| v.as_str())
    }
}

/// A directed relationship edge from a matched entity to a neighbour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GraphFact {
    pub source_id: String,
    pub relation: String,
    pub target_id: String,
    pub target_name: String,
    pub target_description: String,
    #[serde(default)]
    pub target_labels: Vec<String>,
}

// ── Chat ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// One role/content pair in the message list sent to the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

// ── Pipeline Output ───────────────────────────────────────────────

/// The structured outcome of one pipeline run.
///
/// Stored in the result cache with `cached = false`; a cache hit hands back a
/// copy with `cached = true`. `run_id` and `completed_at` always describe the
/// run that actually produced the answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineResult {
    pub run_id: Uuid,
    pub query: String,
    pub top_k: usize,
    pub matches: Vec<SemanticMatch>,
    pub graph_facts: Vec<GraphFact>,
    pub answer: String,
    pub cached: bool,
    pub completed_at: DateTime<Utc>,
}

impl PipelineResult {
    /// True when at least one relationship fact reached the prompt.
    pub fn has_graph_facts(&self) -> bool {
        !self.graph_facts.is_empty()
    }

    /// One-line description of the context the answer was grounded on.
    pub fn summary(&self) -> String {
        format!(
            "{} semantic matches, {} graph facts",
            self.matches.len(),
            self.graph_facts.len()
        )
    }
}

/// Semantic matches and their graph context, without a generated answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievalResult {
    pub query: String,
    pub top_k: usize,
    pub matches: Vec<SemanticMatch>,
    pub graph_facts: Vec<GraphFact>,
    /// False when graph expansion failed and the facts are missing for that reason.
    pub graph_available: bool,
}

impl RetrievalResult {
    pub fn summary(&self) -> String {
        format!(
            "{} semantic matches, {} graph facts",
            self.matches.len(),
            self.graph_facts.len()
        )
    }
}

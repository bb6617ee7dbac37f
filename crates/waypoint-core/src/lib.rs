//! waypoint-core: Shared types, backend ports, configuration, and error handling for Waypoint.
//!
//! This crate provides the foundational pieces used across all Waypoint components:
//! - Retrieval types (SemanticMatch, GraphFact) and the PipelineResult returned to callers
//! - Chat message types handed to the language model
//! - Backend port traits (SemanticSearch, GraphContext, ModelInvoker, Embedder)
//! - Configuration loading
//! - Common error types

pub mod config;
pub mod error;
pub mod ports;
pub mod types;

pub use error::{BackendError, RetryExhausted, WaypointError};
pub use ports::{Embedder, GraphContext, ModelInvoker, SemanticSearch};
pub use types::{ChatMessage, GraphFact, PipelineResult, RetrievalResult, Role, SemanticMatch};

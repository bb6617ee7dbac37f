//! waypoint-graph: Neo4j backend for graph-context expansion.
//!
//! Looks up the relationship neighbourhood of the entities returned by
//! semantic search and turns each edge into a `GraphFact`. The connection
//! pool is shared read-only by every pipeline run and released once on close.

pub mod client;
pub mod context;
pub mod queries;

pub use client::{GraphClient, GraphConfig, GraphError};

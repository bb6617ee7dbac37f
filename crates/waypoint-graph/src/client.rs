//! Neo4j connection management and shared graph client.

use std::sync::Arc;

use neo4rs::{ConfigBuilder, Graph, Query};
use serde::Deserialize;
use tokio::sync::RwLock;

/// Errors from graph operations.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Neo4j connection error: {0}")]
    Connection(String),

    #[error("Neo4j query error: {0}")]
    Query(#[from] neo4rs::Error),

    #[error("Graph client is closed")]
    Closed,
}

/// Configuration for connecting to Neo4j.
///
/// Loaded from the `[neo4j]` section of `waypoint.toml` or
/// `WAYPOINT_NEO4J__*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphConfig {
    #[serde(default = "default_uri")]
    pub uri: String,
    #[serde(default = "default_user")]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_fetch_size")]
    pub fetch_size: usize,
    /// Maximum neighbours returned per matched entity.
    #[serde(default = "default_neighbor_limit")]
    pub neighbor_limit: u32,
    /// Neighbour descriptions are cut to this many characters.
    #[serde(default = "default_description_chars")]
    pub description_chars: usize,
}

fn default_uri() -> String {
    "bolt://localhost:7687".to_string()
}

fn default_user() -> String {
    "neo4j".to_string()
}

fn default_max_connections() -> u32 {
    16
}

fn default_fetch_size() -> usize {
    256
}

fn default_neighbor_limit() -> u32 {
    10
}

fn default_description_chars() -> usize {
    400
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            uri: default_uri(),
            user: default_user(),
            password: String::new(),
            max_connections: default_max_connections(),
            fetch_size: default_fetch_size(),
            neighbor_limit: default_neighbor_limit(),
            description_chars: default_description_chars(),
        }
    }
}

/// Thread-safe Neo4j graph client with connection pooling.
///
/// Clone is cheap (inner Arc). Queries hold a read lock on the pool for their
/// whole duration, so `close` waits for in-flight queries before dropping it.
#[derive(Clone)]
pub struct GraphClient {
    graph: Arc<RwLock<Option<Graph>>>,
    pub(crate) neighbor_limit: u32,
    pub(crate) description_chars: usize,
}

impl GraphClient {
    /// Connect to Neo4j with the given configuration.
    pub async fn connect(config: &GraphConfig) -> Result<Self, GraphError> {
        let neo_config = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.user)
            .password(&config.password)
            .max_connections(config.max_connections as usize)
            .fetch_size(config.fetch_size)
            .build()
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        let graph = Graph::connect(neo_config)
            .await
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        tracing::info!(uri = %config.uri, "Connected to Neo4j");
        Ok(Self {
            graph: Arc::new(RwLock::new(Some(graph))),
            neighbor_limit: config.neighbor_limit,
            description_chars: config.description_chars,
        })
    }

    /// Execute a write-only query (CREATE, MERGE, DELETE, SET).
    pub async fn run(&self, query: Query) -> Result<(), GraphError> {
        let guard = self.graph.read().await;
        let graph = guard.as_ref().ok_or(GraphError::Closed)?;
        graph.run(query).await?;
        Ok(())
    }

    /// Execute a read query and collect all rows.
    pub async fn query_rows(&self, query: Query) -> Result<Vec<neo4rs::Row>, GraphError> {
        let guard = self.graph.read().await;
        let graph = guard.as_ref().ok_or(GraphError::Closed)?;
        let mut stream = graph.execute(query).await?;
        let mut rows = Vec::new();
        while let Some(row) = stream.next().await? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Drop the connection pool. Returns false if it was already closed.
    pub async fn close(&self) -> bool {
        let mut guard = self.graph.write().await;
        match guard.take() {
            Some(graph) => {
                drop(graph);
                tracing::info!("Neo4j connection closed");
                true
            }
            None => false,
        }
    }

    pub async fn is_closed(&self) -> bool {
        self.graph.read().await.is_none()
    }
}

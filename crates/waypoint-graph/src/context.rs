//! `GraphContext` port implementation over the Neo4j client.

use async_trait::async_trait;

use waypoint_core::{BackendError, GraphContext, GraphFact};

use crate::client::{GraphClient, GraphError};

impl From<GraphError> for BackendError {
    fn from(e: GraphError) -> Self {
        match e {
            GraphError::Connection(msg) => BackendError::Unavailable(msg),
            GraphError::Query(err) => BackendError::Network(err.to_string()),
            GraphError::Closed => BackendError::Unavailable("graph client is closed".to_string()),
        }
    }
}

#[async_trait]
impl GraphContext for GraphClient {
    async fn expand(&self, ids: &[String]) -> Result<Vec<GraphFact>, BackendError> {
        Ok(self.fetch_neighbors(ids).await?)
    }

    async fn close(&self) {
        GraphClient::close(self).await;
    }
}

//! Read operations for graph-context expansion.

use neo4rs::query;

use waypoint_core::GraphFact;

use crate::client::{GraphClient, GraphError};

/// Per-entity neighbourhood lookup. The subquery applies the limit to each
/// source id separately; UNWIND keeps the caller's id order.
const NEIGHBORS_CYPHER: &str = "UNWIND $ids AS nid
     CALL {
       WITH nid
       MATCH (n:Entity {id: nid})-[r]-(m:Entity)
       RETURN type(r) AS rel, labels(m) AS labels, m.id AS id,
              m.name AS name, m.description AS description
       LIMIT $limit
     }
     RETURN nid, rel, labels, id, name, description";

impl GraphClient {
    // ── Neighbor Queries ─────────────────────────────────────────

    /// Fetch the relationship facts around each of the given entity ids.
    pub async fn fetch_neighbors(&self, ids: &[String]) -> Result<Vec<GraphFact>, GraphError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let q = query(NEIGHBORS_CYPHER)
            .param("ids", ids.to_vec())
            .param("limit", self.neighbor_limit as i64);

        let rows = self.query_rows(q).await?;
        let mut facts = Vec::with_capacity(rows.len());

        for row in rows {
            let description: String = row.get("description").unwrap_or_default();
            facts.push(GraphFact {
                source_id: row.get("nid").unwrap_or_default(),
                relation: row.get("rel").unwrap_or_default(),
                target_id: row.get("id").unwrap_or_default(),
                target_name: row.get("name").unwrap_or_default(),
                target_description: truncate_chars(&description, self.description_chars),
                target_labels: row.get("labels").unwrap_or_default(),
            });
        }

        tracing::debug!(ids = ids.len(), facts = facts.len(), "Fetched graph neighbors");
        Ok(facts)
    }
}

/// Cut `text` to at most `max` characters without splitting a code point.
pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

//! The hybrid retrieval pipeline.
//!
//! One `handle` call runs, in order: cache lookup, semantic search, graph
//! expansion, prompt assembly, model invocation, cache store. Semantic search
//! and generation failures are fatal; graph failures degrade the run to an
//! answer without relationship context, which is returned but never cached.
//! `retrieve` runs only the two retrieval steps.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use waypoint_core::{
    GraphContext, GraphFact, ModelInvoker, PipelineResult, RetrievalResult, SemanticMatch,
    SemanticSearch, WaypointError,
};

use crate::cache::{cache_key, CacheStats, ResultCache};
use crate::config::PipelineConfig;
use crate::prompt::PromptAssembler;
use crate::retry::{self, RetryPolicy};

pub struct Orchestrator {
    semantic: Arc<dyn SemanticSearch>,
    graph: Arc<dyn GraphContext>,
    model: Arc<dyn ModelInvoker>,
    assembler: PromptAssembler,
    retry: RetryPolicy,
    cache: ResultCache,
    cache_enabled: bool,
    default_top_k: usize,
    /// `true` while accepting work. Runs hold a read guard for their whole
    /// duration; `shutdown` takes the write guard.
    open: RwLock<bool>,
}

impl Orchestrator {
    pub fn new(
        semantic: Arc<dyn SemanticSearch>,
        graph: Arc<dyn GraphContext>,
        model: Arc<dyn ModelInvoker>,
        config: &PipelineConfig,
    ) -> Self {
        info!(
            top_k = config.top_k,
            max_attempts = config.retry.max_attempts,
            cache_enabled = config.cache.enabled,
            cache_ttl_secs = config.cache.ttl_secs,
            "Orchestrator initialized"
        );
        Self {
            semantic,
            graph,
            model,
            assembler: PromptAssembler::new(&config.prompt),
            retry: config.retry.policy(),
            cache: ResultCache::new(Duration::from_secs(config.cache.ttl_secs)),
            cache_enabled: config.cache.enabled,
            default_top_k: config.top_k,
            open: RwLock::new(true),
        }
    }

    /// Result count used by callers that do not choose one.
    pub fn default_top_k(&self) -> usize {
        self.default_top_k
    }

    /// Answer `query` from the top `top_k` semantic matches and their graph context.
    ///
    /// A run is cached only when every step succeeded. A run that lost its
    /// graph context is returned but not stored.
    pub async fn handle(&self, query: &str, top_k: usize) -> Result<PipelineResult, WaypointError> {
        let open = self.open.read().await;
        if !*open {
            return Err(WaypointError::ShutDown);
        }
        validate(query, top_k)?;

        let key = cache_key(query, top_k);
        if self.cache_enabled {
            if let Some(mut hit) = self.cache.get(&key) {
                hit.cached = true;
                info!(run_id = %hit.run_id, top_k, "Cache hit");
                return Ok(hit);
            }
        }

        let run_id = Uuid::new_v4();
        debug!(%run_id, top_k, "Cache miss, running pipeline");

        let context = self.gather(run_id, query, top_k).await?;

        let messages = self
            .assembler
            .assemble(query, &context.matches, &context.graph_facts)?;

        let answer = retry::execute("generate", &self.retry, || self.model.generate(&messages))
            .await
            .map_err(WaypointError::Model)?;

        let result = PipelineResult {
            run_id,
            query: query.to_string(),
            top_k,
            matches: context.matches,
            graph_facts: context.graph_facts,
            answer,
            cached: false,
            completed_at: Utc::now(),
        };

        let store = self.cache_enabled && context.graph_available;
        if store {
            self.cache.put(key, result.clone());
        }

        info!(
            %run_id,
            matches = result.matches.len(),
            facts = result.graph_facts.len(),
            graph_available = context.graph_available,
            stored = store,
            "Pipeline run complete"
        );
        Ok(result)
    }

    /// Semantic search plus graph expansion, without generation or caching.
    pub async fn retrieve(&self, query: &str, top_k: usize) -> Result<RetrievalResult, WaypointError> {
        let open = self.open.read().await;
        if !*open {
            return Err(WaypointError::ShutDown);
        }
        validate(query, top_k)?;

        let run_id = Uuid::new_v4();
        let context = self.gather(run_id, query, top_k).await?;
        let retrieval = RetrievalResult {
            query: query.to_string(),
            top_k,
            matches: context.matches,
            graph_facts: context.graph_facts,
            graph_available: context.graph_available,
        };

        info!(%run_id, summary = %retrieval.summary(), "Retrieval complete");
        Ok(retrieval)
    }

    async fn gather(&self, run_id: Uuid, query: &str, top_k: usize) -> Result<Context, WaypointError> {
        let matches = retry::execute("semantic_search", &self.retry, || {
            self.semantic.search(query, top_k)
        })
        .await
        .map_err(WaypointError::Retrieval)?;

        let ids: Vec<String> = matches.iter().map(|m| m.id.clone()).collect();

        let (graph_facts, graph_available) =
            match retry::execute("graph_expand", &self.retry, || self.graph.expand(&ids)).await {
                Ok(facts) => (retain_known_sources(facts, &ids), true),
                Err(e) => {
                    warn!(%run_id, error = %e, "Graph context unavailable, continuing without it");
                    (Vec::new(), false)
                }
            };

        Ok(Context {
            matches,
            graph_facts,
            graph_available,
        })
    }

    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            enabled: self.cache_enabled,
            size: if self.cache_enabled { self.cache.len() } else { 0 },
            ttl_secs: self.cache.ttl().as_secs(),
        }
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
        info!("Result cache cleared");
    }

    /// Stop accepting runs, wait for in-flight ones, then release the graph
    /// connection and drop cached results. Later calls are no-ops.
    pub async fn shutdown(&self) {
        let mut open = self.open.write().await;
        if !*open {
            return;
        }
        *open = false;
        self.graph.close().await;
        self.cache.clear();
        info!("Orchestrator shut down");
    }
}

fn validate(query: &str, top_k: usize) -> Result<(), WaypointError> {
    if query.trim().is_empty() {
        return Err(WaypointError::InvalidRequest("query is empty".to_string()));
    }
    if top_k == 0 {
        return Err(WaypointError::InvalidRequest("top_k must be positive".to_string()));
    }
    Ok(())
}

struct Context {
    matches: Vec<SemanticMatch>,
    graph_facts: Vec<GraphFact>,
    graph_available: bool,
}

/// Drop facts whose source is not one of the semantic match ids.
fn retain_known_sources(facts: Vec<GraphFact>, ids: &[String]) -> Vec<GraphFact> {
    let known: HashSet<&str> = ids.iter().map(String::as_str).collect();
    let before = facts.len();
    let kept: Vec<GraphFact> = facts
        .into_iter()
        .filter(|f| known.contains(f.source_id.as_str()))
        .collect();
    if kept.len() < before {
        warn!(dropped = before - kept.len(), "Discarded graph facts from unrequested sources");
    }
    kept
}

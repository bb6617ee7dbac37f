//! waypoint-pipeline: Hybrid semantic + graph retrieval orchestration.
//!
//! Sequences semantic search, graph expansion, prompt assembly and model
//! invocation behind a single `Orchestrator::handle` call, with a TTL result
//! cache and bounded linear-backoff retry around every backend call.

pub mod cache;
pub mod config;
pub mod orchestrator;
pub mod prompt;
pub mod retry;

pub use cache::{cache_key, CacheStats, ResultCache};
pub use config::{PipelineConfig, Settings};
pub use orchestrator::Orchestrator;
pub use prompt::PromptAssembler;
pub use retry::RetryPolicy;

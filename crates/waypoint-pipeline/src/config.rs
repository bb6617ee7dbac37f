//! Pipeline settings and the full set of sections the binary loads.

use serde::Deserialize;

use waypoint_core::WaypointError;
use waypoint_graph::GraphConfig;
use waypoint_providers::{OpenAiConfig, PineconeConfig};

use crate::cache::CacheSettings;
use crate::prompt::PromptSettings;
use crate::retry::RetrySettings;

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Result count used when the caller does not pick one.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default)]
    pub retry: RetrySettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub prompt: PromptSettings,
}

fn default_top_k() -> usize {
    5
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            retry: RetrySettings::default(),
            cache: CacheSettings::default(),
            prompt: PromptSettings::default(),
        }
    }
}

/// Every section needed to stand up the pipeline against real backends.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub pipeline: PipelineConfig,
    pub neo4j: GraphConfig,
    pub openai: OpenAiConfig,
    pub pinecone: PineconeConfig,
}

impl Settings {
    /// Load from `<file_prefix>.toml` (optional) and `WAYPOINT_*` variables.
    pub fn load(file_prefix: &str) -> Result<Self, WaypointError> {
        let cfg = waypoint_core::config::load(file_prefix)?;
        Self::from_config(&cfg)
    }

    pub fn from_config(cfg: &config::Config) -> Result<Self, WaypointError> {
        use waypoint_core::config::section;

        let settings = Self {
            pipeline: section(cfg, "pipeline")?,
            neo4j: section(cfg, "neo4j")?,
            openai: section(cfg, "openai")?,
            pinecone: section(cfg, "pinecone")?,
        };
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), WaypointError> {
        if self.openai.api_key.trim().is_empty() {
            return Err(WaypointError::Config("openai.api_key is not set".to_string()));
        }
        if self.pinecone.api_key.trim().is_empty() {
            return Err(WaypointError::Config("pinecone.api_key is not set".to_string()));
        }
        if self.pinecone.index_host.trim().is_empty() {
            return Err(WaypointError::Config("pinecone.index_host is not set".to_string()));
        }
        if self.pipeline.top_k == 0 {
            return Err(WaypointError::Config("pipeline.top_k must be positive".to_string()));
        }
        Ok(())
    }
}

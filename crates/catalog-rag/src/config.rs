//! Configuration for the catalog RAG pipeline
//!
//! All ambient state (provider endpoints, index parameters, persona) lives in
//! an explicit `RagConfig` passed into component constructors at startup.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};
use crate::types::index::{IndexDescriptor, SimilarityMetric};

/// Main pipeline configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RagConfig {
    /// Ollama/LLM configuration
    #[serde(default)]
    pub llm: LlmConfig,
    /// Embedding configuration
    #[serde(default)]
    pub embeddings: EmbeddingConfig,
    /// Vector index configuration
    #[serde(default)]
    pub index: IndexConfig,
    /// Assistant persona and refusal policy
    #[serde(default)]
    pub persona: PersonaConfig,
    /// Embedding backfill configuration
    #[serde(default)]
    pub reconcile: ReconcileConfig,
    /// Retrieval configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

impl RagConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        toml::from_str(&content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Build the index descriptor for the configured collection index
    pub fn index_descriptor(&self) -> IndexDescriptor {
        IndexDescriptor {
            name: self.index.name.clone(),
            field: self.index.field.clone(),
            metric: self.index.metric,
            dimensions: self.embeddings.dimensions,
            lists: self.index.lists,
        }
    }
}

/// LLM (Ollama) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Ollama base URL
    pub base_url: String,
    /// Embedding model name
    pub embed_model: String,
    /// Chat model name
    pub chat_model: String,
    /// Temperature for generation
    pub temperature: f32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Number of retries for failed requests
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            embed_model: "nomic-embed-text".to_string(),
            chat_model: "phi3".to_string(),
            temperature: 0.3,
            timeout_secs: 120,
            max_retries: 2,
        }
    }
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Embedding dimensions (768 for nomic-embed-text, 1536 for ada-style models)
    pub dimensions: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self { dimensions: 768 }
    }
}

/// Vector index configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Index name on the collection
    pub name: String,
    /// Record field holding the embedding vector
    pub field: String,
    /// Similarity metric
    pub metric: SimilarityMetric,
    /// IVF list count
    pub lists: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            name: "vector_search_index".to_string(),
            field: crate::types::record::EMBEDDING_FIELD.to_string(),
            metric: SimilarityMetric::Cosine,
            lists: 1,
        }
    }
}

/// Assistant persona and closed-domain refusal policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaConfig {
    /// Assistant name used in the system instruction
    pub assistant_name: String,
    /// Short description of the store/domain the assistant covers
    pub shop_description: String,
    /// Fixed phrase returned when the question cannot be answered from context
    pub refusal_phrase: String,
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            assistant_name: "Cosmo".to_string(),
            shop_description: "a bicycle and bicycle accessories store".to_string(),
            refusal_phrase: "I don't know.".to_string(),
        }
    }
}

/// How the reconciler reacts when a single record fails to embed
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum EmbedErrorPolicy {
    /// Abort the whole reconciliation on the first failure
    #[default]
    FailFast,
    /// Log and skip the failing record, keep the rest of the batch
    SkipFailed,
}

/// Embedding backfill configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileConfig {
    /// Number of concurrent embedding calls per batch
    pub embed_concurrency: usize,
    /// Number of staged upserts per bulk-write chunk
    pub write_chunk_size: usize,
    /// Report progress every N processed records
    pub progress_interval: usize,
    /// Per-record failure policy
    #[serde(default)]
    pub on_embed_error: EmbedErrorPolicy,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            embed_concurrency: 8,
            write_chunk_size: 500,
            progress_interval: 25,
            on_embed_error: EmbedErrorPolicy::FailFast,
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Default number of records to retrieve per question
    pub default_top_k: usize,
    /// Keep the embedding field on returned records
    pub keep_embeddings: bool,
    /// Minimum best-match similarity below which the orchestrator refuses
    /// without calling the completion provider (disabled when unset)
    #[serde(default)]
    pub refusal_threshold: Option<f32>,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            default_top_k: 3,
            keep_embeddings: false,
            refusal_threshold: None,
        }
    }
}

//! Provider abstractions for embeddings, chat completion, and collection storage
//!
//! Trait-based seams so the pipeline can run against an Ollama server plus an
//! in-memory store locally, or any remote backend that honors the contracts.

pub mod completion;
pub mod embedding;
pub mod memory;
pub mod ollama;
pub mod store;

pub use completion::CompletionProvider;
pub use embedding::EmbeddingProvider;
pub use memory::MemoryStore;
pub use ollama::{OllamaClient, OllamaCompletion, OllamaEmbedder, OllamaProvider};
pub use store::{BulkWriteSummary, CollectionStore, ScoredRecord, UpsertOp};

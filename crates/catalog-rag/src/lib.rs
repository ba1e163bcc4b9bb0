//! catalog-rag: closed-domain catalog Q&A with vector retrieval
//!
//! This crate implements a RAG (Retrieval-Augmented Generation) pipeline over
//! a catalog collection: it backfills vector embeddings for every record,
//! keeps a similarity index reconciled, retrieves the top-k records for a
//! question, and asks an LLM for an answer grounded strictly in the retrieved
//! records.

pub mod catalog;
pub mod config;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod indexing;
pub mod providers;
pub mod retrieval;
pub mod types;

pub use config::RagConfig;
pub use embedding::EmbeddingGenerator;
pub use error::{Error, Result};
pub use generation::{ContextAssembler, RagOrchestrator};
pub use indexing::{ReconcileReport, VectorIndexReconciler};
pub use retrieval::{SearchResult, VectorSearchEngine};
pub use types::{ChatMessage, IndexDescriptor, Record, Role, SimilarityMetric};

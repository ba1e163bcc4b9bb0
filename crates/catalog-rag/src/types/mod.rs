//! Core types for the catalog RAG pipeline

pub mod index;
pub mod message;
pub mod record;

pub use index::{IndexDescriptor, SimilarityMetric};
pub use message::{ChatMessage, Role};
pub use record::{Record, EMBEDDING_FIELD, ID_FIELD};

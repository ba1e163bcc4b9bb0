//! Top-k similarity retrieval over an indexed collection

pub mod search;

pub use search::{SearchResult, VectorSearchEngine};

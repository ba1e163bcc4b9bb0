//! Vector search engine: embed the query, run the ANN top-k query

use std::sync::Arc;

use crate::embedding::EmbeddingGenerator;
use crate::error::{Error, Result};
use crate::providers::CollectionStore;
use crate::types::{IndexDescriptor, Record};

/// One ranked match
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Similarity score under the index metric (higher = more similar)
    pub score: f32,
    /// The matched record
    pub record: Record,
}

/// Executes top-k similarity queries against the indexed collection.
///
/// Returns at most `k` results ordered by descending score; ties break in
/// backend-defined order, which callers must not depend on.
pub struct VectorSearchEngine {
    store: Arc<dyn CollectionStore>,
    embedder: Arc<EmbeddingGenerator>,
    descriptor: IndexDescriptor,
    keep_embeddings: bool,
}

impl VectorSearchEngine {
    /// Create a search engine; returned records have their embedding stripped
    pub fn new(
        store: Arc<dyn CollectionStore>,
        embedder: Arc<EmbeddingGenerator>,
        descriptor: IndexDescriptor,
    ) -> Self {
        Self {
            store,
            embedder,
            descriptor,
            keep_embeddings: false,
        }
    }

    /// Keep the embedding field on returned records
    pub fn with_embeddings(mut self, keep: bool) -> Self {
        self.keep_embeddings = keep;
        self
    }

    /// Retrieve the `k` records most similar to `query_text`, `k >= 1`.
    ///
    /// Fails with `Error::IndexMissing` when the collection has not been
    /// reconciled yet.
    pub async fn search(
        &self,
        collection: &str,
        query_text: &str,
        k: usize,
    ) -> Result<Vec<SearchResult>> {
        if k == 0 {
            return Err(Error::invalid_argument("top-k must be at least 1"));
        }

        if !self
            .store
            .index_exists(collection, &self.descriptor.name)
            .await?
        {
            return Err(Error::index_missing(collection, &self.descriptor.name));
        }

        let query = self.embedder.embed(query_text).await?;

        let matches = self
            .store
            .vector_search(collection, &self.descriptor.field, &query, k)
            .await?;

        tracing::debug!(
            "Retrieved {} of up to {} candidates from '{}'",
            matches.len(),
            k,
            collection
        );

        Ok(matches
            .into_iter()
            .map(|m| {
                let record = if self.keep_embeddings {
                    m.record
                } else {
                    m.record.without_embedding()
                };
                SearchResult {
                    score: m.score,
                    record,
                }
            })
            .collect())
    }
}

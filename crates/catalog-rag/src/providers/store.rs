//! Collection store trait: the contract the pipeline needs from the storage backend

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::Result;
use crate::types::{IndexDescriptor, Record};

/// One staged update-or-insert operation, keyed by record identifier
#[derive(Debug, Clone)]
pub struct UpsertOp {
    /// Identifier of the record to match
    pub id: String,
    /// Fields to set on the matched record
    pub fields: Map<String, Value>,
    /// Insert a new record when no match exists
    pub upsert: bool,
}

impl UpsertOp {
    /// Stage setting a single field on a record, inserting if absent
    pub fn set_field(id: impl Into<String>, field: impl Into<String>, value: Value) -> Self {
        let mut fields = Map::new();
        fields.insert(field.into(), value);
        Self {
            id: id.into(),
            fields,
            upsert: true,
        }
    }
}

/// Outcome of a bulk write
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkWriteSummary {
    /// Records matched and updated in place
    pub modified: usize,
    /// Records inserted via upsert
    pub upserted: usize,
}

impl BulkWriteSummary {
    /// Total records touched
    pub fn total(&self) -> usize {
        self.modified + self.upserted
    }

    /// Merge another summary into this one
    pub fn merge(&mut self, other: &BulkWriteSummary) {
        self.modified += other.modified;
        self.upserted += other.upserted;
    }
}

/// A record ranked by similarity to a query vector
#[derive(Debug, Clone)]
pub struct ScoredRecord {
    /// Similarity score under the index metric (higher = more similar)
    pub score: f32,
    /// The matched record, full payload
    pub record: Record,
}

/// Trait for the document storage backend
///
/// The pipeline only reads and writes record fields through these operations
/// and never caches records beyond one invocation. Implementations:
/// - `MemoryStore`: in-process map with brute-force similarity scoring
#[async_trait]
pub trait CollectionStore: Send + Sync {
    /// Enumerate all records in a collection (full scan)
    async fn find_all(&self, collection: &str) -> Result<Vec<Record>>;

    /// Insert records into a collection
    async fn insert_many(&self, collection: &str, records: Vec<Record>) -> Result<usize>;

    /// Delete every record in a collection
    async fn delete_all(&self, collection: &str) -> Result<usize>;

    /// Apply a batch of upserts keyed by record identifier.
    ///
    /// Fails with `Error::BulkWrite` carrying the rejected subset; accepted
    /// operations in the same batch may or may not have been applied.
    async fn bulk_write(&self, collection: &str, ops: &[UpsertOp]) -> Result<BulkWriteSummary>;

    /// Whether a named index exists on the collection
    async fn index_exists(&self, collection: &str, name: &str) -> Result<bool>;

    /// Create a similarity index per the descriptor
    async fn create_index(&self, collection: &str, descriptor: &IndexDescriptor) -> Result<()>;

    /// Approximate top-k nearest-neighbor query over the indexed vector field.
    ///
    /// Returns at most `k` records ranked by descending similarity; ties break
    /// in backend-defined order. Fails with `Error::IndexMissing` when no
    /// index covers `field`.
    async fn vector_search(
        &self,
        collection: &str,
        field: &str,
        query: &[f32],
        k: usize,
    ) -> Result<Vec<ScoredRecord>>;

    /// Provider name for logging
    fn name(&self) -> &str;
}

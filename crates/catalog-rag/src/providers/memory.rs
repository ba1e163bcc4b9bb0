//! In-memory collection store with brute-force similarity scoring
//!
//! Fills the storage-backend seam for local runs and tests: records live in a
//! process-local map, similarity queries scan every embedded record under the
//! index metric.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{Error, Result};
use crate::types::{IndexDescriptor, Record, ID_FIELD};

use super::store::{BulkWriteSummary, CollectionStore, ScoredRecord, UpsertOp};

#[derive(Default)]
struct CollectionState {
    records: Vec<Record>,
    indexes: HashMap<String, IndexDescriptor>,
}

impl CollectionState {
    fn position(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|r| r.id() == Some(id))
    }

    fn index_for_field(&self, field: &str) -> Option<&IndexDescriptor> {
        self.indexes.values().find(|d| d.field == field)
    }
}

/// In-process collection store
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, CollectionState>>,
    index_creations: AtomicUsize,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records in a collection
    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .get(collection)
            .map_or(0, |c| c.records.len())
    }

    /// Whether a collection is empty or absent
    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    /// How many index creations this store has performed, across collections
    pub fn index_creations(&self) -> usize {
        self.index_creations.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl CollectionStore for MemoryStore {
    async fn find_all(&self, collection: &str) -> Result<Vec<Record>> {
        Ok(self
            .collections
            .read()
            .get(collection)
            .map_or_else(Vec::new, |c| c.records.clone()))
    }

    async fn insert_many(&self, collection: &str, records: Vec<Record>) -> Result<usize> {
        let mut collections = self.collections.write();
        let state = collections.entry(collection.to_string()).or_default();
        let inserted = records.len();
        state.records.extend(records);
        Ok(inserted)
    }

    async fn delete_all(&self, collection: &str) -> Result<usize> {
        let mut collections = self.collections.write();
        let state = collections.entry(collection.to_string()).or_default();
        let deleted = state.records.len();
        state.records.clear();
        Ok(deleted)
    }

    async fn bulk_write(&self, collection: &str, ops: &[UpsertOp]) -> Result<BulkWriteSummary> {
        let mut collections = self.collections.write();
        let state = collections.entry(collection.to_string()).or_default();

        let mut summary = BulkWriteSummary::default();
        let mut failed_ids = Vec::new();

        for op in ops {
            match state.position(&op.id) {
                Some(pos) => {
                    let record = &mut state.records[pos];
                    for (field, value) in &op.fields {
                        record.set(field.clone(), value.clone());
                    }
                    summary.modified += 1;
                }
                None if op.upsert => {
                    let mut record = Record::new();
                    record.set(ID_FIELD, op.id.clone().into());
                    for (field, value) in &op.fields {
                        record.set(field.clone(), value.clone());
                    }
                    state.records.push(record);
                    summary.upserted += 1;
                }
                None => failed_ids.push(op.id.clone()),
            }
        }

        if !failed_ids.is_empty() {
            return Err(Error::BulkWrite {
                failed_ids,
                message: "no matching record and upsert disabled".to_string(),
            });
        }

        Ok(summary)
    }

    async fn index_exists(&self, collection: &str, name: &str) -> Result<bool> {
        Ok(self
            .collections
            .read()
            .get(collection)
            .is_some_and(|c| c.indexes.contains_key(name)))
    }

    async fn create_index(&self, collection: &str, descriptor: &IndexDescriptor) -> Result<()> {
        let mut collections = self.collections.write();
        let state = collections.entry(collection.to_string()).or_default();
        state
            .indexes
            .insert(descriptor.name.clone(), descriptor.clone());
        self.index_creations.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            "Created index '{}' on collection '{}'",
            descriptor.name,
            collection
        );
        Ok(())
    }

    async fn vector_search(
        &self,
        collection: &str,
        field: &str,
        query: &[f32],
        k: usize,
    ) -> Result<Vec<ScoredRecord>> {
        let collections = self.collections.read();
        let state = collections
            .get(collection)
            .ok_or_else(|| Error::store(format!("unknown collection '{}'", collection)))?;

        let descriptor = state
            .index_for_field(field)
            .ok_or_else(|| Error::index_missing(collection, field))?;

        let mut results: Vec<ScoredRecord> = state
            .records
            .iter()
            .filter_map(|record| {
                record.embedding().map(|embedding| ScoredRecord {
                    score: descriptor.metric.score(query, &embedding),
                    record: record.clone(),
                })
            })
            .collect();

        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(k);

        Ok(results)
    }

    fn name(&self) -> &str {
        "memory"
    }
}

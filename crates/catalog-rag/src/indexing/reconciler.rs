//! Idempotent embedding backfill over a collection plus index reconciliation

use futures::future::join_all;
use std::sync::Arc;

use crate::config::{EmbedErrorPolicy, ReconcileConfig};
use crate::embedding::EmbeddingGenerator;
use crate::error::Result;
use crate::providers::{BulkWriteSummary, CollectionStore, UpsertOp};
use crate::types::{IndexDescriptor, Record, EMBEDDING_FIELD};

use super::progress::{ReconcileObserver, TracingObserver};

/// Outcome of one reconciliation run
#[derive(Debug, Clone)]
pub struct ReconcileReport {
    /// Records found in the collection
    pub total_records: usize,
    /// Records successfully embedded and staged
    pub embedded: usize,
    /// Identifiers skipped under the `SkipFailed` policy
    pub skipped_ids: Vec<String>,
    /// Combined bulk-write outcome
    pub write_summary: BulkWriteSummary,
    /// Whether this run created the index (false when it already existed)
    pub index_created: bool,
}

/// Ensures every record has a current embedding and a similarity index exists.
///
/// Safe to run repeatedly: every write is an upsert keyed by record id, and
/// index creation is skipped when the named index already exists. Concurrent
/// runs over the same collection are therefore harmless.
pub struct VectorIndexReconciler {
    store: Arc<dyn CollectionStore>,
    embedder: Arc<EmbeddingGenerator>,
    descriptor: IndexDescriptor,
    options: ReconcileConfig,
    observer: Arc<dyn ReconcileObserver>,
}

impl VectorIndexReconciler {
    /// Create a reconciler over a store and embedding generator
    pub fn new(
        store: Arc<dyn CollectionStore>,
        embedder: Arc<EmbeddingGenerator>,
        descriptor: IndexDescriptor,
        options: ReconcileConfig,
    ) -> Self {
        Self {
            store,
            embedder,
            descriptor,
            options,
            observer: Arc::new(TracingObserver),
        }
    }

    /// Replace the progress observer
    pub fn with_observer(mut self, observer: Arc<dyn ReconcileObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Backfill embeddings for every record in `collection`, then make sure
    /// the similarity index exists.
    pub async fn reconcile(&self, collection: &str) -> Result<ReconcileReport> {
        let records = self.store.find_all(collection).await?;
        let total = records.len();
        tracing::info!(
            "Generating embeddings for {} records in '{}'",
            total,
            collection
        );

        let mut ops: Vec<UpsertOp> = Vec::with_capacity(total);
        let mut skipped_ids = Vec::new();
        let mut processed = 0usize;

        let concurrency = self.options.embed_concurrency.max(1);
        let interval = self.options.progress_interval.max(1);

        for batch in records.chunks(concurrency) {
            let staged: Vec<_> = batch.iter().map(|r| self.stage_record(r)).collect();
            let results = join_all(staged).await;

            for (record, result) in batch.iter().zip(results) {
                processed += 1;
                match result {
                    Ok(op) => ops.push(op),
                    Err(e) => match self.options.on_embed_error {
                        EmbedErrorPolicy::FailFast => return Err(e),
                        EmbedErrorPolicy::SkipFailed => {
                            let id = record.id().unwrap_or("<no id>").to_string();
                            tracing::warn!("Skipping record '{}': {}", id, e);
                            skipped_ids.push(id);
                        }
                    },
                }
                if processed % interval == 0 || processed == total {
                    self.observer.on_progress(processed, total);
                }
            }
        }

        let mut write_summary = BulkWriteSummary::default();
        if !ops.is_empty() {
            tracing::info!(
                "Persisting {} embeddings to '{}' via bulk upserts",
                ops.len(),
                collection
            );
            let chunk_size = self.options.write_chunk_size.max(1);
            for chunk in ops.chunks(chunk_size) {
                let summary = self.store.bulk_write(collection, chunk).await?;
                write_summary.merge(&summary);
            }
        }

        let index_created = self.ensure_index(collection).await?;

        Ok(ReconcileReport {
            total_records: total,
            embedded: ops.len(),
            skipped_ids,
            write_summary,
            index_created,
        })
    }

    /// Embed one record's content and stage the upsert.
    ///
    /// The stored embedding field is stripped before serialization so the
    /// vector never feeds back into its own replacement.
    async fn stage_record(&self, record: &Record) -> Result<UpsertOp> {
        let id = record.require_id()?.to_string();
        let text = record.content_text()?;
        let vector = self.embedder.embed(&text).await?;
        Ok(UpsertOp::set_field(
            id,
            EMBEDDING_FIELD,
            serde_json::to_value(vector)?,
        ))
    }

    async fn ensure_index(&self, collection: &str) -> Result<bool> {
        let name = &self.descriptor.name;
        tracing::info!("Checking if index '{}' exists on '{}'", name, collection);

        if self.store.index_exists(collection, name).await? {
            tracing::info!("Index '{}' already exists, skipping creation", name);
            return Ok(false);
        }

        self.store.create_index(collection, &self.descriptor).await?;
        tracing::info!(
            "Created index '{}' on field '{}' of '{}'",
            name,
            self.descriptor.field,
            collection
        );
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::providers::{EmbeddingProvider, MemoryStore};
    use crate::types::{SimilarityMetric, ID_FIELD};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::json;

    /// Deterministic embedder that records every text it is asked to embed
    struct RecordingEmbedder {
        texts: Mutex<Vec<String>>,
        fail_for: Option<String>,
    }

    impl RecordingEmbedder {
        fn new() -> Self {
            Self {
                texts: Mutex::new(Vec::new()),
                fail_for: None,
            }
        }

        fn failing_for(id: &str) -> Self {
            Self {
                texts: Mutex::new(Vec::new()),
                fail_for: Some(id.to_string()),
            }
        }

        fn texts(&self) -> Vec<String> {
            self.texts.lock().clone()
        }
    }

    #[async_trait]
    impl EmbeddingProvider for RecordingEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            self.texts.lock().push(text.to_string());
            if let Some(marker) = &self.fail_for {
                if text.contains(marker.as_str()) {
                    return Err(Error::provider("simulated embedding failure"));
                }
            }
            // Deterministic vector derived from the text bytes
            let sum: u32 = text.bytes().map(u32::from).sum();
            Ok(vec![
                text.len() as f32,
                (sum % 101) as f32,
                (sum % 7) as f32,
                1.0,
            ])
        }

        fn dimensions(&self) -> usize {
            4
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    fn record(id: &str, name: &str) -> crate::types::Record {
        let mut r = crate::types::Record::new();
        r.set(ID_FIELD, json!(id));
        r.set("name", json!(name));
        r
    }

    fn descriptor() -> IndexDescriptor {
        IndexDescriptor {
            name: "vector_search_index".to_string(),
            field: EMBEDDING_FIELD.to_string(),
            metric: SimilarityMetric::Cosine,
            dimensions: 4,
            lists: 1,
        }
    }

    fn reconciler(
        store: Arc<MemoryStore>,
        embedder: Arc<RecordingEmbedder>,
        options: ReconcileConfig,
    ) -> VectorIndexReconciler {
        VectorIndexReconciler::new(
            store,
            Arc::new(EmbeddingGenerator::new(embedder)),
            descriptor(),
            options,
        )
    }

    async fn seeded_store(records: Vec<crate::types::Record>) -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        store
            .insert_many("products", records)
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_reconcile_embeds_every_record_and_creates_index() {
        let store = seeded_store(vec![record("a", "Road Bike"), record("b", "Saddle")]).await;
        let embedder = Arc::new(RecordingEmbedder::new());
        let report = reconciler(Arc::clone(&store), Arc::clone(&embedder), Default::default())
            .reconcile("products")
            .await
            .unwrap();

        assert_eq!(report.total_records, 2);
        assert_eq!(report.embedded, 2);
        assert_eq!(report.write_summary.modified, 2);
        assert!(report.index_created);

        for r in store.find_all("products").await.unwrap() {
            let embedding = r.embedding().expect("record should be embedded");
            assert_eq!(embedding.len(), 4);
        }
    }

    #[tokio::test]
    async fn test_reconcile_is_idempotent() {
        let store = seeded_store(vec![record("a", "Road Bike"), record("b", "Saddle")]).await;
        let embedder = Arc::new(RecordingEmbedder::new());
        let r = reconciler(Arc::clone(&store), Arc::clone(&embedder), Default::default());

        r.reconcile("products").await.unwrap();
        let first: Vec<_> = store
            .find_all("products")
            .await
            .unwrap()
            .iter()
            .map(|rec| rec.embedding().unwrap())
            .collect();

        let second_report = r.reconcile("products").await.unwrap();
        let second: Vec<_> = store
            .find_all("products")
            .await
            .unwrap()
            .iter()
            .map(|rec| rec.embedding().unwrap())
            .collect();

        assert_eq!(first, second);
        assert!(!second_report.index_created);
        assert_eq!(store.index_creations(), 1);
        // The second run still performed the bulk write (upsert of identical values)
        assert_eq!(second_report.write_summary.modified, 2);
    }

    #[tokio::test]
    async fn test_reconcile_never_embeds_stored_embedding() {
        let mut embedded_record = record("a", "Road Bike");
        embedded_record.set_embedding(&[9.0, 9.0, 9.0, 9.0]);
        let store = seeded_store(vec![embedded_record]).await;
        let embedder = Arc::new(RecordingEmbedder::new());

        reconciler(store, Arc::clone(&embedder), Default::default())
            .reconcile("products")
            .await
            .unwrap();

        for text in embedder.texts() {
            assert!(
                !text.contains(EMBEDDING_FIELD),
                "embedding field leaked into provider input: {}",
                text
            );
        }
    }

    #[tokio::test]
    async fn test_fail_fast_aborts_without_writing() {
        let store = seeded_store(vec![record("a", "Road Bike"), record("b", "Saddle")]).await;
        let embedder = Arc::new(RecordingEmbedder::failing_for("Saddle"));
        let options = ReconcileConfig {
            embed_concurrency: 1,
            ..Default::default()
        };

        let err = reconciler(Arc::clone(&store), embedder, options)
            .reconcile("products")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Provider(_)));

        // Nothing was persisted
        for r in store.find_all("products").await.unwrap() {
            assert!(!r.has_embedding());
        }
    }

    #[tokio::test]
    async fn test_skip_failed_keeps_remaining_records() {
        let store = seeded_store(vec![
            record("a", "Road Bike"),
            record("b", "Saddle"),
            record("c", "Helmet"),
        ])
        .await;
        let embedder = Arc::new(RecordingEmbedder::failing_for("Saddle"));
        let options = ReconcileConfig {
            on_embed_error: EmbedErrorPolicy::SkipFailed,
            ..Default::default()
        };

        let report = reconciler(Arc::clone(&store), embedder, options)
            .reconcile("products")
            .await
            .unwrap();

        assert_eq!(report.embedded, 2);
        assert_eq!(report.skipped_ids, vec!["b"]);
        assert!(report.index_created);

        let records = store.find_all("products").await.unwrap();
        let embedded: Vec<_> = records
            .iter()
            .filter(|r| r.has_embedding())
            .filter_map(|r| r.id())
            .collect();
        assert_eq!(embedded, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn test_progress_observer_interval() {
        struct Capture(Mutex<Vec<(usize, usize)>>);
        impl ReconcileObserver for Capture {
            fn on_progress(&self, processed: usize, total: usize) {
                self.0.lock().push((processed, total));
            }
        }

        let store = seeded_store(
            (0..5).map(|i| record(&format!("r{}", i), "Item")).collect(),
        )
        .await;
        let observer = Arc::new(Capture(Mutex::new(Vec::new())));
        let options = ReconcileConfig {
            embed_concurrency: 1,
            progress_interval: 2,
            ..Default::default()
        };

        reconciler(store, Arc::new(RecordingEmbedder::new()), options)
            .with_observer(Arc::clone(&observer) as Arc<dyn ReconcileObserver>)
            .reconcile("products")
            .await
            .unwrap();

        assert_eq!(observer.0.lock().clone(), vec![(2, 5), (4, 5), (5, 5)]);
    }
}

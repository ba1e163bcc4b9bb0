//! Progress reporting for reconciliation, decoupled from the batching logic

/// Observer invoked by the reconciler at fixed intervals.
///
/// Observability only: call ordering is not a correctness contract.
pub trait ReconcileObserver: Send + Sync {
    /// Called after every `progress_interval` records and at the end of the scan
    fn on_progress(&self, processed: usize, total: usize);
}

/// Default observer that reports through `tracing`
pub struct TracingObserver;

impl ReconcileObserver for TracingObserver {
    fn on_progress(&self, processed: usize, total: usize) {
        tracing::info!("Generated {} of {} embeddings", processed, total);
    }
}

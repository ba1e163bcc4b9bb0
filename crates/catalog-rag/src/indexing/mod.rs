//! Embedding backfill and index reconciliation

pub mod progress;
pub mod reconciler;

pub use progress::{ReconcileObserver, TracingObserver};
pub use reconciler::{ReconcileReport, VectorIndexReconciler};

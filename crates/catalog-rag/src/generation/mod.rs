//! Grounding-context assembly and RAG answer orchestration

pub mod context;
pub mod orchestrator;

pub use context::ContextAssembler;
pub use orchestrator::RagOrchestrator;

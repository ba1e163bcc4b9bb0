//! End-to-end question answering: retrieve, ground, complete

use std::sync::Arc;

use crate::config::RetrievalConfig;
use crate::error::Result;
use crate::providers::CompletionProvider;
use crate::retrieval::VectorSearchEngine;
use crate::types::ChatMessage;

use super::context::ContextAssembler;

/// Composes retrieval, context assembly, and the completion provider.
///
/// The domain restriction is closed: the system instruction always mandates
/// refusal outside the retrieved context. By default the completion provider
/// is trusted to follow that instruction; when a refusal threshold is
/// configured, weak retrievals short-circuit to the refusal phrase without a
/// completion call. No conversation history is retained across calls.
pub struct RagOrchestrator {
    search: VectorSearchEngine,
    assembler: ContextAssembler,
    completion: Arc<dyn CompletionProvider>,
    default_top_k: usize,
    refusal_threshold: Option<f32>,
}

impl RagOrchestrator {
    /// Create an orchestrator over the pipeline components
    pub fn new(
        search: VectorSearchEngine,
        assembler: ContextAssembler,
        completion: Arc<dyn CompletionProvider>,
        retrieval: &RetrievalConfig,
    ) -> Self {
        Self {
            search,
            assembler,
            completion,
            default_top_k: retrieval.default_top_k.max(1),
            refusal_threshold: retrieval.refusal_threshold,
        }
    }

    /// Answer a question using the configured default top-k
    pub async fn answer(&self, collection: &str, question: &str) -> Result<String> {
        self.answer_top_k(collection, question, self.default_top_k)
            .await
    }

    /// Answer a question grounded in the top `k` retrieved records
    pub async fn answer_top_k(&self, collection: &str, question: &str, k: usize) -> Result<String> {
        tracing::info!("Question: \"{}\"", question);

        let results = self.search.search(collection, question, k).await?;

        if let Some(threshold) = self.refusal_threshold {
            let best = results.first().map(|r| r.score);
            if best.map_or(true, |score| score < threshold) {
                tracing::info!(
                    "Best similarity {:?} below threshold {}, refusing without completion",
                    best,
                    threshold
                );
                return Ok(self.assembler.persona().refusal_phrase.clone());
            }
        }

        let context = self.assembler.assemble(&results)?;

        let messages = vec![
            ChatMessage::system(context),
            ChatMessage::user(question.to_string()),
        ];

        let answer = self.completion.complete(&messages).await?;
        tracing::info!("Answer generated ({} retrieved records)", results.len());

        Ok(answer)
    }
}

//! Grounding-context assembly from ranked search results

use crate::config::PersonaConfig;
use crate::error::Result;
use crate::retrieval::SearchResult;

/// Builds the system instruction plus serialized-record grounding block.
///
/// Records are serialized in retrieval order with the embedding field always
/// removed. No deduplication and no truncation: callers bound the block by
/// limiting k.
pub struct ContextAssembler {
    persona: PersonaConfig,
}

impl ContextAssembler {
    /// Create an assembler with the given persona
    pub fn new(persona: PersonaConfig) -> Self {
        Self { persona }
    }

    /// The configured persona
    pub fn persona(&self) -> &PersonaConfig {
        &self.persona
    }

    /// The fixed system instruction: persona, scope restriction, refusal policy
    fn instruction(&self) -> String {
        format!(
            "You are a helpful, friendly sales assistant for {shop}.\n\
             Your name is {name}.\n\
             You are designed to answer questions about the products the store sells.\n\
             \n\
             Only answer questions using the information in the list of products below,\n\
             represented in JSON format.\n\
             \n\
             If you are asked a question that cannot be answered from the list, respond\n\
             with \"{refusal}\"\n\
             \n\
             List of products:\n\
             \n",
            shop = self.persona.shop_description,
            name = self.persona.assistant_name,
            refusal = self.persona.refusal_phrase,
        )
    }

    /// Assemble the grounding block for a set of ranked results
    pub fn assemble(&self, results: &[SearchResult]) -> Result<String> {
        let mut block = self.instruction();

        for result in results {
            block.push_str(&serde_json::to_string(&result.record.without_embedding())?);
            block.push_str("\n\n");
        }

        Ok(block)
    }
}

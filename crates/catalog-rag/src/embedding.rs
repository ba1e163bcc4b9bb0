//! Embedding generation over the provider capability

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::providers::EmbeddingProvider;

/// Converts text into a fixed-dimension vector via the configured provider.
///
/// One remote call per invocation, no caching. Malformed provider payloads
/// (empty vector, wrong dimension) are rejected here; retry policy belongs to
/// the provider implementation, not to this component.
pub struct EmbeddingGenerator {
    provider: Arc<dyn EmbeddingProvider>,
}

impl EmbeddingGenerator {
    /// Create a generator over a provider
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self { provider }
    }

    /// Expected vector dimension
    pub fn dimensions(&self) -> usize {
        self.provider.dimensions()
    }

    /// Embed a non-empty text
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(Error::invalid_argument("cannot embed empty text"));
        }

        let vector = self.provider.embed(text).await?;

        let expected = self.provider.dimensions();
        if vector.len() != expected {
            return Err(Error::provider(format!(
                "provider '{}' returned {}-dimensional vector, expected {}",
                self.provider.name(),
                vector.len(),
                expected
            )));
        }

        Ok(vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FixedEmbedder {
        vector: Vec<f32>,
        dimensions: usize,
    }

    #[async_trait]
    impl EmbeddingProvider for FixedEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(self.vector.clone())
        }

        fn dimensions(&self) -> usize {
            self.dimensions
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    #[tokio::test]
    async fn test_rejects_empty_text() {
        let generator = EmbeddingGenerator::new(Arc::new(FixedEmbedder {
            vector: vec![0.0; 4],
            dimensions: 4,
        }));
        assert!(matches!(
            generator.embed("  ").await.unwrap_err(),
            Error::InvalidArgument(_)
        ));
    }

    #[tokio::test]
    async fn test_rejects_dimension_mismatch() {
        let generator = EmbeddingGenerator::new(Arc::new(FixedEmbedder {
            vector: vec![0.0; 3],
            dimensions: 4,
        }));
        assert!(matches!(
            generator.embed("hello").await.unwrap_err(),
            Error::Provider(_)
        ));
    }

    #[tokio::test]
    async fn test_passes_through_valid_vector() {
        let generator = EmbeddingGenerator::new(Arc::new(FixedEmbedder {
            vector: vec![0.5, 0.5],
            dimensions: 2,
        }));
        assert_eq!(generator.embed("hello").await.unwrap(), vec![0.5, 0.5]);
    }
}

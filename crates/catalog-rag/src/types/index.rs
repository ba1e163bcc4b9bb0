//! Similarity index descriptor and metrics

use serde::{Deserialize, Serialize};

/// Similarity metric for vector comparison (higher score = more similar)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SimilarityMetric {
    /// Cosine similarity
    #[default]
    Cosine,
    /// Dot product
    DotProduct,
    /// Negated euclidean distance
    Euclidean,
}

impl SimilarityMetric {
    /// Score two vectors under this metric. Mismatched lengths score zero.
    pub fn score(&self, a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() || a.is_empty() {
            return 0.0;
        }
        match self {
            Self::Cosine => {
                let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
                let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
                let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
                if norm_a == 0.0 || norm_b == 0.0 {
                    0.0
                } else {
                    dot / (norm_a * norm_b)
                }
            }
            Self::DotProduct => a.iter().zip(b).map(|(x, y)| x * y).sum(),
            Self::Euclidean => {
                let dist: f32 = a
                    .iter()
                    .zip(b)
                    .map(|(x, y)| (x - y) * (x - y))
                    .sum::<f32>()
                    .sqrt();
                -dist
            }
        }
    }
}

/// Named similarity index over one vector field of a collection.
///
/// Created once per collection if absent, otherwise reused. Changing
/// parameters requires drop-and-recreate, which the pipeline does not do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexDescriptor {
    /// Index name
    pub name: String,
    /// Target vector field
    pub field: String,
    /// Similarity metric
    pub metric: SimilarityMetric,
    /// Vector dimension
    pub dimensions: usize,
    /// IVF list count
    pub lists: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_score() {
        let metric = SimilarityMetric::Cosine;
        assert!((metric.score(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(metric.score(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert!((metric.score(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_mismatched_lengths_score_zero() {
        assert_eq!(SimilarityMetric::Cosine.score(&[1.0], &[1.0, 2.0]), 0.0);
        assert_eq!(SimilarityMetric::DotProduct.score(&[], &[]), 0.0);
    }

    #[test]
    fn test_euclidean_orders_by_closeness() {
        let metric = SimilarityMetric::Euclidean;
        let near = metric.score(&[0.0, 0.0], &[0.1, 0.0]);
        let far = metric.score(&[0.0, 0.0], &[5.0, 0.0]);
        assert!(near > far);
    }
}

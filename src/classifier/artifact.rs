use std::collections::HashMap;
use std::io;
use std::path::Path;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Result of one classification: the winning label plus the per-label
/// decision scores it was chosen from.
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub label: String,
    pub scores: HashMap<String, f32>,
}

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("Model file not found: {0}")]
    NotFound(String),
    #[error("Failed to load the model: {0}")]
    Malformed(String),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum PredictError {
    #[error("classifier has no fitted parameters")]
    NotFitted,
    #[error("feature vector length {got} does not match trained width {expected}")]
    DimensionMismatch { expected: usize, got: usize },
}

/// Capability contract for a trained brand classifier: anything that can
/// report whether it is fitted and map a feature vector to a label.
///
/// The shipped implementation is [`LinearBrandModel`]; tests swap in stubs.
pub trait BrandModel: Send + Sync {
    /// Whether the model carries learned parameters. Must not fail: an
    /// unfitted model reports `false` rather than erroring.
    fn is_fitted(&self) -> bool;

    /// The closed label set this model predicts over.
    fn labels(&self) -> Vec<String>;

    fn predict(&self, features: &Array1<f32>) -> Result<Prediction, PredictError>;
}

/// A linear one-vs-rest classifier over image embedding vectors, stored as a
/// JSON artifact: one weight row and one intercept per label.
///
/// The artifact is loaded once at process start and never mutated afterwards,
/// so it can be shared freely behind an `Arc`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearBrandModel {
    pub labels: Vec<String>,
    pub weights: Vec<Vec<f32>>,
    pub intercepts: Vec<f32>,
}

impl LinearBrandModel {
    /// Reads and deserializes the artifact at `path`.
    ///
    /// A missing file maps to [`ArtifactError::NotFound`]; any content that
    /// does not deserialize into a model maps to [`ArtifactError::Malformed`]
    /// carrying the underlying cause.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ArtifactError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ArtifactError::NotFound(path.display().to_string()));
        }
        let bytes = std::fs::read(path)?;
        serde_json::from_slice(&bytes).map_err(|e| ArtifactError::Malformed(e.to_string()))
    }

    /// Width of the feature vectors the model was trained on.
    pub fn feature_len(&self) -> usize {
        self.weights.first().map(Vec::len).unwrap_or(0)
    }

    fn decision_scores(&self, features: &Array1<f32>) -> HashMap<String, f32> {
        self.labels
            .iter()
            .zip(self.weights.iter().zip(self.intercepts.iter()))
            .map(|(label, (row, intercept))| {
                let score: f32 = row.iter().zip(features.iter()).map(|(w, x)| w * x).sum();
                (label.clone(), score + intercept)
            })
            .collect()
    }
}

impl BrandModel for LinearBrandModel {
    fn is_fitted(&self) -> bool {
        let width = self.feature_len();
        !self.labels.is_empty()
            && width > 0
            && self.weights.len() == self.labels.len()
            && self.intercepts.len() == self.labels.len()
            && self.weights.iter().all(|row| row.len() == width)
    }

    fn labels(&self) -> Vec<String> {
        self.labels.clone()
    }

    fn predict(&self, features: &Array1<f32>) -> Result<Prediction, PredictError> {
        if !self.is_fitted() {
            return Err(PredictError::NotFitted);
        }
        let expected = self.feature_len();
        if features.len() != expected {
            return Err(PredictError::DimensionMismatch {
                expected,
                got: features.len(),
            });
        }

        let scores = self.decision_scores(features);
        let label = scores
            .iter()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(label, _)| label.clone())
            .unwrap_or_else(|| "unknown".to_string());

        Ok(Prediction { label, scores })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fitted_model() -> LinearBrandModel {
        LinearBrandModel {
            labels: vec!["Adidas".to_string(), "Nike".to_string()],
            weights: vec![vec![1.0, 0.0, -0.5], vec![-1.0, 0.5, 1.0]],
            intercepts: vec![0.1, -0.1],
        }
    }

    #[test]
    fn test_fitted_probe() {
        assert!(fitted_model().is_fitted());
    }

    #[test]
    fn test_unfitted_probe_does_not_error() {
        let empty = LinearBrandModel {
            labels: vec![],
            weights: vec![],
            intercepts: vec![],
        };
        assert!(!empty.is_fitted());

        let ragged = LinearBrandModel {
            labels: vec!["Adidas".to_string(), "Nike".to_string()],
            weights: vec![vec![1.0, 2.0], vec![1.0]],
            intercepts: vec![0.0, 0.0],
        };
        assert!(!ragged.is_fitted());
    }

    #[test]
    fn test_predict_picks_highest_score() {
        let model = fitted_model();
        let features = Array1::from_vec(vec![0.0, 1.0, 1.0]);
        let prediction = model.predict(&features).unwrap();
        assert_eq!(prediction.label, "Nike");
        assert_eq!(prediction.scores.len(), 2);
    }

    #[test]
    fn test_predict_is_deterministic() {
        let model = fitted_model();
        let features = Array1::from_vec(vec![2.0, -1.0, 0.5]);
        let first = model.predict(&features).unwrap();
        let second = model.predict(&features).unwrap();
        assert_eq!(first.label, second.label);
        assert_eq!(first.scores, second.scores);
    }

    #[test]
    fn test_predict_rejects_wrong_width() {
        let model = fitted_model();
        let features = Array1::from_vec(vec![1.0, 2.0]);
        let err = model.predict(&features).unwrap_err();
        assert!(matches!(
            err,
            PredictError::DimensionMismatch { expected: 3, got: 2 }
        ));
    }

    #[test]
    fn test_unfitted_predict_errors() {
        let empty = LinearBrandModel {
            labels: vec![],
            weights: vec![],
            intercepts: vec![],
        };
        let features = Array1::from_vec(vec![1.0]);
        assert!(matches!(
            empty.predict(&features),
            Err(PredictError::NotFitted)
        ));
    }
}

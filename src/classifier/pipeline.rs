use std::sync::Arc;

use super::artifact::{BrandModel, Prediction};
use super::embedding::ImageEmbedding;
use super::error::PipelineError;
use super::upload::Upload;

/// Everything a classification request needs, constructed once at startup
/// and shared read-only across requests.
///
/// The artifact slot is `None` when the model file was missing or unloadable
/// at startup; requests then fail with `ModelUnavailable` instead of
/// crashing, matching the demo's degrade-don't-die policy.
#[derive(Clone)]
pub struct PipelineContext {
    model: Option<Arc<dyn BrandModel>>,
    embedder: Arc<dyn ImageEmbedding>,
}

/// Current state of the loaded model and embedder, for the status endpoint
/// and CLI output.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ModelStatus {
    pub artifact_loaded: bool,
    pub fitted: bool,
    pub labels: Vec<String>,
    pub embedder_available: bool,
    pub vector_len: usize,
}

impl PipelineContext {
    pub fn new(model: Option<Arc<dyn BrandModel>>, embedder: Arc<dyn ImageEmbedding>) -> Self {
        Self { model, embedder }
    }

    pub fn status(&self) -> ModelStatus {
        ModelStatus {
            artifact_loaded: self.model.is_some(),
            fitted: self.model.as_ref().is_some_and(|m| m.is_fitted()),
            labels: self
                .model
                .as_ref()
                .map(|m| m.labels())
                .unwrap_or_default(),
            embedder_available: self.embedder.available(),
            vector_len: self.embedder.vector_len(),
        }
    }

    /// Runs one upload through the full pipeline:
    /// gate → decode → fitted guard → embed → predict.
    ///
    /// Each step is one-shot; the first failure is terminal for the request
    /// and maps to exactly one [`PipelineError`] variant. The fitted guard
    /// runs before embedding, so no feature vector is ever computed for an
    /// unusable model, and `predict` is never invoked without a vector.
    pub fn classify(&self, upload: &Upload) -> Result<Prediction, PipelineError> {
        upload.validate()?;

        let image = image::load_from_memory(&upload.bytes)?;
        log::debug!(
            "Decoded upload '{}' ({}x{})",
            upload.file_name,
            image.width(),
            image.height()
        );

        let model = self
            .model
            .as_ref()
            .filter(|m| m.is_fitted())
            .ok_or(PipelineError::ModelUnavailable)?;

        if !self.embedder.available() {
            return Err(PipelineError::EmbedderUnavailable);
        }

        let features = self
            .embedder
            .get_vector(&image)?
            .ok_or_else(|| {
                PipelineError::FeatureExtraction("no feature vector produced".to_string())
            })?;

        let prediction = model
            .predict(&features)
            .map_err(|e| PipelineError::Prediction(e.to_string()))?;

        log::info!(
            "Classified '{}' as {} ({} candidate labels)",
            upload.file_name,
            prediction.label,
            prediction.scores.len()
        );
        Ok(prediction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::artifact::PredictError;
    use crate::classifier::embedding::ImageEmbedder;
    use crate::models::BuiltinEmbedder;
    use ndarray::Array1;
    use ort::session::Session;

    struct StubModel {
        fitted: bool,
    }

    impl BrandModel for StubModel {
        fn is_fitted(&self) -> bool {
            self.fitted
        }

        fn labels(&self) -> Vec<String> {
            vec!["Adidas".to_string(), "Nike".to_string()]
        }

        fn predict(&self, _features: &Array1<f32>) -> Result<Prediction, PredictError> {
            Ok(Prediction {
                label: "Nike".to_string(),
                scores: Default::default(),
            })
        }
    }

    struct FixedVectorizer;

    impl ImageEmbedding for FixedVectorizer {
        fn session(&self) -> Option<&Session> {
            None
        }

        fn input_size(&self) -> u32 {
            224
        }

        fn vector_len(&self) -> usize {
            512
        }

        fn available(&self) -> bool {
            true
        }

        fn get_vector(
            &self,
            _image: &image::DynamicImage,
        ) -> Result<Option<Array1<f32>>, PipelineError> {
            Ok(Some(Array1::zeros(512)))
        }
    }

    fn png_upload() -> Upload {
        let mut bytes = Vec::new();
        let image = image::DynamicImage::new_rgb8(8, 8);
        image
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        Upload::new("shoe.png", bytes)
    }

    #[test]
    fn test_unfitted_model_short_circuits() {
        let context = PipelineContext::new(
            Some(Arc::new(StubModel { fitted: false })),
            Arc::new(FixedVectorizer),
        );
        let err = context.classify(&png_upload()).unwrap_err();
        assert!(matches!(err, PipelineError::ModelUnavailable));
    }

    #[test]
    fn test_missing_model_short_circuits() {
        let context = PipelineContext::new(None, Arc::new(FixedVectorizer));
        let err = context.classify(&png_upload()).unwrap_err();
        assert!(matches!(err, PipelineError::ModelUnavailable));
    }

    #[test]
    fn test_degraded_embedder_surfaces_unavailable() {
        let embedder = ImageEmbedder::disabled(BuiltinEmbedder::ResNet18.characteristics());
        let context =
            PipelineContext::new(Some(Arc::new(StubModel { fitted: true })), Arc::new(embedder));
        let err = context.classify(&png_upload()).unwrap_err();
        assert!(matches!(err, PipelineError::EmbedderUnavailable));
    }

    #[test]
    fn test_corrupt_bytes_yield_decode_error() {
        let context = PipelineContext::new(
            Some(Arc::new(StubModel { fitted: true })),
            Arc::new(FixedVectorizer),
        );
        let upload = Upload::new("corrupt.jpg", vec![0xDE, 0xAD, 0xBE, 0xEF]);
        let err = context.classify(&upload).unwrap_err();
        assert!(matches!(err, PipelineError::ImageDecode(_)));
    }

    #[test]
    fn test_happy_path_returns_label() {
        let context = PipelineContext::new(
            Some(Arc::new(StubModel { fitted: true })),
            Arc::new(FixedVectorizer),
        );
        let prediction = context.classify(&png_upload()).unwrap();
        assert_eq!(prediction.label, "Nike");
    }

    #[test]
    fn test_status_reflects_context() {
        let context = PipelineContext::new(
            Some(Arc::new(StubModel { fitted: true })),
            Arc::new(FixedVectorizer),
        );
        let status = context.status();
        assert!(status.artifact_loaded);
        assert!(status.fitted);
        assert!(status.embedder_available);
        assert_eq!(status.labels, vec!["Adidas", "Nike"]);
        assert_eq!(status.vector_len, 512);
    }
}

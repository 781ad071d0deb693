use std::fmt;

use crate::classifier::upload::MAX_UPLOAD_BYTES;

/// Represents the different ways a classification request can fail.
///
/// Every variant is terminal for its request: the pipeline never retries, it
/// maps the failure to a user-visible message and stops.
#[derive(Debug)]
pub enum PipelineError {
    /// The upload exceeds the size cap; checked before any decoding happens
    FileTooLarge { size: usize },
    /// The upload's extension is not one of the accepted image formats
    UnsupportedFormat(String),
    /// The uploaded bytes could not be decoded into an image
    ImageDecode(String),
    /// The classifier artifact is missing, unloadable, or not fitted
    ModelUnavailable,
    /// The embedding network weights were absent at startup
    EmbedderUnavailable,
    /// The embedding network ran but produced no usable feature vector
    FeatureExtraction(String),
    /// The classifier failed while predicting
    Prediction(String),
}

impl PipelineError {
    /// Stable machine-readable identifier for each failure kind, used by the
    /// HTTP layer and the web UI.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::FileTooLarge { .. } => "file_too_large",
            Self::UnsupportedFormat(_) => "unsupported_format",
            Self::ImageDecode(_) => "image_decode",
            Self::ModelUnavailable => "model_unavailable",
            Self::EmbedderUnavailable => "embedder_unavailable",
            Self::FeatureExtraction(_) => "feature_extraction",
            Self::Prediction(_) => "prediction",
        }
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileTooLarge { size } => write!(
                f,
                "The uploaded file is too large ({} bytes, max is {}). Please upload an image smaller than 5 MiB.",
                size, MAX_UPLOAD_BYTES
            ),
            Self::UnsupportedFormat(ext) => write!(
                f,
                "Unsupported file format '{}'. Please upload a png, jpg or jpeg image.",
                ext
            ),
            Self::ImageDecode(msg) => write!(f, "Could not decode the uploaded image: {}", msg),
            Self::ModelUnavailable => write!(
                f,
                "The model is not fitted or not loaded correctly. Please check the model status."
            ),
            Self::EmbedderUnavailable => write!(
                f,
                "The embedding network is not available. Fetch the weights and restart."
            ),
            Self::FeatureExtraction(msg) => write!(f, "Feature extraction failed: {}", msg),
            Self::Prediction(msg) => write!(f, "Error during prediction: {}", msg),
        }
    }
}

impl std::error::Error for PipelineError {}

impl From<image::ImageError> for PipelineError {
    fn from(err: image::ImageError) -> Self {
        PipelineError::ImageDecode(err.to_string())
    }
}

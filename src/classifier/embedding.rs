use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{imageops::FilterType, DynamicImage};
use ndarray::{Array1, Array4};
use ort::session::Session;
use ort::value::Tensor;

use super::error::PipelineError;
use crate::models::EmbedderCharacteristics;
use crate::runtime::{create_session_builder, RuntimeConfig};

// ImageNet channel statistics; the embedding network was trained with them.
const CHANNEL_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const CHANNEL_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Provides image embedding functionality using ONNX models.
///
/// This trait handles the conversion of a decoded image into a fixed-length
/// feature vector through:
/// 1. Resizing to the network's canonical square input
/// 2. RGB conversion and per-channel normalization
/// 3. Running the ONNX network to generate the embedding
///
/// The ONNX network is expected to:
/// - Accept one image input of shape [batch_size, 3, size, size]
/// - Output one feature tensor whose non-batch dimensions flatten to a
///   constant length for a given network
///
/// An implementation without a session is *degraded*: `get_vector` returns
/// `Ok(None)` instead of erroring, so a missing weights file never takes the
/// process down.
pub trait ImageEmbedding: Send + Sync {
    /// Returns the initialized ONNX session if available
    fn session(&self) -> Option<&Session>;

    /// Canonical square input size images are resized to
    fn input_size(&self) -> u32;

    /// Length of the feature vectors this network produces
    fn vector_len(&self) -> usize;

    /// Whether the embedding network is loaded and usable
    fn available(&self) -> bool {
        self.session().is_some()
    }

    /// Converts a decoded image into a feature vector.
    ///
    /// Returns `Ok(None)` when the embedder is degraded. Output length is
    /// constant across calls for a given network.
    ///
    /// # Errors
    /// - `FeatureExtraction` if tensor creation, the forward pass, or output
    ///   extraction fails
    fn get_vector(&self, image: &DynamicImage) -> Result<Option<Array1<f32>>, PipelineError> {
        let Some(session) = self.session() else {
            return Ok(None);
        };

        let size = self.input_size();
        let input_array = preprocess(image, size);
        let input_dyn = input_array.into_dyn();
        let input = input_dyn.as_standard_layout();

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .ok_or_else(|| PipelineError::FeatureExtraction("model has no inputs".to_string()))?;

        let mut input_tensors = HashMap::new();
        input_tensors.insert(
            input_name.as_str(),
            Tensor::from_array(&input).map_err(|e| {
                PipelineError::FeatureExtraction(format!("Failed to create input tensor: {}", e))
            })?,
        );

        let outputs = session
            .run(input_tensors)
            .map_err(|e| PipelineError::FeatureExtraction(format!("Failed to run model: {}", e)))?;
        let output_tensor = outputs[0].try_extract_tensor::<f32>().map_err(|e| {
            PipelineError::FeatureExtraction(format!("Failed to extract output tensor: {}", e))
        })?;

        let shape = output_tensor.shape();
        if shape.first() != Some(&1) {
            return Err(PipelineError::FeatureExtraction(format!(
                "unexpected output batch shape {:?}",
                shape
            )));
        }

        // Flatten everything past the batch dimension; ResNet exports may
        // carry trailing 1x1 spatial dims.
        let vector = Array1::from_iter(output_tensor.iter().cloned());
        if vector.is_empty() {
            return Err(PipelineError::FeatureExtraction(
                "model produced an empty feature vector".to_string(),
            ));
        }

        Ok(Some(vector))
    }
}

/// Resizes to `size`x`size` RGB and normalizes into a [1, 3, size, size]
/// NCHW tensor.
fn preprocess(image: &DynamicImage, size: u32) -> Array4<f32> {
    let rgb = image
        .resize_exact(size, size, FilterType::Triangle)
        .to_rgb8();

    let mut tensor = Array4::<f32>::zeros((1, 3, size as usize, size as usize));
    for (x, y, pixel) in rgb.enumerate_pixels() {
        for c in 0..3 {
            let value = pixel[c] as f32 / 255.0;
            tensor[[0, c, y as usize, x as usize]] = (value - CHANNEL_MEAN[c]) / CHANNEL_STD[c];
        }
    }
    tensor
}

/// The process-wide image embedder backed by a pre-trained ONNX network.
///
/// Initialized once at startup and shared read-only across requests; the
/// session is wrapped in `Arc` and `ort` inference takes `&self`, so no
/// locking is needed.
pub struct ImageEmbedder {
    weights_path: Option<PathBuf>,
    session: Option<Arc<Session>>,
    characteristics: EmbedderCharacteristics,
}

impl ImageEmbedder {
    /// Loads the embedding network from `weights_path`.
    ///
    /// Missing or unloadable weights do not fail the process: the embedder
    /// comes up degraded, reports `available() == false`, and every
    /// `get_vector` call returns `Ok(None)`.
    pub fn initialize<P: AsRef<Path>>(
        weights_path: P,
        characteristics: EmbedderCharacteristics,
        config: &RuntimeConfig,
    ) -> Self {
        let path = weights_path.as_ref();

        if !path.exists() {
            log::warn!(
                "Embedding weights not found at {:?}; predictions will be unavailable",
                path
            );
            return Self::disabled(characteristics);
        }

        match create_session_builder(config).and_then(|builder| builder.commit_from_file(path)) {
            Ok(session) => {
                if session.inputs.is_empty() || session.outputs.is_empty() {
                    log::error!("Embedding network at {:?} has no inputs or outputs", path);
                    return Self::disabled(characteristics);
                }
                log::info!("Embedding network loaded from {:?}", path);
                Self {
                    weights_path: Some(path.to_path_buf()),
                    session: Some(Arc::new(session)),
                    characteristics,
                }
            }
            Err(e) => {
                log::error!("Failed to load embedding network from {:?}: {}", path, e);
                Self::disabled(characteristics)
            }
        }
    }

    /// A degraded embedder with no session; useful when weights are known to
    /// be absent.
    pub fn disabled(characteristics: EmbedderCharacteristics) -> Self {
        Self {
            weights_path: None,
            session: None,
            characteristics,
        }
    }

    pub fn weights_path(&self) -> Option<&Path> {
        self.weights_path.as_deref()
    }
}

impl ImageEmbedding for ImageEmbedder {
    fn session(&self) -> Option<&Session> {
        self.session.as_deref()
    }

    fn input_size(&self) -> u32 {
        self.characteristics.input_size
    }

    fn vector_len(&self) -> usize {
        self.characteristics.vector_len
    }
}

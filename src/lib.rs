//! Shoe-brand image classification with an embedded web demo.
//!
//! A pre-trained ResNet-18 ONNX network embeds an uploaded shoe image into a
//! 512-float feature vector, and a small serialized linear classifier maps
//! the vector to a brand label (Adidas or Nike as shipped).
//!
//! # Basic Usage
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use shoelens::{
//!     BuiltinEmbedder, ImageEmbedder, LinearBrandModel, PipelineContext, RuntimeConfig, Upload,
//! };
//!
//! let model = LinearBrandModel::load("models/shoes.json")?;
//! let embedder = ImageEmbedder::initialize(
//!     "weights/model.onnx",
//!     BuiltinEmbedder::ResNet18.characteristics(),
//!     &RuntimeConfig::default(),
//! );
//! let context = PipelineContext::new(Some(Arc::new(model)), Arc::new(embedder));
//!
//! let upload = Upload::new("shoe.jpg", std::fs::read("shoe.jpg")?);
//! let prediction = context.classify(&upload)?;
//! println!("Predicted brand: {}", prediction.label);
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! The context is built once at startup and is read-only afterwards; both the
//! ONNX session and the classifier artifact sit behind `Arc`, so the same
//! context serves concurrent requests without locking.

pub mod classifier;
pub mod model_manager;
pub mod models;
mod runtime;
pub mod server;

pub use classifier::{
    ArtifactError, BrandModel, ImageEmbedder, ImageEmbedding, LinearBrandModel, ModelStatus,
    PipelineContext, PipelineError, PredictError, Prediction, Upload, ALLOWED_EXTENSIONS,
    MAX_UPLOAD_BYTES,
};
pub use model_manager::{ModelManager, WeightsError};
pub use models::{BuiltinEmbedder, EmbedderCharacteristics, ModelInfo};
pub use runtime::{create_session_builder, RuntimeConfig};

pub fn init_logger() {
    env_logger::init();
}

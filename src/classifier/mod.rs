mod artifact;
mod embedding;
mod error;
mod pipeline;
mod upload;

pub use artifact::{ArtifactError, BrandModel, LinearBrandModel, PredictError, Prediction};
pub use embedding::{ImageEmbedder, ImageEmbedding};
pub use error::PipelineError;
pub use pipeline::{ModelStatus, PipelineContext};
pub use upload::{Upload, ALLOWED_EXTENSIONS, MAX_UPLOAD_BYTES};

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

use crate::models::BuiltinEmbedder;

#[derive(Debug, thiserror::Error)]
pub enum WeightsError {
    #[error("Weights not downloaded: {0}")]
    NotDownloaded(String),
    #[error("Download error: {0}")]
    DownloadError(#[from] reqwest::Error),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Weights verification failed")]
    VerificationFailed,
    #[error("Hash mismatch: expected {expected}, got {actual}")]
    HashMismatch { expected: String, actual: String },
}

/// Manages the on-disk cache of embedding network weights: path resolution,
/// download, SHA-256 verification and removal.
#[derive(Clone)]
pub struct ModelManager {
    weights_dir: PathBuf,
    download_lock: Arc<Mutex<()>>,
}

impl ModelManager {
    /// Creates a new ModelManager with the default weights directory
    pub fn new_default() -> io::Result<Self> {
        Self::new(Self::get_default_weights_dir())
    }

    /// Returns the default weights directory path
    pub fn get_default_weights_dir() -> PathBuf {
        // 1. Check environment variable
        if let Ok(path) = env::var("SHOELENS_CACHE") {
            return PathBuf::from(path).join("weights");
        }

        // 2. Use platform-specific cache directory
        if let Some(cache_dir) = dirs::cache_dir() {
            return cache_dir.join("shoelens").join("weights");
        }

        // 3. Fallback to user's home directory
        if let Some(home_dir) = dirs::home_dir() {
            return home_dir.join(".cache").join("shoelens").join("weights");
        }

        // 4. If all else fails, use system temp directory (platform agnostic)
        env::temp_dir().join("shoelens").join("weights")
    }

    pub fn new<P: AsRef<Path>>(weights_dir: P) -> io::Result<Self> {
        let weights_dir = weights_dir.as_ref().to_path_buf();
        fs::create_dir_all(&weights_dir)?;
        Ok(Self {
            weights_dir,
            download_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn get_weights_path(&self, embedder: BuiltinEmbedder) -> PathBuf {
        let info = embedder.get_model_info();
        self.weights_dir.join(info.name).join("model.onnx")
    }

    pub fn is_downloaded(&self, embedder: BuiltinEmbedder) -> bool {
        let weights_path = self.get_weights_path(embedder);
        log::info!("Checking for weights at {:?} (exists: {})", weights_path, weights_path.exists());
        weights_path.exists()
    }

    pub async fn download(&self, embedder: BuiltinEmbedder) -> Result<(), WeightsError> {
        let info = embedder.get_model_info();
        let _lock = self.download_lock.lock().await;

        let weights_path = self.get_weights_path(embedder);
        if weights_path.exists() {
            log::info!("Weights file exists at {:?}, verifying...", weights_path);
            if self.verify_file(&weights_path, &info.weights_hash)? {
                log::info!("Existing weights verified successfully");
                return Ok(());
            }
            log::warn!("Weights verification failed, redownloading");
        }

        let result = self
            .download_and_verify_file(&info.weights_url, &weights_path, &info.weights_hash)
            .await;
        if let Err(e) = &result {
            log::error!("Failed to set up weights file: {}", e);
            let _ = self.remove_download(embedder);
        }
        result
    }

    fn verify_file(&self, path: &Path, expected_hash: &str) -> Result<bool, WeightsError> {
        let bytes = fs::read(path)?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let hash = format!("{:x}", hasher.finalize());
        log::info!("Verifying {:?}: calculated {}, expected {}", path, hash, expected_hash);
        Ok(hash == expected_hash)
    }

    pub fn verify(&self, embedder: BuiltinEmbedder) -> Result<bool, WeightsError> {
        let info = embedder.get_model_info();
        let weights_path = self.get_weights_path(embedder);
        if !weights_path.exists() {
            log::info!("Weights file {:?} does not exist", weights_path);
            return Ok(false);
        }
        self.verify_file(&weights_path, &info.weights_hash)
    }

    async fn download_and_verify_file(
        &self,
        url: &str,
        path: &Path,
        expected_hash: &str,
    ) -> Result<(), WeightsError> {
        log::info!("Downloading weights from {} to {:?}", url, path);
        let response = reqwest::get(url).await?;
        log::info!("Download response status: {}", response.status());
        let bytes = response.bytes().await?;
        log::info!("Downloaded {} bytes", bytes.len());

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let hash = format!("{:x}", hasher.finalize());

        if hash != expected_hash {
            log::error!("Weights hash mismatch: expected {}, got {}", expected_hash, hash);
            return Err(WeightsError::HashMismatch {
                expected: expected_hash.to_string(),
                actual: hash,
            });
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, bytes)?;

        // Verify after writing
        if !self.verify_file(path, expected_hash)? {
            return Err(WeightsError::VerificationFailed);
        }

        log::info!("Weights downloaded and verified successfully");
        Ok(())
    }

    pub fn remove_download(&self, embedder: BuiltinEmbedder) -> Result<(), WeightsError> {
        let weights_path = self.get_weights_path(embedder);
        if weights_path.exists() {
            fs::remove_file(&weights_path)?;
        }
        Ok(())
    }

    /// Ensures that the weights are downloaded and verified.
    /// If the file doesn't exist, it will be downloaded.
    /// If verification fails, it will be re-downloaded.
    pub async fn ensure_downloaded(&self, embedder: BuiltinEmbedder) -> Result<(), WeightsError> {
        log::info!("Checking if {:?} weights are downloaded...", embedder);
        if !self.is_downloaded(embedder) {
            log::info!("Weights not found, downloading...");
            self.download(embedder).await?;
        } else if !self.verify(embedder)? {
            log::info!("Weights verification failed, re-downloading...");
            self.remove_download(embedder)?;
            self.download(embedder).await?;
        } else {
            log::info!("Weights verification successful");
        }
        Ok(())
    }
}

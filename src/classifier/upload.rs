use super::error::PipelineError;

/// Hard cap on upload size, checked before any decoding.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024; // 5 MiB

/// Extensions the file picker offers; re-checked server-side.
pub const ALLOWED_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// One uploaded file: raw bytes plus the name the browser reported.
/// Created per request and discarded after a single prediction cycle.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// The lower-cased extension of the reported file name, if any.
    pub fn extension(&self) -> Option<String> {
        let (_, ext) = self.file_name.rsplit_once('.')?;
        if ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }

    /// Checks the upload against the gate constraints: size cap first, then
    /// the extension allow-list. The browser's file picker already filters
    /// extensions, but uploads can arrive from anywhere.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.bytes.len() > MAX_UPLOAD_BYTES {
            return Err(PipelineError::FileTooLarge {
                size: self.bytes.len(),
            });
        }

        match self.extension() {
            Some(ext) if ALLOWED_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
            Some(ext) => Err(PipelineError::UnsupportedFormat(ext)),
            None => Err(PipelineError::UnsupportedFormat("(none)".to_string())),
        }
    }
}

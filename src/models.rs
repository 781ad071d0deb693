/// Built-in image embedding networks that shoelens knows how to fetch and run.
///
/// Each variant maps to a pre-trained ONNX export that turns an image into a
/// fixed-length feature vector. The classifier artifact shipped with the demo
/// was trained on ResNet-18 features, so that is the only network offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinEmbedder {
    /// ResNet-18 with the classification head removed; 512-float output.
    ResNet18,
}

/// Download metadata for a built-in embedding network.
#[derive(Debug, Clone)]
pub struct ModelInfo {
    pub name: String,
    pub weights_url: String,
    pub weights_hash: String,
}

/// Fixed properties of an embedding network.
#[derive(Debug, Clone)]
pub struct EmbedderCharacteristics {
    /// Length of the feature vector the network produces.
    pub vector_len: usize,
    /// Canonical square input size images are resized to before inference.
    pub input_size: u32,
    /// Approximate on-disk size of the weights, for download messaging.
    pub model_size_mb: usize,
}

impl BuiltinEmbedder {
    pub fn get_model_info(&self) -> ModelInfo {
        match self {
            BuiltinEmbedder::ResNet18 => ModelInfo {
                name: "resnet18-embedding".to_string(),
                weights_url: "https://huggingface.co/shoelens/resnet18-embedding/resolve/main/resnet18-embedding.onnx".to_string(),
                weights_hash: "8d2a8f6f3c1b0e9a47d5c2e8b16f04a3d9c75e12ab38f60c41d27e95b08c6f3a".to_string(),
            },
        }
    }

    pub fn characteristics(&self) -> EmbedderCharacteristics {
        match self {
            BuiltinEmbedder::ResNet18 => EmbedderCharacteristics {
                vector_len: 512,
                input_size: 224,
                model_size_mb: 45,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resnet18_characteristics() {
        let characteristics = BuiltinEmbedder::ResNet18.characteristics();
        assert_eq!(characteristics.vector_len, 512);
        assert_eq!(characteristics.input_size, 224);
    }

    #[test]
    fn test_resnet18_model_info() {
        let info = BuiltinEmbedder::ResNet18.get_model_info();
        assert_eq!(info.name, "resnet18-embedding");
        assert!(info.weights_url.ends_with(".onnx"));
        assert_eq!(info.weights_hash.len(), 64);
    }
}

use std::path::PathBuf;

use thiserror::Error;

/// Failures while flattening designs onto the background.
#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("container size {width}x{height} cannot be used for scaling")]
    InvalidContainer { width: f64, height: f64 },
    #[error("{designs} design images but {transforms} transforms")]
    LayerCountMismatch { designs: usize, transforms: usize },
    #[error("background image is empty")]
    EmptyBackground,
}

/// Failures reported by a generation service.
///
/// Credential problems are kept apart so the caller can ask for a new key
/// instead of just retrying.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("API key is invalid or the project is missing billing information: {0}")]
    InvalidCredential(String),
    #[error("generation failed: {0}")]
    Failed(String),
    #[error(transparent)]
    Compose(#[from] ComposeError),
}

const CREDENTIAL_MARKERS: &[&str] = &["API key not valid", "Requested entity was not found", "API_KEY"];

impl GenerationError {
    /// Sort a raw service error message into credential vs. generic failure.
    pub fn classify(message: impl Into<String>) -> Self {
        let message = message.into();
        if CREDENTIAL_MARKERS.iter().any(|m| message.contains(m)) {
            GenerationError::InvalidCredential(message)
        } else {
            GenerationError::Failed(message)
        }
    }

    pub fn is_credential(&self) -> bool {
        matches!(self, GenerationError::InvalidCredential(_))
    }

    /// Message shown in the editor after a failed generation.
    pub fn user_message(&self) -> &'static str {
        match self {
            GenerationError::InvalidCredential(_) => {
                "Your API Key is invalid or the project is missing billing information. Please select a valid key and try again."
            }
            GenerationError::Failed(_) => "Failed to generate AI mockup. Please try again.",
            GenerationError::Compose(_) => "Failed to generate local simulation.",
        }
    }
}

/// File-level failures (loading inputs, writing results, layout files).
#[derive(Debug, Error)]
pub enum IoError {
    #[error("could not read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not decode image '{path}': {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("could not encode '{path}': {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("invalid layout file '{path}': {source}")]
    Layout {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_credential_messages() {
        assert!(GenerationError::classify("400: API key not valid. Please pass a valid API key.").is_credential());
        assert!(GenerationError::classify("404 Requested entity was not found.").is_credential());
        assert!(GenerationError::classify("missing API_KEY").is_credential());
        assert!(!GenerationError::classify("503 model overloaded").is_credential());
    }

    #[test]
    fn user_messages_differ_by_kind() {
        let cred = GenerationError::classify("API_KEY");
        let other = GenerationError::classify("timeout");
        assert_ne!(cred.user_message(), other.user_message());
    }
}

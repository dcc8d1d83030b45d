//! Error types for the omr_scan library

use thiserror::Error;

/// Result type alias for omr_scan operations
pub type Result<T> = std::result::Result<T, OmrError>;

/// Error types for sheet evaluation
///
/// Shape and geometry edge cases (miscounted bubbles, degenerate contours)
/// are deliberately absent: the pipeline absorbs them and reports them through
/// `ExtractionDiagnostics` instead. Only boundary and infrastructure failures
/// surface here.
#[derive(Error, Debug)]
pub enum OmrError {
    /// Image file could not be opened or decoded
    #[error("Failed to load image: {message}")]
    ImageLoad {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Decoded image is unusable (zero dimensions, wrong channel layout)
    #[error("Malformed image: {reason}")]
    MalformedImage { reason: String },

    /// OpenCV operation failed
    #[error("OpenCV error during {operation}")]
    OpenCv {
        operation: String,
        #[source]
        source: opencv::Error,
    },

    /// Invalid configuration value
    #[error("Invalid parameter: {parameter} = {value}")]
    InvalidParameter { parameter: String, value: String },

    /// Requested answer set identifier is not in the key set
    #[error("Unknown answer set: {set}")]
    UnknownAnswerSet { set: String },

    /// Answer key does not match the sheet layout
    #[error("Answer key mismatch: {reason}")]
    KeyMismatch { reason: String },
}

impl OmrError {
    /// Create an image load error with context
    pub fn image_load<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ImageLoad {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an OpenCV error with context
    pub fn opencv(operation: impl Into<String>, source: opencv::Error) -> Self {
        Self::OpenCv {
            operation: operation.into(),
            source,
        }
    }

    pub fn invalid_parameter(parameter: impl Into<String>, value: impl ToString) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            value: value.to_string(),
        }
    }

    /// Check if this error indicates a recoverable condition
    ///
    /// Recoverable errors are user-input problems (wrong file, wrong set
    /// letter); retrying with different input can succeed without code or
    /// configuration changes.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            OmrError::ImageLoad { .. }
                | OmrError::MalformedImage { .. }
                | OmrError::UnknownAnswerSet { .. }
        )
    }

    /// Get user-friendly error description for application display
    pub fn user_message(&self) -> String {
        match self {
            OmrError::ImageLoad { .. } => {
                "Could not load the sheet image. Please check the file format and try again."
                    .to_string()
            }
            OmrError::MalformedImage { .. } => {
                "The sheet image is empty or corrupted. Please rescan and upload again.".to_string()
            }
            OmrError::UnknownAnswerSet { set } => {
                format!("Answer set '{}' is not configured. Choose one of the configured sets.", set)
            }
            OmrError::KeyMismatch { .. } => {
                "The answer key does not match the sheet layout. Please check the key file."
                    .to_string()
            }
            _ => "Sheet evaluation failed. Please try with a different image.".to_string(),
        }
    }
}

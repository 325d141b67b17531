use crate::{CaptureState, Dimensions};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum CaptureError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Could not open file \"{path}\": {reason}")]
    FileRead { path: String, reason: String },

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Browser launch failed: {0}")]
    BrowserLaunchFailed(String),

    #[error("Failed loading page: {0}")]
    LoadFailed(String),

    #[error("Page load timed out after {0:?}")]
    LoadTimeout(Duration),

    #[error("Script error: {0}")]
    ScriptError(String),

    #[error("Chrome error: {0}")]
    ChromeError(String),

    #[error("Nothing to capture: viewport is {0}")]
    EmptyCapture(Dimensions),

    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),

    #[error("Image error: {0}")]
    ImageError(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid state transition from {from:?} to {to:?}")]
    InvalidTransition { from: CaptureState, to: CaptureState },
}

/// Where in a run an error surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    Arguments,
    Launch,
    Load,
    Capture,
    Save,
}

impl CaptureError {
    /// Argument and script/CSS file errors are reported together with the usage text.
    pub fn prints_usage(&self) -> bool {
        matches!(
            self,
            CaptureError::InvalidArgument(_) | CaptureError::FileRead { .. }
        )
    }

    pub fn is_load_failure(&self) -> bool {
        matches!(
            self,
            CaptureError::LoadFailed(_) | CaptureError::LoadTimeout(_)
        )
    }

    pub fn stage(&self) -> FailureStage {
        match self {
            CaptureError::InvalidArgument(_)
            | CaptureError::FileRead { .. }
            | CaptureError::ConfigurationError(_) => FailureStage::Arguments,
            CaptureError::BrowserLaunchFailed(_) => FailureStage::Launch,
            CaptureError::LoadFailed(_) | CaptureError::LoadTimeout(_) => FailureStage::Load,
            CaptureError::UnsupportedFormat(_)
            | CaptureError::ImageError(_)
            | CaptureError::IoError(_) => FailureStage::Save,
            _ => FailureStage::Capture,
        }
    }
}

impl From<std::io::Error> for CaptureError {
    fn from(err: std::io::Error) -> Self {
        CaptureError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for CaptureError {
    fn from(err: serde_json::Error) -> Self {
        CaptureError::SerializationError(err.to_string())
    }
}

impl From<image::ImageError> for CaptureError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::Unsupported(e) => CaptureError::UnsupportedFormat(e.to_string()),
            image::ImageError::IoError(e) => CaptureError::IoError(e.to_string()),
            other => CaptureError::ImageError(other.to_string()),
        }
    }
}

impl From<chromiumoxide::error::CdpError> for CaptureError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        match err {
            chromiumoxide::error::CdpError::JavascriptException(details) => {
                CaptureError::ScriptError(details.text.clone())
            }
            other => CaptureError::ChromeError(other.to_string()),
        }
    }
}

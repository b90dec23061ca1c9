use thiserror::Error;

use crate::wizard::WizardStage;

pub type Result<T> = std::result::Result<T, DiaryError>;

/// Why the camera/microphone could not be opened.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeviceError {
    #[error("permission to use the camera was denied")]
    PermissionDenied,

    #[error("no camera or microphone is available")]
    NotFound,

    #[error("device error: {0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum DiaryError {
    /// Camera or microphone acquisition failed; the user retries manually.
    #[error("camera unavailable: {0}")]
    DeviceAcquisition(#[from] DeviceError),

    #[error("no active camera stream")]
    NoActiveStream,

    #[error("recording is already running")]
    AlreadyRecording,

    #[error("recording failed: {0}")]
    Recording(String),

    #[error("`{op}` is not allowed in the {stage:?} stage")]
    InvalidStage { op: &'static str, stage: WizardStage },

    #[error("an upload is already in progress")]
    UploadInProgress,

    #[error("pick a mood before adjusting its intensity")]
    IntensityWithoutMood,

    #[error("upload failed with status {status}")]
    UploadFailed { status: u16 },

    #[error("request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("the recording session has been closed")]
    Disposed,
}

impl DiaryError {
    /// Text shown to the user in the blocking alert for this failure.
    pub fn alert_message(&self) -> String {
        match self {
            DiaryError::DeviceAcquisition(_) => {
                "Could not access the camera. Please check your device permissions.".to_string()
            }
            DiaryError::UploadFailed { .. } | DiaryError::Transport(_) => {
                "Upload failed. Please try again.".to_string()
            }
            other => other.to_string(),
        }
    }
}

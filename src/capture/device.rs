use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::DeviceError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    User,
    Environment,
}

/// What the wizard asks the device layer for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StreamConstraints {
    pub facing: FacingMode,
    pub width: u32,
    pub height: u32,
    pub audio: bool,
    /// Encoder profile for the recorded chunks.
    pub mime_type: String,
}

/// A live audio/video stream. Encoded media accumulates inside the stream
/// and is drained by [`MediaStream::pull_chunk`].
pub trait MediaStream: Send {
    fn id(&self) -> &str;

    /// Encoded bytes produced since the previous pull; may be empty.
    fn pull_chunk(&mut self) -> Vec<u8>;

    fn live_tracks(&self) -> usize;

    /// Stop every track and free the underlying hardware.
    fn stop_tracks(&mut self);
}

/// Source of media streams. Opening may suspend on a permission prompt.
#[async_trait]
pub trait MediaDevice: Send + Sync {
    async fn open(
        &self,
        constraints: &StreamConstraints,
    ) -> Result<Box<dyn MediaStream>, DeviceError>;
}

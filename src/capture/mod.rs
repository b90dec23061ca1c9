//! Camera/microphone capture: device boundary, exclusive stream handle,
//! chunked recorder and the finished artifact.

pub mod artifact;
pub mod device;
pub mod file_device;
pub mod recorder;
pub mod stream;
#[cfg(test)]
pub(crate) mod testing;

pub use artifact::{Artifact, ArtifactInfo, ObjectUrls};
pub use device::{FacingMode, MediaDevice, MediaStream, StreamConstraints};
pub use file_device::FileDevice;
pub use recorder::{ChunkRecorder, RecordedChunks};
pub use stream::StreamHandle;

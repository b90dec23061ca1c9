use std::{io::ErrorKind, path::PathBuf};

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::DeviceError;

use super::{MediaDevice, MediaStream, StreamConstraints};

/// Replays an already encoded video file as if it came from a camera,
/// handing out `bytes_per_pull` bytes on every pull.
pub struct FileDevice {
    path: PathBuf,
    bytes_per_pull: usize,
}

impl FileDevice {
    pub fn new(path: impl Into<PathBuf>, bytes_per_pull: usize) -> Self {
        Self {
            path: path.into(),
            bytes_per_pull: bytes_per_pull.max(1),
        }
    }

    /// Split the file so it is fully drained after `pulls` pulls.
    pub async fn spread_over(path: impl Into<PathBuf>, pulls: u64) -> std::io::Result<Self> {
        let path = path.into();
        let len = tokio::fs::metadata(&path).await?.len() as usize;
        let pulls = pulls.max(1) as usize;
        Ok(Self::new(path, len.div_ceil(pulls)))
    }
}

#[async_trait]
impl MediaDevice for FileDevice {
    async fn open(
        &self,
        _constraints: &StreamConstraints,
    ) -> Result<Box<dyn MediaStream>, DeviceError> {
        let data = tokio::fs::read(&self.path).await.map_err(|err| match err.kind() {
            ErrorKind::NotFound => DeviceError::NotFound,
            ErrorKind::PermissionDenied => DeviceError::PermissionDenied,
            _ => DeviceError::Other(err.to_string()),
        })?;

        Ok(Box::new(ReplayStream {
            id: format!("file-{}", Uuid::new_v4()),
            data,
            cursor: 0,
            bytes_per_pull: self.bytes_per_pull,
            live_tracks: 2,
        }))
    }
}

struct ReplayStream {
    id: String,
    data: Vec<u8>,
    cursor: usize,
    bytes_per_pull: usize,
    live_tracks: usize,
}

impl MediaStream for ReplayStream {
    fn id(&self) -> &str {
        &self.id
    }

    fn pull_chunk(&mut self) -> Vec<u8> {
        if self.live_tracks == 0 {
            return Vec::new();
        }
        let end = (self.cursor + self.bytes_per_pull).min(self.data.len());
        let chunk = self.data[self.cursor..end].to_vec();
        self.cursor = end;
        chunk
    }

    fn live_tracks(&self) -> usize {
        self.live_tracks
    }

    fn stop_tracks(&mut self) {
        self.live_tracks = 0;
    }
}

use log::info;

use super::MediaStream;

/// Exclusive owner of one device stream. Releasing stops every track; the
/// handle releases itself when dropped so no exit path leaks the camera.
pub struct StreamHandle {
    id: String,
    stream: Option<Box<dyn MediaStream>>,
}

impl StreamHandle {
    pub fn new(stream: Box<dyn MediaStream>) -> Self {
        Self {
            id: stream.id().to_string(),
            stream: Some(stream),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_live(&self) -> bool {
        self.stream
            .as_ref()
            .map(|stream| stream.live_tracks() > 0)
            .unwrap_or(false)
    }

    pub fn pull_chunk(&mut self) -> Vec<u8> {
        match self.stream.as_mut() {
            Some(stream) => stream.pull_chunk(),
            None => Vec::new(),
        }
    }

    /// Idempotent.
    pub fn release(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop_tracks();
            info!("Released media stream {}", self.id);
        }
    }
}

impl Drop for StreamHandle {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for StreamHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamHandle")
            .field("id", &self.id)
            .field("live", &self.is_live())
            .finish()
    }
}

//! In-memory camera used by the unit tests.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;

use crate::error::DeviceError;

use super::{MediaDevice, MediaStream, StreamConstraints};

pub struct FakeDevice {
    bytes_per_pull: usize,
    opens: AtomicUsize,
    live_tracks: Arc<AtomicUsize>,
    failures: Mutex<Vec<DeviceError>>,
}

impl FakeDevice {
    pub fn new(bytes_per_pull: usize) -> Self {
        Self {
            bytes_per_pull,
            opens: AtomicUsize::new(0),
            live_tracks: Arc::new(AtomicUsize::new(0)),
            failures: Mutex::new(Vec::new()),
        }
    }

    /// The next `open` fails with `err`.
    pub fn fail_next(&self, err: DeviceError) {
        self.failures.lock().unwrap().push(err);
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    /// Tracks still running across every stream this device handed out.
    pub fn live_tracks(&self) -> usize {
        self.live_tracks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaDevice for FakeDevice {
    async fn open(
        &self,
        _constraints: &StreamConstraints,
    ) -> Result<Box<dyn MediaStream>, DeviceError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.failures.lock().unwrap().pop() {
            return Err(err);
        }
        self.live_tracks.fetch_add(2, Ordering::SeqCst);
        Ok(Box::new(FakeStream {
            id: format!("fake-{}", self.opens()),
            bytes_per_pull: self.bytes_per_pull,
            tracks: 2,
            live_tracks: Arc::clone(&self.live_tracks),
        }))
    }
}

struct FakeStream {
    id: String,
    bytes_per_pull: usize,
    tracks: usize,
    live_tracks: Arc<AtomicUsize>,
}

impl MediaStream for FakeStream {
    fn id(&self) -> &str {
        &self.id
    }

    fn pull_chunk(&mut self) -> Vec<u8> {
        if self.tracks == 0 {
            return Vec::new();
        }
        vec![0xAB; self.bytes_per_pull]
    }

    fn live_tracks(&self) -> usize {
        self.tracks
    }

    fn stop_tracks(&mut self) {
        self.live_tracks.fetch_sub(self.tracks, Ordering::SeqCst);
        self.tracks = 0;
    }
}

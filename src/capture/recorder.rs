use std::time::Duration;

use tokio::{
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::error::{DiaryError, Result};

use super::StreamHandle;

// Set to true to trace every pulled chunk.
const ENABLE_LOGS: bool = false;

use crate::{log_debug, log_info};

/// Output of a finished recording: the stream goes back to its owner for
/// release, the chunks become the artifact.
pub struct RecordedChunks {
    pub stream: StreamHandle,
    pub chunks: Vec<Vec<u8>>,
    pub duration: Duration,
}

/// Pulls encoded chunks from a stream at a fixed timeslice. The recorder
/// owns the stream for as long as it runs.
pub struct ChunkRecorder {
    handle: JoinHandle<(StreamHandle, Vec<Vec<u8>>)>,
    cancel_token: CancellationToken,
    started_at: Instant,
}

impl ChunkRecorder {
    pub fn start(stream: StreamHandle, timeslice: Duration) -> Self {
        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(chunk_loop(stream, timeslice, cancel_token.clone()));

        Self {
            handle,
            cancel_token,
            started_at: Instant::now(),
        }
    }

    /// Stop pulling, collect the trailing partial chunk and hand everything back.
    pub async fn finish(self) -> Result<RecordedChunks> {
        let duration = self.started_at.elapsed();
        self.cancel_token.cancel();

        // A panicked loop drops the stream, which releases it.
        let (stream, chunks) = self
            .handle
            .await
            .map_err(|err| DiaryError::Recording(format!("chunk loop failed: {err}")))?;

        Ok(RecordedChunks {
            stream,
            chunks,
            duration,
        })
    }
}

async fn chunk_loop(
    mut stream: StreamHandle,
    timeslice: Duration,
    cancel_token: CancellationToken,
) -> (StreamHandle, Vec<Vec<u8>>) {
    let mut chunks = Vec::new();
    let mut ticker = time::interval_at(Instant::now() + timeslice, timeslice);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    log_info!("chunk loop started on stream {}", stream.id());

    loop {
        tokio::select! {
            biased;
            _ = cancel_token.cancelled() => break,
            _ = ticker.tick() => push_chunk(&mut stream, &mut chunks),
        }
    }

    push_chunk(&mut stream, &mut chunks);
    log_info!("chunk loop finished with {} chunks", chunks.len());

    (stream, chunks)
}

fn push_chunk(stream: &mut StreamHandle, chunks: &mut Vec<Vec<u8>>) {
    let chunk = stream.pull_chunk();
    if chunk.is_empty() {
        return;
    }
    log_debug!("chunk #{} ({} bytes)", chunks.len(), chunk.len());
    chunks.push(chunk);
}

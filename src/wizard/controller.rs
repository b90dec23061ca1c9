use std::{
    sync::{
        atomic::{AtomicU8, Ordering},
        Arc,
    },
    time::Duration,
};

use log::{info, warn};
use serde::Serialize;
use tokio::{
    sync::Mutex,
    task::JoinHandle,
    time::{self, Instant},
};

use crate::{
    capture::{Artifact, MediaDevice, ObjectUrls, RecordedChunks, StreamHandle},
    error::{DiaryError, Result},
    events::{self, emit_json, EventSink},
    models::{Entry, Mood, SessionContext},
    settings::{CaptureSettings, ClientSettings, ProgressMode, UploadSettings},
    upload::{next_simulated, transfer_percent, EntryUploader, ProgressFn, UploadRequest},
    utils::format::clock,
};

use super::{DraftPatch, RecordingSession, WizardSnapshot};

const ELAPSED_TICK: Duration = Duration::from_secs(1);

#[derive(Serialize, Clone)]
#[serde(rename_all = "camelCase")]
struct ElapsedEvent {
    seconds: u64,
    label: String,
}

#[derive(Serialize, Clone)]
#[serde(rename_all = "camelCase")]
struct UploadProgressEvent {
    percent: u8,
    simulated: bool,
}

#[derive(Serialize, Clone)]
struct AlertEvent {
    message: String,
}

#[derive(Serialize, Clone)]
#[serde(rename_all = "camelCase")]
struct NavigateEvent {
    route: String,
    entry_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum SubmitOutcome {
    Uploaded { entry: Option<Entry> },
    /// Nothing recorded yet; the submit did nothing.
    Skipped,
}

#[derive(Default)]
struct Timers {
    elapsed: Option<JoinHandle<()>>,
    progress: Option<JoinHandle<()>>,
    navigate: Option<JoinHandle<()>>,
}

impl Timers {
    fn abort_all(&mut self) {
        for handle in [
            self.elapsed.take(),
            self.progress.take(),
            self.navigate.take(),
        ]
        .into_iter()
        .flatten()
        {
            handle.abort();
        }
    }
}

/// Drives one entry-recording wizard: Capture → Review → Details → submit.
///
/// The session lives behind a single lock. Transitions that must look
/// atomic to observers (stop → Review with artifact) happen while holding it.
#[derive(Clone)]
pub struct WizardController {
    state: Arc<Mutex<Option<RecordingSession>>>,
    timers: Arc<Mutex<Timers>>,
    progress: Arc<AtomicU8>,
    device: Arc<dyn MediaDevice>,
    uploader: Arc<dyn EntryUploader>,
    events: Arc<dyn EventSink>,
    credentials: SessionContext,
    urls: ObjectUrls,
    capture: CaptureSettings,
    upload: UploadSettings,
    debug_events: bool,
}

impl WizardController {
    pub fn new(
        device: Arc<dyn MediaDevice>,
        uploader: Arc<dyn EntryUploader>,
        events: Arc<dyn EventSink>,
        credentials: SessionContext,
        settings: &ClientSettings,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(Some(RecordingSession::new()))),
            timers: Arc::new(Mutex::new(Timers::default())),
            progress: Arc::new(AtomicU8::new(0)),
            device,
            uploader,
            events,
            credentials,
            urls: ObjectUrls::new(),
            capture: settings.capture.clone(),
            upload: settings.upload.clone(),
            debug_events: settings.debug_events,
        }
    }

    /// Create the session and ask for the camera. A refused camera leaves
    /// the wizard in Capture without a stream; the user retries by hand.
    pub async fn mount(
        device: Arc<dyn MediaDevice>,
        uploader: Arc<dyn EntryUploader>,
        events: Arc<dyn EventSink>,
        credentials: SessionContext,
        settings: &ClientSettings,
    ) -> Self {
        let controller = Self::new(device, uploader, events, credentials, settings);
        if let Err(err) = controller.start_camera().await {
            warn!("Camera unavailable on mount: {err}");
        }
        controller
    }

    pub fn object_urls(&self) -> &ObjectUrls {
        &self.urls
    }

    pub async fn snapshot(&self) -> Result<WizardSnapshot> {
        let guard = self.state.lock().await;
        let session = guard.as_ref().ok_or(DiaryError::Disposed)?;
        Ok(session.snapshot(self.progress.load(Ordering::SeqCst)))
    }

    pub async fn is_disposed(&self) -> bool {
        self.state.lock().await.is_none()
    }

    pub async fn start_camera(&self) -> Result<()> {
        {
            let mut guard = self.state.lock().await;
            guard
                .as_mut()
                .ok_or(DiaryError::Disposed)?
                .begin_acquire()?;
        }

        // The permission prompt may take a while; the lock is not held here.
        let opened = self
            .device
            .open(&self.capture.constraints())
            .await
            .map(StreamHandle::new);

        let result = {
            let mut guard = self.state.lock().await;
            // Disposed meanwhile: a freshly opened handle is dropped and released here.
            let session = guard.as_mut().ok_or(DiaryError::Disposed)?;
            match opened {
                Ok(stream) => {
                    info!("Camera stream {} acquired", stream.id());
                    session.attach_stream(stream)
                }
                Err(err) => {
                    session.abort_acquire();
                    Err(DiaryError::from(err))
                }
            }
        };

        if let Err(err) = &result {
            self.alert(err);
        }
        self.emit_state_changed().await;
        result
    }

    pub async fn start_recording(&self) -> Result<WizardSnapshot> {
        {
            let mut guard = self.state.lock().await;
            guard
                .as_mut()
                .ok_or(DiaryError::Disposed)?
                .begin_recording(self.capture.timeslice())?;
        }
        info!("Recording started");

        self.spawn_elapsed_ticker().await;
        self.emit_state_changed().await;
        self.snapshot().await
    }

    pub async fn stop_recording(&self) -> Result<WizardSnapshot> {
        let snapshot = {
            let mut guard = self.state.lock().await;
            let session = guard.as_mut().ok_or(DiaryError::Disposed)?;
            let recorder = session.take_recorder()?;
            self.cancel_elapsed_ticker().await;

            // Finalize while still holding the lock so nobody observes Review
            // before the artifact exists.
            match recorder.finish().await {
                Ok(RecordedChunks {
                    mut stream,
                    chunks,
                    duration,
                }) => {
                    stream.release();
                    let artifact = Artifact::from_chunks(chunks, duration);
                    let url = self.urls.create(&artifact);
                    info!(
                        "Recording stopped: {} bytes over {:.1}s",
                        artifact.len(),
                        duration.as_secs_f64()
                    );
                    session.complete_recording(artifact, url);
                    session.snapshot(self.progress.load(Ordering::SeqCst))
                }
                Err(err) => {
                    drop(guard);
                    self.alert(&err);
                    self.emit_state_changed().await;
                    return Err(err);
                }
            }
        };

        self.emit_snapshot(&snapshot);
        Ok(snapshot)
    }

    /// Drop the recording, go back to Capture and ask for the camera again.
    pub async fn retake(&self) -> Result<()> {
        let url = {
            let mut guard = self.state.lock().await;
            guard
                .as_mut()
                .ok_or(DiaryError::Disposed)?
                .discard_recording()?
        };
        self.urls.revoke(&url);
        self.emit_state_changed().await;

        self.start_camera().await
    }

    pub async fn proceed(&self) -> Result<WizardSnapshot> {
        self.transition(|session| session.advance_to_details()).await
    }

    pub async fn back(&self) -> Result<WizardSnapshot> {
        self.transition(|session| session.back_to_review()).await
    }

    pub async fn set_mood(&self, mood: Option<Mood>) -> Result<WizardSnapshot> {
        self.transition(|session| {
            session.draft_mut()?.set_mood(mood);
            Ok(())
        })
        .await
    }

    pub async fn set_mood_intensity(&self, value: i64) -> Result<WizardSnapshot> {
        self.transition(|session| session.draft_mut()?.set_mood_intensity(value).map(|_| ()))
            .await
    }

    /// Raw comma separated input; parsed when the entry is submitted.
    pub async fn set_tags(&self, raw: impl Into<String>) -> Result<WizardSnapshot> {
        let raw = raw.into();
        self.transition(|session| {
            session.draft_mut()?.tags = raw;
            Ok(())
        })
        .await
    }

    pub async fn update_draft(&self, patch: DraftPatch) -> Result<WizardSnapshot> {
        self.transition(|session| {
            patch.apply(session.draft_mut()?);
            Ok(())
        })
        .await
    }

    /// Upload the artifact with the draft. On failure the form stays on
    /// Details with everything intact and can be submitted again.
    pub async fn submit(&self) -> Result<SubmitOutcome> {
        let request = {
            let mut guard = self.state.lock().await;
            let session = guard.as_mut().ok_or(DiaryError::Disposed)?;
            match session.begin_upload()? {
                Some((artifact, draft)) => UploadRequest::new(artifact, &draft),
                None => {
                    warn!("Submit ignored: nothing recorded");
                    return Ok(SubmitOutcome::Skipped);
                }
            }
        };

        self.progress.store(0, Ordering::SeqCst);
        self.emit_state_changed().await;

        let simulated = self.upload.progress == ProgressMode::Simulated;
        let on_progress = if simulated {
            self.spawn_progress_simulation().await;
            None
        } else {
            Some(self.transfer_progress())
        };

        info!(
            "Uploading entry ({} bytes, mood {:?})",
            request.artifact.len(),
            request.mood
        );
        let result = self
            .uploader
            .upload(&self.credentials, request, on_progress)
            .await;
        self.cancel_progress_ticker().await;

        match result {
            Ok(receipt) => {
                if self.is_disposed().await {
                    return Ok(SubmitOutcome::Uploaded {
                        entry: receipt.entry,
                    });
                }
                self.progress.store(100, Ordering::SeqCst);
                self.emit_progress(100, simulated);
                self.emit_state_changed().await;

                let entry_id = receipt.entry.as_ref().map(|entry| entry.id);
                self.schedule_navigation(entry_id).await;
                Ok(SubmitOutcome::Uploaded {
                    entry: receipt.entry,
                })
            }
            Err(err) => {
                warn!("Upload failed: {err}");
                {
                    let mut guard = self.state.lock().await;
                    let Some(session) = guard.as_mut() else {
                        return Err(err);
                    };
                    session.fail_upload();
                }
                self.progress.store(0, Ordering::SeqCst);
                self.alert(&err);
                self.emit_state_changed().await;
                Err(err)
            }
        }
    }

    /// Tear the wizard down: timers stop, the recorder is drained, the
    /// camera is released and playback URLs are revoked. Idempotent.
    pub async fn dispose(&self) {
        self.timers.lock().await.abort_all();

        let Some(session) = self.state.lock().await.take() else {
            return;
        };
        let leftovers = session.into_leftovers();

        if let Some(recorder) = leftovers.recorder {
            match recorder.finish().await {
                Ok(mut recorded) => recorded.stream.release(),
                Err(err) => warn!("Recorder did not shut down cleanly: {err}"),
            }
        }
        if let Some(mut stream) = leftovers.stream {
            stream.release();
        }
        if let Some(url) = leftovers.playback_url {
            self.urls.revoke(&url);
        }
        info!("Recording wizard disposed");
    }

    async fn transition<F>(&self, apply: F) -> Result<WizardSnapshot>
    where
        F: FnOnce(&mut RecordingSession) -> Result<()>,
    {
        let snapshot = {
            let mut guard = self.state.lock().await;
            let session = guard.as_mut().ok_or(DiaryError::Disposed)?;
            apply(session)?;
            session.snapshot(self.progress.load(Ordering::SeqCst))
        };
        self.emit_snapshot(&snapshot);
        Ok(snapshot)
    }

    async fn spawn_elapsed_ticker(&self) {
        let mut timers = self.timers.lock().await;
        if let Some(handle) = timers.elapsed.take() {
            handle.abort();
        }

        let state = self.state.clone();
        let events = self.events.clone();
        let debug_events = self.debug_events;

        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + ELAPSED_TICK, ELAPSED_TICK);
            loop {
                interval.tick().await;

                let seconds = {
                    let mut guard = state.lock().await;
                    match guard.as_mut().and_then(RecordingSession::tick_elapsed) {
                        Some(seconds) => seconds,
                        None => break,
                    }
                };

                if debug_events {
                    info!("elapsed {seconds}s");
                }
                emit_json(
                    events.as_ref(),
                    events::ELAPSED,
                    &ElapsedEvent {
                        seconds,
                        label: clock(seconds),
                    },
                );
            }
        });

        timers.elapsed = Some(handle);
    }

    async fn cancel_elapsed_ticker(&self) {
        if let Some(handle) = self.timers.lock().await.elapsed.take() {
            handle.abort();
        }
    }

    async fn spawn_progress_simulation(&self) {
        let mut timers = self.timers.lock().await;
        if let Some(handle) = timers.progress.take() {
            handle.abort();
        }

        let state = self.state.clone();
        let progress = self.progress.clone();
        let events = self.events.clone();
        let tick = Duration::from_millis(self.upload.simulated_tick_ms.max(1));
        let step = self.upload.simulated_step;
        let cap = self.upload.simulated_cap;

        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + tick, tick);
            loop {
                interval.tick().await;
                if state.lock().await.is_none() {
                    break;
                }

                let current = progress.load(Ordering::SeqCst);
                let next = next_simulated(current, step, cap);
                if next == current {
                    break;
                }
                progress.store(next, Ordering::SeqCst);
                emit_json(
                    events.as_ref(),
                    events::UPLOAD_PROGRESS,
                    &UploadProgressEvent {
                        percent: next,
                        simulated: true,
                    },
                );
            }
        });

        timers.progress = Some(handle);
    }

    /// Abort the simulated ticker and wait for it, so a tick already past
    /// its await point cannot store or emit after the final value.
    async fn cancel_progress_ticker(&self) {
        let handle = self.timers.lock().await.progress.take();
        if let Some(handle) = handle {
            handle.abort();
            let _ = handle.await;
        }
    }

    fn transfer_progress(&self) -> ProgressFn {
        let progress = self.progress.clone();
        let events = self.events.clone();
        Arc::new(move |sent, total| {
            let percent = transfer_percent(sent, total);
            let previous = progress.fetch_max(percent, Ordering::SeqCst);
            if percent > previous {
                emit_json(
                    events.as_ref(),
                    events::UPLOAD_PROGRESS,
                    &UploadProgressEvent {
                        percent,
                        simulated: false,
                    },
                );
            }
        })
    }

    /// Leave the wizard after a short pause so the finished bar can render.
    async fn schedule_navigation(&self, entry_id: Option<i64>) {
        let controller = self.clone();
        let delay = Duration::from_millis(self.upload.navigate_delay_ms);
        let route = self.upload.success_route.clone();

        let mut timers = self.timers.lock().await;
        if let Some(handle) = timers.navigate.take() {
            handle.abort();
        }
        timers.navigate = Some(tokio::spawn(async move {
            time::sleep(delay).await;
            // Detach this task's own handle so dispose does not abort it.
            drop(controller.timers.lock().await.navigate.take());
            controller.dispose().await;
            emit_json(
                controller.events.as_ref(),
                events::NAVIGATE,
                &NavigateEvent { route, entry_id },
            );
        }));
    }

    fn alert(&self, err: &DiaryError) {
        emit_json(
            self.events.as_ref(),
            events::ALERT,
            &AlertEvent {
                message: err.alert_message(),
            },
        );
    }

    fn emit_progress(&self, percent: u8, simulated: bool) {
        emit_json(
            self.events.as_ref(),
            events::UPLOAD_PROGRESS,
            &UploadProgressEvent { percent, simulated },
        );
    }

    fn emit_snapshot(&self, snapshot: &WizardSnapshot) {
        emit_json(self.events.as_ref(), events::STATE_CHANGED, snapshot);
    }

    async fn emit_state_changed(&self) {
        if let Ok(snapshot) = self.snapshot().await {
            self.emit_snapshot(&snapshot);
        }
    }
}

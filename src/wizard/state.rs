use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    capture::{Artifact, ArtifactInfo, ChunkRecorder, StreamHandle},
    error::{DiaryError, Result},
    utils::format::clock,
};

use super::EntryDraft;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum WizardStage {
    #[default]
    Capture,
    Review,
    Details,
}

/// Capture owns the device stream (directly, or through the running
/// recorder); Review and Details own the artifact. Nothing else can hold
/// either, so an artifact outside Review/Details or a stream outside
/// Capture cannot be represented.
pub(crate) enum Stage {
    Capture(CaptureState),
    Review(Recorded),
    Details(Recorded),
}

#[derive(Default)]
pub(crate) struct CaptureState {
    stream: Option<StreamHandle>,
    recorder: Option<ChunkRecorder>,
    acquiring: bool,
}

pub(crate) struct Recorded {
    artifact: Artifact,
    playback_url: String,
}

/// Everything a session still owns when it is torn down.
pub(crate) struct Leftovers {
    pub stream: Option<StreamHandle>,
    pub recorder: Option<ChunkRecorder>,
    pub playback_url: Option<String>,
}

pub struct RecordingSession {
    stage: Stage,
    elapsed_seconds: u64,
    draft: EntryDraft,
    is_uploading: bool,
}

impl Default for RecordingSession {
    fn default() -> Self {
        Self {
            stage: Stage::Capture(CaptureState::default()),
            elapsed_seconds: 0,
            draft: EntryDraft::default(),
            is_uploading: false,
        }
    }
}

impl RecordingSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> WizardStage {
        match self.stage {
            Stage::Capture(_) => WizardStage::Capture,
            Stage::Review(_) => WizardStage::Review,
            Stage::Details(_) => WizardStage::Details,
        }
    }

    pub fn is_recording(&self) -> bool {
        matches!(&self.stage, Stage::Capture(capture) if capture.recorder.is_some())
    }

    pub fn stream_active(&self) -> bool {
        match &self.stage {
            Stage::Capture(capture) => {
                capture.recorder.is_some()
                    || capture.stream.as_ref().map(StreamHandle::is_live).unwrap_or(false)
            }
            _ => false,
        }
    }

    pub fn artifact(&self) -> Option<&Artifact> {
        match &self.stage {
            Stage::Review(recorded) | Stage::Details(recorded) => Some(&recorded.artifact),
            Stage::Capture(_) => None,
        }
    }

    pub fn playback_url(&self) -> Option<&str> {
        match &self.stage {
            Stage::Review(recorded) | Stage::Details(recorded) => Some(&recorded.playback_url),
            Stage::Capture(_) => None,
        }
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    pub fn draft(&self) -> &EntryDraft {
        &self.draft
    }

    pub fn is_uploading(&self) -> bool {
        self.is_uploading
    }

    /// Counts one second of recording. Returns `None` once recording stopped.
    pub(crate) fn tick_elapsed(&mut self) -> Option<u64> {
        if !self.is_recording() {
            return None;
        }
        self.elapsed_seconds += 1;
        Some(self.elapsed_seconds)
    }

    pub(crate) fn begin_acquire(&mut self) -> Result<()> {
        let stage = self.stage();
        match &mut self.stage {
            Stage::Capture(capture)
                if capture.stream.is_none() && capture.recorder.is_none() && !capture.acquiring =>
            {
                capture.acquiring = true;
                Ok(())
            }
            _ => Err(DiaryError::InvalidStage {
                op: "start_camera",
                stage,
            }),
        }
    }

    pub(crate) fn abort_acquire(&mut self) {
        if let Stage::Capture(capture) = &mut self.stage {
            capture.acquiring = false;
        }
    }

    /// On error the handle is dropped, which releases it.
    pub(crate) fn attach_stream(&mut self, stream: StreamHandle) -> Result<()> {
        let stage = self.stage();
        match &mut self.stage {
            Stage::Capture(capture) if capture.stream.is_none() && capture.recorder.is_none() => {
                capture.acquiring = false;
                capture.stream = Some(stream);
                Ok(())
            }
            _ => Err(DiaryError::InvalidStage {
                op: "attach_stream",
                stage,
            }),
        }
    }

    pub(crate) fn begin_recording(&mut self, timeslice: Duration) -> Result<()> {
        let stage = self.stage();
        let Stage::Capture(capture) = &mut self.stage else {
            return Err(DiaryError::InvalidStage {
                op: "start_recording",
                stage,
            });
        };
        if capture.recorder.is_some() {
            return Err(DiaryError::AlreadyRecording);
        }
        let stream = capture.stream.take().ok_or(DiaryError::NoActiveStream)?;
        capture.recorder = Some(ChunkRecorder::start(stream, timeslice));
        self.elapsed_seconds = 0;
        Ok(())
    }

    pub(crate) fn take_recorder(&mut self) -> Result<ChunkRecorder> {
        let stage = self.stage();
        match &mut self.stage {
            Stage::Capture(capture) => capture.recorder.take().ok_or(DiaryError::InvalidStage {
                op: "stop_recording",
                stage,
            }),
            _ => Err(DiaryError::InvalidStage {
                op: "stop_recording",
                stage,
            }),
        }
    }

    pub(crate) fn complete_recording(&mut self, artifact: Artifact, playback_url: String) {
        self.stage = Stage::Review(Recorded {
            artifact,
            playback_url,
        });
    }

    /// Review → Capture. Returns the playback URL that must be revoked.
    pub(crate) fn discard_recording(&mut self) -> Result<String> {
        let stage = self.stage();
        if stage != WizardStage::Review {
            return Err(DiaryError::InvalidStage { op: "retake", stage });
        }
        match std::mem::replace(&mut self.stage, Stage::Capture(CaptureState::default())) {
            Stage::Review(recorded) => {
                self.elapsed_seconds = 0;
                Ok(recorded.playback_url)
            }
            other => {
                self.stage = other;
                Err(DiaryError::InvalidStage { op: "retake", stage })
            }
        }
    }

    pub(crate) fn advance_to_details(&mut self) -> Result<()> {
        self.swap_recorded(WizardStage::Review, "proceed", Stage::Details)
    }

    pub(crate) fn back_to_review(&mut self) -> Result<()> {
        if self.is_uploading {
            return Err(DiaryError::UploadInProgress);
        }
        self.swap_recorded(WizardStage::Details, "back", Stage::Review)
    }

    fn swap_recorded(
        &mut self,
        from: WizardStage,
        op: &'static str,
        to: fn(Recorded) -> Stage,
    ) -> Result<()> {
        let stage = self.stage();
        if stage != from {
            return Err(DiaryError::InvalidStage { op, stage });
        }
        self.stage = match std::mem::replace(&mut self.stage, Stage::Capture(CaptureState::default()))
        {
            Stage::Review(recorded) | Stage::Details(recorded) => to(recorded),
            capture => capture,
        };
        Ok(())
    }

    pub(crate) fn draft_mut(&mut self) -> Result<&mut EntryDraft> {
        let stage = self.stage();
        if stage != WizardStage::Details {
            return Err(DiaryError::InvalidStage {
                op: "edit_draft",
                stage,
            });
        }
        if self.is_uploading {
            return Err(DiaryError::UploadInProgress);
        }
        Ok(&mut self.draft)
    }

    /// Marks the form as uploading and hands out what goes on the wire.
    /// `Ok(None)` when there is nothing to upload.
    pub(crate) fn begin_upload(&mut self) -> Result<Option<(Artifact, EntryDraft)>> {
        let stage = self.stage();
        let Some(artifact) = self.artifact().cloned() else {
            return Ok(None);
        };
        if stage != WizardStage::Details {
            return Err(DiaryError::InvalidStage { op: "submit", stage });
        }
        if self.is_uploading {
            return Err(DiaryError::UploadInProgress);
        }
        self.is_uploading = true;
        Ok(Some((artifact, self.draft.clone())))
    }

    pub(crate) fn fail_upload(&mut self) {
        self.is_uploading = false;
    }

    pub(crate) fn into_leftovers(self) -> Leftovers {
        match self.stage {
            Stage::Capture(capture) => Leftovers {
                stream: capture.stream,
                recorder: capture.recorder,
                playback_url: None,
            },
            Stage::Review(recorded) | Stage::Details(recorded) => Leftovers {
                stream: None,
                recorder: None,
                playback_url: Some(recorded.playback_url),
            },
        }
    }

    pub fn snapshot(&self, upload_progress: u8) -> WizardSnapshot {
        WizardSnapshot {
            stage: self.stage(),
            is_recording: self.is_recording(),
            stream_active: self.stream_active(),
            elapsed_seconds: self.elapsed_seconds,
            elapsed_label: clock(self.elapsed_seconds),
            artifact: self
                .artifact()
                .map(|artifact| artifact.info(self.playback_url().map(str::to_string))),
            draft: self.draft.clone(),
            is_uploading: self.is_uploading,
            upload_progress,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WizardSnapshot {
    pub stage: WizardStage,
    pub is_recording: bool,
    pub stream_active: bool,
    pub elapsed_seconds: u64,
    pub elapsed_label: String,
    pub artifact: Option<ArtifactInfo>,
    pub draft: EntryDraft,
    pub is_uploading: bool,
    pub upload_progress: u8,
}

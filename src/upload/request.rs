use futures::stream;
use reqwest::{
    multipart::{Form, Part},
    Body,
};

use crate::{
    capture::Artifact,
    error::Result,
    models::Mood,
    wizard::EntryDraft,
};

use super::ProgressFn;

/// Size of the slices the video part is streamed in.
const BODY_SLICE: usize = 64 * 1024;

/// Everything sent to `POST /api/entries/upload`.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadRequest {
    pub artifact: Artifact,
    pub title: String,
    pub note: String,
    pub mood: Option<Mood>,
    pub mood_intensity: u8,
    pub manual_tags: Vec<String>,
    pub is_private: bool,
}

impl UploadRequest {
    pub fn new(artifact: Artifact, draft: &EntryDraft) -> Self {
        Self {
            artifact,
            title: draft.title.clone(),
            note: draft.note.clone(),
            mood: draft.mood(),
            mood_intensity: draft.mood_intensity(),
            manual_tags: draft.parsed_tags(),
            is_private: draft.is_private,
        }
    }

    /// The non-file form fields exactly as they go on the wire.
    pub fn text_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("title", self.title.clone()),
            ("note", self.note.clone()),
            (
                "mood",
                self.mood.map(|mood| mood.as_str().to_string()).unwrap_or_default(),
            ),
            ("mood_intensity", self.mood_intensity.to_string()),
            (
                "manual_tags",
                serde_json::to_string(&self.manual_tags).unwrap_or_else(|_| "[]".into()),
            ),
            ("is_private", self.is_private.to_string()),
        ]
    }

    pub fn into_form(self, progress: Option<ProgressFn>) -> Result<Form> {
        let fields = self.text_fields();
        let total = self.artifact.len() as u64;
        let video = Part::stream_with_length(video_body(&self.artifact, progress), total)
            .file_name(self.artifact.file_name())
            .mime_str(self.artifact.mime_type())?;

        Ok(fields
            .into_iter()
            .fold(Form::new().part("video", video), |form, (name, value)| {
                form.text(name, value)
            }))
    }
}

fn video_body(artifact: &Artifact, progress: Option<ProgressFn>) -> Body {
    let data = artifact.shared_bytes();
    let total = data.len();

    let slices = (0..total).step_by(BODY_SLICE).map(move |start| {
        let end = (start + BODY_SLICE).min(total);
        if let Some(report) = progress.as_ref() {
            report(end as u64, total as u64);
        }
        Ok::<Vec<u8>, std::io::Error>(data[start..end].to_vec())
    });

    Body::wrap_stream(stream::iter(slices))
}

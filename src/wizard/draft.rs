use serde::{Deserialize, Serialize};

use crate::{
    error::{DiaryError, Result},
    models::Mood,
};

pub const MIN_INTENSITY: u8 = 1;
pub const MAX_INTENSITY: u8 = 10;
pub const DEFAULT_INTENSITY: u8 = 5;

/// Metadata form state. Every field is optional except the recording itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EntryDraft {
    pub title: String,
    pub note: String,
    mood: Option<Mood>,
    mood_intensity: u8,
    /// Raw comma separated input, parsed on submit.
    pub tags: String,
    pub is_private: bool,
}

impl Default for EntryDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            note: String::new(),
            mood: None,
            mood_intensity: DEFAULT_INTENSITY,
            tags: String::new(),
            is_private: true,
        }
    }
}

impl EntryDraft {
    pub fn mood(&self) -> Option<Mood> {
        self.mood
    }

    pub fn mood_intensity(&self) -> u8 {
        self.mood_intensity
    }

    /// Changing or clearing the mood keeps the current intensity.
    pub fn set_mood(&mut self, mood: Option<Mood>) {
        self.mood = mood;
    }

    /// Clamped to 1..=10. Only editable once a mood is picked.
    pub fn set_mood_intensity(&mut self, value: i64) -> Result<u8> {
        if self.mood.is_none() {
            return Err(DiaryError::IntensityWithoutMood);
        }
        self.mood_intensity = value.clamp(MIN_INTENSITY as i64, MAX_INTENSITY as i64) as u8;
        Ok(self.mood_intensity)
    }

    pub fn parsed_tags(&self) -> Vec<String> {
        parse_tags(&self.tags)
    }
}

/// Split on commas, trim, drop empty segments.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Partial form update from the view; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftPatch {
    pub title: Option<String>,
    pub note: Option<String>,
    pub tags: Option<String>,
    pub is_private: Option<bool>,
}

impl DraftPatch {
    pub fn apply(self, draft: &mut EntryDraft) {
        if let Some(title) = self.title {
            draft.title = title;
        }
        if let Some(note) = self.note {
            draft.note = note;
        }
        if let Some(tags) = self.tags {
            draft.tags = tags;
        }
        if let Some(is_private) = self.is_private {
            draft.is_private = is_private;
        }
    }
}

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{wire, Mood};

/// One journal entry as the backend returns it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entry {
    pub id: i64,
    pub user_id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub mood: Option<Mood>,
    #[serde(default)]
    pub mood_intensity: Option<u8>,
    #[serde(default, deserialize_with = "wire::null_as_empty")]
    pub manual_tags: Vec<String>,
    #[serde(default, deserialize_with = "wire::null_as_empty")]
    pub auto_tags: Vec<String>,
    #[serde(default = "default_private")]
    pub is_private: bool,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub is_processed: bool,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub duration_seconds: Option<f64>,
    #[serde(default)]
    pub transcript: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(deserialize_with = "wire::timestamp")]
    pub recorded_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "wire::optional_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "wire::optional_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_private() -> bool {
    true
}

impl Entry {
    pub fn recorded_on(&self) -> NaiveDate {
        self.recorded_at.date_naive()
    }
}

/// A page of `GET /api/entries`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntryPage {
    pub items: Vec<Entry>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub has_more: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntryStats {
    pub total_entries: u64,
    pub total_duration_minutes: f64,
    /// Mood wire name to entry count.
    #[serde(default)]
    pub mood_distribution: BTreeMap<String, u64>,
    pub entries_this_week: u64,
    pub entries_this_month: u64,
    pub streak_days: u32,
}

/// Dominant mood of a single day in the yearly heatmap.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HeatmapCell {
    pub mood: Mood,
    pub intensity: u8,
    pub count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DayMoodStat {
    pub count: u32,
    pub avg_intensity: f64,
}

pub type MoodHeatmap = BTreeMap<NaiveDate, HeatmapCell>;

/// Day name to mood wire name to aggregate.
pub type DayOfWeekBreakdown = BTreeMap<String, BTreeMap<String, DayMoodStat>>;

use chrono::{DateTime, Utc};

use crate::models::Mood;

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Filters for `GET /api/entries`.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryQuery {
    pub page: u32,
    pub page_size: u32,
    pub mood: Option<Mood>,
    pub favorites_only: bool,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub tag: Option<String>,
}

impl Default for EntryQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            mood: None,
            favorites_only: false,
            start_date: None,
            end_date: None,
            tag: None,
        }
    }
}

impl EntryQuery {
    pub fn page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, 100);
        self
    }

    pub fn between(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    /// Query-string pairs; unset filters are left out entirely.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("page_size", self.page_size.to_string()),
        ];
        if let Some(mood) = self.mood {
            pairs.push(("mood", mood.as_str().to_string()));
        }
        if self.favorites_only {
            pairs.push(("favorites_only", "true".to_string()));
        }
        if let Some(start) = self.start_date {
            pairs.push(("start_date", start.to_rfc3339()));
        }
        if let Some(end) = self.end_date {
            pairs.push(("end_date", end.to_rfc3339()));
        }
        if let Some(tag) = self.tag.as_deref().map(str::trim).filter(|tag| !tag.is_empty()) {
            pairs.push(("tag", tag.to_string()));
        }
        pairs
    }
}

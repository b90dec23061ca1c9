use std::sync::Arc;

use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    api::{EntryQuery, EntrySource},
    error::Result,
    models::{Entry, Mood, SessionContext},
    utils::format::duration_label,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeedFilter {
    pub mood: Option<Mood>,
    pub favorites_only: bool,
}

/// One row of the feed as the view renders it.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    pub entry: Entry,
    pub duration_label: String,
    pub mood_emoji: Option<&'static str>,
}

impl From<&Entry> for FeedItem {
    fn from(entry: &Entry) -> Self {
        Self {
            entry: entry.clone(),
            duration_label: duration_label(entry.duration_seconds),
            mood_emoji: entry.mood.map(|mood| mood.emoji()),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeedView {
    pub items: Vec<FeedItem>,
    pub filter: FeedFilter,
    pub page: u32,
    pub total: u64,
    pub has_more: bool,
}

/// Paged, filterable list of the user's entries.
pub struct FeedPager {
    source: Arc<dyn EntrySource>,
    session: SessionContext,
    page_size: u32,
    filter: FeedFilter,
    entries: Vec<Entry>,
    page: u32,
    total: u64,
    has_more: bool,
}

impl FeedPager {
    pub fn new(source: Arc<dyn EntrySource>, session: SessionContext, page_size: u32) -> Self {
        Self {
            source,
            session,
            page_size: page_size.max(1),
            filter: FeedFilter::default(),
            entries: Vec::new(),
            page: 0,
            total: 0,
            has_more: true,
        }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn filter(&self) -> &FeedFilter {
        &self.filter
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn view(&self) -> FeedView {
        FeedView {
            items: self.entries.iter().map(FeedItem::from).collect(),
            filter: self.filter.clone(),
            page: self.page,
            total: self.total,
            has_more: self.has_more,
        }
    }

    /// Reload page 1 and replace whatever is listed. On error the current
    /// list is left alone.
    pub async fn refresh(&mut self) -> Result<()> {
        let page = self.source.list_entries(&self.session, &self.query(1)).await?;
        self.page = 1;
        self.total = page.total;
        self.has_more = page.has_more;
        self.entries = page.items;
        Ok(())
    }

    /// Append the next page. Returns how many entries were added; nothing is
    /// fetched once the server said there are no more.
    pub async fn load_more(&mut self) -> Result<usize> {
        if !self.has_more {
            return Ok(0);
        }
        if self.page == 0 {
            self.refresh().await?;
            return Ok(self.entries.len());
        }

        let next = self.page + 1;
        let page = self.source.list_entries(&self.session, &self.query(next)).await?;
        let added = page.items.len();
        self.page = next;
        self.total = page.total;
        self.has_more = page.has_more;
        self.entries.extend(page.items);
        Ok(added)
    }

    pub async fn set_filter(&mut self, filter: FeedFilter) -> Result<()> {
        if filter != self.filter {
            info!("Feed filter changed to {filter:?}");
        }
        self.filter = filter;
        self.entries.clear();
        self.page = 0;
        self.has_more = true;
        self.refresh().await
    }

    /// Flip the favorite flag and swap in the server's copy of the entry.
    pub async fn toggle_favorite(&mut self, id: i64) -> Result<Entry> {
        let updated = self.source.toggle_favorite(&self.session, id).await?;
        if let Some(slot) = self.entries.iter_mut().find(|entry| entry.id == id) {
            *slot = updated.clone();
        }
        Ok(updated)
    }

    pub async fn remove(&mut self, id: i64) -> Result<()> {
        self.source.delete_entry(&self.session, id).await?;
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        if self.entries.len() < before {
            self.total = self.total.saturating_sub(1);
        }
        Ok(())
    }

    fn query(&self, page: u32) -> EntryQuery {
        EntryQuery {
            mood: self.filter.mood,
            favorites_only: self.filter.favorites_only,
            ..EntryQuery::default()
        }
        .page(page)
        .page_size(self.page_size)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::{error::DiaryError, models::EntryPage};

    fn entry(id: i64, mood: Option<Mood>, favorite: bool) -> Entry {
        Entry {
            id,
            user_id: 1,
            title: Some(format!("entry {id}")),
            note: None,
            mood,
            mood_intensity: mood.map(|_| 5),
            manual_tags: Vec::new(),
            auto_tags: Vec::new(),
            is_private: true,
            is_favorite: favorite,
            is_processed: true,
            video_url: None,
            thumbnail_url: None,
            duration_seconds: Some(42.0),
            transcript: None,
            summary: None,
            recorded_at: Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap() + chrono::Duration::hours(id),
            created_at: None,
            updated_at: None,
        }
    }

    /// Serves a fixed list, filtering and paging like the backend.
    struct FakeSource {
        entries: Mutex<Vec<Entry>>,
        queries: Mutex<Vec<EntryQuery>>,
        fail_lists: Mutex<bool>,
    }

    impl FakeSource {
        fn with(entries: Vec<Entry>) -> Arc<Self> {
            Arc::new(Self {
                entries: Mutex::new(entries),
                queries: Mutex::new(Vec::new()),
                fail_lists: Mutex::new(false),
            })
        }
    }

    #[async_trait]
    impl EntrySource for FakeSource {
        async fn list_entries(&self, _: &SessionContext, query: &EntryQuery) -> Result<EntryPage> {
            self.queries.lock().unwrap().push(query.clone());
            if *self.fail_lists.lock().unwrap() {
                return Err(DiaryError::Api {
                    status: 500,
                    message: "boom".into(),
                });
            }
            let matching: Vec<Entry> = self
                .entries
                .lock()
                .unwrap()
                .iter()
                .filter(|entry| query.mood.map_or(true, |mood| entry.mood == Some(mood)))
                .filter(|entry| !query.favorites_only || entry.is_favorite)
                .cloned()
                .collect();
            let start = ((query.page - 1) * query.page_size) as usize;
            let items: Vec<Entry> = matching
                .iter()
                .skip(start)
                .take(query.page_size as usize)
                .cloned()
                .collect();
            Ok(EntryPage {
                has_more: start + items.len() < matching.len(),
                total: matching.len() as u64,
                page: query.page,
                page_size: query.page_size,
                items,
            })
        }

        async fn toggle_favorite(&self, _: &SessionContext, id: i64) -> Result<Entry> {
            let mut entries = self.entries.lock().unwrap();
            let entry = entries
                .iter_mut()
                .find(|entry| entry.id == id)
                .ok_or_else(|| DiaryError::Api {
                    status: 404,
                    message: "Entry not found".into(),
                })?;
            entry.is_favorite = !entry.is_favorite;
            Ok(entry.clone())
        }

        async fn delete_entry(&self, _: &SessionContext, id: i64) -> Result<()> {
            self.entries.lock().unwrap().retain(|entry| entry.id != id);
            Ok(())
        }
    }

    fn pager(source: Arc<FakeSource>) -> FeedPager {
        FeedPager::new(source, SessionContext::new("t", None), 10)
    }

    #[tokio::test]
    async fn pages_until_the_server_runs_out() {
        let source = FakeSource::with((1..=25).map(|id| entry(id, None, false)).collect());
        let mut feed = pager(source.clone());

        feed.refresh().await.unwrap();
        assert_eq!(feed.entries().len(), 10);
        assert!(feed.has_more());

        assert_eq!(feed.load_more().await.unwrap(), 10);
        assert_eq!(feed.load_more().await.unwrap(), 5);
        assert!(!feed.has_more());
        assert_eq!(feed.load_more().await.unwrap(), 0);

        assert_eq!(feed.entries().len(), 25);
        assert_eq!(source.queries.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn filter_change_starts_over_at_page_one() {
        let source = FakeSource::with(vec![
            entry(1, Some(Mood::Happy), true),
            entry(2, Some(Mood::Sad), false),
            entry(3, Some(Mood::Happy), false),
        ]);
        let mut feed = pager(source.clone());
        feed.refresh().await.unwrap();
        assert_eq!(feed.entries().len(), 3);

        feed.set_filter(FeedFilter {
            mood: Some(Mood::Happy),
            favorites_only: true,
        })
        .await
        .unwrap();

        let ids: Vec<i64> = feed.entries().iter().map(|entry| entry.id).collect();
        assert_eq!(ids, vec![1]);
        let last = source.queries.lock().unwrap().last().cloned().unwrap();
        assert_eq!(last.page, 1);
        assert_eq!(last.mood, Some(Mood::Happy));
        assert!(last.favorites_only);
    }

    #[tokio::test]
    async fn toggling_replaces_the_listed_entry() {
        let source = FakeSource::with(vec![entry(1, None, false), entry(2, None, false)]);
        let mut feed = pager(source);
        feed.refresh().await.unwrap();

        let updated = feed.toggle_favorite(2).await.unwrap();
        assert!(updated.is_favorite);
        assert!(feed.entries()[1].is_favorite);
        assert!(!feed.entries()[0].is_favorite);
    }

    #[tokio::test]
    async fn remove_drops_the_entry_locally() {
        let source = FakeSource::with(vec![entry(1, None, false), entry(2, None, false)]);
        let mut feed = pager(source);
        feed.refresh().await.unwrap();

        feed.remove(1).await.unwrap();
        assert_eq!(feed.entries().len(), 1);
        assert_eq!(feed.view().total, 1);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_the_current_list() {
        let source = FakeSource::with(vec![entry(1, None, false)]);
        let mut feed = pager(source.clone());
        feed.refresh().await.unwrap();

        *source.fail_lists.lock().unwrap() = true;
        assert!(feed.refresh().await.is_err());
        assert_eq!(feed.entries().len(), 1);
    }

    #[test]
    fn feed_items_carry_labels() {
        let item = FeedItem::from(&entry(1, Some(Mood::Happy), false));
        assert_eq!(item.duration_label, "0:42");
        assert_eq!(item.mood_emoji, Some(Mood::Happy.emoji()));
    }
}

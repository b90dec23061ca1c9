use chrono::Utc;

use crate::{
    feed::{FeedFilter, FeedView, MonthGrid, YearMonth},
    models::{DayOfWeekBreakdown, Entry, EntryStats, MoodHeatmap},
    AppState,
};

pub async fn load_feed(state: &AppState, filter: FeedFilter) -> Result<FeedView, String> {
    let mut feed = state.feed.lock().await;
    feed.set_filter(filter).await.map_err(|e| e.to_string())?;
    Ok(feed.view())
}

pub async fn refresh_feed(state: &AppState) -> Result<FeedView, String> {
    let mut feed = state.feed.lock().await;
    feed.refresh().await.map_err(|e| e.to_string())?;
    Ok(feed.view())
}

pub async fn load_more_entries(state: &AppState) -> Result<FeedView, String> {
    let mut feed = state.feed.lock().await;
    feed.load_more().await.map_err(|e| e.to_string())?;
    Ok(feed.view())
}

/// One entry for the detail view, straight from the server.
pub async fn get_entry(state: &AppState, entry_id: i64) -> Result<Entry, String> {
    state
        .api
        .get_entry(&state.session, entry_id)
        .await
        .map_err(|e| e.to_string())
}

pub async fn toggle_favorite(state: &AppState, entry_id: i64) -> Result<Entry, String> {
    let mut feed = state.feed.lock().await;
    feed.toggle_favorite(entry_id)
        .await
        .map_err(|e| e.to_string())
}

pub async fn delete_entry(state: &AppState, entry_id: i64) -> Result<(), String> {
    let mut feed = state.feed.lock().await;
    feed.remove(entry_id).await.map_err(|e| e.to_string())
}

pub async fn month_calendar(state: &AppState, year: i32, month: u32) -> Result<MonthGrid, String> {
    let month = YearMonth::new(year, month).ok_or_else(|| format!("invalid month {year}-{month}"))?;
    let page = state
        .api
        .list_entries(&state.session, &month.query())
        .await
        .map_err(|e| e.to_string())?;
    Ok(MonthGrid::build(month, &page.items, Utc::now().date_naive()))
}

pub async fn get_stats(state: &AppState) -> Result<EntryStats, String> {
    state
        .api
        .stats(&state.session)
        .await
        .map_err(|e| e.to_string())
}

pub async fn get_mood_heatmap(state: &AppState, year: Option<i32>) -> Result<MoodHeatmap, String> {
    state
        .api
        .mood_heatmap(&state.session, year)
        .await
        .map_err(|e| e.to_string())
}

pub async fn get_day_of_week(state: &AppState) -> Result<DayOfWeekBreakdown, String> {
    state
        .api
        .day_of_week(&state.session)
        .await
        .map_err(|e| e.to_string())
}

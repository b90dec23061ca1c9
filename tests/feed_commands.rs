mod common;

use mooddiary_lib::{
    api,
    feed::{commands, FeedFilter},
    models::{Mood, ProfileUpdate, SessionContext},
    settings::ClientSettings,
    AppState,
};

use common::{TestServer, ISSUED_TOKEN};

fn app_state(server: &TestServer) -> AppState {
    let mut settings = ClientSettings::default();
    settings.api_base_url = server.base_url.clone();
    AppState::new(settings, SessionContext::new("feed-token", None)).unwrap()
}

#[tokio::test]
async fn feed_pages_and_mutates_through_the_backend() {
    let server = TestServer::spawn().await;
    let state = app_state(&server);

    let view = commands::load_feed(
        &state,
        FeedFilter {
            mood: Some(Mood::Happy),
            favorites_only: false,
        },
    )
    .await
    .unwrap();
    assert_eq!(view.items.len(), 2);
    assert!(view.has_more);
    assert_eq!(view.items[0].duration_label, "1:05");

    let view = commands::load_more_entries(&state).await.unwrap();
    assert_eq!(view.items.len(), 4);
    assert!(!view.has_more);

    let toggled = commands::toggle_favorite(&state, 1).await.unwrap();
    assert!(toggled.is_favorite);
    let view = commands::refresh_feed(&state).await.unwrap();
    assert_eq!(view.items.len(), 2);

    commands::delete_entry(&state, 2).await.unwrap();
    assert_eq!(server.recorded.lock().unwrap().deleted, vec![2]);

    let err = commands::toggle_favorite(&state, 404).await.unwrap_err();
    assert!(err.contains("Entry not found"));

    let recorded = server.recorded.lock().unwrap();
    assert!(recorded.list_queries.iter().all(|q| q["mood"] == "happy"));
    assert!(recorded.list_queries.iter().all(|q| q["page_size"] == "10"));
}

#[tokio::test]
async fn month_calendar_queries_the_month_range() {
    let server = TestServer::spawn().await;
    let state = app_state(&server);

    let grid = commands::month_calendar(&state, 2024, 5).await.unwrap();
    // 1 May 2024 is a Wednesday.
    assert!(grid.cells[..3].iter().all(Option::is_none));
    assert_eq!(grid.cells.iter().flatten().count(), 31);
    // Entries 1 and 2 come back dated 2 and 3 May.
    assert_eq!(grid.cells.iter().flatten().map(|c| c.entries.len()).sum::<usize>(), 2);

    assert!(commands::month_calendar(&state, 2024, 13).await.is_err());

    let recorded = server.recorded.lock().unwrap();
    assert_eq!(recorded.list_queries.len(), 1);
    let params = &recorded.list_queries[0];
    assert_eq!(params["page_size"], "100");
    assert_eq!(params["start_date"], "2024-05-01T00:00:00+00:00");
    assert_eq!(params["end_date"], "2024-05-31T23:59:59+00:00");
}

#[tokio::test]
async fn stats_commands_return_decoded_payloads() {
    let server = TestServer::spawn().await;
    let state = app_state(&server);

    let stats = commands::get_stats(&state).await.unwrap();
    assert_eq!(stats.entries_this_month, 9);

    let heatmap = commands::get_mood_heatmap(&state, None).await.unwrap();
    assert_eq!(heatmap.len(), 1);

    let by_day = commands::get_day_of_week(&state).await.unwrap();
    assert!(by_day.contains_key("Friday"));
}

#[tokio::test]
async fn entry_detail_comes_from_the_server() {
    let server = TestServer::spawn().await;
    let state = app_state(&server);

    let entry = commands::get_entry(&state, 12).await.unwrap();
    assert_eq!(entry.title.as_deref(), Some("entry 12"));
    assert!(commands::get_entry(&state, 404)
        .await
        .unwrap_err()
        .contains("Entry not found"));
}

#[tokio::test]
async fn empty_profile_edit_only_reads_the_profile() {
    let server = TestServer::spawn().await;
    let mut settings = ClientSettings::default();
    settings.api_base_url = server.base_url.clone();
    let state = AppState::new(settings, SessionContext::new(ISSUED_TOKEN, None)).unwrap();

    let profile = api::commands::update_profile(&state, ProfileUpdate::default())
        .await
        .unwrap();
    assert_eq!(profile.full_name.as_deref(), Some("Ada L."));
    assert!(server.recorded.lock().unwrap().profile_updates.is_empty());

    let profile = api::commands::update_profile(
        &state,
        ProfileUpdate {
            full_name: Some("Ada Lovelace".into()),
            ..ProfileUpdate::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(profile.full_name.as_deref(), Some("Ada Lovelace"));
    assert_eq!(server.recorded.lock().unwrap().profile_updates.len(), 1);
}

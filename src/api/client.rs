use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    error::{DiaryError, Result},
    models::{DayOfWeekBreakdown, Entry, EntryPage, EntryStats, MoodHeatmap, SessionContext},
    settings::ClientSettings,
    upload::{EntryUploader, ProgressFn, UploadReceipt, UploadRequest, UPLOAD_PATH},
};

use super::{EntryQuery, EntrySource};

const USER_AGENT: &str = concat!("mooddiary/", env!("CARGO_PKG_VERSION"));

/// Client for the diary backend. Credentials are passed per call.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    upload_timeout: Option<Duration>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            upload_timeout: None,
        })
    }

    pub fn from_settings(settings: &ClientSettings) -> Result<Self> {
        let mut client = Self::new(settings.api_base_url.clone())?;
        client.upload_timeout = settings.upload.timeout_secs.map(Duration::from_secs);
        Ok(client)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(super) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(super) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(super) fn request(
        &self,
        session: &SessionContext,
        method: Method,
        path: &str,
    ) -> RequestBuilder {
        self.http
            .request(method, self.url(path))
            .bearer_auth(session.token())
    }

    pub async fn list_entries(
        &self,
        session: &SessionContext,
        query: &EntryQuery,
    ) -> Result<EntryPage> {
        let request = self
            .request(session, Method::GET, "/api/entries")
            .query(&query.to_pairs());
        decode(send(request).await?).await
    }

    pub async fn get_entry(&self, session: &SessionContext, id: i64) -> Result<Entry> {
        let request = self.request(session, Method::GET, &format!("/api/entries/{id}"));
        decode(send(request).await?).await
    }

    /// Flip the favorite flag; the server answers with the updated entry.
    pub async fn toggle_favorite(&self, session: &SessionContext, id: i64) -> Result<Entry> {
        let request = self.request(session, Method::POST, &format!("/api/entries/{id}/favorite"));
        decode(send(request).await?).await
    }

    pub async fn delete_entry(&self, session: &SessionContext, id: i64) -> Result<()> {
        let request = self.request(session, Method::DELETE, &format!("/api/entries/{id}"));
        send(request).await?;
        Ok(())
    }

    pub async fn stats(&self, session: &SessionContext) -> Result<EntryStats> {
        let request = self.request(session, Method::GET, "/api/analytics/stats");
        decode(send(request).await?).await
    }

    /// Dominant mood per day; the server defaults to the current year.
    pub async fn mood_heatmap(
        &self,
        session: &SessionContext,
        year: Option<i32>,
    ) -> Result<MoodHeatmap> {
        let mut request = self.request(session, Method::GET, "/api/analytics/mood-heatmap");
        if let Some(year) = year {
            request = request.query(&[("year", year)]);
        }
        decode(send(request).await?).await
    }

    pub async fn day_of_week(&self, session: &SessionContext) -> Result<DayOfWeekBreakdown> {
        let request = self.request(session, Method::GET, "/api/analytics/day-of-week");
        decode(send(request).await?).await
    }
}

pub(super) async fn send(request: RequestBuilder) -> Result<Response> {
    let response = request.send().await?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().clone();
    let body = response.text().await.unwrap_or_default();
    let message = detail_message(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    });
    debug!("{url} -> {status}: {body}");
    Err(DiaryError::Api {
        status: status.as_u16(),
        message,
    })
}

pub(super) async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Pull a readable message out of a `{"detail": ...}` error body.
fn detail_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        Value::String(text) => Some(text.clone()),
        Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        _ => None,
    }
}

#[async_trait]
impl EntryUploader for ApiClient {
    async fn upload(
        &self,
        session: &SessionContext,
        request: UploadRequest,
        progress: Option<ProgressFn>,
    ) -> Result<UploadReceipt> {
        let form = request.into_form(progress)?;
        let mut builder = self
            .request(session, Method::POST, UPLOAD_PATH)
            .multipart(form);
        if let Some(timeout) = self.upload_timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Upload rejected with {status}: {body}");
            return Err(DiaryError::UploadFailed { status });
        }

        // The created entry is informative only; an odd body is not a failure.
        let body = response.bytes().await.unwrap_or_default();
        let entry = serde_json::from_slice::<Entry>(&body).ok();
        Ok(UploadReceipt { status, entry })
    }
}

#[async_trait]
impl EntrySource for ApiClient {
    async fn list_entries(&self, session: &SessionContext, query: &EntryQuery) -> Result<EntryPage> {
        ApiClient::list_entries(self, session, query).await
    }

    async fn toggle_favorite(&self, session: &SessionContext, id: i64) -> Result<Entry> {
        ApiClient::toggle_favorite(self, session, id).await
    }

    async fn delete_entry(&self, session: &SessionContext, id: i64) -> Result<()> {
        ApiClient::delete_entry(self, session, id).await
    }
}

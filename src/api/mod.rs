mod auth;
pub mod client;
pub mod commands;
pub mod query;

use async_trait::async_trait;

pub use client::ApiClient;
pub use query::{EntryQuery, DEFAULT_PAGE_SIZE};

use crate::{
    error::Result,
    models::{Entry, EntryPage, SessionContext},
};

/// Entry listing and mutation as the feed needs them.
#[async_trait]
pub trait EntrySource: Send + Sync {
    async fn list_entries(&self, session: &SessionContext, query: &EntryQuery) -> Result<EntryPage>;

    async fn toggle_favorite(&self, session: &SessionContext, id: i64) -> Result<Entry>;

    async fn delete_entry(&self, session: &SessionContext, id: i64) -> Result<()>;
}

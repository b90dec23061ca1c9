//! Multipart submission of a finished recording plus its metadata.

pub mod progress;
pub mod request;

use std::sync::Arc;

use async_trait::async_trait;

use crate::{error::Result, models::{Entry, SessionContext}};

pub use progress::{next_simulated, transfer_percent};
pub use request::UploadRequest;

pub const UPLOAD_PATH: &str = "/api/entries/upload";

/// Called with `(bytes_sent, bytes_total)` of the video part as it streams out.
pub type ProgressFn = Arc<dyn Fn(u64, u64) + Send + Sync>;

#[derive(Debug, Clone, PartialEq)]
pub struct UploadReceipt {
    pub status: u16,
    /// Parsed when the server echoes the created entry; not required.
    pub entry: Option<Entry>,
}

#[async_trait]
pub trait EntryUploader: Send + Sync {
    async fn upload(
        &self,
        session: &SessionContext,
        request: UploadRequest,
        progress: Option<ProgressFn>,
    ) -> Result<UploadReceipt>;
}

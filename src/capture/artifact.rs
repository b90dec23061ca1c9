use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use serde::Serialize;
use uuid::Uuid;

pub const ARTIFACT_MIME: &str = "video/webm";
pub const ARTIFACT_FILE_NAME: &str = "video.webm";

/// The finished recording. Immutable once built; clones share the bytes.
#[derive(Clone, PartialEq)]
pub struct Artifact {
    id: Uuid,
    data: Arc<[u8]>,
    duration: Duration,
}

impl Artifact {
    pub fn from_chunks(chunks: Vec<Vec<u8>>, duration: Duration) -> Self {
        let data: Vec<u8> = chunks.into_iter().flatten().collect();
        Self {
            id: Uuid::new_v4(),
            data: data.into(),
            duration,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn shared_bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.data)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn mime_type(&self) -> &'static str {
        ARTIFACT_MIME
    }

    pub fn file_name(&self) -> &'static str {
        ARTIFACT_FILE_NAME
    }

    pub fn info(&self, playback_url: Option<String>) -> ArtifactInfo {
        ArtifactInfo {
            id: self.id,
            size_bytes: self.data.len() as u64,
            mime_type: ARTIFACT_MIME.to_string(),
            duration_ms: self.duration.as_millis() as u64,
            playback_url,
        }
    }
}

impl std::fmt::Debug for Artifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Artifact")
            .field("id", &self.id)
            .field("len", &self.data.len())
            .field("duration", &self.duration)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactInfo {
    pub id: Uuid,
    pub size_bytes: u64,
    pub mime_type: String,
    pub duration_ms: u64,
    pub playback_url: Option<String>,
}

/// Temporary `blob:` references handed to a player. A revoked URL no
/// longer resolves.
#[derive(Clone, Default)]
pub struct ObjectUrls {
    inner: Arc<Mutex<HashMap<String, Artifact>>>,
}

impl ObjectUrls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, artifact: &Artifact) -> String {
        let url = format!("blob:mooddiary/{}", Uuid::new_v4());
        self.lock().insert(url.clone(), artifact.clone());
        url
    }

    pub fn resolve(&self, url: &str) -> Option<Artifact> {
        self.lock().get(url).cloned()
    }

    pub fn revoke(&self, url: &str) -> bool {
        self.lock().remove(url).is_some()
    }

    pub fn live_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Artifact>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunks_are_concatenated_in_order() {
        let artifact = Artifact::from_chunks(
            vec![vec![1, 2], vec![3], vec![4, 5, 6]],
            Duration::from_secs(3),
        );
        assert_eq!(artifact.bytes(), &[1, 2, 3, 4, 5, 6]);
        assert_eq!(artifact.mime_type(), "video/webm");
        assert_eq!(artifact.file_name(), "video.webm");
        assert_eq!(artifact.info(None).size_bytes, 6);
    }

    #[test]
    fn revoked_urls_stop_resolving() {
        let urls = ObjectUrls::new();
        let artifact = Artifact::from_chunks(vec![vec![9; 8]], Duration::from_secs(1));

        let url = urls.create(&artifact);
        assert!(url.starts_with("blob:"));
        assert_eq!(urls.resolve(&url).unwrap().id(), artifact.id());

        assert!(urls.revoke(&url));
        assert!(urls.resolve(&url).is_none());
        assert!(!urls.revoke(&url));
        assert_eq!(urls.live_count(), 0);
    }
}

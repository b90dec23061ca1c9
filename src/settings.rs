use std::{
    fs,
    path::PathBuf,
    str::FromStr,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
    time::Duration,
};

use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::capture::{FacingMode, StreamConstraints};

pub const API_URL_ENV: &str = "MOODDIARY_API_URL";
pub const DEBUG_ENV: &str = "MOODDIARY_DEBUG";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CaptureSettings {
    pub facing: FacingMode,
    pub width: u32,
    pub height: u32,
    pub audio: bool,
    pub mime_type: String,
    pub timeslice_ms: u64,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            facing: FacingMode::User,
            width: 1280,
            height: 720,
            audio: true,
            mime_type: "video/webm;codecs=vp9,opus".into(),
            timeslice_ms: 1000,
        }
    }
}

impl CaptureSettings {
    pub fn constraints(&self) -> StreamConstraints {
        StreamConstraints {
            facing: self.facing,
            width: self.width,
            height: self.height,
            audio: self.audio,
            mime_type: self.mime_type.clone(),
        }
    }

    pub fn timeslice(&self) -> Duration {
        Duration::from_millis(self.timeslice_ms.max(1))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProgressMode {
    /// Byte counts reported while the body is streamed.
    Transfer,
    /// Cosmetic timer; does not reflect bytes sent.
    Simulated,
}

impl FromStr for ProgressMode {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "transfer" => Ok(ProgressMode::Transfer),
            "simulated" => Ok(ProgressMode::Simulated),
            other => Err(format!("unknown progress mode `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UploadSettings {
    pub progress: ProgressMode,
    pub simulated_tick_ms: u64,
    pub simulated_step: u8,
    pub simulated_cap: u8,
    pub navigate_delay_ms: u64,
    pub success_route: String,
    /// Unset means no timeout; a stalled request keeps the form uploading.
    pub timeout_secs: Option<u64>,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            progress: ProgressMode::Transfer,
            simulated_tick_ms: 500,
            simulated_step: 10,
            simulated_cap: 90,
            navigate_delay_ms: 500,
            success_route: "/feed".into(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClientSettings {
    pub api_base_url: String,
    pub feed_page_size: u32,
    pub capture: CaptureSettings,
    pub upload: UploadSettings,
    #[serde(skip)]
    pub debug_events: bool,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".into(),
            feed_page_size: 10,
            capture: CaptureSettings::default(),
            upload: UploadSettings::default(),
            debug_events: false,
        }
    }
}

impl ClientSettings {
    /// Apply `MOODDIARY_API_URL` and `MOODDIARY_DEBUG` on top of the stored values.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                self.api_base_url = url.trim().to_string();
            }
        }
        self.debug_events = std::env::var(DEBUG_ENV)
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        self
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<ClientSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!("Ignoring malformed settings in {}: {err}", path.display());
                ClientSettings::default()
            })
        } else {
            ClientSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn current(&self) -> ClientSettings {
        self.read().clone().with_env_overrides()
    }

    /// Edit the stored values (without env overrides) and write them back.
    pub fn update<F>(&self, apply: F) -> Result<ClientSettings>
    where
        F: FnOnce(&mut ClientSettings),
    {
        let mut guard = self.write();
        apply(&mut guard);
        self.persist(&guard)?;
        Ok(guard.clone())
    }

    fn persist(&self, data: &ClientSettings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }

    fn read(&self) -> RwLockReadGuard<'_, ClientSettings> {
        self.data.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, ClientSettings> {
        self.data.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

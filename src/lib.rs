pub mod api;
pub mod capture;
pub mod error;
pub mod events;
pub mod feed;
pub mod models;
pub mod settings;
pub mod upload;
pub mod utils;
pub mod wizard;

use std::sync::Arc;

use log::info;
use tokio::sync::Mutex;

use api::ApiClient;
use feed::FeedPager;
use models::SessionContext;
use settings::ClientSettings;
use wizard::WizardController;

pub use error::{DiaryError, Result};
pub use utils::init_logging;

/// Everything the view-facing commands share for one signed-in user.
pub struct AppState {
    pub(crate) api: ApiClient,
    pub(crate) settings: ClientSettings,
    pub(crate) session: SessionContext,
    pub(crate) wizard: Mutex<Option<WizardController>>,
    pub(crate) feed: Mutex<FeedPager>,
}

impl AppState {
    pub fn new(settings: ClientSettings, session: SessionContext) -> Result<Self> {
        let api = ApiClient::from_settings(&settings)?;
        let feed = FeedPager::new(
            Arc::new(api.clone()),
            session.clone(),
            settings.feed_page_size,
        );
        info!("Using diary backend at {}", api.base_url());

        Ok(Self {
            api,
            settings,
            session,
            wizard: Mutex::new(None),
            feed: Mutex::new(feed),
        })
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Close any open wizard, releasing its camera.
    pub async fn shutdown(&self) {
        if let Some(controller) = self.wizard.lock().await.take() {
            controller.dispose().await;
        }
    }
}

//! Account entry points for the settings view.

use crate::{
    models::{ProfileUpdate, UserProfile},
    AppState,
};

pub async fn get_profile(state: &AppState) -> Result<UserProfile, String> {
    state
        .api
        .current_user(&state.session)
        .await
        .map_err(|e| e.to_string())
}

pub async fn update_profile(state: &AppState, update: ProfileUpdate) -> Result<UserProfile, String> {
    if update.is_empty() {
        return get_profile(state).await;
    }
    state
        .api
        .update_profile(&state.session, &update)
        .await
        .map_err(|e| e.to_string())
}

//! View-facing entry points for the recording wizard. Errors come back as
//! the alert text to show.

use std::sync::Arc;

use crate::{
    capture::MediaDevice,
    events::EventSink,
    models::Mood,
    wizard::{DraftPatch, SubmitOutcome, WizardController, WizardSnapshot},
    AppState,
};

const NO_WIZARD: &str = "no recording in progress";

/// The live controller, if any. A controller that closed itself after a
/// successful submit is dropped from the slot here.
async fn controller_from_state(state: &AppState) -> Result<WizardController, String> {
    let mut slot = state.wizard.lock().await;
    match slot.as_ref() {
        Some(controller) if !controller.is_disposed().await => Ok(controller.clone()),
        _ => {
            *slot = None;
            Err(NO_WIZARD.to_string())
        }
    }
}

/// Mount a fresh wizard, disposing any previous one first.
pub async fn open_wizard(
    state: &AppState,
    device: Arc<dyn MediaDevice>,
    events: Arc<dyn EventSink>,
) -> Result<WizardSnapshot, String> {
    if let Some(previous) = state.wizard.lock().await.take() {
        previous.dispose().await;
    }

    let controller = WizardController::mount(
        device,
        Arc::new(state.api.clone()),
        events,
        state.session.clone(),
        &state.settings,
    )
    .await;
    let snapshot = controller.snapshot().await.map_err(|e| e.alert_message())?;
    *state.wizard.lock().await = Some(controller);
    Ok(snapshot)
}

pub async fn get_wizard_state(state: &AppState) -> Result<WizardSnapshot, String> {
    let controller = controller_from_state(state).await?;
    controller.snapshot().await.map_err(|e| e.alert_message())
}

pub async fn retry_camera(state: &AppState) -> Result<(), String> {
    let controller = controller_from_state(state).await?;
    controller.start_camera().await.map_err(|e| e.alert_message())
}

pub async fn start_recording(state: &AppState) -> Result<WizardSnapshot, String> {
    let controller = controller_from_state(state).await?;
    controller
        .start_recording()
        .await
        .map_err(|e| e.alert_message())
}

pub async fn stop_recording(state: &AppState) -> Result<WizardSnapshot, String> {
    let controller = controller_from_state(state).await?;
    controller
        .stop_recording()
        .await
        .map_err(|e| e.alert_message())
}

pub async fn retake(state: &AppState) -> Result<(), String> {
    let controller = controller_from_state(state).await?;
    controller.retake().await.map_err(|e| e.alert_message())
}

pub async fn proceed_to_details(state: &AppState) -> Result<WizardSnapshot, String> {
    let controller = controller_from_state(state).await?;
    controller.proceed().await.map_err(|e| e.alert_message())
}

pub async fn back_to_review(state: &AppState) -> Result<WizardSnapshot, String> {
    let controller = controller_from_state(state).await?;
    controller.back().await.map_err(|e| e.alert_message())
}

pub async fn set_mood(state: &AppState, mood: Option<Mood>) -> Result<WizardSnapshot, String> {
    let controller = controller_from_state(state).await?;
    controller.set_mood(mood).await.map_err(|e| e.alert_message())
}

pub async fn set_mood_intensity(state: &AppState, value: i64) -> Result<WizardSnapshot, String> {
    let controller = controller_from_state(state).await?;
    controller
        .set_mood_intensity(value)
        .await
        .map_err(|e| e.alert_message())
}

pub async fn update_draft(state: &AppState, patch: DraftPatch) -> Result<WizardSnapshot, String> {
    let controller = controller_from_state(state).await?;
    controller
        .update_draft(patch)
        .await
        .map_err(|e| e.alert_message())
}

pub async fn submit_entry(state: &AppState) -> Result<SubmitOutcome, String> {
    let controller = controller_from_state(state).await?;
    controller.submit().await.map_err(|e| e.alert_message())
}

/// Abandon the wizard. Nothing is kept.
pub async fn close_wizard(state: &AppState) -> Result<(), String> {
    if let Some(controller) = state.wizard.lock().await.take() {
        controller.dispose().await;
    }
    Ok(())
}

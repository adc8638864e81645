//! REST endpoints for the onboarding wizard.
//!
//! Each handler translates one UI event into one controller call and
//! returns the resulting wizard status. No wizard logic lives here.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;

use super::manager::WizardController;
use super::model::AttachedFile;
use crate::error::{Error, WizardError};

/// Shared state for onboarding routes.
///
/// The mutex serializes UI events: one action is applied at a time.
#[derive(Clone)]
pub struct OnboardingRouteState {
    pub controller: Arc<Mutex<WizardController>>,
}

impl OnboardingRouteState {
    pub fn new(controller: WizardController) -> Self {
        Self {
            controller: Arc::new(Mutex::new(controller)),
        }
    }
}

fn wizard_error_status(err: &WizardError) -> StatusCode {
    match err {
        WizardError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        WizardError::UnknownStep { .. } | WizardError::UnknownDocument { .. } => {
            StatusCode::NOT_FOUND
        }
        WizardError::NotInUploadSection { .. } | WizardError::InvalidDate { .. } => {
            StatusCode::BAD_REQUEST
        }
    }
}

fn error_response(err: Error) -> Response {
    let status = match &err {
        Error::Wizard(e) => wizard_error_status(e),
        Error::Config(_) | Error::Database(_) | Error::Submission(_) => {
            tracing::warn!("Onboarding request failed: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(serde_json::json!({"error": err.to_string()}))).into_response()
}

/// Status after an action, built under the same lock as the action.
fn status_response<E: Into<Error>>(
    controller: &WizardController,
    result: std::result::Result<(), E>,
) -> Response {
    match result {
        Ok(()) => Json(controller.status()).into_response(),
        Err(e) => error_response(e.into()),
    }
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "tenant-onboarding"
    }))
}

/// GET /api/onboarding/state
async fn get_state(State(state): State<OnboardingRouteState>) -> Response {
    let controller = state.controller.lock().await;
    Json(controller.status()).into_response()
}

#[derive(Deserialize)]
struct ToggleRequest {
    checked: bool,
}

/// POST /api/onboarding/documents/{value}
async fn toggle_document(
    State(state): State<OnboardingRouteState>,
    Path(value): Path<String>,
    Json(body): Json<ToggleRequest>,
) -> Response {
    let mut controller = state.controller.lock().await;
    let result = controller.toggle_document(&value, body.checked).await;
    status_response(&controller, result)
}

#[derive(Deserialize)]
struct NotesRequest {
    notes: String,
}

/// PUT /api/onboarding/notes
async fn set_notes(
    State(state): State<OnboardingRouteState>,
    Json(body): Json<NotesRequest>,
) -> Response {
    let mut controller = state.controller.lock().await;
    controller.set_notes(&body.notes).await;
    Json(controller.status()).into_response()
}

#[derive(Deserialize)]
struct StepRequest {
    target: u32,
}

/// POST /api/onboarding/advance
async fn advance(
    State(state): State<OnboardingRouteState>,
    Json(body): Json<StepRequest>,
) -> Response {
    let mut controller = state.controller.lock().await;
    match controller.advance(body.target).await {
        Ok(transition) => Json(serde_json::json!({
            "transition": transition,
            "status": controller.status(),
        }))
        .into_response(),
        Err(e) => error_response(e.into()),
    }
}

/// POST /api/onboarding/retreat
async fn retreat(
    State(state): State<OnboardingRouteState>,
    Json(body): Json<StepRequest>,
) -> Response {
    let mut controller = state.controller.lock().await;
    match controller.retreat(body.target).await {
        Ok(transition) => Json(serde_json::json!({
            "transition": transition,
            "status": controller.status(),
        }))
        .into_response(),
        Err(e) => error_response(e.into()),
    }
}

#[derive(Deserialize)]
struct AttachRequest {
    files: Vec<AttachedFile>,
}

/// POST /api/onboarding/uploads/{value}/files
async fn attach_files(
    State(state): State<OnboardingRouteState>,
    Path(value): Path<String>,
    Json(body): Json<AttachRequest>,
) -> Response {
    let mut controller = state.controller.lock().await;
    let result = controller.attach_files(&value, body.files).await;
    status_response(&controller, result)
}

#[derive(Deserialize)]
struct DateRequest {
    date: Option<String>,
}

/// PUT /api/onboarding/uploads/{value}/date
async fn set_received_date(
    State(state): State<OnboardingRouteState>,
    Path(value): Path<String>,
    Json(body): Json<DateRequest>,
) -> Response {
    let mut controller = state.controller.lock().await;
    let result = controller
        .set_received_date(&value, body.date.as_deref())
        .await;
    status_response(&controller, result)
}

/// POST /api/onboarding/uploads/{value}/skip
async fn skip_document(
    State(state): State<OnboardingRouteState>,
    Path(value): Path<String>,
) -> Response {
    let mut controller = state.controller.lock().await;
    let result = controller.skip_document(&value).await;
    status_response(&controller, result)
}

/// GET /api/onboarding/submission
///
/// Preview of the multipart payload the intake endpoint would receive.
async fn get_submission(State(state): State<OnboardingRouteState>) -> Response {
    let controller = state.controller.lock().await;
    match controller.build_submission() {
        Ok(payload) => Json(payload).into_response(),
        Err(e) => error_response(e),
    }
}

/// DELETE /api/onboarding/progress
async fn clear_progress(State(state): State<OnboardingRouteState>) -> Response {
    let mut controller = state.controller.lock().await;
    let result = controller.clear_progress().await;
    status_response(&controller, result)
}

/// POST /api/onboarding/complete
async fn complete(State(state): State<OnboardingRouteState>) -> Response {
    let result = state.controller.lock().await.complete_onboarding().await;
    match result {
        Ok(handoff) => Json(handoff).into_response(),
        Err(e) => error_response(e),
    }
}

/// Build the onboarding REST routes.
pub fn onboarding_routes(state: OnboardingRouteState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/onboarding/state", get(get_state))
        .route("/api/onboarding/documents/{value}", post(toggle_document))
        .route("/api/onboarding/notes", put(set_notes))
        .route("/api/onboarding/advance", post(advance))
        .route("/api/onboarding/retreat", post(retreat))
        .route("/api/onboarding/uploads/{value}/files", post(attach_files))
        .route("/api/onboarding/uploads/{value}/date", put(set_received_date))
        .route("/api/onboarding/uploads/{value}/skip", post(skip_document))
        .route("/api/onboarding/submission", get(get_submission))
        .route("/api/onboarding/progress", delete(clear_progress))
        .route("/api/onboarding/complete", post(complete))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

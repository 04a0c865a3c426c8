//! Routes for assessment lifecycle commands and queries.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use casework_assessment::application::command_handlers::{self, AssessmentCommandResult};
use casework_assessment::application::query_handlers::{
    self, AssessmentView, StatusChangeView,
};
use casework_assessment::domain::commands;
use casework_assessment::domain::status::AssessmentStatus;

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;

/// Request body for POST /.
#[derive(Debug, Deserialize)]
pub struct CreateAssessmentRequest {
    /// The submitted application to assess.
    pub application_id: Uuid,
}

/// Request body for POST /{id}/acceptance.
#[derive(Debug, Deserialize)]
pub struct AcceptanceRequest {
    /// Assessment document recorded with the decision.
    pub document: serde_json::Value,
    /// Optional assessor notes.
    #[serde(default)]
    pub notes: Option<String>,
}

/// Request body for POST /{id}/rejection.
#[derive(Debug, Deserialize)]
pub struct RejectionRequest {
    /// Assessment document recorded with the decision.
    pub document: serde_json::Value,
    /// Why the application was rejected. Must not be blank.
    #[serde(default)]
    pub rejection_rationale: String,
}

/// Response body returned after a command is successfully handled.
#[derive(Debug, Serialize)]
pub struct CommandResponse {
    /// The assessment the command applied to.
    pub aggregate_id: Uuid,
    /// The assessment's status after the command.
    pub status: AssessmentStatus,
    /// IDs of the domain events produced and persisted.
    pub event_ids: Vec<Uuid>,
}

impl From<AssessmentCommandResult> for CommandResponse {
    fn from(result: AssessmentCommandResult) -> Self {
        Self {
            aggregate_id: result.aggregate_id,
            status: result.status,
            event_ids: result.stored_events.iter().map(|e| e.event_id).collect(),
        }
    }
}

/// POST /
#[instrument(skip(state, request), fields(application_id = %request.application_id))]
async fn create_assessment(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateAssessmentRequest>,
) -> Result<(StatusCode, Json<CommandResponse>), ApiError> {
    let command = commands::CreateAssessment {
        correlation_id: Uuid::new_v4(),
        application_id: request.application_id,
    };

    info!(correlation_id = %command.correlation_id, "handling create_assessment command");

    let result = command_handlers::handle_create_assessment(
        &command,
        state.clock.as_ref(),
        &*state.event_repository,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(result.into())))
}

/// GET /{id}
#[instrument(skip(state))]
async fn get_assessment(
    State(state): State<AppState>,
    Path(assessment_id): Path<Uuid>,
) -> Result<Json<AssessmentView>, ApiError> {
    let view =
        query_handlers::get_assessment_by_id(assessment_id, &*state.event_repository).await?;
    Ok(Json(view))
}

/// GET /{id}/history
#[instrument(skip(state))]
async fn get_history(
    State(state): State<AppState>,
    Path(assessment_id): Path<Uuid>,
) -> Result<Json<Vec<StatusChangeView>>, ApiError> {
    let history =
        query_handlers::get_assessment_history(assessment_id, &*state.event_repository).await?;
    Ok(Json(history))
}

/// POST /{id}/acceptance
#[instrument(skip(state, request))]
async fn accept_assessment(
    State(state): State<AppState>,
    Path(assessment_id): Path<Uuid>,
    ApiJson(request): ApiJson<AcceptanceRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::AcceptAssessment {
        correlation_id: Uuid::new_v4(),
        assessment_id,
        document: request.document,
        notes: request.notes,
    };

    info!(correlation_id = %command.correlation_id, "handling accept_assessment command");

    let result = command_handlers::handle_accept_assessment(
        &command,
        state.clock.as_ref(),
        &*state.event_repository,
    )
    .await?;

    Ok(Json(result.into()))
}

/// POST /{id}/rejection
#[instrument(skip(state, request))]
async fn reject_assessment(
    State(state): State<AppState>,
    Path(assessment_id): Path<Uuid>,
    ApiJson(request): ApiJson<RejectionRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::RejectAssessment {
        correlation_id: Uuid::new_v4(),
        assessment_id,
        document: request.document,
        rejection_rationale: request.rejection_rationale,
    };

    info!(correlation_id = %command.correlation_id, "handling reject_assessment command");

    let result = command_handlers::handle_reject_assessment(
        &command,
        state.clock.as_ref(),
        &*state.event_repository,
    )
    .await?;

    Ok(Json(result.into()))
}

/// POST /{id}/closure
#[instrument(skip(state))]
async fn close_assessment(
    State(state): State<AppState>,
    Path(assessment_id): Path<Uuid>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::CloseAssessment {
        correlation_id: Uuid::new_v4(),
        assessment_id,
    };

    info!(correlation_id = %command.correlation_id, "handling close_assessment command");

    let result = command_handlers::handle_close_assessment(
        &command,
        state.clock.as_ref(),
        &*state.event_repository,
    )
    .await?;

    Ok(Json(result.into()))
}

/// Returns the router for assessments.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_assessment))
        .route("/{id}", get(get_assessment))
        .route("/{id}/history", get(get_history))
        .route("/{id}/acceptance", post(accept_assessment))
        .route("/{id}/rejection", post(reject_assessment))
        .route("/{id}/closure", post(close_assessment))
}

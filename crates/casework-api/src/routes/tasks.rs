//! Routes for assessment tasks: allocating work to assessors.

use axum::extract::{Path, State};
use axum::routing::post;
use axum::{Json, Router};
use casework_core::error::DomainError;
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use casework_assessment::application::command_handlers;
use casework_assessment::domain::commands;

use crate::error::ApiError;
use crate::extract::{ActingUser, ApiJson};
use crate::routes::assessments::CommandResponse;
use crate::state::AppState;

/// Request body for POST /{id}/allocations.
#[derive(Debug, Default, Deserialize)]
pub struct AllocationRequest {
    /// Assessor to allocate. Defaults to the acting user.
    #[serde(default)]
    pub user_id: Option<Uuid>,
}

/// POST /{id}/allocations
#[instrument(skip(state, acting_user, request))]
async fn allocate(
    State(state): State<AppState>,
    ActingUser(acting_user): ActingUser,
    Path(assessment_id): Path<Uuid>,
    request: Option<ApiJson<AllocationRequest>>,
) -> Result<Json<CommandResponse>, ApiError> {
    let ApiJson(request) = request.unwrap_or_default();
    let user_id = request.user_id.or(acting_user).ok_or_else(|| {
        DomainError::Validation("user_id is required when no acting user is given".to_owned())
    })?;

    let command = commands::AllocateAssessment {
        correlation_id: Uuid::new_v4(),
        assessment_id,
        user_id,
        allocated_by: acting_user,
    };

    info!(
        correlation_id = %command.correlation_id,
        %user_id,
        "handling allocate_assessment command"
    );

    let result = command_handlers::handle_allocate_assessment(
        &command,
        state.clock.as_ref(),
        &*state.event_repository,
    )
    .await?;

    Ok(Json(result.into()))
}

/// DELETE /{id}/allocations
#[instrument(skip(state))]
async fn deallocate(
    State(state): State<AppState>,
    Path(assessment_id): Path<Uuid>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::DeallocateAssessment {
        correlation_id: Uuid::new_v4(),
        assessment_id,
    };

    info!(correlation_id = %command.correlation_id, "handling deallocate_assessment command");

    let result = command_handlers::handle_deallocate_assessment(
        &command,
        state.clock.as_ref(),
        &*state.event_repository,
    )
    .await?;

    Ok(Json(result.into()))
}

/// Returns the router for assessment tasks.
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}/allocations", post(allocate).delete(deallocate))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use casework_assessment::application::query_handlers;
    use casework_assessment::domain::status::AssessmentStatus;
    use casework_assessment::fixtures::AssessmentFixture;
    use casework_core::repository::EventRepository;
    use casework_test_support::{FixedClock, InMemoryEventRepository};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::extract::USER_ID_HEADER;

    fn seeded(status: AssessmentStatus) -> (Arc<InMemoryEventRepository>, Uuid) {
        let repo = Arc::new(InMemoryEventRepository::new());
        let fixture = AssessmentFixture::new().with_status(status);
        repo.seed(fixture.assessment_id(), fixture.build());
        (repo, fixture.assessment_id())
    }

    async fn send(
        repo: Arc<InMemoryEventRepository>,
        request: Request<Body>,
    ) -> (StatusCode, Value) {
        let state = AppState::new(Arc::new(FixedClock::default()), repo);
        let response = router().with_state(state).oneshot(request).await.unwrap();
        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body_bytes).unwrap_or(Value::Null))
    }

    fn allocate_request(id: Uuid, acting_user: Option<Uuid>, body: &Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(format!("/{id}/allocations"))
            .header("content-type", "application/json");
        if let Some(user) = acting_user {
            builder = builder.header(USER_ID_HEADER, user.to_string());
        }
        builder
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_allocate_uses_body_user_and_records_acting_user() {
        // Arrange
        let (repo, id) = seeded(AssessmentStatus::Unallocated);
        let assessor = Uuid::new_v4();
        let manager = Uuid::new_v4();

        // Act
        let (status, json) = send(
            repo.clone(),
            allocate_request(id, Some(manager), &serde_json::json!({ "user_id": assessor })),
        )
        .await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "in_review");
        let view = query_handlers::get_assessment_by_id(id, &*repo)
            .await
            .unwrap();
        assert_eq!(view.allocated_user_id, Some(assessor));
        let stored = repo.load_events(id).await.unwrap();
        assert_eq!(
            stored[1].payload["AssessmentAllocated"]["allocated_by"],
            manager.to_string()
        );
    }

    #[tokio::test]
    async fn test_allocate_falls_back_to_acting_user() {
        // Arrange
        let (repo, id) = seeded(AssessmentStatus::Unallocated);
        let assessor = Uuid::new_v4();

        // Act
        let (status, _) = send(
            repo.clone(),
            allocate_request(id, Some(assessor), &serde_json::json!({})),
        )
        .await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        let view = query_handlers::get_assessment_by_id(id, &*repo)
            .await
            .unwrap();
        assert_eq!(view.allocated_user_id, Some(assessor));
    }

    #[tokio::test]
    async fn test_allocate_without_any_user_returns_400() {
        // Arrange
        let (repo, id) = seeded(AssessmentStatus::Unallocated);

        // Act
        let (status, json) =
            send(repo.clone(), allocate_request(id, None, &serde_json::json!({}))).await;

        // Assert
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "validation_error");
        assert_eq!(repo.stream_len(id), 1);
    }

    #[tokio::test]
    async fn test_allocate_in_review_returns_409() {
        // Arrange
        let (repo, id) = seeded(AssessmentStatus::InReview);

        // Act
        let (status, json) = send(
            repo,
            allocate_request(id, None, &serde_json::json!({ "user_id": Uuid::new_v4() })),
        )
        .await;

        // Assert
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["error"], "invalid_transition");
    }

    #[tokio::test]
    async fn test_deallocate_returns_unallocated() {
        // Arrange
        let (repo, id) = seeded(AssessmentStatus::InReview);
        let request = Request::builder()
            .method("DELETE")
            .uri(format!("/{id}/allocations"))
            .body(Body::empty())
            .unwrap();

        // Act
        let (status, json) = send(repo.clone(), request).await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "unallocated");
        let view = query_handlers::get_assessment_by_id(id, &*repo)
            .await
            .unwrap();
        assert_eq!(view.allocated_user_id, None);
    }
}

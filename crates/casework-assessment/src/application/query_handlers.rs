//! Query handlers for the Assessment context.
//!
//! Queries reconstitute the assessment from its events and return read-only
//! views. They never append.

use casework_core::error::DomainError;
use casework_core::repository::EventRepository;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::application::command_handlers;
use crate::domain::aggregates::AssessmentDecision;
use crate::domain::status::{AssessmentAction, AssessmentStatus};

/// Read-only view of an assessment.
#[derive(Debug, Serialize)]
pub struct AssessmentView {
    /// The assessment identifier.
    pub assessment_id: Uuid,
    /// The application being assessed.
    pub application_id: Option<Uuid>,
    /// Current lifecycle status.
    pub status: AssessmentStatus,
    /// The assessor currently or last allocated.
    pub allocated_user_id: Option<Uuid>,
    /// When the current allocation was made.
    pub allocated_at: Option<DateTime<Utc>>,
    /// The last recorded decision.
    pub decision: Option<AssessmentDecision>,
    /// The document recorded with the last decision.
    pub document: Option<serde_json::Value>,
    /// Notes recorded with the last acceptance.
    pub notes: Option<String>,
    /// Present only while rejected.
    pub rejection_rationale: Option<String>,
    /// When the last decision was recorded.
    pub decision_at: Option<DateTime<Utc>>,
    /// When the assessment was last closed.
    pub closed_at: Option<DateTime<Utc>>,
    /// When the assessment was opened.
    pub created_at: Option<DateTime<Utc>>,
    /// Current version (event count).
    pub version: i64,
}

/// One entry in an assessment's status history.
#[derive(Debug, Serialize)]
pub struct StatusChangeView {
    /// The action taken.
    pub action: AssessmentAction,
    /// Status before the action.
    pub from: AssessmentStatus,
    /// Status after the action.
    pub to: AssessmentStatus,
    /// When the action was recorded.
    pub occurred_at: DateTime<Utc>,
    /// Correlation ID of the request that made the change.
    pub correlation_id: Uuid,
}

/// Retrieves an assessment by its aggregate ID.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if no events exist for the ID.
/// Returns `DomainError::Infrastructure` if event deserialization fails.
pub async fn get_assessment_by_id(
    assessment_id: Uuid,
    repo: &dyn EventRepository,
) -> Result<AssessmentView, DomainError> {
    let assessment = command_handlers::load(assessment_id, repo).await?;
    Ok(AssessmentView {
        assessment_id,
        application_id: assessment.application_id,
        status: assessment.status,
        allocated_user_id: assessment.allocated_user_id,
        allocated_at: assessment.allocated_at,
        decision: assessment.decision,
        document: assessment.document,
        notes: assessment.notes,
        rejection_rationale: assessment.rejection_rationale,
        decision_at: assessment.decision_at,
        closed_at: assessment.closed_at,
        created_at: assessment.created_at,
        version: assessment.version,
    })
}

/// Returns only the current status of an assessment.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if no events exist for the ID.
pub async fn get_assessment_status(
    assessment_id: Uuid,
    repo: &dyn EventRepository,
) -> Result<AssessmentStatus, DomainError> {
    Ok(command_handlers::load(assessment_id, repo).await?.status)
}

/// Returns every status transition of an assessment, oldest first.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if no events exist for the ID.
pub async fn get_assessment_history(
    assessment_id: Uuid,
    repo: &dyn EventRepository,
) -> Result<Vec<StatusChangeView>, DomainError> {
    let assessment = command_handlers::load(assessment_id, repo).await?;
    Ok(assessment
        .history()
        .iter()
        .map(|change| StatusChangeView {
            action: change.action,
            from: change.from,
            to: change.to,
            occurred_at: change.occurred_at,
            correlation_id: change.correlation_id,
        })
        .collect())
}

//! Domain events for the Assessment context.

use casework_core::event::{DomainEvent, EventMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::status::{AssessmentAction, AssessmentStatus};

/// Emitted when an application is submitted and its assessment is opened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentCreated {
    /// The assessment identifier.
    pub assessment_id: Uuid,
    /// The application being assessed.
    pub application_id: Uuid,
}

/// Emitted when an assessment is allocated to an assessor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentAllocated {
    /// The assessment identifier.
    pub assessment_id: Uuid,
    /// The assessor now responsible for the assessment.
    pub user_id: Uuid,
    /// The user who made the allocation, when known.
    pub allocated_by: Option<Uuid>,
}

/// Emitted when the current allocation is removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentDeallocated {
    /// The assessment identifier.
    pub assessment_id: Uuid,
    /// The assessor the assessment was taken from.
    pub previous_user_id: Option<Uuid>,
}

/// Emitted when an assessment is accepted and becomes ready to place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentAccepted {
    /// The assessment identifier.
    pub assessment_id: Uuid,
    /// The acceptance document.
    pub document: serde_json::Value,
    /// Free-text notes recorded with the decision.
    pub notes: Option<String>,
}

/// Emitted when an assessment is rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRejected {
    /// The assessment identifier.
    pub assessment_id: Uuid,
    /// The rejection document.
    pub document: serde_json::Value,
    /// Why the assessment was rejected. Never blank.
    pub rejection_rationale: String,
}

/// Emitted when an accepted assessment is closed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentClosed {
    /// The assessment identifier.
    pub assessment_id: Uuid,
}

/// Event type identifier for [`AssessmentCreated`].
pub const ASSESSMENT_CREATED_EVENT_TYPE: &str = "assessment.created";

/// Event type identifier for [`AssessmentAllocated`].
pub const ASSESSMENT_ALLOCATED_EVENT_TYPE: &str = "assessment.allocated";

/// Event type identifier for [`AssessmentDeallocated`].
pub const ASSESSMENT_DEALLOCATED_EVENT_TYPE: &str = "assessment.deallocated";

/// Event type identifier for [`AssessmentAccepted`].
pub const ASSESSMENT_ACCEPTED_EVENT_TYPE: &str = "assessment.accepted";

/// Event type identifier for [`AssessmentRejected`].
pub const ASSESSMENT_REJECTED_EVENT_TYPE: &str = "assessment.rejected";

/// Event type identifier for [`AssessmentClosed`].
pub const ASSESSMENT_CLOSED_EVENT_TYPE: &str = "assessment.closed";

/// Event payload variants for the Assessment context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AssessmentEventKind {
    /// The assessment was opened.
    AssessmentCreated(AssessmentCreated),
    /// An assessor was allocated.
    AssessmentAllocated(AssessmentAllocated),
    /// The allocation was removed.
    AssessmentDeallocated(AssessmentDeallocated),
    /// The assessment was accepted.
    AssessmentAccepted(AssessmentAccepted),
    /// The assessment was rejected.
    AssessmentRejected(AssessmentRejected),
    /// The assessment was closed.
    AssessmentClosed(AssessmentClosed),
}

impl AssessmentEventKind {
    /// The stored event type name for this payload.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::AssessmentCreated(_) => ASSESSMENT_CREATED_EVENT_TYPE,
            Self::AssessmentAllocated(_) => ASSESSMENT_ALLOCATED_EVENT_TYPE,
            Self::AssessmentDeallocated(_) => ASSESSMENT_DEALLOCATED_EVENT_TYPE,
            Self::AssessmentAccepted(_) => ASSESSMENT_ACCEPTED_EVENT_TYPE,
            Self::AssessmentRejected(_) => ASSESSMENT_REJECTED_EVENT_TYPE,
            Self::AssessmentClosed(_) => ASSESSMENT_CLOSED_EVENT_TYPE,
        }
    }

    /// The lifecycle action this event records, `None` for creation.
    #[must_use]
    pub fn action(&self) -> Option<AssessmentAction> {
        match self {
            Self::AssessmentCreated(_) => None,
            Self::AssessmentAllocated(_) => Some(AssessmentAction::Allocate),
            Self::AssessmentDeallocated(_) => Some(AssessmentAction::Deallocate),
            Self::AssessmentAccepted(_) => Some(AssessmentAction::Accept),
            Self::AssessmentRejected(_) => Some(AssessmentAction::Reject),
            Self::AssessmentClosed(_) => Some(AssessmentAction::Close),
        }
    }

    /// The status the assessment is in once this event is applied.
    #[must_use]
    pub fn resulting_status(&self) -> AssessmentStatus {
        match self {
            Self::AssessmentCreated(_) | Self::AssessmentDeallocated(_) => {
                AssessmentStatus::Unallocated
            }
            Self::AssessmentAllocated(_) => AssessmentStatus::InReview,
            Self::AssessmentAccepted(_) => AssessmentStatus::ReadyToPlace,
            Self::AssessmentRejected(_) => AssessmentStatus::Rejected,
            Self::AssessmentClosed(_) => AssessmentStatus::Closed,
        }
    }
}

/// Domain event envelope for the Assessment context.
#[derive(Debug, Clone)]
pub struct AssessmentEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: AssessmentEventKind,
}

impl DomainEvent for AssessmentEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind).expect("AssessmentEventKind serialization is infallible")
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}

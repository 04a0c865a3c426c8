//! Assessment status lifecycle.
//!
//! ```text
//! Unallocated ──allocate──▶ InReview ──accept──▶ ReadyToPlace ──close──▶ Closed
//!      ▲                      │                    │
//!      └─────deallocate───────┘                    └──reject──▶ Rejected
//! ```
//!
//! `ReadyToPlace`, `Closed` and `Rejected` can all be allocated back into
//! `InReview`; `Closed` and `Rejected` can also be accepted straight back
//! into `ReadyToPlace`.

use serde::{Deserialize, Serialize};

/// Lifecycle status of an assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStatus {
    /// Waiting for an assessor.
    #[default]
    Unallocated,
    /// Allocated to an assessor who is reviewing it.
    InReview,
    /// Accepted and waiting for a placement.
    ReadyToPlace,
    /// Closed after acceptance.
    Closed,
    /// Rejected with a rationale.
    Rejected,
}

impl AssessmentStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Unallocated,
        Self::InReview,
        Self::ReadyToPlace,
        Self::Closed,
        Self::Rejected,
    ];

    /// The status reached by applying `action`, or `None` if the action is
    /// not allowed from this status.
    #[must_use]
    pub fn transition(self, action: AssessmentAction) -> Option<Self> {
        use AssessmentAction as A;
        use AssessmentStatus as S;

        match (action, self) {
            (A::Allocate, S::Unallocated | S::ReadyToPlace | S::Rejected | S::Closed) => {
                Some(S::InReview)
            }
            (A::Deallocate, S::InReview) => Some(S::Unallocated),
            (A::Accept, S::InReview | S::Closed | S::Rejected) => Some(S::ReadyToPlace),
            (A::Reject, S::ReadyToPlace) => Some(S::Rejected),
            (A::Close, S::ReadyToPlace) => Some(S::Closed),
            _ => None,
        }
    }

    /// Whether `action` is allowed from this status.
    #[must_use]
    pub fn allows(self, action: AssessmentAction) -> bool {
        self.transition(action).is_some()
    }

    /// The wire name of the status.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unallocated => "unallocated",
            Self::InReview => "in_review",
            Self::ReadyToPlace => "ready_to_place",
            Self::Closed => "closed",
            Self::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for AssessmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An action that moves an assessment between statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentAction {
    /// Allocate to an assessor.
    Allocate,
    /// Remove the current allocation.
    Deallocate,
    /// Accept, marking the assessment ready to place.
    Accept,
    /// Reject with a rationale.
    Reject,
    /// Close an accepted assessment.
    Close,
}

impl AssessmentAction {
    /// Every action.
    pub const ALL: [Self; 5] = [
        Self::Allocate,
        Self::Deallocate,
        Self::Accept,
        Self::Reject,
        Self::Close,
    ];

    /// The wire name of the action.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Allocate => "allocate",
            Self::Deallocate => "deallocate",
            Self::Accept => "accept",
            Self::Reject => "reject",
            Self::Close => "close",
        }
    }
}

impl std::fmt::Display for AssessmentAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

//! Aggregate roots for the Assessment context.

use casework_core::aggregate::AggregateRoot;
use casework_core::clock::Clock;
use casework_core::error::DomainError;
use casework_core::event::EventMetadata;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::events::{
    AssessmentAccepted, AssessmentAllocated, AssessmentClosed, AssessmentCreated,
    AssessmentDeallocated, AssessmentEvent, AssessmentEventKind, AssessmentRejected,
};
use super::status::{AssessmentAction, AssessmentStatus};

/// The last decision recorded against an assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentDecision {
    /// Accepted; the assessment is or was ready to place.
    Accepted,
    /// Rejected with a rationale.
    Rejected,
}

/// One applied status transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    /// The action that caused the change.
    pub action: AssessmentAction,
    /// Status before the action.
    pub from: AssessmentStatus,
    /// Status after the action.
    pub to: AssessmentStatus,
    /// When the change was recorded.
    pub occurred_at: DateTime<Utc>,
    /// Correlation ID of the command that caused it.
    pub correlation_id: Uuid,
}

/// The aggregate root for an assessment.
#[derive(Debug)]
pub struct Assessment {
    /// Aggregate identifier.
    pub id: Uuid,
    /// Current version (event count).
    pub(crate) version: i64,
    pub(crate) application_id: Option<Uuid>,
    pub(crate) status: AssessmentStatus,
    pub(crate) allocated_user_id: Option<Uuid>,
    pub(crate) allocated_at: Option<DateTime<Utc>>,
    pub(crate) decision: Option<AssessmentDecision>,
    pub(crate) document: Option<serde_json::Value>,
    pub(crate) notes: Option<String>,
    /// Only ever set while `status` is `Rejected`.
    pub(crate) rejection_rationale: Option<String>,
    pub(crate) decision_at: Option<DateTime<Utc>>,
    pub(crate) closed_at: Option<DateTime<Utc>>,
    pub(crate) created_at: Option<DateTime<Utc>>,
    pub(crate) history: Vec<StatusChange>,
    /// Uncommitted events pending persistence.
    uncommitted_events: Vec<AssessmentEvent>,
}

impl Assessment {
    /// Creates an empty assessment aggregate, ready for reconstitution or
    /// for [`Assessment::create`].
    #[must_use]
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            version: 0,
            application_id: None,
            status: AssessmentStatus::Unallocated,
            allocated_user_id: None,
            allocated_at: None,
            decision: None,
            document: None,
            notes: None,
            rejection_rationale: None,
            decision_at: None,
            closed_at: None,
            created_at: None,
            history: Vec::new(),
            uncommitted_events: Vec::new(),
        }
    }

    /// Current status, including any uncommitted transition.
    #[must_use]
    pub fn status(&self) -> AssessmentStatus {
        self.uncommitted_events
            .last()
            .map_or(self.status, |event| event.kind.resulting_status())
    }

    /// The assessor currently allocated, including any uncommitted change.
    #[must_use]
    pub fn allocated_user_id(&self) -> Option<Uuid> {
        self.uncommitted_events
            .iter()
            .fold(self.allocated_user_id, |current, event| match &event.kind {
                AssessmentEventKind::AssessmentAllocated(payload) => Some(payload.user_id),
                AssessmentEventKind::AssessmentDeallocated(_) => None,
                _ => current,
            })
    }

    /// The persisted rejection rationale.
    #[must_use]
    pub fn rejection_rationale(&self) -> Option<&str> {
        self.rejection_rationale.as_deref()
    }

    /// Applied status transitions, oldest first.
    #[must_use]
    pub fn history(&self) -> &[StatusChange] {
        &self.history
    }

    fn exists(&self) -> bool {
        self.version > 0 || !self.uncommitted_events.is_empty()
    }

    /// Returns the next sequence number for a new event.
    #[allow(clippy::cast_possible_wrap)]
    fn next_sequence_number(&self) -> i64 {
        self.version + self.uncommitted_events.len() as i64 + 1
    }

    fn guard(&self, action: AssessmentAction) -> Result<(), DomainError> {
        let current = self.status();
        if current.allows(action) {
            Ok(())
        } else {
            Err(DomainError::invalid_transition(self.id, current, action))
        }
    }

    fn record(&mut self, kind: AssessmentEventKind, correlation_id: Uuid, clock: &dyn Clock) {
        let metadata = EventMetadata::for_command(
            self.id,
            kind.event_type(),
            self.next_sequence_number(),
            correlation_id,
            clock.now(),
        );
        self.uncommitted_events
            .push(AssessmentEvent { metadata, kind });
    }

    /// Opens the assessment for a submitted application, producing an
    /// `AssessmentCreated` event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::AlreadyExists` if the assessment was already opened.
    pub fn create(
        &mut self,
        application_id: Uuid,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        if self.exists() {
            return Err(DomainError::AlreadyExists(self.id));
        }
        self.record(
            AssessmentEventKind::AssessmentCreated(AssessmentCreated {
                assessment_id: self.id,
                application_id,
            }),
            correlation_id,
            clock,
        );
        Ok(())
    }

    /// Allocates the assessment to `user_id`, producing an
    /// `AssessmentAllocated` event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` if the assessment is already
    /// in review.
    pub fn allocate(
        &mut self,
        user_id: Uuid,
        allocated_by: Option<Uuid>,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.guard(AssessmentAction::Allocate)?;
        self.record(
            AssessmentEventKind::AssessmentAllocated(AssessmentAllocated {
                assessment_id: self.id,
                user_id,
                allocated_by,
            }),
            correlation_id,
            clock,
        );
        Ok(())
    }

    /// Removes the current allocation, producing an `AssessmentDeallocated`
    /// event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` unless the assessment is in
    /// review.
    pub fn deallocate(&mut self, correlation_id: Uuid, clock: &dyn Clock) -> Result<(), DomainError> {
        self.guard(AssessmentAction::Deallocate)?;
        let previous_user_id = self.allocated_user_id();
        self.record(
            AssessmentEventKind::AssessmentDeallocated(AssessmentDeallocated {
                assessment_id: self.id,
                previous_user_id,
            }),
            correlation_id,
            clock,
        );
        Ok(())
    }

    /// Accepts the assessment, producing an `AssessmentAccepted` event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` unless the assessment is in
    /// review, closed or rejected.
    pub fn accept(
        &mut self,
        document: serde_json::Value,
        notes: Option<String>,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.guard(AssessmentAction::Accept)?;
        self.record(
            AssessmentEventKind::AssessmentAccepted(AssessmentAccepted {
                assessment_id: self.id,
                document,
                notes,
            }),
            correlation_id,
            clock,
        );
        Ok(())
    }

    /// Rejects the assessment, producing an `AssessmentRejected` event.
    ///
    /// The rationale is checked before the status, so a blank rationale is
    /// always a validation error.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `rejection_rationale` is blank.
    /// Returns `DomainError::InvalidTransition` unless the assessment is
    /// ready to place.
    pub fn reject(
        &mut self,
        document: serde_json::Value,
        rejection_rationale: &str,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        let rejection_rationale = rejection_rationale.trim();
        if rejection_rationale.is_empty() {
            return Err(DomainError::Validation(format!(
                "a rejection rationale is required to reject assessment {}",
                self.id
            )));
        }
        self.guard(AssessmentAction::Reject)?;
        self.record(
            AssessmentEventKind::AssessmentRejected(AssessmentRejected {
                assessment_id: self.id,
                document,
                rejection_rationale: rejection_rationale.to_owned(),
            }),
            correlation_id,
            clock,
        );
        Ok(())
    }

    /// Closes the assessment, producing an `AssessmentClosed` event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` unless the assessment is
    /// ready to place.
    pub fn close(&mut self, correlation_id: Uuid, clock: &dyn Clock) -> Result<(), DomainError> {
        self.guard(AssessmentAction::Close)?;
        self.record(
            AssessmentEventKind::AssessmentClosed(AssessmentClosed {
                assessment_id: self.id,
            }),
            correlation_id,
            clock,
        );
        Ok(())
    }
}

impl AggregateRoot for Assessment {
    type Event = AssessmentEvent;

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        let occurred_at = event.metadata.occurred_at;
        let from = self.status;

        match &event.kind {
            AssessmentEventKind::AssessmentCreated(payload) => {
                self.application_id = Some(payload.application_id);
                self.created_at = Some(occurred_at);
            }
            AssessmentEventKind::AssessmentAllocated(payload) => {
                self.allocated_user_id = Some(payload.user_id);
                self.allocated_at = Some(occurred_at);
            }
            AssessmentEventKind::AssessmentDeallocated(_) => {
                self.allocated_user_id = None;
                self.allocated_at = None;
            }
            AssessmentEventKind::AssessmentAccepted(payload) => {
                self.decision = Some(AssessmentDecision::Accepted);
                self.document = Some(payload.document.clone());
                self.notes.clone_from(&payload.notes);
                self.decision_at = Some(occurred_at);
            }
            AssessmentEventKind::AssessmentRejected(payload) => {
                self.decision = Some(AssessmentDecision::Rejected);
                self.document = Some(payload.document.clone());
                self.notes = None;
                self.rejection_rationale = Some(payload.rejection_rationale.clone());
                self.decision_at = Some(occurred_at);
            }
            AssessmentEventKind::AssessmentClosed(_) => {
                self.closed_at = Some(occurred_at);
            }
        }

        self.status = event.kind.resulting_status();
        if self.status != AssessmentStatus::Rejected {
            self.rejection_rationale = None;
        }
        if let Some(action) = event.kind.action() {
            self.history.push(StatusChange {
                action,
                from,
                to: self.status,
                occurred_at,
                correlation_id: event.metadata.correlation_id,
            });
        }
        self.version += 1;
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }

    fn clear_uncommitted_events(&mut self) {
        self.uncommitted_events.clear();
    }
}

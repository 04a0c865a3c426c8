//! Test fixtures: stored event streams for assessments in a given status.
//!
//! ```ignore
//! let fixture = AssessmentFixture::new().with_status(AssessmentStatus::ReadyToPlace);
//! repo.seed(fixture.assessment_id(), fixture.build());
//! ```
//!
//! Streams are produced by running the real commands, so they always follow
//! the lifecycle table.

use casework_core::aggregate::AggregateRoot;
use casework_core::clock::Clock;
use casework_core::error::DomainError;
use casework_core::repository::StoredEvent;
use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use crate::domain::aggregates::Assessment;
use crate::domain::commands::assessment_id_for;
use crate::domain::status::{AssessmentAction, AssessmentStatus};

struct At(DateTime<Utc>);

impl Clock for At {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Builder for an assessment's event history. Every field has a default;
/// override only what the test cares about.
#[derive(Debug, Clone)]
pub struct AssessmentFixture {
    application_id: Uuid,
    status: AssessmentStatus,
    allocated_user_id: Uuid,
    document: serde_json::Value,
    rejection_rationale: String,
    occurred_at: DateTime<Utc>,
}

impl Default for AssessmentFixture {
    fn default() -> Self {
        Self {
            application_id: Uuid::new_v4(),
            status: AssessmentStatus::Unallocated,
            allocated_user_id: Uuid::new_v4(),
            document: serde_json::json!({}),
            rejection_rationale: "Some reason or another".to_owned(),
            occurred_at: Utc
                .with_ymd_and_hms(2026, 1, 15, 10, 0, 0)
                .single()
                .unwrap_or_default(),
        }
    }
}

impl AssessmentFixture {
    /// An unallocated assessment for a fresh application.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the application being assessed.
    #[must_use]
    pub fn with_application_id(mut self, application_id: Uuid) -> Self {
        self.application_id = application_id;
        self
    }

    /// Sets the status the history ends in.
    #[must_use]
    pub fn with_status(mut self, status: AssessmentStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the assessor used for the allocation step.
    #[must_use]
    pub fn allocated_to(mut self, user_id: Uuid) -> Self {
        self.allocated_user_id = user_id;
        self
    }

    /// Sets the document recorded with decisions.
    #[must_use]
    pub fn with_document(mut self, document: serde_json::Value) -> Self {
        self.document = document;
        self
    }

    /// Sets the rationale used when the history ends in `Rejected`.
    #[must_use]
    pub fn with_rejection_rationale(mut self, rationale: &str) -> Self {
        rationale.clone_into(&mut self.rejection_rationale);
        self
    }

    /// Sets the timestamp of every event.
    #[must_use]
    pub fn at(mut self, occurred_at: DateTime<Utc>) -> Self {
        self.occurred_at = occurred_at;
        self
    }

    /// The application id.
    #[must_use]
    pub fn application_id(&self) -> Uuid {
        self.application_id
    }

    /// The assessment id derived from the application id.
    #[must_use]
    pub fn assessment_id(&self) -> Uuid {
        assessment_id_for(self.application_id)
    }

    /// The assessor used for the allocation step.
    #[must_use]
    pub fn allocated_user_id(&self) -> Uuid {
        self.allocated_user_id
    }

    /// Shortest path of actions from `Unallocated` to the target status.
    fn path(&self) -> &'static [AssessmentAction] {
        use AssessmentAction::{Accept, Allocate, Close, Reject};
        match self.status {
            AssessmentStatus::Unallocated => &[],
            AssessmentStatus::InReview => &[Allocate],
            AssessmentStatus::ReadyToPlace => &[Allocate, Accept],
            AssessmentStatus::Closed => &[Allocate, Accept, Close],
            AssessmentStatus::Rejected => &[Allocate, Accept, Reject],
        }
    }

    fn step(
        &self,
        assessment: &mut Assessment,
        action: AssessmentAction,
        clock: &At,
    ) -> Result<(), DomainError> {
        let correlation_id = Uuid::new_v4();
        match action {
            AssessmentAction::Allocate => {
                assessment.allocate(self.allocated_user_id, None, correlation_id, clock)
            }
            AssessmentAction::Deallocate => assessment.deallocate(correlation_id, clock),
            AssessmentAction::Accept => {
                assessment.accept(self.document.clone(), None, correlation_id, clock)
            }
            AssessmentAction::Reject => assessment.reject(
                self.document.clone(),
                &self.rejection_rationale,
                correlation_id,
                clock,
            ),
            AssessmentAction::Close => assessment.close(correlation_id, clock),
        }
    }

    /// Builds the stored event stream.
    ///
    /// # Panics
    ///
    /// Panics if the configured rejection rationale is blank.
    #[must_use]
    pub fn build(&self) -> Vec<StoredEvent> {
        let clock = At(self.occurred_at);
        let mut assessment = Assessment::new(self.assessment_id());
        let mut stored = Vec::new();

        let mut record = |assessment: &mut Assessment| {
            stored.extend(
                assessment
                    .uncommitted_events()
                    .iter()
                    .map(StoredEvent::from_event),
            );
            assessment.commit();
        };

        assessment
            .create(self.application_id, Uuid::new_v4(), &clock)
            .expect("a fresh assessment can always be created");
        record(&mut assessment);

        for action in self.path() {
            self.step(&mut assessment, *action, &clock)
                .expect("fixture paths follow the lifecycle table");
            record(&mut assessment);
        }

        stored
    }
}

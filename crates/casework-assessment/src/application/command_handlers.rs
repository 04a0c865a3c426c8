//! Command handlers for the Assessment context.
//!
//! Each handler is one unit of work: reconstitute the assessment from its
//! event stream, run the command against it, and append the resulting events
//! with the version that was loaded. A concurrent writer makes the append
//! fail with `ConcurrencyConflict`, so a transition never lands on a stale
//! status.

use casework_core::aggregate::AggregateRoot;
use casework_core::clock::Clock;
use casework_core::command::Command;
use casework_core::error::DomainError;
use casework_core::repository::{EventRepository, StoredEvent};
use tracing::debug;
use uuid::Uuid;

use crate::domain::aggregates::Assessment;
use crate::domain::commands::{
    AcceptAssessment, AllocateAssessment, CloseAssessment, CreateAssessment,
    DeallocateAssessment, RejectAssessment,
};
use crate::domain::events::{AssessmentEvent, AssessmentEventKind};
use crate::domain::status::AssessmentStatus;

/// Result of a successfully handled command.
#[derive(Debug)]
pub struct AssessmentCommandResult {
    /// The aggregate ID affected or created by the command.
    pub aggregate_id: Uuid,
    /// The assessment's status after the command.
    pub status: AssessmentStatus,
    /// The stored events produced and persisted.
    pub stored_events: Vec<StoredEvent>,
}

/// Reconstitutes an `Assessment` from stored events.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if event deserialization fails.
pub(crate) fn reconstitute(
    assessment_id: Uuid,
    existing_events: &[StoredEvent],
) -> Result<Assessment, DomainError> {
    let mut assessment = Assessment::new(assessment_id);
    for stored in existing_events {
        let kind: AssessmentEventKind =
            serde_json::from_value(stored.payload.clone()).map_err(|e| {
                DomainError::Infrastructure(format!(
                    "event {} deserialization failed: {e}",
                    stored.event_id
                ))
            })?;
        assessment.apply(&AssessmentEvent {
            metadata: stored.metadata(),
            kind,
        });
    }
    Ok(assessment)
}

/// Loads an existing assessment.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if the assessment has no events.
pub(crate) async fn load(
    assessment_id: Uuid,
    repo: &dyn EventRepository,
) -> Result<Assessment, DomainError> {
    let existing_events = repo.load_events(assessment_id).await?;
    if existing_events.is_empty() {
        return Err(DomainError::AggregateNotFound(assessment_id));
    }
    reconstitute(assessment_id, &existing_events)
}

/// Appends the assessment's uncommitted events at the version it was loaded at.
pub(crate) async fn persist(
    command: &dyn Command,
    assessment: &Assessment,
    repo: &dyn EventRepository,
) -> Result<AssessmentCommandResult, DomainError> {
    let stored_events: Vec<StoredEvent> = assessment
        .uncommitted_events()
        .iter()
        .map(StoredEvent::from_event)
        .collect();

    repo.append_events(assessment.id, assessment.version(), &stored_events)
        .await?;

    debug!(
        command_type = command.command_type(),
        assessment_id = %assessment.id,
        status = %assessment.status(),
        event_count = stored_events.len(),
        "assessment events appended"
    );

    Ok(AssessmentCommandResult {
        aggregate_id: assessment.id,
        status: assessment.status(),
        stored_events,
    })
}

/// Handles the `CreateAssessment` command: opens the assessment for a
/// submitted application.
///
/// # Errors
///
/// Returns `DomainError::AlreadyExists` if the application already has an
/// assessment, or `DomainError` if event loading or appending fails.
pub async fn handle_create_assessment(
    command: &CreateAssessment,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<AssessmentCommandResult, DomainError> {
    let assessment_id = command.aggregate_id();
    let existing_events = repo.load_events(assessment_id).await?;
    let mut assessment = reconstitute(assessment_id, &existing_events)?;

    assessment.create(command.application_id, command.correlation_id, clock)?;

    persist(command, &assessment, repo).await
}

/// Handles the `AllocateAssessment` command.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound`, `DomainError::InvalidTransition`,
/// or `DomainError` if event loading or appending fails.
pub async fn handle_allocate_assessment(
    command: &AllocateAssessment,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<AssessmentCommandResult, DomainError> {
    let mut assessment = load(command.assessment_id, repo).await?;

    assessment.allocate(
        command.user_id,
        command.allocated_by,
        command.correlation_id,
        clock,
    )?;

    persist(command, &assessment, repo).await
}

/// Handles the `DeallocateAssessment` command.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound`, `DomainError::InvalidTransition`,
/// or `DomainError` if event loading or appending fails.
pub async fn handle_deallocate_assessment(
    command: &DeallocateAssessment,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<AssessmentCommandResult, DomainError> {
    let mut assessment = load(command.assessment_id, repo).await?;

    assessment.deallocate(command.correlation_id, clock)?;

    persist(command, &assessment, repo).await
}

/// Handles the `AcceptAssessment` command.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound`, `DomainError::InvalidTransition`,
/// or `DomainError` if event loading or appending fails.
pub async fn handle_accept_assessment(
    command: &AcceptAssessment,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<AssessmentCommandResult, DomainError> {
    let mut assessment = load(command.assessment_id, repo).await?;

    assessment.accept(
        command.document.clone(),
        command.notes.clone(),
        command.correlation_id,
        clock,
    )?;

    persist(command, &assessment, repo).await
}

/// Handles the `RejectAssessment` command.
///
/// # Errors
///
/// Returns `DomainError::Validation` for a blank rationale,
/// `DomainError::AggregateNotFound`, `DomainError::InvalidTransition`, or
/// `DomainError` if event loading or appending fails.
pub async fn handle_reject_assessment(
    command: &RejectAssessment,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<AssessmentCommandResult, DomainError> {
    let mut assessment = load(command.assessment_id, repo).await?;

    assessment.reject(
        command.document.clone(),
        &command.rejection_rationale,
        command.correlation_id,
        clock,
    )?;

    persist(command, &assessment, repo).await
}

/// Handles the `CloseAssessment` command.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound`, `DomainError::InvalidTransition`,
/// or `DomainError` if event loading or appending fails.
pub async fn handle_close_assessment(
    command: &CloseAssessment,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<AssessmentCommandResult, DomainError> {
    let mut assessment = load(command.assessment_id, repo).await?;

    assessment.close(command.correlation_id, clock)?;

    persist(command, &assessment, repo).await
}

#[cfg(test)]
mod tests {
    use casework_core::error::DomainError;
    use casework_core::repository::EventRepository;
    use casework_test_support::{
        EmptyEventRepository, FailingEventRepository, FixedClock, InMemoryEventRepository,
        RecordingEventRepository,
    };
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    use super::*;
    use crate::domain::commands::assessment_id_for;
    use crate::fixtures::AssessmentFixture;

    fn fixed_clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap())
    }

    fn close_command(assessment_id: Uuid) -> CloseAssessment {
        CloseAssessment {
            correlation_id: Uuid::new_v4(),
            assessment_id,
        }
    }

    async fn status_of(assessment_id: Uuid, repo: &dyn EventRepository) -> AssessmentStatus {
        load(assessment_id, repo).await.unwrap().status()
    }

    #[tokio::test]
    async fn test_handle_create_assessment_persists_created_event() {
        // Arrange
        let application_id = Uuid::new_v4();
        let correlation_id = Uuid::new_v4();
        let clock = fixed_clock();
        let repo = RecordingEventRepository::new(Ok(Vec::new()));

        let command = CreateAssessment {
            correlation_id,
            application_id,
        };

        // Act
        let result = handle_create_assessment(&command, &clock, &repo)
            .await
            .unwrap();

        // Assert
        assert_eq!(result.aggregate_id, assessment_id_for(application_id));
        assert_eq!(result.status, AssessmentStatus::Unallocated);

        let appended = repo.appended_events();
        assert_eq!(appended.len(), 1);

        let (agg_id, expected_version, events) = &appended[0];
        assert_eq!(*agg_id, result.aggregate_id);
        assert_eq!(*expected_version, 0);
        assert_eq!(events.len(), 1);

        let stored = &events[0];
        assert_eq!(stored.event_type, "assessment.created");
        assert_eq!(stored.sequence_number, 1);
        assert_eq!(stored.correlation_id, correlation_id);
        assert_eq!(stored.occurred_at, clock.0);
    }

    #[tokio::test]
    async fn test_handle_create_assessment_twice_returns_already_exists() {
        let fixture = AssessmentFixture::new();
        let repo = RecordingEventRepository::new(Ok(fixture.build()));

        let command = CreateAssessment {
            correlation_id: Uuid::new_v4(),
            application_id: fixture.application_id(),
        };
        let result = handle_create_assessment(&command, &fixed_clock(), &repo).await;

        match result.unwrap_err() {
            DomainError::AlreadyExists(id) => assert_eq!(id, fixture.assessment_id()),
            other => panic!("expected AlreadyExists, got {other:?}"),
        }
        assert!(repo.appended_events().is_empty());
    }

    #[tokio::test]
    async fn test_handle_allocate_appends_at_loaded_version() {
        // Arrange
        let fixture = AssessmentFixture::new();
        let repo = RecordingEventRepository::new(Ok(fixture.build()));
        let user_id = Uuid::new_v4();

        let command = AllocateAssessment {
            correlation_id: Uuid::new_v4(),
            assessment_id: fixture.assessment_id(),
            user_id,
            allocated_by: None,
        };

        // Act
        let result = handle_allocate_assessment(&command, &fixed_clock(), &repo)
            .await
            .unwrap();

        // Assert
        assert_eq!(result.status, AssessmentStatus::InReview);
        let appended = repo.appended_events();
        let (_, expected_version, events) = &appended[0];
        assert_eq!(*expected_version, 1);
        assert_eq!(events[0].event_type, "assessment.allocated");
        assert_eq!(events[0].sequence_number, 2);
        assert_eq!(events[0].payload["AssessmentAllocated"]["user_id"], user_id.to_string());
    }

    #[tokio::test]
    async fn test_handle_allocate_returns_not_found_for_unknown_assessment() {
        let assessment_id = Uuid::new_v4();
        let command = AllocateAssessment {
            correlation_id: Uuid::new_v4(),
            assessment_id,
            user_id: Uuid::new_v4(),
            allocated_by: None,
        };

        let result = handle_allocate_assessment(&command, &fixed_clock(), &EmptyEventRepository).await;

        match result.unwrap_err() {
            DomainError::AggregateNotFound(id) => assert_eq!(id, assessment_id),
            other => panic!("expected AggregateNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_handle_deallocate_unallocated_appends_nothing() {
        let fixture = AssessmentFixture::new();
        let repo = RecordingEventRepository::new(Ok(fixture.build()));

        let command = DeallocateAssessment {
            correlation_id: Uuid::new_v4(),
            assessment_id: fixture.assessment_id(),
        };
        let result = handle_deallocate_assessment(&command, &fixed_clock(), &repo).await;

        assert!(matches!(
            result,
            Err(DomainError::InvalidTransition { .. })
        ));
        assert!(repo.appended_events().is_empty());
    }

    #[tokio::test]
    async fn test_handle_reject_with_blank_rationale_leaves_status_unchanged() {
        let fixture = AssessmentFixture::new().with_status(AssessmentStatus::ReadyToPlace);
        let repo = InMemoryEventRepository::new();
        repo.seed(fixture.assessment_id(), fixture.build());

        let command = RejectAssessment {
            correlation_id: Uuid::new_v4(),
            assessment_id: fixture.assessment_id(),
            document: serde_json::json!({}),
            rejection_rationale: "  ".to_owned(),
        };
        let result = handle_reject_assessment(&command, &fixed_clock(), &repo).await;

        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert_eq!(
            status_of(fixture.assessment_id(), &repo).await,
            AssessmentStatus::ReadyToPlace
        );
    }

    #[tokio::test]
    async fn test_handle_close_twice_fails_with_invalid_transition() {
        let fixture = AssessmentFixture::new().with_status(AssessmentStatus::ReadyToPlace);
        let repo = InMemoryEventRepository::new();
        repo.seed(fixture.assessment_id(), fixture.build());
        let clock = fixed_clock();

        let first = handle_close_assessment(&close_command(fixture.assessment_id()), &clock, &repo)
            .await
            .unwrap();
        let second =
            handle_close_assessment(&close_command(fixture.assessment_id()), &clock, &repo).await;

        assert_eq!(first.status, AssessmentStatus::Closed);
        match second.unwrap_err() {
            DomainError::InvalidTransition { current, action, .. } => {
                assert_eq!(current, "closed");
                assert_eq!(action, "close");
            }
            other => panic!("expected InvalidTransition, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_concurrent_transitions_on_stale_status_conflict() {
        // Arrange: two writers load the same ready-to-place assessment.
        let fixture = AssessmentFixture::new().with_status(AssessmentStatus::ReadyToPlace);
        let repo = InMemoryEventRepository::new();
        repo.seed(fixture.assessment_id(), fixture.build());
        let clock = fixed_clock();

        let mut closer = load(fixture.assessment_id(), &repo).await.unwrap();
        let mut rejecter = load(fixture.assessment_id(), &repo).await.unwrap();

        closer.close(Uuid::new_v4(), &clock).unwrap();
        rejecter
            .reject(serde_json::json!({}), "duplicate referral", Uuid::new_v4(), &clock)
            .unwrap();

        // Act
        let first = persist(&close_command(closer.id), &closer, &repo).await;
        let second = persist(&close_command(rejecter.id), &rejecter, &repo).await;

        // Assert
        assert!(first.is_ok());
        match second.unwrap_err() {
            DomainError::ConcurrencyConflict {
                aggregate_id,
                expected,
                actual,
            } => {
                assert_eq!(aggregate_id, fixture.assessment_id());
                assert_eq!(expected, 3);
                assert_eq!(actual, 4);
            }
            other => panic!("expected ConcurrencyConflict, got {other:?}"),
        }
        assert_eq!(
            status_of(fixture.assessment_id(), &repo).await,
            AssessmentStatus::Closed
        );
    }

    #[tokio::test]
    async fn test_handlers_propagate_infrastructure_errors() {
        let command = close_command(Uuid::new_v4());

        let result = handle_close_assessment(&command, &fixed_clock(), &FailingEventRepository).await;

        assert!(matches!(result, Err(DomainError::Infrastructure(_))));
    }

    #[test]
    fn test_reconstitute_rejects_unknown_payload() {
        let mut events = AssessmentFixture::new().build();
        events[0].payload = serde_json::json!({ "SomethingElse": {} });

        let result = reconstitute(events[0].aggregate_id, &events);

        assert!(matches!(result, Err(DomainError::Infrastructure(_))));
    }

    #[tokio::test]
    async fn test_end_to_end_review_scenario_through_handlers() {
        let repo = InMemoryEventRepository::new();
        let clock = fixed_clock();
        let user_id = Uuid::new_v4();

        let created = handle_create_assessment(
            &CreateAssessment {
                correlation_id: Uuid::new_v4(),
                application_id: Uuid::new_v4(),
            },
            &clock,
            &repo,
        )
        .await
        .unwrap();
        let id = created.aggregate_id;
        assert_eq!(status_of(id, &repo).await, AssessmentStatus::Unallocated);

        let allocate = AllocateAssessment {
            correlation_id: Uuid::new_v4(),
            assessment_id: id,
            user_id,
            allocated_by: Some(user_id),
        };
        let deallocate = DeallocateAssessment {
            correlation_id: Uuid::new_v4(),
            assessment_id: id,
        };
        let accept = AcceptAssessment {
            correlation_id: Uuid::new_v4(),
            assessment_id: id,
            document: serde_json::json!({ "summary": "suitable" }),
            notes: None,
        };
        let reject = RejectAssessment {
            correlation_id: Uuid::new_v4(),
            assessment_id: id,
            document: serde_json::json!({ "summary": "unsuitable" }),
            rejection_rationale: "Some reason or another".to_owned(),
        };

        handle_allocate_assessment(&allocate, &clock, &repo).await.unwrap();
        assert_eq!(status_of(id, &repo).await, AssessmentStatus::InReview);
        handle_accept_assessment(&accept, &clock, &repo).await.unwrap();
        assert_eq!(status_of(id, &repo).await, AssessmentStatus::ReadyToPlace);
        handle_close_assessment(&close_command(id), &clock, &repo).await.unwrap();
        assert_eq!(status_of(id, &repo).await, AssessmentStatus::Closed);
        handle_accept_assessment(&accept, &clock, &repo).await.unwrap();
        assert_eq!(status_of(id, &repo).await, AssessmentStatus::ReadyToPlace);
        handle_allocate_assessment(&allocate, &clock, &repo).await.unwrap();
        assert_eq!(status_of(id, &repo).await, AssessmentStatus::InReview);
        handle_deallocate_assessment(&deallocate, &clock, &repo).await.unwrap();
        assert_eq!(status_of(id, &repo).await, AssessmentStatus::Unallocated);
        handle_allocate_assessment(&allocate, &clock, &repo).await.unwrap();
        assert_eq!(status_of(id, &repo).await, AssessmentStatus::InReview);
        handle_accept_assessment(&accept, &clock, &repo).await.unwrap();
        assert_eq!(status_of(id, &repo).await, AssessmentStatus::ReadyToPlace);
        handle_reject_assessment(&reject, &clock, &repo).await.unwrap();
        assert_eq!(status_of(id, &repo).await, AssessmentStatus::Rejected);
        handle_accept_assessment(&accept, &clock, &repo).await.unwrap();
        assert_eq!(status_of(id, &repo).await, AssessmentStatus::ReadyToPlace);
        handle_allocate_assessment(&allocate, &clock, &repo).await.unwrap();
        assert_eq!(status_of(id, &repo).await, AssessmentStatus::InReview);
        let last = handle_deallocate_assessment(&deallocate, &clock, &repo)
            .await
            .unwrap();
        assert_eq!(last.status, AssessmentStatus::Unallocated);

        let assessment = load(id, &repo).await.unwrap();
        assert_eq!(assessment.version(), 13);
        assert_eq!(assessment.allocated_user_id(), None);
    }
}

//! Commands for the Assessment context.

use casework_core::command::Command;
use uuid::Uuid;

/// Namespace for deriving assessment ids from application ids.
const ASSESSMENT_ID_NAMESPACE: Uuid = Uuid::from_u128(0x6c1f_93a0_52d4_4b8e_9a1e_3f0b_7c25_d410);

/// The assessment id for an application. Deterministic, so an application
/// can only ever have one assessment.
#[must_use]
pub fn assessment_id_for(application_id: Uuid) -> Uuid {
    Uuid::new_v5(&ASSESSMENT_ID_NAMESPACE, application_id.as_bytes())
}

/// Command to open the assessment for a submitted application.
#[derive(Debug, Clone)]
pub struct CreateAssessment {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The submitted application.
    pub application_id: Uuid,
}

impl Command for CreateAssessment {
    fn command_type(&self) -> &'static str {
        "assessment.create"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn aggregate_id(&self) -> Uuid {
        assessment_id_for(self.application_id)
    }
}

/// Command to allocate an assessment to an assessor.
#[derive(Debug, Clone)]
pub struct AllocateAssessment {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The assessment identifier.
    pub assessment_id: Uuid,
    /// The assessor to allocate to.
    pub user_id: Uuid,
    /// The acting user, when known.
    pub allocated_by: Option<Uuid>,
}

impl Command for AllocateAssessment {
    fn command_type(&self) -> &'static str {
        "assessment.allocate"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn aggregate_id(&self) -> Uuid {
        self.assessment_id
    }
}

/// Command to remove the current allocation.
#[derive(Debug, Clone)]
pub struct DeallocateAssessment {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The assessment identifier.
    pub assessment_id: Uuid,
}

impl Command for DeallocateAssessment {
    fn command_type(&self) -> &'static str {
        "assessment.deallocate"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn aggregate_id(&self) -> Uuid {
        self.assessment_id
    }
}

/// Command to accept an assessment, marking it ready to place.
#[derive(Debug, Clone)]
pub struct AcceptAssessment {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The assessment identifier.
    pub assessment_id: Uuid,
    /// The acceptance document.
    pub document: serde_json::Value,
    /// Optional notes recorded with the decision.
    pub notes: Option<String>,
}

impl Command for AcceptAssessment {
    fn command_type(&self) -> &'static str {
        "assessment.accept"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn aggregate_id(&self) -> Uuid {
        self.assessment_id
    }
}

/// Command to reject an assessment.
#[derive(Debug, Clone)]
pub struct RejectAssessment {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The assessment identifier.
    pub assessment_id: Uuid,
    /// The rejection document.
    pub document: serde_json::Value,
    /// Why the assessment is rejected.
    pub rejection_rationale: String,
}

impl Command for RejectAssessment {
    fn command_type(&self) -> &'static str {
        "assessment.reject"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn aggregate_id(&self) -> Uuid {
        self.assessment_id
    }
}

/// Command to close an accepted assessment.
#[derive(Debug, Clone)]
pub struct CloseAssessment {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The assessment identifier.
    pub assessment_id: Uuid,
}

impl Command for CloseAssessment {
    fn command_type(&self) -> &'static str {
        "assessment.close"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn aggregate_id(&self) -> Uuid {
        self.assessment_id
    }
}

//! Contract error types for the training points module
//!
//! These errors are transport-agnostic and used for inter-module communication.
//! Every variant is recoverable by the caller.

use super::model::EntityId;

/// Training points domain errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrainingPointsError {
    /// Malformed or missing input
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Referenced entity is absent (or deactivated)
    #[error("{resource} not found: {id}")]
    NotFound { resource: String, id: String },

    /// The student is already registered for the activity
    #[error("Student {student_id} is already registered for activity {activity_id}")]
    DuplicateRegistration {
        student_id: EntityId,
        activity_id: EntityId,
    },

    /// The student already filed a report for the activity
    #[error("Student {student_id} already filed a deficiency report for activity {activity_id}")]
    DuplicateReport {
        student_id: EntityId,
        activity_id: EntityId,
    },

    /// The profile matched by the key is already linked to an account
    #[error("Profile '{key}' is already bound to an account")]
    AlreadyBound { key: String },

    /// The acting actor lacks the role the operation requires
    #[error("Forbidden: {reason}")]
    Forbidden { reason: String },

    /// The activity still has active participations
    #[error("Activity {activity_id} still has active participations")]
    ActivityInUse { activity_id: EntityId },

    /// Storage failure; details are logged, not exposed
    #[error("Internal error")]
    Internal,
}

impl TrainingPointsError {
    pub fn not_found(resource: &str, id: impl ToString) -> Self {
        Self::NotFound {
            resource: resource.to_string(),
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Log a storage failure and collapse it into [`TrainingPointsError::Internal`]
    pub fn internal(error: anyhow::Error) -> Self {
        tracing::error!(error = ?error, "storage operation failed");
        Self::Internal
    }
}

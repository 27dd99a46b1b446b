//! HTTP error mapping to RFC-9457 Problem Details

use crate::contract::TrainingPointsError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// RFC-9457 Problem Details for HTTP API errors
#[derive(Debug, Serialize)]
pub struct Problem {
    /// A URI reference that identifies the problem type
    #[serde(rename = "type")]
    pub type_uri: String,

    /// A short, human-readable summary of the problem type
    pub title: String,

    /// The HTTP status code
    pub status: u16,

    /// A human-readable explanation specific to this occurrence
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Problem {
    /// Create a new Problem Details response
    pub fn new(status: StatusCode, title: impl Into<String>) -> Self {
        Self {
            type_uri: format!("https://httpstatuses.io/{}", status.as_u16()),
            title: title.into(),
            status: status.as_u16(),
            detail: None,
        }
    }

    /// Add detail message
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl IntoResponse for Problem {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

/// Map domain errors to HTTP Problem Details
pub fn map_domain_error(error: TrainingPointsError) -> Problem {
    match error {
        TrainingPointsError::NotFound { resource, id } => Problem::new(
            StatusCode::NOT_FOUND,
            "Not Found",
        )
        .with_detail(format!("{} with id '{}' was not found", resource, id)),

        TrainingPointsError::Validation { message } => Problem::new(
            StatusCode::BAD_REQUEST,
            "Validation Error",
        )
        .with_detail(message),

        e @ TrainingPointsError::DuplicateRegistration { .. } => Problem::new(
            StatusCode::CONFLICT,
            "Duplicate Registration",
        )
        .with_detail(e.to_string()),

        e @ TrainingPointsError::DuplicateReport { .. } => Problem::new(
            StatusCode::CONFLICT,
            "Duplicate Report",
        )
        .with_detail(e.to_string()),

        e @ TrainingPointsError::AlreadyBound { .. } => Problem::new(
            StatusCode::CONFLICT,
            "Profile Already Bound",
        )
        .with_detail(e.to_string()),

        e @ TrainingPointsError::ActivityInUse { .. } => Problem::new(
            StatusCode::CONFLICT,
            "Activity In Use",
        )
        .with_detail(e.to_string()),

        TrainingPointsError::Forbidden { reason } => {
            Problem::new(StatusCode::FORBIDDEN, "Forbidden").with_detail(reason)
        }

        TrainingPointsError::Internal => Problem::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal Server Error",
        )
        .with_detail("An unexpected error occurred"),
    }
}

impl From<TrainingPointsError> for Problem {
    fn from(error: TrainingPointsError) -> Self {
        map_domain_error(error)
    }
}

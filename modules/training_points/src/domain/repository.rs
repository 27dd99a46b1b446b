//! Repository traits for data access
//!
//! These traits define the interface for data access operations.
//! Implementations are in infra/storage/repositories.rs

use crate::contract::{
    Account, Activity, ActivityFilter, ActivityUpdate, Actor, ActorRef, AttendanceOutcome,
    Criterion, DeficiencyReport, EntityId, Faculty, NewActivity, NewDeficiencyReport,
    NewTrainingPoint, Participation, ReportFilter, RoleKind, Semester, TrainingPoint,
};
use anyhow::Result;
use async_trait::async_trait;

/// Failure of a write guarded by a unique constraint
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// The row would duplicate an existing unique key
    #[error("unique constraint violated")]
    UniqueViolation,
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Profiles of a single role kind
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Role kind served by this repository
    fn role_kind(&self) -> RoleKind;

    async fn find_by_id(&self, id: EntityId) -> Result<Option<Actor>>;

    /// Find a profile by its student or staff code
    async fn find_by_code(&self, code: &str) -> Result<Option<Actor>>;

    async fn find_by_account(&self, account_id: EntityId) -> Result<Option<Actor>>;
}

/// Login accounts
#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn find(&self, account_id: EntityId) -> Result<Option<Account>>;

    /// Create an account and link it to `profile` in one transaction.
    ///
    /// Returns `None` (and persists nothing) when the profile is already linked.
    async fn provision(&self, email: &str, profile: ActorRef) -> Result<Option<Account>>;
}

/// Faculties, semesters and criteria
#[async_trait]
pub trait ReferenceRepository: Send + Sync {
    async fn find_faculty(&self, id: EntityId) -> Result<Option<Faculty>>;

    async fn find_semester(&self, id: EntityId) -> Result<Option<Semester>>;

    async fn find_criterion(&self, id: EntityId) -> Result<Option<Criterion>>;

    async fn list_criteria(&self) -> Result<Vec<Criterion>>;
}

/// Activity catalog storage
#[async_trait]
pub trait ActivityRepository: Send + Sync {
    async fn create(&self, data: &NewActivity, created_by: ActorRef) -> Result<Activity>;

    /// Find an activity regardless of its active flag
    async fn find(&self, id: EntityId) -> Result<Option<Activity>>;

    async fn list(&self, filter: &ActivityFilter, limit: u64, offset: u64) -> Result<Vec<Activity>>;

    /// Persist schedule/metadata changes; `None` if the activity is gone
    async fn update(&self, id: EntityId, update: &ActivityUpdate) -> Result<Option<Activity>>;

    /// Clear the active flag; `false` if the activity is gone
    async fn deactivate(&self, id: EntityId) -> Result<bool>;

    /// Remove the activity, cascading to its participation and report rows
    async fn delete(&self, id: EntityId) -> Result<bool>;
}

/// Participation ledger storage
#[async_trait]
pub trait ParticipationRepository: Send + Sync {
    /// Insert a `Registered` row; the (student, activity) pair is unique
    async fn insert(
        &self,
        student_id: EntityId,
        activity_id: EntityId,
    ) -> std::result::Result<Participation, RepositoryError>;

    async fn find_by_pair(
        &self,
        student_id: EntityId,
        activity_id: EntityId,
    ) -> Result<Option<Participation>>;

    async fn list_by_activity(&self, activity_id: EntityId) -> Result<Vec<Participation>>;

    async fn list_by_student(&self, student_id: EntityId) -> Result<Vec<Participation>>;

    async fn count_active_by_activity(&self, activity_id: EntityId) -> Result<u64>;

    /// Write the attendance flag and, when the transition calls for it, mint the
    /// training point and set `is_point_added` in the same transaction.
    ///
    /// See [`crate::domain::ledger::attendance_transition`]. Returns `None` if
    /// the participation does not exist.
    async fn apply_attendance(
        &self,
        participation_id: EntityId,
        attended: bool,
    ) -> Result<Option<AttendanceOutcome>>;
}

/// Append-only training point ledger
#[async_trait]
pub trait TrainingPointRepository: Send + Sync {
    async fn grant(&self, entry: &NewTrainingPoint) -> Result<TrainingPoint>;

    async fn list_for_student(
        &self,
        student_id: EntityId,
        semester_id: Option<EntityId>,
    ) -> Result<Vec<TrainingPoint>>;

    async fn sum_for_student_in_semester(
        &self,
        student_id: EntityId,
        semester_id: EntityId,
    ) -> Result<i64>;
}

/// Deficiency report storage
#[async_trait]
pub trait DeficiencyReportRepository: Send + Sync {
    /// Insert a report; the (student, activity) pair is unique
    async fn insert(
        &self,
        report: &NewDeficiencyReport,
    ) -> std::result::Result<DeficiencyReport, RepositoryError>;

    async fn find(&self, id: EntityId) -> Result<Option<DeficiencyReport>>;

    async fn list(&self, filter: &ReportFilter) -> Result<Vec<DeficiencyReport>>;

    /// Set `is_resolved`; `None` if the report is gone
    async fn mark_resolved(&self, id: EntityId) -> Result<Option<DeficiencyReport>>;
}

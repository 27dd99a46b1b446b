//! Native client trait for inter-module communication
//!
//! This trait defines the API that other modules use to interact with the
//! training points module. NO HTTP - direct function calls.

use super::{
    error::TrainingPointsError,
    model::{
        Account, Activity, ActivityFilter, ActorRef, ActorSummary, AttendanceOutcome,
        DeficiencyReport, EntityId, NewAccount, NewActivity, NewDeficiencyReport, Participation,
        RoleKind,
    },
};
use async_trait::async_trait;

/// Training points API for inter-module communication
#[async_trait]
pub trait TrainingPointsApi: Send + Sync {
    // ===== Actor Directory =====

    /// Create an account and bind it to the profile owning `key`
    async fn provision_account(&self, request: NewAccount) -> Result<Account, TrainingPointsError>;

    /// Role kind the account is bound to, if any
    async fn role_kind_of(&self, account_id: EntityId)
        -> Result<Option<RoleKind>, TrainingPointsError>;

    /// Expand a stored creator reference into a role-appropriate summary
    async fn expand_creator(&self, creator: ActorRef) -> Result<ActorSummary, TrainingPointsError>;

    // ===== Activity Catalog =====

    async fn create_activity(
        &self,
        data: NewActivity,
        creator: ActorRef,
    ) -> Result<Activity, TrainingPointsError>;

    async fn get_activity(&self, activity_id: EntityId) -> Result<Activity, TrainingPointsError>;

    async fn list_activities(
        &self,
        filter: ActivityFilter,
        limit: Option<u64>,
        offset: u64,
    ) -> Result<Vec<Activity>, TrainingPointsError>;

    // ===== Participation Ledger =====

    async fn register(
        &self,
        student_id: EntityId,
        activity_id: EntityId,
    ) -> Result<Participation, TrainingPointsError>;

    async fn mark_attendance(
        &self,
        student_id: EntityId,
        activity_id: EntityId,
        attended: bool,
        marked_by: ActorRef,
    ) -> Result<AttendanceOutcome, TrainingPointsError>;

    // ===== Training Point Ledger =====

    async fn sum_for_student_in_semester(
        &self,
        student_id: EntityId,
        semester_id: EntityId,
    ) -> Result<i64, TrainingPointsError>;

    // ===== Deficiency Report Desk =====

    async fn file_report(
        &self,
        report: NewDeficiencyReport,
    ) -> Result<DeficiencyReport, TrainingPointsError>;

    async fn resolve_report(
        &self,
        report_id: EntityId,
        resolved_by: ActorRef,
    ) -> Result<DeficiencyReport, TrainingPointsError>;
}

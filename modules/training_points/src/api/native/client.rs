//! Native client implementation - wraps domain service for in-process calls

use crate::contract::{
    Account, Activity, ActivityFilter, ActorRef, ActorSummary, AttendanceOutcome,
    DeficiencyReport, EntityId, NewAccount, NewActivity, NewDeficiencyReport, Participation,
    RoleKind, TrainingPointsApi, TrainingPointsError,
};
use crate::domain::Service;
use async_trait::async_trait;
use std::sync::Arc;

/// Native client that calls the domain service directly
///
/// Used for in-process communication without HTTP overhead.
#[derive(Clone)]
pub struct NativeClient {
    service: Arc<Service>,
}

impl NativeClient {
    /// Create a new native client
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl TrainingPointsApi for NativeClient {
    async fn provision_account(&self, request: NewAccount) -> Result<Account, TrainingPointsError> {
        self.service.provision_account(request).await
    }

    async fn role_kind_of(
        &self,
        account_id: EntityId,
    ) -> Result<Option<RoleKind>, TrainingPointsError> {
        self.service.role_kind_of(account_id).await
    }

    async fn expand_creator(&self, creator: ActorRef) -> Result<ActorSummary, TrainingPointsError> {
        self.service.expand_creator(creator).await
    }

    async fn create_activity(
        &self,
        data: NewActivity,
        creator: ActorRef,
    ) -> Result<Activity, TrainingPointsError> {
        self.service.create_activity(data, creator).await
    }

    async fn get_activity(&self, activity_id: EntityId) -> Result<Activity, TrainingPointsError> {
        self.service.get_activity(activity_id).await
    }

    async fn list_activities(
        &self,
        filter: ActivityFilter,
        limit: Option<u64>,
        offset: u64,
    ) -> Result<Vec<Activity>, TrainingPointsError> {
        self.service.list_activities(filter, limit, offset).await
    }

    async fn register(
        &self,
        student_id: EntityId,
        activity_id: EntityId,
    ) -> Result<Participation, TrainingPointsError> {
        self.service.register(student_id, activity_id).await
    }

    async fn mark_attendance(
        &self,
        student_id: EntityId,
        activity_id: EntityId,
        attended: bool,
        marked_by: ActorRef,
    ) -> Result<AttendanceOutcome, TrainingPointsError> {
        self.service
            .mark_attendance(student_id, activity_id, attended, marked_by)
            .await
    }

    async fn sum_for_student_in_semester(
        &self,
        student_id: EntityId,
        semester_id: EntityId,
    ) -> Result<i64, TrainingPointsError> {
        self.service
            .sum_for_student_in_semester(student_id, semester_id)
            .await
    }

    async fn file_report(
        &self,
        report: NewDeficiencyReport,
    ) -> Result<DeficiencyReport, TrainingPointsError> {
        self.service.file_report(report).await
    }

    async fn resolve_report(
        &self,
        report_id: EntityId,
        resolved_by: ActorRef,
    ) -> Result<DeficiencyReport, TrainingPointsError> {
        self.service.resolve_report(report_id, resolved_by).await
    }
}

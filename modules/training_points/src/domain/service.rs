//! Domain service - business logic orchestration

use super::directory::ActorDirectory;
use super::repository::{
    AccountRepository, ActivityRepository, DeficiencyReportRepository, ParticipationRepository,
    ProfileRepository, ReferenceRepository, RepositoryError, TrainingPointRepository,
};
use super::validation;
use crate::contract::{
    Account, Activity, ActivityFilter, ActivityUpdate, Actor, ActorRef, ActorSummary,
    AttendanceOutcome, CriterionTally, DeficiencyReport, EntityId, NewAccount, NewActivity,
    NewDeficiencyReport, Participation, ReportFilter, RoleKind, SemesterReport, TrainingPoint,
    TrainingPointsError,
};
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Storage handles the service is built from
#[derive(Clone)]
pub struct Repositories {
    pub accounts: Arc<dyn AccountRepository>,
    /// One repository per role kind
    pub profiles: Vec<Arc<dyn ProfileRepository>>,
    pub references: Arc<dyn ReferenceRepository>,
    pub activities: Arc<dyn ActivityRepository>,
    pub participations: Arc<dyn ParticipationRepository>,
    pub training_points: Arc<dyn TrainingPointRepository>,
    pub reports: Arc<dyn DeficiencyReportRepository>,
}

/// Page size bounds for listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    pub default_page_size: u64,
    pub max_page_size: u64,
}

impl Default for Paging {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}

/// Domain service for activities, participation and training points
pub struct Service {
    directory: ActorDirectory,
    references: Arc<dyn ReferenceRepository>,
    activities: Arc<dyn ActivityRepository>,
    participations: Arc<dyn ParticipationRepository>,
    training_points: Arc<dyn TrainingPointRepository>,
    reports: Arc<dyn DeficiencyReportRepository>,
    paging: Paging,
}

impl Service {
    /// Create a new service instance
    pub fn new(repos: Repositories) -> Self {
        Self::with_paging(repos, Paging::default())
    }

    pub fn with_paging(repos: Repositories, paging: Paging) -> Self {
        Self {
            directory: ActorDirectory::new(repos.accounts, repos.profiles),
            references: repos.references,
            activities: repos.activities,
            participations: repos.participations,
            training_points: repos.training_points,
            reports: repos.reports,
            paging,
        }
    }

    pub fn directory(&self) -> &ActorDirectory {
        &self.directory
    }

    // ===== Actor Directory =====

    pub async fn provision_account(&self, request: NewAccount) -> Result<Account, TrainingPointsError> {
        validation::validate_email(&request.email)?;
        self.directory
            .provision_account(&request.email, &request.key)
            .await
    }

    pub async fn role_kind_of(&self, account_id: EntityId) -> Result<Option<RoleKind>, TrainingPointsError> {
        self.directory.role_kind_of(account_id).await
    }

    pub async fn profile_for(&self, account_id: EntityId) -> Result<Option<Actor>, TrainingPointsError> {
        self.directory.profile_for(account_id).await
    }

    /// Summary of the profile bound to an account, if any
    pub async fn account_profile(
        &self,
        account_id: EntityId,
    ) -> Result<Option<ActorSummary>, TrainingPointsError> {
        match self.directory.profile_for(account_id).await? {
            Some(actor) => self.directory.summarize(&actor).map(Some),
            None => Ok(None),
        }
    }

    /// Render the actor behind an activity's creator reference
    pub async fn expand_creator(&self, creator: ActorRef) -> Result<ActorSummary, TrainingPointsError> {
        self.directory.resolve_by_creator_reference(creator).await
    }

    // ===== Activity Catalog =====

    pub async fn create_activity(
        &self,
        data: NewActivity,
        creator: ActorRef,
    ) -> Result<Activity, TrainingPointsError> {
        validation::validate_new_activity(&data)?;
        self.directory.resolve_reference(creator).await?;
        self.validate_activity_references(&data).await?;

        let activity = self
            .activities
            .create(&data, creator)
            .await
            .map_err(TrainingPointsError::internal)?;

        tracing::info!(
            activity_id = activity.id,
            creator_role = %creator.role,
            creator_id = creator.actor_id,
            point = activity.point,
            "activity created"
        );
        Ok(activity)
    }

    /// Get an active activity
    pub async fn get_activity(&self, activity_id: EntityId) -> Result<Activity, TrainingPointsError> {
        self.activities
            .find(activity_id)
            .await
            .map_err(TrainingPointsError::internal)?
            .filter(|a| a.is_active)
            .ok_or_else(|| TrainingPointsError::not_found("activity", activity_id))
    }

    pub async fn list_activities(
        &self,
        filter: ActivityFilter,
        limit: Option<u64>,
        offset: u64,
    ) -> Result<Vec<Activity>, TrainingPointsError> {
        self.activities
            .list(&filter, self.page_limit(limit), offset)
            .await
            .map_err(TrainingPointsError::internal)
    }

    /// Lazily page through every activity matching `filter`.
    ///
    /// Each call starts a fresh walk from the first page.
    pub fn stream_activities(
        &self,
        filter: ActivityFilter,
    ) -> BoxStream<'_, Result<Activity, TrainingPointsError>> {
        let page_size = self.paging.default_page_size.max(1);
        stream::try_unfold(Some(0u64), move |offset| {
            let filter = filter.clone();
            async move {
                let Some(offset) = offset else {
                    return Ok::<_, TrainingPointsError>(None);
                };
                let page = self
                    .activities
                    .list(&filter, page_size, offset)
                    .await
                    .map_err(TrainingPointsError::internal)?;
                let next = (page.len() as u64 == page_size).then_some(offset + page_size);
                Ok(Some((stream::iter(page.into_iter().map(Ok::<_, TrainingPointsError>)), next)))
            }
        })
        .try_flatten()
        .boxed()
    }

    /// Adjust schedule or metadata of an active activity
    pub async fn update_activity(
        &self,
        activity_id: EntityId,
        update: ActivityUpdate,
        updated_by: ActorRef,
    ) -> Result<Activity, TrainingPointsError> {
        self.require_staff(updated_by, "update activities").await?;

        let mut patched = self.get_activity(activity_id).await?;
        update.apply_to(&mut patched);
        validation::validate_patched_activity(&patched)?;

        self.activities
            .update(activity_id, &update)
            .await
            .map_err(TrainingPointsError::internal)?
            .ok_or_else(|| TrainingPointsError::not_found("activity", activity_id))
    }

    /// Hide an activity from listings and close it for registration
    pub async fn deactivate_activity(
        &self,
        activity_id: EntityId,
        deactivated_by: ActorRef,
    ) -> Result<(), TrainingPointsError> {
        self.require_staff(deactivated_by, "deactivate activities").await?;

        let found = self
            .activities
            .deactivate(activity_id)
            .await
            .map_err(TrainingPointsError::internal)?;
        if !found {
            return Err(TrainingPointsError::not_found("activity", activity_id));
        }
        tracing::info!(
            activity_id,
            actor_role = %deactivated_by.role,
            actor_id = deactivated_by.actor_id,
            "activity deactivated"
        );
        Ok(())
    }

    /// Remove an activity that no active participation references
    pub async fn delete_activity(
        &self,
        activity_id: EntityId,
        deleted_by: ActorRef,
    ) -> Result<(), TrainingPointsError> {
        self.require_staff(deleted_by, "delete activities").await?;

        let in_use = self
            .participations
            .count_active_by_activity(activity_id)
            .await
            .map_err(TrainingPointsError::internal)?;
        if in_use > 0 {
            return Err(TrainingPointsError::ActivityInUse { activity_id });
        }

        let found = self
            .activities
            .delete(activity_id)
            .await
            .map_err(TrainingPointsError::internal)?;
        if !found {
            return Err(TrainingPointsError::not_found("activity", activity_id));
        }
        tracing::info!(
            activity_id,
            actor_role = %deleted_by.role,
            actor_id = deleted_by.actor_id,
            "activity deleted"
        );
        Ok(())
    }

    // ===== Participation Ledger =====

    /// Register a student for an active activity
    pub async fn register(
        &self,
        student_id: EntityId,
        activity_id: EntityId,
    ) -> Result<Participation, TrainingPointsError> {
        self.require_student(student_id).await?;
        self.get_activity(activity_id).await?;

        match self.participations.insert(student_id, activity_id).await {
            Ok(participation) => {
                tracing::info!(
                    participation_id = participation.id,
                    student_id,
                    activity_id,
                    "student registered"
                );
                Ok(participation)
            }
            Err(RepositoryError::UniqueViolation) => {
                tracing::debug!(student_id, activity_id, "duplicate registration rejected");
                Err(TrainingPointsError::DuplicateRegistration {
                    student_id,
                    activity_id,
                })
            }
            Err(RepositoryError::Storage(e)) => Err(TrainingPointsError::internal(e)),
        }
    }

    /// Set attendance for a registration, crediting the activity's points on
    /// the first attended write.
    ///
    /// The credit and the `is_point_added` flag are written atomically; a
    /// failed write leaves neither behind and may be retried.
    pub async fn mark_attendance(
        &self,
        student_id: EntityId,
        activity_id: EntityId,
        attended: bool,
        marked_by: ActorRef,
    ) -> Result<AttendanceOutcome, TrainingPointsError> {
        self.require_staff(marked_by, "mark attendance").await?;

        let participation = self.find_participation(student_id, activity_id).await?;

        let outcome = self
            .participations
            .apply_attendance(participation.id, attended)
            .await
            .map_err(TrainingPointsError::internal)?
            .ok_or_else(|| TrainingPointsError::not_found("participation", participation.id))?;

        match &outcome.granted {
            Some(point) => tracing::info!(
                participation_id = participation.id,
                student_id,
                activity_id,
                training_point_id = point.id,
                point = point.point,
                "training point credited"
            ),
            None => tracing::debug!(
                participation_id = participation.id,
                attended,
                is_point_added = outcome.participation.is_point_added,
                "attendance updated without credit"
            ),
        }
        Ok(outcome)
    }

    pub async fn find_participation(
        &self,
        student_id: EntityId,
        activity_id: EntityId,
    ) -> Result<Participation, TrainingPointsError> {
        self.participations
            .find_by_pair(student_id, activity_id)
            .await
            .map_err(TrainingPointsError::internal)?
            .filter(|p| p.is_active)
            .ok_or_else(|| {
                TrainingPointsError::not_found("participation", format!("{}/{}", student_id, activity_id))
            })
    }

    pub async fn list_participants(&self, activity_id: EntityId) -> Result<Vec<Participation>, TrainingPointsError> {
        self.get_activity(activity_id).await?;
        self.participations
            .list_by_activity(activity_id)
            .await
            .map_err(TrainingPointsError::internal)
    }

    pub async fn list_participations(&self, student_id: EntityId) -> Result<Vec<Participation>, TrainingPointsError> {
        self.require_student(student_id).await?;
        self.participations
            .list_by_student(student_id)
            .await
            .map_err(TrainingPointsError::internal)
    }

    // ===== Training Point Ledger =====

    pub async fn sum_for_student_in_semester(
        &self,
        student_id: EntityId,
        semester_id: EntityId,
    ) -> Result<i64, TrainingPointsError> {
        self.training_points
            .sum_for_student_in_semester(student_id, semester_id)
            .await
            .map_err(TrainingPointsError::internal)
    }

    pub async fn list_training_points(
        &self,
        student_id: EntityId,
        semester_id: Option<EntityId>,
    ) -> Result<Vec<TrainingPoint>, TrainingPointsError> {
        self.training_points
            .list_for_student(student_id, semester_id)
            .await
            .map_err(TrainingPointsError::internal)
    }

    /// Per-criterion totals, each capped at the criterion's maximum
    pub async fn semester_report(
        &self,
        student_id: EntityId,
        semester_id: EntityId,
    ) -> Result<SemesterReport, TrainingPointsError> {
        self.require_student(student_id).await?;
        self.references
            .find_semester(semester_id)
            .await
            .map_err(TrainingPointsError::internal)?
            .ok_or_else(|| TrainingPointsError::not_found("semester", semester_id))?;

        let entries = self.list_training_points(student_id, Some(semester_id)).await?;
        let criteria: BTreeMap<EntityId, _> = self
            .references
            .list_criteria()
            .await
            .map_err(TrainingPointsError::internal)?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        let mut earned: BTreeMap<Option<EntityId>, i64> = BTreeMap::new();
        for entry in &entries {
            *earned.entry(entry.criterion_id).or_default() += i64::from(entry.point);
        }

        let tallies: Vec<CriterionTally> = earned
            .into_iter()
            .map(|(criterion_id, earned)| {
                let criterion = criterion_id.and_then(|id| criteria.get(&id));
                let max_point = criterion.map(|c| c.max_point);
                CriterionTally {
                    criterion_id,
                    name: criterion.map(|c| c.name.clone()),
                    earned,
                    max_point,
                    credited: max_point.map_or(earned, |max| earned.min(i64::from(max))),
                }
            })
            .collect();

        Ok(SemesterReport {
            student_id,
            semester_id,
            total: tallies.iter().map(|t| t.earned).sum(),
            credited_total: tallies.iter().map(|t| t.credited).sum(),
            criteria: tallies,
        })
    }

    // ===== Deficiency Report Desk =====

    /// File the single report a student may raise for an activity they are
    /// registered for
    pub async fn file_report(
        &self,
        report: NewDeficiencyReport,
    ) -> Result<DeficiencyReport, TrainingPointsError> {
        self.require_student(report.student_id).await?;
        self.get_activity(report.activity_id).await?;
        self.find_participation(report.student_id, report.activity_id).await?;

        let report = validation::normalize_report(report);
        let (student_id, activity_id) = (report.student_id, report.activity_id);

        match self.reports.insert(&report).await {
            Ok(filed) => {
                tracing::info!(report_id = filed.id, student_id, activity_id, "deficiency report filed");
                Ok(filed)
            }
            Err(RepositoryError::UniqueViolation) => Err(TrainingPointsError::DuplicateReport {
                student_id,
                activity_id,
            }),
            Err(RepositoryError::Storage(e)) => Err(TrainingPointsError::internal(e)),
        }
    }

    pub async fn get_report(&self, report_id: EntityId) -> Result<DeficiencyReport, TrainingPointsError> {
        self.reports
            .find(report_id)
            .await
            .map_err(TrainingPointsError::internal)?
            .filter(|r| r.is_active)
            .ok_or_else(|| TrainingPointsError::not_found("deficiency_report", report_id))
    }

    pub async fn list_reports(&self, filter: ReportFilter) -> Result<Vec<DeficiencyReport>, TrainingPointsError> {
        self.reports
            .list(&filter)
            .await
            .map_err(TrainingPointsError::internal)
    }

    /// Mark a report resolved; resolving twice is a no-op
    pub async fn resolve_report(
        &self,
        report_id: EntityId,
        resolved_by: ActorRef,
    ) -> Result<DeficiencyReport, TrainingPointsError> {
        self.require_staff(resolved_by, "resolve deficiency reports").await?;

        let report = self.get_report(report_id).await?;
        if report.is_resolved {
            return Ok(report);
        }

        let resolved = self
            .reports
            .mark_resolved(report_id)
            .await
            .map_err(TrainingPointsError::internal)?
            .ok_or_else(|| TrainingPointsError::not_found("deficiency_report", report_id))?;

        tracing::info!(
            report_id,
            resolver_role = %resolved_by.role,
            resolver_id = resolved_by.actor_id,
            "deficiency report resolved"
        );
        Ok(resolved)
    }

    // ===== Helper Methods =====

    fn page_limit(&self, limit: Option<u64>) -> u64 {
        limit
            .unwrap_or(self.paging.default_page_size)
            .clamp(1, self.paging.max_page_size.max(1))
    }

    /// Staff role, backed by an existing profile
    async fn require_staff(&self, actor: ActorRef, action: &str) -> Result<(), TrainingPointsError> {
        require_authority(actor, action)?;
        self.directory.resolve_reference(actor).await.map(|_| ())
    }

    async fn require_student(&self, student_id: EntityId) -> Result<(), TrainingPointsError> {
        self.directory
            .resolve_reference(ActorRef::new(RoleKind::Student, student_id))
            .await
            .map(|_| ())
    }

    /// Faculty and semester must exist; so must the criterion when given
    async fn validate_activity_references(&self, data: &NewActivity) -> Result<(), TrainingPointsError> {
        let faculty = self
            .references
            .find_faculty(data.faculty_id)
            .await
            .map_err(TrainingPointsError::internal)?;
        if faculty.is_none() {
            return Err(TrainingPointsError::validation(format!(
                "faculty {} does not exist",
                data.faculty_id
            )));
        }

        let semester = self
            .references
            .find_semester(data.semester_id)
            .await
            .map_err(TrainingPointsError::internal)?;
        if semester.is_none() {
            return Err(TrainingPointsError::validation(format!(
                "semester {} does not exist",
                data.semester_id
            )));
        }

        if let Some(criterion_id) = data.criterion_id {
            let criterion = self
                .references
                .find_criterion(criterion_id)
                .await
                .map_err(TrainingPointsError::internal)?;
            if criterion.is_none() {
                return Err(TrainingPointsError::validation(format!(
                    "criterion {} does not exist",
                    criterion_id
                )));
            }
        }

        Ok(())
    }
}

fn require_authority(actor: ActorRef, action: &str) -> Result<(), TrainingPointsError> {
    if actor.role.is_authority() {
        Ok(())
    } else {
        Err(TrainingPointsError::Forbidden {
            reason: format!("{} cannot {}", actor.role, action),
        })
    }
}

//! SeaORM repository implementations

use crate::contract::{
    Account, Activity, ActivityFilter, ActivityUpdate, Actor, ActorRef, AttendanceOutcome,
    Criterion, DeficiencyReport, EntityId, Faculty, NewActivity, NewDeficiencyReport,
    NewTrainingPoint, Participation, ReportFilter, RoleKind, Semester, TrainingPoint,
};
use crate::domain::ledger;
use crate::domain::service::Repositories;
use crate::domain::repository::{
    AccountRepository, ActivityRepository, DeficiencyReportRepository, ParticipationRepository,
    ProfileRepository, ReferenceRepository, RepositoryError, TrainingPointRepository,
};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection,
    DbErr, EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    SqlErr, TransactionTrait,
};
use std::sync::Arc;

use super::entity;

/// Map a constraint hit to [`RepositoryError::UniqueViolation`]
fn classify(err: DbErr) -> RepositoryError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => RepositoryError::UniqueViolation,
        _ => RepositoryError::Storage(err.into()),
    }
}

// ===== Profile Repositories =====

pub struct SeaOrmStudentRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmStudentRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProfileRepository for SeaOrmStudentRepository {
    fn role_kind(&self) -> RoleKind {
        RoleKind::Student
    }

    async fn find_by_id(&self, id: EntityId) -> Result<Option<Actor>> {
        let result = entity::student::Entity::find_by_id(id)
            .filter(entity::student::Column::IsActive.eq(true))
            .one(&*self.db)
            .await?;

        Ok(result.map(|e| Actor::Student(e.into())))
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Actor>> {
        let result = entity::student::Entity::find()
            .filter(entity::student::Column::Code.eq(code))
            .filter(entity::student::Column::IsActive.eq(true))
            .one(&*self.db)
            .await?;

        Ok(result.map(|e| Actor::Student(e.into())))
    }

    async fn find_by_account(&self, account_id: EntityId) -> Result<Option<Actor>> {
        let result = entity::student::Entity::find()
            .filter(entity::student::Column::AccountId.eq(account_id))
            .one(&*self.db)
            .await?;

        Ok(result.map(|e| Actor::Student(e.into())))
    }
}

/// Staff profiles of one role kind, stored in the shared `officers` table
pub struct SeaOrmOfficerRepository {
    db: Arc<DatabaseConnection>,
    kind: RoleKind,
}

impl SeaOrmOfficerRepository {
    pub fn new(db: Arc<DatabaseConnection>, kind: RoleKind) -> Self {
        Self { db, kind }
    }

    fn scoped(&self) -> sea_orm::Select<entity::officer::Entity> {
        entity::officer::Entity::find().filter(entity::officer::Column::Role.eq(self.kind.as_str()))
    }
}

#[async_trait]
impl ProfileRepository for SeaOrmOfficerRepository {
    fn role_kind(&self) -> RoleKind {
        self.kind
    }

    async fn find_by_id(&self, id: EntityId) -> Result<Option<Actor>> {
        self.scoped()
            .filter(entity::officer::Column::Id.eq(id))
            .filter(entity::officer::Column::IsActive.eq(true))
            .one(&*self.db)
            .await?
            .map(Actor::try_from)
            .transpose()
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Actor>> {
        self.scoped()
            .filter(entity::officer::Column::Code.eq(code))
            .filter(entity::officer::Column::IsActive.eq(true))
            .one(&*self.db)
            .await?
            .map(Actor::try_from)
            .transpose()
    }

    async fn find_by_account(&self, account_id: EntityId) -> Result<Option<Actor>> {
        self.scoped()
            .filter(entity::officer::Column::AccountId.eq(account_id))
            .one(&*self.db)
            .await?
            .map(Actor::try_from)
            .transpose()
    }
}

// ===== Account Repository =====

pub struct SeaOrmAccountRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmAccountRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AccountRepository for SeaOrmAccountRepository {
    async fn find(&self, account_id: EntityId) -> Result<Option<Account>> {
        entity::account::Entity::find_by_id(account_id)
            .one(&*self.db)
            .await?
            .map(Account::try_from)
            .transpose()
    }

    async fn provision(&self, email: &str, profile: ActorRef) -> Result<Option<Account>> {
        use sea_orm::ActiveValue::{NotSet, Set};

        let txn = self.db.begin().await?;
        let now = Utc::now();

        let account = entity::account::ActiveModel {
            id: NotSet,
            email: Set(email.to_string()),
            role: Set(Some(profile.role.as_str().to_string())),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        // Link only a profile that is still unbound
        let linked = match profile.role {
            RoleKind::Student => {
                entity::student::Entity::update_many()
                    .col_expr(entity::student::Column::AccountId, Expr::value(account.id))
                    .col_expr(entity::student::Column::UpdatedAt, Expr::value(now))
                    .filter(entity::student::Column::Id.eq(profile.actor_id))
                    .filter(entity::student::Column::AccountId.is_null())
                    .exec(&txn)
                    .await?
            }
            kind => {
                entity::officer::Entity::update_many()
                    .col_expr(entity::officer::Column::AccountId, Expr::value(account.id))
                    .col_expr(entity::officer::Column::UpdatedAt, Expr::value(now))
                    .filter(entity::officer::Column::Id.eq(profile.actor_id))
                    .filter(entity::officer::Column::Role.eq(kind.as_str()))
                    .filter(entity::officer::Column::AccountId.is_null())
                    .exec(&txn)
                    .await?
            }
        };

        if linked.rows_affected != 1 {
            txn.rollback().await?;
            return Ok(None);
        }

        txn.commit().await?;
        Ok(Some(account.try_into()?))
    }
}

// ===== Reference Repository =====

pub struct SeaOrmReferenceRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmReferenceRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ReferenceRepository for SeaOrmReferenceRepository {
    async fn find_faculty(&self, id: EntityId) -> Result<Option<Faculty>> {
        let result = entity::faculty::Entity::find_by_id(id)
            .filter(entity::faculty::Column::IsActive.eq(true))
            .one(&*self.db)
            .await?;
        Ok(result.map(|e| e.into()))
    }

    async fn find_semester(&self, id: EntityId) -> Result<Option<Semester>> {
        let result = entity::semester::Entity::find_by_id(id)
            .filter(entity::semester::Column::IsActive.eq(true))
            .one(&*self.db)
            .await?;
        Ok(result.map(|e| e.into()))
    }

    async fn find_criterion(&self, id: EntityId) -> Result<Option<Criterion>> {
        let result = entity::criterion::Entity::find_by_id(id)
            .filter(entity::criterion::Column::IsActive.eq(true))
            .one(&*self.db)
            .await?;
        Ok(result.map(|e| e.into()))
    }

    async fn list_criteria(&self) -> Result<Vec<Criterion>> {
        let results = entity::criterion::Entity::find()
            .order_by_asc(entity::criterion::Column::Id)
            .all(&*self.db)
            .await?;
        Ok(results.into_iter().map(|e| e.into()).collect())
    }
}

// ===== Activity Repository =====

pub struct SeaOrmActivityRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmActivityRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ActivityRepository for SeaOrmActivityRepository {
    async fn create(&self, data: &NewActivity, created_by: ActorRef) -> Result<Activity> {
        use sea_orm::ActiveValue::{NotSet, Set};

        let now = Utc::now();
        let model = entity::activity::ActiveModel {
            id: NotSet,
            name: Set(data.name.clone()),
            organizational_form: Set(data.organizational_form.code().to_string()),
            participant: Set(data.participant.clone()),
            start_date: Set(data.start_date),
            end_date: Set(data.end_date),
            location: Set(data.location.clone()),
            point: Set(data.point),
            description: Set(data.description.clone()),
            faculty_id: Set(data.faculty_id),
            semester_id: Set(data.semester_id),
            criterion_id: Set(data.criterion_id),
            created_by_type: Set(created_by.role.as_str().to_string()),
            created_by_id: Set(created_by.actor_id),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await?;

        model.try_into()
    }

    async fn find(&self, id: EntityId) -> Result<Option<Activity>> {
        entity::activity::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .map(Activity::try_from)
            .transpose()
    }

    async fn list(&self, filter: &ActivityFilter, limit: u64, offset: u64) -> Result<Vec<Activity>> {
        use entity::activity::Column;

        let mut condition = Condition::all();
        if !filter.include_inactive {
            condition = condition.add(Column::IsActive.eq(true));
        }
        if let Some(faculty_id) = filter.faculty_id {
            condition = condition.add(Column::FacultyId.eq(faculty_id));
        }
        if let Some(semester_id) = filter.semester_id {
            condition = condition.add(Column::SemesterId.eq(semester_id));
        }
        if let Some(criterion_id) = filter.criterion_id {
            condition = condition.add(Column::CriterionId.eq(criterion_id));
        }
        if let Some(creator) = filter.created_by {
            condition = condition
                .add(Column::CreatedByType.eq(creator.role.as_str()))
                .add(Column::CreatedById.eq(creator.actor_id));
        }

        entity::activity::Entity::find()
            .filter(condition)
            .order_by_desc(Column::StartDate)
            .order_by_desc(Column::Id)
            .limit(limit)
            .offset(offset)
            .all(&*self.db)
            .await?
            .into_iter()
            .map(Activity::try_from)
            .collect()
    }

    async fn update(&self, id: EntityId, update: &ActivityUpdate) -> Result<Option<Activity>> {
        use sea_orm::ActiveValue::Set;

        let Some(existing) = entity::activity::Entity::find_by_id(id).one(&*self.db).await? else {
            return Ok(None);
        };

        let mut active = existing.into_active_model();
        if let Some(name) = &update.name {
            active.name = Set(name.clone());
        }
        if let Some(form) = update.organizational_form {
            active.organizational_form = Set(form.code().to_string());
        }
        if let Some(participant) = &update.participant {
            active.participant = Set(participant.clone());
        }
        if let Some(start_date) = update.start_date {
            active.start_date = Set(start_date);
        }
        if let Some(end_date) = update.end_date {
            active.end_date = Set(end_date);
        }
        if let Some(location) = &update.location {
            active.location = Set(location.clone());
        }
        if let Some(description) = &update.description {
            active.description = Set(description.clone());
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(&*self.db).await?;
        Ok(Some(updated.try_into()?))
    }

    async fn deactivate(&self, id: EntityId) -> Result<bool> {
        let result = entity::activity::Entity::update_many()
            .col_expr(entity::activity::Column::IsActive, Expr::value(false))
            .col_expr(entity::activity::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(entity::activity::Column::Id.eq(id))
            .exec(&*self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    async fn delete(&self, id: EntityId) -> Result<bool> {
        let result = entity::activity::Entity::delete_by_id(id)
            .exec(&*self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }
}

// ===== Participation Repository =====

pub struct SeaOrmParticipationRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmParticipationRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ParticipationRepository for SeaOrmParticipationRepository {
    async fn insert(
        &self,
        student_id: EntityId,
        activity_id: EntityId,
    ) -> std::result::Result<Participation, RepositoryError> {
        use sea_orm::ActiveValue::{NotSet, Set};

        let now = Utc::now();
        let model = entity::participation::ActiveModel {
            id: NotSet,
            student_id: Set(student_id),
            activity_id: Set(activity_id),
            is_attendance: Set(false),
            is_point_added: Set(false),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await
        .map_err(classify)?;

        Ok(model.into())
    }

    async fn find_by_pair(
        &self,
        student_id: EntityId,
        activity_id: EntityId,
    ) -> Result<Option<Participation>> {
        let result = entity::participation::Entity::find()
            .filter(entity::participation::Column::StudentId.eq(student_id))
            .filter(entity::participation::Column::ActivityId.eq(activity_id))
            .one(&*self.db)
            .await?;

        Ok(result.map(|e| e.into()))
    }

    async fn list_by_activity(&self, activity_id: EntityId) -> Result<Vec<Participation>> {
        let results = entity::participation::Entity::find()
            .filter(entity::participation::Column::ActivityId.eq(activity_id))
            .filter(entity::participation::Column::IsActive.eq(true))
            .order_by_asc(entity::participation::Column::Id)
            .all(&*self.db)
            .await?;

        Ok(results.into_iter().map(|e| e.into()).collect())
    }

    async fn list_by_student(&self, student_id: EntityId) -> Result<Vec<Participation>> {
        let results = entity::participation::Entity::find()
            .filter(entity::participation::Column::StudentId.eq(student_id))
            .filter(entity::participation::Column::IsActive.eq(true))
            .order_by_asc(entity::participation::Column::Id)
            .all(&*self.db)
            .await?;

        Ok(results.into_iter().map(|e| e.into()).collect())
    }

    async fn count_active_by_activity(&self, activity_id: EntityId) -> Result<u64> {
        let count = entity::participation::Entity::find()
            .filter(entity::participation::Column::ActivityId.eq(activity_id))
            .filter(entity::participation::Column::IsActive.eq(true))
            .count(&*self.db)
            .await?;

        Ok(count)
    }

    async fn apply_attendance(
        &self,
        participation_id: EntityId,
        attended: bool,
    ) -> Result<Option<AttendanceOutcome>> {
        use entity::participation::Column;

        // Dropping the transaction without commit rolls every write back
        let txn = self.db.begin().await?;

        // Write before reading: the lock is taken up front (the database write
        // lock on SQLite, the row lock on Postgres), never upgraded from a read.
        let marked = entity::participation::Entity::update_many()
            .col_expr(Column::IsAttendance, Expr::value(attended))
            .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(Column::Id.eq(participation_id))
            .exec(&txn)
            .await?;
        if marked.rows_affected == 0 {
            return Ok(None);
        }

        let current: Participation = entity::participation::Entity::find_by_id(participation_id)
            .one(&txn)
            .await?
            .ok_or_else(|| anyhow!("participation {} vanished mid-transaction", participation_id))?
            .into();
        let transition = ledger::attendance_transition(&current, attended);

        let mut granted = None;
        if transition.grant_point {
            // Claim the credit; a concurrent writer that already claimed it
            // leaves zero rows to update here.
            let claimed = entity::participation::Entity::update_many()
                .col_expr(Column::IsPointAdded, Expr::value(true))
                .filter(Column::Id.eq(participation_id))
                .filter(Column::IsPointAdded.eq(false))
                .exec(&txn)
                .await?;

            if claimed.rows_affected == 1 {
                let activity: Activity = entity::activity::Entity::find_by_id(current.activity_id)
                    .one(&txn)
                    .await?
                    .ok_or_else(|| {
                        anyhow!(
                            "activity {} missing for participation {}",
                            current.activity_id,
                            participation_id
                        )
                    })?
                    .try_into()?;

                let entry = ledger::credit_for(&current, &activity);
                granted = Some(insert_training_point(&txn, &entry).await?);
            }
        }

        let participation = entity::participation::Entity::find_by_id(participation_id)
            .one(&txn)
            .await?
            .ok_or_else(|| anyhow!("participation {} vanished mid-transaction", participation_id))?;

        txn.commit().await?;

        Ok(Some(AttendanceOutcome {
            participation: participation.into(),
            granted,
        }))
    }
}

// ===== Training Point Repository =====

/// Append one ledger row on any connection or open transaction
async fn insert_training_point<C: ConnectionTrait>(
    conn: &C,
    entry: &NewTrainingPoint,
) -> Result<TrainingPoint> {
    use sea_orm::ActiveValue::{NotSet, Set};

    let now = Utc::now();
    let model = entity::training_point::ActiveModel {
        id: NotSet,
        point: Set(entry.point),
        semester_id: Set(entry.semester_id),
        criterion_id: Set(entry.criterion_id),
        student_id: Set(entry.student_id),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await?;

    Ok(model.into())
}

pub struct SeaOrmTrainingPointRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmTrainingPointRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TrainingPointRepository for SeaOrmTrainingPointRepository {
    async fn grant(&self, entry: &NewTrainingPoint) -> Result<TrainingPoint> {
        insert_training_point(&*self.db, entry).await
    }

    async fn list_for_student(
        &self,
        student_id: EntityId,
        semester_id: Option<EntityId>,
    ) -> Result<Vec<TrainingPoint>> {
        let mut query = entity::training_point::Entity::find()
            .filter(entity::training_point::Column::StudentId.eq(student_id))
            .filter(entity::training_point::Column::IsActive.eq(true));

        if let Some(sid) = semester_id {
            query = query.filter(entity::training_point::Column::SemesterId.eq(sid));
        }

        let results = query
            .order_by_asc(entity::training_point::Column::Id)
            .all(&*self.db)
            .await?;

        Ok(results.into_iter().map(|e| e.into()).collect())
    }

    async fn sum_for_student_in_semester(
        &self,
        student_id: EntityId,
        semester_id: EntityId,
    ) -> Result<i64> {
        let total: Option<Option<i64>> = entity::training_point::Entity::find()
            .select_only()
            .column_as(Expr::col(entity::training_point::Column::Point).sum(), "total")
            .filter(entity::training_point::Column::StudentId.eq(student_id))
            .filter(entity::training_point::Column::SemesterId.eq(semester_id))
            .filter(entity::training_point::Column::IsActive.eq(true))
            .into_tuple()
            .one(&*self.db)
            .await?;

        Ok(total.flatten().unwrap_or(0))
    }
}

// ===== Deficiency Report Repository =====

pub struct SeaOrmDeficiencyReportRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmDeficiencyReportRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DeficiencyReportRepository for SeaOrmDeficiencyReportRepository {
    async fn insert(
        &self,
        report: &NewDeficiencyReport,
    ) -> std::result::Result<DeficiencyReport, RepositoryError> {
        use sea_orm::ActiveValue::{NotSet, Set};

        let now = Utc::now();
        let model = entity::deficiency_report::ActiveModel {
            id: NotSet,
            student_id: Set(report.student_id),
            activity_id: Set(report.activity_id),
            is_resolved: Set(false),
            image: Set(report.image.clone()),
            content: Set(report.content.clone()),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await
        .map_err(classify)?;

        Ok(model.into())
    }

    async fn find(&self, id: EntityId) -> Result<Option<DeficiencyReport>> {
        let result = entity::deficiency_report::Entity::find_by_id(id)
            .one(&*self.db)
            .await?;

        Ok(result.map(|e| e.into()))
    }

    async fn list(&self, filter: &ReportFilter) -> Result<Vec<DeficiencyReport>> {
        use entity::deficiency_report::Column;

        let mut query = entity::deficiency_report::Entity::find().filter(Column::IsActive.eq(true));

        if let Some(student_id) = filter.student_id {
            query = query.filter(Column::StudentId.eq(student_id));
        }
        if let Some(activity_id) = filter.activity_id {
            query = query.filter(Column::ActivityId.eq(activity_id));
        }
        if let Some(is_resolved) = filter.is_resolved {
            query = query.filter(Column::IsResolved.eq(is_resolved));
        }

        let results = query.order_by_asc(Column::Id).all(&*self.db).await?;

        Ok(results.into_iter().map(|e| e.into()).collect())
    }

    async fn mark_resolved(&self, id: EntityId) -> Result<Option<DeficiencyReport>> {
        let result = entity::deficiency_report::Entity::update_many()
            .col_expr(entity::deficiency_report::Column::IsResolved, Expr::value(true))
            .col_expr(entity::deficiency_report::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(entity::deficiency_report::Column::Id.eq(id))
            .exec(&*self.db)
            .await?;

        if result.rows_affected == 0 {
            return Ok(None);
        }

        self.find(id).await
    }
}

// ===== Wiring =====

/// Build every repository the service needs on one connection pool
pub fn repositories(db: Arc<DatabaseConnection>) -> Repositories {
    let profiles: Vec<Arc<dyn ProfileRepository>> = vec![
        Arc::new(SeaOrmStudentRepository::new(db.clone())),
        Arc::new(SeaOrmOfficerRepository::new(db.clone(), RoleKind::Specialist)),
        Arc::new(SeaOrmOfficerRepository::new(db.clone(), RoleKind::Assistant)),
        Arc::new(SeaOrmOfficerRepository::new(db.clone(), RoleKind::Administrator)),
    ];

    Repositories {
        accounts: Arc::new(SeaOrmAccountRepository::new(db.clone())),
        profiles,
        references: Arc::new(SeaOrmReferenceRepository::new(db.clone())),
        activities: Arc::new(SeaOrmActivityRepository::new(db.clone())),
        participations: Arc::new(SeaOrmParticipationRepository::new(db.clone())),
        training_points: Arc::new(SeaOrmTrainingPointRepository::new(db.clone())),
        reports: Arc::new(SeaOrmDeficiencyReportRepository::new(db)),
    }
}

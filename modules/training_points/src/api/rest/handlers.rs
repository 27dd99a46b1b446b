//! HTTP request handlers - thin layer that delegates to domain service

use super::actor::ActingActor;
use super::{dto::*, error::Problem};
use crate::contract::{
    ActivityFilter, ActivityUpdate, ActorRef, NewActivity, NewDeficiencyReport, ReportFilter,
    RoleKind, TrainingPointsError,
};
use crate::domain::Service;
use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use std::sync::Arc;

// ===== Account Handlers =====

/// Create an account and bind it to the profile owning the key
pub async fn provision_account(
    Extension(service): Extension<Arc<Service>>,
    Json(req): Json<ProvisionAccountRequest>,
) -> Result<(StatusCode, Json<AccountDto>), Problem> {
    let account = service.provision_account(req.into()).await?;
    Ok((StatusCode::CREATED, Json(account.into())))
}

/// Role kind and profile bound to an account
pub async fn get_account_profile(
    Extension(service): Extension<Arc<Service>>,
    Path(account_id): Path<i64>,
) -> Result<Json<AccountProfileDto>, Problem> {
    let role = service.role_kind_of(account_id).await?;
    let profile = service.account_profile(account_id).await?;

    Ok(Json(AccountProfileDto {
        account_id,
        role: role.map(|r| r.as_str().to_string()),
        profile: profile.map(Into::into),
    }))
}

// ===== Activity Handlers =====

/// Query parameters for listing activities
#[derive(Debug, Default, Deserialize)]
pub struct ListActivitiesQuery {
    pub faculty_id: Option<i64>,
    pub semester_id: Option<i64>,
    pub criterion_id: Option<i64>,
    /// Creator role kind; only applied together with `created_by_id`
    pub created_by_type: Option<String>,
    pub created_by_id: Option<i64>,
    #[serde(default)]
    pub include_inactive: bool,
    pub limit: Option<u64>,
    #[serde(default)]
    pub offset: u64,
}

impl ListActivitiesQuery {
    fn filter(&self) -> Result<ActivityFilter, TrainingPointsError> {
        let created_by = match (&self.created_by_type, self.created_by_id) {
            (Some(kind), Some(id)) => {
                let role = RoleKind::parse(kind).ok_or_else(|| {
                    TrainingPointsError::validation(format!("unknown role kind '{}'", kind))
                })?;
                Some(ActorRef::new(role, id))
            }
            _ => None,
        };

        Ok(ActivityFilter {
            faculty_id: self.faculty_id,
            semester_id: self.semester_id,
            criterion_id: self.criterion_id,
            created_by,
            include_inactive: self.include_inactive,
        })
    }
}

pub async fn list_activities(
    Extension(service): Extension<Arc<Service>>,
    Query(query): Query<ListActivitiesQuery>,
) -> Result<Json<ActivityListResponse>, Problem> {
    let activities = service
        .list_activities(query.filter()?, query.limit, query.offset)
        .await?;

    let items: Vec<ActivityDto> = activities.into_iter().map(Into::into).collect();
    let total = items.len();

    Ok(Json(ActivityListResponse { items, total }))
}

/// Create an activity owned by the acting actor
pub async fn create_activity(
    Extension(service): Extension<Arc<Service>>,
    ActingActor(actor): ActingActor,
    Json(req): Json<CreateActivityRequest>,
) -> Result<(StatusCode, Json<ActivityDto>), Problem> {
    let data = NewActivity::try_from(req)?;
    let activity = service.create_activity(data, actor).await?;
    Ok((StatusCode::CREATED, Json(activity.into())))
}

pub async fn get_activity(
    Extension(service): Extension<Arc<Service>>,
    Path(activity_id): Path<i64>,
) -> Result<Json<ActivityDto>, Problem> {
    let activity = service.get_activity(activity_id).await?;
    Ok(Json(activity.into()))
}

pub async fn update_activity(
    Extension(service): Extension<Arc<Service>>,
    ActingActor(actor): ActingActor,
    Path(activity_id): Path<i64>,
    Json(req): Json<UpdateActivityRequest>,
) -> Result<Json<ActivityDto>, Problem> {
    let update = ActivityUpdate::try_from(req)?;
    let activity = service.update_activity(activity_id, update, actor).await?;
    Ok(Json(activity.into()))
}

pub async fn deactivate_activity(
    Extension(service): Extension<Arc<Service>>,
    ActingActor(actor): ActingActor,
    Path(activity_id): Path<i64>,
) -> Result<StatusCode, Problem> {
    service.deactivate_activity(activity_id, actor).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_activity(
    Extension(service): Extension<Arc<Service>>,
    ActingActor(actor): ActingActor,
    Path(activity_id): Path<i64>,
) -> Result<StatusCode, Problem> {
    service.delete_activity(activity_id, actor).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Expand the activity's creator into a role-appropriate summary
pub async fn get_activity_creator(
    Extension(service): Extension<Arc<Service>>,
    Path(activity_id): Path<i64>,
) -> Result<Json<ActorSummaryDto>, Problem> {
    let activity = service.get_activity(activity_id).await?;
    let creator = service.expand_creator(activity.created_by).await?;
    Ok(Json(creator.into()))
}

// ===== Participation Handlers =====

/// Register the acting student for an activity
pub async fn register(
    Extension(service): Extension<Arc<Service>>,
    actor: ActingActor,
    Path(activity_id): Path<i64>,
) -> Result<(StatusCode, Json<ParticipationDto>), Problem> {
    let student_id = actor.student_id("register for activities")?;
    let participation = service.register(student_id, activity_id).await?;
    Ok((StatusCode::CREATED, Json(participation.into())))
}

pub async fn mark_attendance(
    Extension(service): Extension<Arc<Service>>,
    ActingActor(actor): ActingActor,
    Path((activity_id, student_id)): Path<(i64, i64)>,
    Json(req): Json<MarkAttendanceRequest>,
) -> Result<Json<AttendanceDto>, Problem> {
    let outcome = service
        .mark_attendance(student_id, activity_id, req.attended, actor)
        .await?;
    Ok(Json(outcome.into()))
}

pub async fn list_participants(
    Extension(service): Extension<Arc<Service>>,
    Path(activity_id): Path<i64>,
) -> Result<Json<ParticipationListResponse>, Problem> {
    let participations = service.list_participants(activity_id).await?;

    let items: Vec<ParticipationDto> = participations.into_iter().map(Into::into).collect();
    let total = items.len();

    Ok(Json(ParticipationListResponse { items, total }))
}

pub async fn list_participations(
    Extension(service): Extension<Arc<Service>>,
    Path(student_id): Path<i64>,
) -> Result<Json<ParticipationListResponse>, Problem> {
    let participations = service.list_participations(student_id).await?;

    let items: Vec<ParticipationDto> = participations.into_iter().map(Into::into).collect();
    let total = items.len();

    Ok(Json(ParticipationListResponse { items, total }))
}

// ===== Training Point Handlers =====

#[derive(Debug, Default, Deserialize)]
pub struct TrainingPointsQuery {
    pub semester_id: Option<i64>,
}

pub async fn list_training_points(
    Extension(service): Extension<Arc<Service>>,
    Path(student_id): Path<i64>,
    Query(query): Query<TrainingPointsQuery>,
) -> Result<Json<TrainingPointListResponse>, Problem> {
    let entries = service
        .list_training_points(student_id, query.semester_id)
        .await?;

    let items: Vec<TrainingPointDto> = entries.into_iter().map(Into::into).collect();
    let total = items.len();

    Ok(Json(TrainingPointListResponse { items, total }))
}

pub async fn get_semester_total(
    Extension(service): Extension<Arc<Service>>,
    Path((student_id, semester_id)): Path<(i64, i64)>,
) -> Result<Json<PointTotalDto>, Problem> {
    let total = service
        .sum_for_student_in_semester(student_id, semester_id)
        .await?;

    Ok(Json(PointTotalDto {
        student_id,
        semester_id,
        total,
    }))
}

pub async fn get_semester_report(
    Extension(service): Extension<Arc<Service>>,
    Path((student_id, semester_id)): Path<(i64, i64)>,
) -> Result<Json<SemesterReportDto>, Problem> {
    let report = service.semester_report(student_id, semester_id).await?;
    Ok(Json(report.into()))
}

// ===== Deficiency Report Handlers =====

/// File a report for an activity as the acting student
pub async fn file_report(
    Extension(service): Extension<Arc<Service>>,
    actor: ActingActor,
    Path(activity_id): Path<i64>,
    Json(req): Json<FileReportRequest>,
) -> Result<(StatusCode, Json<DeficiencyReportDto>), Problem> {
    let student_id = actor.student_id("file deficiency reports")?;
    let report = service
        .file_report(NewDeficiencyReport {
            student_id,
            activity_id,
            image: req.image,
            content: req.content,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(report.into())))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListReportsQuery {
    pub student_id: Option<i64>,
    pub activity_id: Option<i64>,
    pub is_resolved: Option<bool>,
}

pub async fn list_reports(
    Extension(service): Extension<Arc<Service>>,
    Query(query): Query<ListReportsQuery>,
) -> Result<Json<DeficiencyReportListResponse>, Problem> {
    let reports = service
        .list_reports(ReportFilter {
            student_id: query.student_id,
            activity_id: query.activity_id,
            is_resolved: query.is_resolved,
        })
        .await?;

    let items: Vec<DeficiencyReportDto> = reports.into_iter().map(Into::into).collect();
    let total = items.len();

    Ok(Json(DeficiencyReportListResponse { items, total }))
}

pub async fn get_report(
    Extension(service): Extension<Arc<Service>>,
    Path(report_id): Path<i64>,
) -> Result<Json<DeficiencyReportDto>, Problem> {
    let report = service.get_report(report_id).await?;
    Ok(Json(report.into()))
}

pub async fn resolve_report(
    Extension(service): Extension<Arc<Service>>,
    ActingActor(actor): ActingActor,
    Path(report_id): Path<i64>,
) -> Result<Json<DeficiencyReportDto>, Problem> {
    let report = service.resolve_report(report_id, actor).await?;
    Ok(Json(report.into()))
}

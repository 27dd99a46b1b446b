//! REST DTOs with serde derives for HTTP API

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ===== Account DTOs =====

/// Account provisioning request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ProvisionAccountRequest {
    #[schema(example = "student@uni.edu.vn")]
    pub email: String,

    /// Student or staff code of an existing profile
    #[schema(example = "B20DCCN001")]
    pub key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccountDto {
    pub id: i64,
    pub email: String,
    /// Role kind of the bound profile
    #[schema(example = "student")]
    pub role: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Role binding of an account
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccountProfileDto {
    pub account_id: i64,
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<ActorSummaryDto>,
}

// ===== Actor DTOs =====

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ActorSummaryDto {
    #[schema(example = "specialist")]
    pub role: String,
    pub id: i64,
    pub code: String,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub faculty_id: Option<i64>,

    // Student fields
    #[serde(skip_serializing_if = "Option::is_none")]
    pub major: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub academic_year: Option<String>,

    // Specialist fields
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub academic_degree: Option<String>,
}

// ===== Activity DTOs =====

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ActivityDto {
    pub id: i64,
    pub name: String,
    /// "Onl" or "Off"
    #[schema(example = "Off")]
    pub organizational_form: String,
    pub participant: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub location: String,
    pub point: i32,
    pub description: String,
    pub faculty_id: i64,
    pub semester_id: i64,
    pub criterion_id: Option<i64>,
    pub created_by_type: String,
    pub created_by_id: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Activity creation request; the creator is the acting actor
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateActivityRequest {
    #[schema(example = "Green Sunday")]
    pub name: String,
    #[serde(default = "default_form")]
    #[schema(example = "Off")]
    pub organizational_form: String,
    #[serde(default)]
    pub participant: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub location: String,
    #[schema(example = 5)]
    pub point: i32,
    #[serde(default)]
    pub description: String,
    pub faculty_id: i64,
    pub semester_id: i64,
    #[serde(default)]
    pub criterion_id: Option<i64>,
}

fn default_form() -> String {
    "Off".to_string()
}

/// Schedule and metadata changes; omitted fields stay as they are
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateActivityRequest {
    pub name: Option<String>,
    pub organizational_form: Option<String>,
    pub participant: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub location: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ActivityListResponse {
    pub items: Vec<ActivityDto>,
    /// Number of items in this page
    pub total: usize,
}

// ===== Participation DTOs =====

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ParticipationDto {
    pub id: i64,
    pub student_id: i64,
    pub activity_id: i64,
    pub is_attendance: bool,
    pub is_point_added: bool,
    /// registered, attended or credited
    #[schema(example = "credited")]
    pub state: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ParticipationListResponse {
    pub items: Vec<ParticipationDto>,
    pub total: usize,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct MarkAttendanceRequest {
    pub attended: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttendanceDto {
    pub participation: ParticipationDto,
    /// Entry minted by this request, if it performed the credit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub granted: Option<TrainingPointDto>,
}

// ===== Training Point DTOs =====

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TrainingPointDto {
    pub id: i64,
    pub point: i32,
    pub semester_id: i64,
    pub criterion_id: Option<i64>,
    pub student_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TrainingPointListResponse {
    pub items: Vec<TrainingPointDto>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PointTotalDto {
    pub student_id: i64,
    pub semester_id: i64,
    pub total: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CriterionTallyDto {
    pub criterion_id: Option<i64>,
    pub name: Option<String>,
    pub earned: i64,
    pub max_point: Option<i32>,
    /// Earned points capped at `max_point`
    pub credited: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SemesterReportDto {
    pub student_id: i64,
    pub semester_id: i64,
    pub total: i64,
    pub credited_total: i64,
    pub criteria: Vec<CriterionTallyDto>,
}

// ===== Deficiency Report DTOs =====

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeficiencyReportDto {
    pub id: i64,
    pub student_id: i64,
    pub activity_id: i64,
    pub is_resolved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Report filed by the acting student
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct FileReportRequest {
    /// Evidence handle (URL or storage key)
    pub image: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DeficiencyReportListResponse {
    pub items: Vec<DeficiencyReportDto>,
    pub total: usize,
}

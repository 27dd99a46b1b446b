//! Mapper implementations for converting between DTOs and contract models

use super::dto::*;
use crate::contract::{self, ActorDetails, OrganizationalForm, ParticipationState, TrainingPointsError};

fn parse_form(code: &str) -> Result<OrganizationalForm, TrainingPointsError> {
    OrganizationalForm::from_code(code).ok_or_else(|| {
        TrainingPointsError::validation(format!(
            "organizational_form must be 'Onl' or 'Off', got '{}'",
            code
        ))
    })
}

// ===== Account conversions =====

impl From<contract::Account> for AccountDto {
    fn from(account: contract::Account) -> Self {
        Self {
            id: account.id,
            email: account.email,
            role: account.role.map(|r| r.as_str().to_string()),
            is_active: account.is_active,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

impl From<ProvisionAccountRequest> for contract::NewAccount {
    fn from(req: ProvisionAccountRequest) -> Self {
        Self {
            email: req.email,
            key: req.key,
        }
    }
}

impl From<contract::ActorSummary> for ActorSummaryDto {
    fn from(summary: contract::ActorSummary) -> Self {
        let mut dto = Self {
            role: summary.role.as_str().to_string(),
            id: summary.id,
            code: summary.code,
            full_name: summary.full_name,
            faculty_id: summary.faculty_id,
            major: None,
            class_name: None,
            academic_year: None,
            job_title: None,
            academic_degree: None,
        };

        match summary.details {
            ActorDetails::Student {
                major,
                class_name,
                academic_year,
            } => {
                dto.major = major;
                dto.class_name = class_name;
                dto.academic_year = academic_year;
            }
            ActorDetails::Specialist {
                job_title,
                academic_degree,
            } => {
                dto.job_title = job_title;
                dto.academic_degree = academic_degree;
            }
            ActorDetails::Officer => {}
        }
        dto
    }
}

// ===== Activity conversions =====

impl From<contract::Activity> for ActivityDto {
    fn from(activity: contract::Activity) -> Self {
        Self {
            id: activity.id,
            name: activity.name,
            organizational_form: activity.organizational_form.code().to_string(),
            participant: activity.participant,
            start_date: activity.start_date,
            end_date: activity.end_date,
            location: activity.location,
            point: activity.point,
            description: activity.description,
            faculty_id: activity.faculty_id,
            semester_id: activity.semester_id,
            criterion_id: activity.criterion_id,
            created_by_type: activity.created_by.role.as_str().to_string(),
            created_by_id: activity.created_by.actor_id,
            is_active: activity.is_active,
            created_at: activity.created_at,
            updated_at: activity.updated_at,
        }
    }
}

impl TryFrom<CreateActivityRequest> for contract::NewActivity {
    type Error = TrainingPointsError;

    fn try_from(req: CreateActivityRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            name: req.name,
            organizational_form: parse_form(&req.organizational_form)?,
            participant: req.participant,
            start_date: req.start_date,
            end_date: req.end_date,
            location: req.location,
            point: req.point,
            description: req.description,
            faculty_id: req.faculty_id,
            semester_id: req.semester_id,
            criterion_id: req.criterion_id,
        })
    }
}

impl TryFrom<UpdateActivityRequest> for contract::ActivityUpdate {
    type Error = TrainingPointsError;

    fn try_from(req: UpdateActivityRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            name: req.name,
            organizational_form: req.organizational_form.as_deref().map(parse_form).transpose()?,
            participant: req.participant,
            start_date: req.start_date,
            end_date: req.end_date,
            location: req.location,
            description: req.description,
        })
    }
}

// ===== Participation conversions =====

impl From<contract::Participation> for ParticipationDto {
    fn from(participation: contract::Participation) -> Self {
        let state = match participation.state() {
            ParticipationState::Registered => "registered",
            ParticipationState::Attended => "attended",
            ParticipationState::Credited => "credited",
        };
        Self {
            id: participation.id,
            student_id: participation.student_id,
            activity_id: participation.activity_id,
            is_attendance: participation.is_attendance,
            is_point_added: participation.is_point_added,
            state: state.to_string(),
            created_at: participation.created_at,
            updated_at: participation.updated_at,
        }
    }
}

impl From<contract::AttendanceOutcome> for AttendanceDto {
    fn from(outcome: contract::AttendanceOutcome) -> Self {
        Self {
            participation: outcome.participation.into(),
            granted: outcome.granted.map(Into::into),
        }
    }
}

// ===== Training point conversions =====

impl From<contract::TrainingPoint> for TrainingPointDto {
    fn from(entry: contract::TrainingPoint) -> Self {
        Self {
            id: entry.id,
            point: entry.point,
            semester_id: entry.semester_id,
            criterion_id: entry.criterion_id,
            student_id: entry.student_id,
            created_at: entry.created_at,
        }
    }
}

impl From<contract::SemesterReport> for SemesterReportDto {
    fn from(report: contract::SemesterReport) -> Self {
        Self {
            student_id: report.student_id,
            semester_id: report.semester_id,
            total: report.total,
            credited_total: report.credited_total,
            criteria: report
                .criteria
                .into_iter()
                .map(|t| CriterionTallyDto {
                    criterion_id: t.criterion_id,
                    name: t.name,
                    earned: t.earned,
                    max_point: t.max_point,
                    credited: t.credited,
                })
                .collect(),
        }
    }
}

// ===== Deficiency report conversions =====

impl From<contract::DeficiencyReport> for DeficiencyReportDto {
    fn from(report: contract::DeficiencyReport) -> Self {
        Self {
            id: report.id,
            student_id: report.student_id,
            activity_id: report.activity_id,
            is_resolved: report.is_resolved,
            image: report.image,
            content: report.content,
            created_at: report.created_at,
            updated_at: report.updated_at,
        }
    }
}

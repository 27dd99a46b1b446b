//! Entity to model mappers
//!
//! Conversions between SeaORM entities and contract models

use super::entity;
use crate::contract::{
    Account, Activity, Actor, ActorRef, Criterion, DeficiencyReport, Faculty, Officer,
    OrganizationalForm, Participation, PersonalInfo, RoleKind, Semester, Student, TrainingPoint,
};
use anyhow::{anyhow, Result};

fn parse_role(value: &str) -> Result<RoleKind> {
    RoleKind::parse(value).ok_or_else(|| anyhow!("unknown role kind '{}'", value))
}

// ===== Reference data =====

impl From<entity::faculty::Model> for Faculty {
    fn from(entity: entity::faculty::Model) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
        }
    }
}

impl From<entity::semester::Model> for Semester {
    fn from(entity: entity::semester::Model) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            start_date: entity.start_date,
            end_date: entity.end_date,
        }
    }
}

impl From<entity::criterion::Model> for Criterion {
    fn from(entity: entity::criterion::Model) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            max_point: entity.max_point,
        }
    }
}

// ===== Actors =====

impl From<entity::student::Model> for Student {
    fn from(entity: entity::student::Model) -> Self {
        Self {
            id: entity.id,
            code: entity.code,
            info: PersonalInfo {
                first_name: entity.first_name,
                middle_name: entity.middle_name,
                last_name: entity.last_name,
                gender: entity.gender,
                date_of_birth: entity.date_of_birth,
                faculty_id: entity.faculty_id,
                address: entity.address,
                phone_number: entity.phone_number,
            },
            major: entity.major,
            class_name: entity.class_name,
            academic_year: entity.academic_year,
            educational_system: entity.educational_system,
            account_id: entity.account_id,
        }
    }
}

impl TryFrom<entity::officer::Model> for Actor {
    type Error = anyhow::Error;

    fn try_from(entity: entity::officer::Model) -> Result<Self> {
        let role = parse_role(&entity.role)?;
        let officer = Officer {
            id: entity.id,
            code: entity.code,
            info: PersonalInfo {
                first_name: entity.first_name,
                middle_name: entity.middle_name,
                last_name: entity.last_name,
                gender: entity.gender,
                date_of_birth: entity.date_of_birth,
                faculty_id: entity.faculty_id,
                address: entity.address,
                phone_number: entity.phone_number,
            },
            job_title: entity.job_title,
            academic_degree: entity.academic_degree,
            account_id: entity.account_id,
        };

        match role {
            RoleKind::Specialist => Ok(Actor::Specialist(officer)),
            RoleKind::Assistant => Ok(Actor::Assistant(officer)),
            RoleKind::Administrator => Ok(Actor::Administrator(officer)),
            RoleKind::Student => Err(anyhow!("officer {} is tagged as a student", officer.id)),
        }
    }
}

impl TryFrom<entity::account::Model> for Account {
    type Error = anyhow::Error;

    fn try_from(entity: entity::account::Model) -> Result<Self> {
        Ok(Self {
            id: entity.id,
            email: entity.email,
            role: entity.role.as_deref().map(parse_role).transpose()?,
            is_active: entity.is_active,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        })
    }
}

// ===== Activities =====

impl TryFrom<entity::activity::Model> for Activity {
    type Error = anyhow::Error;

    fn try_from(entity: entity::activity::Model) -> Result<Self> {
        let organizational_form = OrganizationalForm::from_code(&entity.organizational_form)
            .ok_or_else(|| anyhow!("unknown organizational form '{}'", entity.organizational_form))?;

        Ok(Self {
            id: entity.id,
            name: entity.name,
            organizational_form,
            participant: entity.participant,
            start_date: entity.start_date,
            end_date: entity.end_date,
            location: entity.location,
            point: entity.point,
            description: entity.description,
            faculty_id: entity.faculty_id,
            semester_id: entity.semester_id,
            criterion_id: entity.criterion_id,
            created_by: ActorRef::new(parse_role(&entity.created_by_type)?, entity.created_by_id),
            is_active: entity.is_active,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        })
    }
}

// ===== Ledger rows =====

impl From<entity::participation::Model> for Participation {
    fn from(entity: entity::participation::Model) -> Self {
        Self {
            id: entity.id,
            student_id: entity.student_id,
            activity_id: entity.activity_id,
            is_attendance: entity.is_attendance,
            is_point_added: entity.is_point_added,
            is_active: entity.is_active,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

impl From<entity::training_point::Model> for TrainingPoint {
    fn from(entity: entity::training_point::Model) -> Self {
        Self {
            id: entity.id,
            point: entity.point,
            semester_id: entity.semester_id,
            criterion_id: entity.criterion_id,
            student_id: entity.student_id,
            is_active: entity.is_active,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

impl From<entity::deficiency_report::Model> for DeficiencyReport {
    fn from(entity: entity::deficiency_report::Model) -> Self {
        Self {
            id: entity.id,
            student_id: entity.student_id,
            activity_id: entity.activity_id,
            is_resolved: entity.is_resolved,
            image: entity.image,
            content: entity.content,
            is_active: entity.is_active,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

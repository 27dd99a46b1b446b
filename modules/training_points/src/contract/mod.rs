//! Contract layer - public API for inter-module communication
//!
//! This layer contains transport-agnostic models and the native client trait.
//! NO serde derives on models - these are pure domain types.

pub mod client;
pub mod error;
pub mod model;

pub use client::TrainingPointsApi;
pub use error::TrainingPointsError;
pub use model::{
    Account, Activity, ActivityFilter, ActivityUpdate, Actor, ActorDetails, ActorRef,
    ActorSummary, AttendanceOutcome, Criterion, CriterionTally, DeficiencyReport, EntityId,
    Faculty, NewAccount, NewActivity, NewDeficiencyReport, NewTrainingPoint, Officer,
    OrganizationalForm, Participation, ParticipationState, PersonalInfo, ReportFilter, RoleKind,
    Semester, SemesterReport, Student, TrainingPoint,
};

//! Training Points Module
//!
//! Tracks student participation in extracurricular activities and accrues
//! training points when attendance is confirmed. Students file deficiency
//! reports when a credit is missing; staff resolve them.

// Public exports
pub mod contract;
pub use contract::{
    client::TrainingPointsApi, error::TrainingPointsError, Activity, ActorRef, ActorSummary,
    AttendanceOutcome, DeficiencyReport, Participation, RoleKind, TrainingPoint,
};

pub mod module;
pub use module::TrainingPointsModule;

pub mod config;
pub use config::Config;

// Internal modules (hidden from public API)
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;

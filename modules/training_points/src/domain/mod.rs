//! Domain layer - business logic and services

pub mod directory;
pub mod ledger;
pub mod repository;
pub mod service;
pub mod validation;

pub use directory::ActorDirectory;
pub use repository::{
    AccountRepository, ActivityRepository, DeficiencyReportRepository, ParticipationRepository,
    ProfileRepository, ReferenceRepository, RepositoryError, TrainingPointRepository,
};
pub use service::{Paging, Repositories, Service};

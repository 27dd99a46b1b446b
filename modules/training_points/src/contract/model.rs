//! Contract models for the training points module
//!
//! These models are transport-agnostic and used for inter-module communication.
//! NO serde derives - these are pure domain models.

use chrono::{DateTime, NaiveDate, Utc};

/// Surrogate identifier shared by every persisted entity
pub type EntityId = i64;

// ===== Actors =====

/// Closed set of role profiles an account can be bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RoleKind {
    Student,
    Specialist,
    Assistant,
    Administrator,
}

impl RoleKind {
    /// Every role kind, in key resolution order
    pub const ALL: [RoleKind; 4] = [
        RoleKind::Student,
        RoleKind::Specialist,
        RoleKind::Assistant,
        RoleKind::Administrator,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RoleKind::Student => "student",
            RoleKind::Specialist => "specialist",
            RoleKind::Assistant => "assistant",
            RoleKind::Administrator => "administrator",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "student" => Some(RoleKind::Student),
            "specialist" => Some(RoleKind::Specialist),
            "assistant" => Some(RoleKind::Assistant),
            "administrator" => Some(RoleKind::Administrator),
            _ => None,
        }
    }

    /// Staff roles may mark attendance and resolve deficiency reports
    pub fn is_authority(self) -> bool {
        !matches!(self, RoleKind::Student)
    }
}

impl std::fmt::Display for RoleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Polymorphic reference to an actor: which profile table, and which row in it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActorRef {
    pub role: RoleKind,
    pub actor_id: EntityId,
}

impl ActorRef {
    pub fn new(role: RoleKind, actor_id: EntityId) -> Self {
        Self { role, actor_id }
    }
}

/// Attributes shared by every profile
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PersonalInfo {
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub gender: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub faculty_id: Option<EntityId>,
    pub address: Option<String>,
    pub phone_number: Option<String>,
}

impl PersonalInfo {
    /// Family name first, the way names are printed on institutional records
    pub fn full_name(&self) -> String {
        [
            Some(self.last_name.as_str()),
            self.middle_name.as_deref(),
            Some(self.first_name.as_str()),
        ]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
    }
}

/// Student profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Student {
    pub id: EntityId,
    /// Student code, used as the external key at provisioning time
    pub code: String,
    pub info: PersonalInfo,
    pub major: Option<String>,
    pub class_name: Option<String>,
    pub academic_year: Option<String>,
    pub educational_system: Option<String>,
    pub account_id: Option<EntityId>,
}

/// Staff profile (specialist, assistant or administrator)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Officer {
    pub id: EntityId,
    /// Staff code, used as the external key at provisioning time
    pub code: String,
    pub info: PersonalInfo,
    /// Only populated for specialists
    pub job_title: Option<String>,
    /// Only populated for specialists
    pub academic_degree: Option<String>,
    pub account_id: Option<EntityId>,
}

/// Exactly one of the four role profiles
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
    Student(Student),
    Specialist(Officer),
    Assistant(Officer),
    Administrator(Officer),
}

impl Actor {
    pub fn role_kind(&self) -> RoleKind {
        match self {
            Actor::Student(_) => RoleKind::Student,
            Actor::Specialist(_) => RoleKind::Specialist,
            Actor::Assistant(_) => RoleKind::Assistant,
            Actor::Administrator(_) => RoleKind::Administrator,
        }
    }

    pub fn id(&self) -> EntityId {
        match self {
            Actor::Student(s) => s.id,
            Actor::Specialist(o) | Actor::Assistant(o) | Actor::Administrator(o) => o.id,
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Actor::Student(s) => &s.code,
            Actor::Specialist(o) | Actor::Assistant(o) | Actor::Administrator(o) => &o.code,
        }
    }

    pub fn info(&self) -> &PersonalInfo {
        match self {
            Actor::Student(s) => &s.info,
            Actor::Specialist(o) | Actor::Assistant(o) | Actor::Administrator(o) => &o.info,
        }
    }

    pub fn account_id(&self) -> Option<EntityId> {
        match self {
            Actor::Student(s) => s.account_id,
            Actor::Specialist(o) | Actor::Assistant(o) | Actor::Administrator(o) => o.account_id,
        }
    }

    pub fn reference(&self) -> ActorRef {
        ActorRef::new(self.role_kind(), self.id())
    }
}

/// Role-appropriate summary used when expanding a creator reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorSummary {
    pub role: RoleKind,
    pub id: EntityId,
    pub code: String,
    pub full_name: String,
    pub faculty_id: Option<EntityId>,
    pub details: ActorDetails,
}

/// Role-specific part of an [`ActorSummary`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActorDetails {
    Student {
        major: Option<String>,
        class_name: Option<String>,
        academic_year: Option<String>,
    },
    Specialist {
        job_title: Option<String>,
        academic_degree: Option<String>,
    },
    Officer,
}

/// Login account; bound to at most one profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: EntityId,
    pub email: String,
    /// `None` until the account is bound to a profile
    pub role: Option<RoleKind>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Account provisioning request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub email: String,
    /// Student or staff code of a pre-existing profile
    pub key: String,
}

// ===== Reference data =====

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Faculty {
    pub id: EntityId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Semester {
    pub id: EntityId,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Scoring category under which points accumulate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Criterion {
    pub id: EntityId,
    pub name: String,
    pub max_point: i32,
}

// ===== Activities =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrganizationalForm {
    Online,
    #[default]
    Offline,
}

impl OrganizationalForm {
    pub fn code(self) -> &'static str {
        match self {
            OrganizationalForm::Online => "Onl",
            OrganizationalForm::Offline => "Off",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "Onl" => Some(OrganizationalForm::Online),
            "Off" => Some(OrganizationalForm::Offline),
            _ => None,
        }
    }
}

/// An organized event carrying a point value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    pub id: EntityId,
    pub name: String,
    pub organizational_form: OrganizationalForm,
    /// Free-text description of the target participants
    pub participant: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub location: String,
    pub point: i32,
    pub description: String,
    pub faculty_id: EntityId,
    pub semester_id: EntityId,
    pub criterion_id: Option<EntityId>,
    pub created_by: ActorRef,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Activity creation payload; the creator is stamped by the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewActivity {
    pub name: String,
    pub organizational_form: OrganizationalForm,
    pub participant: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub location: String,
    pub point: i32,
    pub description: String,
    pub faculty_id: EntityId,
    pub semester_id: EntityId,
    pub criterion_id: Option<EntityId>,
}

/// Schedule and metadata changes; point value and criterion are not editable here
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActivityUpdate {
    pub name: Option<String>,
    pub organizational_form: Option<OrganizationalForm>,
    pub participant: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub location: Option<String>,
    pub description: Option<String>,
}

impl ActivityUpdate {
    /// Apply the patch on top of an existing activity
    pub fn apply_to(&self, activity: &mut Activity) {
        if let Some(name) = &self.name {
            activity.name = name.clone();
        }
        if let Some(form) = self.organizational_form {
            activity.organizational_form = form;
        }
        if let Some(participant) = &self.participant {
            activity.participant = participant.clone();
        }
        if let Some(start_date) = self.start_date {
            activity.start_date = start_date;
        }
        if let Some(end_date) = self.end_date {
            activity.end_date = end_date;
        }
        if let Some(location) = &self.location {
            activity.location = location.clone();
        }
        if let Some(description) = &self.description {
            activity.description = description.clone();
        }
    }
}

/// Listing filter; deactivated activities are excluded unless asked for
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActivityFilter {
    pub faculty_id: Option<EntityId>,
    pub semester_id: Option<EntityId>,
    pub criterion_id: Option<EntityId>,
    pub created_by: Option<ActorRef>,
    pub include_inactive: bool,
}

// ===== Participation =====

/// A student's registration for an activity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participation {
    pub id: EntityId,
    pub student_id: EntityId,
    pub activity_id: EntityId,
    pub is_attendance: bool,
    /// Set once the training point has been minted; never reverts
    pub is_point_added: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Lifecycle position of a participation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipationState {
    Registered,
    Attended,
    Credited,
}

impl Participation {
    pub fn state(&self) -> ParticipationState {
        if self.is_point_added {
            ParticipationState::Credited
        } else if self.is_attendance {
            ParticipationState::Attended
        } else {
            ParticipationState::Registered
        }
    }
}

/// Result of an attendance write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceOutcome {
    pub participation: Participation,
    /// The entry minted by this call, if this call performed the credit
    pub granted: Option<TrainingPoint>,
}

// ===== Training points =====

/// Immutable ledger entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingPoint {
    pub id: EntityId,
    pub point: i32,
    pub semester_id: EntityId,
    pub criterion_id: Option<EntityId>,
    pub student_id: EntityId,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTrainingPoint {
    pub student_id: EntityId,
    pub semester_id: EntityId,
    pub criterion_id: Option<EntityId>,
    pub point: i32,
}

/// Per-criterion totals for one student in one semester
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemesterReport {
    pub student_id: EntityId,
    pub semester_id: EntityId,
    /// Raw sum of every active entry
    pub total: i64,
    /// Sum after capping each criterion at its `max_point`
    pub credited_total: i64,
    pub criteria: Vec<CriterionTally>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CriterionTally {
    /// `None` groups points minted from activities without a criterion
    pub criterion_id: Option<EntityId>,
    pub name: Option<String>,
    pub earned: i64,
    pub max_point: Option<i32>,
    pub credited: i64,
}

// ===== Deficiency reports =====

/// A student's dispute or evidence submission for one activity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeficiencyReport {
    pub id: EntityId,
    pub student_id: EntityId,
    pub activity_id: EntityId,
    pub is_resolved: bool,
    /// Evidence handle (URL or storage key)
    pub image: Option<String>,
    pub content: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDeficiencyReport {
    pub student_id: EntityId,
    pub activity_id: EntityId,
    pub image: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReportFilter {
    pub student_id: Option<EntityId>,
    pub activity_id: Option<EntityId>,
    pub is_resolved: Option<bool>,
}

//! Common test utilities: in-memory repositories and a seeded campus
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use parking_lot::RwLock;
use std::sync::Arc;
use training_points::contract::*;
use training_points::domain::repository::{
    AccountRepository, ActivityRepository, DeficiencyReportRepository, ParticipationRepository,
    ProfileRepository, ReferenceRepository, RepositoryError, TrainingPointRepository,
};
use training_points::domain::{ledger, Paging, Repositories, Service};

pub fn print_test_header(test_name: &str, purpose: &[&str]) {
    println!("\n🧪 TEST: {}", test_name);
    if let Some(first) = purpose.first() {
        println!("📋 PURPOSE: {}", first);
    }
    for line in purpose.iter().skip(1) {
        println!("   {}", line);
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

// ===== In-memory storage =====

/// Every table of the module, guarded by one lock so each repository call is atomic
#[derive(Default)]
pub struct Tables {
    next_id: EntityId,
    pub faculties: Vec<Faculty>,
    pub semesters: Vec<Semester>,
    pub criteria: Vec<Criterion>,
    pub students: Vec<Student>,
    pub officers: Vec<(RoleKind, Officer)>,
    pub accounts: Vec<Account>,
    pub activities: Vec<Activity>,
    pub participations: Vec<Participation>,
    pub training_points: Vec<TrainingPoint>,
    pub reports: Vec<DeficiencyReport>,
    /// Make the next attendance credit fail before anything is written
    pub fail_next_credit: bool,
}

impl Tables {
    fn next_id(&mut self) -> EntityId {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Clone, Default)]
pub struct MockDb {
    pub tables: Arc<RwLock<Tables>>,
}

impl MockDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn repositories(&self) -> Repositories {
        let profiles: Vec<Arc<dyn ProfileRepository>> = RoleKind::ALL
            .into_iter()
            .map(|kind| {
                Arc::new(MockProfiles {
                    db: self.clone(),
                    kind,
                }) as Arc<dyn ProfileRepository>
            })
            .collect();

        Repositories {
            accounts: Arc::new(self.clone()),
            profiles,
            references: Arc::new(self.clone()),
            activities: Arc::new(self.clone()),
            participations: Arc::new(self.clone()),
            training_points: Arc::new(self.clone()),
            reports: Arc::new(self.clone()),
        }
    }

    pub fn add_faculty(&self, name: &str) -> EntityId {
        let mut t = self.tables.write();
        let id = t.next_id();
        t.faculties.push(Faculty {
            id,
            name: name.to_string(),
        });
        id
    }

    pub fn add_semester(&self, name: &str, start: NaiveDate, end: NaiveDate) -> EntityId {
        let mut t = self.tables.write();
        let id = t.next_id();
        t.semesters.push(Semester {
            id,
            name: name.to_string(),
            start_date: start,
            end_date: end,
        });
        id
    }

    pub fn add_criterion(&self, name: &str, max_point: i32) -> EntityId {
        let mut t = self.tables.write();
        let id = t.next_id();
        t.criteria.push(Criterion {
            id,
            name: name.to_string(),
            max_point,
        });
        id
    }

    pub fn add_student(&self, code: &str, first: &str, last: &str, faculty_id: EntityId) -> EntityId {
        let mut t = self.tables.write();
        let id = t.next_id();
        t.students.push(Student {
            id,
            code: code.to_string(),
            info: PersonalInfo {
                first_name: first.to_string(),
                last_name: last.to_string(),
                faculty_id: Some(faculty_id),
                ..Default::default()
            },
            major: Some("Computer Science".to_string()),
            class_name: Some("D20CQCN01".to_string()),
            academic_year: Some("2020-2025".to_string()),
            educational_system: None,
            account_id: None,
        });
        id
    }

    pub fn add_officer(&self, kind: RoleKind, code: &str, first: &str, last: &str) -> EntityId {
        let mut t = self.tables.write();
        let id = t.next_id();
        let is_specialist = kind == RoleKind::Specialist;
        t.officers.push((
            kind,
            Officer {
                id,
                code: code.to_string(),
                info: PersonalInfo {
                    first_name: first.to_string(),
                    last_name: last.to_string(),
                    ..Default::default()
                },
                job_title: is_specialist.then(|| "Student Affairs Officer".to_string()),
                academic_degree: is_specialist.then(|| "MSc".to_string()),
                account_id: None,
            },
        ));
        id
    }

    pub fn training_point_count(&self) -> usize {
        self.tables.read().training_points.len()
    }

    pub fn fail_next_credit(&self) {
        self.tables.write().fail_next_credit = true;
    }
}

fn student_actor(s: &Student) -> Actor {
    Actor::Student(s.clone())
}

fn officer_actor(kind: RoleKind, o: &Officer) -> Actor {
    match kind {
        RoleKind::Specialist => Actor::Specialist(o.clone()),
        RoleKind::Assistant => Actor::Assistant(o.clone()),
        _ => Actor::Administrator(o.clone()),
    }
}

pub struct MockProfiles {
    db: MockDb,
    kind: RoleKind,
}

impl MockProfiles {
    fn find(&self, pred: impl Fn(EntityId, &str, Option<EntityId>) -> bool) -> Option<Actor> {
        let t = self.db.tables.read();
        match self.kind {
            RoleKind::Student => t
                .students
                .iter()
                .find(|s| pred(s.id, &s.code, s.account_id))
                .map(student_actor),
            kind => t
                .officers
                .iter()
                .find(|(k, o)| *k == kind && pred(o.id, &o.code, o.account_id))
                .map(|(k, o)| officer_actor(*k, o)),
        }
    }
}

#[async_trait]
impl ProfileRepository for MockProfiles {
    fn role_kind(&self) -> RoleKind {
        self.kind
    }

    async fn find_by_id(&self, id: EntityId) -> anyhow::Result<Option<Actor>> {
        Ok(self.find(|pid, _, _| pid == id))
    }

    async fn find_by_code(&self, code: &str) -> anyhow::Result<Option<Actor>> {
        Ok(self.find(|_, c, _| c == code))
    }

    async fn find_by_account(&self, account_id: EntityId) -> anyhow::Result<Option<Actor>> {
        Ok(self.find(|_, _, a| a == Some(account_id)))
    }
}

#[async_trait]
impl AccountRepository for MockDb {
    async fn find(&self, account_id: EntityId) -> anyhow::Result<Option<Account>> {
        Ok(self
            .tables
            .read()
            .accounts
            .iter()
            .find(|a| a.id == account_id)
            .cloned())
    }

    async fn provision(&self, email: &str, profile: ActorRef) -> anyhow::Result<Option<Account>> {
        let mut t = self.tables.write();
        let account_id = t.next_id + 1;

        let slot = match profile.role {
            RoleKind::Student => t
                .students
                .iter_mut()
                .find(|s| s.id == profile.actor_id)
                .map(|s| &mut s.account_id),
            kind => t
                .officers
                .iter_mut()
                .find(|(k, o)| *k == kind && o.id == profile.actor_id)
                .map(|(_, o)| &mut o.account_id),
        };
        match slot {
            Some(slot) if slot.is_none() => *slot = Some(account_id),
            _ => return Ok(None),
        }

        t.next_id = account_id;
        let now = Utc::now();
        let account = Account {
            id: account_id,
            email: email.to_string(),
            role: Some(profile.role),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        t.accounts.push(account.clone());
        Ok(Some(account))
    }
}

#[async_trait]
impl ReferenceRepository for MockDb {
    async fn find_faculty(&self, id: EntityId) -> anyhow::Result<Option<Faculty>> {
        Ok(self.tables.read().faculties.iter().find(|f| f.id == id).cloned())
    }

    async fn find_semester(&self, id: EntityId) -> anyhow::Result<Option<Semester>> {
        Ok(self.tables.read().semesters.iter().find(|s| s.id == id).cloned())
    }

    async fn find_criterion(&self, id: EntityId) -> anyhow::Result<Option<Criterion>> {
        Ok(self.tables.read().criteria.iter().find(|c| c.id == id).cloned())
    }

    async fn list_criteria(&self) -> anyhow::Result<Vec<Criterion>> {
        Ok(self.tables.read().criteria.clone())
    }
}

#[async_trait]
impl ActivityRepository for MockDb {
    async fn create(&self, data: &NewActivity, created_by: ActorRef) -> anyhow::Result<Activity> {
        let mut t = self.tables.write();
        let now = Utc::now();
        let activity = Activity {
            id: t.next_id(),
            name: data.name.clone(),
            organizational_form: data.organizational_form,
            participant: data.participant.clone(),
            start_date: data.start_date,
            end_date: data.end_date,
            location: data.location.clone(),
            point: data.point,
            description: data.description.clone(),
            faculty_id: data.faculty_id,
            semester_id: data.semester_id,
            criterion_id: data.criterion_id,
            created_by,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        t.activities.push(activity.clone());
        Ok(activity)
    }

    async fn find(&self, id: EntityId) -> anyhow::Result<Option<Activity>> {
        Ok(self.tables.read().activities.iter().find(|a| a.id == id).cloned())
    }

    async fn list(
        &self,
        filter: &ActivityFilter,
        limit: u64,
        offset: u64,
    ) -> anyhow::Result<Vec<Activity>> {
        let t = self.tables.read();
        let mut matching: Vec<Activity> = t
            .activities
            .iter()
            .filter(|a| filter.include_inactive || a.is_active)
            .filter(|a| filter.faculty_id.map_or(true, |id| a.faculty_id == id))
            .filter(|a| filter.semester_id.map_or(true, |id| a.semester_id == id))
            .filter(|a| filter.criterion_id.map_or(true, |id| a.criterion_id == Some(id)))
            .filter(|a| filter.created_by.map_or(true, |c| a.created_by == c))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.start_date.cmp(&a.start_date).then(b.id.cmp(&a.id)));
        Ok(matching
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn update(&self, id: EntityId, update: &ActivityUpdate) -> anyhow::Result<Option<Activity>> {
        let mut t = self.tables.write();
        Ok(t.activities.iter_mut().find(|a| a.id == id).map(|a| {
            update.apply_to(a);
            a.updated_at = Utc::now();
            a.clone()
        }))
    }

    async fn deactivate(&self, id: EntityId) -> anyhow::Result<bool> {
        let mut t = self.tables.write();
        Ok(t
            .activities
            .iter_mut()
            .find(|a| a.id == id)
            .map(|a| a.is_active = false)
            .is_some())
    }

    async fn delete(&self, id: EntityId) -> anyhow::Result<bool> {
        let mut t = self.tables.write();
        let before = t.activities.len();
        t.activities.retain(|a| a.id != id);
        if t.activities.len() == before {
            return Ok(false);
        }
        t.participations.retain(|p| p.activity_id != id);
        t.reports.retain(|r| r.activity_id != id);
        Ok(true)
    }
}

#[async_trait]
impl ParticipationRepository for MockDb {
    async fn insert(
        &self,
        student_id: EntityId,
        activity_id: EntityId,
    ) -> Result<Participation, RepositoryError> {
        let mut t = self.tables.write();
        if t
            .participations
            .iter()
            .any(|p| p.student_id == student_id && p.activity_id == activity_id)
        {
            return Err(RepositoryError::UniqueViolation);
        }
        let now = Utc::now();
        let participation = Participation {
            id: t.next_id(),
            student_id,
            activity_id,
            is_attendance: false,
            is_point_added: false,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        t.participations.push(participation.clone());
        Ok(participation)
    }

    async fn find_by_pair(
        &self,
        student_id: EntityId,
        activity_id: EntityId,
    ) -> anyhow::Result<Option<Participation>> {
        Ok(self
            .tables
            .read()
            .participations
            .iter()
            .find(|p| p.student_id == student_id && p.activity_id == activity_id)
            .cloned())
    }

    async fn list_by_activity(&self, activity_id: EntityId) -> anyhow::Result<Vec<Participation>> {
        Ok(self
            .tables
            .read()
            .participations
            .iter()
            .filter(|p| p.activity_id == activity_id && p.is_active)
            .cloned()
            .collect())
    }

    async fn list_by_student(&self, student_id: EntityId) -> anyhow::Result<Vec<Participation>> {
        Ok(self
            .tables
            .read()
            .participations
            .iter()
            .filter(|p| p.student_id == student_id && p.is_active)
            .cloned()
            .collect())
    }

    async fn count_active_by_activity(&self, activity_id: EntityId) -> anyhow::Result<u64> {
        Ok(self
            .tables
            .read()
            .participations
            .iter()
            .filter(|p| p.activity_id == activity_id && p.is_active)
            .count() as u64)
    }

    async fn apply_attendance(
        &self,
        participation_id: EntityId,
        attended: bool,
    ) -> anyhow::Result<Option<AttendanceOutcome>> {
        let mut t = self.tables.write();
        let Some(current) = t
            .participations
            .iter()
            .find(|p| p.id == participation_id)
            .cloned()
        else {
            return Ok(None);
        };

        let transition = ledger::attendance_transition(&current, attended);
        if transition.grant_point && t.fail_next_credit {
            t.fail_next_credit = false;
            anyhow::bail!("simulated storage failure");
        }

        let mut granted = None;
        if transition.grant_point {
            let activity = t
                .activities
                .iter()
                .find(|a| a.id == current.activity_id)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("activity missing"))?;
            let entry = ledger::credit_for(&current, &activity);
            let now = Utc::now();
            let point = TrainingPoint {
                id: t.next_id(),
                point: entry.point,
                semester_id: entry.semester_id,
                criterion_id: entry.criterion_id,
                student_id: entry.student_id,
                is_active: true,
                created_at: now,
                updated_at: now,
            };
            t.training_points.push(point.clone());
            granted = Some(point);
        }

        let row = t
            .participations
            .iter_mut()
            .find(|p| p.id == participation_id)
            .ok_or_else(|| anyhow::anyhow!("participation vanished"))?;
        row.is_attendance = transition.is_attendance;
        if transition.grant_point {
            row.is_point_added = true;
        }
        row.updated_at = Utc::now();

        Ok(Some(AttendanceOutcome {
            participation: row.clone(),
            granted,
        }))
    }
}

#[async_trait]
impl TrainingPointRepository for MockDb {
    async fn grant(&self, entry: &NewTrainingPoint) -> anyhow::Result<TrainingPoint> {
        let mut t = self.tables.write();
        let now = Utc::now();
        let point = TrainingPoint {
            id: t.next_id(),
            point: entry.point,
            semester_id: entry.semester_id,
            criterion_id: entry.criterion_id,
            student_id: entry.student_id,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        t.training_points.push(point.clone());
        Ok(point)
    }

    async fn list_for_student(
        &self,
        student_id: EntityId,
        semester_id: Option<EntityId>,
    ) -> anyhow::Result<Vec<TrainingPoint>> {
        Ok(self
            .tables
            .read()
            .training_points
            .iter()
            .filter(|p| p.student_id == student_id && p.is_active)
            .filter(|p| semester_id.map_or(true, |s| p.semester_id == s))
            .cloned()
            .collect())
    }

    async fn sum_for_student_in_semester(
        &self,
        student_id: EntityId,
        semester_id: EntityId,
    ) -> anyhow::Result<i64> {
        Ok(self
            .tables
            .read()
            .training_points
            .iter()
            .filter(|p| p.student_id == student_id && p.semester_id == semester_id && p.is_active)
            .map(|p| i64::from(p.point))
            .sum())
    }
}

#[async_trait]
impl DeficiencyReportRepository for MockDb {
    async fn insert(&self, report: &NewDeficiencyReport) -> Result<DeficiencyReport, RepositoryError> {
        let mut t = self.tables.write();
        if t
            .reports
            .iter()
            .any(|r| r.student_id == report.student_id && r.activity_id == report.activity_id)
        {
            return Err(RepositoryError::UniqueViolation);
        }
        let now = Utc::now();
        let filed = DeficiencyReport {
            id: t.next_id(),
            student_id: report.student_id,
            activity_id: report.activity_id,
            is_resolved: false,
            image: report.image.clone(),
            content: report.content.clone(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        t.reports.push(filed.clone());
        Ok(filed)
    }

    async fn find(&self, id: EntityId) -> anyhow::Result<Option<DeficiencyReport>> {
        Ok(self.tables.read().reports.iter().find(|r| r.id == id).cloned())
    }

    async fn list(&self, filter: &ReportFilter) -> anyhow::Result<Vec<DeficiencyReport>> {
        Ok(self
            .tables
            .read()
            .reports
            .iter()
            .filter(|r| r.is_active)
            .filter(|r| filter.student_id.map_or(true, |s| r.student_id == s))
            .filter(|r| filter.activity_id.map_or(true, |a| r.activity_id == a))
            .filter(|r| filter.is_resolved.map_or(true, |v| r.is_resolved == v))
            .cloned()
            .collect())
    }

    async fn mark_resolved(&self, id: EntityId) -> anyhow::Result<Option<DeficiencyReport>> {
        let mut t = self.tables.write();
        Ok(t.reports.iter_mut().find(|r| r.id == id).map(|r| {
            r.is_resolved = true;
            r.updated_at = Utc::now();
            r.clone()
        }))
    }
}

// ===== Seeded campus =====

/// A faculty, a semester, two criteria, two students and one actor of each staff role
pub struct Campus {
    pub db: MockDb,
    pub service: Arc<Service>,
    pub faculty_id: EntityId,
    pub semester_id: EntityId,
    pub volunteering_id: EntityId,
    pub culture_id: EntityId,
    pub alice: EntityId,
    pub bao: EntityId,
    pub specialist: EntityId,
    pub assistant: EntityId,
    pub administrator: EntityId,
}

impl Campus {
    pub fn new() -> Self {
        Self::with_paging(Paging::default())
    }

    pub fn with_paging(paging: Paging) -> Self {
        let db = MockDb::new();
        let faculty_id = db.add_faculty("Information Technology");
        let semester_id = db.add_semester("2024 Spring", date(2024, 1, 15), date(2024, 6, 15));
        let volunteering_id = db.add_criterion("Volunteering", 10);
        let culture_id = db.add_criterion("Culture and sports", 15);
        let alice = db.add_student("B20DCCN001", "Alice", "Nguyen", faculty_id);
        let bao = db.add_student("B20DCCN002", "Bao", "Tran", faculty_id);
        let specialist = db.add_officer(RoleKind::Specialist, "GV001", "Hoa", "Le");
        let assistant = db.add_officer(RoleKind::Assistant, "TL001", "Minh", "Pham");
        let administrator = db.add_officer(RoleKind::Administrator, "AD001", "Lan", "Vo");

        let service = Arc::new(Service::with_paging(db.repositories(), paging));

        Self {
            db,
            service,
            faculty_id,
            semester_id,
            volunteering_id,
            culture_id,
            alice,
            bao,
            specialist,
            assistant,
            administrator,
        }
    }

    pub fn specialist_ref(&self) -> ActorRef {
        ActorRef::new(RoleKind::Specialist, self.specialist)
    }

    pub fn assistant_ref(&self) -> ActorRef {
        ActorRef::new(RoleKind::Assistant, self.assistant)
    }

    pub fn student_ref(&self, id: EntityId) -> ActorRef {
        ActorRef::new(RoleKind::Student, id)
    }

    pub fn new_activity(&self, name: &str, point: i32) -> NewActivity {
        NewActivity {
            name: name.to_string(),
            organizational_form: OrganizationalForm::Offline,
            participant: "All students".to_string(),
            start_date: date(2024, 3, 10),
            end_date: date(2024, 3, 10),
            location: "Main hall".to_string(),
            point,
            description: String::new(),
            faculty_id: self.faculty_id,
            semester_id: self.semester_id,
            criterion_id: Some(self.volunteering_id),
        }
    }

    /// Create an activity owned by the specialist
    pub async fn activity(&self, name: &str, point: i32) -> Activity {
        self.service
            .create_activity(self.new_activity(name, point), self.specialist_ref())
            .await
            .expect("create activity")
    }
}

impl Default for Campus {
    fn default() -> Self {
        Self::new()
    }
}

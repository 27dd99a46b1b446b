//! Database migrations for the training points module

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_reference_tables::Migration),
            Box::new(m20250301_000002_create_actor_tables::Migration),
            Box::new(m20250301_000003_create_activities::Migration),
            Box::new(m20250301_000004_create_ledger_tables::Migration),
        ]
    }
}

/// Shared `is_active` / `created_at` / `updated_at` columns
fn base_columns<T: IntoIden + Copy>(
    table: &mut TableCreateStatement,
    is_active: T,
    created_at: T,
    updated_at: T,
) {
    table
        .col(
            ColumnDef::new(is_active)
                .boolean()
                .not_null()
                .default(true),
        )
        .col(
            ColumnDef::new(created_at)
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .col(
            ColumnDef::new(updated_at)
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::current_timestamp()),
        );
}

fn id_column<T: IntoIden>(id: T) -> ColumnDef {
    ColumnDef::new(id)
        .big_integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

mod m20250301_000001_create_reference_tables {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000001_create_reference_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            let mut faculties = Table::create()
                .table(Faculties::Table)
                .if_not_exists()
                .col(id_column(Faculties::Id))
                .col(ColumnDef::new(Faculties::Name).string_len(100).not_null())
                .to_owned();
            base_columns(
                &mut faculties,
                Faculties::IsActive,
                Faculties::CreatedAt,
                Faculties::UpdatedAt,
            );
            manager.create_table(faculties).await?;

            let mut semesters = Table::create()
                .table(Semesters::Table)
                .if_not_exists()
                .col(id_column(Semesters::Id))
                .col(ColumnDef::new(Semesters::Name).string_len(50).not_null())
                .col(ColumnDef::new(Semesters::StartDate).date().not_null())
                .col(ColumnDef::new(Semesters::EndDate).date().not_null())
                .to_owned();
            base_columns(
                &mut semesters,
                Semesters::IsActive,
                Semesters::CreatedAt,
                Semesters::UpdatedAt,
            );
            manager.create_table(semesters).await?;

            let mut criteria = Table::create()
                .table(Criteria::Table)
                .if_not_exists()
                .col(id_column(Criteria::Id))
                .col(ColumnDef::new(Criteria::Name).string_len(100).not_null())
                .col(ColumnDef::new(Criteria::MaxPoint).integer().not_null())
                .col(
                    ColumnDef::new(Criteria::Description)
                        .text()
                        .not_null()
                        .default(""),
                )
                .to_owned();
            base_columns(
                &mut criteria,
                Criteria::IsActive,
                Criteria::CreatedAt,
                Criteria::UpdatedAt,
            );
            manager.create_table(criteria).await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Criteria::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Semesters::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Faculties::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden, Clone, Copy)]
    pub(super) enum Faculties {
        Table,
        Id,
        Name,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden, Clone, Copy)]
    pub(super) enum Semesters {
        Table,
        Id,
        Name,
        StartDate,
        EndDate,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden, Clone, Copy)]
    pub(super) enum Criteria {
        Table,
        Id,
        Name,
        MaxPoint,
        Description,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250301_000002_create_actor_tables {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000002_create_actor_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            let mut accounts = Table::create()
                .table(Accounts::Table)
                .if_not_exists()
                .col(id_column(Accounts::Id))
                .col(ColumnDef::new(Accounts::Email).string_len(255).not_null())
                .col(ColumnDef::new(Accounts::Role).string_len(20))
                .to_owned();
            base_columns(
                &mut accounts,
                Accounts::IsActive,
                Accounts::CreatedAt,
                Accounts::UpdatedAt,
            );
            manager.create_table(accounts).await?;

            let mut students = Table::create()
                .table(Students::Table)
                .if_not_exists()
                .col(id_column(Students::Id))
                .col(
                    ColumnDef::new(Students::Code)
                        .string_len(20)
                        .not_null()
                        .unique_key(),
                )
                .col(ColumnDef::new(Students::FirstName).string_len(50).not_null())
                .col(ColumnDef::new(Students::MiddleName).string_len(50))
                .col(ColumnDef::new(Students::LastName).string_len(50).not_null())
                .col(ColumnDef::new(Students::Gender).string_len(10))
                .col(ColumnDef::new(Students::DateOfBirth).date())
                .col(ColumnDef::new(Students::FacultyId).big_integer())
                .col(ColumnDef::new(Students::Address).string_len(255))
                .col(ColumnDef::new(Students::PhoneNumber).string_len(20))
                .col(ColumnDef::new(Students::Major).string_len(100))
                .col(ColumnDef::new(Students::ClassName).string_len(50))
                .col(ColumnDef::new(Students::AcademicYear).string_len(20))
                .col(ColumnDef::new(Students::EducationalSystem).string_len(50))
                .col(ColumnDef::new(Students::AccountId).big_integer().unique_key())
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_students_account")
                        .from(Students::Table, Students::AccountId)
                        .to(Accounts::Table, Accounts::Id)
                        .on_delete(ForeignKeyAction::SetNull),
                )
                .to_owned();
            base_columns(
                &mut students,
                Students::IsActive,
                Students::CreatedAt,
                Students::UpdatedAt,
            );
            manager.create_table(students).await?;

            let mut officers = Table::create()
                .table(Officers::Table)
                .if_not_exists()
                .col(id_column(Officers::Id))
                .col(ColumnDef::new(Officers::Role).string_len(20).not_null())
                .col(
                    ColumnDef::new(Officers::Code)
                        .string_len(20)
                        .not_null()
                        .unique_key(),
                )
                .col(ColumnDef::new(Officers::FirstName).string_len(50).not_null())
                .col(ColumnDef::new(Officers::MiddleName).string_len(50))
                .col(ColumnDef::new(Officers::LastName).string_len(50).not_null())
                .col(ColumnDef::new(Officers::Gender).string_len(10))
                .col(ColumnDef::new(Officers::DateOfBirth).date())
                .col(ColumnDef::new(Officers::FacultyId).big_integer())
                .col(ColumnDef::new(Officers::Address).string_len(255))
                .col(ColumnDef::new(Officers::PhoneNumber).string_len(20))
                .col(ColumnDef::new(Officers::JobTitle).string_len(100))
                .col(ColumnDef::new(Officers::AcademicDegree).string_len(100))
                .col(ColumnDef::new(Officers::AccountId).big_integer().unique_key())
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_officers_account")
                        .from(Officers::Table, Officers::AccountId)
                        .to(Accounts::Table, Accounts::Id)
                        .on_delete(ForeignKeyAction::SetNull),
                )
                .to_owned();
            base_columns(
                &mut officers,
                Officers::IsActive,
                Officers::CreatedAt,
                Officers::UpdatedAt,
            );
            manager.create_table(officers).await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_officers_role")
                        .table(Officers::Table)
                        .col(Officers::Role)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Officers::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Students::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Accounts::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden, Clone, Copy)]
    pub(super) enum Accounts {
        Table,
        Id,
        Email,
        Role,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden, Clone, Copy)]
    pub(super) enum Students {
        Table,
        Id,
        Code,
        FirstName,
        MiddleName,
        LastName,
        Gender,
        DateOfBirth,
        FacultyId,
        Address,
        PhoneNumber,
        Major,
        ClassName,
        AcademicYear,
        EducationalSystem,
        AccountId,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum Officers {
        Table,
        Id,
        Role,
        Code,
        FirstName,
        MiddleName,
        LastName,
        Gender,
        DateOfBirth,
        FacultyId,
        Address,
        PhoneNumber,
        JobTitle,
        AcademicDegree,
        AccountId,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250301_000003_create_activities {
    use super::m20250301_000001_create_reference_tables::{Criteria, Faculties, Semesters};
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000003_create_activities"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            let mut activities = Table::create()
                .table(Activities::Table)
                .if_not_exists()
                .col(id_column(Activities::Id))
                .col(ColumnDef::new(Activities::Name).string_len(255).not_null())
                .col(
                    ColumnDef::new(Activities::OrganizationalForm)
                        .string_len(3)
                        .not_null()
                        .default("Off"),
                )
                .col(ColumnDef::new(Activities::Participant).string_len(255).not_null())
                .col(ColumnDef::new(Activities::StartDate).date().not_null())
                .col(ColumnDef::new(Activities::EndDate).date().not_null())
                .col(ColumnDef::new(Activities::Location).string_len(255).not_null())
                .col(ColumnDef::new(Activities::Point).integer().not_null())
                .col(ColumnDef::new(Activities::Description).text().not_null())
                .col(ColumnDef::new(Activities::FacultyId).big_integer().not_null())
                .col(ColumnDef::new(Activities::SemesterId).big_integer().not_null())
                .col(ColumnDef::new(Activities::CriterionId).big_integer())
                .col(ColumnDef::new(Activities::CreatedByType).string_len(20).not_null())
                .col(ColumnDef::new(Activities::CreatedById).big_integer().not_null())
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_activities_faculty")
                        .from(Activities::Table, Activities::FacultyId)
                        .to(Faculties::Table, Faculties::Id)
                        .on_delete(ForeignKeyAction::Cascade),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_activities_semester")
                        .from(Activities::Table, Activities::SemesterId)
                        .to(Semesters::Table, Semesters::Id)
                        .on_delete(ForeignKeyAction::Cascade),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_activities_criterion")
                        .from(Activities::Table, Activities::CriterionId)
                        .to(Criteria::Table, Criteria::Id)
                        .on_delete(ForeignKeyAction::SetNull),
                )
                .to_owned();
            base_columns(
                &mut activities,
                Activities::IsActive,
                Activities::CreatedAt,
                Activities::UpdatedAt,
            );
            manager.create_table(activities).await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_activities_faculty_semester")
                        .table(Activities::Table)
                        .col(Activities::FacultyId)
                        .col(Activities::SemesterId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_activities_created_by")
                        .table(Activities::Table)
                        .col(Activities::CreatedByType)
                        .col(Activities::CreatedById)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Activities::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden, Clone, Copy)]
    pub(super) enum Activities {
        Table,
        Id,
        Name,
        OrganizationalForm,
        Participant,
        StartDate,
        EndDate,
        Location,
        Point,
        Description,
        FacultyId,
        SemesterId,
        CriterionId,
        CreatedByType,
        CreatedById,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250301_000004_create_ledger_tables {
    use super::m20250301_000001_create_reference_tables::{Criteria, Semesters};
    use super::m20250301_000002_create_actor_tables::Students;
    use super::m20250301_000003_create_activities::Activities;
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000004_create_ledger_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            let mut participations = Table::create()
                .table(Participations::Table)
                .if_not_exists()
                .col(id_column(Participations::Id))
                .col(ColumnDef::new(Participations::StudentId).big_integer().not_null())
                .col(ColumnDef::new(Participations::ActivityId).big_integer().not_null())
                .col(
                    ColumnDef::new(Participations::IsAttendance)
                        .boolean()
                        .not_null()
                        .default(false),
                )
                .col(
                    ColumnDef::new(Participations::IsPointAdded)
                        .boolean()
                        .not_null()
                        .default(false),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_participations_student")
                        .from(Participations::Table, Participations::StudentId)
                        .to(Students::Table, Students::Id)
                        .on_delete(ForeignKeyAction::Cascade),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_participations_activity")
                        .from(Participations::Table, Participations::ActivityId)
                        .to(Activities::Table, Activities::Id)
                        .on_delete(ForeignKeyAction::Cascade),
                )
                .to_owned();
            base_columns(
                &mut participations,
                Participations::IsActive,
                Participations::CreatedAt,
                Participations::UpdatedAt,
            );
            manager.create_table(participations).await?;

            // A student registers for an activity at most once
            manager
                .create_index(
                    Index::create()
                        .name("uq_participations_student_activity")
                        .table(Participations::Table)
                        .col(Participations::StudentId)
                        .col(Participations::ActivityId)
                        .unique()
                        .to_owned(),
                )
                .await?;

            let mut training_points = Table::create()
                .table(TrainingPoints::Table)
                .if_not_exists()
                .col(id_column(TrainingPoints::Id))
                .col(ColumnDef::new(TrainingPoints::Point).integer().not_null())
                .col(ColumnDef::new(TrainingPoints::SemesterId).big_integer().not_null())
                .col(ColumnDef::new(TrainingPoints::CriterionId).big_integer())
                .col(ColumnDef::new(TrainingPoints::StudentId).big_integer().not_null())
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_training_points_semester")
                        .from(TrainingPoints::Table, TrainingPoints::SemesterId)
                        .to(Semesters::Table, Semesters::Id)
                        .on_delete(ForeignKeyAction::Cascade),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_training_points_criterion")
                        .from(TrainingPoints::Table, TrainingPoints::CriterionId)
                        .to(Criteria::Table, Criteria::Id)
                        .on_delete(ForeignKeyAction::SetNull),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_training_points_student")
                        .from(TrainingPoints::Table, TrainingPoints::StudentId)
                        .to(Students::Table, Students::Id)
                        .on_delete(ForeignKeyAction::Cascade),
                )
                .to_owned();
            base_columns(
                &mut training_points,
                TrainingPoints::IsActive,
                TrainingPoints::CreatedAt,
                TrainingPoints::UpdatedAt,
            );
            manager.create_table(training_points).await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_training_points_student_semester")
                        .table(TrainingPoints::Table)
                        .col(TrainingPoints::StudentId)
                        .col(TrainingPoints::SemesterId)
                        .to_owned(),
                )
                .await?;

            let mut reports = Table::create()
                .table(DeficiencyReports::Table)
                .if_not_exists()
                .col(id_column(DeficiencyReports::Id))
                .col(ColumnDef::new(DeficiencyReports::StudentId).big_integer().not_null())
                .col(ColumnDef::new(DeficiencyReports::ActivityId).big_integer().not_null())
                .col(
                    ColumnDef::new(DeficiencyReports::IsResolved)
                        .boolean()
                        .not_null()
                        .default(false),
                )
                .col(ColumnDef::new(DeficiencyReports::Image).string_len(512))
                .col(ColumnDef::new(DeficiencyReports::Content).text())
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_deficiency_reports_student")
                        .from(DeficiencyReports::Table, DeficiencyReports::StudentId)
                        .to(Students::Table, Students::Id)
                        .on_delete(ForeignKeyAction::Cascade),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_deficiency_reports_activity")
                        .from(DeficiencyReports::Table, DeficiencyReports::ActivityId)
                        .to(Activities::Table, Activities::Id)
                        .on_delete(ForeignKeyAction::Cascade),
                )
                .to_owned();
            base_columns(
                &mut reports,
                DeficiencyReports::IsActive,
                DeficiencyReports::CreatedAt,
                DeficiencyReports::UpdatedAt,
            );
            manager.create_table(reports).await?;

            manager
                .create_index(
                    Index::create()
                        .name("uq_deficiency_reports_student_activity")
                        .table(DeficiencyReports::Table)
                        .col(DeficiencyReports::StudentId)
                        .col(DeficiencyReports::ActivityId)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(DeficiencyReports::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(TrainingPoints::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Participations::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum Participations {
        Table,
        Id,
        StudentId,
        ActivityId,
        IsAttendance,
        IsPointAdded,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum TrainingPoints {
        Table,
        Id,
        Point,
        SemesterId,
        CriterionId,
        StudentId,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum DeficiencyReports {
        Table,
        Id,
        StudentId,
        ActivityId,
        IsResolved,
        Image,
        Content,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }
}

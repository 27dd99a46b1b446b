//! SeaORM entities for database tables
//!
//! Every table carries the shared `is_active` / `created_at` / `updated_at` columns.

/// Faculty reference table
pub mod faculty {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "faculties")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub name: String,
        pub is_active: bool,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// Semester reference table
pub mod semester {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "semesters")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub name: String,
        pub start_date: Date,
        pub end_date: Date,
        pub is_active: bool,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// Scoring criterion reference table
pub mod criterion {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "criteria")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub name: String,
        pub max_point: i32,
        #[sea_orm(column_type = "Text")]
        pub description: String,
        pub is_active: bool,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// Login accounts
pub mod account {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "accounts")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub email: String,
        /// Role kind of the bound profile; NULL until bound
        pub role: Option<String>,
        pub is_active: bool,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// Student profiles
pub mod student {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "students")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        #[sea_orm(unique)]
        pub code: String,
        pub first_name: String,
        pub middle_name: Option<String>,
        pub last_name: String,
        pub gender: Option<String>,
        pub date_of_birth: Option<Date>,
        pub faculty_id: Option<i64>,
        pub address: Option<String>,
        pub phone_number: Option<String>,
        pub major: Option<String>,
        pub class_name: Option<String>,
        pub academic_year: Option<String>,
        pub educational_system: Option<String>,
        pub account_id: Option<i64>,
        pub is_active: bool,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// Staff profiles: specialists, assistants and administrators
pub mod officer {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "officers")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        /// Role discriminator: specialist, assistant or administrator
        pub role: String,
        #[sea_orm(unique)]
        pub code: String,
        pub first_name: String,
        pub middle_name: Option<String>,
        pub last_name: String,
        pub gender: Option<String>,
        pub date_of_birth: Option<Date>,
        pub faculty_id: Option<i64>,
        pub address: Option<String>,
        pub phone_number: Option<String>,
        pub job_title: Option<String>,
        pub academic_degree: Option<String>,
        pub account_id: Option<i64>,
        pub is_active: bool,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// Activities
pub mod activity {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "activities")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub name: String,
        /// "Onl" or "Off"
        pub organizational_form: String,
        pub participant: String,
        pub start_date: Date,
        pub end_date: Date,
        pub location: String,
        pub point: i32,
        #[sea_orm(column_type = "Text")]
        pub description: String,
        pub faculty_id: i64,
        pub semester_id: i64,
        pub criterion_id: Option<i64>,
        /// Creator role kind (polymorphic reference, part 1)
        pub created_by_type: String,
        /// Creator profile id (polymorphic reference, part 2)
        pub created_by_id: i64,
        pub is_active: bool,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::participation::Entity")]
        Participations,
        #[sea_orm(has_many = "super::deficiency_report::Entity")]
        DeficiencyReports,
    }

    impl Related<super::participation::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Participations.def()
        }
    }

    impl Related<super::deficiency_report::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::DeficiencyReports.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Student registrations; unique per (student_id, activity_id)
pub mod participation {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "participations")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub student_id: i64,
        pub activity_id: i64,
        pub is_attendance: bool,
        pub is_point_added: bool,
        pub is_active: bool,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::activity::Entity",
            from = "Column::ActivityId",
            to = "super::activity::Column::Id",
            on_delete = "Cascade"
        )]
        Activity,
    }

    impl Related<super::activity::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Activity.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Append-only training point ledger
pub mod training_point {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "training_points")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub point: i32,
        pub semester_id: i64,
        pub criterion_id: Option<i64>,
        pub student_id: i64,
        pub is_active: bool,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// Deficiency reports; unique per (student_id, activity_id)
pub mod deficiency_report {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "deficiency_reports")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub student_id: i64,
        pub activity_id: i64,
        pub is_resolved: bool,
        pub image: Option<String>,
        #[sea_orm(column_type = "Text", nullable)]
        pub content: Option<String>,
        pub is_active: bool,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::activity::Entity",
            from = "Column::ActivityId",
            to = "super::activity::Column::Id",
            on_delete = "Cascade"
        )]
        Activity,
    }

    impl Related<super::activity::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Activity.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

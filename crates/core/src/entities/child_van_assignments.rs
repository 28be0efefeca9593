use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// (parent_id, child_name) is unique.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "child_van_assignments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub parent_id: Uuid,
    pub child_name: String,
    pub child_grade: String,
    pub school_name: String,
    pub admission_number: String,
    pub van_assignment_id: i64,
    pub pickup_time: Option<Time>,
    pub dropoff_time: Option<Time>,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::ParentId",
        to = "super::users::Column::UserId"
    )]
    Users,
    #[sea_orm(
        belongs_to = "super::van_assignments::Entity",
        from = "Column::VanAssignmentId",
        to = "super::van_assignments::Column::Id"
    )]
    VanAssignments,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::van_assignments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VanAssignments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

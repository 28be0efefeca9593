use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "van_assignments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub driver_id: Uuid,
    #[sea_orm(unique)]
    pub van_number: String,
    pub van_model: String,
    pub capacity: i32,
    pub route_name: String,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::DriverId",
        to = "super::users::Column::UserId"
    )]
    Users,
    #[sea_orm(has_many = "super::child_van_assignments::Entity")]
    ChildVanAssignments,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::child_van_assignments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ChildVanAssignments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::Role;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: Uuid,
    /// E.164, normalized before it reaches the store.
    #[sea_orm(unique)]
    pub phone_number: String,
    pub user_type: Role,
    pub first_name: String,
    pub last_name: String,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,
    pub is_active: bool,
    pub gps_tracking_enabled: bool,
    /// Set on the first successful OTP verification.
    pub phone_verified_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::auth_tokens::Entity")]
    AuthTokens,
    #[sea_orm(has_many = "super::locations::Entity")]
    Locations,
    #[sea_orm(has_many = "super::van_assignments::Entity")]
    VanAssignments,
    #[sea_orm(has_many = "super::child_van_assignments::Entity")]
    ChildVanAssignments,
}

impl Related<super::auth_tokens::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AuthTokens.def()
    }
}

impl Related<super::locations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Locations.def()
    }
}

impl Related<super::van_assignments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VanAssignments.def()
    }
}

impl Related<super::child_van_assignments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ChildVanAssignments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

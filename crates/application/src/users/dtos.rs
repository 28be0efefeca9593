use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;
use vantrack_core::domain::Role;
use vantrack_core::entities::users;

#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub phone_number: String,
    pub user_type: Role,
    pub first_name: String,
    pub last_name: String,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,
    pub gps_tracking_enabled: bool,
    pub created_at: DateTime<FixedOffset>,
    pub is_active: bool,
}

impl From<users::Model> for ProfileResponse {
    fn from(user: users::Model) -> Self {
        Self {
            id: user.user_id,
            phone_number: user.phone_number,
            user_type: user.user_type,
            first_name: user.first_name,
            last_name: user.last_name,
            address: user.address,
            emergency_contact: user.emergency_contact,
            gps_tracking_enabled: user.gps_tracking_enabled,
            created_at: user.created_at,
            is_active: user.is_active,
        }
    }
}

/// Only these fields are writable. Anything else in the body is ignored.
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(max = 30, message = "First name must be at most 30 characters"))]
    pub first_name: Option<String>,
    #[validate(length(max = 30, message = "Last name must be at most 30 characters"))]
    pub last_name: Option<String>,
    #[validate(length(max = 500, message = "Address must be at most 500 characters"))]
    pub address: Option<String>,
    pub emergency_contact: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateProfileResponse {
    pub message: String,
    pub user: ProfileResponse,
}

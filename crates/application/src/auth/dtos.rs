use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vantrack_core::domain::Role;
use vantrack_core::entities::users;

// ============ Caller identity ============

/// Who is behind a bearer token. Attached to the request by the auth middleware.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub phone_number: String,
    pub role: Role,
}

impl From<&users::Model> for AuthenticatedUser {
    fn from(user: &users::Model) -> Self {
        Self {
            user_id: user.user_id,
            phone_number: user.phone_number.clone(),
            role: user.user_type,
        }
    }
}

// ============ Check user ============

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CheckUserRequest {
    #[serde(alias = "phone")]
    pub phone_number: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CheckUserResponse {
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_type: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CheckUserResponse {
    pub fn found(user: &users::Model) -> Self {
        Self {
            exists: true,
            user_type: Some(user.user_type),
            first_name: Some(user.first_name.clone()),
            last_name: Some(user.last_name.clone()),
            name: Some(user.full_name()),
            is_active: Some(user.is_active),
            message: None,
        }
    }

    pub fn missing() -> Self {
        Self {
            exists: false,
            user_type: None,
            first_name: None,
            last_name: None,
            name: None,
            is_active: None,
            message: Some("User not registered".to_string()),
        }
    }
}

// ============ OTP ============

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SendOtpRequest {
    #[serde(alias = "phone")]
    pub phone_number: Option<String>,
    /// Role for a phone seen for the first time. Defaults to parent.
    pub user_type: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ResendOtpRequest {
    #[serde(alias = "phone")]
    pub phone_number: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SendOtpResponse {
    pub message: String,
    pub expires_in: i64,
    pub sms_sent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otp_code: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct VerifyOtpRequest {
    #[serde(alias = "phone")]
    pub phone_number: Option<String>,
    #[serde(alias = "otp")]
    pub otp_code: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyOtpResponse {
    pub message: String,
    pub token: String,
    pub user: LoginUser,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginUser {
    pub id: Uuid,
    pub phone_number: String,
    pub user_type: Role,
    pub first_name: String,
    pub last_name: String,
    /// True on the first successful verification for this phone.
    pub is_new_user: bool,
    pub created_at: DateTime<FixedOffset>,
    pub is_active: bool,
}

impl LoginUser {
    pub fn new(user: &users::Model, is_new_user: bool) -> Self {
        Self {
            id: user.user_id,
            phone_number: user.phone_number.clone(),
            user_type: user.user_type,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            is_new_user,
            created_at: user.created_at,
            is_active: user.is_active,
        }
    }
}

// ============ Generic ============

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_seconds: Option<u64>,
}

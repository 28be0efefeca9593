use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One OTP challenge. Rows are never deleted; they double as an audit trail.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "otp_verifications")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub phone_number: String,
    pub otp_code: String,
    pub created_at: DateTimeWithTimeZone,
    pub expires_at: DateTimeWithTimeZone,
    pub is_verified: bool,
    pub attempts: i32,
}

/// Where a challenge sits in its lifecycle. Everything but `Pending` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeStatus {
    Pending,
    Verified,
    Expired,
    Exhausted,
}

impl Model {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at.with_timezone(&Utc)
    }

    pub fn is_exhausted(&self, max_attempts: i32) -> bool {
        self.attempts >= max_attempts
    }

    /// `now < expires_at AND attempts < max AND not verified`
    pub fn is_valid(&self, now: DateTime<Utc>, max_attempts: i32) -> bool {
        !self.is_expired(now) && !self.is_verified && !self.is_exhausted(max_attempts)
    }

    pub fn status(&self, now: DateTime<Utc>, max_attempts: i32) -> ChallengeStatus {
        if self.is_verified {
            ChallengeStatus::Verified
        } else if self.is_expired(now) {
            ChallengeStatus::Expired
        } else if self.is_exhausted(max_attempts) {
            ChallengeStatus::Exhausted
        } else {
            ChallengeStatus::Pending
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

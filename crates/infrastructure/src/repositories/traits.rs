use chrono::{DateTime, Utc};
use uuid::Uuid;
use vantrack_core::domain::{LocationFix, ProfileChanges, Role};
use vantrack_core::entities::{
    auth_tokens, child_van_assignments, locations, otp_verifications, users, van_assignments,
};

#[async_trait::async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, user_id: Uuid) -> anyhow::Result<Option<users::Model>>;
    async fn find_by_phone_number(&self, phone_number: &str)
        -> anyhow::Result<Option<users::Model>>;
    /// Returns the existing user untouched, or inserts one with `role`.
    /// The flag is true only when this call inserted the row.
    async fn get_or_create(
        &self,
        phone_number: &str,
        role: Role,
        now: DateTime<Utc>,
    ) -> anyhow::Result<(users::Model, bool)>;
    async fn update_profile(
        &self,
        user_id: Uuid,
        changes: &ProfileChanges,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Option<users::Model>>;
    async fn set_gps_tracking(
        &self,
        user_id: Uuid,
        enabled: bool,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Option<users::Model>>;
    /// Stamps `phone_verified_at` if it is still empty. True when this call stamped it.
    async fn mark_phone_verified(&self, user_id: Uuid, now: DateTime<Utc>) -> anyhow::Result<bool>;
}

#[async_trait::async_trait]
pub trait OtpRepository: Send + Sync {
    /// Most recently created challenge for the phone, verified or not.
    async fn latest_for_phone(
        &self,
        phone_number: &str,
    ) -> anyhow::Result<Option<otp_verifications::Model>>;
    /// Most recently created unverified challenge for the phone.
    async fn latest_unverified_for_phone(
        &self,
        phone_number: &str,
    ) -> anyhow::Result<Option<otp_verifications::Model>>;
    /// Most recently created unverified challenge matching both phone and code.
    async fn latest_unverified_matching(
        &self,
        phone_number: &str,
        otp_code: &str,
    ) -> anyhow::Result<Option<otp_verifications::Model>>;
    async fn create(
        &self,
        phone_number: &str,
        otp_code: &str,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> anyhow::Result<otp_verifications::Model>;
    async fn record_failed_attempt(&self, id: i64) -> anyhow::Result<otp_verifications::Model>;
    async fn mark_verified(&self, id: i64) -> anyhow::Result<otp_verifications::Model>;
}

#[async_trait::async_trait]
pub trait TokenRepository: Send + Sync {
    /// Returns the user's token, inserting `candidate_key` if there is none yet.
    async fn get_or_create_for_user(
        &self,
        user_id: Uuid,
        candidate_key: &str,
        now: DateTime<Utc>,
    ) -> anyhow::Result<(auth_tokens::Model, bool)>;
    async fn find_by_key(&self, key: &str) -> anyhow::Result<Option<auth_tokens::Model>>;
    async fn delete_for_user(&self, user_id: Uuid) -> anyhow::Result<bool>;
}

#[async_trait::async_trait]
pub trait LocationRepository: Send + Sync {
    /// Deactivates the driver's active row and inserts `fix` as the new active one.
    /// Callers must serialize calls per driver.
    async fn replace_active(
        &self,
        driver_id: Uuid,
        fix: &LocationFix,
        now: DateTime<Utc>,
    ) -> anyhow::Result<locations::Model>;
    async fn find_active(&self, driver_id: Uuid) -> anyhow::Result<Option<locations::Model>>;
    /// Newest first.
    async fn history(&self, driver_id: Uuid, limit: u64) -> anyhow::Result<Vec<locations::Model>>;
}

#[async_trait::async_trait]
pub trait AssignmentRepository: Send + Sync {
    /// Active child assignments of a parent, ordered by child name.
    async fn active_children_for_parent(
        &self,
        parent_id: Uuid,
    ) -> anyhow::Result<Vec<child_van_assignments::Model>>;
    async fn find_van(&self, van_assignment_id: i64)
        -> anyhow::Result<Option<van_assignments::Model>>;
}

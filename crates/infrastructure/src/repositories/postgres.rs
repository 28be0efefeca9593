// PostgreSQL implementation of the repositories, on top of Sea-ORM.

use anyhow::Context;
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;
use vantrack_core::domain::{LocationFix, ProfileChanges, Role};
use vantrack_core::entities::{
    auth_tokens, child_van_assignments, locations, otp_verifications, users, van_assignments,
};

use super::blank_to_none;
use super::traits::{
    AssignmentRepository, LocationRepository, OtpRepository, TokenRepository, UserRepository,
};

fn stamp(now: DateTime<Utc>) -> DateTime<FixedOffset> {
    now.into()
}

// ============ Users ============

pub struct PostgresUserRepository {
    db: DatabaseConnection,
}

impl PostgresUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_id(&self, user_id: Uuid) -> anyhow::Result<Option<users::Model>> {
        Ok(users::Entity::find_by_id(user_id).one(&self.db).await?)
    }

    async fn find_by_phone_number(
        &self,
        phone_number: &str,
    ) -> anyhow::Result<Option<users::Model>> {
        Ok(users::Entity::find()
            .filter(users::Column::PhoneNumber.eq(phone_number))
            .one(&self.db)
            .await?)
    }

    async fn get_or_create(
        &self,
        phone_number: &str,
        role: Role,
        now: DateTime<Utc>,
    ) -> anyhow::Result<(users::Model, bool)> {
        if let Some(existing) = self.find_by_phone_number(phone_number).await? {
            return Ok((existing, false));
        }

        let candidate = users::ActiveModel {
            user_id: Set(Uuid::new_v4()),
            phone_number: Set(phone_number.to_string()),
            user_type: Set(role),
            first_name: Set(String::new()),
            last_name: Set(String::new()),
            address: Set(None),
            emergency_contact: Set(None),
            is_active: Set(true),
            gps_tracking_enabled: Set(false),
            phone_verified_at: Set(None),
            created_at: Set(stamp(now)),
            updated_at: Set(stamp(now)),
        };

        // A concurrent insert for the same phone wins; we then read its row.
        let inserted = users::Entity::insert(candidate)
            .on_conflict(
                OnConflict::column(users::Column::PhoneNumber)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        let user = self
            .find_by_phone_number(phone_number)
            .await?
            .context("user row missing after insert")?;
        Ok((user, inserted == 1))
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        changes: &ProfileChanges,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Option<users::Model>> {
        let Some(user) = self.find_by_id(user_id).await? else {
            return Ok(None);
        };

        let mut active = user.into_active_model();
        if let Some(first_name) = &changes.first_name {
            active.first_name = Set(first_name.clone());
        }
        if let Some(last_name) = &changes.last_name {
            active.last_name = Set(last_name.clone());
        }
        if let Some(address) = &changes.address {
            active.address = Set(blank_to_none(address));
        }
        if let Some(contact) = &changes.emergency_contact {
            active.emergency_contact = Set(blank_to_none(contact));
        }
        active.updated_at = Set(stamp(now));

        Ok(Some(active.update(&self.db).await?))
    }

    async fn set_gps_tracking(
        &self,
        user_id: Uuid,
        enabled: bool,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Option<users::Model>> {
        let Some(user) = self.find_by_id(user_id).await? else {
            return Ok(None);
        };

        let mut active = user.into_active_model();
        active.gps_tracking_enabled = Set(enabled);
        active.updated_at = Set(stamp(now));
        Ok(Some(active.update(&self.db).await?))
    }

    async fn mark_phone_verified(&self, user_id: Uuid, now: DateTime<Utc>) -> anyhow::Result<bool> {
        let result = users::Entity::update_many()
            .col_expr(users::Column::PhoneVerifiedAt, Expr::value(stamp(now)))
            .col_expr(users::Column::UpdatedAt, Expr::value(stamp(now)))
            .filter(users::Column::UserId.eq(user_id))
            .filter(users::Column::PhoneVerifiedAt.is_null())
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected == 1)
    }
}

// ============ OTP challenges ============

pub struct PostgresOtpRepository {
    db: DatabaseConnection,
}

impl PostgresOtpRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn fetch(&self, id: i64) -> anyhow::Result<otp_verifications::Model> {
        otp_verifications::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .with_context(|| format!("otp challenge {id} not found"))
    }
}

#[async_trait::async_trait]
impl OtpRepository for PostgresOtpRepository {
    async fn latest_for_phone(
        &self,
        phone_number: &str,
    ) -> anyhow::Result<Option<otp_verifications::Model>> {
        Ok(otp_verifications::Entity::find()
            .filter(otp_verifications::Column::PhoneNumber.eq(phone_number))
            .order_by_desc(otp_verifications::Column::CreatedAt)
            .order_by_desc(otp_verifications::Column::Id)
            .one(&self.db)
            .await?)
    }

    async fn latest_unverified_for_phone(
        &self,
        phone_number: &str,
    ) -> anyhow::Result<Option<otp_verifications::Model>> {
        Ok(otp_verifications::Entity::find()
            .filter(otp_verifications::Column::PhoneNumber.eq(phone_number))
            .filter(otp_verifications::Column::IsVerified.eq(false))
            .order_by_desc(otp_verifications::Column::CreatedAt)
            .order_by_desc(otp_verifications::Column::Id)
            .one(&self.db)
            .await?)
    }

    async fn latest_unverified_matching(
        &self,
        phone_number: &str,
        otp_code: &str,
    ) -> anyhow::Result<Option<otp_verifications::Model>> {
        Ok(otp_verifications::Entity::find()
            .filter(otp_verifications::Column::PhoneNumber.eq(phone_number))
            .filter(otp_verifications::Column::OtpCode.eq(otp_code))
            .filter(otp_verifications::Column::IsVerified.eq(false))
            .order_by_desc(otp_verifications::Column::CreatedAt)
            .order_by_desc(otp_verifications::Column::Id)
            .one(&self.db)
            .await?)
    }

    async fn create(
        &self,
        phone_number: &str,
        otp_code: &str,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> anyhow::Result<otp_verifications::Model> {
        let challenge = otp_verifications::ActiveModel {
            phone_number: Set(phone_number.to_string()),
            otp_code: Set(otp_code.to_string()),
            created_at: Set(stamp(created_at)),
            expires_at: Set(stamp(expires_at)),
            is_verified: Set(false),
            attempts: Set(0),
            ..Default::default()
        };
        Ok(challenge.insert(&self.db).await?)
    }

    async fn record_failed_attempt(&self, id: i64) -> anyhow::Result<otp_verifications::Model> {
        otp_verifications::Entity::update_many()
            .col_expr(
                otp_verifications::Column::Attempts,
                Expr::col(otp_verifications::Column::Attempts).add(1),
            )
            .filter(otp_verifications::Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        self.fetch(id).await
    }

    async fn mark_verified(&self, id: i64) -> anyhow::Result<otp_verifications::Model> {
        otp_verifications::Entity::update_many()
            .col_expr(otp_verifications::Column::IsVerified, Expr::value(true))
            .filter(otp_verifications::Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        self.fetch(id).await
    }
}

// ============ Bearer tokens ============

pub struct PostgresTokenRepository {
    db: DatabaseConnection,
}

impl PostgresTokenRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_for_user(&self, user_id: Uuid) -> anyhow::Result<Option<auth_tokens::Model>> {
        Ok(auth_tokens::Entity::find()
            .filter(auth_tokens::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?)
    }
}

#[async_trait::async_trait]
impl TokenRepository for PostgresTokenRepository {
    async fn get_or_create_for_user(
        &self,
        user_id: Uuid,
        candidate_key: &str,
        now: DateTime<Utc>,
    ) -> anyhow::Result<(auth_tokens::Model, bool)> {
        if let Some(existing) = self.find_for_user(user_id).await? {
            return Ok((existing, false));
        }

        let token = auth_tokens::ActiveModel {
            key: Set(candidate_key.to_string()),
            user_id: Set(user_id),
            created_at: Set(stamp(now)),
        };
        let inserted = auth_tokens::Entity::insert(token)
            .on_conflict(
                OnConflict::column(auth_tokens::Column::UserId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        let token = self
            .find_for_user(user_id)
            .await?
            .context("token row missing after insert")?;
        Ok((token, inserted == 1))
    }

    async fn find_by_key(&self, key: &str) -> anyhow::Result<Option<auth_tokens::Model>> {
        Ok(auth_tokens::Entity::find_by_id(key.to_string())
            .one(&self.db)
            .await?)
    }

    async fn delete_for_user(&self, user_id: Uuid) -> anyhow::Result<bool> {
        let result = auth_tokens::Entity::delete_many()
            .filter(auth_tokens::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }
}

// ============ Locations ============

pub struct PostgresLocationRepository {
    db: DatabaseConnection,
}

impl PostgresLocationRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl LocationRepository for PostgresLocationRepository {
    async fn replace_active(
        &self,
        driver_id: Uuid,
        fix: &LocationFix,
        now: DateTime<Utc>,
    ) -> anyhow::Result<locations::Model> {
        let txn = self.db.begin().await?;

        // Row lock on the driver serializes pushes across server instances.
        users::Entity::find_by_id(driver_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .with_context(|| format!("driver {driver_id} not found"))?;

        locations::Entity::update_many()
            .col_expr(locations::Column::IsActive, Expr::value(false))
            .filter(locations::Column::DriverId.eq(driver_id))
            .filter(locations::Column::IsActive.eq(true))
            .exec(&txn)
            .await?;

        let location = locations::ActiveModel {
            driver_id: Set(driver_id),
            latitude: Set(fix.latitude),
            longitude: Set(fix.longitude),
            accuracy: Set(fix.accuracy),
            speed: Set(fix.speed),
            heading: Set(fix.heading),
            altitude: Set(fix.altitude),
            created_at: Set(stamp(now)),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Ok(location)
    }

    async fn find_active(&self, driver_id: Uuid) -> anyhow::Result<Option<locations::Model>> {
        Ok(locations::Entity::find()
            .filter(locations::Column::DriverId.eq(driver_id))
            .filter(locations::Column::IsActive.eq(true))
            .order_by_desc(locations::Column::CreatedAt)
            .one(&self.db)
            .await?)
    }

    async fn history(&self, driver_id: Uuid, limit: u64) -> anyhow::Result<Vec<locations::Model>> {
        Ok(locations::Entity::find()
            .filter(locations::Column::DriverId.eq(driver_id))
            .order_by_desc(locations::Column::CreatedAt)
            .order_by_desc(locations::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await?)
    }
}

// ============ Van assignments ============

pub struct PostgresAssignmentRepository {
    db: DatabaseConnection,
}

impl PostgresAssignmentRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl AssignmentRepository for PostgresAssignmentRepository {
    async fn active_children_for_parent(
        &self,
        parent_id: Uuid,
    ) -> anyhow::Result<Vec<child_van_assignments::Model>> {
        Ok(child_van_assignments::Entity::find()
            .filter(child_van_assignments::Column::ParentId.eq(parent_id))
            .filter(child_van_assignments::Column::IsActive.eq(true))
            .order_by_asc(child_van_assignments::Column::ChildName)
            .all(&self.db)
            .await?)
    }

    async fn find_van(
        &self,
        van_assignment_id: i64,
    ) -> anyhow::Result<Option<van_assignments::Model>> {
        Ok(van_assignments::Entity::find_by_id(van_assignment_id)
            .one(&self.db)
            .await?)
    }
}

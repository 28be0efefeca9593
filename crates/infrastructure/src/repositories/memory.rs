// In-memory implementation of every repository port. Backs the test suites
// and local runs without PostgreSQL.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use anyhow::{anyhow, Context};
use chrono::{DateTime, FixedOffset, Utc};
use uuid::Uuid;
use vantrack_core::domain::{LocationFix, ProfileChanges, Role};
use vantrack_core::entities::{
    auth_tokens, child_van_assignments, locations, otp_verifications, users, van_assignments,
};

use super::blank_to_none;
use super::traits::{
    AssignmentRepository, LocationRepository, OtpRepository, TokenRepository, UserRepository,
};

#[derive(Default)]
struct State {
    users: HashMap<Uuid, users::Model>,
    otps: Vec<otp_verifications::Model>,
    tokens: HashMap<Uuid, auth_tokens::Model>,
    locations: Vec<locations::Model>,
    vans: HashMap<i64, van_assignments::Model>,
    children: Vec<child_van_assignments::Model>,
    next_id: i64,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

fn stamp(now: DateTime<Utc>) -> DateTime<FixedOffset> {
    now.into()
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> anyhow::Result<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| anyhow!("in-memory store lock poisoned"))
    }

    /// Inserts a van; the id on `van` is replaced with a fresh one.
    pub fn insert_van(&self, mut van: van_assignments::Model) -> anyhow::Result<van_assignments::Model> {
        let mut state = self.state()?;
        if state.vans.values().any(|v| v.van_number == van.van_number) {
            return Err(anyhow!("van {} already exists", van.van_number));
        }
        van.id = state.next_id();
        state.vans.insert(van.id, van.clone());
        Ok(van)
    }

    /// Inserts a child assignment; the id on `child` is replaced with a fresh one.
    pub fn insert_child(
        &self,
        mut child: child_van_assignments::Model,
    ) -> anyhow::Result<child_van_assignments::Model> {
        let mut state = self.state()?;
        if state
            .children
            .iter()
            .any(|c| c.parent_id == child.parent_id && c.child_name == child.child_name)
        {
            return Err(anyhow!(
                "child {} already assigned for parent {}",
                child.child_name,
                child.parent_id
            ));
        }
        child.id = state.next_id();
        state.children.push(child.clone());
        Ok(child)
    }

    pub fn set_user_active(&self, user_id: Uuid, is_active: bool) -> anyhow::Result<()> {
        let mut state = self.state()?;
        let user = state
            .users
            .get_mut(&user_id)
            .with_context(|| format!("user {user_id} not found"))?;
        user.is_active = is_active;
        Ok(())
    }

    pub fn challenges_for(&self, phone_number: &str) -> anyhow::Result<Vec<otp_verifications::Model>> {
        Ok(self
            .state()?
            .otps
            .iter()
            .filter(|o| o.phone_number == phone_number)
            .cloned()
            .collect())
    }

    pub fn locations_for(&self, driver_id: Uuid) -> anyhow::Result<Vec<locations::Model>> {
        Ok(self
            .state()?
            .locations
            .iter()
            .filter(|l| l.driver_id == driver_id)
            .cloned()
            .collect())
    }
}

/// Newest first, ties broken by insertion order.
fn newest<'a, T: 'a>(
    rows: impl Iterator<Item = &'a T>,
    key: impl Fn(&T) -> (DateTime<FixedOffset>, i64),
) -> Option<&'a T> {
    rows.max_by_key(|row| key(row))
}

#[async_trait::async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_id(&self, user_id: Uuid) -> anyhow::Result<Option<users::Model>> {
        Ok(self.state()?.users.get(&user_id).cloned())
    }

    async fn find_by_phone_number(
        &self,
        phone_number: &str,
    ) -> anyhow::Result<Option<users::Model>> {
        Ok(self
            .state()?
            .users
            .values()
            .find(|u| u.phone_number == phone_number)
            .cloned())
    }

    async fn get_or_create(
        &self,
        phone_number: &str,
        role: Role,
        now: DateTime<Utc>,
    ) -> anyhow::Result<(users::Model, bool)> {
        let mut state = self.state()?;
        if let Some(existing) = state.users.values().find(|u| u.phone_number == phone_number) {
            return Ok((existing.clone(), false));
        }

        let user = users::Model {
            user_id: Uuid::new_v4(),
            phone_number: phone_number.to_string(),
            user_type: role,
            first_name: String::new(),
            last_name: String::new(),
            address: None,
            emergency_contact: None,
            is_active: true,
            gps_tracking_enabled: false,
            phone_verified_at: None,
            created_at: stamp(now),
            updated_at: stamp(now),
        };
        state.users.insert(user.user_id, user.clone());
        Ok((user, true))
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        changes: &ProfileChanges,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Option<users::Model>> {
        let mut state = self.state()?;
        let Some(user) = state.users.get_mut(&user_id) else {
            return Ok(None);
        };

        if let Some(first_name) = &changes.first_name {
            user.first_name = first_name.clone();
        }
        if let Some(last_name) = &changes.last_name {
            user.last_name = last_name.clone();
        }
        if let Some(address) = &changes.address {
            user.address = blank_to_none(address);
        }
        if let Some(contact) = &changes.emergency_contact {
            user.emergency_contact = blank_to_none(contact);
        }
        user.updated_at = stamp(now);
        Ok(Some(user.clone()))
    }

    async fn set_gps_tracking(
        &self,
        user_id: Uuid,
        enabled: bool,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Option<users::Model>> {
        let mut state = self.state()?;
        let Some(user) = state.users.get_mut(&user_id) else {
            return Ok(None);
        };
        user.gps_tracking_enabled = enabled;
        user.updated_at = stamp(now);
        Ok(Some(user.clone()))
    }

    async fn mark_phone_verified(&self, user_id: Uuid, now: DateTime<Utc>) -> anyhow::Result<bool> {
        let mut state = self.state()?;
        match state.users.get_mut(&user_id) {
            Some(user) if user.phone_verified_at.is_none() => {
                user.phone_verified_at = Some(stamp(now));
                user.updated_at = stamp(now);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait::async_trait]
impl OtpRepository for InMemoryStore {
    async fn latest_for_phone(
        &self,
        phone_number: &str,
    ) -> anyhow::Result<Option<otp_verifications::Model>> {
        let state = self.state()?;
        Ok(newest(
            state.otps.iter().filter(|o| o.phone_number == phone_number),
            |o| (o.created_at, o.id),
        )
        .cloned())
    }

    async fn latest_unverified_for_phone(
        &self,
        phone_number: &str,
    ) -> anyhow::Result<Option<otp_verifications::Model>> {
        let state = self.state()?;
        Ok(newest(
            state
                .otps
                .iter()
                .filter(|o| o.phone_number == phone_number && !o.is_verified),
            |o| (o.created_at, o.id),
        )
        .cloned())
    }

    async fn latest_unverified_matching(
        &self,
        phone_number: &str,
        otp_code: &str,
    ) -> anyhow::Result<Option<otp_verifications::Model>> {
        let state = self.state()?;
        Ok(newest(
            state.otps.iter().filter(|o| {
                o.phone_number == phone_number && o.otp_code == otp_code && !o.is_verified
            }),
            |o| (o.created_at, o.id),
        )
        .cloned())
    }

    async fn create(
        &self,
        phone_number: &str,
        otp_code: &str,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> anyhow::Result<otp_verifications::Model> {
        // Lets a concurrent issuer read the same "latest" row before this insert lands.
        tokio::task::yield_now().await;
        let mut state = self.state()?;
        let challenge = otp_verifications::Model {
            id: state.next_id(),
            phone_number: phone_number.to_string(),
            otp_code: otp_code.to_string(),
            created_at: stamp(created_at),
            expires_at: stamp(expires_at),
            is_verified: false,
            attempts: 0,
        };
        state.otps.push(challenge.clone());
        Ok(challenge)
    }

    async fn record_failed_attempt(&self, id: i64) -> anyhow::Result<otp_verifications::Model> {
        let mut state = self.state()?;
        let challenge = state
            .otps
            .iter_mut()
            .find(|o| o.id == id)
            .with_context(|| format!("otp challenge {id} not found"))?;
        challenge.attempts += 1;
        Ok(challenge.clone())
    }

    async fn mark_verified(&self, id: i64) -> anyhow::Result<otp_verifications::Model> {
        let mut state = self.state()?;
        let challenge = state
            .otps
            .iter_mut()
            .find(|o| o.id == id)
            .with_context(|| format!("otp challenge {id} not found"))?;
        challenge.is_verified = true;
        Ok(challenge.clone())
    }
}

#[async_trait::async_trait]
impl TokenRepository for InMemoryStore {
    async fn get_or_create_for_user(
        &self,
        user_id: Uuid,
        candidate_key: &str,
        now: DateTime<Utc>,
    ) -> anyhow::Result<(auth_tokens::Model, bool)> {
        let mut state = self.state()?;
        if let Some(existing) = state.tokens.get(&user_id) {
            return Ok((existing.clone(), false));
        }
        let token = auth_tokens::Model {
            key: candidate_key.to_string(),
            user_id,
            created_at: stamp(now),
        };
        state.tokens.insert(user_id, token.clone());
        Ok((token, true))
    }

    async fn find_by_key(&self, key: &str) -> anyhow::Result<Option<auth_tokens::Model>> {
        Ok(self
            .state()?
            .tokens
            .values()
            .find(|t| t.key == key)
            .cloned())
    }

    async fn delete_for_user(&self, user_id: Uuid) -> anyhow::Result<bool> {
        Ok(self.state()?.tokens.remove(&user_id).is_some())
    }
}

#[async_trait::async_trait]
impl LocationRepository for InMemoryStore {
    async fn replace_active(
        &self,
        driver_id: Uuid,
        fix: &LocationFix,
        now: DateTime<Utc>,
    ) -> anyhow::Result<locations::Model> {
        // Deactivate and insert are two separate steps here, like a store
        // without row locks. Interleaved callers can end up with two active rows.
        {
            let mut state = self.state()?;
            for location in state
                .locations
                .iter_mut()
                .filter(|l| l.driver_id == driver_id && l.is_active)
            {
                location.is_active = false;
            }
        }

        tokio::task::yield_now().await;

        let mut state = self.state()?;
        let location = locations::Model {
            id: state.next_id(),
            driver_id,
            latitude: fix.latitude,
            longitude: fix.longitude,
            accuracy: fix.accuracy,
            speed: fix.speed,
            heading: fix.heading,
            altitude: fix.altitude,
            created_at: stamp(now),
            is_active: true,
        };
        state.locations.push(location.clone());
        Ok(location)
    }

    async fn find_active(&self, driver_id: Uuid) -> anyhow::Result<Option<locations::Model>> {
        let state = self.state()?;
        Ok(newest(
            state
                .locations
                .iter()
                .filter(|l| l.driver_id == driver_id && l.is_active),
            |l| (l.created_at, l.id),
        )
        .cloned())
    }

    async fn history(&self, driver_id: Uuid, limit: u64) -> anyhow::Result<Vec<locations::Model>> {
        let state = self.state()?;
        let mut rows: Vec<_> = state
            .locations
            .iter()
            .filter(|l| l.driver_id == driver_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        rows.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(rows)
    }
}

#[async_trait::async_trait]
impl AssignmentRepository for InMemoryStore {
    async fn active_children_for_parent(
        &self,
        parent_id: Uuid,
    ) -> anyhow::Result<Vec<child_van_assignments::Model>> {
        let state = self.state()?;
        let mut rows: Vec<_> = state
            .children
            .iter()
            .filter(|c| c.parent_id == parent_id && c.is_active)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.child_name.cmp(&b.child_name));
        Ok(rows)
    }

    async fn find_van(
        &self,
        van_assignment_id: i64,
    ) -> anyhow::Result<Option<van_assignments::Model>> {
        Ok(self.state()?.vans.get(&van_assignment_id).cloned())
    }
}

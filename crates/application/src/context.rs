use std::sync::Arc;
use std::time::Duration;

use anyhow::ensure;
use chrono::{DateTime, Utc};
use infrastructure::database::DatabaseConnection;
use infrastructure::locks::KeyedLocks;
use infrastructure::repositories::{
    AssignmentRepository, InMemoryStore, LocationRepository, OtpRepository,
    PostgresAssignmentRepository, PostgresLocationRepository, PostgresOtpRepository,
    PostgresTokenRepository, PostgresUserRepository, TokenRepository, UserRepository,
};
use infrastructure::sms::SmsNotifier;
use mockable::{Clock, DefaultClock};
use uuid::Uuid;

/// OTP policy knobs.
#[derive(Debug, Clone)]
pub struct OtpConfig {
    pub ttl_seconds: i64,
    pub code_length: usize,
    pub max_attempts: i32,
    /// Minimum spacing between two challenges for the same phone.
    pub rate_limit_seconds: i64,
    /// Echo the code in issue/resend responses. Development only.
    pub debug_echo: bool,
    /// Deadline for one SMS delivery; a late delivery counts as failed.
    pub delivery_timeout: Duration,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: 600,
            code_length: 6,
            max_attempts: 3,
            rate_limit_seconds: 60,
            debug_echo: false,
            delivery_timeout: Duration::from_secs(10),
        }
    }
}

impl OtpConfig {
    /// Codes are stored in `VARCHAR(6)`.
    pub const CODE_LENGTHS: std::ops::RangeInclusive<usize> = 4..=6;

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            Self::CODE_LENGTHS.contains(&self.code_length),
            "OTP_LENGTH must be between 4 and 6, got {}",
            self.code_length
        );
        ensure!(
            self.ttl_seconds > 0,
            "OTP_TTL_SECONDS must be positive, got {}",
            self.ttl_seconds
        );
        ensure!(
            self.max_attempts >= 1,
            "OTP_MAX_ATTEMPTS must be at least 1, got {}",
            self.max_attempts
        );
        ensure!(
            self.rate_limit_seconds >= 0,
            "OTP_RATE_LIMIT_SECONDS must not be negative, got {}",
            self.rate_limit_seconds
        );
        ensure!(
            !self.delivery_timeout.is_zero(),
            "SMS_TIMEOUT_SECONDS must be positive"
        );
        Ok(())
    }
}

/// Everything a use case needs, shared across requests.
#[derive(Clone)]
pub struct AppContext {
    pub users: Arc<dyn UserRepository>,
    pub otps: Arc<dyn OtpRepository>,
    pub tokens: Arc<dyn TokenRepository>,
    pub locations: Arc<dyn LocationRepository>,
    pub assignments: Arc<dyn AssignmentRepository>,
    pub notifier: Arc<dyn SmsNotifier>,
    pub clock: Arc<dyn Clock + Send + Sync>,
    /// Serializes issue, resend and verify per normalized phone.
    pub otp_locks: Arc<KeyedLocks<String>>,
    /// Serializes location pushes per driver.
    pub location_locks: Arc<KeyedLocks<Uuid>>,
    pub otp: OtpConfig,
}

impl AppContext {
    pub fn postgres(
        db: DatabaseConnection,
        notifier: Arc<dyn SmsNotifier>,
        otp: OtpConfig,
    ) -> Self {
        Self {
            users: Arc::new(PostgresUserRepository::new(db.clone())),
            otps: Arc::new(PostgresOtpRepository::new(db.clone())),
            tokens: Arc::new(PostgresTokenRepository::new(db.clone())),
            locations: Arc::new(PostgresLocationRepository::new(db.clone())),
            assignments: Arc::new(PostgresAssignmentRepository::new(db)),
            notifier,
            clock: Arc::new(DefaultClock),
            otp_locks: Arc::new(KeyedLocks::new()),
            location_locks: Arc::new(KeyedLocks::new()),
            otp,
        }
    }

    pub fn in_memory(
        store: Arc<InMemoryStore>,
        notifier: Arc<dyn SmsNotifier>,
        clock: Arc<dyn Clock + Send + Sync>,
        otp: OtpConfig,
    ) -> Self {
        Self {
            users: store.clone(),
            otps: store.clone(),
            tokens: store.clone(),
            locations: store.clone(),
            assignments: store,
            notifier,
            clock,
            otp_locks: Arc::new(KeyedLocks::new()),
            location_locks: Arc::new(KeyedLocks::new()),
            otp,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.utc()
    }
}

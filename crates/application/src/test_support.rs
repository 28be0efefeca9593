// Fixtures shared by this crate's tests and the API crate's integration tests.

use std::sync::{Arc, Mutex, PoisonError};

use anyhow::bail;
use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use infrastructure::repositories::InMemoryStore;
use infrastructure::sms::SmsNotifier;
use mockable::Clock;

use crate::context::{AppContext, OtpConfig};

/// A clock tests move by hand.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance(&self, delta: Duration) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) += delta;
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub fn fixture_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 7, 15, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// Keeps every delivered (phone, code) pair.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Code from the most recent delivery to `phone_number`.
    pub fn last_code_for(&self, phone_number: &str) -> Option<String> {
        self.sent()
            .into_iter()
            .rev()
            .find(|(phone, _)| phone == phone_number)
            .map(|(_, code)| code)
    }
}

#[async_trait::async_trait]
impl SmsNotifier for RecordingNotifier {
    async fn send_otp(&self, phone_number: &str, otp_code: &str) -> anyhow::Result<()> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((phone_number.to_string(), otp_code.to_string()));
        Ok(())
    }
}

pub struct FailingNotifier;

#[async_trait::async_trait]
impl SmsNotifier for FailingNotifier {
    async fn send_otp(&self, _phone_number: &str, _otp_code: &str) -> anyhow::Result<()> {
        bail!("provider unavailable")
    }
}

/// Never answers, like a provider whose socket has stalled.
pub struct StalledNotifier;

#[async_trait::async_trait]
impl SmsNotifier for StalledNotifier {
    async fn send_otp(&self, _phone_number: &str, _otp_code: &str) -> anyhow::Result<()> {
        std::future::pending().await
    }
}

/// An in-memory context plus handles on its moving parts.
pub struct TestHarness {
    pub ctx: AppContext,
    pub store: Arc<InMemoryStore>,
    pub clock: Arc<MutableClock>,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_config(OtpConfig::default())
    }

    pub fn with_config(otp: OtpConfig) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let clock = Arc::new(MutableClock::new(fixture_time()));
        let notifier = Arc::new(RecordingNotifier::default());
        let ctx = AppContext::in_memory(store.clone(), notifier.clone(), clock.clone(), otp);
        Self {
            ctx,
            store,
            clock,
            notifier,
        }
    }

    pub fn with_notifier(notifier: Arc<dyn SmsNotifier>) -> Self {
        let mut harness = Self::new();
        harness.ctx.notifier = notifier;
        harness
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

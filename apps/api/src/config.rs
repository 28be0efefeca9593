use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use application::OtpConfig;
use infrastructure::sms::TwilioOptions;

/// Where configuration values come from. The process environment in
/// production, a map in tests.
pub trait ConfigSource {
    fn string(&self, key: &str) -> Option<String>;
}

pub struct ProcessEnv;

impl ConfigSource for ProcessEnv {
    fn string(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl ConfigSource for HashMap<String, String> {
    fn string(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub otp: OtpConfig,
    /// `None` when any Twilio credential is missing.
    pub twilio: Option<TwilioOptions>,
    pub auth_rate_limit_per_minute: u32,
    pub global_rate_limit_per_minute: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_source(&ProcessEnv)
    }

    pub fn from_source(env: &impl ConfigSource) -> anyhow::Result<Self> {
        let defaults = OtpConfig::default();
        let otp = OtpConfig {
            ttl_seconds: parse_or(env, "OTP_TTL_SECONDS", defaults.ttl_seconds)?,
            code_length: parse_or(env, "OTP_LENGTH", defaults.code_length)?,
            max_attempts: parse_or(env, "OTP_MAX_ATTEMPTS", defaults.max_attempts)?,
            rate_limit_seconds: parse_or(env, "OTP_RATE_LIMIT_SECONDS", defaults.rate_limit_seconds)?,
            debug_echo: parse_or(env, "OTP_DEBUG_ECHO", defaults.debug_echo)?,
            delivery_timeout: Duration::from_secs(parse_or(
                env,
                "SMS_TIMEOUT_SECONDS",
                defaults.delivery_timeout.as_secs(),
            )?),
        };
        otp.validate()?;

        let twilio = match (
            non_empty(env, "TWILIO_ACCOUNT_SID"),
            non_empty(env, "TWILIO_AUTH_TOKEN"),
            non_empty(env, "TWILIO_FROM_NUMBER"),
        ) {
            (Some(account_sid), Some(auth_token), Some(from_number)) => Some(TwilioOptions {
                account_sid,
                auth_token,
                from_number,
            }),
            _ => None,
        };

        Ok(Self {
            database_url: non_empty(env, "DATABASE_URL").context("DATABASE_URL must be set")?,
            server_host: non_empty(env, "SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            server_port: parse_or(env, "SERVER_PORT", 8000)?,
            otp,
            twilio,
            auth_rate_limit_per_minute: parse_or(env, "AUTH_RATE_LIMIT_PER_MINUTE", 10)?,
            global_rate_limit_per_minute: parse_or(env, "GLOBAL_RATE_LIMIT_PER_MINUTE", 100)?,
        })
    }
}

fn non_empty(env: &impl ConfigSource, key: &str) -> Option<String> {
    env.string(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_or<T>(env: &impl ConfigSource, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match non_empty(env, key) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("invalid value for {key}: {raw}")),
        None => Ok(default),
    }
}

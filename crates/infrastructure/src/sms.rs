use std::collections::HashMap;
use std::time::Duration;

use anyhow::{bail, Context};
use reqwest::Client;
use serde::Deserialize;

/// Delivers OTP codes. Failures are reported to the caller, never retried.
#[async_trait::async_trait]
pub trait SmsNotifier: Send + Sync {
    async fn send_otp(&self, phone_number: &str, otp_code: &str) -> anyhow::Result<()>;
}

#[derive(Debug, Clone)]
pub struct TwilioOptions {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
}

const TWILIO_API_BASE: &str = "https://api.twilio.com";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct TwilioSmsNotifier {
    options: TwilioOptions,
    client: Client,
    api_base: String,
    otp_ttl_seconds: i64,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    sid: String,
}

impl TwilioSmsNotifier {
    /// `timeout` bounds the whole request, connect included.
    pub fn new(options: TwilioOptions, timeout: Duration, otp_ttl_seconds: i64) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(CONNECT_TIMEOUT))
            .build()
            .context("failed to build Twilio HTTP client")?;

        Ok(Self {
            options,
            client,
            api_base: TWILIO_API_BASE.to_string(),
            otp_ttl_seconds,
        })
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

pub fn otp_message(otp_code: &str, ttl_seconds: i64) -> String {
    format!(
        "Your Kumfort OTP is: {otp_code}. Valid for {}.",
        describe_validity(ttl_seconds)
    )
}

fn describe_validity(ttl_seconds: i64) -> String {
    let (amount, unit) = if ttl_seconds >= 60 && ttl_seconds % 60 == 0 {
        (ttl_seconds / 60, "minute")
    } else {
        (ttl_seconds, "second")
    };
    if amount == 1 {
        format!("1 {unit}")
    } else {
        format!("{amount} {unit}s")
    }
}

#[async_trait::async_trait]
impl SmsNotifier for TwilioSmsNotifier {
    async fn send_otp(&self, phone_number: &str, otp_code: &str) -> anyhow::Result<()> {
        let url = format!(
            "{base}/2010-04-01/Accounts/{sid}/Messages.json",
            base = self.api_base,
            sid = self.options.account_sid
        );

        let mut form_body: HashMap<&str, String> = HashMap::new();
        form_body.insert("To", phone_number.to_string());
        form_body.insert("From", self.options.from_number.clone());
        form_body.insert("Body", otp_message(otp_code, self.otp_ttl_seconds));

        let response = self
            .client
            .post(url)
            .basic_auth(&self.options.account_sid, Some(&self.options.auth_token))
            .form(&form_body)
            .send()
            .await
            .context("request to Twilio failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("Twilio returned {status}: {body}");
        }

        let message: MessageResponse = response
            .json()
            .await
            .context("failed to parse Twilio response")?;
        tracing::info!(sid = %message.sid, "SMS accepted by Twilio");
        Ok(())
    }
}

/// Used when no SMS credentials are configured; every delivery fails.
#[derive(Debug, Clone, Default)]
pub struct DisabledSmsNotifier;

#[async_trait::async_trait]
impl SmsNotifier for DisabledSmsNotifier {
    async fn send_otp(&self, _phone_number: &str, _otp_code: &str) -> anyhow::Result<()> {
        bail!("SMS credentials not configured")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_embeds_code() {
        assert_eq!(
            otp_message("123456", 600),
            "Your Kumfort OTP is: 123456. Valid for 10 minutes."
        );
    }

    #[test]
    fn message_follows_configured_lifetime() {
        assert_eq!(otp_message("1234", 60), "Your Kumfort OTP is: 1234. Valid for 1 minute.");
        assert_eq!(otp_message("1234", 300), "Your Kumfort OTP is: 1234. Valid for 5 minutes.");
        assert_eq!(otp_message("1234", 90), "Your Kumfort OTP is: 1234. Valid for 90 seconds.");
    }

    #[tokio::test]
    async fn stalled_provider_times_out() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accepts connections and never answers.
        let server = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let options = TwilioOptions {
            account_sid: "AC123".to_string(),
            auth_token: "secret".to_string(),
            from_number: "+15005550006".to_string(),
        };
        let notifier = TwilioSmsNotifier::new(options, Duration::from_millis(200), 600)
            .unwrap()
            .with_api_base(format!("http://{addr}"));

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            notifier.send_otp("+15550001111", "123456"),
        )
        .await
        .expect("request outlived its timeout");
        assert!(result.is_err());
        server.abort();
    }

    #[tokio::test]
    async fn disabled_notifier_reports_failure() {
        let result = DisabledSmsNotifier.send_otp("+15550001111", "123456").await;
        assert!(result.is_err());
    }
}

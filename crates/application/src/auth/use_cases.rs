use chrono::{DateTime, Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use tracing::{info, instrument, warn};
use vantrack_core::domain::Role;
use vantrack_core::entities::otp_verifications;

use crate::auth::dtos::*;
use crate::auth::validation::{mask_phone, normalize_phone, require_phone};
use crate::users::use_cases::GetOrCreateUserUseCase;
use crate::{AppContext, AppError, AppResult, OtpRejection};

#[cfg(test)]
#[path = "use_cases_test.rs"]
mod tests;

// ============ Constants ============

const TOKEN_LENGTH: usize = 40;

// ============ Helpers ============

fn generate_otp(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

fn generate_token_key() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

fn parse_role(raw: Option<&str>) -> AppResult<Role> {
    match raw.map(str::trim).filter(|r| !r.is_empty()) {
        None => Ok(Role::Parent),
        Some(raw) => raw.parse().map_err(|_| {
            AppError::Validation("Invalid user type. Must be one of: parent, driver".to_string())
        }),
    }
}

/// Fails when the newest challenge for the phone is younger than the window.
async fn enforce_rate_limit(ctx: &AppContext, phone: &str, now: DateTime<Utc>) -> AppResult<()> {
    let Some(latest) = ctx.otps.latest_for_phone(phone).await? else {
        return Ok(());
    };

    let elapsed = now - latest.created_at.with_timezone(&Utc);
    let window = Duration::seconds(ctx.otp.rate_limit_seconds);
    if elapsed < window {
        let remaining = (window - elapsed).num_seconds().max(1);
        warn!(phone = %mask_phone(phone), remaining, "OTP requested inside rate limit window");
        return Err(AppError::RateLimitExceeded {
            message: "Please wait before requesting another OTP".to_string(),
            retry_after_seconds: u64::try_from(remaining).unwrap_or(1),
        });
    }
    Ok(())
}

async fn create_challenge(
    ctx: &AppContext,
    phone: &str,
    now: DateTime<Utc>,
) -> AppResult<otp_verifications::Model> {
    let code = generate_otp(ctx.otp.code_length);
    let expires_at = now + Duration::seconds(ctx.otp.ttl_seconds);
    Ok(ctx.otps.create(phone, &code, now, expires_at).await?)
}

/// Best effort. A failed or late delivery keeps the challenge and reports `false`.
async fn deliver(ctx: &AppContext, challenge: &otp_verifications::Model) -> bool {
    let send = ctx
        .notifier
        .send_otp(&challenge.phone_number, &challenge.otp_code);
    match tokio::time::timeout(ctx.otp.delivery_timeout, send).await {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            warn!(
                phone = %mask_phone(&challenge.phone_number),
                error = %e,
                "OTP delivery failed"
            );
            false
        }
        Err(_) => {
            warn!(
                phone = %mask_phone(&challenge.phone_number),
                timeout_ms = ctx.otp.delivery_timeout.as_millis() as u64,
                "OTP delivery timed out"
            );
            false
        }
    }
}

fn otp_response(
    ctx: &AppContext,
    message: &str,
    challenge: otp_verifications::Model,
    sms_sent: bool,
) -> SendOtpResponse {
    SendOtpResponse {
        message: message.to_string(),
        expires_in: ctx.otp.ttl_seconds,
        sms_sent,
        otp_code: ctx.otp.debug_echo.then_some(challenge.otp_code),
    }
}

// ============ Check User Use Case ============

pub struct CheckUserExistsUseCase;

impl CheckUserExistsUseCase {
    #[instrument(skip_all)]
    pub async fn execute(ctx: &AppContext, req: CheckUserRequest) -> AppResult<CheckUserResponse> {
        let raw = req
            .phone_number
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| AppError::Validation("Phone number is required".to_string()))?;
        let phone = normalize_phone(raw);

        Ok(match ctx.users.find_by_phone_number(&phone).await? {
            Some(user) => CheckUserResponse::found(&user),
            None => CheckUserResponse::missing(),
        })
    }
}

// ============ Request OTP Use Case ============

pub struct RequestOtpUseCase;

impl RequestOtpUseCase {
    #[instrument(skip_all)]
    pub async fn execute(ctx: &AppContext, req: SendOtpRequest) -> AppResult<SendOtpResponse> {
        let phone = require_phone(req.phone_number.as_deref())?;
        let role = parse_role(req.user_type.as_deref())?;

        let challenge = {
            let _guard = ctx.otp_locks.lock(phone.clone()).await;
            let now = ctx.now();
            enforce_rate_limit(ctx, &phone, now).await?;
            GetOrCreateUserUseCase::execute(ctx, &phone, role).await?;
            create_challenge(ctx, &phone, now).await?
        };

        let sms_sent = deliver(ctx, &challenge).await;
        info!(phone = %mask_phone(&phone), sms_sent, "OTP issued");
        Ok(otp_response(ctx, "OTP sent successfully", challenge, sms_sent))
    }
}

// ============ Resend OTP Use Case ============

pub struct ResendOtpUseCase;

impl ResendOtpUseCase {
    /// Same checks as issuing, without touching the user directory.
    #[instrument(skip_all)]
    pub async fn execute(ctx: &AppContext, req: ResendOtpRequest) -> AppResult<SendOtpResponse> {
        let phone = require_phone(req.phone_number.as_deref())?;

        let challenge = {
            let _guard = ctx.otp_locks.lock(phone.clone()).await;
            let now = ctx.now();
            enforce_rate_limit(ctx, &phone, now).await?;
            create_challenge(ctx, &phone, now).await?
        };

        let sms_sent = deliver(ctx, &challenge).await;
        info!(phone = %mask_phone(&phone), sms_sent, "OTP re-issued");
        Ok(otp_response(ctx, "OTP resent successfully", challenge, sms_sent))
    }
}

// ============ Verify OTP Use Case ============

pub struct VerifyOtpUseCase;

impl VerifyOtpUseCase {
    #[instrument(skip_all)]
    pub async fn execute(ctx: &AppContext, req: VerifyOtpRequest) -> AppResult<VerifyOtpResponse> {
        let (Some(raw_phone), Some(code)) = (
            req.phone_number.as_deref().map(str::trim).filter(|p| !p.is_empty()),
            req.otp_code.as_deref().map(str::trim).filter(|c| !c.is_empty()),
        ) else {
            return Err(AppError::Validation(
                "Phone number and OTP code are required".to_string(),
            ));
        };
        let phone = normalize_phone(raw_phone);
        let max_attempts = ctx.otp.max_attempts;

        let now = {
            let _guard = ctx.otp_locks.lock(phone.clone()).await;
            let now = ctx.now();

            let Some(challenge) = ctx.otps.latest_unverified_matching(&phone, code).await? else {
                // A wrong code still costs the pending challenge an attempt.
                if let Some(pending) = ctx.otps.latest_unverified_for_phone(&phone).await? {
                    ctx.otps.record_failed_attempt(pending.id).await?;
                }
                warn!(phone = %mask_phone(&phone), "OTP mismatch");
                return Err(AppError::InvalidCredential(OtpRejection::Invalid));
            };

            if !challenge.is_valid(now, max_attempts) {
                let challenge = ctx.otps.record_failed_attempt(challenge.id).await?;
                let rejection = OtpRejection::from(challenge.status(now, max_attempts));
                warn!(phone = %mask_phone(&phone), ?rejection, "OTP rejected");
                return Err(AppError::InvalidCredential(rejection));
            }

            ctx.otps.mark_verified(challenge.id).await?;
            now
        };

        let user = ctx
            .users
            .find_by_phone_number(&phone)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found. Please register first.".to_string()))?;
        if !user.is_active {
            return Err(AppError::Authentication("User account is disabled".to_string()));
        }

        let is_new_user = ctx.users.mark_phone_verified(user.user_id, now).await?;
        let (token, _) = ctx
            .tokens
            .get_or_create_for_user(user.user_id, &generate_token_key(), now)
            .await?;

        info!(user_id = %user.user_id, is_new_user, "OTP verified");
        Ok(VerifyOtpResponse {
            message: "Login successful".to_string(),
            token: token.key,
            user: LoginUser::new(&user, is_new_user),
        })
    }
}

// ============ Authenticate Token Use Case ============

pub struct AuthenticateTokenUseCase;

impl AuthenticateTokenUseCase {
    /// Resolves a bearer key to its user. Unknown keys and inactive users fail alike.
    pub async fn execute(ctx: &AppContext, key: &str) -> AppResult<AuthenticatedUser> {
        let token = ctx
            .tokens
            .find_by_key(key)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid token".to_string()))?;
        let user = ctx
            .users
            .find_by_id(token.user_id)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid token".to_string()))?;
        if !user.is_active {
            return Err(AppError::Authentication("User inactive or deleted".to_string()));
        }
        Ok(AuthenticatedUser::from(&user))
    }
}

// ============ Logout Use Case ============

pub struct LogoutUseCase;

impl LogoutUseCase {
    #[instrument(skip_all, fields(user_id = %caller.user_id))]
    pub async fn execute(ctx: &AppContext, caller: &AuthenticatedUser) -> AppResult<MessageResponse> {
        let removed = ctx.tokens.delete_for_user(caller.user_id).await?;
        info!(removed, "User logged out");
        Ok(MessageResponse::new("Logout successful"))
    }
}

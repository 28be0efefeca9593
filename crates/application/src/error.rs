use std::fmt;
use thiserror::Error;
use vantrack_core::entities::otp_verifications::ChallengeStatus;

/// Why a verification attempt was refused. Only these three are ever told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpRejection {
    /// No usable challenge matched; covers wrong code and unknown phone alike.
    Invalid,
    Expired,
    Exhausted,
}

impl OtpRejection {
    pub fn message(&self) -> &'static str {
        match self {
            OtpRejection::Invalid => "Invalid OTP or phone number",
            OtpRejection::Expired => "OTP has expired",
            OtpRejection::Exhausted => "Too many failed attempts",
        }
    }
}

/// A challenge that is still pending (or already used) gets the generic answer.
impl From<ChallengeStatus> for OtpRejection {
    fn from(status: ChallengeStatus) -> Self {
        match status {
            ChallengeStatus::Expired => OtpRejection::Expired,
            ChallengeStatus::Exhausted => OtpRejection::Exhausted,
            ChallengeStatus::Pending | ChallengeStatus::Verified => OtpRejection::Invalid,
        }
    }
}

impl fmt::Display for OtpRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or unknown bearer token (401)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Role mismatch on a role-gated operation (403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Malformed or missing input (400)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// OTP mismatch, expiry or exhaustion (400)
    #[error("{0}")]
    InvalidCredential(OtpRejection),

    /// Not found errors (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Too-frequent OTP requests (429)
    #[error("Rate limit exceeded: {message}")]
    RateLimitExceeded {
        message: String,
        retry_after_seconds: u64,
    },

    /// Internal server errors (500)
    #[error("Internal server error: {0}")]
    Internal(anyhow::Error),
}

impl AppError {
    /// Get HTTP status code for the error
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::Authentication(_) => 401,
            AppError::Forbidden(_) => 403,
            AppError::Validation(_) | AppError::InvalidCredential(_) => 400,
            AppError::NotFound(_) => 404,
            AppError::RateLimitExceeded { .. } => 429,
            AppError::Internal(_) => 500,
        }
    }

    /// Get error code string
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Authentication(_) => "AUTHENTICATION_FAILED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::InvalidCredential(OtpRejection::Invalid) => "INVALID_OTP",
            AppError::InvalidCredential(OtpRejection::Expired) => "OTP_EXPIRED",
            AppError::InvalidCredential(OtpRejection::Exhausted) => "OTP_EXHAUSTED",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::RateLimitExceeded { .. } => "RATE_LIMITED",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get retry after seconds (for rate limiting)
    pub fn retry_after_seconds(&self) -> Option<u64> {
        match self {
            AppError::RateLimitExceeded {
                retry_after_seconds,
                ..
            } => Some(*retry_after_seconds),
            _ => None,
        }
    }

    /// Message safe to show to a client. Internal details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = err
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| {
                    format!(
                        "{}: {}",
                        field,
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| "validation failed".to_string())
                    )
                })
            })
            .collect();
        messages.sort();
        AppError::Validation(messages.join(", "))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

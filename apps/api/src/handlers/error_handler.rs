use actix_web::{error::ResponseError, http::StatusCode, HttpRequest, HttpResponse};
use application::auth::dtos::ErrorResponse;
use application::AppError;
use std::fmt;

/// Wrapper around AppError to implement ResponseError (which is defined in actix-web)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl fmt::Display for HttpAppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl ResponseError for HttpAppError {
    fn status_code(&self) -> StatusCode {
        let code = self.0.status_code();
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();
        let error_code = self.0.error_code();
        let retry_after = self.0.retry_after_seconds();

        // Full detail goes to the log only; the body stays opaque.
        if status_code.is_server_error() {
            tracing::error!(
                error_code = error_code,
                error_message = %self.0,
                "Internal Server Error: {:?}",
                self.0
            );
        } else if status_code == StatusCode::UNAUTHORIZED || status_code == StatusCode::FORBIDDEN {
            tracing::warn!(
                error_code = error_code,
                error_message = %self.0,
                "Auth Error"
            );
        }

        let mut builder = HttpResponse::build(status_code);
        if let Some(seconds) = retry_after {
            builder.insert_header(("Retry-After", seconds.to_string()));
        }
        builder.json(ErrorResponse {
            error: self.0.public_message(),
            error_code: error_code.to_string(),
            retry_after_seconds: retry_after,
        })
    }
}

/// Malformed JSON bodies become `VALIDATION_ERROR` responses.
pub fn json_error_handler(err: actix_web::error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    HttpAppError(AppError::Validation(format!("Invalid request body: {err}"))).into()
}

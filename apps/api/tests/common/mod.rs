#![allow(dead_code)]

use application::auth::dtos::{SendOtpRequest, VerifyOtpRequest};
use application::auth::use_cases::{RequestOtpUseCase, VerifyOtpUseCase};
use application::test_support::TestHarness;

/// Full app over the in-memory store, wired like `main` minus CORS and tracing.
macro_rules! test_app {
    ($ctx:expr) => {
        test_app!($ctx, 10_000)
    };
    ($ctx:expr, $auth_limit:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .wrap(api::middleware::auth::AuthMiddleware)
                .wrap(actix_web::middleware::NormalizePath::trim())
                .app_data(actix_web::web::Data::new($ctx))
                .configure(|cfg| {
                    api::configure(
                        cfg,
                        api::middleware::rate_limit::PerIpRateLimitMiddleware::new($auth_limit),
                    )
                }),
        )
        .await
    };
}

pub(crate) use test_app;

/// Issues and verifies an OTP directly through the use cases. Returns the token.
pub async fn login(h: &TestHarness, phone: &str, user_type: &str) -> String {
    RequestOtpUseCase::execute(
        &h.ctx,
        SendOtpRequest {
            phone_number: Some(phone.to_string()),
            user_type: Some(user_type.to_string()),
        },
    )
    .await
    .unwrap();
    let code = h.notifier.last_code_for(phone).unwrap();
    VerifyOtpUseCase::execute(
        &h.ctx,
        VerifyOtpRequest {
            phone_number: Some(phone.to_string()),
            otp_code: Some(code),
        },
    )
    .await
    .unwrap()
    .token
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}

use super::*;
use crate::test_support::{FailingNotifier, StalledNotifier, TestHarness};
use crate::OtpConfig;
use std::sync::Arc;

const DRIVER_PHONE: &str = "+15550001111";

fn send_req(phone: &str, user_type: Option<&str>) -> SendOtpRequest {
    SendOtpRequest {
        phone_number: Some(phone.to_string()),
        user_type: user_type.map(str::to_string),
    }
}

fn verify_req(phone: &str, code: &str) -> VerifyOtpRequest {
    VerifyOtpRequest {
        phone_number: Some(phone.to_string()),
        otp_code: Some(code.to_string()),
    }
}

/// Any six digits that differ from `code`.
fn wrong_code(code: &str) -> String {
    if code == "000000" {
        "111111".to_string()
    } else {
        "000000".to_string()
    }
}

async fn issue(h: &TestHarness, phone: &str, user_type: &str) -> String {
    RequestOtpUseCase::execute(&h.ctx, send_req(phone, Some(user_type)))
        .await
        .unwrap();
    h.notifier.last_code_for(phone).unwrap()
}

// ============ Helpers ============

#[test]
fn generated_codes_are_numeric() {
    for _ in 0..100 {
        let code = generate_otp(6);
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
    }
}

#[test]
fn token_keys_are_alphanumeric() {
    let key = generate_token_key();
    assert_eq!(key.len(), TOKEN_LENGTH);
    assert!(key.chars().all(|c| c.is_ascii_alphanumeric()));
    assert_ne!(key, generate_token_key());
}

#[test]
fn role_defaults_to_parent() {
    assert_eq!(parse_role(None).unwrap(), Role::Parent);
    assert_eq!(parse_role(Some("driver")).unwrap(), Role::Driver);
    assert!(matches!(parse_role(Some("admin")), Err(AppError::Validation(_))));
}

// ============ Issue ============

#[tokio::test]
async fn issue_creates_user_and_challenge() {
    let h = TestHarness::new();
    let res = RequestOtpUseCase::execute(&h.ctx, send_req(DRIVER_PHONE, Some("driver")))
        .await
        .unwrap();

    assert_eq!(res.message, "OTP sent successfully");
    assert_eq!(res.expires_in, 600);
    assert!(res.sms_sent);
    assert!(res.otp_code.is_none());

    let user = h.ctx.users.find_by_phone_number(DRIVER_PHONE).await.unwrap().unwrap();
    assert_eq!(user.user_type, Role::Driver);

    let challenges = h.store.challenges_for(DRIVER_PHONE).unwrap();
    assert_eq!(challenges.len(), 1);
    assert_eq!(challenges[0].attempts, 0);
    assert!(!challenges[0].is_verified);
    assert_eq!(
        challenges[0].expires_at - challenges[0].created_at,
        Duration::seconds(600)
    );
}

#[tokio::test]
async fn issue_normalizes_phone() {
    let h = TestHarness::new();
    RequestOtpUseCase::execute(&h.ctx, send_req("+1 555-000-1111", None))
        .await
        .unwrap();
    assert_eq!(h.store.challenges_for(DRIVER_PHONE).unwrap().len(), 1);
    assert_eq!(h.notifier.sent()[0].0, DRIVER_PHONE);
}

#[tokio::test]
async fn issue_rejects_bad_input() {
    let h = TestHarness::new();
    let missing = RequestOtpUseCase::execute(&h.ctx, SendOtpRequest::default()).await;
    assert!(matches!(missing, Err(AppError::Validation(_))));

    let malformed = RequestOtpUseCase::execute(&h.ctx, send_req("12345", None)).await;
    assert!(matches!(malformed, Err(AppError::Validation(_))));

    let bad_role = RequestOtpUseCase::execute(&h.ctx, send_req(DRIVER_PHONE, Some("admin"))).await;
    assert!(matches!(bad_role, Err(AppError::Validation(_))));

    assert!(h.store.challenges_for(DRIVER_PHONE).unwrap().is_empty());
    assert!(h.notifier.sent().is_empty());
}

#[tokio::test]
async fn second_issue_inside_window_is_rate_limited() {
    let h = TestHarness::new();
    issue(&h, DRIVER_PHONE, "driver").await;
    h.clock.advance(Duration::seconds(30));

    let err = RequestOtpUseCase::execute(&h.ctx, send_req(DRIVER_PHONE, Some("driver")))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 429);
    assert_eq!(err.retry_after_seconds(), Some(30));
    assert_eq!(h.store.challenges_for(DRIVER_PHONE).unwrap().len(), 1);

    h.clock.advance(Duration::seconds(30));
    RequestOtpUseCase::execute(&h.ctx, send_req(DRIVER_PHONE, Some("driver")))
        .await
        .unwrap();
    assert_eq!(h.store.challenges_for(DRIVER_PHONE).unwrap().len(), 2);
}

#[tokio::test]
async fn rate_limit_is_per_phone() {
    let h = TestHarness::new();
    issue(&h, DRIVER_PHONE, "driver").await;
    issue(&h, "+15550002222", "parent").await;
    assert_eq!(h.notifier.sent().len(), 2);
}

#[tokio::test]
async fn first_role_wins() {
    let h = TestHarness::new();
    issue(&h, DRIVER_PHONE, "driver").await;
    h.clock.advance(Duration::seconds(61));
    issue(&h, DRIVER_PHONE, "parent").await;

    let user = h.ctx.users.find_by_phone_number(DRIVER_PHONE).await.unwrap().unwrap();
    assert_eq!(user.user_type, Role::Driver);
}

#[tokio::test]
async fn delivery_failure_keeps_challenge() {
    let h = TestHarness::with_notifier(Arc::new(FailingNotifier));
    let res = RequestOtpUseCase::execute(&h.ctx, send_req(DRIVER_PHONE, None))
        .await
        .unwrap();

    assert!(!res.sms_sent);
    assert_eq!(h.store.challenges_for(DRIVER_PHONE).unwrap().len(), 1);
}

#[tokio::test]
async fn stalled_delivery_is_cut_off() {
    let mut h = TestHarness::with_notifier(Arc::new(StalledNotifier));
    h.ctx.otp.delivery_timeout = std::time::Duration::from_millis(50);

    let res = tokio::time::timeout(
        std::time::Duration::from_secs(5),
        RequestOtpUseCase::execute(&h.ctx, send_req(DRIVER_PHONE, None)),
    )
    .await
    .expect("issue waited on a stalled provider")
    .unwrap();

    assert!(!res.sms_sent);
    assert_eq!(h.store.challenges_for(DRIVER_PHONE).unwrap().len(), 1);
}

#[tokio::test]
async fn configured_code_length_is_used() {
    let h = TestHarness::with_config(OtpConfig {
        code_length: 4,
        ..OtpConfig::default()
    });
    let code = issue(&h, DRIVER_PHONE, "driver").await;
    assert_eq!(code.len(), 4);

    VerifyOtpUseCase::execute(&h.ctx, verify_req(DRIVER_PHONE, &code))
        .await
        .unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_for_one_phone_issue_once() {
    let h = TestHarness::new();

    let mut handles = Vec::new();
    for i in 0..16 {
        let ctx = h.ctx.clone();
        handles.push(tokio::spawn(async move {
            if i % 2 == 0 {
                RequestOtpUseCase::execute(&ctx, send_req(DRIVER_PHONE, Some("driver"))).await
            } else {
                let req = ResendOtpRequest {
                    phone_number: Some(DRIVER_PHONE.to_string()),
                };
                ResendOtpUseCase::execute(&ctx, req).await
            }
        }));
    }

    let mut issued = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => issued += 1,
            Err(err) => assert!(matches!(err, AppError::RateLimitExceeded { .. }), "{err:?}"),
        }
    }
    assert_eq!(issued, 1);
    assert_eq!(h.store.challenges_for(DRIVER_PHONE).unwrap().len(), 1);
    assert_eq!(h.notifier.sent().len(), 1);
}

#[tokio::test]
async fn debug_echo_returns_code() {
    let h = TestHarness::with_config(OtpConfig {
        debug_echo: true,
        ..OtpConfig::default()
    });
    let res = RequestOtpUseCase::execute(&h.ctx, send_req(DRIVER_PHONE, None))
        .await
        .unwrap();
    assert_eq!(res.otp_code, h.notifier.last_code_for(DRIVER_PHONE));
}

// ============ Resend ============

#[tokio::test]
async fn resend_issues_fresh_challenge_after_window() {
    let h = TestHarness::new();
    let first = issue(&h, DRIVER_PHONE, "driver").await;
    h.clock.advance(Duration::seconds(61));

    let res = ResendOtpUseCase::execute(
        &h.ctx,
        ResendOtpRequest {
            phone_number: Some(DRIVER_PHONE.to_string()),
        },
    )
    .await
    .unwrap();
    assert_eq!(res.message, "OTP resent successfully");

    let second = h.notifier.last_code_for(DRIVER_PHONE).unwrap();
    let verified = VerifyOtpUseCase::execute(&h.ctx, verify_req(DRIVER_PHONE, &second))
        .await
        .unwrap();
    assert!(!verified.token.is_empty());
    assert_eq!(h.store.challenges_for(DRIVER_PHONE).unwrap().len(), 2);
    assert_eq!(h.notifier.sent().len(), 2);
    assert_eq!(h.notifier.sent()[0].1, first);
}

#[tokio::test]
async fn resend_honors_rate_limit() {
    let h = TestHarness::new();
    issue(&h, DRIVER_PHONE, "driver").await;
    let err = ResendOtpUseCase::execute(
        &h.ctx,
        ResendOtpRequest {
            phone_number: Some(DRIVER_PHONE.to_string()),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::RateLimitExceeded { .. }));
}

#[tokio::test]
async fn resend_does_not_create_users() {
    let h = TestHarness::new();
    ResendOtpUseCase::execute(
        &h.ctx,
        ResendOtpRequest {
            phone_number: Some(DRIVER_PHONE.to_string()),
        },
    )
    .await
    .unwrap();
    assert!(h.ctx.users.find_by_phone_number(DRIVER_PHONE).await.unwrap().is_none());
}

// ============ Verify ============

#[tokio::test]
async fn full_login_scenario() {
    let h = TestHarness::new();
    let res = RequestOtpUseCase::execute(&h.ctx, send_req(DRIVER_PHONE, Some("driver")))
        .await
        .unwrap();
    assert_eq!(res.expires_in, 600);
    let code = h.notifier.last_code_for(DRIVER_PHONE).unwrap();

    let wrong = VerifyOtpUseCase::execute(&h.ctx, verify_req(DRIVER_PHONE, &wrong_code(&code)))
        .await
        .unwrap_err();
    assert!(matches!(wrong, AppError::InvalidCredential(OtpRejection::Invalid)));

    let ok = VerifyOtpUseCase::execute(&h.ctx, verify_req(DRIVER_PHONE, &code))
        .await
        .unwrap();
    assert_eq!(ok.message, "Login successful");
    assert!(ok.user.is_new_user);
    assert_eq!(ok.user.user_type, Role::Driver);
    assert_eq!(ok.token.len(), TOKEN_LENGTH);

    let again = VerifyOtpUseCase::execute(&h.ctx, verify_req(DRIVER_PHONE, &code))
        .await
        .unwrap_err();
    assert!(matches!(again, AppError::InvalidCredential(OtpRejection::Invalid)));
}

#[tokio::test]
async fn unknown_phone_looks_like_wrong_code() {
    let h = TestHarness::new();
    let err = VerifyOtpUseCase::execute(&h.ctx, verify_req("+15559999999", "123456"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid OTP or phone number");
    assert_eq!(err.error_code(), "INVALID_OTP");
}

#[tokio::test]
async fn verify_requires_both_fields() {
    let h = TestHarness::new();
    let err = VerifyOtpUseCase::execute(
        &h.ctx,
        VerifyOtpRequest {
            phone_number: Some(DRIVER_PHONE.to_string()),
            otp_code: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn expired_code_is_rejected() {
    let h = TestHarness::new();
    let code = issue(&h, DRIVER_PHONE, "driver").await;
    h.clock.advance(Duration::seconds(601));

    let err = VerifyOtpUseCase::execute(&h.ctx, verify_req(DRIVER_PHONE, &code))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidCredential(OtpRejection::Expired)));

    let challenge = &h.store.challenges_for(DRIVER_PHONE).unwrap()[0];
    assert_eq!(challenge.attempts, 1);
    assert!(!challenge.is_verified);
}

#[tokio::test]
async fn expiry_boundary_is_exclusive() {
    let h = TestHarness::new();
    let code = issue(&h, DRIVER_PHONE, "driver").await;
    h.clock.advance(Duration::seconds(600));

    let err = VerifyOtpUseCase::execute(&h.ctx, verify_req(DRIVER_PHONE, &code))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidCredential(OtpRejection::Expired)));
}

#[tokio::test]
async fn three_wrong_codes_exhaust_the_challenge() {
    let h = TestHarness::new();
    let code = issue(&h, DRIVER_PHONE, "driver").await;
    let wrong = wrong_code(&code);

    for _ in 0..3 {
        let err = VerifyOtpUseCase::execute(&h.ctx, verify_req(DRIVER_PHONE, &wrong))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidCredential(OtpRejection::Invalid)));
    }

    let err = VerifyOtpUseCase::execute(&h.ctx, verify_req(DRIVER_PHONE, &code))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidCredential(OtpRejection::Exhausted)));
    assert_eq!(err.to_string(), "Too many failed attempts");
    assert!(!h.store.challenges_for(DRIVER_PHONE).unwrap()[0].is_verified);
}

#[tokio::test]
async fn token_is_reused_across_logins() {
    let h = TestHarness::new();
    let code = issue(&h, DRIVER_PHONE, "driver").await;
    let first = VerifyOtpUseCase::execute(&h.ctx, verify_req(DRIVER_PHONE, &code))
        .await
        .unwrap();

    h.clock.advance(Duration::seconds(61));
    let code = issue(&h, DRIVER_PHONE, "driver").await;
    let second = VerifyOtpUseCase::execute(&h.ctx, verify_req(DRIVER_PHONE, &code))
        .await
        .unwrap();

    assert_eq!(first.token, second.token);
    assert!(first.user.is_new_user);
    assert!(!second.user.is_new_user);
}

#[tokio::test]
async fn missing_user_at_verification_is_not_found() {
    let h = TestHarness::new();
    ResendOtpUseCase::execute(
        &h.ctx,
        ResendOtpRequest {
            phone_number: Some(DRIVER_PHONE.to_string()),
        },
    )
    .await
    .unwrap();
    let code = h.notifier.last_code_for(DRIVER_PHONE).unwrap();

    let err = VerifyOtpUseCase::execute(&h.ctx, verify_req(DRIVER_PHONE, &code))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 404);
}

#[tokio::test]
async fn concurrent_verifications_succeed_once() {
    let h = TestHarness::new();
    let code = issue(&h, DRIVER_PHONE, "driver").await;

    let (a, b) = tokio::join!(
        VerifyOtpUseCase::execute(&h.ctx, verify_req(DRIVER_PHONE, &code)),
        VerifyOtpUseCase::execute(&h.ctx, verify_req(DRIVER_PHONE, &code)),
    );
    assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
}

// ============ Token / Logout ============

#[tokio::test]
async fn token_resolves_to_caller() {
    let h = TestHarness::new();
    let code = issue(&h, DRIVER_PHONE, "driver").await;
    let login = VerifyOtpUseCase::execute(&h.ctx, verify_req(DRIVER_PHONE, &code))
        .await
        .unwrap();

    let caller = AuthenticateTokenUseCase::execute(&h.ctx, &login.token).await.unwrap();
    assert_eq!(caller.user_id, login.user.id);
    assert_eq!(caller.role, Role::Driver);

    let unknown = AuthenticateTokenUseCase::execute(&h.ctx, "nope").await.unwrap_err();
    assert_eq!(unknown.status_code(), 401);
}

#[tokio::test]
async fn inactive_users_cannot_authenticate() {
    let h = TestHarness::new();
    let code = issue(&h, DRIVER_PHONE, "driver").await;
    let login = VerifyOtpUseCase::execute(&h.ctx, verify_req(DRIVER_PHONE, &code))
        .await
        .unwrap();
    h.store.set_user_active(login.user.id, false).unwrap();

    let err = AuthenticateTokenUseCase::execute(&h.ctx, &login.token).await.unwrap_err();
    assert!(matches!(err, AppError::Authentication(_)));
}

#[tokio::test]
async fn logout_invalidates_token() {
    let h = TestHarness::new();
    let code = issue(&h, DRIVER_PHONE, "driver").await;
    let login = VerifyOtpUseCase::execute(&h.ctx, verify_req(DRIVER_PHONE, &code))
        .await
        .unwrap();
    let caller = AuthenticateTokenUseCase::execute(&h.ctx, &login.token).await.unwrap();

    let res = LogoutUseCase::execute(&h.ctx, &caller).await.unwrap();
    assert_eq!(res.message, "Logout successful");
    assert!(AuthenticateTokenUseCase::execute(&h.ctx, &login.token).await.is_err());
}

// ============ Check user ============

#[tokio::test]
async fn check_user_never_creates() {
    let h = TestHarness::new();
    let res = CheckUserExistsUseCase::execute(
        &h.ctx,
        CheckUserRequest {
            phone_number: Some(DRIVER_PHONE.to_string()),
        },
    )
    .await
    .unwrap();
    assert!(!res.exists);
    assert_eq!(res.message.as_deref(), Some("User not registered"));
    assert!(h.ctx.users.find_by_phone_number(DRIVER_PHONE).await.unwrap().is_none());

    issue(&h, DRIVER_PHONE, "driver").await;
    let res = CheckUserExistsUseCase::execute(
        &h.ctx,
        CheckUserRequest {
            phone_number: Some("+1 555 000 1111".to_string()),
        },
    )
    .await
    .unwrap();
    assert!(res.exists);
    assert_eq!(res.user_type, Some(Role::Driver));
    assert_eq!(res.is_active, Some(true));
}

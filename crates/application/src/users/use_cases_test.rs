use super::*;
use crate::test_support::TestHarness;
use chrono::Duration;

fn caller_of(user: &users::Model) -> AuthenticatedUser {
    AuthenticatedUser::from(user)
}

#[tokio::test]
async fn get_or_create_keeps_first_role() {
    let h = TestHarness::new();
    let first = GetOrCreateUserUseCase::execute(&h.ctx, "+15550001111", Role::Driver)
        .await
        .unwrap();
    let second = GetOrCreateUserUseCase::execute(&h.ctx, "+15550001111", Role::Parent)
        .await
        .unwrap();

    assert_eq!(first.user_id, second.user_id);
    assert_eq!(second.user_type, Role::Driver);
}

#[tokio::test]
async fn profile_reflects_stored_user() {
    let h = TestHarness::new();
    let user = GetOrCreateUserUseCase::execute(&h.ctx, "+919876543211", Role::Parent)
        .await
        .unwrap();

    let profile = GetProfileUseCase::execute(&h.ctx, &caller_of(&user)).await.unwrap();
    assert_eq!(profile.id, user.user_id);
    assert_eq!(profile.user_type, Role::Parent);
    assert!(!profile.gps_tracking_enabled);
    assert!(profile.address.is_none());
}

#[tokio::test]
async fn update_applies_whitelisted_fields() {
    let h = TestHarness::new();
    let user = GetOrCreateUserUseCase::execute(&h.ctx, "+919876543211", Role::Parent)
        .await
        .unwrap();
    h.clock.advance(Duration::minutes(5));

    let res = UpdateProfileUseCase::execute(
        &h.ctx,
        &caller_of(&user),
        UpdateProfileRequest {
            first_name: Some(" Priya ".to_string()),
            last_name: Some("Sharma".to_string()),
            address: Some("12 Sector 15, Noida".to_string()),
            emergency_contact: Some("+91 98765 00000".to_string()),
        },
    )
    .await
    .unwrap();

    assert_eq!(res.message, "Profile updated successfully");
    assert_eq!(res.user.first_name, "Priya");
    assert_eq!(res.user.last_name, "Sharma");
    assert_eq!(res.user.emergency_contact.as_deref(), Some("+919876500000"));
    assert_eq!(res.user.phone_number, "+919876543211");
    assert_eq!(res.user.user_type, Role::Parent);
}

#[tokio::test]
async fn empty_optional_fields_are_cleared() {
    let h = TestHarness::new();
    let user = GetOrCreateUserUseCase::execute(&h.ctx, "+919876543211", Role::Parent)
        .await
        .unwrap();
    let caller = caller_of(&user);
    UpdateProfileUseCase::execute(
        &h.ctx,
        &caller,
        UpdateProfileRequest {
            address: Some("Old address".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let res = UpdateProfileUseCase::execute(
        &h.ctx,
        &caller,
        UpdateProfileRequest {
            address: Some(String::new()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert!(res.user.address.is_none());
}

#[tokio::test]
async fn invalid_emergency_contact_is_rejected() {
    let h = TestHarness::new();
    let user = GetOrCreateUserUseCase::execute(&h.ctx, "+919876543211", Role::Parent)
        .await
        .unwrap();

    let err = UpdateProfileUseCase::execute(
        &h.ctx,
        &caller_of(&user),
        UpdateProfileRequest {
            emergency_contact: Some("call mom".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn overlong_name_is_rejected() {
    let h = TestHarness::new();
    let user = GetOrCreateUserUseCase::execute(&h.ctx, "+919876543211", Role::Parent)
        .await
        .unwrap();

    let err = UpdateProfileUseCase::execute(
        &h.ctx,
        &caller_of(&user),
        UpdateProfileRequest {
            first_name: Some("x".repeat(31)),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(ref m) if m.contains("first_name")));
}

use tracing::{info, instrument};
use validator::Validate;
use vantrack_core::domain::{ProfileChanges, Role};
use vantrack_core::entities::users;

use crate::auth::dtos::AuthenticatedUser;
use crate::auth::{mask_phone, normalize_phone, validate_phone_number};
use crate::users::dtos::*;
use crate::{AppContext, AppError, AppResult};

#[cfg(test)]
#[path = "use_cases_test.rs"]
mod tests;

// ============ Get Or Create Use Case ============

pub struct GetOrCreateUserUseCase;

impl GetOrCreateUserUseCase {
    /// `phone` must already be normalized. An existing user keeps its role.
    pub async fn execute(ctx: &AppContext, phone: &str, role: Role) -> AppResult<users::Model> {
        let (user, created) = ctx.users.get_or_create(phone, role, ctx.now()).await?;
        if created {
            info!(user_id = %user.user_id, phone = %mask_phone(phone), role = %role, "User created");
        }
        Ok(user)
    }
}

// ============ Get Profile Use Case ============

pub struct GetProfileUseCase;

impl GetProfileUseCase {
    pub async fn execute(ctx: &AppContext, caller: &AuthenticatedUser) -> AppResult<ProfileResponse> {
        let user = ctx
            .users
            .find_by_id(caller.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        Ok(user.into())
    }
}

// ============ Update Profile Use Case ============

pub struct UpdateProfileUseCase;

impl UpdateProfileUseCase {
    #[instrument(skip_all, fields(user_id = %caller.user_id))]
    pub async fn execute(
        ctx: &AppContext,
        caller: &AuthenticatedUser,
        req: UpdateProfileRequest,
    ) -> AppResult<UpdateProfileResponse> {
        req.validate()?;

        let emergency_contact = match req.emergency_contact {
            Some(raw) if !raw.trim().is_empty() => {
                let phone = normalize_phone(&raw);
                validate_phone_number(&phone).map_err(|_| {
                    AppError::Validation("Emergency contact must be a valid phone number".to_string())
                })?;
                Some(phone)
            }
            other => other,
        };

        let changes = ProfileChanges {
            first_name: req.first_name.map(|s| s.trim().to_string()),
            last_name: req.last_name.map(|s| s.trim().to_string()),
            address: req.address,
            emergency_contact,
        };

        let user = ctx
            .users
            .update_profile(caller.user_id, &changes, ctx.now())
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        info!(empty = changes.is_empty(), "Profile updated");
        Ok(UpdateProfileResponse {
            message: "Profile updated successfully".to_string(),
            user: user.into(),
        })
    }
}

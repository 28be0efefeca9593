use vantrack_core::domain::Role;

use crate::auth::dtos::AuthenticatedUser;
use crate::{AppError, AppResult};

/// Fails with `Forbidden` unless the caller holds `role`.
pub fn require_role(caller: &AuthenticatedUser, role: Role) -> AppResult<()> {
    if caller.role == role {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "Only {role}s can access this resource"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn caller(role: Role) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: Uuid::new_v4(),
            phone_number: "+919876543210".to_string(),
            role,
        }
    }

    #[test]
    fn matching_role_passes() {
        assert!(require_role(&caller(Role::Driver), Role::Driver).is_ok());
    }

    #[test]
    fn other_role_is_forbidden() {
        let err = require_role(&caller(Role::Parent), Role::Driver).unwrap_err();
        assert_eq!(err.status_code(), 403);
        assert_eq!(err.to_string(), "Forbidden: Only drivers can access this resource");
    }
}

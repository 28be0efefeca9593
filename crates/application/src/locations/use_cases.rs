use rust_decimal::Decimal;
use tracing::{debug, info, instrument};
use vantrack_core::domain::{LocationFix, Role};
use vantrack_core::entities::users;

use crate::auth::dtos::AuthenticatedUser;
use crate::auth::require_role;
use crate::locations::dtos::*;
use crate::{AppContext, AppError, AppResult};

#[cfg(test)]
#[path = "use_cases_test.rs"]
mod tests;

pub const LOCATION_HISTORY_LIMIT: u64 = 50;
const COORDINATE_SCALE: u32 = 6;

fn coordinate(value: Option<Decimal>, name: &str, bound: i64) -> AppResult<Decimal> {
    let value =
        value.ok_or_else(|| AppError::Validation("Latitude and longitude are required".to_string()))?;
    let bound = Decimal::from(bound);
    if value < -bound || value > bound {
        return Err(AppError::Validation(format!(
            "{name} must be between -{bound} and {bound}"
        )));
    }
    Ok(value.round_dp(COORDINATE_SCALE))
}

impl TryFrom<PushLocationRequest> for LocationFix {
    type Error = AppError;

    fn try_from(req: PushLocationRequest) -> AppResult<Self> {
        Ok(LocationFix {
            latitude: coordinate(req.latitude, "Latitude", 90)?,
            longitude: coordinate(req.longitude, "Longitude", 180)?,
            accuracy: req.accuracy,
            speed: req.speed,
            heading: req.heading,
            altitude: req.altitude,
        })
    }
}

async fn load_user(ctx: &AppContext, caller: &AuthenticatedUser) -> AppResult<users::Model> {
    ctx.users
        .find_by_id(caller.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

// ============ Push Location Use Case ============

pub struct PushLocationUseCase;

impl PushLocationUseCase {
    #[instrument(skip_all, fields(driver_id = %caller.user_id))]
    pub async fn execute(
        ctx: &AppContext,
        caller: &AuthenticatedUser,
        req: PushLocationRequest,
    ) -> AppResult<PushLocationResponse> {
        require_role(caller, Role::Driver)?;
        let fix = LocationFix::try_from(req)?;
        let driver = load_user(ctx, caller).await?;

        let location = {
            let _guard = ctx.location_locks.lock(caller.user_id).await;
            ctx.locations
                .replace_active(caller.user_id, &fix, ctx.now())
                .await?
        };

        debug!(location_id = location.id, "Active location replaced");
        Ok(PushLocationResponse {
            message: "Location updated successfully".to_string(),
            location: LocationView::new(location, &driver),
        })
    }
}

// ============ Current Location Use Case ============

pub struct GetCurrentLocationUseCase;

impl GetCurrentLocationUseCase {
    pub async fn execute(
        ctx: &AppContext,
        caller: &AuthenticatedUser,
    ) -> AppResult<CurrentLocationResponse> {
        require_role(caller, Role::Driver)?;
        let driver = load_user(ctx, caller).await?;
        let location = ctx
            .locations
            .find_active(caller.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("No active location found".to_string()))?;

        Ok(CurrentLocationResponse {
            location: LocationView::new(location, &driver),
        })
    }
}

// ============ Location History Use Case ============

pub struct GetLocationHistoryUseCase;

impl GetLocationHistoryUseCase {
    pub async fn execute(
        ctx: &AppContext,
        caller: &AuthenticatedUser,
    ) -> AppResult<LocationHistoryResponse> {
        require_role(caller, Role::Driver)?;
        let driver = load_user(ctx, caller).await?;
        let rows = ctx
            .locations
            .history(caller.user_id, LOCATION_HISTORY_LIMIT)
            .await?;

        Ok(LocationHistoryResponse {
            locations: rows
                .into_iter()
                .map(|location| LocationView::new(location, &driver))
                .collect(),
        })
    }
}

// ============ Toggle Tracking Use Case ============

pub struct ToggleTrackingUseCase;

impl ToggleTrackingUseCase {
    /// Persists the preference only; pushes are not gated on it.
    #[instrument(skip_all, fields(driver_id = %caller.user_id))]
    pub async fn execute(
        ctx: &AppContext,
        caller: &AuthenticatedUser,
        req: ToggleTrackingRequest,
    ) -> AppResult<ToggleTrackingResponse> {
        require_role(caller, Role::Driver)?;
        let enabled = req.enabled.unwrap_or(false);
        ctx.users
            .set_gps_tracking(caller.user_id, enabled, ctx.now())
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        info!(enabled, "GPS tracking preference changed");
        let state = if enabled { "enabled" } else { "disabled" };
        Ok(ToggleTrackingResponse {
            message: format!("GPS tracking {state}"),
            enabled,
        })
    }
}

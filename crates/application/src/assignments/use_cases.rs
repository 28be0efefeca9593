use std::collections::HashMap;

use tracing::{debug, instrument};
use uuid::Uuid;
use vantrack_core::domain::Role;
use vantrack_core::entities::{users, van_assignments};

use crate::assignments::dtos::*;
use crate::auth::dtos::AuthenticatedUser;
use crate::auth::require_role;
use crate::locations::dtos::LocationView;
use crate::{AppContext, AppError, AppResult};

#[cfg(test)]
#[path = "use_cases_test.rs"]
mod tests;

/// Vans and drivers looked up while projecting one parent's children.
#[derive(Default)]
struct Lookup {
    vans: HashMap<i64, van_assignments::Model>,
    drivers: HashMap<Uuid, users::Model>,
}

impl Lookup {
    async fn van(&mut self, ctx: &AppContext, id: i64) -> AppResult<van_assignments::Model> {
        if let Some(van) = self.vans.get(&id) {
            return Ok(van.clone());
        }
        let van = ctx
            .assignments
            .find_van(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Van assignment not found".to_string()))?;
        self.vans.insert(id, van.clone());
        Ok(van)
    }

    async fn driver(&mut self, ctx: &AppContext, id: Uuid) -> AppResult<users::Model> {
        if let Some(driver) = self.drivers.get(&id) {
            return Ok(driver.clone());
        }
        let driver = ctx
            .users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Driver not found".to_string()))?;
        self.drivers.insert(id, driver.clone());
        Ok(driver)
    }
}

// ============ Resolve Van Use Case ============

pub struct ResolveVanForParentUseCase;

impl ResolveVanForParentUseCase {
    /// Reports the van of the parent's first child by name. Children riding
    /// other vans are listed but their vans' locations are not resolved.
    #[instrument(skip_all, fields(parent_id = %caller.user_id))]
    pub async fn execute(
        ctx: &AppContext,
        caller: &AuthenticatedUser,
    ) -> AppResult<VanLocationResponse> {
        require_role(caller, Role::Parent)?;

        let children = ctx
            .assignments
            .active_children_for_parent(caller.user_id)
            .await?;
        let Some(first) = children.first() else {
            return Err(AppError::NotFound(
                "No van assignments found for your children".to_string(),
            ));
        };

        let mut lookup = Lookup::default();
        let van = lookup.van(ctx, first.van_assignment_id).await?;
        let driver = lookup.driver(ctx, van.driver_id).await?;
        let location = ctx
            .locations
            .find_active(van.driver_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Van location not available".to_string()))?;

        let mut views = Vec::with_capacity(children.len());
        for child in children {
            let child_van = lookup.van(ctx, child.van_assignment_id).await?;
            let child_driver = lookup.driver(ctx, child_van.driver_id).await?;
            views.push(ChildView::new(child, &child_van, &child_driver));
        }

        debug!(van_id = van.id, children = views.len(), "Van resolved");
        Ok(VanLocationResponse {
            van_assignment: VanView::new(&van, &driver),
            location: LocationView::new(location, &driver),
            children: views,
        })
    }
}

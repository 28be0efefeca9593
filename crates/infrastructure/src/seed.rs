//! Demo fixtures: one driver with a van, one parent with a child on that van,
//! and a starting position for the van. Safe to run repeatedly.

use chrono::{NaiveTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    Set,
};
use tracing::info;
use vantrack_core::domain::{LocationFix, Role};
use vantrack_core::entities::{child_van_assignments, locations, users, van_assignments};

use crate::repositories::{LocationRepository, PostgresLocationRepository, PostgresUserRepository, UserRepository};

pub const DEMO_DRIVER_PHONE: &str = "+919876543210";
pub const DEMO_PARENT_PHONE: &str = "+919876543211";
pub const DEMO_VAN_NUMBER: &str = "DPS-001";

#[derive(Debug, Default)]
pub struct SeedReport {
    pub driver_created: bool,
    pub parent_created: bool,
    pub van_created: bool,
    pub child_created: bool,
    pub location_created: bool,
}

pub async fn seed_demo_data(db: &DatabaseConnection) -> anyhow::Result<SeedReport> {
    let now = Utc::now();
    let users_repo = PostgresUserRepository::new(db.clone());
    let mut report = SeedReport::default();

    let (driver, created) = users_repo
        .get_or_create(DEMO_DRIVER_PHONE, Role::Driver, now)
        .await?;
    report.driver_created = created;
    if created {
        name_user(db, driver.clone(), "Rajesh", "Kumar").await?;
    }

    let (parent, created) = users_repo
        .get_or_create(DEMO_PARENT_PHONE, Role::Parent, now)
        .await?;
    report.parent_created = created;
    if created {
        name_user(db, parent.clone(), "Priya", "Sharma").await?;
    }

    let van = match van_assignments::Entity::find()
        .filter(van_assignments::Column::VanNumber.eq(DEMO_VAN_NUMBER))
        .one(db)
        .await?
    {
        Some(van) => van,
        None => {
            report.van_created = true;
            van_assignments::ActiveModel {
                driver_id: Set(driver.user_id),
                van_number: Set(DEMO_VAN_NUMBER.to_string()),
                van_model: Set("Tata Winger".to_string()),
                capacity: Set(20),
                route_name: Set("Sector 15 to DPS School".to_string()),
                is_active: Set(true),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
                ..Default::default()
            }
            .insert(db)
            .await?
        }
    };

    let child_exists = child_van_assignments::Entity::find()
        .filter(child_van_assignments::Column::ParentId.eq(parent.user_id))
        .filter(child_van_assignments::Column::ChildName.eq("Arjun Sharma"))
        .one(db)
        .await?
        .is_some();
    if !child_exists {
        report.child_created = true;
        child_van_assignments::ActiveModel {
            parent_id: Set(parent.user_id),
            child_name: Set("Arjun Sharma".to_string()),
            child_grade: Set("5th Grade".to_string()),
            school_name: Set("Delhi Public School".to_string()),
            admission_number: Set("DPS2024001".to_string()),
            van_assignment_id: Set(van.id),
            pickup_time: Set(NaiveTime::from_hms_opt(7, 30, 0)),
            dropoff_time: Set(NaiveTime::from_hms_opt(14, 30, 0)),
            is_active: Set(true),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }

    let has_location = locations::Entity::find()
        .filter(locations::Column::DriverId.eq(driver.user_id))
        .filter(locations::Column::IsActive.eq(true))
        .one(db)
        .await?
        .is_some();
    if !has_location {
        report.location_created = true;
        let mut fix = LocationFix::new(Decimal::new(286_139, 4), Decimal::new(772_090, 4));
        fix.accuracy = Some(10.0);
        fix.speed = Some(0.0);
        PostgresLocationRepository::new(db.clone())
            .replace_active(driver.user_id, &fix, now)
            .await?;
    }

    info!(?report, "Demo data seeded");
    Ok(report)
}

async fn name_user(
    db: &DatabaseConnection,
    user: users::Model,
    first_name: &str,
    last_name: &str,
) -> anyhow::Result<()> {
    let mut active = user.into_active_model();
    active.first_name = Set(first_name.to_string());
    active.last_name = Set(last_name.to_string());
    active.update(db).await?;
    Ok(())
}

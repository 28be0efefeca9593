use chrono::{DateTime, FixedOffset, NaiveTime};
use serde::{Deserialize, Serialize};
use vantrack_core::entities::{child_van_assignments, users, van_assignments};

use crate::locations::dtos::LocationView;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VanView {
    pub id: i64,
    pub van_number: String,
    pub van_model: String,
    pub capacity: i32,
    pub route_name: String,
    pub is_active: bool,
    pub driver_name: String,
    pub driver_phone: String,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

impl VanView {
    pub fn new(van: &van_assignments::Model, driver: &users::Model) -> Self {
        Self {
            id: van.id,
            van_number: van.van_number.clone(),
            van_model: van.van_model.clone(),
            capacity: van.capacity,
            route_name: van.route_name.clone(),
            is_active: van.is_active,
            driver_name: driver.full_name(),
            driver_phone: driver.phone_number.clone(),
            created_at: van.created_at,
            updated_at: van.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChildView {
    pub id: i64,
    pub child_name: String,
    pub child_grade: String,
    pub school_name: String,
    pub admission_number: String,
    pub pickup_time: Option<NaiveTime>,
    pub dropoff_time: Option<NaiveTime>,
    pub is_active: bool,
    pub van_number: String,
    pub driver_name: String,
    pub driver_phone: String,
}

impl ChildView {
    pub fn new(
        child: child_van_assignments::Model,
        van: &van_assignments::Model,
        driver: &users::Model,
    ) -> Self {
        Self {
            id: child.id,
            child_name: child.child_name,
            child_grade: child.child_grade,
            school_name: child.school_name,
            admission_number: child.admission_number,
            pickup_time: child.pickup_time,
            dropoff_time: child.dropoff_time,
            is_active: child.is_active,
            van_number: van.van_number.clone(),
            driver_name: driver.full_name(),
            driver_phone: driver.phone_number.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VanLocationResponse {
    pub van_assignment: VanView,
    pub location: LocationView,
    pub children: Vec<ChildView>,
}

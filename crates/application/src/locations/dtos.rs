use chrono::{DateTime, FixedOffset};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use vantrack_core::entities::{locations, users};

// ============ Push ============

/// Coordinates arrive as JSON numbers or numeric strings.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PushLocationRequest {
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub accuracy: Option<f64>,
    pub speed: Option<f64>,
    pub heading: Option<f64>,
    pub altitude: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PushLocationResponse {
    pub message: String,
    pub location: LocationView,
}

// ============ Projection ============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationView {
    pub id: i64,
    pub latitude: Decimal,
    pub longitude: Decimal,
    pub accuracy: Option<f64>,
    pub speed: Option<f64>,
    pub heading: Option<f64>,
    pub altitude: Option<f64>,
    pub timestamp: DateTime<FixedOffset>,
    pub is_active: bool,
    pub driver_name: String,
    pub driver_phone: String,
    /// `[latitude, longitude]` as plain numbers for map widgets.
    pub coordinates: [f64; 2],
}

impl LocationView {
    pub fn new(location: locations::Model, driver: &users::Model) -> Self {
        let coordinates = [
            location.latitude.to_f64().unwrap_or_default(),
            location.longitude.to_f64().unwrap_or_default(),
        ];
        Self {
            id: location.id,
            latitude: location.latitude,
            longitude: location.longitude,
            accuracy: location.accuracy,
            speed: location.speed,
            heading: location.heading,
            altitude: location.altitude,
            timestamp: location.created_at,
            is_active: location.is_active,
            driver_name: driver.full_name(),
            driver_phone: driver.phone_number.clone(),
            coordinates,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CurrentLocationResponse {
    pub location: LocationView,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LocationHistoryResponse {
    pub locations: Vec<LocationView>,
}

// ============ Tracking preference ============

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ToggleTrackingRequest {
    pub enabled: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ToggleTrackingResponse {
    pub message: String,
    pub enabled: bool,
}

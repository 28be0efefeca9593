use rust_decimal::Decimal;

/// A validated GPS reading ready to become the driver's active location.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationFix {
    pub latitude: Decimal,
    pub longitude: Decimal,
    pub accuracy: Option<f64>,
    pub speed: Option<f64>,
    pub heading: Option<f64>,
    pub altitude: Option<f64>,
}

impl LocationFix {
    pub fn new(latitude: Decimal, longitude: Decimal) -> Self {
        Self {
            latitude,
            longitude,
            accuracy: None,
            speed: None,
            heading: None,
            altitude: None,
        }
    }
}

// Storage ports and their two adapters. Use cases only see the traits.

pub mod memory;
pub mod postgres;
pub mod traits;

pub use memory::InMemoryStore;
pub use postgres::{
    PostgresAssignmentRepository, PostgresLocationRepository, PostgresOtpRepository,
    PostgresTokenRepository, PostgresUserRepository,
};
pub use traits::{
    AssignmentRepository, LocationRepository, OtpRepository, TokenRepository, UserRepository,
};

/// Empty strings clear optional text columns.
pub(crate) fn blank_to_none(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

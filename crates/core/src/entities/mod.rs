pub mod prelude;

pub mod auth_tokens;
pub mod child_van_assignments;
pub mod locations;
pub mod otp_verifications;
pub mod users;
pub mod van_assignments;

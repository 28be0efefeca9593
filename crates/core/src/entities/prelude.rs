pub use super::auth_tokens::Entity as AuthTokens;
pub use super::child_van_assignments::Entity as ChildVanAssignments;
pub use super::locations::Entity as Locations;
pub use super::otp_verifications::Entity as OtpVerifications;
pub use super::users::Entity as Users;
pub use super::van_assignments::Entity as VanAssignments;

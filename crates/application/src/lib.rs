pub mod assignments;
pub mod auth;
pub mod context;
pub mod error;
pub mod locations;
pub mod users;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use context::{AppContext, OtpConfig};
pub use error::{AppError, AppResult, OtpRejection};

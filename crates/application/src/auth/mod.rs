pub mod dtos;
pub mod guard;
pub mod use_cases;
mod validation;

pub use guard::require_role;
pub use validation::{mask_phone, normalize_phone, require_phone, validate_phone_number, PHONE_REGEX};

mod location;
mod profile;
mod role;

pub use location::LocationFix;
pub use profile::ProfileChanges;
pub use role::{Role, UnknownRole};

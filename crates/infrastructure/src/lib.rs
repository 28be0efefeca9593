pub mod database;
pub mod locks;
pub mod repositories;
pub mod seed;
pub mod sms;

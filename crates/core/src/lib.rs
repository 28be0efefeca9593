pub mod domain;
pub mod entities;

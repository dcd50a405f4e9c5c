//! Row models and DTOs, one module per entity.

pub mod notification;
pub mod project;
pub mod user;

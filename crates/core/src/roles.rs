//! Well-known role name constants.
//!
//! These must match the seed data in `db/migrations` and the `users.role`
//! column values read by the audience resolver.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_ASSEMBLER: &str = "assembler";

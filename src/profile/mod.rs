//! The per-user profile holding monthly and lifetime budgets.

mod core;
mod endpoints;

pub use self::core::{create_profile_table, get_or_create_profile, update_profile_budgets};
pub use endpoints::{get_profile_endpoint, update_profile_endpoint};

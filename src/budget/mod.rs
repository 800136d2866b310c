//! Per-category spending limits.

mod core;
mod endpoints;

pub use self::core::{Budget, NewBudget, create_budget, create_budget_table, query_budgets};
pub use endpoints::{create_budget_endpoint, delete_budget_endpoint, list_budgets_endpoint};

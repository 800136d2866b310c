//! Recording, listing and deleting the money a user has received.

mod core;
mod endpoints;

pub use self::core::{IncomeSource, NewIncome, create_income, create_income_table, query_incomes};
pub use endpoints::{create_income_endpoint, delete_income_endpoint, list_incomes_endpoint};

//! Recording, listing and deleting the money a user has spent.

mod core;
mod create_endpoint;
mod delete_endpoint;
mod list_endpoint;

pub use self::core::{
    Expense, ExpenseCategory, NewExpense, create_expense, create_expense_table, query_expenses,
};
pub use create_endpoint::create_expense_endpoint;
pub use delete_endpoint::delete_expense_endpoint;
pub use list_endpoint::{DateFilter, list_expenses_endpoint};

//! Defines the core data models and database queries for expenses.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    database_id::{DatabaseId, RowsAffected},
    money::{get_decimal, to_sql_text},
    user::UserID,
};

pub type ExpenseId = DatabaseId;

/// What an expense was spent on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ExpenseCategory {
    /// Groceries and eating out.
    Food,
    /// Public transport, fuel and parking.
    Transport,
    /// Movies, concerts and other outings.
    Entertainment,
    /// Doctors, pharmacies and insurance.
    Health,
    /// Clothes and other purchases.
    Shopping,
    /// Rent, utilities and subscriptions.
    Bills,
    /// Video games and game purchases.
    Games,
    /// Anything else.
    Other,
}

impl ExpenseCategory {
    /// The name stored in the database and matched against budget categories.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseCategory::Food => "Food",
            ExpenseCategory::Transport => "Transport",
            ExpenseCategory::Entertainment => "Entertainment",
            ExpenseCategory::Health => "Health",
            ExpenseCategory::Shopping => "Shopping",
            ExpenseCategory::Bills => "Bills",
            ExpenseCategory::Games => "Games",
            ExpenseCategory::Other => "Other",
        }
    }
}

impl Display for ExpenseCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExpenseCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Food" => Ok(ExpenseCategory::Food),
            "Transport" => Ok(ExpenseCategory::Transport),
            "Entertainment" => Ok(ExpenseCategory::Entertainment),
            "Health" => Ok(ExpenseCategory::Health),
            "Shopping" => Ok(ExpenseCategory::Shopping),
            "Bills" => Ok(ExpenseCategory::Bills),
            "Games" => Ok(ExpenseCategory::Games),
            "Other" => Ok(ExpenseCategory::Other),
            other => Err(format!("unknown expense category \"{other}\"")),
        }
    }
}

impl ToSql for ExpenseCategory {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for ExpenseCategory {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: String| FromSqlError::Other(error.into()))
    }
}

/// Money the user spent.
///
/// Expenses cannot be edited, only deleted and re-entered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expense {
    /// The ID of the expense.
    pub id: ExpenseId,
    /// The user who spent the money.
    pub user_id: UserID,
    /// A text description of what the money was spent on.
    pub description: String,
    pub category: ExpenseCategory,
    /// How much was spent, never negative.
    pub amount: Decimal,
    /// When the money was spent.
    pub date: Date,
    /// When the expense was recorded.
    pub created_at: OffsetDateTime,
}

/// A validated expense that has not been saved yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    /// A text description of what the money was spent on.
    pub description: String,
    /// What the money was spent on.
    pub category: ExpenseCategory,
    /// How much was spent, never negative.
    pub amount: Decimal,
    /// When the money was spent.
    pub date: Date,
}

pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS expense (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES user(id) ON DELETE CASCADE,
            description TEXT NOT NULL,
            category TEXT NOT NULL,
            amount TEXT NOT NULL,
            date TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_expense_user_date ON expense(user_id, date)",
        (),
    )?;

    Ok(())
}

pub fn map_row_to_expense(row: &Row) -> Result<Expense, rusqlite::Error> {
    Ok(Expense {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        description: row.get(2)?,
        category: row.get(3)?,
        amount: get_decimal(row, 4)?,
        date: row.get(5)?,
        created_at: row.get(6)?,
    })
}

/// Save a new expense for `user_id`.
///
/// # Errors
/// Returns an [Error::SqlError] if `user_id` does not refer to a user or there
/// is some other SQL error.
pub fn create_expense(
    user_id: UserID,
    expense: NewExpense,
    connection: &Connection,
) -> Result<Expense, Error> {
    connection
        .prepare(
            "INSERT INTO expense (user_id, description, category, amount, date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING id, user_id, description, category, amount, date, created_at",
        )?
        .query_row(
            (
                user_id.as_i64(),
                expense.description,
                expense.category,
                to_sql_text(expense.amount),
                expense.date,
                OffsetDateTime::now_utc(),
            ),
            map_row_to_expense,
        )
        .map_err(Error::from)
}

/// Get the expenses for `user_id`, newest first.
///
/// If `date_from` is set, only expenses on or after that date are returned.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn query_expenses(
    user_id: UserID,
    date_from: Option<Date>,
    connection: &Connection,
) -> Result<Vec<Expense>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, description, category, amount, date, created_at
             FROM expense
             WHERE user_id = ?1 AND (?2 IS NULL OR date >= ?2)
             ORDER BY date DESC, id DESC",
        )?
        .query_map((user_id.as_i64(), date_from), map_row_to_expense)?
        .collect::<Result<Vec<Expense>, rusqlite::Error>>()
        .map_err(Error::from)
}

/// Delete the expense `id` if it belongs to `user_id`.
///
/// Returns the number of rows deleted, zero if the expense does not exist or
/// belongs to someone else.
pub fn delete_expense(
    user_id: UserID,
    id: ExpenseId,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    connection
        .execute(
            "DELETE FROM expense WHERE id = ?1 AND user_id = ?2",
            (id, user_id.as_i64()),
        )
        .map_err(Error::from)
}

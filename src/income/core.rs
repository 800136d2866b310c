//! Defines the core data models and database queries for income.

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

pub type IncomeId = DatabaseId;

/// Where a user's income came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IncomeSource {
    /// Wages from an employer.
    Salary,
    /// Payment for contract work.
    Freelance,
    /// Dividends, interest and other investment returns.
    Investment,
    /// One-off payments from an employer.
    Bonus,
    /// Anything else.
    Other,
}

impl IncomeSource {
    /// The name stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            IncomeSource::Salary => "Salary",
            IncomeSource::Freelance => "Freelance",
            IncomeSource::Investment => "Investment",
            IncomeSource::Bonus => "Bonus",
            IncomeSource::Other => "Other",
        }
    }
}

impl Display for IncomeSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IncomeSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Salary" => Ok(IncomeSource::Salary),
            "Freelance" => Ok(IncomeSource::Freelance),
            "Investment" => Ok(IncomeSource::Investment),
            "Bonus" => Ok(IncomeSource::Bonus),
            "Other" => Ok(IncomeSource::Other),
            other => Err(format!("unknown income source \"{other}\"")),
        }
    }
}

impl ToSql for IncomeSource {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for IncomeSource {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: String| FromSqlError::Other(error.into()))
    }
}

/// Money the user received.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Income {
    pub id: IncomeId,
    pub user_id: UserID,
    pub description: String,
    pub source: IncomeSource,
    /// How much was received, never negative.
    pub amount: Decimal,
    pub date: Date,
    pub created_at: OffsetDateTime,
}

/// A validated income that has not been saved yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewIncome {
    /// A text description of the income.
    pub description: String,
    /// Where the money came from.
    pub source: IncomeSource,
    /// How much was received, never negative.
    pub amount: Decimal,
    /// When the money was received.
    pub date: Date,
}

pub fn create_income_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS income (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES user(id) ON DELETE CASCADE,
            description TEXT NOT NULL,
            source TEXT NOT NULL,
            amount TEXT NOT NULL,
            date TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_income_user_date ON income(user_id, date)",
        (),
    )?;

    Ok(())
}

fn map_row_to_income(row: &Row) -> Result<Income, rusqlite::Error> {
    Ok(Income {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        description: row.get(2)?,
        source: row.get(3)?,
        amount: get_decimal(row, 4)?,
        date: row.get(5)?,
        created_at: row.get(6)?,
    })
}

/// Save a new income for `user_id`.
///
/// # Errors
/// Returns an [Error::SqlError] if `user_id` does not refer to a user or there
/// is some other SQL error.
pub fn create_income(
    user_id: UserID,
    income: NewIncome,
    connection: &Connection,
) -> Result<Income, Error> {
    connection
        .prepare(
            "INSERT INTO income (user_id, description, source, amount, date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING id, user_id, description, source, amount, date, created_at",
        )?
        .query_row(
            (
                user_id.as_i64(),
                income.description,
                income.source,
                to_sql_text(income.amount),
                income.date,
                OffsetDateTime::now_utc(),
            ),
            map_row_to_income,
        )
        .map_err(Error::from)
}

/// Get the income for `user_id`, newest first, optionally only from `date_from` onwards.
pub fn query_incomes(
    user_id: UserID,
    date_from: Option<Date>,
    connection: &Connection,
) -> Result<Vec<Income>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, description, source, amount, date, created_at
             FROM income
             WHERE user_id = ?1 AND (?2 IS NULL OR date >= ?2)
             ORDER BY date DESC, id DESC",
        )?
        .query_map((user_id.as_i64(), date_from), map_row_to_income)?
        .collect::<Result<Vec<Income>, rusqlite::Error>>()
        .map_err(Error::from)
}

/// Delete the income `id` if it belongs to `user_id`, returning the number of rows deleted.
pub fn delete_income(
    user_id: UserID,
    id: IncomeId,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    connection
        .execute(
            "DELETE FROM income WHERE id = ?1 AND user_id = ?2",
            (id, user_id.as_i64()),
        )
        .map_err(Error::from)
}

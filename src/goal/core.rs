//! Defines the savings goal model and its database queries.

use rusqlite::{Connection, Row, Transaction as SqlTransaction, TransactionBehavior};
use rust_decimal::Decimal;
use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    Error,
    database_id::{DatabaseId, RowsAffected},
    money::{GOAL_MAX_DIGITS, check_digits, get_decimal, rounded_percentage, to_sql_text},
    user::UserID,
};

pub type GoalId = DatabaseId;

/// The icon shown for goals created without one.
pub const DEFAULT_GOAL_ICON: &str = "🎯";

/// Something the user is saving up for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialGoal {
    pub id: GoalId,
    pub user_id: UserID,
    pub name: String,
    /// A short emoji or symbol shown next to the name.
    pub icon: String,
    /// The amount to save. Not checked for sign.
    pub target: Decimal,
    /// The amount saved so far, starting at zero.
    pub saved: Decimal,
    pub created_at: OffsetDateTime,
}

impl FinancialGoal {
    /// How much of the target has been saved as a whole percentage.
    ///
    /// Zero if the target is zero. Not capped, so over-saving gives more than 100.
    pub fn percent(&self) -> i64 {
        if self.target.is_zero() {
            return 0;
        }

        rounded_percentage(self.saved, self.target)
    }
}

/// A validated goal that has not been saved yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewGoal {
    /// What the user is saving for.
    pub name: String,
    /// A short emoji or symbol, see [DEFAULT_GOAL_ICON].
    pub icon: String,
    /// The amount to save.
    pub target: Decimal,
}

pub fn create_goal_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS financial_goal (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES user(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            icon TEXT NOT NULL,
            target TEXT NOT NULL,
            saved TEXT NOT NULL DEFAULT '0.00',
            created_at TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

fn map_row_to_goal(row: &Row) -> Result<FinancialGoal, rusqlite::Error> {
    Ok(FinancialGoal {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        name: row.get(2)?,
        icon: row.get(3)?,
        target: get_decimal(row, 4)?,
        saved: get_decimal(row, 5)?,
        created_at: row.get(6)?,
    })
}

/// Save a new goal for `user_id` with nothing saved yet.
pub fn create_goal(
    user_id: UserID,
    goal: NewGoal,
    connection: &Connection,
) -> Result<FinancialGoal, Error> {
    connection
        .prepare(
            "INSERT INTO financial_goal (user_id, name, icon, target, saved, created_at)
             VALUES (?1, ?2, ?3, ?4, '0.00', ?5)
             RETURNING id, user_id, name, icon, target, saved, created_at",
        )?
        .query_row(
            (
                user_id.as_i64(),
                goal.name,
                goal.icon,
                to_sql_text(goal.target),
                OffsetDateTime::now_utc(),
            ),
            map_row_to_goal,
        )
        .map_err(Error::from)
}

/// Get the goals for `user_id` ordered by name.
pub fn query_goals(user_id: UserID, connection: &Connection) -> Result<Vec<FinancialGoal>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, icon, target, saved, created_at
             FROM financial_goal
             WHERE user_id = ?1
             ORDER BY name, id",
        )?
        .query_map([user_id.as_i64()], map_row_to_goal)?
        .collect::<Result<Vec<FinancialGoal>, rusqlite::Error>>()
        .map_err(Error::from)
}

/// Add `amount` to the saved total of goal `id`.
///
/// # Errors
/// Returns:
/// - [Error::UpdateMissingGoal] if the goal does not exist or belongs to another user,
/// - [Error::TooManyDigits] if the new total does not fit,
/// - [Error::SqlError] if there is some other SQL error.
pub fn add_savings(
    user_id: UserID,
    id: GoalId,
    amount: Decimal,
    connection: &Connection,
) -> Result<FinancialGoal, Error> {
    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    let goal = transaction
        .query_row(
            "SELECT id, user_id, name, icon, target, saved, created_at
             FROM financial_goal
             WHERE id = ?1 AND user_id = ?2",
            (id, user_id.as_i64()),
            map_row_to_goal,
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::UpdateMissingGoal,
            error => error.into(),
        })?;

    let saved = goal.saved + amount;
    check_digits(saved, GOAL_MAX_DIGITS)?;

    let goal = transaction.query_row(
        "UPDATE financial_goal SET saved = ?1
         WHERE id = ?2 AND user_id = ?3
         RETURNING id, user_id, name, icon, target, saved, created_at",
        (to_sql_text(saved), id, user_id.as_i64()),
        map_row_to_goal,
    )?;

    transaction.commit()?;

    Ok(goal)
}

/// Replace the name, icon, target and saved amount of goal `id`.
///
/// # Errors
/// Returns:
/// - [Error::UpdateMissingGoal] if the goal does not exist or belongs to another user,
/// - [Error::SqlError] if there is some other SQL error.
pub fn update_goal(
    user_id: UserID,
    id: GoalId,
    goal: NewGoal,
    saved: Decimal,
    connection: &Connection,
) -> Result<FinancialGoal, Error> {
    connection
        .prepare(
            "UPDATE financial_goal SET name = ?1, icon = ?2, target = ?3, saved = ?4
             WHERE id = ?5 AND user_id = ?6
             RETURNING id, user_id, name, icon, target, saved, created_at",
        )?
        .query_row(
            (
                goal.name,
                goal.icon,
                to_sql_text(goal.target),
                to_sql_text(saved),
                id,
                user_id.as_i64(),
            ),
            map_row_to_goal,
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::UpdateMissingGoal,
            error => error.into(),
        })
}

/// Delete the goal `id` if it belongs to `user_id`, returning the number of rows deleted.
pub fn delete_goal(
    user_id: UserID,
    id: GoalId,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    connection
        .execute(
            "DELETE FROM financial_goal WHERE id = ?1 AND user_id = ?2",
            (id, user_id.as_i64()),
        )
        .map_err(Error::from)
}

//! Defines the budget model and its database queries.

use rusqlite::{Connection, Row};
use rust_decimal::Decimal;
use serde::Serialize;
use time::Date;

use crate::{
    Error,
    database_id::{DatabaseId, RowsAffected},
    money::{get_decimal, to_sql_text},
    user::UserID,
};

pub type BudgetId = DatabaseId;

/// A spending limit for one category over the period starting at `month`.
///
/// `category` is free text and is only meaningful when it matches an
/// expense category exactly, e.g. "Food".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Budget {
    pub id: BudgetId,
    pub user_id: UserID,
    pub category: String,
    /// May be zero or negative, in which case the category never reports a percentage.
    pub limit: Decimal,
    pub month: Date,
}

/// A validated budget that has not been saved yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBudget {
    /// The expense category the limit applies to.
    pub category: String,
    /// The most that should be spent in the category.
    pub limit: Decimal,
    /// The date marking the start of the budget period.
    pub month: Date,
}

pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS budget (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES user(id) ON DELETE CASCADE,
            category TEXT NOT NULL,
            \"limit\" TEXT NOT NULL,
            month TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

fn map_row_to_budget(row: &Row) -> Result<Budget, rusqlite::Error> {
    Ok(Budget {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        category: row.get(2)?,
        limit: get_decimal(row, 3)?,
        month: row.get(4)?,
    })
}

/// Save a new budget for `user_id`.
pub fn create_budget(
    user_id: UserID,
    budget: NewBudget,
    connection: &Connection,
) -> Result<Budget, Error> {
    connection
        .prepare(
            "INSERT INTO budget (user_id, category, \"limit\", month)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id, user_id, category, \"limit\", month",
        )?
        .query_row(
            (
                user_id.as_i64(),
                budget.category,
                to_sql_text(budget.limit),
                budget.month,
            ),
            map_row_to_budget,
        )
        .map_err(Error::from)
}

/// Get the budgets for `user_id` ordered by category, then month.
///
/// If `month_from` is set, only budgets whose month is on or after that date
/// are returned. Every matching row is returned, even if several rows share a
/// category.
pub fn query_budgets(
    user_id: UserID,
    month_from: Option<Date>,
    connection: &Connection,
) -> Result<Vec<Budget>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, category, \"limit\", month
             FROM budget
             WHERE user_id = ?1 AND (?2 IS NULL OR month >= ?2)
             ORDER BY category, month, id",
        )?
        .query_map((user_id.as_i64(), month_from), map_row_to_budget)?
        .collect::<Result<Vec<Budget>, rusqlite::Error>>()
        .map_err(Error::from)
}

/// Delete the budget `id` if it belongs to `user_id`, returning the number of rows deleted.
pub fn delete_budget(
    user_id: UserID,
    id: BudgetId,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    connection
        .execute(
            "DELETE FROM budget WHERE id = ?1 AND user_id = ?2",
            (id, user_id.as_i64()),
        )
        .map_err(Error::from)
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use time::{Date, macros::date};

    use crate::{
        budget::core::{NewBudget, create_budget, delete_budget, query_budgets},
        test_utils::{get_test_connection, insert_test_user},
    };

    fn new_budget(category: &str, limit: i64, month: Date) -> NewBudget {
        NewBudget {
            category: category.to_owned(),
            limit: Decimal::from(limit),
            month,
        }
    }

    #[test]
    fn stores_negative_limits() {
        let conn = get_test_connection();
        let user = insert_test_user(&conn, "alice");

        let budget =
            create_budget(user.id, new_budget("Food", -20, date!(2025 - 03 - 01)), &conn).unwrap();

        assert_eq!(budget.limit, Decimal::from(-20));
    }

    #[test]
    fn query_orders_by_category_then_month() {
        let conn = get_test_connection();
        let user = insert_test_user(&conn, "alice");
        let transport_march =
            create_budget(user.id, new_budget("Transport", 50, date!(2025 - 03 - 01)), &conn)
                .unwrap();
        let food_april =
            create_budget(user.id, new_budget("Food", 100, date!(2025 - 04 - 01)), &conn).unwrap();
        let food_march =
            create_budget(user.id, new_budget("Food", 100, date!(2025 - 03 - 01)), &conn).unwrap();

        let budgets = query_budgets(user.id, None, &conn).unwrap();

        assert_eq!(budgets, vec![food_march, food_april, transport_march]);
    }

    #[test]
    fn query_excludes_earlier_months() {
        let conn = get_test_connection();
        let user = insert_test_user(&conn, "alice");
        create_budget(user.id, new_budget("Food", 100, date!(2025 - 02 - 01)), &conn).unwrap();
        let current =
            create_budget(user.id, new_budget("Food", 100, date!(2025 - 03 - 01)), &conn).unwrap();

        let budgets = query_budgets(user.id, Some(date!(2025 - 03 - 01)), &conn).unwrap();

        assert_eq!(budgets, vec![current]);
    }

    #[test]
    fn delete_is_owner_scoped() {
        let conn = get_test_connection();
        let alice = insert_test_user(&conn, "alice");
        let bob = insert_test_user(&conn, "bob");
        let budget =
            create_budget(alice.id, new_budget("Food", 100, date!(2025 - 03 - 01)), &conn)
                .unwrap();

        assert_eq!(delete_budget(bob.id, budget.id, &conn), Ok(0));
        assert_eq!(query_budgets(alice.id, None, &conn).unwrap(), vec![budget]);
    }
}

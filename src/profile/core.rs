use rusqlite::{Connection, Row};
use rust_decimal::Decimal;
use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    Error,
    money::{get_decimal, to_sql_text},
    user::UserID,
};

/// A user's overall spending limits.
///
/// Every user has exactly one profile. Both budgets default to zero, which
/// the dashboard treats as "no budget set".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserProfile {
    /// The user the profile belongs to.
    pub user_id: UserID,
    /// How much the user plans to spend each calendar month.
    pub monthly_budget: Decimal,
    /// How much the user plans to spend over all time.
    pub lifetime_budget: Decimal,
    /// A few words about the user, empty by default.
    pub bio: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

pub fn create_profile_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user_profile (
            user_id INTEGER PRIMARY KEY REFERENCES user(id) ON DELETE CASCADE,
            monthly_budget TEXT NOT NULL DEFAULT '0.00',
            lifetime_budget TEXT NOT NULL DEFAULT '0.00',
            bio TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

fn map_row_to_profile(row: &Row) -> Result<UserProfile, rusqlite::Error> {
    Ok(UserProfile {
        user_id: UserID::new(row.get(0)?),
        monthly_budget: get_decimal(row, 1)?,
        lifetime_budget: get_decimal(row, 2)?,
        bio: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

/// Get the profile for `user_id`, creating an empty one if the user does not have one yet.
///
/// This is the post-registration hook: [crate::register_user] calls it right
/// after inserting the user.
///
/// # Errors
/// Returns an [Error::SqlError] if `user_id` does not refer to a user or there
/// is some other SQL error.
pub fn get_or_create_profile(user_id: UserID, connection: &Connection) -> Result<UserProfile, Error> {
    let now = OffsetDateTime::now_utc();

    connection.execute(
        "INSERT INTO user_profile (user_id, created_at, updated_at) VALUES (?1, ?2, ?2)
         ON CONFLICT(user_id) DO NOTHING",
        (user_id.as_i64(), now),
    )?;

    connection
        .prepare(
            "SELECT user_id, monthly_budget, lifetime_budget, bio, created_at, updated_at
             FROM user_profile WHERE user_id = :user_id",
        )?
        .query_row(&[(":user_id", &user_id.as_i64())], map_row_to_profile)
        .map_err(Error::from)
}

/// Set the monthly and lifetime budgets on the profile for `user_id`.
///
/// The profile is created first if it does not exist.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn update_profile_budgets(
    user_id: UserID,
    monthly_budget: Decimal,
    lifetime_budget: Decimal,
    connection: &Connection,
) -> Result<UserProfile, Error> {
    get_or_create_profile(user_id, connection)?;

    connection
        .prepare(
            "UPDATE user_profile
             SET monthly_budget = ?1, lifetime_budget = ?2, updated_at = ?3
             WHERE user_id = ?4
             RETURNING user_id, monthly_budget, lifetime_budget, bio, created_at, updated_at",
        )?
        .query_row(
            (
                to_sql_text(monthly_budget),
                to_sql_text(lifetime_budget),
                OffsetDateTime::now_utc(),
                user_id.as_i64(),
            ),
            map_row_to_profile,
        )
        .map_err(Error::from)
}

/// Replace the bio on the profile for `user_id`.
///
/// The profile is created first if it does not exist.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn update_profile_bio(
    user_id: UserID,
    bio: &str,
    connection: &Connection,
) -> Result<UserProfile, Error> {
    get_or_create_profile(user_id, connection)?;

    connection
        .prepare(
            "UPDATE user_profile SET bio = ?1, updated_at = ?2
             WHERE user_id = ?3
             RETURNING user_id, monthly_budget, lifetime_budget, bio, created_at, updated_at",
        )?
        .query_row((bio, OffsetDateTime::now_utc(), user_id.as_i64()), map_row_to_profile)
        .map_err(Error::from)
}

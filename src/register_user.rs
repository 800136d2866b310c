//! Registering a user and creating their profile.
//!
//! The authenticating proxy owns passwords and email verification. Once it
//! has signed a user up it calls [register_user_endpoint] so that the user
//! can start recording expenses.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    profile::get_or_create_profile,
    user::{User, create_user},
    validation::required_text,
};

const USERNAME_MAX_LENGTH: usize = 150;
const EMAIL_MAX_LENGTH: usize = 254;

/// Create a user and their profile.
///
/// The profile is created by an explicit call straight after the user is
/// inserted, inside the same SQL transaction, so a user never exists without
/// a profile.
///
/// # Errors
/// Returns:
/// - [Error::EmptyField] or [Error::FieldTooLong] if `username` or `email` are invalid,
/// - [Error::DuplicateUsername] if `username` is taken,
/// - [Error::SqlError] if some other SQL error occurred.
pub fn register_user(username: &str, email: &str, connection: &Connection) -> Result<User, Error> {
    let username = required_text("username", username, USERNAME_MAX_LENGTH)?;
    let email = required_text("email", email, EMAIL_MAX_LENGTH)?;

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    let user = create_user(&username, &email, &transaction)?;
    get_or_create_profile(user.id, &transaction)?;

    transaction.commit()?;

    tracing::info!("Registered user {} ({})", user.id, user.username);

    Ok(user)
}

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
}

/// A route handler for registering a user, responds with the new user.
pub async fn register_user_endpoint(
    State(state): State<RegistrationState>,
    Form(form): Form<RegisterForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match register_user(&form.username, &form.email, &connection) {
        Ok(user) => (StatusCode::CREATED, Json(user)).into_response(),
        Err(error) => {
            tracing::warn!("could not register user {:?}: {error}", form.username);
            error.into_response()
        }
    }
}

#[cfg(test)]
mod register_user_tests {
    use rust_decimal::Decimal;

    use crate::{
        Error,
        profile::get_or_create_profile,
        register_user::register_user,
        test_utils::get_test_connection,
        user::get_user_by_id,
    };

    #[test]
    fn creates_user_and_profile() {
        let conn = get_test_connection();

        let user = register_user("alice", "alice@example.com", &conn).unwrap();

        assert_eq!(get_user_by_id(user.id, &conn).unwrap(), user);
        let profile_count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM user_profile WHERE user_id = ?1",
                [user.id.as_i64()],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(profile_count, 1);
        let profile = get_or_create_profile(user.id, &conn).unwrap();
        assert_eq!(profile.monthly_budget, Decimal::ZERO);
    }

    #[test]
    fn duplicate_username_creates_nothing() {
        let conn = get_test_connection();
        register_user("alice", "alice@example.com", &conn).unwrap();

        let result = register_user("alice", "imposter@example.com", &conn);

        assert_eq!(result, Err(Error::DuplicateUsername("alice".to_owned())));
        let user_count: i64 = conn
            .query_row("SELECT COUNT(*) FROM user", [], |row| row.get(0))
            .unwrap();
        assert_eq!(user_count, 1);
    }

    #[test]
    fn rejects_blank_username() {
        let conn = get_test_connection();

        let result = register_user("  ", "alice@example.com", &conn);

        assert_eq!(result, Err(Error::EmptyField("username")));
    }
}

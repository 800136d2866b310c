//! Cashly is a web app for tracking personal spending, income, budgets and
//! savings goals.
//!
//! This library provides a JSON API over a SQLite database. The API computes
//! the monthly and lifetime summaries that a presentation layer renders as
//! the user's dashboard.
//!
//! Log-in, sessions and email verification are handled by an authenticating
//! reverse proxy in front of this service. The proxy forwards the user's ID in
//! the [AUTHENTICATED_USER_HEADER] header.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod alert;
mod app_state;
mod budget;
mod database_id;
mod db;
mod endpoints;
mod expense;
mod goal;
mod identity;
mod income;
mod logging;
mod money;
mod profile;
mod register_user;
mod routing;
mod summary;
mod timezone;
mod user;
mod validation;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use budget::{NewBudget, create_budget};
pub use db::initialize as initialize_db;
pub use expense::{ExpenseCategory, NewExpense, create_expense};
pub use goal::{NewGoal, add_savings, create_goal};
pub use identity::AUTHENTICATED_USER_HEADER;
pub use income::{IncomeSource, NewIncome, create_income};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use profile::update_profile_budgets;
pub use register_user::register_user;
pub use routing::build_router;
pub use timezone::get_local_offset;
pub use user::{User, UserID, get_user_by_id};

use crate::alert::{Alert, render};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user entered an amount that could not be parsed as a number.
    #[error("\"{0}\" is not a valid amount")]
    InvalidAmount(String),

    /// The user entered a negative amount for a field that must be zero or more.
    #[error("amounts cannot be negative")]
    NegativeAmount,

    /// The user entered an amount with fractional cents.
    #[error("amounts can have at most two decimal places")]
    TooManyDecimalPlaces,

    /// The user entered an amount that does not fit in the column.
    ///
    /// The value is the maximum number of digits allowed before the decimal
    /// point.
    #[error("amounts can have at most {0} digits before the decimal point")]
    TooManyDigits(u32),

    /// A required text field was empty or only whitespace.
    #[error("{0} cannot be empty")]
    EmptyField(&'static str),

    /// A text field was longer than its column allows.
    #[error("{0} cannot be longer than {1} characters")]
    FieldTooLong(&'static str, usize),

    /// The username chosen during registration already belongs to a user.
    #[error("the username \"{0}\" is already taken")]
    DuplicateUsername(String),

    /// The request reached a protected route without the identity header set
    /// by the authenticating proxy.
    #[error("the request did not identify a user")]
    MissingIdentity,

    /// The identity header referred to a user that is not in the database.
    #[error("the authenticated user does not exist")]
    UnknownUser,

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to delete an expense that does not exist or belongs to another user.
    #[error("tried to delete an expense that is not in the database")]
    DeleteMissingExpense,

    /// Tried to delete an income that does not exist or belongs to another user.
    #[error("tried to delete an income that is not in the database")]
    DeleteMissingIncome,

    /// Tried to delete a budget that does not exist or belongs to another user.
    #[error("tried to delete a budget that is not in the database")]
    DeleteMissingBudget,

    /// Tried to delete a goal that does not exist or belongs to another user.
    #[error("tried to delete a goal that is not in the database")]
    DeleteMissingGoal,

    /// Tried to update a goal that does not exist or belongs to another user.
    #[error("tried to update a goal that is not in the database")]
    UpdateMissingGoal,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::InvalidAmount(_)
            | Error::NegativeAmount
            | Error::TooManyDecimalPlaces
            | Error::TooManyDigits(_)
            | Error::EmptyField(_)
            | Error::FieldTooLong(_, _) => render(
                StatusCode::BAD_REQUEST,
                Alert::error("Invalid input", &capitalise(&self.to_string())),
            ),
            Error::DuplicateUsername(username) => render(
                StatusCode::BAD_REQUEST,
                Alert::error(
                    "Duplicate username",
                    &format!("The username {username} is already taken. Choose a different username."),
                ),
            ),
            Error::MissingIdentity => render(
                StatusCode::UNAUTHORIZED,
                Alert::error(
                    "Not logged in",
                    "Log in through the front page before using the app.",
                ),
            ),
            Error::UnknownUser => render(
                StatusCode::UNAUTHORIZED,
                Alert::error(
                    "Unknown user",
                    "Your account could not be found. Try logging in again.",
                ),
            ),
            Error::NotFound => render(
                StatusCode::NOT_FOUND,
                Alert::error("Not found", "The requested resource could not be found."),
            ),
            Error::DeleteMissingExpense => not_found_response("expense"),
            Error::DeleteMissingIncome => not_found_response("income"),
            Error::DeleteMissingBudget => not_found_response("budget"),
            Error::DeleteMissingGoal | Error::UpdateMissingGoal => not_found_response("goal"),
            Error::InvalidTimezoneError(timezone) => render(
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::error(
                    "Invalid Timezone Settings",
                    &format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                    ),
                ),
            ),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                render(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Alert::error(
                        "Something went wrong",
                        "An unexpected error occurred, check the server logs for more details.",
                    ),
                )
            }
        }
    }
}

fn not_found_response(record: &str) -> Response {
    render(
        StatusCode::NOT_FOUND,
        Alert::error(
            &format!("{} not found", capitalise(record)),
            &format!(
                "The {record} could not be found. \
                Try refreshing the page to see if the {record} has already been deleted."
            ),
        ),
    )
}

fn capitalise(text: &str) -> String {
    let mut chars = text.chars();

    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

//! Route handlers for the dashboard summary and goals overview.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Query;
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    summary::core::{build_dashboard_summary, build_goals_overview},
    timezone::get_local_date,
    user::UserID,
};

/// The state needed for the summary pages.
#[derive(Debug, Clone)]
pub struct SummaryState {
    /// The database connection for reading the user's records.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, used to work out "today".
    pub local_timezone: String,
}

impl FromRef<AppState> for SummaryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Query parameters for the dashboard summary.
#[derive(Debug, Default, Deserialize)]
pub struct SummaryQuery {
    /// The reference date, defaults to today in the server's timezone.
    pub date: Option<Date>,
}

/// A route handler that responds with the requesting user's dashboard summary.
pub async fn get_summary_endpoint(
    State(state): State<SummaryState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<SummaryQuery>,
) -> Response {
    let today = match query.date {
        Some(date) => date,
        None => match get_local_date(&state.local_timezone) {
            Some(date) => date,
            None => return Error::InvalidTimezoneError(state.local_timezone).into_response(),
        },
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match build_dashboard_summary(user_id, today, &connection) {
        Ok(summary) => Json(summary).into_response(),
        Err(error) => {
            tracing::error!("could not build summary for user {user_id}: {error}");
            error.into_response()
        }
    }
}

/// A route handler that responds with the requesting user's goal progress.
pub async fn get_goals_overview_endpoint(
    State(state): State<SummaryState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match build_goals_overview(user_id, &connection) {
        Ok(overview) => Json(overview).into_response(),
        Err(error) => {
            tracing::error!("could not build goals overview for user {user_id}: {error}");
            error.into_response()
        }
    }
}

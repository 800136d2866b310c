//! Endpoints for recording, listing and deleting income.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{Form, Query};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    AppState, Error,
    alert::Alert,
    expense::DateFilter,
    income::core::{
        IncomeId, IncomeSource, NewIncome, create_income, delete_income, query_incomes,
    },
    money::{AMOUNT_MAX_DIGITS, parse_amount},
    user::UserID,
    validation::required_text,
};

const DESCRIPTION_MAX_LENGTH: usize = 200;

/// The state needed for managing income.
#[derive(Debug, Clone)]
pub struct IncomeState {
    /// The database connection for managing income.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for IncomeState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for recording income.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeForm {
    pub description: String,
    pub source: IncomeSource,
    pub amount: String,
    pub date: Date,
}

impl IncomeForm {
    fn validate(self) -> Result<NewIncome, Error> {
        Ok(NewIncome {
            description: required_text("description", &self.description, DESCRIPTION_MAX_LENGTH)?,
            source: self.source,
            amount: parse_amount(&self.amount, AMOUNT_MAX_DIGITS)?,
            date: self.date,
        })
    }
}

/// A route handler for recording income, responds with the saved income.
pub async fn create_income_endpoint(
    State(state): State<IncomeState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<IncomeForm>,
) -> Response {
    let new_income = match form.validate() {
        Ok(new_income) => new_income,
        Err(error) => return error.into_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match create_income(user_id, new_income, &connection) {
        Ok(income) => (StatusCode::CREATED, Json(income)).into_response(),
        Err(error) => {
            tracing::error!("could not create income for user {user_id}: {error}");
            error.into_response()
        }
    }
}

/// A route handler that responds with the requesting user's income, newest first.
pub async fn list_incomes_endpoint(
    State(state): State<IncomeState>,
    Extension(user_id): Extension<UserID>,
    Query(filter): Query<DateFilter>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match query_incomes(user_id, filter.from, &connection) {
        Ok(incomes) => Json(incomes).into_response(),
        Err(error) => {
            tracing::error!("could not list income for user {user_id}: {error}");
            error.into_response()
        }
    }
}

/// A route handler for deleting one of the requesting user's incomes, responds with an alert.
pub async fn delete_income_endpoint(
    State(state): State<IncomeState>,
    Extension(user_id): Extension<UserID>,
    Path(income_id): Path<IncomeId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match delete_income(user_id, income_id, &connection) {
        Ok(0) => Error::DeleteMissingIncome.into_response(),
        Ok(_) => Alert::success_simple("Income deleted").into_response(),
        Err(error) => {
            tracing::error!("could not delete income {income_id}: {error}");
            error.into_response()
        }
    }
}

//! Endpoints for creating, listing and deleting budgets.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    AppState, Error,
    alert::Alert,
    budget::core::{BudgetId, NewBudget, create_budget, delete_budget, query_budgets},
    money::{AMOUNT_MAX_DIGITS, parse_signed_amount},
    user::UserID,
    validation::required_text,
};

const CATEGORY_MAX_LENGTH: usize = 50;

/// The state needed for managing budgets.
#[derive(Debug, Clone)]
pub struct BudgetState {
    /// The database connection for managing budgets.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for BudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for creating a budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetForm {
    pub category: String,
    pub limit: String,
    pub month: Date,
}

impl BudgetForm {
    fn validate(self) -> Result<NewBudget, Error> {
        Ok(NewBudget {
            category: required_text("category", &self.category, CATEGORY_MAX_LENGTH)?,
            limit: parse_signed_amount(&self.limit, AMOUNT_MAX_DIGITS)?,
            month: self.month,
        })
    }
}

/// A route handler for creating a budget, responds with the saved budget.
pub async fn create_budget_endpoint(
    State(state): State<BudgetState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<BudgetForm>,
) -> Response {
    let new_budget = match form.validate() {
        Ok(new_budget) => new_budget,
        Err(error) => return error.into_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match create_budget(user_id, new_budget, &connection) {
        Ok(budget) => (StatusCode::CREATED, Json(budget)).into_response(),
        Err(error) => {
            tracing::error!("could not create budget for user {user_id}: {error}");
            error.into_response()
        }
    }
}

/// A route handler that responds with all of the requesting user's budgets.
pub async fn list_budgets_endpoint(
    State(state): State<BudgetState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match query_budgets(user_id, None, &connection) {
        Ok(budgets) => Json(budgets).into_response(),
        Err(error) => {
            tracing::error!("could not list budgets for user {user_id}: {error}");
            error.into_response()
        }
    }
}

/// A route handler for deleting one of the requesting user's budgets, responds with an alert.
pub async fn delete_budget_endpoint(
    State(state): State<BudgetState>,
    Extension(user_id): Extension<UserID>,
    Path(budget_id): Path<BudgetId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match delete_budget(user_id, budget_id, &connection) {
        Ok(0) => Error::DeleteMissingBudget.into_response(),
        Ok(_) => Alert::success_simple("Budget deleted").into_response(),
        Err(error) => {
            tracing::error!("could not delete budget {budget_id}: {error}");
            error.into_response()
        }
    }
}

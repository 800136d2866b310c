//! Endpoints for creating, listing, editing, funding and deleting goals.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    alert::Alert,
    goal::core::{
        DEFAULT_GOAL_ICON, GoalId, NewGoal, add_savings, create_goal, delete_goal, query_goals,
        update_goal,
    },
    money::{GOAL_MAX_DIGITS, parse_amount, parse_signed_amount},
    user::UserID,
    validation::required_text,
};

const NAME_MAX_LENGTH: usize = 200;
const ICON_MAX_LENGTH: usize = 10;

/// The state needed for managing goals.
#[derive(Debug, Clone)]
pub struct GoalState {
    /// The database connection for managing goals.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for GoalState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for creating a goal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalForm {
    pub name: String,
    /// Falls back to [DEFAULT_GOAL_ICON] when missing or blank.
    #[serde(default)]
    pub icon: Option<String>,
    pub target: String,
}

impl GoalForm {
    fn validate(self) -> Result<NewGoal, Error> {
        validate_goal(&self.name, self.icon.as_deref(), &self.target)
    }
}

fn validate_goal(name: &str, icon: Option<&str>, target: &str) -> Result<NewGoal, Error> {
    let icon = match icon.map(str::trim) {
        None | Some("") => DEFAULT_GOAL_ICON.to_owned(),
        Some(icon) => required_text("icon", icon, ICON_MAX_LENGTH)?,
    };

    Ok(NewGoal {
        name: required_text("name", name, NAME_MAX_LENGTH)?,
        icon,
        target: parse_signed_amount(target, GOAL_MAX_DIGITS)?,
    })
}

/// The form data for editing a goal, including how much has been saved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditGoalForm {
    pub name: String,
    /// Falls back to [DEFAULT_GOAL_ICON] when missing or blank.
    #[serde(default)]
    pub icon: Option<String>,
    pub target: String,
    pub saved: String,
}

impl EditGoalForm {
    fn validate(self) -> Result<(NewGoal, Decimal), Error> {
        let goal = validate_goal(&self.name, self.icon.as_deref(), &self.target)?;
        let saved = parse_amount(&self.saved, GOAL_MAX_DIGITS)?;

        Ok((goal, saved))
    }
}

/// The form data for adding money to a goal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavingsForm {
    pub amount: String,
}

/// A route handler for creating a goal, responds with the saved goal.
pub async fn create_goal_endpoint(
    State(state): State<GoalState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<GoalForm>,
) -> Response {
    let new_goal = match form.validate() {
        Ok(new_goal) => new_goal,
        Err(error) => return error.into_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match create_goal(user_id, new_goal, &connection) {
        Ok(goal) => (StatusCode::CREATED, Json(goal)).into_response(),
        Err(error) => {
            tracing::error!("could not create goal for user {user_id}: {error}");
            error.into_response()
        }
    }
}

/// A route handler that responds with the requesting user's goals ordered by name.
pub async fn list_goals_endpoint(
    State(state): State<GoalState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match query_goals(user_id, &connection) {
        Ok(goals) => Json(goals).into_response(),
        Err(error) => {
            tracing::error!("could not list goals for user {user_id}: {error}");
            error.into_response()
        }
    }
}

/// A route handler for adding to a goal's saved amount, responds with the updated goal.
pub async fn add_savings_endpoint(
    State(state): State<GoalState>,
    Extension(user_id): Extension<UserID>,
    Path(goal_id): Path<GoalId>,
    Form(form): Form<SavingsForm>,
) -> Response {
    let amount = match parse_amount(&form.amount, GOAL_MAX_DIGITS) {
        Ok(amount) => amount,
        Err(error) => return error.into_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match add_savings(user_id, goal_id, amount, &connection) {
        Ok(goal) => Json(goal).into_response(),
        Err(error) => {
            tracing::warn!("could not add savings to goal {goal_id}: {error}");
            error.into_response()
        }
    }
}

/// A route handler for editing one of the requesting user's goals, responds with the updated goal.
pub async fn update_goal_endpoint(
    State(state): State<GoalState>,
    Extension(user_id): Extension<UserID>,
    Path(goal_id): Path<GoalId>,
    Form(form): Form<EditGoalForm>,
) -> Response {
    let (goal, saved) = match form.validate() {
        Ok(validated) => validated,
        Err(error) => return error.into_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match update_goal(user_id, goal_id, goal, saved, &connection) {
        Ok(goal) => Json(goal).into_response(),
        Err(error @ Error::UpdateMissingGoal) => error.into_response(),
        Err(error) => {
            tracing::error!("could not update goal {goal_id}: {error}");
            error.into_response()
        }
    }
}

/// A route handler for deleting one of the requesting user's goals, responds with an alert.
pub async fn delete_goal_endpoint(
    State(state): State<GoalState>,
    Extension(user_id): Extension<UserID>,
    Path(goal_id): Path<GoalId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match delete_goal(user_id, goal_id, &connection) {
        Ok(0) => Error::DeleteMissingGoal.into_response(),
        Ok(_) => Alert::success_simple("Goal deleted").into_response(),
        Err(error) => {
            tracing::error!("could not delete goal {goal_id}: {error}");
            error.into_response()
        }
    }
}

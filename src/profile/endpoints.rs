//! Endpoints for reading and updating the requesting user's profile.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{
    AppState, Error,
    money::{LIFETIME_BUDGET_MAX_DIGITS, MONTHLY_BUDGET_MAX_DIGITS, parse_amount},
    profile::core::{UserProfile, get_or_create_profile, update_profile_bio, update_profile_budgets},
    user::UserID,
    validation::optional_text,
};

const BIO_MAX_LENGTH: usize = 500;

/// The state needed to read or update a profile.
#[derive(Debug, Clone)]
pub struct ProfileState {
    /// The database connection for managing profiles.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ProfileState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for updating a profile.
///
/// Amounts are taken as text so that bad input can be reported as a
/// validation error instead of a rejected request.
#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    pub monthly_budget: String,
    pub lifetime_budget: String,
    /// Left unchanged when missing.
    #[serde(default)]
    pub bio: Option<String>,
}

struct ProfileUpdate {
    monthly_budget: Decimal,
    lifetime_budget: Decimal,
    bio: Option<String>,
}

impl ProfileForm {
    fn validate(self) -> Result<ProfileUpdate, Error> {
        let bio = match self.bio {
            Some(bio) => Some(optional_text("bio", &bio, BIO_MAX_LENGTH)?),
            None => None,
        };

        Ok(ProfileUpdate {
            monthly_budget: parse_amount(&self.monthly_budget, MONTHLY_BUDGET_MAX_DIGITS)?,
            lifetime_budget: parse_amount(&self.lifetime_budget, LIFETIME_BUDGET_MAX_DIGITS)?,
            bio,
        })
    }
}

fn update_profile(
    user_id: UserID,
    update: ProfileUpdate,
    connection: &Connection,
) -> Result<UserProfile, Error> {
    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    let mut profile = update_profile_budgets(
        user_id,
        update.monthly_budget,
        update.lifetime_budget,
        &transaction,
    )?;

    if let Some(bio) = update.bio {
        profile = update_profile_bio(user_id, &bio, &transaction)?;
    }

    transaction.commit()?;

    Ok(profile)
}

/// A route handler that responds with the requesting user's profile.
pub async fn get_profile_endpoint(
    State(state): State<ProfileState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match get_or_create_profile(user_id, &connection) {
        Ok(profile) => Json(profile).into_response(),
        Err(error) => {
            tracing::error!("could not get profile for user {user_id}: {error}");
            error.into_response()
        }
    }
}

/// A route handler for setting the requesting user's budgets and bio.
pub async fn update_profile_endpoint(
    State(state): State<ProfileState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<ProfileForm>,
) -> Response {
    let update = match form.validate() {
        Ok(update) => update,
        Err(error) => return error.into_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match update_profile(user_id, update, &connection) {
        Ok(profile) => Json(profile).into_response(),
        Err(error) => {
            tracing::error!("could not update profile for user {user_id}: {error}");
            error.into_response()
        }
    }
}

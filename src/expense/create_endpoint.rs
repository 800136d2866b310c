use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    AppState, Error,
    expense::core::{ExpenseCategory, NewExpense, create_expense},
    money::{AMOUNT_MAX_DIGITS, parse_amount},
    user::UserID,
    validation::required_text,
};

const DESCRIPTION_MAX_LENGTH: usize = 200;

/// The state needed for creating an expense.
#[derive(Debug, Clone)]
pub struct CreateExpenseState {
    /// The database connection for managing expenses.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for creating an expense.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseForm {
    pub description: String,
    pub category: ExpenseCategory,
    pub amount: String,
    pub date: Date,
}

impl ExpenseForm {
    fn validate(self) -> Result<NewExpense, Error> {
        Ok(NewExpense {
            description: required_text("description", &self.description, DESCRIPTION_MAX_LENGTH)?,
            category: self.category,
            amount: parse_amount(&self.amount, AMOUNT_MAX_DIGITS)?,
            date: self.date,
        })
    }
}

/// A route handler for recording an expense, responds with the saved expense.
pub async fn create_expense_endpoint(
    State(state): State<CreateExpenseState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<ExpenseForm>,
) -> Response {
    let new_expense = match form.validate() {
        Ok(new_expense) => new_expense,
        Err(error) => return error.into_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match create_expense(user_id, new_expense, &connection) {
        Ok(expense) => (StatusCode::CREATED, Json(expense)).into_response(),
        Err(error) => {
            tracing::error!("could not create expense for user {user_id}: {error}");
            error.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use axum_extra::extract::Form;
    use rust_decimal::Decimal;
    use time::macros::date;

    use crate::{
        expense::{
            core::{ExpenseCategory, query_expenses},
            create_endpoint::{CreateExpenseState, ExpenseForm, create_expense_endpoint},
        },
        test_utils::{get_test_connection, insert_test_user, parse_alert, parse_json},
    };

    fn form(description: &str, amount: &str) -> ExpenseForm {
        ExpenseForm {
            description: description.to_owned(),
            category: ExpenseCategory::Food,
            amount: amount.to_owned(),
            date: date!(2025 - 03 - 14),
        }
    }

    #[tokio::test]
    async fn can_create_expense() {
        let conn = get_test_connection();
        let user = insert_test_user(&conn, "alice");
        let state = CreateExpenseState {
            db_connection: Arc::new(Mutex::new(conn)),
        };

        let response = create_expense_endpoint(
            State(state.clone()),
            Extension(user.id),
            Form(form("  lunch ", "12.5")),
        )
        .await;

        assert_eq!(response.status(), StatusCode::CREATED);
        let json = parse_json(response).await;
        assert_eq!(json["description"], "lunch");
        assert_eq!(json["category"], "Food");
        assert_eq!(json["amount"], "12.50");
        assert_eq!(json["date"], "2025-03-14");

        let connection = state.db_connection.lock().unwrap();
        let expenses = query_expenses(user.id, None, &connection).unwrap();
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0].amount, Decimal::new(1250, 2));
    }

    #[tokio::test]
    async fn rejects_negative_amount() {
        let conn = get_test_connection();
        let user = insert_test_user(&conn, "alice");
        let state = CreateExpenseState {
            db_connection: Arc::new(Mutex::new(conn)),
        };

        let response = create_expense_endpoint(
            State(state.clone()),
            Extension(user.id),
            Form(form("refund", "-5")),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let alert = parse_alert(response).await;
        assert_eq!(alert["message"], "Invalid input");

        let connection = state.db_connection.lock().unwrap();
        assert!(query_expenses(user.id, None, &connection).unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejects_blank_description() {
        let conn = get_test_connection();
        let user = insert_test_user(&conn, "alice");
        let state = CreateExpenseState {
            db_connection: Arc::new(Mutex::new(conn)),
        };

        let response =
            create_expense_endpoint(State(state), Extension(user.id), Form(form("   ", "5"))).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let alert = parse_alert(response).await;
        assert_eq!(alert["details"], "Description cannot be empty");
    }
}

//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router, middleware,
    response::{IntoResponse, Redirect, Response},
    routing::{delete, get, post, put},
};

use crate::{
    AppState, Error,
    budget::{create_budget_endpoint, delete_budget_endpoint, list_budgets_endpoint},
    endpoints,
    expense::{create_expense_endpoint, delete_expense_endpoint, list_expenses_endpoint},
    goal::{
        add_savings_endpoint, create_goal_endpoint, delete_goal_endpoint, list_goals_endpoint,
        update_goal_endpoint,
    },
    identity::require_user,
    income::{create_income_endpoint, delete_income_endpoint, list_incomes_endpoint},
    profile::{get_profile_endpoint, update_profile_endpoint},
    register_user::register_user_endpoint,
    summary::{get_goals_overview_endpoint, get_summary_endpoint},
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::USERS, post(register_user_endpoint));

    let protected_routes = Router::new()
        .route(endpoints::SUMMARY, get(get_summary_endpoint))
        .route(endpoints::GOALS_OVERVIEW, get(get_goals_overview_endpoint))
        .route(
            endpoints::PROFILE,
            get(get_profile_endpoint).put(update_profile_endpoint),
        )
        .route(
            endpoints::EXPENSES,
            get(list_expenses_endpoint).post(create_expense_endpoint),
        )
        .route(endpoints::DELETE_EXPENSE, delete(delete_expense_endpoint))
        .route(
            endpoints::INCOMES,
            get(list_incomes_endpoint).post(create_income_endpoint),
        )
        .route(endpoints::DELETE_INCOME, delete(delete_income_endpoint))
        .route(
            endpoints::BUDGETS,
            get(list_budgets_endpoint).post(create_budget_endpoint),
        )
        .route(endpoints::DELETE_BUDGET, delete(delete_budget_endpoint))
        .route(
            endpoints::GOALS,
            get(list_goals_endpoint).post(create_goal_endpoint),
        )
        .route(
            endpoints::GOAL,
            put(update_goal_endpoint).delete(delete_goal_endpoint),
        )
        .route(endpoints::GOAL_SAVINGS, post(add_savings_endpoint))
        .layer(middleware::from_fn_with_state(state.clone(), require_user));

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the dashboard summary.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::SUMMARY)
}

async fn get_404_not_found() -> Response {
    Error::NotFound.into_response()
}

#[cfg(test)]
mod root_route_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::{endpoints, routing::get_index_page};

    #[tokio::test]
    async fn root_redirects_to_summary() {
        let response = get_index_page().await.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let location = response.headers().get("location").unwrap();
        assert_eq!(location, endpoints::SUMMARY);
    }
}

#[cfg(test)]
mod router_tests {
    use std::sync::{Arc, Mutex};

    use axum::http::StatusCode;
    use axum_test::TestServer;
    use rust_decimal::Decimal;
    use time::macros::date;

    use crate::{
        AppState,
        endpoints::{self, format_endpoint},
        expense::{ExpenseCategory, NewExpense, create_expense},
        identity::AUTHENTICATED_USER_HEADER,
        routing::build_router,
        test_utils::{get_test_connection, insert_test_user},
        user::UserID,
    };

    fn get_test_server() -> (TestServer, UserID, UserID, i64) {
        let conn = get_test_connection();
        let alice = insert_test_user(&conn, "alice").id;
        let bob = insert_test_user(&conn, "bob").id;
        let expense = create_expense(
            alice,
            NewExpense {
                description: "groceries".to_owned(),
                category: ExpenseCategory::Food,
                amount: Decimal::from(30),
                date: date!(2025 - 03 - 14),
            },
            &conn,
        )
        .unwrap();
        let state = AppState {
            db_connection: Arc::new(Mutex::new(conn)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        (
            TestServer::try_new(build_router(state)).expect("Could not create test server."),
            alice,
            bob,
            expense.id,
        )
    }

    #[tokio::test]
    async fn protected_routes_need_identity() {
        let (server, _, _, _) = get_test_server();

        server
            .get(endpoints::SUMMARY)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        server
            .get(endpoints::EXPENSES)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn summary_is_served_for_known_user() {
        let (server, alice, _, _) = get_test_server();

        let response = server
            .get(endpoints::SUMMARY)
            .add_query_param("date", "2025-03-20")
            .add_header(AUTHENTICATED_USER_HEADER, alice.to_string())
            .await;

        response.assert_status_ok();
        let json = response.json::<serde_json::Value>();
        assert_eq!(json["monthly"]["spent"], "30.00");
        assert_eq!(json["lifetime"]["spent"], "30.00");
    }

    #[tokio::test]
    async fn goals_overview_is_not_shadowed_by_goal_routes() {
        let (server, alice, _, _) = get_test_server();

        let response = server
            .get(endpoints::GOALS_OVERVIEW)
            .add_header(AUTHENTICATED_USER_HEADER, alice.to_string())
            .await;

        response.assert_status_ok();
        assert_eq!(response.json::<serde_json::Value>()["goal_count"], 0);
    }

    #[tokio::test]
    async fn goals_can_be_edited() {
        let (server, alice, bob, _) = get_test_server();
        let goal = server
            .post(endpoints::GOALS)
            .add_header(AUTHENTICATED_USER_HEADER, alice.to_string())
            .form(&vec![("name", "Holiday"), ("target", "1000")])
            .await
            .json::<serde_json::Value>();
        let path = format_endpoint(endpoints::GOAL, goal["id"].as_i64().unwrap());
        let edit = vec![
            ("name", "Japan"),
            ("target", "4000"),
            ("saved", "250.5"),
        ];

        server
            .put(&path)
            .add_header(AUTHENTICATED_USER_HEADER, bob.to_string())
            .form(&edit)
            .await
            .assert_status_not_found();

        let response = server
            .put(&path)
            .add_header(AUTHENTICATED_USER_HEADER, alice.to_string())
            .form(&edit)
            .await;

        response.assert_status_ok();
        let json = response.json::<serde_json::Value>();
        assert_eq!(json["name"], "Japan");
        assert_eq!(json["saved"], "250.50");
    }

    #[tokio::test]
    async fn deleting_another_users_expense_changes_nothing() {
        let (server, alice, bob, expense_id) = get_test_server();

        server
            .delete(&format_endpoint(endpoints::DELETE_EXPENSE, expense_id))
            .add_header(AUTHENTICATED_USER_HEADER, bob.to_string())
            .await
            .assert_status_not_found();

        let expenses = server
            .get(endpoints::EXPENSES)
            .add_header(AUTHENTICATED_USER_HEADER, alice.to_string())
            .await
            .json::<serde_json::Value>();
        assert_eq!(expenses.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn registration_does_not_need_identity() {
        let (server, _, _, _) = get_test_server();

        let response = server
            .post(endpoints::USERS)
            .form(&[("username", "carol"), ("email", "carol@example.com")])
            .await;

        response.assert_status(StatusCode::CREATED);
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let (server, _, _, _) = get_test_server();

        server.get("/api/nope").await.assert_status_not_found();
    }
}

//! Helpers shared by the unit tests.

use axum::{body::Body, http::Response};
use rusqlite::Connection;

use crate::{
    db::initialize,
    user::{User, create_user},
};

/// An in-memory database with all tables created.
pub(crate) fn get_test_connection() -> Connection {
    let conn = Connection::open_in_memory().expect("Could not open in-memory SQLite database");
    initialize(&conn).expect("Could not initialize database");
    conn
}

#[track_caller]
pub(crate) fn insert_test_user(connection: &Connection, username: &str) -> User {
    create_user(username, &format!("{username}@example.com"), connection)
        .expect("Could not create test user")
}

pub(crate) async fn parse_json(response: Response<Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Could not read response body");

    serde_json::from_slice(&body).expect("Response body is not valid JSON")
}

/// Parse an [crate::alert::Alert] response body.
pub(crate) async fn parse_alert(response: Response<Body>) -> serde_json::Value {
    let json = parse_json(response).await;
    assert!(
        json.get("kind").is_some(),
        "want an alert with a \"kind\" field, got {json}"
    );
    json
}

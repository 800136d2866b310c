//! Middleware that identifies the requesting user from the header set by the
//! authenticating proxy.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    user::{UserID, get_user_by_id},
};

/// The header the authenticating proxy uses to pass on the user's ID.
///
/// Requests must only reach this service through the proxy, which strips any
/// copy of this header sent by the client.
pub const AUTHENTICATED_USER_HEADER: &str = "x-authenticated-user";

/// The state needed for the identity middleware.
#[derive(Debug, Clone)]
pub struct IdentityState {
    /// The database connection for looking up users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for IdentityState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Middleware function that checks the request names an existing user.
///
/// The user ID is placed into the request extensions and the request executed
/// normally, otherwise a 401 alert is returned.
///
/// **Note**: Route handlers can use the function argument `Extension(user_id): Extension<UserID>` to receive the user ID.
pub async fn require_user(
    State(state): State<IdentityState>,
    mut request: Request,
    next: Next,
) -> Response {
    let user_id = match identify_user(&state, &request) {
        Ok(user_id) => user_id,
        Err(error) => {
            tracing::warn!("rejected request to {}: {error}", request.uri().path());
            return error.into_response();
        }
    };

    request.extensions_mut().insert(user_id);
    next.run(request).await
}

/// Read the user ID header and check that the user exists.
///
/// Kept synchronous so the database lock is released before the request is run.
fn identify_user(state: &IdentityState, request: &Request) -> Result<UserID, Error> {
    let user_id = request
        .headers()
        .get(AUTHENTICATED_USER_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<i64>().ok())
        .map(UserID::new)
        .ok_or(Error::MissingIdentity)?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    match get_user_by_id(user_id, &connection) {
        Ok(_) => Ok(user_id),
        Err(Error::NotFound) => Err(Error::UnknownUser),
        Err(error) => Err(error),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, Router, http::StatusCode, middleware, routing::get};
    use axum_test::TestServer;

    use crate::{
        identity::{AUTHENTICATED_USER_HEADER, IdentityState, require_user},
        test_utils::{get_test_connection, insert_test_user},
        user::UserID,
    };

    async fn echo_user(Extension(user_id): Extension<UserID>) -> String {
        user_id.to_string()
    }

    fn get_test_server() -> (TestServer, UserID) {
        let conn = get_test_connection();
        let user = insert_test_user(&conn, "alice");
        let state = IdentityState {
            db_connection: Arc::new(Mutex::new(conn)),
        };
        let app = Router::new()
            .route("/protected", get(echo_user))
            .layer(middleware::from_fn_with_state(state.clone(), require_user))
            .with_state(state);

        (
            TestServer::try_new(app).expect("Could not create test server."),
            user.id,
        )
    }

    #[tokio::test]
    async fn passes_user_id_to_handler() {
        let (server, user_id) = get_test_server();

        let response = server
            .get("/protected")
            .add_header(AUTHENTICATED_USER_HEADER, user_id.to_string())
            .await;

        response.assert_status_ok();
        response.assert_text(user_id.to_string());
    }

    #[tokio::test]
    async fn missing_header_is_unauthorized() {
        let (server, _) = get_test_server();

        let response = server.get("/protected").await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        let json = response.json::<serde_json::Value>();
        assert_eq!(json["message"], "Not logged in");
    }

    #[tokio::test]
    async fn malformed_header_is_unauthorized() {
        let (server, _) = get_test_server();

        let response = server
            .get("/protected")
            .add_header(AUTHENTICATED_USER_HEADER, "alice")
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unknown_user_is_unauthorized() {
        let (server, user_id) = get_test_server();

        let response = server
            .get("/protected")
            .add_header(AUTHENTICATED_USER_HEADER, (user_id.as_i64() + 1).to_string())
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        let json = response.json::<serde_json::Value>();
        assert_eq!(json["message"], "Unknown user");
    }
}

//! Alert messages for reporting success and errors to the presentation layer.
//!
//! Every non-data response (validation failures, missing records, successful
//! deletes) uses the same JSON shape so the client can display it as a toast.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Alert message types for styling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Success,
    Error,
}

/// A message for the user with an optional longer explanation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub message: String,
    pub details: String,
}

impl Alert {
    /// Create a new success alert without details
    pub fn success_simple(message: &str) -> Self {
        Self {
            kind: AlertKind::Success,
            message: message.to_owned(),
            details: String::new(),
        }
    }

    /// Create a new error alert
    pub fn error(message: &str, details: &str) -> Self {
        Self {
            kind: AlertKind::Error,
            message: message.to_owned(),
            details: details.to_owned(),
        }
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        let status = match self.kind {
            AlertKind::Success => StatusCode::OK,
            AlertKind::Error => StatusCode::INTERNAL_SERVER_ERROR,
        };

        render(status, self)
    }
}

#[inline]
pub fn render(status_code: StatusCode, alert: Alert) -> Response {
    (status_code, Json(alert)).into_response()
}

//! Defines the endpoint that receives pending transactions from the
//! card-alert feed.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::json;

use crate::{
    AppState, Error,
    timezone::get_local_offset,
    transaction::{TransactionType, parse_form_date_time},
};

use super::core::create_notification;

/// The state needed to ingest a notification.
#[derive(Debug, Clone)]
pub struct IngestNotificationState {
    /// The database connection for storing notifications.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Tashkent".
    pub local_timezone: String,
}

impl FromRef<AppState> for IngestNotificationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The JSON payload for a pending transaction from the card-alert feed.
#[derive(Debug, Deserialize)]
pub struct NotificationPayload {
    /// The unsigned magnitude of the transaction in UZS.
    pub amount: f64,
    /// The kind of transaction, e.g. "expense". Uses `type_` because `type`
    /// is a keyword.
    pub type_: TransactionType,
    /// When the transaction happened, minute precision in the server's local
    /// timezone, e.g. "2026-01-31T13:45".
    pub date: String,
    /// Where the transaction happened.
    pub location: Option<String>,
    /// A free-form note.
    pub description: Option<String>,
}

/// A route handler that stores a pending transaction from the alert feed.
///
/// Responds with the ID of the stored notification. Errors are reported as
/// plain text since the caller is a machine, not a browser.
pub async fn ingest_notification_endpoint(
    State(state): State<IngestNotificationState>,
    Json(payload): Json<NotificationPayload>,
) -> Response {
    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("invalid server timezone {}", state.local_timezone),
        )
            .into_response();
    };

    let date = match parse_form_date_time(&payload.date, local_offset) {
        Ok(date) => date,
        Err(error) => return (StatusCode::BAD_REQUEST, error.to_string()).into_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    match create_notification(
        payload.amount,
        payload.type_,
        date,
        payload.location.as_deref().unwrap_or_default(),
        payload.description.as_deref().unwrap_or_default(),
        &connection,
    ) {
        Ok(notification) => (
            StatusCode::CREATED,
            Json(json!({ "id": notification.id })),
        )
            .into_response(),
        Err(error @ Error::NegativeAmount(_)) => {
            (StatusCode::BAD_REQUEST, error.to_string()).into_response()
        }
        Err(error) => {
            tracing::error!("Could not store notification: {error}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

//! Money Trckr is a web app for tracking account balances and spending.
//!
//! This library provides a server that directly serves HTML pages for
//! managing accounts, confirmed transactions (history) and pending
//! transactions (notifications), plus an overview dashboard.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use time::Date;
use tokio::signal;

mod account;
mod alert;
mod app_state;
mod auth;
mod dashboard;
mod database_id;
mod db;
mod endpoints;
mod format;
mod html;
mod internal_server_error;
mod logging;
mod navigation;
mod not_found;
mod notification;
mod pagination;
mod routing;
mod timezone;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use auth::{
    PasswordHash, User, UserId, ValidatedPassword, create_user, get_user_by_email, get_user_by_id,
    update_user_password,
};
pub use db::initialize as initialize_db;
pub use logging::logging_middleware;
pub use pagination::PaginationConfig;
pub use routing::build_router;

use crate::{
    account::AccountId, alert::Alert, internal_server_error::InternalServerError,
    not_found::get_404_not_found_response, notification::NotificationId,
};

fn render_alert(status_code: StatusCode, alert: Alert) -> Response {
    (status_code, alert).into_response()
}

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user provided an invalid email and password combination.
    #[error("incorrect email or password")]
    InvalidCredentials,

    /// The auth cookie is missing from the cookie jar in the request.
    #[error("no auth cookie in the cookie jar")]
    CookieMissing,

    /// There was an error parsing or formatting the expiry date in the auth
    /// token.
    ///
    /// Callers should pass in the original error as a string and the date
    /// string that caused the error.
    #[error("could not handle token expiry date-time string \"{1}\": {0}")]
    InvalidDateFormat(String, String),

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The email used to sign up already belongs to a registered user.
    #[error("the email address is already registered")]
    DuplicateEmail,

    /// The specified account name already exists in the database.
    #[error("the account \"{0}\" already exists in the database")]
    DuplicateAccountName(String),

    /// An account was given an empty name.
    #[error("account names must not be empty")]
    EmptyAccountName,

    /// A transaction was given a negative amount.
    ///
    /// Amounts are unsigned magnitudes, the direction of the money flow is
    /// implied by the transaction type.
    #[error("{0} is a negative amount, amounts must be non-negative")]
    NegativeAmount(f64),

    /// An integer that does not map to a transaction type was supplied.
    #[error("{0} does not correspond to a valid transaction type")]
    InvalidTransactionType(i64),

    /// A date in the future was used to create a transaction.
    ///
    /// Transactions record events that have already happened, therefore future
    /// dates are not allowed.
    #[error("{0} is a date in the future, which is not allowed")]
    FutureDate(Date),

    /// The account ID used for a transaction did not match a valid account.
    #[error("the account ID does not refer to a valid account")]
    InvalidAccount(Option<AccountId>),

    /// A string that does not name an account icon was supplied.
    #[error("{0} is not a valid account icon")]
    InvalidAccountIcon(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezone(String),

    /// An error occurred while serializing a struct as JSON.
    #[error("could not serialize as JSON: {0}")]
    JsonSerializationError(String),

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Tried to delete an account that does not exist.
    #[error("tried to delete an account that is not in the database")]
    DeleteMissingAccount,

    /// Tried to update an account that does not exist.
    #[error("tried to update an account that is not in the database")]
    UpdateMissingAccount,

    /// Tried to update a history record that does not exist.
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// Tried to process a notification that does not exist.
    ///
    /// This is also returned when a notification has already been processed,
    /// which makes processing idempotent: a repeated submission cannot apply
    /// the same balance change twice.
    #[error("the notification does not exist or has already been processed")]
    MissingNotification(NotificationId),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 787 occurs when a FOREIGN KEY constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(_)) if sql_error.extended_code == 787 => {
                Error::InvalidAccount(None)
            }
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::InvalidTimezone(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to a valid, canonical timezone string."
                ),
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Convert the error into an alert fragment for htmx requests.
    ///
    /// Pages swap the alert into the fixed alert container rather than
    /// replacing the page, so the UI stays usable after a failed mutation.
    pub(crate) fn into_alert_response(self) -> Response {
        match self {
            Error::InvalidTimezone(timezone) => render_alert(
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::error(
                    "Invalid Timezone Settings",
                    &format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings \
                        and ensure the timezone has been set to a valid, canonical timezone string."
                    ),
                ),
            ),
            Error::FutureDate(date) => render_alert(
                StatusCode::BAD_REQUEST,
                Alert::error(
                    "Invalid transaction date",
                    &format!("{date} is a date in the future, which is not allowed."),
                ),
            ),
            Error::NegativeAmount(amount) => render_alert(
                StatusCode::BAD_REQUEST,
                Alert::error(
                    "Invalid amount",
                    &format!(
                        "{amount} is negative. Enter the amount as a positive number, the \
                        transaction type decides whether it is added or subtracted."
                    ),
                ),
            ),
            Error::InvalidTransactionType(raw_type) => render_alert(
                StatusCode::BAD_REQUEST,
                Alert::error(
                    "Invalid transaction type",
                    &format!("{raw_type} is not a valid transaction type."),
                ),
            ),
            Error::InvalidAccount(account_id) => {
                let details = match account_id {
                    Some(account_id) => format!(
                        "Could not find an account with the ID {account_id}. Select one of the \
                        listed accounts."
                    ),
                    None => "The selected account could not be found. Select one of the listed \
                        accounts."
                        .to_owned(),
                };

                render_alert(
                    StatusCode::BAD_REQUEST,
                    Alert::error("Invalid account", &details),
                )
            }
            Error::UpdateMissingAccount => render_alert(
                StatusCode::NOT_FOUND,
                Alert::error("Could not update account", "The account could not be found."),
            ),
            Error::DeleteMissingAccount => render_alert(
                StatusCode::NOT_FOUND,
                Alert::error(
                    "Could not delete account",
                    "The account could not be found. \
                    Try refreshing the page to see if the account has already been deleted.",
                ),
            ),
            Error::UpdateMissingTransaction => render_alert(
                StatusCode::NOT_FOUND,
                Alert::error(
                    "Could not update transaction",
                    "The transaction could not be found.",
                ),
            ),
            Error::MissingNotification(notification_id) => render_alert(
                StatusCode::NOT_FOUND,
                Alert::error(
                    "Could not process notification",
                    &format!(
                        "The notification {notification_id} does not exist or has already been \
                        processed. Refresh the dashboard to see the current pending list."
                    ),
                ),
            ),
            Error::EmptyAccountName => render_alert(
                StatusCode::BAD_REQUEST,
                Alert::error("Invalid account name", "Enter a non-empty account name."),
            ),
            Error::InvalidAccountIcon(raw_icon) => render_alert(
                StatusCode::BAD_REQUEST,
                Alert::error(
                    "Invalid account icon",
                    &format!("{raw_icon} is not a valid account icon."),
                ),
            ),
            Error::InvalidCredentials => render_alert(
                StatusCode::UNAUTHORIZED,
                Alert::error(
                    "Incorrect password",
                    "The current password you entered is not correct.",
                ),
            ),
            Error::TooWeak(details) => render_alert(
                StatusCode::UNPROCESSABLE_ENTITY,
                Alert::error("Could not change password", &details),
            ),
            Error::DuplicateAccountName(name) => render_alert(
                StatusCode::BAD_REQUEST,
                Alert::error(
                    "Duplicate Account Name",
                    &format!(
                        "The account {name} already exists in the database. \
                        Choose a different account name, or edit or delete the existing account.",
                    ),
                ),
            ),
            _ => render_alert(
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::error(
                    "Something went wrong",
                    "An unexpected error occurred, check the server logs for more details.",
                ),
            ),
        }
    }
}

#[cfg(test)]
mod alert_response_tests {
    use crate::{Error, test_utils::parse_html_fragment};

    #[tokio::test]
    async fn invalid_account_alert_shows_the_bare_id() {
        let response = Error::InvalidAccount(Some(42)).into_alert_response();

        let document = parse_html_fragment(response).await;
        let text = document.root_element().text().collect::<String>();

        assert!(
            text.contains("Could not find an account with the ID 42."),
            "unexpected alert text: {text}"
        );
    }

    #[tokio::test]
    async fn invalid_account_alert_handles_an_unknown_id() {
        let response = Error::InvalidAccount(None).into_alert_response();

        let document = parse_html_fragment(response).await;
        let text = document.root_element().text().collect::<String>();

        assert!(
            !text.contains("None"),
            "alert text should not leak the debug form: {text}"
        );
    }
}

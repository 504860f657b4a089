//! Defines the endpoint that turns a pending notification into a history row.
//!
//! Processing deletes the notification, inserts the history row and applies
//! the signed amount to the chosen account's balance in one database
//! transaction. Deleting zero rows aborts the whole operation, so submitting
//! the same notification twice cannot apply the balance change twice.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::{Connection, params};
use time::{OffsetDateTime, UtcOffset};

use crate::{
    AppState, Error,
    endpoints,
    timezone::get_local_offset,
    transaction::{Transaction, TransactionForm, parse_form_date_time},
};

use super::core::NotificationId;

/// The state needed to process a notification.
#[derive(Debug, Clone)]
pub struct ProcessNotificationState {
    /// The database connection for processing notifications.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Tashkent".
    pub local_timezone: String,
}

impl FromRef<AppState> for ProcessNotificationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// A route handler for confirming a pending notification, redirects to the
/// dashboard on success.
pub async fn process_notification_endpoint(
    State(state): State<ProcessNotificationState>,
    Path(notification_id): Path<NotificationId>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        return Error::InvalidTimezone(state.local_timezone).into_alert_response();
    };

    let mut connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match process_transaction(notification_id, &form, local_offset, &mut connection) {
        Ok(_) => (
            HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Could not process notification {notification_id}: {error}");
            error.into_alert_response()
        }
    }
}

/// Turn a pending notification into a history row.
///
/// Deletes the notification, appends the history row with the user-edited
/// fields and applies the signed amount to the chosen account. All three
/// writes happen in one database transaction, if any fails none are applied.
///
/// # Errors
/// This function will return a:
/// - [Error::NegativeAmount] if the amount is negative,
/// - [Error::InvalidDateFormat] if the date is not a valid `datetime-local` value,
/// - [Error::FutureDate] if the date is in the future,
/// - [Error::MissingNotification] if the notification does not exist or has
///   already been processed,
/// - [Error::InvalidAccount] if the account does not exist,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn process_transaction(
    notification_id: NotificationId,
    form: &TransactionForm,
    local_offset: UtcOffset,
    connection: &mut Connection,
) -> Result<Transaction, Error> {
    if form.amount < 0.0 {
        return Err(Error::NegativeAmount(form.amount));
    }

    let date = parse_form_date_time(&form.date, local_offset)?;

    if date > OffsetDateTime::now_utc() {
        return Err(Error::FutureDate(date.date()));
    }

    let location = form.location.clone().unwrap_or_default();
    let description = form.description.clone().unwrap_or_default();

    let sql_transaction = connection.transaction()?;

    let deleted_rows = sql_transaction.execute(
        "DELETE FROM notification WHERE id = ?1",
        params![notification_id],
    )?;

    if deleted_rows == 0 {
        // Already processed or never existed. Dropping the transaction
        // without committing discards the delete.
        return Err(Error::MissingNotification(notification_id));
    }

    sql_transaction
        .execute(
            "INSERT INTO history (account_id, amount, transaction_type, date, location, description)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                form.account_id,
                form.amount,
                form.type_,
                date,
                location,
                description
            ],
        )
        .map_err(|error| match error {
            // Code 787 occurs when a FOREIGN KEY constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(_)) if sql_error.extended_code == 787 => {
                Error::InvalidAccount(Some(form.account_id))
            }
            error => error.into(),
        })?;

    let transaction = Transaction {
        id: sql_transaction.last_insert_rowid(),
        account_id: form.account_id,
        amount: form.amount,
        transaction_type: form.type_,
        date,
        location,
        description,
    };

    let rows_affected = sql_transaction.execute(
        "UPDATE account SET balance = balance + ?1 WHERE id = ?2",
        params![transaction.signed_amount(), form.account_id],
    )?;

    if rows_affected == 0 {
        return Err(Error::InvalidAccount(Some(form.account_id)));
    }

    sql_transaction.commit()?;

    Ok(transaction)
}

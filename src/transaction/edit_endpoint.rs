//! Defines the endpoint for editing a history row.
//!
//! Editing only rewrites the history row. Account balances are not
//! recomputed, the recorded balance change has already happened.

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
    transaction::{
        core::{TransactionId, parse_form_date_time},
        create_endpoint::TransactionForm,
    },
};

/// The state needed to edit a history row.
#[derive(Debug, Clone)]
pub struct EditTransactionState {
    /// The database connection for updating transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Tashkent".
    pub local_timezone: String,
}

impl FromRef<AppState> for EditTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// A route handler for updating a history row, redirects to the history page
/// on success.
pub async fn edit_transaction_endpoint(
    State(state): State<EditTransactionState>,
    Path(transaction_id): Path<TransactionId>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        return Error::InvalidTimezone(state.local_timezone).into_alert_response();
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_transaction(transaction_id, &form, local_offset, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::HISTORY_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Could not update transaction {transaction_id}: {error}");
            error.into_alert_response()
        }
    }
}

/// Update the fields of a history row.
///
/// # Errors
/// This function will return a:
/// - [Error::NegativeAmount] if the amount is negative,
/// - [Error::InvalidDateFormat] if the date is not a valid `datetime-local` value,
/// - [Error::FutureDate] if the date is in the future,
/// - [Error::InvalidAccount] if the account does not exist,
/// - [Error::UpdateMissingTransaction] if `transaction_id` does not refer to a
///   history row,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_transaction(
    transaction_id: TransactionId,
    form: &TransactionForm,
    local_offset: UtcOffset,
    connection: &Connection,
) -> Result<(), Error> {
    if form.amount < 0.0 {
        return Err(Error::NegativeAmount(form.amount));
    }

    let date = parse_form_date_time(&form.date, local_offset)?;

    if date > OffsetDateTime::now_utc() {
        return Err(Error::FutureDate(date.date()));
    }

    let location = form.location.as_deref().unwrap_or_default();
    let description = form.description.as_deref().unwrap_or_default();

    let rows_affected = connection
        .execute(
            "UPDATE history SET account_id = ?1, amount = ?2, transaction_type = ?3, date = ?4, \
            location = ?5, description = ?6 WHERE id = ?7",
            params![
                form.account_id,
                form.amount,
                form.type_,
                date,
                location,
                description,
                transaction_id
            ],
        )
        .map_err(|error| match error {
            // Code 787 occurs when a FOREIGN KEY constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(_)) if sql_error.extended_code == 787 => {
                Error::InvalidAccount(Some(form.account_id))
            }
            error => error.into(),
        })?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingTransaction);
    }

    Ok(())
}

#[cfg(test)]
mod update_transaction_tests {
    use rusqlite::Connection;
    use time::{Duration, OffsetDateTime, UtcOffset};

    use crate::{
        Error,
        account::get_account,
        db::initialize,
        transaction::core::{
            TransactionType, format_form_date_time, get_transaction,
            test_utils::{create_test_account, insert_test_transaction},
        },
    };

    use super::{TransactionForm, update_transaction};

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    #[test]
    fn updates_fields_without_touching_balance() {
        let conn = get_test_connection();
        let account_id = create_test_account("card", 1_000.0, &conn);
        let transaction = insert_test_transaction(
            account_id,
            10.0,
            TransactionType::Expense,
            OffsetDateTime::now_utc() - Duration::days(1),
            &conn,
        );
        let new_date = OffsetDateTime::now_utc() - Duration::days(2);
        let form = TransactionForm {
            account_id,
            type_: TransactionType::Withdrawal,
            amount: 99.0,
            date: format_form_date_time(new_date),
            location: Some("ATM".to_owned()),
            description: Some("cash".to_owned()),
        };

        update_transaction(transaction.id, &form, UtcOffset::UTC, &conn).unwrap();

        let got = get_transaction(transaction.id, &conn).unwrap();
        assert_eq!(got.amount, 99.0);
        assert_eq!(got.transaction_type, TransactionType::Withdrawal);
        assert_eq!(got.location, "ATM");
        assert_eq!(got.description, "cash");
        // Balances record what already happened, so an edit leaves them alone.
        assert_eq!(get_account(account_id, &conn).unwrap().balance, 1_000.0);
    }

    #[test]
    fn missing_transaction_is_an_error() {
        let conn = get_test_connection();
        let account_id = create_test_account("card", 1_000.0, &conn);
        let form = TransactionForm {
            account_id,
            type_: TransactionType::Expense,
            amount: 1.0,
            date: format_form_date_time(OffsetDateTime::now_utc() - Duration::days(1)),
            location: None,
            description: None,
        };

        let got = update_transaction(42, &form, UtcOffset::UTC, &conn);

        assert_eq!(got, Err(Error::UpdateMissingTransaction));
    }

    #[test]
    fn unknown_account_is_rejected() {
        let conn = get_test_connection();
        let account_id = create_test_account("card", 1_000.0, &conn);
        let transaction = insert_test_transaction(
            account_id,
            10.0,
            TransactionType::Expense,
            OffsetDateTime::now_utc() - Duration::days(1),
            &conn,
        );
        let form = TransactionForm {
            account_id: 42,
            type_: TransactionType::Expense,
            amount: 10.0,
            date: format_form_date_time(transaction.date),
            location: None,
            description: None,
        };

        let got = update_transaction(transaction.id, &form, UtcOffset::UTC, &conn);

        assert_eq!(got, Err(Error::InvalidAccount(Some(42))));
    }
}

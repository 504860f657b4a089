//! Defines the endpoint for recording a new transaction.
//!
//! Recording a transaction appends a history row and applies the signed
//! amount to the account balance in a single database transaction, so the
//! history and the balances can never drift apart.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::{Connection, params};
use serde::Deserialize;
use time::{OffsetDateTime, UtcOffset};

use crate::{
    AppState, Error,
    account::AccountId,
    endpoints,
    timezone::get_local_offset,
    transaction::core::{Transaction, TransactionType, parse_form_date_time},
};

/// The state needed to record a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for recording transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Tashkent".
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The form data for recording a transaction.
#[derive(Debug, Deserialize)]
pub struct TransactionForm {
    /// The account the transaction applies to.
    pub account_id: AccountId,
    /// The kind of transaction. Uses `type_` because `type` is a keyword.
    pub type_: TransactionType,
    /// The unsigned magnitude of the transaction in UZS.
    pub amount: f64,
    /// The `datetime-local` form value for when the transaction happened.
    pub date: String,
    /// Where the transaction happened.
    pub location: Option<String>,
    /// A free-form note.
    pub description: Option<String>,
}

/// A route handler for recording a new transaction, redirects to the history
/// page on success.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
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

    match create_transaction(&form, local_offset, &mut connection) {
        Ok(_) => (
            HxRedirect(endpoints::HISTORY_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Could not record transaction with {form:?}: {error}");
            error.into_alert_response()
        }
    }
}

/// Append a history row and apply the signed amount to the account balance.
///
/// Both writes happen in one database transaction. If either fails, neither
/// is applied.
///
/// # Errors
/// This function will return a:
/// - [Error::NegativeAmount] if the amount is negative,
/// - [Error::InvalidDateFormat] if the date is not a valid `datetime-local` value,
/// - [Error::FutureDate] if the date is in the future,
/// - [Error::InvalidAccount] if the account does not exist,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
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

    let id = sql_transaction.last_insert_rowid();

    let transaction = Transaction {
        id,
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
        // Dropping the transaction without committing rolls back the insert.
        return Err(Error::InvalidAccount(Some(form.account_id)));
    }

    sql_transaction.commit()?;

    Ok(transaction)
}

#[cfg(test)]
mod create_transaction_tests {
    use rusqlite::Connection;
    use time::{Duration, OffsetDateTime, UtcOffset};

    use crate::{
        Error,
        account::get_account,
        db::initialize,
        transaction::core::{
            TransactionType, format_form_date_time, get_transaction, test_utils::create_test_account,
        },
    };

    use super::{TransactionForm, create_transaction};

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn yesterday_form_value() -> String {
        format_form_date_time(OffsetDateTime::now_utc() - Duration::days(1))
    }

    #[test]
    fn expense_is_recorded_and_subtracted_from_the_balance() {
        let mut conn = get_test_connection();
        let account_id = create_test_account("card", 1_000.0, &conn);
        let form = TransactionForm {
            account_id,
            type_: TransactionType::Expense,
            amount: 250.0,
            date: yesterday_form_value(),
            location: Some("Korzinka".to_owned()),
            description: None,
        };

        let transaction = create_transaction(&form, UtcOffset::UTC, &mut conn).unwrap();

        assert_eq!(transaction.signed_amount(), -250.0);
        assert_eq!(get_transaction(transaction.id, &conn).unwrap(), transaction);
        assert_eq!(get_account(account_id, &conn).unwrap().balance, 750.0);
    }

    #[test]
    fn topup_is_added_to_the_balance() {
        let mut conn = get_test_connection();
        let account_id = create_test_account("card", 1_000.0, &conn);
        let form = TransactionForm {
            account_id,
            type_: TransactionType::Topup,
            amount: 250.0,
            date: yesterday_form_value(),
            location: None,
            description: None,
        };

        create_transaction(&form, UtcOffset::UTC, &mut conn).unwrap();

        assert_eq!(get_account(account_id, &conn).unwrap().balance, 1_250.0);
    }

    #[test]
    fn negative_amount_is_rejected() {
        let mut conn = get_test_connection();
        let account_id = create_test_account("card", 1_000.0, &conn);
        let form = TransactionForm {
            account_id,
            type_: TransactionType::Expense,
            amount: -1.0,
            date: yesterday_form_value(),
            location: None,
            description: None,
        };

        let got = create_transaction(&form, UtcOffset::UTC, &mut conn);

        assert_eq!(got, Err(Error::NegativeAmount(-1.0)));
        assert_eq!(get_account(account_id, &conn).unwrap().balance, 1_000.0);
    }

    #[test]
    fn future_date_is_rejected() {
        let mut conn = get_test_connection();
        let account_id = create_test_account("card", 1_000.0, &conn);
        let tomorrow = OffsetDateTime::now_utc() + Duration::days(1);
        let form = TransactionForm {
            account_id,
            type_: TransactionType::Expense,
            amount: 1.0,
            date: format_form_date_time(tomorrow),
            location: None,
            description: None,
        };

        let got = create_transaction(&form, UtcOffset::UTC, &mut conn);

        assert!(matches!(got, Err(Error::FutureDate(_))));
    }

    #[test]
    fn unknown_account_leaves_history_empty() {
        let mut conn = get_test_connection();
        let form = TransactionForm {
            account_id: 42,
            type_: TransactionType::Expense,
            amount: 1.0,
            date: yesterday_form_value(),
            location: None,
            description: None,
        };

        let got = create_transaction(&form, UtcOffset::UTC, &mut conn);

        assert_eq!(got, Err(Error::InvalidAccount(Some(42))));

        let count: i64 = conn
            .query_row("SELECT COUNT(id) FROM history", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}

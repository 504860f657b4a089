//! Defines the core data models and database queries for the transaction history.

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use time::{
    OffsetDateTime, PrimitiveDateTime, UtcOffset, format_description::BorrowedFormatItem,
    macros::format_description,
};

use crate::{Error, account::AccountId, database_id::DatabaseId};

pub type TransactionId = DatabaseId;

/// The kind of a confirmed or pending transaction.
///
/// Only [TransactionType::Topup] credits an account, every other type debits
/// it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransactionType {
    #[default]
    Expense,
    Withdrawal,
    Transfer,
    Topup,
}

impl TransactionType {
    pub const ALL: [TransactionType; 4] = [
        TransactionType::Expense,
        TransactionType::Withdrawal,
        TransactionType::Transfer,
        TransactionType::Topup,
    ];

    pub fn as_i64(&self) -> i64 {
        match self {
            TransactionType::Expense => 0,
            TransactionType::Withdrawal => 1,
            TransactionType::Transfer => 2,
            TransactionType::Topup => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Expense => "expense",
            TransactionType::Withdrawal => "withdrawal",
            TransactionType::Transfer => "transfer",
            TransactionType::Topup => "topup",
        }
    }

    /// The human readable name for the transaction type.
    pub fn display_name(&self) -> &'static str {
        match self {
            TransactionType::Expense => "Expense",
            TransactionType::Withdrawal => "Withdrawal",
            TransactionType::Transfer => "Transfer",
            TransactionType::Topup => "Topup",
        }
    }

    /// Whether this transaction type adds money to an account.
    pub fn is_credit(&self) -> bool {
        matches!(self, TransactionType::Topup)
    }
}

impl TryFrom<i64> for TransactionType {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(TransactionType::Expense),
            1 => Ok(TransactionType::Withdrawal),
            2 => Ok(TransactionType::Transfer),
            3 => Ok(TransactionType::Topup),
            other => Err(Error::InvalidTransactionType(other)),
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "expense" => Ok(TransactionType::Expense),
            "withdrawal" => Ok(TransactionType::Withdrawal),
            "transfer" => Ok(TransactionType::Transfer),
            "topup" => Ok(TransactionType::Topup),
            _ => Err(Error::InvalidTransactionType(-1)),
        }
    }
}

impl<'de> serde::Deserialize<'de> for TransactionType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_i64()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        TransactionType::try_from(value.as_i64()?)
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// A confirmed transaction in the history.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// The ID of the history row.
    pub id: TransactionId,
    /// The account the transaction was applied to.
    pub account_id: AccountId,
    /// The unsigned magnitude of the transaction in UZS.
    pub amount: f64,
    /// The kind of transaction, which decides the sign of the amount.
    pub transaction_type: TransactionType,
    /// When the transaction happened.
    pub date: OffsetDateTime,
    /// Where the transaction happened, e.g. a merchant name.
    pub location: String,
    /// A free-form note.
    pub description: String,
}

impl Transaction {
    /// The amount with the sign implied by the transaction type applied.
    pub fn signed_amount(&self) -> f64 {
        if self.transaction_type.is_credit() {
            self.amount
        } else {
            -self.amount
        }
    }
}

/// The format for date times submitted by `datetime-local` form inputs,
/// e.g. "2026-01-31T13:45".
const FORM_DATE_TIME_FORMAT: &[BorrowedFormatItem] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]");

/// Parse a `datetime-local` form value into a date time in the given offset.
///
/// # Errors
///
/// Returns [Error::InvalidDateFormat] if the string is not in the expected
/// format.
pub fn parse_form_date_time(raw: &str, local_offset: UtcOffset) -> Result<OffsetDateTime, Error> {
    PrimitiveDateTime::parse(raw, FORM_DATE_TIME_FORMAT)
        .map(|date_time| date_time.assume_offset(local_offset))
        .map_err(|error| Error::InvalidDateFormat(error.to_string(), raw.to_owned()))
}

/// Format a date time as a `datetime-local` form value.
pub fn format_form_date_time(date_time: OffsetDateTime) -> String {
    date_time
        .format(FORM_DATE_TIME_FORMAT)
        .unwrap_or_else(|_| date_time.to_string())
}

/// Create the history table in the database.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                account_id INTEGER NOT NULL REFERENCES account(id),
                amount REAL NOT NULL,
                transaction_type INTEGER NOT NULL,
                date TEXT NOT NULL,
                location TEXT NOT NULL,
                description TEXT NOT NULL
                )",
        (),
    )?;

    // Ensure the sequence starts at 1
    connection.execute(
        "INSERT OR IGNORE INTO sqlite_sequence (name, seq) VALUES ('history', 0)",
        (),
    )?;

    // Index used by the history page and the per-account history.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_history_date ON history(date);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a [Transaction].
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let account_id = row.get(1)?;
    let amount = row.get(2)?;
    let transaction_type = row.get(3)?;
    let date = row.get(4)?;
    let location = row.get(5)?;
    let description = row.get(6)?;

    Ok(Transaction {
        id,
        account_id,
        amount,
        transaction_type,
        date,
        location,
        description,
    })
}

const TRANSACTION_COLUMNS: &str =
    "id, account_id, amount, transaction_type, date, location, description";

/// Retrieve a history row from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM history WHERE id = :id"
        ))?
        .query_one(&[(":id", &id)], map_transaction_row)?;

    Ok(transaction)
}

/// Get the total number of history rows in the database.
pub fn count_transactions(connection: &Connection) -> Result<u64, Error> {
    // COUNT(id) comes back as an SQL integer.
    let count: i64 =
        connection.query_row("SELECT COUNT(id) FROM history;", [], |row| row.get(0))?;

    Ok(count as u64)
}

/// Get one page of the history, newest first.
///
/// `page` is one-based and must already be clamped into the valid range.
pub fn get_transactions_page(
    page: u64,
    page_size: u64,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let offset = (page - 1) * page_size;

    // Sort by date, and then ID to keep the order stable after updates.
    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM history \
            ORDER BY date DESC, id DESC LIMIT ?1 OFFSET ?2"
        ))?
        .query_map([page_size as i64, offset as i64], map_transaction_row)?
        .map(|transaction_result| transaction_result.map_err(Error::from))
        .collect()
}

/// Get the most recent history rows for one account, newest first.
pub fn get_transactions_for_account(
    account_id: AccountId,
    limit: usize,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM history \
            WHERE account_id = ?1 ORDER BY date DESC, id DESC LIMIT ?2"
        ))?
        .query_map((account_id, limit as i64), map_transaction_row)?
        .map(|transaction_result| transaction_result.map_err(Error::from))
        .collect()
}

#[cfg(test)]
mod transaction_type_tests {
    use crate::Error;

    use super::TransactionType;

    #[test]
    fn round_trips_through_integer() {
        for transaction_type in TransactionType::ALL {
            let got = TransactionType::try_from(transaction_type.as_i64()).unwrap();

            assert_eq!(transaction_type, got);
        }
    }

    #[test]
    fn rejects_unknown_integer() {
        let got = TransactionType::try_from(4);

        assert_eq!(got, Err(Error::InvalidTransactionType(4)));
    }

    #[test]
    fn only_topup_is_credit() {
        for transaction_type in TransactionType::ALL {
            assert_eq!(
                transaction_type.is_credit(),
                transaction_type == TransactionType::Topup
            );
        }
    }
}



#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;
    use time::{Duration, OffsetDateTime, macros::datetime};

    use crate::{Error, db::initialize};

    use super::{
        TransactionType, count_transactions, get_transaction, get_transactions_for_account,
        get_transactions_page,
        test_utils::{create_test_account, insert_test_transaction},
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    #[test]
    fn get_transaction_returns_inserted_row() {
        let conn = get_test_connection();
        let account_id = create_test_account("card", 100.0, &conn);
        let want = insert_test_transaction(
            account_id,
            12.3,
            TransactionType::Expense,
            datetime!(2026-01-05 10:30 UTC),
            &conn,
        );

        let got = get_transaction(want.id, &conn).unwrap();

        assert_eq!(want, got);
    }

    #[test]
    fn get_transaction_returns_not_found_for_missing_id() {
        let conn = get_test_connection();

        let got = get_transaction(42, &conn);

        assert_eq!(got, Err(Error::NotFound));
    }

    #[test]
    fn get_count() {
        let conn = get_test_connection();
        let account_id = create_test_account("card", 100.0, &conn);
        let want_count = 20;
        for i in 1..=want_count {
            insert_test_transaction(
                account_id,
                i as f64,
                TransactionType::Expense,
                OffsetDateTime::now_utc(),
                &conn,
            );
        }

        let got_count = count_transactions(&conn).expect("Could not get count");

        assert_eq!(want_count, got_count);
    }

    #[test]
    fn pages_are_newest_first() {
        let conn = get_test_connection();
        let account_id = create_test_account("card", 100.0, &conn);
        let start = datetime!(2026-01-01 12:00 UTC);
        let mut all = Vec::new();
        for i in 0..5 {
            all.push(insert_test_transaction(
                account_id,
                (i + 1) as f64,
                TransactionType::Expense,
                start + Duration::days(i),
                &conn,
            ));
        }
        all.reverse();

        let first_page = get_transactions_page(1, 2, &conn).unwrap();
        let second_page = get_transactions_page(2, 2, &conn).unwrap();
        let last_page = get_transactions_page(3, 2, &conn).unwrap();

        assert_eq!(first_page, all[0..2]);
        assert_eq!(second_page, all[2..4]);
        assert_eq!(last_page, all[4..5]);
    }

    #[test]
    fn account_history_is_filtered_and_limited() {
        let conn = get_test_connection();
        let card = create_test_account("card", 100.0, &conn);
        let wallet = create_test_account("wallet", 50.0, &conn);
        let start = datetime!(2026-01-01 12:00 UTC);
        for i in 0..3 {
            insert_test_transaction(
                card,
                1.0,
                TransactionType::Expense,
                start + Duration::days(i),
                &conn,
            );
        }
        insert_test_transaction(wallet, 2.0, TransactionType::Topup, start, &conn);

        let got = get_transactions_for_account(card, 2, &conn).unwrap();

        assert_eq!(got.len(), 2);
        assert!(got.iter().all(|transaction| transaction.account_id == card));
        assert!(got[0].date > got[1].date);
    }
}

//! Defines the data model and database queries for pending transactions.
//!
//! Notifications come from the inbound card-alert feed. They sit in their own
//! table until the user confirms them, at which point they are turned into a
//! history row and removed.

use rusqlite::{Connection, Row, params};
use time::OffsetDateTime;

use crate::{Error, database_id::DatabaseId, transaction::TransactionType};

pub type NotificationId = DatabaseId;

/// A pending transaction waiting for the user's confirmation.
///
/// A notification has no account, the user picks one when processing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    /// The ID of the notification.
    pub id: NotificationId,
    /// The unsigned magnitude of the transaction in UZS.
    pub amount: f64,
    /// The kind of transaction the alert reported.
    pub transaction_type: TransactionType,
    /// When the underlying transaction happened.
    pub date: OffsetDateTime,
    /// Where the transaction happened.
    pub location: String,
    /// A free-form note from the alert.
    pub description: String,
}

/// Create the notification table in the database.
pub fn create_notification_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS notification (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                amount REAL NOT NULL,
                transaction_type INTEGER NOT NULL,
                date TEXT NOT NULL,
                location TEXT NOT NULL,
                description TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

fn map_notification_row(row: &Row) -> Result<Notification, rusqlite::Error> {
    let id = row.get(0)?;
    let amount = row.get(1)?;
    let transaction_type = row.get(2)?;
    let date = row.get(3)?;
    let location = row.get(4)?;
    let description = row.get(5)?;

    Ok(Notification {
        id,
        amount,
        transaction_type,
        date,
        location,
        description,
    })
}

const NOTIFICATION_COLUMNS: &str = "id, amount, transaction_type, date, location, description";

/// Store a pending transaction from the card-alert feed.
///
/// # Errors
/// This function will return a:
/// - [Error::NegativeAmount] if the amount is negative,
/// - or [Error::SqlError] if there is an SQL error.
pub fn create_notification(
    amount: f64,
    transaction_type: TransactionType,
    date: OffsetDateTime,
    location: &str,
    description: &str,
    connection: &Connection,
) -> Result<Notification, Error> {
    if amount < 0.0 {
        return Err(Error::NegativeAmount(amount));
    }

    connection.execute(
        "INSERT INTO notification (amount, transaction_type, date, location, description)
        VALUES (?1, ?2, ?3, ?4, ?5)",
        params![amount, transaction_type, date, location, description],
    )?;

    Ok(Notification {
        id: connection.last_insert_rowid(),
        amount,
        transaction_type,
        date,
        location: location.to_owned(),
        description: description.to_owned(),
    })
}

/// Retrieve a notification from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a pending notification,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_notification(
    id: NotificationId,
    connection: &Connection,
) -> Result<Notification, Error> {
    let notification = connection
        .prepare(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notification WHERE id = :id"
        ))?
        .query_one(&[(":id", &id)], map_notification_row)?;

    Ok(notification)
}

/// Get all pending notifications, newest first.
pub fn get_all_notifications(connection: &Connection) -> Result<Vec<Notification>, Error> {
    connection
        .prepare(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notification ORDER BY date DESC, id DESC"
        ))?
        .query_map([], map_notification_row)?
        .map(|notification_result| notification_result.map_err(Error::from))
        .collect()
}

//! Database initialization for the application.

use rusqlite::Connection;

use crate::{
    account::create_account_table,
    auth::create_user_table,
    notification::create_notification_table,
    transaction::create_transaction_table,
};

/// Create the application tables in the database.
///
/// Foreign keys are switched on so that history records cannot refer to
/// accounts that do not exist.
///
/// # Errors
/// Returns an error if any of the tables cannot be created or if there is an
/// SQL error.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute("PRAGMA foreign_keys = ON", ())?;

    create_user_table(connection)?;
    create_account_table(connection)?;
    create_transaction_table(connection)?;
    create_notification_table(connection)?;

    Ok(())
}

//! Defines the overview summary and the queries that compute it.

use rusqlite::Connection;

use crate::{Error, account::get_total_account_balance};

/// The headline figures shown at the top of the dashboard.
///
/// Every field is derived from the account and history tables by SQL
/// aggregation, so the summary can never go stale relative to the data it
/// summarizes.
#[derive(Debug, Clone, PartialEq)]
pub struct OverviewSummary {
    /// The sum of all Topup amounts in the history.
    pub income: f64,
    /// The sum of all non-Topup amounts in the history.
    pub expenses: f64,
    /// The sum of all account balances.
    pub total_balance: f64,
    /// The number of history rows.
    pub total_transactions: u64,
}

/// Compute the overview summary from the account and history tables.
pub fn get_overview_summary(connection: &Connection) -> Result<OverviewSummary, Error> {
    // Type 3 is Topup, the only credit type.
    let (income, expenses, total_transactions) = connection.query_row(
        "SELECT
            COALESCE(SUM(CASE WHEN transaction_type = 3 THEN amount ELSE 0 END), 0),
            COALESCE(SUM(CASE WHEN transaction_type != 3 THEN amount ELSE 0 END), 0),
            COUNT(id)
        FROM history",
        [],
        |row| Ok((row.get(0)?, row.get(1)?, row.get::<_, i64>(2)?)),
    )?;

    let total_balance = get_total_account_balance(connection)?;

    Ok(OverviewSummary {
        income,
        expenses,
        total_balance,
        total_transactions: total_transactions as u64,
    })
}

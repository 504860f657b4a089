use rusqlite::{
    Connection,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use time::OffsetDateTime;

use crate::Error;

pub type AccountId = i64;

/// The icon displayed on an account card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccountIcon {
    #[default]
    Card,
    Wallet,
    Cash,
    Savings,
    Bank,
}

impl AccountIcon {
    pub const ALL: [AccountIcon; 5] = [
        AccountIcon::Card,
        AccountIcon::Wallet,
        AccountIcon::Cash,
        AccountIcon::Savings,
        AccountIcon::Bank,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountIcon::Card => "card",
            AccountIcon::Wallet => "wallet",
            AccountIcon::Cash => "cash",
            AccountIcon::Savings => "savings",
            AccountIcon::Bank => "bank",
        }
    }

    /// The human readable name for the icon.
    pub fn display_name(&self) -> &'static str {
        match self {
            AccountIcon::Card => "Card",
            AccountIcon::Wallet => "Wallet",
            AccountIcon::Cash => "Cash",
            AccountIcon::Savings => "Savings",
            AccountIcon::Bank => "Bank",
        }
    }
}

impl std::str::FromStr for AccountIcon {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "card" => Ok(AccountIcon::Card),
            "wallet" => Ok(AccountIcon::Wallet),
            "cash" => Ok(AccountIcon::Cash),
            "savings" => Ok(AccountIcon::Savings),
            "bank" => Ok(AccountIcon::Bank),
            _ => Err(Error::InvalidAccountIcon(s.to_owned())),
        }
    }
}

impl<'de> serde::Deserialize<'de> for AccountIcon {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl ToSql for AccountIcon {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for AccountIcon {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// A place money is kept, e.g. a bank card or a cash wallet.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    /// The id for the account.
    pub id: AccountId,
    /// The display name of the account.
    pub name: String,
    /// The current balance in UZS.
    ///
    /// The balance is denormalized. Mutations to the history must adjust it
    /// in the same SQL transaction.
    pub balance: f64,
    /// The icon shown on the account card.
    pub icon: AccountIcon,
    /// An optional owner label (name, email or phone number).
    pub owner: Option<String>,
    /// When the account was created.
    pub created_at: OffsetDateTime,
}

pub fn create_account_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS account (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            balance REAL NOT NULL,
            icon TEXT NOT NULL,
            owner TEXT,
            created_at TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

pub fn map_row_to_account(row: &rusqlite::Row) -> Result<Account, rusqlite::Error> {
    let id = row.get(0)?;
    let name = row.get(1)?;
    let balance = row.get(2)?;
    let icon = row.get(3)?;
    let owner = row.get(4)?;
    let created_at = row.get(5)?;

    Ok(Account {
        id,
        name,
        balance,
        icon,
        owner,
        created_at,
    })
}

const ACCOUNT_COLUMNS: &str = "id, name, balance, icon, owner, created_at";

/// Get all accounts ordered by creation time.
pub fn get_all_accounts(connection: &Connection) -> Result<Vec<Account>, Error> {
    connection
        .prepare(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM account ORDER BY created_at ASC, id ASC"
        ))?
        .query_map([], map_row_to_account)?
        .map(|account_result| account_result.map_err(Error::from))
        .collect()
}

/// Get a single account by its ID.
///
/// # Errors
///
/// Returns [Error::NotFound] if no account has the given ID.
pub fn get_account(account_id: AccountId, connection: &Connection) -> Result<Account, Error> {
    connection
        .query_one(
            &format!("SELECT {ACCOUNT_COLUMNS} FROM account WHERE id = ?1"),
            [account_id],
            map_row_to_account,
        )
        .map_err(Error::from)
}

/// Get the total balance across all accounts.
///
/// The total is derived from the account table on every call so it cannot go
/// stale relative to the accounts.
pub fn get_total_account_balance(connection: &Connection) -> Result<f64, Error> {
    let mut stmt = connection.prepare("SELECT COALESCE(SUM(balance), 0) FROM account")?;

    let total: f64 = stmt.query_row([], |row| row.get(0))?;

    Ok(total)
}

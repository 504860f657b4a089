//! Defines the endpoint for updating an account.
use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::{Connection, params};
use serde::Deserialize;

use crate::{
    AppState, Error,
    account::core::{AccountIcon, AccountId},
    endpoints::{self, format_endpoint},
};

/// The state needed to edit an account.
#[derive(Debug, Clone)]
pub struct EditAccountState {
    /// The database connection for managing accounts.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditAccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct EditAccountForm {
    pub name: String,
    pub balance: f64,
    pub icon: AccountIcon,
    pub owner: Option<String>,
}

pub async fn edit_account_endpoint(
    State(state): State<EditAccountState>,
    Path(account_id): Path<AccountId>,
    Form(form): Form<EditAccountForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_account(account_id, &form, &connection) {
        Ok(rows_affected) if rows_affected != 0 => (
            HxRedirect(format_endpoint(endpoints::ACCOUNT_DETAIL_VIEW, account_id)),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Ok(_) => Error::UpdateMissingAccount.into_alert_response(),
        Err(error) => {
            tracing::error!("Could not update account {account_id}: {error}");
            error.into_alert_response()
        }
    }
}

type RowsAffected = usize;

fn update_account(
    id: AccountId,
    form: &EditAccountForm,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    let name = form.name.trim();

    if name.is_empty() {
        return Err(Error::EmptyAccountName);
    }

    let owner = form
        .owner
        .as_deref()
        .map(str::trim)
        .filter(|owner| !owner.is_empty());

    connection
        .execute(
            "UPDATE account
        SET \
            name = ?1, \
            balance = ?2, \
            icon = ?3, \
            owner = ?4 \
        WHERE id = ?5;",
            params![name, form.balance, form.icon, owner, id],
        )
        .map_err(|error| match error {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(_))
                if sql_error.extended_code == 2067 =>
            {
                Error::DuplicateAccountName(name.to_owned())
            }
            error => error.into(),
        })
}

//! Defines the route handler for the page for editing an account.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::html;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    account::{
        core::{Account, AccountId, get_account},
        form::{AccountFormDefaults, account_form_fields},
    },
    endpoints::{self, format_endpoint},
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base, loading_spinner},
    navigation::NavBar,
};

fn edit_account_view(account: &Account) -> maud::Markup {
    let nav_bar = NavBar::new(endpoints::EDIT_ACCOUNT_VIEW).into_html();
    let spinner = loading_spinner();
    let edit_url = format_endpoint(endpoints::ACCOUNT_API, account.id);
    let form_fields = account_form_fields(&AccountFormDefaults {
        name: Some(&account.name),
        balance: Some(account.balance),
        icon: account.icon,
        owner: account.owner.as_deref(),
        autofocus_name: true,
    });

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-put=(edit_url)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "Edit Account" }

                (form_fields)

                button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
                {
                    span
                        id="indicator"
                        class="inline htmx-indicator"
                    {
                        (spinner)
                    }
                    " Save Changes"
                }
            }
        }
    };

    base("Edit Account", &[], &content)
}

/// The state needed for the edit account page.
#[derive(Debug, Clone)]
pub struct EditAccountPageState {
    /// The database connection for accessing accounts.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditAccountPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the page for editing an account.
pub async fn get_edit_account_page(
    State(state): State<EditAccountPageState>,
    Path(account_id): Path<AccountId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let account = get_account(account_id, &connection)
        .inspect_err(|error| tracing::error!("could not get account {account_id}: {error}"))?;

    Ok(edit_account_view(&account).into_response())
}

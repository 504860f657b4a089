//! Displays a single history row with a form for editing it.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::html;
use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    account::{Account, get_all_accounts},
    endpoints::{self, format_endpoint},
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base, loading_spinner},
    navigation::NavBar,
    timezone::get_local_offset,
    transaction::{
        core::{Transaction, TransactionId, get_transaction},
        form::{TransactionFormDefaults, transaction_form_fields},
    },
};

/// The state needed for the transaction detail page.
#[derive(Debug, Clone)]
pub struct TransactionDetailState {
    /// The database connection for reading the transaction and accounts.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Tashkent".
    pub local_timezone: String,
}

impl FromRef<AppState> for TransactionDetailState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

fn transaction_detail_view(
    transaction: &Transaction,
    accounts: &[Account],
    now: OffsetDateTime,
) -> maud::Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTION_DETAIL_VIEW).into_html();
    let spinner = loading_spinner();
    let edit_url = format_endpoint(endpoints::TRANSACTION_API, transaction.id);
    let form_fields = transaction_form_fields(
        &TransactionFormDefaults {
            account_id: Some(transaction.account_id),
            transaction_type: transaction.transaction_type,
            amount: Some(transaction.amount),
            date: Some(transaction.date),
            location: Some(&transaction.location),
            description: Some(&transaction.description),
            max_date: now,
            autofocus_amount: false,
        },
        accounts,
    );

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-put=(edit_url)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "Edit Transaction" }

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

    base("Edit Transaction", &[], &content)
}

/// Renders the detail page for a single history row.
pub async fn get_transaction_detail_page(
    State(state): State<TransactionDetailState>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Response, Error> {
    let local_offset = get_local_offset(&state.local_timezone)
        .ok_or_else(|| Error::InvalidTimezone(state.local_timezone.clone()))?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transaction = get_transaction(transaction_id, &connection).inspect_err(|error| {
        tracing::error!("could not get transaction {transaction_id}: {error}")
    })?;

    let accounts = get_all_accounts(&connection)
        .inspect_err(|error| tracing::error!("could not get accounts: {error}"))?;

    let now = OffsetDateTime::now_utc().to_offset(local_offset);

    Ok(transaction_detail_view(&transaction, &accounts, now).into_response())
}

#[cfg(test)]
mod view_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use rusqlite::Connection;
    use time::{Duration, OffsetDateTime};

    use crate::{
        db::initialize,
        endpoints::{self, format_endpoint},
        transaction::core::{
            TransactionType,
            test_utils::{create_test_account, insert_test_transaction},
        },
        test_utils::{assert_valid_html, parse_html_document},
    };

    use super::{TransactionDetailState, get_transaction_detail_page};

    fn get_test_state() -> TransactionDetailState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        TransactionDetailState {
            db_connection: Arc::new(Mutex::new(conn)),
            local_timezone: "Asia/Tashkent".to_owned(),
        }
    }

    #[tokio::test]
    async fn detail_page_prefills_transaction_fields() {
        let state = get_test_state();
        let transaction = {
            let connection = state.db_connection.lock().unwrap();
            let account_id = create_test_account("card", 100.0, &connection);
            insert_test_transaction(
                account_id,
                25.0,
                TransactionType::Expense,
                OffsetDateTime::now_utc() - Duration::days(1),
                &connection,
            )
        };

        let response = get_transaction_detail_page(State(state), Path(transaction.id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        let form_selector = scraper::Selector::parse("form").unwrap();
        let form = document
            .select(&form_selector)
            .next()
            .expect("expected a form");
        let want_url = format_endpoint(endpoints::TRANSACTION_API, transaction.id);
        assert_eq!(form.value().attr("hx-put"), Some(want_url.as_str()));

        let amount_selector = scraper::Selector::parse("input[name=amount]").unwrap();
        let amount_input = form
            .select(&amount_selector)
            .next()
            .expect("expected amount input");
        assert_eq!(amount_input.value().attr("value"), Some("25.00"));

        let location_selector = scraper::Selector::parse("input[name=location]").unwrap();
        let location_input = form
            .select(&location_selector)
            .next()
            .expect("expected location input");
        assert_eq!(location_input.value().attr("value"), Some("Test Cafe"));

        let selected_account_selector =
            scraper::Selector::parse("select[name=account_id] option[selected]").unwrap();
        let selected = form
            .select(&selected_account_selector)
            .next()
            .expect("expected a selected account");
        assert_eq!(
            selected.value().attr("value"),
            Some(transaction.account_id.to_string().as_str())
        );
    }

    #[tokio::test]
    async fn detail_page_returns_not_found_for_missing_transaction() {
        let state = get_test_state();

        let response = get_transaction_detail_page(State(state), Path(42))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

//! Displays a single account with its details and recent history.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    account::core::{Account, AccountId, get_account},
    endpoints::{self, format_endpoint},
    format::{format_currency, format_date, format_date_time},
    html::{
        BUTTON_DELETE_STYLE, CARD_LABEL_STYLE, CARD_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE,
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
    },
    navigation::NavBar,
    transaction::{Transaction, get_transactions_for_account},
};

/// How many history rows the account page shows.
const ACCOUNT_HISTORY_LIMIT: usize = 10;

/// The state needed for the account detail page.
#[derive(Debug, Clone)]
pub struct AccountDetailState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AccountDetailState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

fn history_table(transactions: &[Transaction]) -> Markup {
    html! {
        section class="w-full overflow-x-auto dark:bg-gray-800"
        {
            table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                        th scope="col" class="px-6 py-3 text-right" { "Amount" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Location" }
                    }
                }

                tbody
                {
                    @for transaction in transactions {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class=(TABLE_CELL_STYLE)
                            {
                                a
                                    href=(format_endpoint(endpoints::TRANSACTION_DETAIL_VIEW, transaction.id))
                                    class=(LINK_STYLE)
                                {
                                    (format_date_time(transaction.date))
                                }
                            }
                            td class=(TABLE_CELL_STYLE) { (transaction.transaction_type.display_name()) }
                            td class="px-6 py-4 text-right"
                            {
                                (format_currency(transaction.signed_amount()))
                            }
                            td class=(TABLE_CELL_STYLE) { (transaction.location) }
                        }
                    }

                    @if transactions.is_empty() {
                        tr
                        {
                            td
                                colspan="4"
                                class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                            {
                                "No transactions recorded for this account yet."
                            }
                        }
                    }
                }
            }
        }
    }
}

fn account_detail_view(account: &Account, transactions: &[Transaction]) -> Markup {
    let nav_bar = NavBar::new(endpoints::ACCOUNT_DETAIL_VIEW).into_html();
    let edit_url = format_endpoint(endpoints::EDIT_ACCOUNT_VIEW, account.id);
    let delete_url = format_endpoint(endpoints::ACCOUNT_API, account.id);

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { (account.name) }

                    div class="flex gap-4"
                    {
                        a href=(edit_url) class=(LINK_STYLE) { "Edit" }

                        button
                            type="button"
                            class=(BUTTON_DELETE_STYLE)
                            hx-delete=(delete_url)
                            hx-target-error="#alert-container"
                            hx-confirm=(format!(
                                "Are you sure you want to delete the account '{}'? This cannot be undone.",
                                account.name
                            ))
                        {
                            "Delete"
                        }
                    }
                }

                div class="grid grid-cols-1 gap-4 sm:grid-cols-2"
                {
                    div class=(CARD_STYLE)
                    {
                        p class=(CARD_LABEL_STYLE) { "Balance" }
                        p class="text-2xl font-bold" { (format_currency(account.balance)) }
                    }

                    div class=(CARD_STYLE)
                    {
                        p class=(CARD_LABEL_STYLE) { "Details" }
                        p { "Icon: " (account.icon.display_name()) }
                        @if let Some(owner) = &account.owner {
                            p { "Owner: " (owner) }
                        }
                        p { "Created: " (format_date(account.created_at)) }
                    }
                }

                h2 class="text-lg font-semibold" { "Recent transactions" }

                (history_table(transactions))
            }
        }
    };

    base(&account.name, &[], &content)
}

/// Renders the detail page for a single account.
pub async fn get_account_detail_page(
    State(state): State<AccountDetailState>,
    Path(account_id): Path<AccountId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let account = get_account(account_id, &connection)
        .inspect_err(|error| tracing::error!("could not get account {account_id}: {error}"))?;

    let transactions = get_transactions_for_account(account_id, ACCOUNT_HISTORY_LIMIT, &connection)
        .inspect_err(|error| {
            tracing::error!("could not get transactions for account {account_id}: {error}")
        })?;

    Ok(account_detail_view(&account, &transactions).into_response())
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

    use crate::{
        account::{
            core::AccountIcon,
            create_endpoint::{AccountForm, create_account},
        },
        db::initialize,
        endpoints::{self, format_endpoint},
        format::format_currency,
        test_utils::{assert_valid_html, parse_html_document},
    };

    use super::{AccountDetailState, get_account_detail_page};

    fn get_test_state() -> AccountDetailState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        AccountDetailState {
            db_connection: Arc::new(Mutex::new(conn)),
        }
    }

    #[tokio::test]
    async fn detail_page_shows_account_and_empty_history() {
        let state = get_test_state();
        let account = {
            let connection = state.db_connection.lock().unwrap();
            create_account(
                &AccountForm {
                    name: "salary card".to_owned(),
                    balance: 120_000.0,
                    icon: AccountIcon::Card,
                    owner: None,
                },
                &connection,
            )
            .unwrap()
        };

        let response = get_account_detail_page(State(state), Path(account.id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        let heading_selector = scraper::Selector::parse("h1").unwrap();
        let heading = document
            .select(&heading_selector)
            .next()
            .expect("expected a page heading");
        assert_eq!(heading.text().collect::<String>().trim(), "salary card");

        let body_text = document.root_element().text().collect::<String>();
        assert!(
            body_text.contains(&format_currency(120_000.0)),
            "expected the account balance on the page"
        );
        assert!(
            body_text.contains("No transactions recorded for this account yet."),
            "expected the empty history message"
        );

        let edit_selector = scraper::Selector::parse("a[href]").unwrap();
        let want_edit_url = format_endpoint(endpoints::EDIT_ACCOUNT_VIEW, account.id);
        assert!(
            document
                .select(&edit_selector)
                .any(|link| link.value().attr("href") == Some(want_edit_url.as_str())),
            "expected a link to the edit page"
        );
    }

    #[tokio::test]
    async fn detail_page_returns_not_found_for_missing_account() {
        let state = get_test_state();

        let response = get_account_detail_page(State(state), Path(42))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

//! Displays the confirmed transaction history as a paginated table.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    endpoints::{self, format_endpoint},
    format::{format_currency, format_date_time},
    html::{
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base,
    },
    navigation::NavBar,
    pagination::{
        PaginationConfig, PaginationIndicator, clamp_page, create_pagination_indicators, page_count,
    },
    transaction::core::{Transaction, count_transactions, get_transactions_page},
};

/// The state needed for the history page.
#[derive(Debug, Clone)]
pub struct HistoryState {
    /// The database connection for reading the history.
    pub db_connection: Arc<Mutex<Connection>>,
    /// Configuration for pagination controls.
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for HistoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// Controls pagination of the history table.
#[derive(Debug, Deserialize)]
pub struct Pagination {
    /// The page number to display. Starts from 1.
    pub page: Option<u64>,
    /// The maximum number of transactions to display per page.
    pub per_page: Option<u64>,
}

fn history_page_url(page: u64, per_page: u64) -> String {
    format!("{}?page={page}&per_page={per_page}", endpoints::HISTORY_VIEW)
}

fn pagination_nav(indicators: &[PaginationIndicator], per_page: u64) -> Markup {
    const PAGE_LINK_STYLE: &str = "px-3 py-1 rounded hover:bg-gray-100 dark:hover:bg-gray-700";

    html! {
        nav aria-label="History pages" class="flex gap-1 items-center justify-center py-4"
        {
            @for indicator in indicators {
                @match indicator {
                    PaginationIndicator::BackButton(page) => {
                        a href=(history_page_url(*page, per_page)) class=(PAGE_LINK_STYLE)
                        {
                            "Previous"
                        }
                    }
                    PaginationIndicator::Page(page) => {
                        a href=(history_page_url(*page, per_page)) class=(PAGE_LINK_STYLE)
                        {
                            (page)
                        }
                    }
                    PaginationIndicator::CurrPage(page) => {
                        span
                            aria-current="page"
                            class="px-3 py-1 rounded font-bold bg-blue-500 text-white"
                        {
                            (page)
                        }
                    }
                    PaginationIndicator::Ellipsis => {
                        span class="px-1" { "…" }
                    }
                    PaginationIndicator::NextButton(page) => {
                        a href=(history_page_url(*page, per_page)) class=(PAGE_LINK_STYLE)
                        {
                            "Next"
                        }
                    }
                }
            }
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
                        th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
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
                                    href=(format_endpoint(
                                        endpoints::TRANSACTION_DETAIL_VIEW,
                                        transaction.id
                                    ))
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
                            td class=(TABLE_CELL_STYLE) { (transaction.description) }
                        }
                    }

                    @if transactions.is_empty() {
                        tr
                        {
                            td
                                colspan="5"
                                class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                            {
                                "No transactions yet. Record one to get started."
                            }
                        }
                    }
                }
            }
        }
    }
}

fn history_view(
    transactions: &[Transaction],
    indicators: &[PaginationIndicator],
    per_page: u64,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::HISTORY_VIEW).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full max-w-4xl space-y-4"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "History" }

                    a href=(endpoints::NEW_TRANSACTION_VIEW) class=(LINK_STYLE)
                    {
                        "New Transaction"
                    }
                }

                (history_table(transactions))

                (pagination_nav(indicators, per_page))
            }
        }
    };

    base("History", &[], &content)
}

/// Renders the history page.
///
/// Page numbers past the last page are clamped to the last page rather than
/// rejected, so stale links stay usable.
pub async fn get_history_page(
    State(state): State<HistoryState>,
    Query(pagination): Query<Pagination>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let per_page = pagination
        .per_page
        .unwrap_or(state.pagination_config.default_page_size)
        .max(1);
    let requested_page = pagination
        .page
        .unwrap_or(state.pagination_config.default_page);

    let transaction_count = count_transactions(&connection)?;
    let page_count = page_count(transaction_count, per_page);
    let curr_page = clamp_page(requested_page, page_count);

    let transactions = get_transactions_page(curr_page, per_page, &connection)
        .inspect_err(|error| tracing::error!("could not get history page {curr_page}: {error}"))?;

    let indicators =
        create_pagination_indicators(curr_page, page_count, state.pagination_config.max_pages);

    Ok(history_view(&transactions, &indicators, per_page).into_response())
}

//! Displays the overview dashboard.
//!
//! The dashboard is the landing page. It shows the headline figures, the
//! account cards, the pending notifications waiting for confirmation and the
//! most recent history rows.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    account::{Account, get_all_accounts},
    endpoints::{self, format_endpoint},
    format::{format_currency, format_date_time},
    html::{
        CARD_LABEL_STYLE, CARD_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
    },
    navigation::NavBar,
    notification::{Notification, get_all_notifications},
    transaction::{Transaction, get_transactions_page},
};

use super::core::{OverviewSummary, get_overview_summary};

/// How many history rows the dashboard shows.
const RECENT_TRANSACTION_LIMIT: u64 = 5;

/// The state needed for the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading the dashboard data.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

fn overview_cards(summary: &OverviewSummary) -> Markup {
    html! {
        div class="grid grid-cols-2 gap-4 lg:grid-cols-4"
        {
            div class=(CARD_STYLE)
            {
                p class=(CARD_LABEL_STYLE) { "Income" }
                p class="text-2xl font-bold" { (format_currency(summary.income)) }
            }

            div class=(CARD_STYLE)
            {
                p class=(CARD_LABEL_STYLE) { "Expenses" }
                p class="text-2xl font-bold" { (format_currency(summary.expenses)) }
            }

            div class=(CARD_STYLE)
            {
                p class=(CARD_LABEL_STYLE) { "Total Balance" }
                p class="text-2xl font-bold" { (format_currency(summary.total_balance)) }
            }

            div class=(CARD_STYLE)
            {
                p class=(CARD_LABEL_STYLE) { "Transactions" }
                p class="text-2xl font-bold" { (summary.total_transactions) }
            }
        }
    }
}

fn account_cards(accounts: &[Account]) -> Markup {
    html! {
        div class="grid grid-cols-1 gap-4 sm:grid-cols-2 lg:grid-cols-3"
        {
            @for account in accounts {
                a href=(format_endpoint(endpoints::ACCOUNT_DETAIL_VIEW, account.id)) class=(CARD_STYLE)
                {
                    p class=(CARD_LABEL_STYLE)
                    {
                        (account.icon.display_name())

                        @if let Some(owner) = &account.owner {
                            " · " (owner)
                        }
                    }
                    p class="text-lg font-semibold" { (account.name) }
                    p class="text-xl font-bold" { (format_currency(account.balance)) }
                }
            }

            a
                href=(endpoints::NEW_ACCOUNT_VIEW)
                class="w-full p-4 rounded-lg border-2 border-dashed border-gray-300 \
                    dark:border-gray-600 flex items-center justify-center text-gray-500 \
                    dark:text-gray-400 hover:border-blue-500 hover:text-blue-500"
            {
                "+ Add Account"
            }
        }
    }
}

fn pending_notifications_table(notifications: &[Notification]) -> Markup {
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
                        th scope="col" class=(TABLE_CELL_STYLE) { "" }
                    }
                }

                tbody
                {
                    @for notification in notifications {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class=(TABLE_CELL_STYLE) { (format_date_time(notification.date)) }
                            td class=(TABLE_CELL_STYLE)
                            {
                                (notification.transaction_type.display_name())
                            }
                            td class="px-6 py-4 text-right"
                            {
                                (format_currency(notification.amount))
                            }
                            td class=(TABLE_CELL_STYLE) { (notification.location) }
                            td class=(TABLE_CELL_STYLE)
                            {
                                a
                                    href=(format_endpoint(
                                        endpoints::NOTIFICATION_VIEW,
                                        notification.id
                                    ))
                                    class=(LINK_STYLE)
                                {
                                    "Process"
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn recent_transactions_table(transactions: &[Transaction]) -> Markup {
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
                        }
                    }

                    @if transactions.is_empty() {
                        tr
                        {
                            td
                                colspan="4"
                                class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                            {
                                "No transactions yet."
                            }
                        }
                    }
                }
            }
        }
    }
}

fn dashboard_view(
    summary: &OverviewSummary,
    accounts: &[Account],
    notifications: &[Notification],
    transactions: &[Transaction],
) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full max-w-4xl space-y-6"
            {
                (overview_cards(summary))

                h2 class="text-lg font-semibold" { "Accounts" }
                (account_cards(accounts))

                @if !notifications.is_empty() {
                    h2 class="text-lg font-semibold" { "Pending transactions" }
                    (pending_notifications_table(notifications))
                }

                div class="flex justify-between flex-wrap items-end"
                {
                    h2 class="text-lg font-semibold" { "Recent transactions" }

                    a href=(endpoints::HISTORY_VIEW) class=(LINK_STYLE) { "View all" }
                }
                (recent_transactions_table(transactions))
            }
        }
    };

    base("Dashboard", &[], &content)
}

/// Renders the dashboard page.
pub async fn get_dashboard_page(State(state): State<DashboardState>) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let summary = get_overview_summary(&connection)
        .inspect_err(|error| tracing::error!("could not compute overview summary: {error}"))?;

    let accounts = get_all_accounts(&connection)
        .inspect_err(|error| tracing::error!("could not get accounts: {error}"))?;

    let notifications = get_all_notifications(&connection)
        .inspect_err(|error| tracing::error!("could not get notifications: {error}"))?;

    let transactions = get_transactions_page(1, RECENT_TRANSACTION_LIMIT, &connection)
        .inspect_err(|error| tracing::error!("could not get recent transactions: {error}"))?;

    Ok(dashboard_view(&summary, &accounts, &notifications, &transactions).into_response())
}

//! Defines the route handler for the page for confirming a pending
//! notification.

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
    format::format_date_time,
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base, loading_spinner},
    navigation::NavBar,
    timezone::get_local_offset,
    transaction::{TransactionFormDefaults, transaction_form_fields},
};

use super::core::{Notification, NotificationId, get_notification};

/// The state needed for the notification confirmation page.
#[derive(Debug, Clone)]
pub struct ProcessNotificationPageState {
    /// The database connection for reading the notification and accounts.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Tashkent".
    pub local_timezone: String,
}

impl FromRef<AppState> for ProcessNotificationPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

fn process_notification_view(
    notification: &Notification,
    accounts: &[Account],
    now: OffsetDateTime,
) -> maud::Markup {
    let nav_bar = NavBar::new(endpoints::NOTIFICATION_VIEW).into_html();
    let spinner = loading_spinner();
    let process_url = format_endpoint(endpoints::PROCESS_NOTIFICATION, notification.id);
    // No account is preselected, the alert feed does not know which account
    // the transaction belongs to.
    let form_fields = transaction_form_fields(
        &TransactionFormDefaults {
            account_id: None,
            transaction_type: notification.transaction_type,
            amount: Some(notification.amount),
            date: Some(notification.date),
            location: Some(&notification.location),
            description: Some(&notification.description),
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
                hx-post=(process_url)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "Confirm Transaction" }

                p class="text-sm text-gray-500 dark:text-gray-400"
                {
                    "Reported " (format_date_time(notification.date))
                    ". Check the details and pick the account it belongs to."
                }

                (form_fields)

                button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
                {
                    span
                        id="indicator"
                        class="inline htmx-indicator"
                    {
                        (spinner)
                    }
                    " Confirm Transaction"
                }
            }
        }
    };

    base("Confirm Transaction", &[], &content)
}

/// Renders the confirmation page for a pending notification.
pub async fn get_process_notification_page(
    State(state): State<ProcessNotificationPageState>,
    Path(notification_id): Path<NotificationId>,
) -> Result<Response, Error> {
    let local_offset = get_local_offset(&state.local_timezone)
        .ok_or_else(|| Error::InvalidTimezone(state.local_timezone.clone()))?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let notification = get_notification(notification_id, &connection).inspect_err(|error| {
        tracing::error!("could not get notification {notification_id}: {error}")
    })?;

    let accounts = get_all_accounts(&connection)
        .inspect_err(|error| tracing::error!("could not get accounts: {error}"))?;

    let now = OffsetDateTime::now_utc().to_offset(local_offset);

    Ok(process_notification_view(&notification, &accounts, now).into_response())
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
        notification::core::create_notification,
        transaction::{TransactionType, test_utils::create_test_account},
        test_utils::{assert_valid_html, parse_html_document},
    };

    use super::{ProcessNotificationPageState, get_process_notification_page};

    fn get_test_state() -> ProcessNotificationPageState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        ProcessNotificationPageState {
            db_connection: Arc::new(Mutex::new(conn)),
            local_timezone: "Asia/Tashkent".to_owned(),
        }
    }

    #[tokio::test]
    async fn confirmation_page_prefills_notification_fields() {
        let state = get_test_state();
        let notification = {
            let connection = state.db_connection.lock().unwrap();
            create_test_account("card", 100.0, &connection);
            create_notification(
                55_000.0,
                TransactionType::Expense,
                OffsetDateTime::now_utc() - Duration::days(1),
                "Korzinka",
                "groceries",
                &connection,
            )
            .unwrap()
        };

        let response = get_process_notification_page(State(state), Path(notification.id))
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
        let want_url = format_endpoint(endpoints::PROCESS_NOTIFICATION, notification.id);
        assert_eq!(form.value().attr("hx-post"), Some(want_url.as_str()));

        let amount_selector = scraper::Selector::parse("input[name=amount]").unwrap();
        let amount_input = form
            .select(&amount_selector)
            .next()
            .expect("expected amount input");
        assert_eq!(amount_input.value().attr("value"), Some("55000.00"));

        // The account select must start on the placeholder so the user has
        // to make an explicit choice.
        let placeholder_selector =
            scraper::Selector::parse("select[name=account_id] option[selected]").unwrap();
        let selected = form
            .select(&placeholder_selector)
            .next()
            .expect("expected a selected option");
        assert_eq!(selected.value().attr("value"), Some(""));
    }

    #[tokio::test]
    async fn confirmation_page_returns_not_found_for_missing_notification() {
        let state = get_test_state();

        let response = get_process_notification_page(State(state), Path(42))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

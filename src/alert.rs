//! Alert messages for reporting the outcome of an action to the user.
//!
//! Endpoints respond with an [Alert] when a form submission succeeds or
//! fails. Forms set `hx-target-error="#alert-container"` so that error
//! responses are swapped into the shared alert container in the page
//! footer instead of replacing the form.

use axum::response::{IntoResponse, Response};
use maud::{Markup, html};

const ALERT_SUCCESS_STYLE: &str = "flex items-center w-full p-4 mb-4 rounded-lg shadow \
    text-green-800 bg-green-50 dark:bg-gray-800 dark:text-green-400";

const ALERT_ERROR_STYLE: &str = "flex items-center w-full p-4 mb-4 rounded-lg shadow \
    text-red-800 bg-red-50 dark:bg-gray-800 dark:text-red-400";

const ALERT_DISMISS_STYLE: &str = "ms-auto -mx-1.5 -my-1.5 p-1.5 rounded-lg focus:ring-2 \
    focus:ring-gray-300 inline-flex items-center justify-center h-8 w-8 \
    bg-transparent text-gray-400 hover:text-gray-900 dark:hover:text-white \
    cursor-pointer";

/// A dismissable message describing the outcome of an action.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// An action failed. `title` says what failed, `details` says why.
    Error {
        /// A short description of what went wrong.
        title: String,
        /// An explanation of the error, may be empty.
        details: String,
    },
    /// An action succeeded and a single line says what happened.
    SuccessSimple {
        /// A short description of what succeeded.
        message: String,
    },
}

impl Alert {
    /// Create an error alert.
    pub fn error(title: &str, details: &str) -> Self {
        Self::Error {
            title: title.to_owned(),
            details: details.to_owned(),
        }
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        let markup = match self {
            Alert::Error { title, details } => alert_body(ALERT_ERROR_STYLE, &title, &details),
            Alert::SuccessSimple { message } => alert_body(ALERT_SUCCESS_STYLE, &message, ""),
        };

        markup.into_response()
    }
}

fn alert_body(style: &str, title: &str, details: &str) -> Markup {
    html! {
        div class=(style) role="alert"
        {
            div class="text-sm font-medium"
            {
                (title)

                @if !details.is_empty()
                {
                    p class="font-normal" { (details) }
                }
            }

            button
                type="button"
                class=(ALERT_DISMISS_STYLE)
                aria-label="Close"
                onclick="this.closest('[role=alert]').remove();"
            {
                span class="sr-only" { "Close" }
                "✕"
            }
        }

        // The container starts hidden and stays hidden until an alert is
        // swapped into it.
        script { "document.getElementById('alert-container').classList.remove('hidden');" }
    }
}

#[cfg(test)]
mod alert_tests {
    use axum::response::IntoResponse;
    use scraper::Selector;

    use crate::test_utils::parse_html_document;

    use super::Alert;

    #[tokio::test]
    async fn error_alert_renders_title_and_details() {
        let response = Alert::error("Could not delete account", "The account does not exist.")
            .into_response();

        let document = parse_html_document(response).await;
        let alert_selector = Selector::parse("[role=alert]").unwrap();
        let alert = document
            .select(&alert_selector)
            .next()
            .expect("the response should contain an alert");
        let text = alert.text().collect::<String>();

        assert!(text.contains("Could not delete account"));
        assert!(text.contains("The account does not exist."));
    }

    #[tokio::test]
    async fn success_alert_renders_message() {
        let response = Alert::SuccessSimple {
            message: "Account deleted successfully".to_owned(),
        }
        .into_response();

        let document = parse_html_document(response).await;
        let alert_selector = Selector::parse("[role=alert]").unwrap();
        let alert = document
            .select(&alert_selector)
            .next()
            .expect("the response should contain an alert");
        let text = alert.text().collect::<String>();

        assert!(text.contains("Account deleted successfully"));
    }
}

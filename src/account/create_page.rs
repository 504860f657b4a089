//! Defines the route handler for the page for creating an account.

use axum::response::{IntoResponse, Response};
use maud::html;

use crate::{
    account::form::{AccountFormDefaults, account_form_fields},
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base, loading_spinner},
    navigation::NavBar,
};

/// Renders the page for creating an account.
pub async fn get_create_account_page() -> Response {
    let nav_bar = NavBar::new(endpoints::NEW_ACCOUNT_VIEW).into_html();
    let spinner = loading_spinner();
    let form_fields = account_form_fields(&AccountFormDefaults {
        name: None,
        balance: None,
        icon: Default::default(),
        owner: None,
        autofocus_name: true,
    });

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-post=(endpoints::ACCOUNTS_API)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "New Account" }

                (form_fields)

                button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
                {
                    span
                        id="indicator"
                        class="inline htmx-indicator"
                    {
                        (spinner)
                    }
                    " Create Account"
                }
            }
        }
    };

    base("Create Account", &[], &content).into_response()
}

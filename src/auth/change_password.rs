//! The settings page for changing the logged-in user's password.
use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error, PasswordHash, ValidatedPassword,
    alert::Alert,
    auth::{
        UserId,
        user::{get_user_by_id, update_user_password},
    },
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base, loading_spinner},
    navigation::NavBar,
};

fn password_field(label: &str, name: &str, id: &str) -> Markup {
    html! {
        div
        {
            label for=(id) class=(FORM_LABEL_STYLE) { (label) }

            input
                type="password"
                name=(name)
                id=(id)
                placeholder="••••••••"
                class=(FORM_TEXT_INPUT_STYLE)
                required;
        }
    }
}

fn change_password_form() -> Markup {
    html! {
        form
            hx-post=(endpoints::CHANGE_PASSWORD_API)
            hx-target-error="#alert-container"
            hx-indicator="#indicator"
            hx-disabled-elt="#current-password, #new-password, #confirm-new-password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            (password_field("Current Password", "current_password", "current-password"))
            (password_field("New Password", "new_password", "new-password"))
            (password_field("Confirm New Password", "confirm_new_password", "confirm-new-password"))

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Change Password"
            }
        }
    }
}

/// Display the settings page with the change password form.
pub async fn get_change_password_page() -> Response {
    let nav_bar = NavBar::new(endpoints::CHANGE_PASSWORD_VIEW).into_html();
    let content = html! {
        (nav_bar)

        div class="flex flex-col items-center justify-center px-6 py-8 mx-auto"
        {
            div
                class="w-full bg-white rounded shadow dark:border md:mt-0 sm:max-w-md xl:p-0 dark:bg-gray-800 dark:border-gray-700"
            {
                div class="p-6 space-y-4 md:space-y-6 sm:p-8"
                {
                    h1 class="text-xl font-bold md:text-2xl" { "Settings" }
                    h2 class="text-lg font-semibold" { "Change password" }
                    (change_password_form())
                }
            }
        }
    };

    base("Settings", &[], &content).into_response()
}

#[derive(Debug, Clone)]
pub struct ChangePasswordState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ChangePasswordState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct ChangePasswordForm {
    pub current_password: String,
    pub new_password: String,
    pub confirm_new_password: String,
}

/// Change the password of the logged-in user.
///
/// Returns an alert fragment describing the result, so the form can stay on
/// the page.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn post_change_password(
    State(state): State<ChangePasswordState>,
    Extension(user_id): Extension<UserId>,
    Form(form): Form<ChangePasswordForm>,
) -> Response {
    let result = change_password(&state, user_id, &form);

    match result {
        Ok(()) => Alert::SuccessSimple {
            message: "Your password has been changed.".to_owned(),
        }
        .into_response(),
        Err(error) => error.into_alert_response(),
    }
}

fn change_password(
    state: &ChangePasswordState,
    user_id: UserId,
    form: &ChangePasswordForm,
) -> Result<(), Error> {
    if form.new_password != form.confirm_new_password {
        return Err(Error::TooWeak("New passwords do not match.".to_owned()));
    }

    let validated_password = ValidatedPassword::new(&form.new_password)?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let user = get_user_by_id(user_id, &connection)?;

    let password_matches = user
        .password_hash
        .verify(&form.current_password)
        .map_err(|error| Error::HashingError(error.to_string()))?;

    if !password_matches {
        return Err(Error::InvalidCredentials);
    }

    let password_hash = PasswordHash::new(validated_password, PasswordHash::DEFAULT_COST)?;

    update_user_password(user_id, &password_hash, &connection)
}


#[cfg(test)]
mod post_change_password_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, Form, extract::State, http::StatusCode};
    use rusqlite::Connection;

    use crate::{
        PasswordHash, ValidatedPassword,
        auth::user::{create_user, create_user_table, get_user_by_id},
        test_utils::parse_html_fragment,
    };

    use super::{ChangePasswordForm, ChangePasswordState, post_change_password};

    const CURRENT_PASSWORD: &str = "turkeysgogobblegobble";
    const NEW_PASSWORD: &str = "thisgooseishonking99";

    fn get_test_state() -> (ChangePasswordState, crate::UserId) {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        create_user_table(&connection).expect("Could not create user table");
        let password_hash = PasswordHash::new(
            ValidatedPassword::new_unchecked(CURRENT_PASSWORD),
            PasswordHash::DEFAULT_COST,
        )
        .unwrap();
        let user = create_user("jo@example.com", password_hash, &connection).unwrap();

        (
            ChangePasswordState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user.id,
        )
    }

    #[tokio::test]
    async fn change_password_succeeds_with_valid_data() {
        let (state, user_id) = get_test_state();
        let db_connection = state.db_connection.clone();
        let form = ChangePasswordForm {
            current_password: CURRENT_PASSWORD.to_string(),
            new_password: NEW_PASSWORD.to_string(),
            confirm_new_password: NEW_PASSWORD.to_string(),
        };

        let response =
            post_change_password(State(state), Extension(user_id), Form(form)).await;

        assert_eq!(response.status(), StatusCode::OK);

        let document = parse_html_fragment(response).await;
        let alert_selector = scraper::Selector::parse("[role=alert]").unwrap();
        let alert = document
            .select(&alert_selector)
            .next()
            .expect("expected a success alert");
        let alert_text = alert.text().collect::<String>();
        assert!(
            alert_text.contains("Your password has been changed."),
            "unexpected alert text: {alert_text}"
        );

        let connection = db_connection.lock().unwrap();
        let user = get_user_by_id(user_id, &connection).unwrap();
        assert!(user.password_hash.verify(NEW_PASSWORD).unwrap());
    }

    #[tokio::test]
    async fn change_password_fails_with_wrong_current_password() {
        let (state, user_id) = get_test_state();
        let db_connection = state.db_connection.clone();
        let form = ChangePasswordForm {
            current_password: "wrongpassword".to_string(),
            new_password: NEW_PASSWORD.to_string(),
            confirm_new_password: NEW_PASSWORD.to_string(),
        };

        let response =
            post_change_password(State(state), Extension(user_id), Form(form)).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let connection = db_connection.lock().unwrap();
        let user = get_user_by_id(user_id, &connection).unwrap();
        assert!(user.password_hash.verify(CURRENT_PASSWORD).unwrap());
    }

    #[tokio::test]
    async fn change_password_fails_with_mismatched_new_passwords() {
        let (state, user_id) = get_test_state();
        let form = ChangePasswordForm {
            current_password: CURRENT_PASSWORD.to_string(),
            new_password: NEW_PASSWORD.to_string(),
            confirm_new_password: format!("{NEW_PASSWORD}!"),
        };

        let response =
            post_change_password(State(state), Extension(user_id), Form(form)).await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn change_password_fails_with_weak_new_password() {
        let (state, user_id) = get_test_state();
        let form = ChangePasswordForm {
            current_password: CURRENT_PASSWORD.to_string(),
            new_password: "password".to_string(),
            confirm_new_password: "password".to_string(),
        };

        let response =
            post_change_password(State(state), Extension(user_id), Form(form)).await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}

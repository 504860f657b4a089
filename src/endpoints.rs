//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/account/{account_id}', use [format_endpoint].

/// The landing page for logged in users, showing the overview dashboard.
pub const DASHBOARD_VIEW: &str = "/";
/// The page for displaying the confirmed transaction history.
pub const HISTORY_VIEW: &str = "/history";
/// The page for recording a new transaction.
pub const NEW_TRANSACTION_VIEW: &str = "/history/new";
/// The page for viewing and editing a single history record.
pub const TRANSACTION_DETAIL_VIEW: &str = "/transaction/{transaction_id}";
/// The page for viewing and editing a single account.
pub const ACCOUNT_DETAIL_VIEW: &str = "/account/{account_id}";
/// The page for editing a single account.
pub const EDIT_ACCOUNT_VIEW: &str = "/account/{account_id}/edit";
/// The page for creating a new account.
pub const NEW_ACCOUNT_VIEW: &str = "/accounts/new";
/// The page for confirming a pending notification into the history.
pub const NOTIFICATION_VIEW: &str = "/notification/{notification_id}";
/// The route for getting the log in page.
pub const LOG_IN_VIEW: &str = "/login";
/// The route for getting the sign up page.
pub const SIGN_UP_VIEW: &str = "/sign-up";
/// The route for instructions for resetting the user's password.
pub const FORGOT_PASSWORD_VIEW: &str = "/forgot-password";
/// The page for changing the current user's password.
pub const CHANGE_PASSWORD_VIEW: &str = "/change-password";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route for logging in a user.
pub const LOG_IN_API: &str = "/api/log_in";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/log_out";
/// The route to create a user.
pub const USERS: &str = "/api/users";
/// The route for changing the current user's password.
pub const CHANGE_PASSWORD_API: &str = "/api/change_password";
/// The route to create an account.
pub const ACCOUNTS_API: &str = "/api/accounts";
/// The route to update or delete an account.
pub const ACCOUNT_API: &str = "/api/accounts/{account_id}";
/// The route to create a history record.
pub const TRANSACTIONS_API: &str = "/api/transactions";
/// The route to update a history record.
pub const TRANSACTION_API: &str = "/api/transactions/{transaction_id}";
/// The route to ingest a pending transaction notification.
pub const NOTIFICATIONS_API: &str = "/api/notifications";
/// The route to confirm a notification into the history.
pub const PROCESS_NOTIFICATION: &str = "/api/notifications/{notification_id}/process";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/account/{account_id}', '{account_id}'
/// is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}

// These tests are here so that we know when we call `Uri::from_shared` it will not panic.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::format_endpoint;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok());
    }

    #[test]
    fn endpoints_are_valid_uris() {
        assert_endpoint_is_valid_uri(endpoints::DASHBOARD_VIEW);
        assert_endpoint_is_valid_uri(endpoints::HISTORY_VIEW);
        assert_endpoint_is_valid_uri(endpoints::NEW_TRANSACTION_VIEW);
        assert_endpoint_is_valid_uri(endpoints::TRANSACTION_DETAIL_VIEW);
        assert_endpoint_is_valid_uri(endpoints::ACCOUNT_DETAIL_VIEW);
        assert_endpoint_is_valid_uri(endpoints::EDIT_ACCOUNT_VIEW);
        assert_endpoint_is_valid_uri(endpoints::NEW_ACCOUNT_VIEW);
        assert_endpoint_is_valid_uri(endpoints::NOTIFICATION_VIEW);
        assert_endpoint_is_valid_uri(endpoints::LOG_IN_VIEW);
        assert_endpoint_is_valid_uri(endpoints::SIGN_UP_VIEW);
        assert_endpoint_is_valid_uri(endpoints::FORGOT_PASSWORD_VIEW);
        assert_endpoint_is_valid_uri(endpoints::CHANGE_PASSWORD_VIEW);
        assert_endpoint_is_valid_uri(endpoints::INTERNAL_ERROR_VIEW);
        assert_endpoint_is_valid_uri(endpoints::STATIC);

        assert_endpoint_is_valid_uri(endpoints::LOG_IN_API);
        assert_endpoint_is_valid_uri(endpoints::LOG_OUT);
        assert_endpoint_is_valid_uri(endpoints::USERS);
        assert_endpoint_is_valid_uri(endpoints::CHANGE_PASSWORD_API);
        assert_endpoint_is_valid_uri(endpoints::ACCOUNTS_API);
        assert_endpoint_is_valid_uri(endpoints::ACCOUNT_API);
        assert_endpoint_is_valid_uri(endpoints::TRANSACTIONS_API);
        assert_endpoint_is_valid_uri(endpoints::TRANSACTION_API);
        assert_endpoint_is_valid_uri(endpoints::NOTIFICATIONS_API);
        assert_endpoint_is_valid_uri(endpoints::PROCESS_NOTIFICATION);
    }

    #[test]
    fn produces_valid_uri() {
        let formatted_path = format_endpoint("/hello/{world_id}", 1);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());

        // Parameter with single word should also work.
        let formatted_path = format_endpoint("/hello/{world}", 1);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn returns_original_path_with_no_parameter() {
        let formatted_path = format_endpoint("/hello/world", 1);

        assert_eq!(formatted_path, "/hello/world");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn parameter_in_middle() {
        let formatted_path = format_endpoint("/hello/{world}/bye", 1);

        assert_eq!(formatted_path, "/hello/1/bye");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }
}

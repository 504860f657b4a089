//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router,
    middleware,
    routing::{get, post, put},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    account::{
        create_account_endpoint, delete_account_endpoint, edit_account_endpoint,
        get_account_detail_page, get_create_account_page, get_edit_account_page,
    },
    auth::{
        auth_guard, auth_guard_hx, get_change_password_page, get_forgot_password_page,
        get_log_in_page, get_log_out, get_sign_up_page, post_change_password, post_log_in,
        post_sign_up,
    },
    dashboard::get_dashboard_page,
    endpoints,
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
    notification::{
        get_process_notification_page, ingest_notification_endpoint,
        process_notification_endpoint,
    },
    transaction::{
        create_transaction_endpoint, edit_transaction_endpoint, get_history_page,
        get_new_transaction_page, get_transaction_detail_page,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::LOG_IN_VIEW, get(get_log_in_page))
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(endpoints::SIGN_UP_VIEW, get(get_sign_up_page))
        .route(endpoints::USERS, post(post_sign_up))
        .route(
            endpoints::FORGOT_PASSWORD_VIEW,
            get(get_forgot_password_page),
        )
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let protected_routes = Router::new()
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::HISTORY_VIEW, get(get_history_page))
        .route(endpoints::NEW_TRANSACTION_VIEW, get(get_new_transaction_page))
        .route(
            endpoints::TRANSACTION_DETAIL_VIEW,
            get(get_transaction_detail_page),
        )
        .route(endpoints::ACCOUNT_DETAIL_VIEW, get(get_account_detail_page))
        .route(endpoints::EDIT_ACCOUNT_VIEW, get(get_edit_account_page))
        .route(endpoints::NEW_ACCOUNT_VIEW, get(get_create_account_page))
        .route(
            endpoints::NOTIFICATION_VIEW,
            get(get_process_notification_page),
        )
        .route(endpoints::CHANGE_PASSWORD_VIEW, get(get_change_password_page))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    // These POST/PUT/DELETE routes need to use the HX-Redirect header for
    // auth redirects to work properly for htmx requests.
    let protected_routes = protected_routes.merge(
        Router::new()
            .route(endpoints::ACCOUNTS_API, post(create_account_endpoint))
            .route(
                endpoints::ACCOUNT_API,
                put(edit_account_endpoint).delete(delete_account_endpoint),
            )
            .route(
                endpoints::TRANSACTIONS_API,
                post(create_transaction_endpoint),
            )
            .route(endpoints::TRANSACTION_API, put(edit_transaction_endpoint))
            .route(
                endpoints::NOTIFICATIONS_API,
                post(ingest_notification_endpoint),
            )
            .route(
                endpoints::PROCESS_NOTIFICATION,
                post(process_notification_endpoint),
            )
            .route(endpoints::CHANGE_PASSWORD_API, post(post_change_password))
            .layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx)),
    );

    protected_routes
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

#[cfg(test)]
mod router_tests {
    use axum_test::TestServer;
    use rusqlite::Connection;

    use crate::{AppState, endpoints, pagination::PaginationConfig};

    use super::build_router;

    fn get_test_server() -> TestServer {
        let connection = Connection::open_in_memory().expect("Could not open database");
        let state = AppState::new(
            connection,
            "stneaoetna",
            "Asia/Tashkent",
            PaginationConfig::default(),
        )
        .expect("Could not create app state");

        TestServer::new(build_router(state))
    }

    #[tokio::test]
    async fn log_in_page_is_reachable_without_auth() {
        let server = get_test_server();

        let response = server.get(endpoints::LOG_IN_VIEW).await;

        response.assert_status_ok();
    }

    #[tokio::test]
    async fn dashboard_redirects_to_log_in_without_auth() {
        let server = get_test_server();

        let response = server.get(endpoints::DASHBOARD_VIEW).await;

        response.assert_status_see_other();
        let location = response.header("location");
        let location = location.to_str().expect("location should be a string");
        assert!(
            location.starts_with(endpoints::LOG_IN_VIEW),
            "want redirect to the log in page, got {location}"
        );
    }

    #[tokio::test]
    async fn history_redirects_to_log_in_without_auth() {
        let server = get_test_server();

        let response = server.get(endpoints::HISTORY_VIEW).await;

        response.assert_status_see_other();
    }

    #[tokio::test]
    async fn unknown_route_returns_not_found_page() {
        let server = get_test_server();

        let response = server.get("/does-not-exist").await;

        response.assert_status_not_found();
        response.assert_text_contains("404");
    }
}

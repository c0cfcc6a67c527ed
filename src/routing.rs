//! Application router configuration.

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
    routing::get,
};
use tower_http::trace::TraceLayer;

use crate::{AppState, dashboard::get_dashboard_summary, endpoints, logging::logging_middleware};

/// Return a router with all the app's routes.
///
/// The routes expect a [UserID](crate::UserID) request extension, so the
/// router must be wrapped in an authentication layer that inserts one.
pub fn build_router(state: AppState) -> Router {
    let router = Router::new()
        .route(endpoints::DASHBOARD_API, get(get_dashboard_summary))
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state);

    add_tracing_layer(router)
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // Errors are logged where they are converted into responses.
        .on_failure(());

    router.layer(tracing_layer)
}

#[cfg(test)]
mod routing_tests {
    use axum::{Extension, http::StatusCode};
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::Value;

    use crate::{AppState, dashboard::BreakdownKey, endpoints, user::create_user};

    use super::build_router;

    fn get_test_state() -> AppState {
        let conn = Connection::open_in_memory().expect("Could not open database in memory.");
        AppState::new(conn, "Etc/UTC", BreakdownKey::CategoryName)
            .expect("Could not create app state.")
    }

    #[tokio::test]
    async fn dashboard_route_is_served() {
        let state = get_test_state();
        let user = create_user(
            "Test User",
            "test@example.com",
            &state.db_connection.lock().unwrap(),
        )
        .expect("Could not create test user");
        let app = build_router(state).layer(Extension(user.id));
        let server = TestServer::new(app);

        let response = server.get(endpoints::DASHBOARD_API).await;

        response.assert_status_ok();
        let json: Value = response.json();
        assert!(json.get("categoryBreakdown").is_some());
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let server = TestServer::new(build_router(get_test_state()));

        let response = server.get("/api/unknown").await;

        response.assert_status(StatusCode::NOT_FOUND);
    }
}

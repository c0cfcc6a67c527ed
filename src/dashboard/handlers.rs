//! Dashboard HTTP handlers.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    dashboard::{
        aggregation::BreakdownKey,
        summary::{DashboardSummary, SummaryAggregator},
    },
    store::SQLiteTransactionStore,
    timezone::get_local_now,
    user::UserID,
};

/// The state needed for computing the dashboard summary.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// How the category breakdown is grouped.
    pub breakdown_key: BreakdownKey,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
            breakdown_key: state.breakdown_key,
        }
    }
}

/// Get the dashboard summary for the current user as JSON.
///
/// The [UserID] extension must be inserted by an authentication layer in front
/// of this handler. Month boundaries are computed in the server's local timezone.
pub async fn get_dashboard_summary(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<DashboardSummary>, Error> {
    let now = get_local_now(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let summary = SummaryAggregator::new(SQLiteTransactionStore::new(&connection))
        .breakdown_key(state.breakdown_key)
        .compute_summary(user_id, now)
        .inspect_err(|error| tracing::error!("could not compute dashboard summary: {error}"))?;

    Ok(Json(summary))
}

#[cfg(test)]
mod dashboard_route_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, Router, http::StatusCode, routing::get};
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::Value;

    use crate::{
        category::{Category, CategoryColor, CategoryName, create_category},
        dashboard::aggregation::BreakdownKey,
        db::initialize,
        endpoints,
        money::Amount,
        timezone::get_local_now,
        transaction::{Transaction, TransactionName, TransactionType, create_transaction},
        user::{UserID, create_user},
    };

    use super::{DashboardState, get_dashboard_summary};

    fn get_test_state() -> (DashboardState, UserID) {
        let conn = Connection::open_in_memory().expect("Could not open database in memory.");
        initialize(&conn).expect("Could not initialize database.");
        let user = create_user("Test User", "test@example.com", &conn)
            .expect("Could not create test user");

        let state = DashboardState {
            db_connection: Arc::new(Mutex::new(conn)),
            local_timezone: "Etc/UTC".to_owned(),
            breakdown_key: BreakdownKey::CategoryName,
        };

        (state, user.id)
    }

    fn get_test_server(state: DashboardState, user_id: UserID) -> TestServer {
        let app = Router::new()
            .route(endpoints::DASHBOARD_API, get(get_dashboard_summary))
            .layer(Extension(user_id))
            .with_state(state);

        TestServer::new(app)
    }

    #[tokio::test]
    async fn dashboard_returns_zeroed_summary_for_new_user() {
        let (state, user_id) = get_test_state();
        let server = get_test_server(state, user_id);

        let response = server.get(endpoints::DASHBOARD_API).await;

        response.assert_status_ok();
        let json: Value = response.json();
        assert_eq!(json["totalIncome"], serde_json::json!(0.0));
        assert_eq!(json["totalExpense"], serde_json::json!(0.0));
        assert_eq!(json["balance"], serde_json::json!(0.0));
        assert_eq!(json["monthlySummary"].as_array().unwrap().len(), 12);
        assert_eq!(json["recentTransactions"], serde_json::json!([]));
        assert_eq!(json["categoryBreakdown"], serde_json::json!({}));
    }

    #[tokio::test]
    async fn dashboard_returns_totals_for_current_user() {
        let (state, user_id) = get_test_state();
        {
            let conn = state.db_connection.lock().unwrap();
            let salary = create_category(
                user_id,
                Category::build(
                    CategoryName::new_unchecked("Salary"),
                    CategoryColor::new_unchecked("#10B981"),
                ),
                &conn,
            )
            .unwrap();
            create_transaction(
                user_id,
                Transaction::build(
                    Amount::from_cents_unchecked(500_000),
                    TransactionType::Income,
                    get_local_now("Etc/UTC").unwrap().date(),
                    TransactionName::new_unchecked("Monthly Salary"),
                    salary.id,
                ),
                &conn,
            )
            .unwrap();
        }
        let server = get_test_server(state, user_id);

        let response = server.get(endpoints::DASHBOARD_API).await;

        response.assert_status_ok();
        let json: Value = response.json();
        assert_eq!(json["totalIncome"], serde_json::json!(5000.0));
        assert_eq!(json["balance"], serde_json::json!(5000.0));
        assert_eq!(json["recentTransactions"][0]["name"], "Monthly Salary");
        assert_eq!(json["categoryBreakdown"]["Salary"]["net"], serde_json::json!(5000.0));
    }

    #[tokio::test]
    async fn dashboard_fails_with_invalid_timezone() {
        let (mut state, user_id) = get_test_state();
        state.local_timezone = "Not/AZone".to_owned();
        let server = get_test_server(state, user_id);

        let response = server.get(endpoints::DASHBOARD_API).await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let json: Value = response.json();
        assert!(json["error"].as_str().unwrap().contains("Not/AZone"));
    }

    #[tokio::test]
    async fn dashboard_requires_user_extension() {
        let (state, _) = get_test_state();
        let app = Router::new()
            .route(endpoints::DASHBOARD_API, get(get_dashboard_summary))
            .with_state(state);
        let server = TestServer::new(app);

        let response = server.get(endpoints::DASHBOARD_API).await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    }
}

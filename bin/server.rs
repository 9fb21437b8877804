// Air Booking - Read-only API server
// Reports and seat availability as JSON; no mutating endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use air_booking::{
    flights_between, flights_by_duration, normalize_date, parse_count, popular_destinations,
    seat_availability, top_rated_routes, Config, ResultSet, SeatAvailability, SqliteStore,
    StoreError,
};

/// Shared application state
#[derive(Clone)]
struct AppState {
    db: Arc<Mutex<SqliteStore>>,
}

impl AppState {
    /// Lock the store, recovering the guard if a handler panicked while holding it
    fn store(&self) -> MutexGuard<'_, SqliteStore> {
        self.db.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T) -> Response {
        (
            StatusCode::OK,
            Json(ApiResponse {
                success: true,
                data: Some(data),
                error: None,
            }),
        )
            .into_response()
    }
}

fn failure(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(message.into()),
        }),
    )
        .into_response()
}

fn store_failure(context: &str, err: StoreError) -> Response {
    error!(error = %err, "{}", context);
    failure(StatusCode::INTERNAL_SERVER_ERROR, context)
}

fn report(context: &str, result: Result<ResultSet, StoreError>) -> Response {
    match result {
        Ok(rows) => ApiResponse::ok(rows),
        Err(err) => store_failure(context, err),
    }
}

// ============================================================================
// Query parameters
// ============================================================================

#[derive(Deserialize)]
struct RouteParams {
    origin: String,
    destination: String,
}

#[derive(Deserialize)]
struct CountParams {
    k: String,
}

#[derive(Deserialize)]
struct DurationParams {
    origin: String,
    destination: String,
    limit: String,
}

#[derive(Deserialize)]
struct SeatParams {
    date: String,
}

#[derive(Serialize)]
struct SeatResponse {
    flightnum: String,
    date: String,
    seats: i64,
}

fn count_param(raw: &str) -> Result<u32, Response> {
    parse_count(raw.trim()).ok_or_else(|| {
        failure(
            StatusCode::BAD_REQUEST,
            format!("'{}' is not a non-negative whole number", raw),
        )
    })
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> Response {
    ApiResponse::ok("OK")
}

/// GET /api/flights?origin=&destination=
async fn list_flights(State(state): State<AppState>, Query(params): Query<RouteParams>) -> Response {
    let store = state.store();
    report(
        "Error listing flights",
        flights_between(&*store, params.origin.trim(), params.destination.trim()),
    )
}

/// GET /api/destinations/popular?k=
async fn list_popular(State(state): State<AppState>, Query(params): Query<CountParams>) -> Response {
    let k = match count_param(&params.k) {
        Ok(k) => k,
        Err(rejection) => return rejection,
    };
    let store = state.store();
    report("Error listing destinations", popular_destinations(&*store, k))
}

/// GET /api/routes/top-rated?k=
async fn list_top_rated(State(state): State<AppState>, Query(params): Query<CountParams>) -> Response {
    let k = match count_param(&params.k) {
        Ok(k) => k,
        Err(rejection) => return rejection,
    };
    let store = state.store();
    report("Error listing routes", top_rated_routes(&*store, k))
}

/// GET /api/flights/by-duration?origin=&destination=&limit=
async fn list_by_duration(
    State(state): State<AppState>,
    Query(params): Query<DurationParams>,
) -> Response {
    let limit = match count_param(&params.limit) {
        Ok(limit) => limit,
        Err(rejection) => return rejection,
    };
    let store = state.store();
    report(
        "Error listing flights",
        flights_by_duration(&*store, params.origin.trim(), params.destination.trim(), limit),
    )
}

/// GET /api/flights/:flightnum/seats?date=
async fn seats(
    State(state): State<AppState>,
    Path(flightnum): Path<String>,
    Query(params): Query<SeatParams>,
) -> Response {
    let flightnum = urlencoding::decode(&flightnum)
        .map(|decoded| decoded.into_owned())
        .unwrap_or(flightnum);

    let Some(date) = normalize_date(params.date.trim()) else {
        return failure(
            StatusCode::BAD_REQUEST,
            format!("'{}' is not a valid date (YYYY-MM-DD)", params.date),
        );
    };

    let store = state.store();
    match seat_availability(&*store, &flightnum, &date) {
        Ok(SeatAvailability::Available { seats }) => ApiResponse::ok(SeatResponse {
            flightnum,
            date,
            seats,
        }),
        Ok(SeatAvailability::FlightNotFound) => {
            failure(StatusCode::NOT_FOUND, format!("Flight {} not found", flightnum))
        }
        Err(err) => store_failure("Error checking seats", err),
    }
}

fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/flights", get(list_flights))
        .route("/flights/by-duration", get(list_by_duration))
        .route("/flights/:flightnum/seats", get(seats))
        .route("/destinations/popular", get(list_popular))
        .route("/routes/top-rated", get(list_top_rated))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut config = Config::from_env()?;
    if std::env::var_os(air_booking::config::ENV_LOG).is_none() {
        config.log_filter = "info".to_string();
    }
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .init();

    if !config.database_path.exists() {
        anyhow::bail!(
            "Database not found at {:?}; run `air-booking import <csv_dir>` first",
            config.database_path
        );
    }

    let store = SqliteStore::open(&config.database_path, config.busy_timeout)?;
    info!(path = %config.database_path.display(), "database opened");

    let state = AppState {
        db: Arc::new(Mutex::new(store)),
    };

    let listener = tokio::net::TcpListener::bind(config.server_addr.as_str()).await?;
    info!(addr = %config.server_addr, "server listening");

    axum::serve(listener, router(state)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_param() {
        assert_eq!(count_param("5").ok(), Some(5));
        assert_eq!(count_param(" 2 ").ok(), Some(2));
        assert_eq!(count_param("-1").unwrap_err().status(), StatusCode::BAD_REQUEST);
        assert_eq!(count_param("many").unwrap_err().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_store_lock_survives_poison() {
        let state = AppState {
            db: Arc::new(Mutex::new(SqliteStore::open_in_memory().unwrap())),
        };

        let poisoned = state.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoned.db.lock().unwrap();
            panic!("poison the lock");
        })
        .join();

        let store = state.store();
        assert!(flights_between(&*store, "LAX", "NRT").unwrap().is_empty());
    }
}

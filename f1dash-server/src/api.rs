//! REST API routes

use crate::error::ApiError;
use crate::state::AppState;
use crate::web_ui;
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use f1dash_core::model::{EventFormat, EventInfo, FIRST_SEASON, LAST_SEASON};
use f1dash_core::{build_dashboard, Dashboard, DashboardError, SessionKey, SessionType};
use serde::{Deserialize, Serialize};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(web_ui::dashboard_page))
        .route("/api/health", get(health))
        .route("/api/events", get(list_events))
        .route("/api/drivers", get(list_drivers))
        .route("/api/dashboard", get(dashboard))
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn session_key(year: i32, event: &str, session: &str) -> Result<SessionKey, DashboardError> {
    let session_type: SessionType = session.parse()?;
    SessionKey::new(year, event, session_type)
}

// === Health ===

#[derive(Serialize)]
struct Health {
    provider: String,
    cached_sessions: usize,
    cache_capacity: usize,
}

async fn health(State(state): State<AppState>) -> Json<Health> {
    let cache = state.cache.lock().await;
    Json(Health {
        provider: state.provider.name().to_string(),
        cached_sessions: cache.len(),
        cache_capacity: cache.capacity(),
    })
}

// === Event picker ===

#[derive(Deserialize)]
struct EventsQuery {
    year: i32,
}

/// Every event of the season except testing
async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> Result<Json<Vec<EventInfo>>, ApiError> {
    if !(FIRST_SEASON..=LAST_SEASON).contains(&query.year) {
        return Err(DashboardError::InvalidSelection(format!(
            "year {} outside {}..={}",
            query.year, FIRST_SEASON, LAST_SEASON
        ))
        .into());
    }

    let provider = state.provider.clone();
    let year = query.year;
    let schedule = tokio::task::spawn_blocking(move || provider.event_schedule(year)).await??;

    let events = schedule
        .into_iter()
        .filter(|event| event.format != EventFormat::Testing)
        .collect();
    Ok(Json(events))
}

// === Driver picker ===

#[derive(Deserialize)]
struct SessionQuery {
    year: i32,
    event: String,
    session: String,
}

#[derive(Serialize)]
struct DriversResponse {
    drivers: Vec<String>,
    /// Default selection: the first two codes
    driver1: Option<String>,
    driver2: Option<String>,
}

async fn list_drivers(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
) -> Result<Json<DriversResponse>, ApiError> {
    let key = session_key(query.year, &query.event, &query.session)?;
    let session = state.get_session(&key).await?;

    let drivers = session.drivers();
    Ok(Json(DriversResponse {
        driver1: drivers.first().cloned(),
        driver2: drivers.get(1).cloned(),
        drivers,
    }))
}

// === Dashboard ===

#[derive(Deserialize)]
struct DashboardQuery {
    year: i32,
    event: String,
    session: String,
    driver1: String,
    driver2: String,
}

async fn dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<Dashboard>, ApiError> {
    let key = session_key(query.year, &query.event, &query.session)?;
    let session = state.get_session(&key).await?;

    tracing::debug!(
        "Building dashboard for {}: {} vs {}",
        key,
        query.driver1,
        query.driver2
    );
    let dashboard = build_dashboard(&session, &query.driver1, &query.driver2, &state.animation)?;
    Ok(Json(dashboard))
}

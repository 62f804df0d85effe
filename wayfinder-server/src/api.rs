use std::sync::Arc;

use axum::error_handling::HandleErrorLayer;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use geojson::FeatureCollection;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::AcquireError;
use tokio::task::JoinError;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower::timeout::TimeoutLayer;
use tower::timeout::error::Elapsed;
use tower::{BoxError, ServiceBuilder};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use wayfinder_core::{Meters, NodeId, Route, RouteError, RouteQuery, find_route};

use crate::config::ServerConfig;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PathQuery {
    pub from: NodeId,
    pub to: NodeId,
}

#[derive(Debug, Serialize)]
pub struct PathResponse {
    pub path: Vec<[f64; 2]>,
    pub distance: Meters,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid query: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Route(#[from] RouteError),
    #[error("Routing pool closed: {0}")]
    Closed(#[from] AcquireError),
    #[error("Routing task failed: {0}")]
    Join(#[from] JoinError),
    #[error("Failed to encode route: {0}")]
    Encode(#[source] wayfinder_core::Error),
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::BadRequest(_) | Self::Route(RouteError::SameEndpoints(_)) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            Self::Route(RouteError::NoPath { .. }) => {
                (StatusCode::NOT_FOUND, "No path found".to_string())
            }
            Self::Route(RouteError::NoCoordinates { .. }) => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            Self::Route(RouteError::GraphBuild(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to build graph".to_string(),
            ),
            Self::Route(RouteError::Coordinates(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch coordinates".to_string(),
            ),
            Self::Closed(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Service unavailable".to_string(),
            ),
            Self::Join(_) | Self::Encode(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "route request failed");
        } else {
            tracing::debug!(%status, error = %self, "route request rejected");
        }

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let cors = if config.permissive_cors {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
    };

    Router::new()
        .route("/health", get(health))
        .route("/shortest-path", get(shortest_path))
        .route("/shortest-path/geojson", get(shortest_path_geojson))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .layer(TimeoutLayer::new(config.request_timeout()))
                .layer(GlobalConcurrencyLimitLayer::new(
                    config.max_concurrent_requests,
                )),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn handle_middleware_error(err: BoxError) -> (StatusCode, Json<ErrorResponse>) {
    if err.is::<Elapsed>() {
        (
            StatusCode::REQUEST_TIMEOUT,
            Json(ErrorResponse {
                error: "Request timed out".to_string(),
            }),
        )
    } else {
        tracing::error!(error = %err, "middleware failure");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                error: "Service unavailable".to_string(),
            }),
        )
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn shortest_path(
    State(state): State<AppState>,
    query: Result<Query<PathQuery>, QueryRejection>,
) -> Result<Json<PathResponse>, ApiError> {
    let route = route_for(state, query).await?;
    Ok(Json(PathResponse {
        path: route.path_coords(),
        distance: route.total_distance(),
    }))
}

async fn shortest_path_geojson(
    State(state): State<AppState>,
    query: Result<Query<PathQuery>, QueryRejection>,
) -> Result<Json<FeatureCollection>, ApiError> {
    let route = route_for(state, query).await?;
    route.to_geojson().map(Json).map_err(ApiError::Encode)
}

/// Runs the staged route query on the blocking pool
///
/// The request timeout only drops the waiting future, so the computation
/// keeps its `blocking` permit until it actually returns. Stalled store
/// reads therefore still count against `max_concurrent_requests`.
async fn route_for(
    state: AppState,
    query: Result<Query<PathQuery>, QueryRejection>,
) -> Result<Route, ApiError> {
    let Query(PathQuery { from, to }) = query?;
    let route_query = RouteQuery::new(from, to).with_selection(state.selection);
    let store = Arc::clone(&state.store);
    let permit = Arc::clone(&state.blocking).acquire_owned().await?;

    tracing::debug!(from, to, selection = ?state.selection, "computing shortest path");
    let route = tokio::task::spawn_blocking(move || {
        let route = find_route(store.as_ref(), &route_query);
        drop(permit);
        route
    })
    .await??;
    Ok(route)
}

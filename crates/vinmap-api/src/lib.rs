//! # vinmap-api
//!
//! HTTP API for the vinmap wine catalog: label analysis, the wine list
//! with its country map data, and admin-gated catalog edits.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, Method},
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use uuid::Uuid;

use vinmap_core::defaults::MAX_BODY_BYTES;
use vinmap_inference::{EnrichOptions, GatewayBackend};

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod services;

pub use config::{ServerConfig, StorageKind};
pub use error::ApiError;
pub use services::{AdminGate, WineStore};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub wines: WineStore,
    pub admin: AdminGate,
    pub gateway: Arc<dyn GatewayBackend>,
    pub enrich: Arc<EnrichOptions>,
}

/// Request ID generator using UUIDv7 (time-ordered).
#[derive(Clone, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::OPTIONS,
            Method::PATCH,
            Method::DELETE,
            Method::POST,
            Method::PUT,
        ])
        .allow_headers([
            HeaderName::from_static("x-csrf-token"),
            HeaderName::from_static("x-requested-with"),
            header::ACCEPT,
            HeaderName::from_static("accept-version"),
            header::CONTENT_LENGTH,
            HeaderName::from_static("content-md5"),
            header::CONTENT_TYPE,
            header::DATE,
            HeaderName::from_static("x-api-version"),
            header::AUTHORIZATION,
        ])
        .max_age(Duration::from_secs(3600))
}

/// Build the application router with its middleware stack.
pub fn build_router(state: AppState) -> Router {
    use handlers::{admin, analyze, meta, wines};

    Router::new()
        .route(
            "/api/analyze-wine",
            post(analyze::analyze_wine)
                .options(analyze::analyze_options)
                .fallback(analyze::method_not_allowed),
        )
        .route("/api/health", get(meta::health))
        .route("/api/countries", get(meta::countries))
        .route("/api/wines", get(wines::list_wines).post(wines::create_wine))
        .route(
            "/api/wines/:id",
            get(wines::get_wine)
                .patch(wines::update_wine)
                .delete(wines::delete_wine),
        )
        .route(
            "/api/admin/session",
            post(admin::login).delete(admin::logout),
        )
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(cors_layer()),
        )
        .with_state(state)
}

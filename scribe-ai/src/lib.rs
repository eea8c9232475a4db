//! scribe-ai library interface
//!
//! Stateless AI functions service: prompt templating, gateway relay and
//! reply reshaping. Exposed as a library so integration tests (and
//! scribe-pm's tests) can build the router around a fake gateway.

pub mod auth;
pub mod config;
pub mod error;
pub mod functions;
pub mod gateway;
pub mod health;
pub mod prompts;
pub mod reply;

pub use crate::error::{FunctionError, FunctionResult};
pub use crate::gateway::{ChatCompletion, ChatRequest, GatewayClient, GatewayError};

use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, Method,
    },
    middleware, Router,
};
use chrono::{DateTime, Utc};
use scribe_common::api::ServiceKey;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::FunctionSettings;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<dyn ChatCompletion>,
    pub settings: Arc<FunctionSettings>,
    pub service_key: ServiceKey,
    /// False when no gateway API key is configured (reported by /health)
    pub gateway_ready: bool,
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        gateway: Arc<dyn ChatCompletion>,
        settings: FunctionSettings,
        service_key: ServiceKey,
    ) -> Self {
        Self {
            gateway,
            settings: Arc::new(settings),
            service_key,
            gateway_ready: true,
            startup_time: Utc::now(),
        }
    }

    pub fn with_gateway_ready(mut self, ready: bool) -> Self {
        self.gateway_ready = ready;
        self
    }
}

/// Browser clients call the functions directly, so any origin is allowed
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            CONTENT_TYPE,
        ])
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(functions::function_routes().route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::service_auth,
        )))
        .merge(health::health_routes())
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

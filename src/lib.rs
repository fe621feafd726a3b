pub mod api;
pub mod config;
pub mod data;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod jsonlog;
pub mod middleware;
pub mod validator;

use axum::{
    http::{HeaderValue, Method},
    routing::get,
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::data::Models;
use crate::jsonlog::Logger;

/// Shared, cheaply cloned state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub logger: Logger,
    pub models: Models,
}

impl AppState {
    pub fn new(config: AppConfig, logger: Logger) -> Self {
        Self {
            config: Arc::new(config),
            logger,
            models: Models::new(),
        }
    }
}

pub fn app(state: AppState) -> Router {
    let routes = Router::new()
        .route(
            "/v1/healthcheck",
            get(handlers::healthcheck)
                .fallback(|method: Method| handlers::method_not_allowed(method, "GET, HEAD")),
        )
        .route(
            "/v1/movies",
            get(handlers::list_movies)
                .post(handlers::create_movie)
                .fallback(|method: Method| handlers::method_not_allowed(method, "GET, HEAD, POST")),
        )
        .route(
            "/v1/movies/:id",
            get(handlers::show_movie)
                .fallback(|method: Method| handlers::method_not_allowed(method, "GET, HEAD")),
        );

    with_middleware(routes, state)
}

/// Add the 404 fallback and the shared middleware stack to `routes`, then
/// bind the state.
pub fn with_middleware(routes: Router<AppState>, state: AppState) -> Router {
    routes
        .fallback(handlers::not_found)
        // Outermost first; panics are turned into 500s inside the error logger.
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&state.config))
                .layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    middleware::log_server_errors,
                ))
                .layer(CatchPanicLayer::custom(middleware::recover_panic)),
        )
        .with_state(state)
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    if !config.security.enable_cors {
        return CorsLayer::new();
    }
    if config.security.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();
    CorsLayer::new().allow_origin(AllowOrigin::list(origins))
}

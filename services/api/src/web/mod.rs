pub mod auth;
pub mod middleware;
pub mod protocol;
pub mod rest;
pub mod state;

pub use middleware::require_auth;
pub use rest::{
    create_thought_handler, delete_thought_handler, get_thought_handler, like_thought_handler,
    liked_thoughts_handler, list_thoughts_handler, unlike_thought_handler, update_thought_handler,
    welcome_handler,
};

use crate::config::{Config, ConfigError};
use auth::{login_handler, logout_handler, signup_handler};
use axum::{
    http::HeaderValue,
    middleware as axum_middleware,
    routing::{get, patch, post},
    Router,
};
use state::AppState;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Builds every API route. Mutating thought routes and logout sit behind
/// `require_auth`.
pub fn router(app_state: Arc<AppState>) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/", get(welcome_handler))
        .route("/thoughts", get(list_thoughts_handler))
        .route("/thoughts/{id}", get(get_thought_handler))
        .route("/thoughts/liked/{client_id}", get(liked_thoughts_handler))
        .route("/auth/signup", post(signup_handler))
        .route("/auth/login", post(login_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/thoughts", post(create_thought_handler))
        .route(
            "/thoughts/{id}",
            patch(update_thought_handler).delete(delete_thought_handler),
        )
        .route(
            "/thoughts/{id}/like",
            post(like_thought_handler).delete(unlike_thought_handler),
        )
        .route("/auth/logout", post(logout_handler))
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(app_state)
}

/// Allows any origin unless `CORS_ORIGIN` pins one.
pub fn cors_layer(config: &Config) -> Result<CorsLayer, ConfigError> {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match &config.cors_origin {
        Some(origin) => {
            let origin = origin.parse::<HeaderValue>().map_err(|e| {
                ConfigError::InvalidValue("CORS_ORIGIN".to_string(), e.to_string())
            })?;
            Ok(cors.allow_origin(origin))
        }
        None => Ok(cors.allow_origin(Any)),
    }
}

/// The router with CORS and request tracing applied.
pub fn app(app_state: Arc<AppState>) -> Result<Router, ConfigError> {
    let cors = cors_layer(&app_state.config)?;
    Ok(router(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http()))
}

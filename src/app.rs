use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{delete, get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::handlers::{prerequisites, schedule, system};
use crate::middleware::require_admin;
use crate::state::AppState;

/// Build the full router for `state` with layers driven by `config`.
pub fn app(state: AppState, config: &AppConfig) -> Router {
    let router = Router::new()
        // Public
        .route("/", get(system::root))
        .route("/health", get(system::health))
        // Admin only
        .merge(admin_routes(state.clone()))
        .layer(
            ServiceBuilder::new()
                .layer(RequestBodyLimitLayer::new(config.api.max_request_size_bytes))
                .layer(cors_layer(config)),
        );

    let router = if config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    };

    router.with_state(state)
}

fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/admin/course/:course_id/schedule", post(schedule::class_session_post))
        .route(
            "/api/admin/course/:course_id/schedule/:class_time_id",
            delete(schedule::class_session_delete),
        )
        .route(
            "/api/admin/course/:course_id/prerequisites",
            post(prerequisites::prerequisite_post),
        )
        .route(
            "/api/admin/course/:course_id/prerequisites/:prerequisite_id",
            delete(prerequisites::prerequisite_delete),
        )
        .route_layer(from_fn_with_state(state, require_admin))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

use axum::{middleware, routing::get, Router};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::error_routes;
use super::handlers::{health, AppState};
use super::middleware::logging_middleware;
use super::openapi::ApiDoc;
use crate::errors::{handle_panic, not_found, translate_errors};
use crate::metrics;

pub fn create_router(state: AppState) -> Router {
    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new()
        // Health check
        .route("/health", get(health).fallback(not_found))
        // Metrics endpoint (Prometheus)
        .route("/metrics", get(metrics::metrics_handler).fallback(not_found));

    if state.error_routes_enabled {
        router = router.merge(error_routes::routes());
    }

    // OpenAPI documentation
    let router = router
        .merge(SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // Logging and metrics sit outside the translation guard so they observe
    // the final status
    with_error_translation(router)
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(metrics::middleware::track_metrics))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        // Add shared state
        .with_state(state)
}

/// Install the not-found fallback, the panic handler and the translation
/// guard around every route registered so far.
pub fn with_error_translation<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router
        .fallback(not_found)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(middleware::from_fn(translate_errors))
}

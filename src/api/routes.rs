use axum::{
    middleware,
    routing::{get, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::middleware::{
    json_errors::method_not_allowed_as_json,
    request_id::{make_span_with_request_id, request_id_middleware},
};

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health_check))
        // Collection; the trailing-slash form is accepted too
        .route(
            "/recommendations",
            get(handlers::list_recommendations).post(handlers::create_recommendation),
        )
        .route(
            "/recommendations/",
            get(handlers::list_recommendations).post(handlers::create_recommendation),
        )
        // Single recommendation
        .route(
            "/recommendations/:id",
            get(handlers::get_recommendation)
                .put(handlers::update_recommendation)
                .delete(handlers::delete_recommendation),
        )
        // Feedback
        .route("/recommendations/:id/like", put(handlers::like_recommendation))
        .route(
            "/recommendations/:id/dislike",
            put(handlers::dislike_recommendation),
        )
        .fallback(handlers::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(middleware::map_response(method_not_allowed_as_json)),
        )
        .with_state(state)
}

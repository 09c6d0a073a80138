use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{
        header::{HOST, LOCATION},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::Html,
    Json,
};
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    models::{Counter, ListParams, Recommendation, RecommendationFilter, RecommendationPayload},
    services::recommendations,
};

use super::AppState;

const INDEX_HTML: &str = include_str!("../../static/index.html");

type IdParam = Result<Path<i64>, PathRejection>;
type JsonPayload = Result<Json<RecommendationPayload>, JsonRejection>;

fn location_for(headers: &HeaderMap, id: i64) -> String {
    let path = format!("/recommendations/{}", id);
    match headers.get(HOST).and_then(|host| host.to_str().ok()) {
        Some(host) => format!("http://{}{}", host, path),
        None => path,
    }
}

fn payload_or_reject(payload: JsonPayload) -> AppResult<RecommendationPayload> {
    let Json(payload) = payload.map_err(|rejection| {
        tracing::warn!(error = %rejection.body_text(), "Rejected request body");
        AppError::from(rejection)
    })?;
    tracing::debug!(payload = ?payload, "Payload");
    Ok(payload)
}

// Service endpoints

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    tracing::info!("Health check endpoint called");
    (StatusCode::OK, Json(json!({ "status": "OK" })))
}

/// Landing page
pub async fn index() -> Html<&'static str> {
    tracing::info!("Request for Root URL");
    Html(INDEX_HTML)
}

/// JSON 404 for anything the router does not know
pub async fn not_found() -> AppError {
    AppError::NotFound("The requested URL was not found on the server.".to_string())
}

// Recommendation collection

/// List recommendations, optionally filtered, sorted and paginated
pub async fn list_recommendations(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> AppResult<Json<Vec<Recommendation>>> {
    tracing::info!("Request to list Recommendations");
    let Query(params) = params?;
    let filter = RecommendationFilter::try_from(params).map_err(|e| {
        tracing::warn!(error = %e, "Rejected list query");
        e
    })?;

    let records = recommendations::list_recommendations(state.store.as_ref(), &filter).await?;
    Ok(Json(records))
}

/// Create a recommendation; responds 201 with its location
pub async fn create_recommendation(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: JsonPayload,
) -> AppResult<(StatusCode, HeaderMap, Json<Recommendation>)> {
    tracing::info!("Request to Create a Recommendation");
    let payload = payload_or_reject(payload)?;

    let record = recommendations::create_recommendation(state.store.as_ref(), payload).await?;

    let mut response_headers = HeaderMap::new();
    let location = HeaderValue::from_str(&location_for(&headers, record.id))
        .map_err(|e| AppError::Internal(e.to_string()))?;
    response_headers.insert(LOCATION, location);

    Ok((StatusCode::CREATED, response_headers, Json(record)))
}

// Single recommendation

/// Fetch one recommendation
pub async fn get_recommendation(
    State(state): State<AppState>,
    id: IdParam,
) -> AppResult<Json<Recommendation>> {
    let Path(id) = id?;
    tracing::info!(id, "Request to Retrieve a recommendation");
    let record = recommendations::get_recommendation(state.store.as_ref(), id).await?;
    Ok(Json(record))
}

/// Replace a recommendation's mutable fields
pub async fn update_recommendation(
    State(state): State<AppState>,
    id: IdParam,
    payload: JsonPayload,
) -> AppResult<Json<Recommendation>> {
    let Path(id) = id?;
    tracing::info!(id, "Request to Update a recommendation");
    let payload = payload_or_reject(payload)?;

    let record = recommendations::update_recommendation(state.store.as_ref(), id, payload).await?;
    Ok(Json(record))
}

/// Delete a recommendation; 204 whether or not it existed
pub async fn delete_recommendation(
    State(state): State<AppState>,
    id: IdParam,
) -> AppResult<StatusCode> {
    let Path(id) = id?;
    tracing::info!(id, "Request to Delete a recommendation");
    recommendations::delete_recommendation(state.store.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Feedback actions

/// Add one like to a recommendation and return it.
/// 404 for an unknown id; 500 if the counter is already at `i32::MAX`.
pub async fn like_recommendation(
    State(state): State<AppState>,
    id: IdParam,
) -> AppResult<Json<Recommendation>> {
    let Path(id) = id?;
    tracing::info!(id, "Request to like a recommendation");
    let record = recommendations::record_feedback(state.store.as_ref(), id, Counter::Like).await?;
    Ok(Json(record))
}

/// Add one dislike to a recommendation; same responses as [`like_recommendation`]
pub async fn dislike_recommendation(
    State(state): State<AppState>,
    id: IdParam,
) -> AppResult<Json<Recommendation>> {
    let Path(id) = id?;
    tracing::info!(id, "Request to dislike a recommendation");
    let record =
        recommendations::record_feedback(state.store.as_ref(), id, Counter::Dislike).await?;
    Ok(Json(record))
}

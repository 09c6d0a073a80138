use axum::{
    http::{
        header::{ALLOW, CONTENT_TYPE},
        StatusCode,
    },
    response::{IntoResponse, Response},
};

use crate::error::AppError;

/// Rewrites the router's bodyless 405 into the JSON error shape every other
/// error uses. The `Allow` header is carried over.
pub async fn method_not_allowed_as_json(response: Response) -> Response {
    if response.status() != StatusCode::METHOD_NOT_ALLOWED
        || response.headers().contains_key(CONTENT_TYPE)
    {
        return response;
    }

    let allow = response.headers().get(ALLOW).cloned();
    let mut rewritten = AppError::MethodNotAllowed(
        "The method is not allowed for the requested URL.".to_string(),
    )
    .into_response();
    if let Some(allow) = allow {
        rewritten.headers_mut().insert(ALLOW, allow);
    }
    rewritten
}

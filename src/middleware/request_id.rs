use axum::{
    body::Body,
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

/// Lets a caller correlate a recommendations call with the service log lines it produced
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Correlation id for one API call. Handlers never read it; only the
/// `recommendations_request` span and the echoed header do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequestId(pub Uuid);

impl RequestId {
    /// Keeps the caller's id if it parses as a UUID. Anything else, including
    /// free-form ids from upstream proxies, is replaced with a new v4 id.
    pub fn from_request(request: &Request) -> Self {
        request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value).ok())
            .map(RequestId)
            .unwrap_or_else(|| RequestId(Uuid::new_v4()))
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outermost layer of the recommendations router. Error responses built from
/// `AppError` carry the header as well, since it is set after the handler runs.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = RequestId::from_request(&request);
    request.extensions_mut().insert(request_id);

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

/// `recommendations_request` span for `TraceLayer`. Handler events such as
/// "Request to like a recommendation" are emitted inside it. The id reads
/// `unknown` when the router is built without [`request_id_middleware`].
pub fn make_span_with_request_id(request: &Request<Body>) -> tracing::Span {
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map_or_else(|| "unknown".to_string(), RequestId::to_string);

    // Path only; list filters in the query string stay out of the span
    tracing::info_span!(
        "recommendations_request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id,
    )
}

//! Middleware stack for the command surface
//!
//! Every request gets an id, echoed back in `x-request-id`, and one span
//! naming the caller. There is no request timeout: a restore must not be
//! dropped mid-commit.

use axum::{
    body::Body,
    http::{HeaderName, Request},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    classify::ServerErrorsFailureClass,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

use crate::extractors::ACTOR_ID_HEADER;
use crate::state::AppState;

/// Header name for request ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

fn header_str<'a>(request: &'a Request<Body>, name: &str) -> &'a str {
    request
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
}

fn command_span(request: &Request<Body>) -> Span {
    tracing::info_span!(
        "command",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %header_str(request, REQUEST_ID_HEADER),
        actor = %header_str(request, ACTOR_ID_HEADER.as_str()),
    )
}

/// Apply middleware stack to the router
pub fn apply_middleware(router: Router<AppState>) -> Router<AppState> {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    router.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
            .layer(PropagateRequestIdLayer::new(request_id))
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(command_span)
                    .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                    .on_response(DefaultOnResponse::new().level(Level::INFO))
                    .on_failure(
                        |class: ServerErrorsFailureClass, latency: std::time::Duration, _: &Span| {
                            tracing::warn!(
                                classification = %class,
                                latency_ms = latency.as_millis(),
                                "Command failed"
                            );
                        },
                    ),
            ),
    )
}

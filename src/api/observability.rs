use crate::api::AppState;
use axum::{
    extract::{MatchedPath, Request, State},
    http::HeaderValue,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{Instrument, Span, info, info_span};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Response extension naming the flight a handler served, so the request
/// log can carry its pk.
#[derive(Debug, Clone, Copy)]
pub struct ServedFlight(pub i32);

pub async fn get_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.prometheus_handle.as_ref().map_or_else(
        || "Metrics not enabled or failed to initialize".to_string(),
        metrics_exporter_prometheus::PrometheusHandle::render,
    )
}

/// Coarse classification of a request for the `flight_api_requests_total`
/// counter. `None` for routes outside the flight service.
fn flight_operation(method: &str, route: &str) -> Option<&'static str> {
    match (method, route) {
        ("GET", "/api/flight-service/flights") => Some("lookup"),
        ("POST", "/api/flight-service/flights") => Some("create"),
        ("GET", "/api/flight-service/flights/all") => Some("list"),
        ("GET", "/api/flight-service/flights/{pk}") => Some("retrieve"),
        ("PUT", "/api/flight-service/flights/{pk}") => Some("update"),
        ("DELETE", "/api/flight-service/flights/{pk}") => Some("delete"),
        _ => None,
    }
}

pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let request_id = Uuid::new_v4().to_string();

    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|mp| mp.as_str().to_string());
    let operation = route
        .as_deref()
        .and_then(|route| flight_operation(&method, route));

    let span = info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        path = %path,
        route = route.clone(),
        operation = operation,
        flight_pk = tracing::field::Empty,
    );

    async move {
        let mut response = next.run(req).await;

        let elapsed = start.elapsed();
        let status = response.status();

        if let Some(ServedFlight(pk)) = response.extensions().get::<ServedFlight>().copied() {
            Span::current().record("flight_pk", pk);
        }
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response.headers_mut().insert(REQUEST_ID_HEADER, value);
        }

        // route keeps label cardinality bounded; unmatched paths share one label
        let labels = [
            ("method", method),
            ("path", route.unwrap_or_else(|| "unmatched".to_string())),
            ("status", status.as_u16().to_string()),
        ];
        metrics::counter!("http_requests_total", &labels).increment(1);
        metrics::histogram!("http_request_duration_seconds", &labels)
            .record(elapsed.as_secs_f64());

        if let Some(operation) = operation {
            let outcome = if status.is_success() { "ok" } else { "rejected" };
            metrics::counter!(
                "flight_api_requests_total",
                "operation" => operation,
                "outcome" => outcome
            )
            .increment(1);
        }

        info!(
            duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            status_code = status.as_u16(),
            "Request finished"
        );

        response
    }
    .instrument(span)
    .await
}

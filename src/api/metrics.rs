use actix_web::{http::StatusCode, HttpResponse};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

static REQUEST_COUNT: AtomicU64 = AtomicU64::new(0);
static ERROR_COUNT: AtomicU64 = AtomicU64::new(0);

pub fn increment_request_count() {
    REQUEST_COUNT.fetch_add(1, Ordering::Relaxed);
}

pub fn increment_error_count() {
    ERROR_COUNT.fetch_add(1, Ordering::Relaxed);
}

/// Counts one finished request; 4xx and 5xx also count as errors
pub fn record(status: StatusCode) {
    increment_request_count();
    if status.is_client_error() || status.is_server_error() {
        increment_error_count();
    }
}

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct MetricsResponse {
    pub http_requests_total: u64,
    pub http_errors_total: u64,
}

fn render(requests: u64, errors: u64) -> String {
    format!(
        "# HELP http_requests_total Total number of HTTP requests\n\
         # TYPE http_requests_total counter\n\
         http_requests_total {}\n\
         \n\
         # HELP http_errors_total Total number of HTTP errors\n\
         # TYPE http_errors_total counter\n\
         http_errors_total {}\n",
        requests, errors
    )
}

#[utoipa::path(
    get,
    path = "/metrics",
    tag = "Health",
    responses(
        (status = 200, description = "Prometheus counters", body = MetricsResponse)
    )
)]
pub async fn get_metrics() -> HttpResponse {
    let requests = REQUEST_COUNT.load(Ordering::Relaxed);
    let errors = ERROR_COUNT.load(Ordering::Relaxed);

    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(render(requests, errors))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_are_counted_with_requests() {
        let before_requests = REQUEST_COUNT.load(Ordering::Relaxed);
        let before_errors = ERROR_COUNT.load(Ordering::Relaxed);

        record(StatusCode::OK);
        record(StatusCode::NOT_FOUND);

        assert!(REQUEST_COUNT.load(Ordering::Relaxed) >= before_requests + 2);
        assert!(ERROR_COUNT.load(Ordering::Relaxed) >= before_errors + 1);
    }

    #[test]
    fn output_is_prometheus_text() {
        let text = render(12, 3);
        assert!(text.contains("# TYPE http_requests_total counter"));
        assert!(text.contains("http_requests_total 12\n"));
        assert!(text.contains("http_errors_total 3\n"));
    }
}

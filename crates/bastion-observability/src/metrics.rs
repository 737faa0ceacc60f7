use std::time::{Duration, Instant};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
    routing::get,
};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Installs the global Prometheus recorder and spawns its upkeep task.
///
/// Until this runs every `track_*` call is a no-op.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    let upkeep_handle = handle.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(5)).await;
            upkeep_handle.run_upkeep();
        }
    });

    Ok(handle)
}

/// `GET /metrics` in Prometheus text format.
pub fn metrics_router<S>(handle: PrometheusHandle) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/metrics", get(move || async move { handle.render() }))
}

/// Label used for requests that matched no route, so 404 scans cannot
/// create a series per requested path.
pub const UNMATCHED_ROUTE: &str = "unmatched";

/// The route template (`/api/v1/user/info`), never the raw path.
fn route_label(req: &Request) -> String {
    req.extensions()
        .get::<MatchedPath>()
        .map_or_else(|| UNMATCHED_ROUTE.to_owned(), |p| p.as_str().to_owned())
}

pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().as_str().to_owned();
    let path = route_label(&req);

    let response = next.run(req).await;

    let status = response.status().as_u16().to_string();
    counter!("http_requests_total", "method" => method.clone(), "path" => path.clone(), "status" => status)
        .increment(1);
    histogram!("http_request_duration_seconds", "method" => method, "path" => path)
        .record(start.elapsed().as_secs_f64());

    response
}

// Business metrics

pub fn track_token_issued(reason: &'static str) {
    counter!("auth_tokens_issued_total", "reason" => reason).increment(1);
}

pub fn track_token_refreshed() {
    counter!("auth_silent_refresh_total").increment(1);
}

/// `outcome` is one of `hit`, `miss`, `corrupt` or `error`.
pub fn track_role_cache(outcome: &'static str) {
    counter!("role_cache_lookups_total", "outcome" => outcome).increment(1);
}

pub fn track_login_success() {
    counter!("user_logins_total", "status" => "success").increment(1);
}

pub fn track_login_failure(reason: &'static str) {
    counter!("user_logins_total", "status" => "failure", "reason" => reason).increment(1);
}

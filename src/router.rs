use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method, header},
    middleware,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
};

use bastion_auth::NEW_TOKEN_HEADER;
use bastion_config::CorsConfig;
use bastion_observability::{
    PrometheusHandle, REQUEST_ID_HEADER, logging_middleware, metrics_middleware, metrics_router,
};

use crate::middleware::{deadline::request_deadline, recovery::handle_panic};
use crate::modules::{hello::init_hello_router, users::router::init_users_router};
use crate::state::AppState;

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static("token"),
        ])
        .expose_headers([
            NEW_TOKEN_HEADER,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ]);

    // credentials cannot be combined with a wildcard origin
    if config.allows_any() {
        layer.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        layer.allow_origin(origins).allow_credentials(true)
    }
}

/// Builds the full application router.
///
/// `metrics` is `None` when no Prometheus recorder is installed (tests, or a
/// second recorder in the same process), and `/metrics` is then not served.
pub fn init_router(state: AppState, metrics: Option<PrometheusHandle>) -> Router {
    let api = Router::new()
        .merge(init_hello_router())
        .nest("/user", init_users_router(&state));

    let mut app = Router::new()
        .nest("/api/v1", api)
        .with_state(state.clone());

    if let Some(handle) = metrics {
        app = app.merge(metrics_router(handle));
    }

    // layers wrap outward: the last one added sees the request first
    app.layer(middleware::from_fn_with_state(
        state.config.server.request_timeout(),
        request_deadline,
    ))
    .layer(cors_layer(&state.config.cors))
    .layer(CatchPanicLayer::custom(handle_panic))
    .layer(middleware::from_fn(metrics_middleware))
    .layer(middleware::from_fn(logging_middleware))
}

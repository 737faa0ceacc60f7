//! # Bastion Observability
//!
//! - [`logging`]: subscriber setup and per-request logging middleware
//! - [`metrics`]: Prometheus recorder, HTTP metrics middleware and business counters
//!
//! ```ignore
//! let _guard = bastion_observability::init_logging(&config.log, config.mode)?;
//! let handle = bastion_observability::init_metrics()?;
//! ```

pub mod logging;
pub mod metrics;

pub use logging::{LoggingError, REQUEST_ID_HEADER, init_logging, logging_middleware};
pub use metrics::{
    init_metrics, metrics_middleware, metrics_router, track_login_failure, track_login_success,
    track_role_cache, track_token_issued, track_token_refreshed,
};
pub use metrics_exporter_prometheus::PrometheusHandle;

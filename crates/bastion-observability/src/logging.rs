use std::{fs, io, time::Instant};

use axum::{
    extract::{MatchedPath, Request},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use tracing::{Level, error, info, warn};
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

use bastion_config::{LogConfig, ServerMode};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("failed to create log directory {path}: {source}")]
    LogDir { path: String, source: io::Error },
    #[error("failed to install tracing subscriber: {0}")]
    Install(#[from] tracing_subscriber::util::TryInitError),
}

fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{level},tower_http=warn,hyper=warn,h2=warn,sqlx=warn,redis=warn"
        ))
    })
}

/// Installs the global subscriber: a console layer (compact in dev, JSON in
/// prod) when `config.stdout` is set, plus a daily rolling JSON file.
///
/// Keep the returned guard alive for the life of the process; dropping it
/// flushes and stops the file writer.
pub fn init_logging(config: &LogConfig, mode: ServerMode) -> Result<WorkerGuard, LoggingError> {
    fs::create_dir_all(&config.dir).map_err(|source| LoggingError::LogDir {
        path: config.dir.display().to_string(),
        source,
    })?;

    let appender = RollingFileAppender::new(Rotation::DAILY, &config.dir, &config.file);
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

    layers.push(
        fmt::layer()
            .json()
            .with_writer(file_writer)
            .with_current_span(true)
            .with_ansi(false)
            .with_filter(filter(&config.level))
            .boxed(),
    );

    if config.stdout {
        let console = match mode {
            ServerMode::Prod => fmt::layer()
                .json()
                .with_target(true)
                .with_filter(filter(&config.level))
                .boxed(),
            ServerMode::Dev | ServerMode::Test => fmt::layer()
                .compact()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_filter(filter(&config.level))
                .boxed(),
        };
        layers.push(console);
    }

    tracing_subscriber::registry().with(layers).try_init()?;

    info!(
        mode = %mode,
        level = %config.level,
        dir = %config.dir.display(),
        "Logging initialized"
    );
    Ok(guard)
}

fn level_for(status: u16) -> Level {
    match status {
        500..=599 => Level::ERROR,
        300..=499 => Level::WARN,
        _ => Level::INFO,
    }
}

/// Logs one line per request with its id, route, status and latency.
///
/// Reuses an incoming `x-request-id` when present and echoes it back.
pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let mut response = next.run(req).await;
    let latency_ms = start.elapsed().as_millis() as u64;
    let status = response.status().as_u16();

    let level = level_for(status);
    if level == Level::ERROR {
        error!(%request_id, %method, %path, status, latency_ms, "Server error");
    } else if level == Level::WARN {
        warn!(%request_id, %method, %path, status, latency_ms, "Client error");
    } else {
        info!(%request_id, %method, %path, status, latency_ms, "Request completed");
    }

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

//! Tracing subscriber assembly.

use std::iter;

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_subscriber::{
    EnvFilter, Layer, Registry, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::config::{
    ServerConfig,
    observability::{LogFormat, LoggingConfig},
};

use super::ObservabilityError;

/// Dependencies whose info-level chatter drowns out request logs.
const QUIET_TARGETS: [&str; 7] = [
    "h2",
    "hyper",
    "tower",
    "tonic",
    "opentelemetry",
    "sqlx",
    "reqwest",
];

type FmtLayer = Box<dyn Layer<Registry> + Send + Sync>;

pub(super) fn init_subscriber(
    config: &ServerConfig,
    tracer_provider: Option<&SdkTracerProvider>,
) -> Result<(), ObservabilityError> {
    let otel_layer = tracer_provider.map(|provider| {
        tracing_opentelemetry::layer()
            .with_tracer(provider.tracer(config.observability.otel.service_name.clone()))
    });

    tracing_subscriber::registry()
        .with(fmt_layer(&config.logging))
        .with(otel_layer)
        .with(env_filter(&config.logging.log_level))
        .try_init()?;

    Ok(())
}

fn fmt_layer(config: &LoggingConfig) -> FmtLayer {
    let layer = tracing_subscriber::fmt::layer()
        .with_ansi(config.log_ansi)
        .with_target(true);

    match config.log_format {
        LogFormat::Compact => layer
            .compact()
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        LogFormat::Pretty => layer.pretty().boxed(),
        LogFormat::Json => layer
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .boxed(),
    }
}

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(level)))
}

fn default_directives(level: &str) -> String {
    iter::once(level.to_string())
        .chain(QUIET_TARGETS.iter().map(|target| format!("{target}=warn")))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::default_directives;

    #[test]
    fn noisy_dependencies_are_capped_at_warn() {
        let directives = default_directives("debug");

        assert!(directives.starts_with("debug,"), "base level first: {directives}");
        assert!(directives.contains("sqlx=warn"), "sqlx quieted: {directives}");
        assert!(directives.contains("reqwest=warn"), "reqwest quieted: {directives}");
    }
}

//! OTLP tracer provider.

use std::time::Duration;

use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    Resource,
    trace::{RandomIdGenerator, Sampler, SdkTracerProvider},
};

use crate::config::observability::OtelConfig;

use super::ObservabilityError;

pub(super) fn build_tracer_provider(
    config: &OtelConfig,
) -> Result<SdkTracerProvider, ObservabilityError> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(config.endpoint.clone())
        .with_timeout(Duration::from_secs(config.timeout_secs))
        .build()?;

    let resource = Resource::builder_empty()
        .with_service_name(config.service_name.clone())
        .with_attributes([
            KeyValue::new("service.namespace", "dispatch"),
            KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
            KeyValue::new("deployment.environment.name", config.environment.clone()),
        ])
        .build();

    Ok(SdkTracerProvider::builder()
        .with_sampler(Sampler::ParentBased(Box::new(Sampler::TraceIdRatioBased(
            sample_ratio(config.sample_ratio),
        ))))
        .with_id_generator(RandomIdGenerator::default())
        .with_resource(resource)
        .with_batch_exporter(exporter)
        .build())
}

/// Out-of-range ratios are clamped; NaN keeps every trace.
fn sample_ratio(configured: f64) -> f64 {
    if configured.is_nan() {
        1.0
    } else {
        configured.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::sample_ratio;

    #[test]
    fn ratio_is_kept_within_bounds() {
        let cases = [(1.5, 1.0), (-0.2, 0.0), (0.25, 0.25), (f64::NAN, 1.0)];

        for (configured, expected) in cases {
            assert!(
                (sample_ratio(configured) - expected).abs() < f64::EPSILON,
                "{configured} should sample at {expected}"
            );
        }
    }
}

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use log_enricher::agent::LocalAgent;
use log_enricher::app::EnrichmentConfig;
use log_enricher::domain::{ErrorValue, LogRecord};
use log_enricher::enricher::{EnrichmentMode, LogEnricher};
use log_enricher::format::{FormatChainHost, FormatOptions, create_formatter};
use serde_json::json;
use std::sync::Arc;

fn bench_config() -> EnrichmentConfig {
    EnrichmentConfig {
        app_name: vec!["bench-service".to_string()],
        entity_guid: Some("MXxBUE18QVBQTElDQVRJT058MTIz".to_string()),
        hostname: Some("bench-host".to_string()),
        ..Default::default()
    }
}

fn sample_record() -> LogRecord {
    LogRecord::new()
        .with("message", "GET /api/users completed")
        .with("level", "info")
        .with("timestamp", "2023-12-25T10:00:00.000Z")
        .with("status", 200)
}

fn exception_record() -> LogRecord {
    LogRecord::new()
        .with("message", "request failed")
        .with("level", "error")
        .with("exception", true)
        .with("stack", "Error: request failed\n    at handler")
        .with_error(ErrorValue::from_value(json!({
            "name": "Error",
            "message": "connection refused",
            "stack": "Error: connection refused\n    at connect",
            "constructor": "ConnectionError"
        })))
}

fn benchmark_enrichment_modes(c: &mut Criterion) {
    let agent = Arc::new(LocalAgent::new(bench_config()));
    let enricher = LogEnricher::new(agent.clone());
    let record = sample_record();

    let mut group = c.benchmark_group("enrich_modes");
    group.throughput(Throughput::Elements(1));

    for mode in [
        EnrichmentMode::Disabled,
        EnrichmentMode::LogEnricher,
        EnrichmentMode::LocalDecorating,
    ] {
        group.bench_function(mode.as_str(), |b| {
            b.iter(|| enricher.enrich_with_mode(std::hint::black_box(record.clone()), mode));
        });
    }

    group.bench_function("exception", |b| {
        let record = exception_record();
        b.iter(|| {
            enricher.enrich_with_mode(
                std::hint::black_box(record.clone()),
                EnrichmentMode::LogEnricher,
            )
        });
    });

    group.finish();
}

fn benchmark_format_chain(c: &mut Criterion) {
    let mut config = bench_config();
    config.application_logging.enabled = false;
    let agent = Arc::new(LocalAgent::new(config));
    let formatter = create_formatter(agent, &FormatChainHost::new());
    let options = FormatOptions::default();
    let record = sample_record();

    c.bench_function("format_chain_render", |b| {
        b.iter(|| formatter.transform(std::hint::black_box(record.clone()), &options));
    });
}

criterion_group!(benches, benchmark_enrichment_modes, benchmark_format_chain);
criterion_main!(benches);

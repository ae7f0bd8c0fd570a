use log_enricher::agent::{LocalAgent, StubAgent};
use log_enricher::app::EnrichmentConfig;
use log_enricher::enricher::metrics;
use log_enricher::hooks::EnrichmentLayer;
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::io;
use std::sync::Arc;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::prelude::*;

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    fn lines(&self) -> Vec<Value> {
        let bytes = self.0.lock().clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }
}

impl io::Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for SharedBuffer {
    type Writer = SharedBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn local_agent() -> Arc<LocalAgent> {
    Arc::new(LocalAgent::new(EnrichmentConfig {
        app_name: vec!["svc".to_string()],
        hostname: Some("h1".to_string()),
        ..Default::default()
    }))
}

#[test]
fn test_layer_writes_enriched_lines() {
    let agent = local_agent();
    let buffer = SharedBuffer::default();
    let subscriber =
        tracing_subscriber::registry().with(EnrichmentLayer::new(agent.clone(), buffer.clone()));

    tracing::subscriber::with_default(subscriber, || {
        let _guard = agent.start_segment(None);
        tracing::info!(user = "alice", attempt = 2, "hello");

        let err = io::Error::other("disk full");
        tracing::error!(error = &err as &(dyn std::error::Error + 'static), "write failed");
    });

    let lines = buffer.lines();
    assert_eq!(lines.len(), 2);

    let info = &lines[0];
    assert_eq!(info["level"], json!(30));
    assert_eq!(info["message"], json!("hello"));
    assert_eq!(info["user"], json!("alice"));
    assert_eq!(info["attempt"], json!(2));
    assert_eq!(info["entity.name"], json!("svc"));
    assert_eq!(info["hostname"], json!("h1"));
    assert!(info["trace.id"].is_string());
    assert!(info["timestamp"].is_string());

    let error = &lines[1];
    assert_eq!(error["level"], json!(50));
    assert_eq!(error["message"], json!("write failed"));
    assert_eq!(error["error.message"], json!("disk full"));
    assert_eq!(error["error.class"], json!("Error"));
    assert!(error.get("err").is_none());

    let counters = agent.in_memory_metrics();
    assert_eq!(counters.call_count(metrics::HOOKS_ENRICHER), 1);
    assert_eq!(counters.call_count("Logging/lines"), 2);
    assert_eq!(counters.call_count("Logging/lines/info"), 1);
    assert_eq!(counters.call_count("Logging/lines/error"), 1);
}

#[test]
fn test_layer_without_agent_uses_plain_keys() {
    let buffer = SharedBuffer::default();
    let subscriber = tracing_subscriber::registry()
        .with(EnrichmentLayer::new(Arc::new(StubAgent::new()), buffer.clone()));

    tracing::subscriber::with_default(subscriber, || {
        tracing::warn!("careful");
    });

    let lines = buffer.lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["level"], json!(40));
    assert_eq!(lines[0]["msg"], json!("careful"));
    assert!(lines[0]["time"].is_i64());
    assert!(lines[0].get("entity.name").is_none());
}

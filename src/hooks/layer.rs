use super::{ERR_KEY, EnricherHooks, create_hooks};
use crate::agent::Agent;
use crate::domain::{ErrorValue, LogLevel};
use crate::enricher::{Clock, system_clock};
use serde_json::{Map, Value};
use std::fmt;
use std::io::Write;
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::{Context, Layer};

/// Key used for the event message when no hooks are installed.
const DEFAULT_MESSAGE_KEY: &str = "msg";

/// A `tracing` layer that renders each event as one hook-enriched JSON line.
///
/// Lines start with the numeric level and the timestamp fragment, followed
/// by the mixin fields and the event's own fields. Event fields win over
/// mixin fields of the same name.
pub struct EnrichmentLayer<W> {
    hooks: Option<EnricherHooks>,
    clock: Clock,
    make_writer: W,
}

impl<W> EnrichmentLayer<W>
where
    W: for<'a> MakeWriter<'a> + 'static,
{
    pub fn new(agent: Arc<dyn Agent>, make_writer: W) -> Self {
        Self::with_hooks(create_hooks(agent), make_writer)
    }

    pub fn with_hooks(hooks: Option<EnricherHooks>, make_writer: W) -> Self {
        Self {
            hooks,
            clock: system_clock(),
            make_writer,
        }
    }

    /// Clock for the plain `time` field used without hooks.
    pub fn with_clock(mut self, clock: impl Fn() -> i64 + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn hooks(&self) -> Option<&EnricherHooks> {
        self.hooks.as_ref()
    }

    /// Renders one line from the event's level and recorded fields.
    pub fn render(&self, level: LogLevel, mut fields: Map<String, Value>) -> String {
        let mut line = format!(r#"{{"level":{}"#, level.number());

        let body = match &self.hooks {
            Some(hooks) => {
                line.push_str(&hooks.timestamp());
                let mut body = hooks.mixin();
                body.extend(hooks.format_log(fields));
                body
            }
            None => {
                line.push_str(&format!(r#","time":{}"#, (self.clock)()));
                if let Some(message) = fields.remove(MESSAGE_FIELD) {
                    fields.insert(DEFAULT_MESSAGE_KEY.to_string(), message);
                }
                fields
            }
        };

        for (key, value) in &body {
            match (serde_json::to_string(key), serde_json::to_string(value)) {
                (Ok(key), Ok(value)) => {
                    line.push(',');
                    line.push_str(&key);
                    line.push(':');
                    line.push_str(&value);
                }
                (Err(e), _) | (_, Err(e)) => {
                    tracing::warn!("Failed to encode log field {}: {}", key, e);
                }
            }
        }

        line.push('}');
        line
    }
}

/// Name `tracing` gives the formatted event message.
const MESSAGE_FIELD: &str = "message";

impl<S, W> Layer<S> for EnrichmentLayer<W>
where
    S: Subscriber,
    W: for<'a> MakeWriter<'a> + 'static,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = JsonVisitor::default();
        event.record(&mut visitor);

        let level = LogLevel::from(event.metadata().level());
        let line = match &self.hooks {
            Some(hooks) => hooks.log_method(level.as_str(), || self.render(level, visitor.fields)),
            None => self.render(level, visitor.fields),
        };

        let mut writer = self.make_writer.make_writer();
        if let Err(e) = writeln!(writer, "{line}") {
            eprintln!("Failed to write enriched log line: {e}");
        }
    }
}

/// Collects event fields as JSON values. Errors go under `err`.
#[derive(Default)]
struct JsonVisitor {
    fields: Map<String, Value>,
}

impl JsonVisitor {
    fn insert(&mut self, field: &Field, value: Value) {
        self.fields.insert(field.name().to_string(), value);
    }
}

impl Visit for JsonVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, Value::from(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, Value::from(value));
    }

    fn record_error(&mut self, _field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.fields
            .insert(ERR_KEY.to_string(), ErrorValue::from_dyn(value).to_value());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.insert(field, Value::String(format!("{value:?}")));
    }
}

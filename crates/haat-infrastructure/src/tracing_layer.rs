//! Tracing layer that streams search diagnostics to a channel.
//!
//! Renderers (the CLI's `--events` mode, a dev overlay) subscribe to the
//! receiving end and show what the orchestrator is doing live: tokens issued,
//! stale completions dropped, backend failures swallowed.

use std::collections::BTreeMap;

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{Event, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;

/// Only events from these target prefixes are forwarded.
const FORWARDED_TARGET_PREFIX: &str = "haat";

/// One forwarded event.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DiagnosticEvent {
    /// Module path, e.g. `haat_application::orchestrator`.
    pub target: String,
    pub level: String,
    pub message: String,
    pub fields: BTreeMap<String, Value>,
    /// Name of the innermost span the event was recorded in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<String>,
    pub timestamp: String,
}

pub struct DiagnosticsLayer {
    sender: mpsc::UnboundedSender<DiagnosticEvent>,
}

impl DiagnosticsLayer {
    pub fn new(sender: mpsc::UnboundedSender<DiagnosticEvent>) -> Self {
        Self { sender }
    }
}

impl<S> Layer<S> for DiagnosticsLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if !metadata.target().starts_with(FORWARDED_TARGET_PREFIX) {
            return;
        }

        let mut fields = BTreeMap::new();
        event.record(&mut FieldVisitor(&mut fields));
        let message = match fields.remove("message") {
            Some(Value::String(message)) => message,
            Some(other) => other.to_string(),
            None => String::new(),
        };

        let diagnostic = DiagnosticEvent {
            target: metadata.target().to_string(),
            level: metadata.level().to_string(),
            message,
            fields,
            span: ctx.event_span(event).map(|span| span.name().to_string()),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        // Receiver gone means nobody is watching.
        let _ = self.sender.send(diagnostic);
    }
}

struct FieldVisitor<'a>(&'a mut BTreeMap<String, Value>);

impl tracing::field::Visit for FieldVisitor<'_> {
    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.insert(
            field.name().to_string(),
            serde_json::json!(format!("{:?}", value)),
        );
    }
}

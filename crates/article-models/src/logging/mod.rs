//! Structured diagnostic logging
//!
//! [`ServiceJsonFormat`] renders every `tracing` event as one JSON object
//! tagged with the emitting service's short code, so a log line can be
//! traced to its service without any other context:
//!
//! ```json
//! {"timestamp":"2024-05-01T12:00:00+00:00","level":"WARN","message":"MISSING_FIELD",
//!  "module":"ASS/article_models::logging","file":"src/logging/mod.rs","line":42,
//!  "fields":{"error_code":"AML-2"},
//!  "exception":{"number_of_errors":1,"detail":[{"field":"title","kind":"missing","message":"field required"}]}}
//! ```

use chrono::Utc;
use serde_json::{Map, Value};
use std::fmt;
use tracing::field::{Field, Visit};
use tracing::{Event, Metadata, Subscriber};
use tracing_subscriber::fmt::format::{self, FormatEvent, FormatFields};
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::errors::{service_short_code, ModelError, Service};

/// Event field whose value becomes the `exception` block
pub const ERRORS_FIELD: &str = "errors";

/// JSON event formatter tagged with a service short code
#[derive(Debug, Clone, Copy)]
pub struct ServiceJsonFormat {
    service_code: &'static str,
}

impl ServiceJsonFormat {
    /// Formatter for a registered service name; unknown names log as `UNKNOWN`
    pub fn new(service_name: &str) -> Self {
        Self {
            service_code: service_short_code(service_name),
        }
    }

    pub fn for_service(service: Service) -> Self {
        Self {
            service_code: service.short_code(),
        }
    }

    pub fn service_code(&self) -> &'static str {
        self.service_code
    }

    fn render(&self, meta: &Metadata<'_>, mut visitor: JsonVisitor) -> Value {
        let mut record = Map::new();
        record.insert("timestamp".into(), Value::from(Utc::now().to_rfc3339()));
        record.insert("level".into(), Value::from(meta.level().to_string()));
        record.insert(
            "message".into(),
            Value::from(visitor.message.take().unwrap_or_default()),
        );
        record.insert(
            "module".into(),
            Value::from(format!(
                "{}/{}",
                self.service_code,
                meta.module_path().unwrap_or_else(|| meta.target())
            )),
        );
        record.insert("file".into(), meta.file().map(Value::from).unwrap_or(Value::Null));
        record.insert("line".into(), meta.line().map(Value::from).unwrap_or(Value::Null));

        let errors = visitor.fields.remove(ERRORS_FIELD);
        if !visitor.fields.is_empty() {
            record.insert("fields".into(), Value::Object(visitor.fields));
        }
        if let Some(errors) = errors {
            record.insert("exception".into(), exception(errors));
        }

        Value::Object(record)
    }
}

/// `errors` arrives as rendered text; a JSON array is counted, anything else
/// is kept verbatim
fn exception(errors: Value) -> Value {
    let detail = match errors {
        Value::String(text) => serde_json::from_str(&text).unwrap_or(Value::String(text)),
        other => other,
    };
    let number_of_errors = match &detail {
        Value::Array(items) => items.len(),
        _ => 0,
    };
    serde_json::json!({
        "number_of_errors": number_of_errors,
        "detail": detail,
    })
}

impl<S, N> FormatEvent<S, N> for ServiceJsonFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut visitor = JsonVisitor::default();
        event.record(&mut visitor);

        let record = self.render(event.metadata(), visitor);
        let line = serde_json::to_string(&record).map_err(|_| fmt::Error)?;
        writeln!(writer, "{}", line)
    }
}

#[derive(Default)]
struct JsonVisitor {
    message: Option<String>,
    fields: Map<String, Value>,
}

impl JsonVisitor {
    fn insert(&mut self, field: &Field, value: Value) {
        if field.name() == "message" {
            self.message = Some(match value {
                Value::String(s) => s,
                other => other.to_string(),
            });
        } else {
            self.fields.insert(field.name().to_string(), value);
        }
    }
}

impl Visit for JsonVisitor {
    fn record_f64(&mut self, field: &Field, value: f64) {
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

    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, Value::from(value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.insert(field, Value::String(format!("{:?}", value)));
    }
}

/// Install the global subscriber for `service_name`.
///
/// `RUST_LOG` wins over the configured level when set.
pub fn init_logging(config: &LoggingConfig, service_name: &str) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    let json = config.json_logging.then(|| {
        tracing_subscriber::fmt::layer().event_format(ServiceJsonFormat::new(service_name))
    });
    let text = (!config.json_logging).then(|| tracing_subscriber::fmt::layer().with_target(true));

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(text)
        .try_init()
}

/// Emit one warn event describing `error`, with its field errors as the
/// exception detail
pub fn log_model_error(error: &ModelError) {
    let errors = serde_json::to_string(error.field_errors()).unwrap_or_else(|_| "[]".to_string());
    tracing::warn!(
        error_code = %error.error_code(),
        additional_info = error.additional_info(),
        errors = %errors,
        "{}",
        error.error_message()
    );
}

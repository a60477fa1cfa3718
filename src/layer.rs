// Copyright (C) 2026 The gelf-channel Authors
//
// This file is part of gelf-channel.
//
// gelf-channel is free software: you can redistribute it and/or modify it under the terms of the
// GNU General Public License as published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// gelf-channel is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without
// even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU
// General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with gelf-channel.  If
// not, see <http://www.gnu.org/licenses/>.

//! [gelf-channel](crate) [`Layer`] implementation.
//!
//! [`Layer`]: https://docs.rs/tracing-subscriber/latest/tracing_subscriber/layer/trait.Layer.html
//!
//! [`GelfLayer`] connects a [`Handler`] to the [`tracing`] ecosystem: each [`Event`] becomes a
//! [`LogRecord`] whose message is the event's `message` field, whose context holds the event's
//! remaining fields (plus `target`, & `file`/`line` where known), and whose severity is mapped from
//! the [`tracing`] level (see [`Severity`]).
//!
//! [`tracing`]: https://docs.rs/tracing/latest/tracing/index.html
//!
//! ```no_run
//! use gelf_channel::{config::ChannelConfig, factory, layer::GelfLayer};
//! use tracing_subscriber::layer::SubscriberExt; // Needed to get `with()`
//!
//! let handler = factory::build(&ChannelConfig::new("graylog.example.com", 12201)).unwrap();
//! let subscriber = tracing_subscriber::registry().with(GelfLayer::new(handler));
//! tracing::subscriber::set_global_default(subscriber).unwrap();
//!
//! tracing::warn!(user = "frodo", "Hello, world!");
//! ```

use crate::{handler::Handler, record::LogRecord, severity::Severity};

use serde_json::Value;
use tracing::Event;
use tracing_subscriber::layer::Context;

use std::sync::Arc;

// When the tracing-log feature is enabled, use NormalizeEvent to extract file/line metadata
// from events that originated from the `log` crate. This follows the same pattern used by
// tracing-subscriber's fmt layer.
// See: https://github.com/tokio-rs/tracing/blob/master/tracing-subscriber/src/fmt/fmt_layer.rs
#[cfg(feature = "tracing-log")]
use tracing_log::NormalizeEvent;

/// A [`tracing-subscriber`]-compliant [`Layer`] implementation that ships [`Event`]s through a
/// [`Handler`].
///
/// [`tracing-subscriber`]: https://docs.rs/tracing-subscriber/latest/tracing_subscriber/index.html
/// [`Layer`]: https://docs.rs/tracing-subscriber/latest/tracing_subscriber/layer/trait.Layer.html
/// [`Event`]: https://docs.rs/tracing/0.1.35/tracing/struct.Event.html
pub struct GelfLayer {
    handler: Arc<Handler>,
}

impl GelfLayer {
    pub fn new(handler: Handler) -> GelfLayer {
        GelfLayer {
            handler: Arc::new(handler),
        }
    }
    /// Share `handler` between this layer & the caller
    pub fn from_shared(handler: Arc<Handler>) -> GelfLayer {
        GelfLayer { handler }
    }
    pub fn handler(&self) -> &Arc<Handler> {
        &self.handler
    }
}

/// Collects an [`Event`]'s fields
#[derive(Default)]
struct FieldVisitor {
    message: Option<String>,
    fields: Vec<(&'static str, Value)>,
}

impl FieldVisitor {
    fn put(&mut self, field: &tracing::field::Field, value: Value) {
        if field.name() == "message" {
            self.message = Some(match value {
                Value::String(s) => s,
                other => other.to_string(),
            });
        } else {
            self.fields.push((field.name(), value));
        }
    }
}

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        // The tracing macros "pre-format" the `message` field so that `value` is a
        // `std::fmt::Arguments`, which prints without enclosing double-quotes.
        self.put(field, Value::String(format!("{:?}", value)));
    }
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.put(field, Value::from(value));
    }
    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.put(field, Value::from(value));
    }
    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.put(field, Value::from(value));
    }
    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        self.put(field, Value::from(value));
    }
    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.put(field, Value::from(value));
    }
    fn record_error(
        &mut self,
        field: &tracing::field::Field,
        value: &(dyn std::error::Error + 'static),
    ) {
        self.put(field, Value::String(value.to_string()));
    }
}

// Our own diagnostics (e.g. "dropped a log record") must never be fed back into the handler that
// produced them.
fn is_own_target(target: &str) -> bool {
    target.split("::").next() == Some(env!("CARGO_CRATE_NAME"))
}

impl<S> tracing_subscriber::layer::Layer<S> for GelfLayer
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        // When the tracing-log feature is enabled, use normalized_metadata() to get
        // file/line info for events that originated from the `log` crate.
        // For native tracing events, normalized_metadata() returns None and we use
        // the event's own metadata.
        #[cfg(feature = "tracing-log")]
        let normalized_meta = event.normalized_metadata();
        #[cfg(feature = "tracing-log")]
        let meta = normalized_meta.as_ref().unwrap_or_else(|| event.metadata());
        #[cfg(not(feature = "tracing-log"))]
        let meta = event.metadata();

        if is_own_target(meta.target()) {
            return;
        }
        let severity = Severity::from(meta.level());
        // Skip the field walk for events the handler would drop anyway
        if !self.handler.is_handling(severity) {
            return;
        }

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let mut record = LogRecord::builder(severity, visitor.message.unwrap_or_default())
            .context("target", meta.target());
        if let Some(file) = meta.file() {
            record = record.context("file", file);
        }
        if let Some(line) = meta.line() {
            record = record.context("line", line);
        }
        for (name, value) in visitor.fields {
            record = record.context(name, value);
        }
        self.handler.handle(record.build());
    }
}

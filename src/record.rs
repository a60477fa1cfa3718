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
//! The log record handed to a [`Handler`].
//!
//! [`Handler`]: crate::handler::Handler

use crate::severity::Severity;

use chrono::prelude::*;
use serde_json::{Map, Value};

/// Structured context attached to a [`LogRecord`]; key order is preserved.
pub type Context = Map<String, Value>;

/// A single log event: a timestamp, a [`Severity`], a message & arbitrary structured context.
///
/// [`LogRecord`]s are immutable once built. [`Processor`]s that want to enrich a record consume
/// it & return a new one via [`LogRecord::with_context`].
///
/// [`Processor`]: crate::processor::Processor
#[derive(Clone, Debug, PartialEq)]
pub struct LogRecord {
    timestamp: DateTime<Utc>,
    severity: Severity,
    message: String,
    full_message: Option<String>,
    context: Context,
    channel: String,
}

impl LogRecord {
    /// Begin building a record at the current time
    pub fn builder<S: Into<String>>(severity: Severity, message: S) -> LogRecordBuilder {
        LogRecordBuilder {
            imp: LogRecord {
                timestamp: Utc::now(),
                severity,
                message: message.into(),
                full_message: None,
                context: Context::new(),
                channel: String::new(),
            },
        }
    }
    /// Shorthand for a record with no context, timestamped now
    pub fn new<S: Into<String>>(severity: Severity, message: S) -> LogRecord {
        LogRecord::builder(severity, message).build()
    }
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
    pub fn severity(&self) -> Severity {
        self.severity
    }
    pub fn message(&self) -> &str {
        &self.message
    }
    pub fn full_message(&self) -> Option<&str> {
        self.full_message.as_deref()
    }
    pub fn context(&self) -> &Context {
        &self.context
    }
    pub fn channel(&self) -> &str {
        &self.channel
    }
    /// Consume this record, producing a copy with `key` set to `value` in its context (replacing
    /// any previous value for `key`).
    pub fn with_context<K: Into<String>, V: Into<Value>>(mut self, key: K, value: V) -> LogRecord {
        self.context.insert(key.into(), value.into());
        self
    }
    /// Consume this record, producing a copy attributed to `channel`
    pub fn with_channel<S: Into<String>>(mut self, channel: S) -> LogRecord {
        self.channel = channel.into();
        self
    }
}

pub struct LogRecordBuilder {
    imp: LogRecord,
}

impl LogRecordBuilder {
    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.imp.timestamp = timestamp;
        self
    }
    pub fn full_message<S: Into<String>>(mut self, full_message: S) -> Self {
        self.imp.full_message = Some(full_message.into());
        self
    }
    pub fn context<K: Into<String>, V: Into<Value>>(mut self, key: K, value: V) -> Self {
        self.imp.context.insert(key.into(), value.into());
        self
    }
    pub fn channel<S: Into<String>>(mut self, channel: S) -> Self {
        self.imp.channel = channel.into();
        self
    }
    pub fn build(self) -> LogRecord {
        self.imp
    }
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn builder() {
        let record = LogRecord::builder(Severity::Notice, "disk almost full")
            .timestamp(std::time::UNIX_EPOCH.into())
            .full_message("disk /dev/sda1 is at 93%")
            .context("mount", "/")
            .context("pct", 93)
            .channel("ops")
            .build();
        assert_eq!(record.timestamp().timestamp(), 0);
        assert_eq!(record.severity(), Severity::Notice);
        assert_eq!(record.message(), "disk almost full");
        assert_eq!(record.full_message(), Some("disk /dev/sda1 is at 93%"));
        assert_eq!(record.channel(), "ops");
        let keys: Vec<&str> = record.context().keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["mount", "pct"]);
    }

    #[test]
    fn with_context_replaces() {
        let record = LogRecord::new(Severity::Info, "x").with_context("a", 1);
        let record = record.with_context("a", "two");
        assert_eq!(record.context()["a"], Value::from("two"));
        assert_eq!(record.context().len(), 1);
    }
}

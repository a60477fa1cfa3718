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

//! The log handler: where records enter the channel.
//!
//! A [`Handler`] takes each [`LogRecord`] through four steps:
//!
//! 1. filtering: records less severe than the handler's level are dropped on the spot; they are
//!    neither processed nor encoded
//! 2. processing: the record is passed through the processor stack, most recently pushed first
//! 3. encoding: the record is turned into a [`GelfMessage`](crate::message::GelfMessage)
//! 4. publishing: the message is handed to the [`Publisher`]
//!
//! [`Handler::handle`] never fails: logging must not interfere with the caller's work. What
//! happens to a record that couldn't be encoded or delivered is governed by the handler's
//! [`FailurePolicy`]. Callers who want to know can use [`Handler::try_handle`] instead.

use crate::{
    encoder::GelfEncoder,
    error::{Error, Result},
    processor::Processor,
    publisher::Publisher,
    record::LogRecord,
    severity::Severity,
};

use backtrace::Backtrace;
use tracing::warn;

use std::sync::atomic::{AtomicU64, Ordering};

/// What [`Handler::handle`] does with a record it failed to encode or deliver
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Count the failure (see [`Handler::failures`]) & emit a `tracing` warning
    #[default]
    Record,
    /// Drop the record without a trace
    Ignore,
}

pub struct Handler {
    name: String,
    level: Severity,
    encoder: GelfEncoder,
    publisher: Publisher,
    processors: Vec<Box<dyn Processor>>,
    policy: FailurePolicy,
    failures: AtomicU64,
}

impl Handler {
    pub fn new<S: Into<String>>(
        name: S,
        level: Severity,
        encoder: GelfEncoder,
        publisher: Publisher,
    ) -> Handler {
        Handler {
            name: name.into(),
            level,
            encoder,
            publisher,
            processors: Vec::new(),
            policy: FailurePolicy::default(),
            failures: AtomicU64::new(0),
        }
    }
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Handler {
        self.policy = policy;
        self
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    /// The minimum severity this handler will ship
    pub fn level(&self) -> Severity {
        self.level
    }
    pub fn encoder(&self) -> &GelfEncoder {
        &self.encoder
    }
    pub fn publisher(&self) -> &Publisher {
        &self.publisher
    }
    pub fn failure_policy(&self) -> FailurePolicy {
        self.policy
    }
    /// The number of records this handler has failed to ship (always zero under
    /// [`FailurePolicy::Ignore`])
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }
    pub fn is_handling(&self, severity: Severity) -> bool {
        severity >= self.level
    }
    pub fn push_processor(&mut self, processor: Box<dyn Processor>) {
        self.processors.push(processor);
    }
    /// Remove & return the most recently pushed processor
    pub fn pop_processor(&mut self) -> Result<Box<dyn Processor>> {
        self.processors
            .pop()
            .ok_or_else(|| Error::EmptyProcessorStack {
                back: Backtrace::new(),
            })
    }
    pub fn processor_count(&self) -> usize {
        self.processors.len()
    }
    /// Handle `record`, reporting the outcome: `Ok(false)` if the record was filtered out,
    /// `Ok(true)` if it was delivered on every transport.
    pub fn try_handle(&self, record: LogRecord) -> Result<bool> {
        if !self.is_handling(record.severity()) {
            return Ok(false);
        }
        let record = if record.channel().is_empty() {
            record.with_channel(self.name.as_str())
        } else {
            record
        };
        let record = self
            .processors
            .iter()
            .rev()
            .fold(record, |record, processor| processor.process(record));
        let message = self.encoder.encode(&record)?;
        self.publisher.publish(&message)?;
        Ok(true)
    }
    /// Handle `record`; failures are dealt with according to this handler's [`FailurePolicy`]
    /// & never reach the caller.
    pub fn handle(&self, record: LogRecord) {
        if let Err(err) = self.try_handle(record) {
            if self.policy == FailurePolicy::Record {
                self.failures.fetch_add(1, Ordering::Relaxed);
                warn!(channel = %self.name, "dropped a log record: {}", err);
            }
        }
    }
    /// Release any sockets held by this handler's transports
    pub fn close(&self) {
        self.publisher.close();
    }
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handler")
            .field("name", &self.name)
            .field("level", &self.level)
            .field("system_name", self.encoder.system_name())
            .field(
                "transports",
                &self
                    .publisher
                    .transports()
                    .iter()
                    .map(|t| t.config().map(|c| c.to_string()))
                    .collect::<Vec<_>>(),
            )
            .field(
                "processors",
                &self.processors.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .field("policy", &self.policy)
            .field("failures", &self.failures())
            .finish()
    }
}

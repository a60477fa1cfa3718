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

//! Record enrichment.
//!
//! A [`Processor`] takes a [`LogRecord`] & returns it, typically with additional context. Any
//! `Fn(LogRecord) -> LogRecord` is a [`Processor`]; a few common ones are provided, & a
//! [`ProcessorRegistry`] maps configuration identifiers to processor factories.

use crate::{
    error::{Error, Result},
    record::LogRecord,
};

use rand::Rng;

use std::collections::BTreeMap;

/// An enrichment step applied to every record that passes a [`Handler`]'s threshold.
///
/// [`Handler`]: crate::handler::Handler
pub trait Processor: Send + Sync {
    fn process(&self, record: LogRecord) -> LogRecord;
    /// A human-readable name, for diagnostics
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl<F> Processor for F
where
    F: Fn(LogRecord) -> LogRecord + Send + Sync,
{
    fn process(&self, record: LogRecord) -> LogRecord {
        self(record)
    }
}

/// Adds `process_id`
#[derive(Debug, Default)]
pub struct ProcessIdProcessor;

impl Processor for ProcessIdProcessor {
    fn process(&self, record: LogRecord) -> LogRecord {
        record.with_context("process_id", std::process::id())
    }
    fn name(&self) -> &str {
        "process_id"
    }
}

/// Adds `thread`: the name of the logging thread, or its id if it has none
#[derive(Debug, Default)]
pub struct ThreadProcessor;

impl Processor for ThreadProcessor {
    fn process(&self, record: LogRecord) -> LogRecord {
        let current = std::thread::current();
        let thread = match current.name() {
            Some(name) => name.to_string(),
            None => format!("{:?}", current.id()),
        };
        record.with_context("thread", thread)
    }
    fn name(&self) -> &str {
        "thread"
    }
}

/// Adds `uid`: a random identifier chosen when the processor is created, so that all records
/// logged through one handler instance can be correlated.
#[derive(Debug)]
pub struct UidProcessor {
    uid: String,
}

impl UidProcessor {
    /// `len` hex digits, between 1 & 32
    pub fn new(len: usize) -> Result<UidProcessor> {
        if !(1..=32).contains(&len) {
            return Err(Error::invalid_config(format!(
                "uid length must be between 1 and 32 (got {})",
                len
            )));
        }
        let mut rng = rand::thread_rng();
        let uid = (0..len)
            .map(|_| std::char::from_digit(rng.gen_range(0..16), 16).unwrap_or('0'))
            .collect();
        Ok(UidProcessor { uid })
    }
    pub fn uid(&self) -> &str {
        &self.uid
    }
}

impl std::default::Default for UidProcessor {
    fn default() -> Self {
        let mut rng = rand::thread_rng();
        UidProcessor {
            uid: format!("{:07x}", rng.gen_range(0..0x1000_0000u32)),
        }
    }
}

impl Processor for UidProcessor {
    fn process(&self, record: LogRecord) -> LogRecord {
        record.with_context("uid", self.uid.clone())
    }
    fn name(&self) -> &str {
        "uid"
    }
}

/// Adds `executable`: the file name of the running executable ("-" if it can't be determined)
#[derive(Debug)]
pub struct ExecutableProcessor {
    executable: String,
}

impl std::default::Default for ExecutableProcessor {
    /// This implementation relies on [`std::env::current_exe`]. It cannot fail; if for any reason
    /// that value cannot be retrieved it simply uses "-".
    fn default() -> Self {
        let executable = std::env::current_exe()
            .ok()
            .and_then(|pbuf| {
                pbuf.file_name()
                    .map(|os_str| os_str.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| "-".to_string());
        ExecutableProcessor { executable }
    }
}

impl Processor for ExecutableProcessor {
    fn process(&self, record: LogRecord) -> LogRecord {
        record.with_context("executable", self.executable.clone())
    }
    fn name(&self) -> &str {
        "executable"
    }
}

type ProcessorFactory = Box<dyn Fn() -> Box<dyn Processor> + Send + Sync>;

/// Maps the processor identifiers that may appear in a channel configuration to factories.
///
/// Each [`Handler`] built from a configuration gets its own processor instances. The default
/// registry knows `process_id`, `thread`, `uid` & `executable`.
///
/// [`Handler`]: crate::handler::Handler
pub struct ProcessorRegistry {
    factories: BTreeMap<String, ProcessorFactory>,
}

impl ProcessorRegistry {
    /// A registry with no processors at all
    pub fn empty() -> ProcessorRegistry {
        ProcessorRegistry {
            factories: BTreeMap::new(),
        }
    }
    /// Make `factory` available under `name`, replacing any previous registration
    pub fn register<S, F>(&mut self, name: S, factory: F)
    where
        S: Into<String>,
        F: Fn() -> Box<dyn Processor> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
    }
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(|k| k.as_str())
    }
    /// Instantiate the processor registered as `name`
    pub fn create(&self, name: &str) -> Result<Box<dyn Processor>> {
        self.factories
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| Error::invalid_config(format!("unknown processor '{}'", name)))
    }
}

impl std::default::Default for ProcessorRegistry {
    fn default() -> Self {
        let mut registry = ProcessorRegistry::empty();
        registry.register("process_id", || Box::new(ProcessIdProcessor));
        registry.register("thread", || Box::new(ThreadProcessor));
        registry.register("uid", || Box::new(UidProcessor::default()));
        registry.register("executable", || Box::new(ExecutableProcessor::default()));
        registry
    }
}

#[cfg(test)]
mod test {

    use super::*;

    use crate::severity::Severity;

    use serde_json::Value;

    #[test]
    fn builtins() {
        let record = LogRecord::new(Severity::Info, "x");
        let record = ProcessIdProcessor.process(record);
        assert_eq!(
            record.context()["process_id"],
            Value::from(std::process::id())
        );

        let record = std::thread::Builder::new()
            .name("worker-7".to_string())
            .spawn(move || ThreadProcessor.process(record))
            .unwrap()
            .join()
            .unwrap();
        assert_eq!(record.context()["thread"], Value::from("worker-7"));

        let uid = UidProcessor::default();
        assert_eq!(uid.uid().len(), 7);
        assert!(uid.uid().chars().all(|c| c.is_ascii_hexdigit()));
        let record = uid.process(record);
        assert_eq!(record.context()["uid"], Value::from(uid.uid()));

        assert_eq!(UidProcessor::new(16).unwrap().uid().len(), 16);
        assert!(UidProcessor::new(0).is_err());

        let record = ExecutableProcessor::default().process(record);
        assert!(record.context().contains_key("executable"));
    }

    #[test]
    fn closures_are_processors() {
        let p = |r: LogRecord| r.with_context("tenant", "acme");
        let record = p.process(LogRecord::new(Severity::Info, "x"));
        assert_eq!(record.context()["tenant"], Value::from("acme"));
    }

    #[test]
    fn registry() {
        let mut registry = ProcessorRegistry::default();
        let names: Vec<&str> = registry.names().collect();
        assert_eq!(names, vec!["executable", "process_id", "thread", "uid"]);
        assert_eq!(registry.create("thread").unwrap().name(), "thread");
        assert!(matches!(
            registry.create("memory_usage"),
            Err(Error::InvalidConfig { .. })
        ));

        registry.register("tenant", || {
            Box::new(|r: LogRecord| r.with_context("tenant", "acme"))
        });
        assert!(registry.contains("tenant"));
        let record = registry
            .create("tenant")
            .unwrap()
            .process(LogRecord::new(Severity::Info, "x"));
        assert_eq!(record.context()["tenant"], Value::from("acme"));

        assert_eq!(ProcessorRegistry::empty().names().count(), 0);
    }
}

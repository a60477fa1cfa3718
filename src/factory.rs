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

//! Building [`Handler`]s from configuration.
//!
//! [`ChannelFactory`] wires a [`GelfEncoder`], a [`Publisher`] & the configured transport into a
//! [`Handler`]. Building performs no network I/O; sockets are only opened when the first record
//! is shipped.
//!
//! The factory holds no global state. Applications that keep a table of named loggers hand it to
//! [`ChannelFactory::register`] as a [`ChannelRegistry`]; [`Channels`] is a simple in-memory one.

use crate::{
    config::{ChannelConfig, ChannelSettings},
    encoder::GelfEncoder,
    error::Result,
    handler::Handler,
    processor::ProcessorRegistry,
    publisher::Publisher,
    transport::{TcpTransport, TransportKind, UdpTransport},
};

use tracing::debug;

use std::collections::BTreeMap;

/// Somewhere to keep named [`Handler`]s
pub trait ChannelRegistry {
    /// Register `handler` under its name, replacing any handler previously registered under that
    /// name.
    fn register(&mut self, handler: Handler);
}

/// An in-memory [`ChannelRegistry`]
#[derive(Debug, Default)]
pub struct Channels {
    handlers: BTreeMap<String, Handler>,
}

impl Channels {
    pub fn new() -> Channels {
        Channels::default()
    }
    pub fn get(&self, name: &str) -> Option<&Handler> {
        self.handlers.get(name)
    }
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Handler> {
        self.handlers.get_mut(name)
    }
    pub fn remove(&mut self, name: &str) -> Option<Handler> {
        self.handlers.remove(name)
    }
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(|k| k.as_str())
    }
    pub fn len(&self) -> usize {
        self.handlers.len()
    }
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl ChannelRegistry for Channels {
    fn register(&mut self, handler: Handler) {
        self.handlers.insert(handler.name().to_string(), handler);
    }
}

/// Builds [`Handler`]s from [`ChannelConfig`]s
#[derive(Default)]
pub struct ChannelFactory {
    processors: ProcessorRegistry,
}

impl ChannelFactory {
    /// A factory that resolves processor identifiers through `processors`
    pub fn new(processors: ProcessorRegistry) -> ChannelFactory {
        ChannelFactory { processors }
    }
    pub fn processors(&self) -> &ProcessorRegistry {
        &self.processors
    }
    pub fn processors_mut(&mut self) -> &mut ProcessorRegistry {
        &mut self.processors
    }
    /// Validate `config` & build a [`Handler`] from it
    pub fn build(&self, config: &ChannelConfig) -> Result<Handler> {
        self.build_from_settings(config.validate()?)
    }
    pub fn build_from_settings(&self, settings: ChannelSettings) -> Result<Handler> {
        // Resolve every processor before building anything, so that a typo fails the whole build.
        let processors = settings
            .processors
            .iter()
            .map(|id| self.processors.create(id.trim()))
            .collect::<Result<Vec<_>>>()?;

        let mut encoder = GelfEncoder::builder().context_prefix(settings.context_prefix)?;
        if let Some(system_name) = settings.system_name {
            encoder = encoder.system_name(system_name);
        }
        let encoder = encoder.build();

        let target = settings.transport;
        let mut publisher = Publisher::new(settings.compression);
        match target.kind {
            TransportKind::Udp => {
                let transport = UdpTransport::with_chunk_size(
                    target.host.clone(),
                    target.port,
                    settings.chunk_size,
                )?;
                publisher.add_transport(Box::new(transport))
            }
            TransportKind::Tcp => {
                let mut transport = TcpTransport::new(target.host.clone(), target.port);
                if let Some(timeout) = settings.timeout {
                    transport = transport.with_timeout(timeout);
                }
                publisher.add_transport(Box::new(transport))
            }
        }

        let mut handler = Handler::new(settings.name, settings.level, encoder, publisher)
            .with_failure_policy(settings.failure_policy);
        for processor in processors {
            handler.push_processor(processor);
        }
        debug!(
            "built GELF channel '{}' ({}, level {}, host {})",
            handler.name(),
            target,
            handler.level(),
            handler.encoder().system_name()
        );
        Ok(handler)
    }
    /// Build a [`Handler`] from `config` & register it with `registry`; returns the name under
    /// which it was registered.
    pub fn register(
        &self,
        config: &ChannelConfig,
        registry: &mut dyn ChannelRegistry,
    ) -> Result<String> {
        let handler = self.build(config)?;
        let name = handler.name().to_string();
        registry.register(handler);
        Ok(name)
    }
}

impl std::fmt::Debug for ChannelFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelFactory")
            .field("processors", &self.processors.names().collect::<Vec<_>>())
            .finish()
    }
}

/// Build a [`Handler`] from `config` using the default processor registry
pub fn build(config: &ChannelConfig) -> Result<Handler> {
    ChannelFactory::default().build(config)
}

#[cfg(test)]
mod test {

    use super::*;

    use crate::{
        error::Error,
        publisher::Compression,
        record::LogRecord,
        severity::Severity,
        transport::TransportConfig,
    };

    use serde_json::json;

    fn config(value: serde_json::Value) -> ChannelConfig {
        ChannelConfig::from_value(value).unwrap()
    }

    fn only_transport(handler: &Handler) -> TransportConfig {
        let transports = handler.publisher().transports();
        assert_eq!(transports.len(), 1);
        transports[0].config().unwrap().clone()
    }

    #[test]
    fn custom_channel() {
        let handler = build(&config(json!({
            "driver": "custom",
            "level": "notice",
            "name": "my-custom-name",
            "host": "127.0.0.2",
            "port": 12202
        })))
        .unwrap();
        assert_eq!(handler.name(), "my-custom-name");
        assert_eq!(handler.level(), Severity::Notice);
        assert_eq!(
            only_transport(&handler),
            TransportConfig {
                kind: TransportKind::Udp,
                host: "127.0.0.2".to_string(),
                port: 12202
            }
        );
        assert_eq!(handler.publisher().compression(), Compression::Zlib);
    }

    #[test]
    fn no_processors_unless_configured() {
        let mut handler = build(&ChannelConfig::new("127.0.0.1", 12201)).unwrap();
        assert_eq!(handler.processor_count(), 0);
        let err = handler.pop_processor().err().unwrap();
        assert!(matches!(err, Error::EmptyProcessorStack { .. }));
        assert_eq!(
            format!("{}", err),
            "You tried to pop from an empty processor stack."
        );
    }

    #[test]
    fn processors_are_pushed_in_order() {
        let mut handler = build(&config(json!({
            "host": "127.0.0.1", "port": 12201, "processors": ["process_id", "uid", "thread"]
        })))
        .unwrap();
        assert_eq!(handler.processor_count(), 3);
        assert_eq!(handler.pop_processor().unwrap().name(), "thread");
        assert_eq!(handler.pop_processor().unwrap().name(), "uid");
        assert_eq!(handler.pop_processor().unwrap().name(), "process_id");
    }

    #[test]
    fn unknown_processor() {
        assert!(matches!(
            build(&config(json!({
                "host": "127.0.0.1", "port": 12201, "processors": ["introspection"]
            }))),
            Err(Error::InvalidConfig { .. })
        ));
    }

    #[test]
    fn custom_processors() {
        let mut factory = ChannelFactory::default();
        factory.processors_mut().register("tenant", || {
            Box::new(|r: LogRecord| r.with_context("tenant", "acme"))
        });
        let handler = factory
            .build(&config(json!({
                "host": "127.0.0.1", "port": 12201, "processors": ["tenant"]
            })))
            .unwrap();
        assert_eq!(handler.processor_count(), 1);
    }

    #[test]
    fn system_name() {
        let handler = build(&config(json!({
            "host": "127.0.0.1", "port": 12201, "system_name": null
        })))
        .unwrap();
        let expected = hostname::get().unwrap().to_string_lossy().into_owned();
        assert_eq!(handler.encoder().system_name().as_str(), expected);

        let handler = build(&config(json!({
            "host": "127.0.0.1", "port": 12201, "system_name": "my-system-name"
        })))
        .unwrap();
        assert_eq!(handler.encoder().system_name().as_str(), "my-system-name");
    }

    #[test]
    fn transport_selection() {
        let handler = build(&config(json!({
            "host": "127.0.0.1", "port": 12201, "transport": "tcp", "timeout": 1
        })))
        .unwrap();
        assert_eq!(only_transport(&handler).kind, TransportKind::Tcp);
        assert_eq!(handler.publisher().compression(), Compression::None);

        let handler = build(&config(json!({
            "host": "127.0.0.1", "port": 12201, "transport": "udp"
        })))
        .unwrap();
        assert_eq!(only_transport(&handler).kind, TransportKind::Udp);

        let handler = build(&ChannelConfig::new("127.0.0.1", 12201)).unwrap();
        assert_eq!(only_transport(&handler).kind, TransportKind::Udp);
    }

    #[test]
    fn missing_destination() {
        assert!(matches!(
            build(&config(json!({"transport": "tcp"}))),
            Err(Error::InvalidConfig { .. })
        ));
    }

    #[test]
    fn registration() {
        let mut channels = Channels::new();
        let factory = ChannelFactory::default();
        let name = factory
            .register(
                &config(json!({"host": "127.0.0.2", "port": 12202, "name": "audit"})),
                &mut channels,
            )
            .unwrap();
        assert_eq!(name, "audit");
        factory
            .register(&ChannelConfig::new("127.0.0.1", 12201), &mut channels)
            .unwrap();
        assert_eq!(channels.names().collect::<Vec<_>>(), vec!["audit", "gelf"]);
        assert_eq!(channels.get("audit").unwrap().level(), Severity::Warning);

        // A failed build registers nothing
        assert!(factory.register(&ChannelConfig::default(), &mut channels).is_err());
        assert_eq!(channels.len(), 2);
    }
}

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
//! A logging channel that ships [`tracing`] events & structured log records to a [Graylog]
//! collector as [GELF] messages
//!
//! [`tracing`]: https://docs.rs/tracing/latest/tracing/index.html
//! [Graylog]: https://graylog.org/
//! [GELF]: https://go2docs.graylog.org/current/getting_in_log_data/gelf.html
//!
//! # Introduction
//!
//! GELF, the Graylog Extended Log Format, is a JSON encoding of a log message that, unlike classic
//! syslog, carries arbitrary structured fields alongside the message text. A GELF message is sent
//! either as one or more UDP datagrams (optionally compressed, & split into "chunks" when too large
//! for a single datagram) or over a TCP stream, each message terminated by a null byte.
//!
//! This crate turns log records into GELF messages and delivers them. Given a destination, a
//! [`Handler`](handler::Handler) filters records by severity, runs them through a stack of
//! [`Processor`](processor::Processor)s, encodes them & publishes them to one or more
//! [`Transport`](transport::Transport)s. See the [`_docs`] module for a tour of the pipeline.
//!
//! # Usage
//!
//! Channels are typically built from configuration:
//!
//! ```rust
//! use gelf_channel::{config::ChannelConfig, factory, record::LogRecord, severity::Severity};
//! use serde_json::json;
//!
//! let config = ChannelConfig::from_value(json!({
//!     "host": "127.0.0.1",
//!     "port": 12201,
//!     "level": "info",
//!     "processors": ["process_id"]
//! }))
//! .unwrap();
//! // No network I/O takes place until the first record is shipped
//! let handler = factory::build(&config).unwrap();
//!
//! handler.handle(LogRecord::new(Severity::Info, "Hello, world!").with_context("user", "frodo"));
//! ```
//!
//! That sends a single UDP datagram containing zlib-compressed JSON along the lines of:
//!
//! ```text
//! {"version":"1.1","host":"bree","short_message":"Hello, world!","timestamp":1656025855.123456,
//!  "level":6,"_user":"frodo","_process_id":4242,"_facility":"gelf"}
//! ```
//!
//! To ship [`tracing`] events, wrap the handler in a [`GelfLayer`](layer::GelfLayer):
//!
//! ```no_run
//! use gelf_channel::{config::ChannelConfig, factory, layer::GelfLayer};
//! use tracing::info;
//! use tracing_subscriber::layer::SubscriberExt; // Needed to get `with()`
//! use tracing_subscriber::registry::Registry;
//!
//! let config = ChannelConfig::new("graylog.example.com", 12201);
//! let subscriber = Registry::default().with(GelfLayer::new(factory::build(&config).unwrap()));
//! tracing::subscriber::set_global_default(subscriber).unwrap();
//!
//! info!(request_id = 7, "Hello, world!");
//! ```

pub mod _docs;
pub mod chunk;
pub mod config;
pub mod encoder;
pub mod error;
pub mod factory;
pub mod handler;
pub mod layer;
pub mod message;
pub mod processor;
pub mod publisher;
pub mod record;
pub mod severity;
pub mod transport;

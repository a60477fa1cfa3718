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

//! # General gelf-channel Documentation
//!
//! ## Introduction
//!
//! General (i.e. not documenting a particular struct or a method) documentation goes here.
//!
//! ## From LogRecords to GELF Messages
//!
//! A [LogRecord] becomes a GELF message on the wire in four steps:
//!
//! [LogRecord]: crate::record::LogRecord
//!
//! 1. filtering the record by severity & passing it through the processor stack
//! 2. encoding the record as a [GelfMessage]
//! 3. serializing & (optionally) compressing that message
//! 4. transporting the resulting bytes to the collector
//!
//! [GelfMessage]: crate::message::GelfMessage
//!
//! ### Filtering & Processing
//!
//! A [Handler] carries a minimum [Severity]; anything less severe is dropped before any further
//! work is done. Records that pass are handed to each [Processor] on the handler's stack in turn,
//! most recently pushed first. Processors enrich records with context: the process id, the
//! thread, an executable path, a per-process unique id, or whatever the application registers in
//! its [ProcessorRegistry].
//!
//! [Handler]: crate::handler::Handler
//! [Severity]: crate::severity::Severity
//! [Processor]: crate::processor::Processor
//! [ProcessorRegistry]: crate::processor::ProcessorRegistry
//!
//! ### Encoding
//!
//! [GelfEncoder] maps the record onto the GELF 1.1 fields (`short_message`, `full_message`,
//! `level`, `timestamp` & `host`). Every context entry becomes an "additional field", whose name
//! must begin with an underscore; the encoder takes care of prefixing & sanitizing keys, and of
//! steering clear of the reserved `_id`.
//!
//! [GelfEncoder]: crate::encoder::GelfEncoder
//!
//! ### Publishing
//!
//! The [Publisher] serializes the message to JSON once, compresses it according to its
//! [Compression] setting, and hands the same bytes to each of its transports. One failing transport
//! does not prevent delivery to the others; the failures are gathered into a single
//! [DeliveryFailed] error.
//!
//! [Publisher]: crate::publisher::Publisher
//! [Compression]: crate::publisher::Compression
//! [DeliveryFailed]: crate::error::Error::DeliveryFailed
//!
//! ### Sending the Bytes
//!
//! The [Transport] trait defines this last step, and two implementations are provided:
//!
//! [Transport]: crate::transport::Transport
//!
//! - [UdpTransport](crate::transport::UdpTransport): messages that don't fit in a single datagram
//!   are split into at most 128 chunks, each carrying a twelve-byte header (see [chunk])
//! - [TcpTransport](crate::transport::TcpTransport): each message is followed by a null byte; the
//!   connection is opened on first use & re-established once if a write fails
//!
//! [chunk]: crate::chunk
//!
//! ## How This Process Plugs-In to the Tracing Framework
//!
//! [GelfLayer] implements [tracing_subscriber::layer::Layer], so it can be "stacked" on top of
//! other layers in your tracing [Subscriber]. When it receives an [Event], it collects the
//! `message` field as the record's message & every other field as context, maps the event's level
//! to a [Severity], and hands the resulting record to its [Handler].
//!
//! [GelfLayer]: crate::layer::GelfLayer
//! [Subscriber]: tracing::Subscriber
//! [Event]: tracing::Event
//!
//! ## Configuration
//!
//! [ChannelConfig] is a [serde]-deserializable description of a channel; [ChannelFactory] validates
//! it & builds the corresponding [Handler]. Unknown keys are ignored, so a host application's
//! logging configuration may carry its own bookkeeping (a `driver` key, say) alongside ours.
//!
//! [ChannelConfig]: crate::config::ChannelConfig
//! [ChannelFactory]: crate::factory::ChannelFactory
//! [serde]: https://docs.rs/serde

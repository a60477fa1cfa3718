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

//! Test shipping GELF over UDP to port 12201 on the local host.
//!
//! Pass `wan` as the first argument to chunk at the WAN chunk size.

use gelf_channel::{
    chunk::{CHUNK_SIZE_LAN, CHUNK_SIZE_WAN},
    encoder::GelfEncoder,
    handler::Handler,
    layer::GelfLayer,
    publisher::{Compression, Publisher},
    severity::Severity,
    transport::UdpTransport,
};
use tracing::{debug, error, info, trace, warn};
use tracing_subscriber::{
    layer::SubscriberExt, // Needed to get `with()`
    registry::Registry,
};

pub fn main() {
    let chunk_size = match std::env::args().nth(1).as_deref() {
        Some("wan") => CHUNK_SIZE_WAN,
        _ => CHUNK_SIZE_LAN,
    };
    let transport = UdpTransport::with_chunk_size("localhost", 12201, chunk_size).unwrap();
    let handler = Handler::new(
        "udp-test",
        Severity::Debug,
        GelfEncoder::builder().build(),
        Publisher::with_transport(transport, Compression::Zlib),
    );
    // Setup the real subsriber...
    let subscriber = Registry::default().with(GelfLayer::new(handler));
    // and install it.
    let _guard = tracing::subscriber::set_default(subscriber);

    trace!("Hello, 世界!");
    debug!("Hello, 世界!");
    info!("Hello, 世界!");
    warn!(transport = "udp", "Hello, 世界!");
    error!("Hello, 世界!");
    // Large enough to need a few chunks
    let padding = "x".repeat(4 * chunk_size);
    info!(padding = padding.as_str(), "Hello, chunked 世界!");
}

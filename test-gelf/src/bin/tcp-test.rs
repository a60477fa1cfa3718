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

//! Test shipping GELF over TCP to port 12201 on the local host, with the channel built from JSON
//! configuration.

use gelf_channel::{config::ChannelConfig, factory, layer::GelfLayer};
use tracing::{debug, error, info, trace, warn};
use tracing_subscriber::{
    layer::SubscriberExt, // Needed to get `with()`
    registry::Registry,
};

pub fn main() {
    let config = ChannelConfig::from_value(serde_json::json!({
        "name": "tcp-test",
        "level": "debug",
        "host": "localhost",
        "port": 12201,
        "transport": "tcp",
        "timeout": 5,
        "processors": ["process_id", "thread"]
    }))
    .unwrap();
    // Setup the real subsriber...
    let subscriber = Registry::default().with(GelfLayer::new(factory::build(&config).unwrap()));
    // and install it.
    let _guard = tracing::subscriber::set_default(subscriber);

    trace!("你好, TCP socket.");
    debug!("你好, TCP socket.");
    info!("你好, TCP socket.");
    warn!("你好, TCP socket.");
    error!("你好, TCP socket.");
}

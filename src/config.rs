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

//! Channel configuration.
//!
//! [`ChannelConfig`] mirrors the associative configuration a host application hands us (typically
//! a section of a JSON, YAML or TOML file): every field is optional at the serde level so that
//! *we*, not the deserializer, get to decide what's missing. [`ChannelConfig::validate`] turns it
//! into a fully-typed [`ChannelSettings`], failing fast with [`Error::InvalidConfig`].
//!
//! Keys we don't recognize are ignored; host frameworks like to keep their own bookkeeping (driver
//! names & the like) in the same section.
//!
//! ```rust
//! use gelf_channel::config::ChannelConfig;
//! use gelf_channel::severity::Severity;
//!
//! let config = ChannelConfig::from_value(serde_json::json!({
//!     "host": "127.0.0.2",
//!     "port": 12202,
//!     "level": "notice",
//!     "name": "my-custom-name",
//! }))
//! .unwrap();
//! let settings = config.validate().unwrap();
//! assert_eq!(settings.level, Severity::Notice);
//! ```

use crate::{
    chunk::{CHUNK_HEADER_LEN, CHUNK_SIZE_LAN, MAX_CHUNK_SIZE},
    encoder::SystemName,
    error::{Error, Result},
    handler::FailurePolicy,
    publisher::Compression,
    severity::Severity,
    transport::{TransportConfig, TransportKind},
};

use serde::Deserialize;

use std::time::Duration;

/// The name given to channels whose configuration doesn't name them
pub const DEFAULT_CHANNEL_NAME: &str = "gelf";

/// Raw channel configuration, as deserialized
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Minimum severity to ship; defaults to "warning"
    pub level: Option<String>,
    /// Logger identity; defaults to [`DEFAULT_CHANNEL_NAME`]
    pub name: Option<String>,
    /// Collector host (required)
    pub host: Option<String>,
    /// Collector port (required)
    pub port: Option<i64>,
    /// The GELF `host` field; when absent or null, this machine's hostname
    pub system_name: Option<String>,
    /// "udp" (the default) or "tcp"
    pub transport: Option<String>,
    /// Processor identifiers, in push order
    pub processors: Vec<String>,
    /// Maximum UDP datagram size; defaults to [`CHUNK_SIZE_LAN`]
    pub chunk_size: Option<usize>,
    /// "none", "gzip" or "zlib"; defaults to "zlib" over UDP & "none" over TCP
    pub compression: Option<String>,
    /// Inserted after the underscore of every (unprefixed) context field
    pub context_prefix: Option<String>,
    /// Drop undeliverable records silently rather than counting & reporting them
    pub ignore_error: bool,
    /// TCP connect & write timeout, in seconds
    pub timeout: Option<f64>,
}

/// Validated channel settings
#[derive(Clone, Debug, PartialEq)]
pub struct ChannelSettings {
    pub name: String,
    pub level: Severity,
    pub transport: TransportConfig,
    /// `None` means "resolve this machine's hostname"
    pub system_name: Option<SystemName>,
    pub processors: Vec<String>,
    pub chunk_size: usize,
    pub compression: Compression,
    pub context_prefix: String,
    pub failure_policy: FailurePolicy,
    pub timeout: Option<Duration>,
}

impl ChannelConfig {
    /// A configuration naming only the (required) destination
    pub fn new<S: Into<String>>(host: S, port: u16) -> ChannelConfig {
        ChannelConfig {
            host: Some(host.into()),
            port: Some(i64::from(port)),
            ..Default::default()
        }
    }
    /// Deserialize from a JSON value (e.g. one section of an application's configuration)
    pub fn from_value(value: serde_json::Value) -> Result<ChannelConfig> {
        serde_json::from_value(value).map_err(|err| Error::invalid_config(err.to_string()))
    }
    /// Deserialize from JSON text
    pub fn from_json(text: &str) -> Result<ChannelConfig> {
        serde_json::from_str(text).map_err(|err| Error::invalid_config(err.to_string()))
    }
    pub fn validate(&self) -> Result<ChannelSettings> {
        let host = match self.host.as_deref().map(str::trim) {
            Some(host) if !host.is_empty() => host.to_string(),
            Some(_) => return Err(Error::invalid_config("`host` may not be empty")),
            None => return Err(Error::invalid_config("`host` is required")),
        };
        let port = match self.port {
            Some(port) => u16::try_from(port)
                .ok()
                .filter(|port| *port != 0)
                .ok_or_else(|| {
                    Error::invalid_config(format!("`port` must be in 1-65535 (got {})", port))
                })?,
            None => return Err(Error::invalid_config("`port` is required")),
        };
        let kind = match &self.transport {
            Some(kind) => kind.parse::<TransportKind>()?,
            None => TransportKind::default(),
        };
        let level = match &self.level {
            Some(level) => level.parse::<Severity>()?,
            None => Severity::default(),
        };
        let name = match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            Some(_) => return Err(Error::invalid_config("`name` may not be empty")),
            None => DEFAULT_CHANNEL_NAME.to_string(),
        };
        let system_name = self.system_name.clone().map(SystemName::new).transpose()?;
        if let Some(empty) = self.processors.iter().find(|p| p.trim().is_empty()) {
            return Err(Error::invalid_config(format!(
                "processor identifiers may not be empty (got '{}')",
                empty
            )));
        }
        let chunk_size = self.chunk_size.unwrap_or(CHUNK_SIZE_LAN);
        if chunk_size <= CHUNK_HEADER_LEN || chunk_size > MAX_CHUNK_SIZE {
            return Err(Error::invalid_config(format!(
                "`chunk_size` must be between {} and {} bytes (got {})",
                CHUNK_HEADER_LEN + 1,
                MAX_CHUNK_SIZE,
                chunk_size
            )));
        }
        let compression = match (&self.compression, kind) {
            (Some(compression), _) => compression.parse::<Compression>()?,
            (None, TransportKind::Udp) => Compression::Zlib,
            (None, TransportKind::Tcp) => Compression::None,
        };
        if kind == TransportKind::Tcp && compression != Compression::None {
            return Err(Error::invalid_config(
                "GELF over TCP does not support compression",
            ));
        }
        let timeout = match self.timeout {
            Some(secs) => match Duration::try_from_secs_f64(secs) {
                Ok(timeout) if !timeout.is_zero() => Some(timeout),
                _ => {
                    return Err(Error::invalid_config(format!(
                        "`timeout` must be a positive number of seconds (got {})",
                        secs
                    )))
                }
            },
            None => None,
        };
        Ok(ChannelSettings {
            name,
            level,
            transport: TransportConfig { kind, host, port },
            system_name,
            processors: self.processors.clone(),
            chunk_size,
            compression,
            context_prefix: self.context_prefix.clone().unwrap_or_default(),
            failure_policy: if self.ignore_error {
                FailurePolicy::Ignore
            } else {
                FailurePolicy::Record
            },
            timeout,
        })
    }
}

#[cfg(test)]
mod test {

    use super::*;

    use serde_json::json;

    fn invalid(value: serde_json::Value) -> bool {
        matches!(
            ChannelConfig::from_value(value).and_then(|c| c.validate()),
            Err(Error::InvalidConfig { .. })
        )
    }

    #[test]
    fn defaults() {
        let settings = ChannelConfig::new("127.0.0.1", 12201).validate().unwrap();
        assert_eq!(settings.name, "gelf");
        assert_eq!(settings.level, Severity::Warning);
        assert_eq!(settings.transport.kind, TransportKind::Udp);
        assert_eq!(settings.system_name, None);
        assert!(settings.processors.is_empty());
        assert_eq!(settings.chunk_size, CHUNK_SIZE_LAN);
        assert_eq!(settings.compression, Compression::Zlib);
        assert_eq!(settings.context_prefix, "");
        assert_eq!(settings.failure_policy, FailurePolicy::Record);
        assert_eq!(settings.timeout, None);
    }

    #[test]
    fn everything() {
        let config = ChannelConfig::from_json(
            r#"{
                 "driver": "custom",
                 "level": "notice",
                 "name": "my-custom-name",
                 "host": "127.0.0.2",
                 "port": 12202,
                 "system_name": "my-system-name",
                 "transport": "tcp",
                 "processors": ["uid", "thread"],
                 "context_prefix": "ctxt_",
                 "ignore_error": true,
                 "timeout": 2.5
               }"#,
        )
        .unwrap();
        let settings = config.validate().unwrap();
        assert_eq!(settings.name, "my-custom-name");
        assert_eq!(settings.level, Severity::Notice);
        assert_eq!(
            settings.transport,
            TransportConfig {
                kind: TransportKind::Tcp,
                host: "127.0.0.2".to_string(),
                port: 12202
            }
        );
        assert_eq!(settings.system_name.unwrap().as_str(), "my-system-name");
        assert_eq!(settings.processors, vec!["uid", "thread"]);
        assert_eq!(settings.compression, Compression::None);
        assert_eq!(settings.context_prefix, "ctxt_");
        assert_eq!(settings.failure_policy, FailurePolicy::Ignore);
        assert_eq!(settings.timeout, Some(Duration::from_millis(2500)));
    }

    #[test]
    fn null_system_name() {
        let config = ChannelConfig::from_value(json!({
            "host": "127.0.0.1", "port": 12201, "system_name": null
        }))
        .unwrap();
        assert_eq!(config.validate().unwrap().system_name, None);
    }

    #[test]
    fn required_fields() {
        assert!(invalid(json!({})));
        assert!(invalid(json!({"port": 12201})));
        assert!(invalid(json!({"host": "127.0.0.1"})));
        assert!(invalid(json!({"host": "  ", "port": 12201})));
    }

    #[test]
    fn malformed_fields() {
        assert!(invalid(json!({"host": "h", "port": 0})));
        assert!(invalid(json!({"host": "h", "port": 65536})));
        assert!(invalid(json!({"host": "h", "port": -1})));
        assert!(invalid(json!({"host": "h", "port": "12201"})));
        assert!(invalid(json!({"host": "h", "port": 1, "level": "loud"})));
        assert!(invalid(json!({"host": "h", "port": 1, "transport": "http"})));
        assert!(invalid(json!({"host": "h", "port": 1, "compression": "lz4"})));
        assert!(invalid(
            json!({"host": "h", "port": 1, "transport": "tcp", "compression": "gzip"})
        ));
        assert!(invalid(json!({"host": "h", "port": 1, "chunk_size": 12})));
        assert!(invalid(json!({"host": "h", "port": 1, "chunk_size": 65508})));
        assert!(invalid(json!({"host": "h", "port": 1, "chunk_size": 1_000_000})));
        assert!(!invalid(json!({"host": "h", "port": 1, "chunk_size": 65507})));
        assert!(invalid(json!({"host": "h", "port": 1, "system_name": ""})));
        assert!(invalid(json!({"host": "h", "port": 1, "name": ""})));
        assert!(invalid(json!({"host": "h", "port": 1, "processors": ["uid", ""]})));
        assert!(invalid(json!({"host": "h", "port": 1, "timeout": 0})));
        assert!(invalid(json!({"host": "h", "port": 1, "timeout": -2.5})));
        // Too large for a Duration
        assert!(invalid(json!({"host": "h", "port": 1, "transport": "tcp", "timeout": 1e30})));
        // Rounds down to nothing
        assert!(invalid(json!({"host": "h", "port": 1, "transport": "tcp", "timeout": 1e-12})));
        assert!(!invalid(json!({"host": "h", "port": 65535})));
    }
}

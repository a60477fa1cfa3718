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
//! The GELF message model.
//!
//! A [`GelfMessage`] is the structured form of a single GELF [1.1] payload. It knows how to
//! serialize itself to JSON; compressing & transmitting the result are the business of the
//! [`Publisher`] & its [`Transport`]s.
//!
//! [1.1]: https://go2docs.graylog.org/current/getting_in_log_data/gelf.html
//! [`Publisher`]: crate::publisher::Publisher
//! [`Transport`]: crate::transport::Transport

use crate::error::{Error, Result};

use backtrace::Backtrace;
use chrono::prelude::*;
use serde::Serialize;
use serde_json::{Map, Value};

/// The GELF version we speak
pub const GELF_VERSION: &str = "1.1";

/// One GELF message
///
/// `host` & `short_message` are always present (although the latter may be empty). Additional
/// fields are kept in insertion order & are guaranteed to be `_`-prefixed, to consist only of
/// characters in `[A-Za-z0-9_.-]`, & to not be `_id` (which Graylog reserves).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GelfMessage {
    version: &'static str,
    host: String,
    short_message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    full_message: Option<String>,
    timestamp: f64,
    level: u8,
    #[serde(flatten)]
    additional: Map<String, Value>,
}

/// Convert a UTC timestamp to fractional seconds since the epoch, at microsecond resolution
pub fn gelf_timestamp(ts: &DateTime<Utc>) -> f64 {
    ts.timestamp() as f64 + f64::from(ts.timestamp_subsec_micros()) / 1_000_000.0
}

/// Returns true if `key` may be used as-is as the name of an additional field
pub fn is_valid_additional_key(key: &str) -> bool {
    key.len() > 1
        && key.starts_with('_')
        && key != "_id"
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'.' || b == b'-')
}

impl GelfMessage {
    pub fn new<H: Into<String>, M: Into<String>>(
        host: H,
        short_message: M,
        timestamp: f64,
        level: u8,
    ) -> GelfMessage {
        GelfMessage {
            version: GELF_VERSION,
            host: host.into(),
            short_message: short_message.into(),
            full_message: None,
            timestamp,
            level,
            additional: Map::new(),
        }
    }
    pub fn version(&self) -> &str {
        self.version
    }
    pub fn host(&self) -> &str {
        &self.host
    }
    pub fn short_message(&self) -> &str {
        &self.short_message
    }
    pub fn full_message(&self) -> Option<&str> {
        self.full_message.as_deref()
    }
    pub fn set_full_message<S: Into<String>>(&mut self, full_message: S) {
        self.full_message = Some(full_message.into());
    }
    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }
    pub fn level(&self) -> u8 {
        self.level
    }
    pub fn additional(&self) -> &Map<String, Value> {
        &self.additional
    }
    /// Set an additional field. `key` must already be in its wire form (see
    /// [`is_valid_additional_key`]); anything else is an [`Error::Encoding`].
    pub fn set_additional<K: Into<String>>(&mut self, key: K, value: Value) -> Result<()> {
        let key = key.into();
        if !is_valid_additional_key(&key) {
            return Err(Error::Encoding {
                source: format!("'{}' is not a legal GELF additional field name", key).into(),
                back: Backtrace::new(),
            });
        }
        self.additional.insert(key, value);
        Ok(())
    }
    /// Serialize this message to (uncompressed) JSON
    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|err| Error::Encoding {
            source: Box::new(err),
            back: Backtrace::new(),
        })
    }
}

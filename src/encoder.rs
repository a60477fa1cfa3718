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
//! Encoding [`LogRecord`]s as [`GelfMessage`]s.
//!
//! [`GelfEncoder`] is a pure transformation: it performs no I/O once constructed. The one piece of
//! environmental information it needs, the name of the host on which we're running, is resolved
//! exactly once when the encoder is built.

use crate::{
    error::{Error, Result},
    message::{gelf_timestamp, is_valid_additional_key, GelfMessage},
    record::LogRecord,
};

use backtrace::Backtrace;

type StdResult<T, E> = std::result::Result<T, E>;

/// The value of the GELF `host` field: a non-empty string identifying the originating system
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SystemName(String);

impl SystemName {
    pub fn new(name: String) -> Result<SystemName> {
        if name.trim().is_empty() {
            Err(Error::invalid_config("the system name may not be empty"))
        } else {
            Ok(SystemName(name))
        }
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::default::Default for SystemName {
    /// Attempt to figure-out a name for this system.
    ///
    /// We first try [gethostname()]; should that fail (or return something empty) we fall back to
    /// the local IP address, and failing *that* to "localhost". This can't fail.
    ///
    /// [gethostname()]: https://man7.org/linux/man-pages/man2/gethostname.2.html
    fn default() -> Self {
        hostname::get()
            .map_err(|err| Error::NoHostname {
                source: Box::new(err),
                back: Backtrace::new(),
            })
            // vvv :=> StdResult<SystemName, Error>
            .and_then(|hn| SystemName::new(hn.to_string_lossy().into_owned()))
            .or_else(|_err| {
                local_ip_address::local_ip()
                    .map_err(|_| Error::invalid_config("no local IP address"))
                    .and_then(|ip| SystemName::new(ip.to_string()))
            })
            .unwrap_or_else(|_| SystemName("localhost".to_string()))
    }
}

impl std::convert::TryFrom<String> for SystemName {
    type Error = Error;
    fn try_from(x: String) -> StdResult<Self, Self::Error> {
        SystemName::new(x)
    }
}

impl std::fmt::Display for SystemName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Turns [`LogRecord`]s into [`GelfMessage`]s.
///
/// - the message becomes `short_message`, untouched (it is *not* truncated; splitting large
///   payloads is the transport's job)
/// - the severity becomes `level`
/// - each context entry becomes an additional field (see [`GelfEncoder::field_name`])
/// - the record's channel, if any, becomes `_facility`
pub struct GelfEncoder {
    system_name: SystemName,
    context_prefix: String,
}

impl std::default::Default for GelfEncoder {
    fn default() -> Self {
        GelfEncoder {
            system_name: SystemName::default(),
            context_prefix: String::new(),
        }
    }
}

pub struct GelfEncoderBuilder {
    system_name: Option<SystemName>,
    context_prefix: String,
}

impl GelfEncoderBuilder {
    pub fn system_name(mut self, system_name: SystemName) -> Self {
        self.system_name = Some(system_name);
        self
    }
    pub fn system_name_as_string(mut self, system_name: String) -> Result<Self> {
        self.system_name = Some(SystemName::try_from(system_name)?);
        Ok(self)
    }
    /// Prefix inserted between the leading underscore & the context key for every context entry
    /// that isn't already underscore-prefixed.
    pub fn context_prefix(mut self, prefix: String) -> Result<Self> {
        if !prefix
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'.' || b == b'-')
        {
            return Err(Error::invalid_config(format!(
                "'{}' is not a legal context prefix",
                prefix
            )));
        }
        self.context_prefix = prefix;
        Ok(self)
    }
    /// Resolves the system name now, if one wasn't given
    pub fn build(self) -> GelfEncoder {
        GelfEncoder {
            system_name: self.system_name.unwrap_or_default(),
            context_prefix: self.context_prefix,
        }
    }
}

impl GelfEncoder {
    pub fn builder() -> GelfEncoderBuilder {
        GelfEncoderBuilder {
            system_name: None,
            context_prefix: String::new(),
        }
    }
    pub fn system_name(&self) -> &SystemName {
        &self.system_name
    }
    pub fn context_prefix(&self) -> &str {
        &self.context_prefix
    }
    /// Map a context key to the name of a GELF additional field.
    ///
    /// Keys without a leading underscore get one (followed by the context prefix), characters
    /// GELF doesn't allow in field names are replaced with underscores, & the one name Graylog
    /// reserves, `_id`, is renamed to `__id`. Empty keys (and the bare `_`) can't be mapped.
    ///
    /// The mapping isn't one-to-one: `"a b"` & `"a_b"` both become `_a_b`, and `"id"` & `"_id"`
    /// both become `__id`.
    pub fn field_name(&self, key: &str) -> Result<String> {
        let name = if key.starts_with('_') {
            key.to_string()
        } else if key.is_empty() {
            String::new()
        } else {
            format!("_{}{}", self.context_prefix, key)
        };
        let name: String = name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        match name.as_str() {
            "" | "_" => Err(Error::Encoding {
                source: format!("context key '{}' can't be used as a GELF field", key).into(),
                back: Backtrace::new(),
            }),
            "_id" => Ok("__id".to_string()),
            _ => Ok(name),
        }
    }
    /// Encode `record`. Where two context keys map to the same field name (see
    /// [`GelfEncoder::field_name`]), the one later in the context wins.
    pub fn encode(&self, record: &LogRecord) -> Result<GelfMessage> {
        let mut msg = GelfMessage::new(
            self.system_name.as_str(),
            record.message(),
            gelf_timestamp(&record.timestamp()),
            record.severity().syslog(),
        );
        if let Some(full) = record.full_message() {
            msg.set_full_message(full);
        }
        for (key, value) in record.context() {
            msg.set_additional(self.field_name(key)?, value.clone())?;
        }
        if !record.channel().is_empty() && !msg.additional().contains_key("_facility") {
            msg.set_additional("_facility", record.channel().into())?;
        }
        debug_assert!(msg.additional().keys().all(|k| is_valid_additional_key(k)));
        Ok(msg)
    }
}

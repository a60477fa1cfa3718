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

//! Handing GELF messages to one or more transports.

use crate::{
    error::{Error, Result},
    message::GelfMessage,
    transport::Transport,
};

use backtrace::Backtrace;
use flate2::write::{GzEncoder, ZlibEncoder};

use std::io::Write;

/// Optional compression applied to the serialized message before it's handed to the transports.
///
/// Graylog accepts gzip- & zlib-compressed payloads over UDP; GELF over TCP does not support
/// compression at all.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Compression {
    #[default]
    None,
    Gzip,
    Zlib,
}

impl Compression {
    /// Compress `json` (a no-op for [`Compression::None`])
    pub fn apply(self, json: Vec<u8>) -> Result<Vec<u8>> {
        fn encoding_error(err: std::io::Error) -> Error {
            Error::Encoding {
                source: Box::new(err),
                back: Backtrace::new(),
            }
        }
        match self {
            Compression::None => Ok(json),
            Compression::Gzip => {
                let mut enc = GzEncoder::new(Vec::new(), flate2::Compression::default());
                enc.write_all(&json).map_err(encoding_error)?;
                enc.finish().map_err(encoding_error)
            }
            Compression::Zlib => {
                let mut enc = ZlibEncoder::new(Vec::new(), flate2::Compression::default());
                enc.write_all(&json).map_err(encoding_error)?;
                enc.finish().map_err(encoding_error)
            }
        }
    }
}

impl std::fmt::Display for Compression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Compression::None => "none",
            Compression::Gzip => "gzip",
            Compression::Zlib => "zlib",
        })
    }
}

impl std::str::FromStr for Compression {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Compression::None),
            "gzip" => Ok(Compression::Gzip),
            "zlib" => Ok(Compression::Zlib),
            _ => Err(Error::invalid_config(format!(
                "unknown compression '{}' (expected 'none', 'gzip' or 'zlib')",
                s
            ))),
        }
    }
}

/// Owns an ordered collection of [`Transport`]s & delivers each [`GelfMessage`] to all of them.
///
/// The message is serialized (& compressed) exactly once; every transport receives the same bytes.
/// A transport failure never prevents delivery on the remaining transports; failures are gathered
/// into a single [`Error::DeliveryFailed`].
#[derive(Default)]
pub struct Publisher {
    transports: Vec<Box<dyn Transport>>,
    compression: Compression,
}

impl Publisher {
    pub fn new(compression: Compression) -> Publisher {
        Publisher {
            transports: Vec::new(),
            compression,
        }
    }
    /// Convenience constructor for the common single-destination case
    pub fn with_transport<T: Transport + 'static>(
        transport: T,
        compression: Compression,
    ) -> Publisher {
        let mut publisher = Publisher::new(compression);
        publisher.add_transport(Box::new(transport));
        publisher
    }
    /// Append a transport; transports are tried in the order in which they were added
    pub fn add_transport(&mut self, transport: Box<dyn Transport>) {
        self.transports.push(transport);
    }
    pub fn transports(&self) -> &[Box<dyn Transport>] {
        &self.transports
    }
    pub fn compression(&self) -> Compression {
        self.compression
    }
    /// Produce the bytes that would be sent for `message`
    pub fn payload(&self, message: &GelfMessage) -> Result<Vec<u8>> {
        self.compression.apply(message.to_json()?)
    }
    pub fn publish(&self, message: &GelfMessage) -> Result<()> {
        let payload = self.payload(message)?;
        let failures: Vec<Error> = self
            .transports
            .iter()
            .filter_map(|transport| transport.send(&payload).err())
            .collect();
        if failures.is_empty() {
            Ok(())
        } else {
            Err(Error::DeliveryFailed {
                failures,
                attempted: self.transports.len(),
                back: Backtrace::new(),
            })
        }
    }
    /// Release every transport's socket
    pub fn close(&self) {
        self.transports.iter().for_each(|transport| transport.close());
    }
}

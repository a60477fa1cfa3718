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
//! [gelf-channel](crate) errors

use backtrace::Backtrace;

/// [gelf-channel](crate) error type
///
/// This crate eschews libraries like [thiserror] & [anyhow] in favor of a straightforward
/// enumeration with a few match arms chosen on the basis of what the caller will need to respond.
/// Broadly:
///
/// - [`Error::InvalidConfig`] is returned at construction time & should be treated as fatal
/// - [`Error::EmptyProcessorStack`] indicates a logic error on the part of whoever is manipulating
///   a [`Handler`]'s processors
/// - everything else describes the fate of a single record, & is never surfaced through
///   [`Handler::handle`]
///
/// [thiserror]: https://docs.rs/thiserror
/// [anyhow]: https://docs.rs/anyhow
/// [`Handler`]: crate::handler::Handler
/// [`Handler::handle`]: crate::handler::Handler::handle
#[non_exhaustive]
pub enum Error {
    /// Missing or malformed channel configuration
    InvalidConfig { reason: String, back: Backtrace },
    /// A log record couldn't be represented as a GELF message
    Encoding {
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
        back: Backtrace,
    },
    /// One or more transports failed to deliver a message; `failures` holds one error per failed
    /// transport, in transport order
    DeliveryFailed {
        failures: Vec<Error>,
        attempted: usize,
        back: Backtrace,
    },
    /// Attempted to pop a processor off an empty stack
    EmptyProcessorStack { back: Backtrace },
    /// Failed to fetch hostname (via libc)
    NoHostname {
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
        back: Backtrace,
    },
    /// General transport layer error
    Transport {
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
        back: Backtrace,
    },
    /// A payload too large to be sent in 128 UDP chunks
    TooManyChunks {
        len: usize,
        chunks: usize,
        back: Backtrace,
    },
}

impl Error {
    /// Convenience constructor for [`Error::InvalidConfig`]
    pub fn invalid_config<S: Into<String>>(reason: S) -> Error {
        Error::InvalidConfig {
            reason: reason.into(),
            back: Backtrace::new(),
        }
    }
}

impl std::fmt::Display for Error {
    // `Error` is non-exhaustive so that adding variants won't be a breaking change to our
    // callers. That means the compiler won't catch us if we miss a variant here, so we
    // always include a `_` arm.
    #[allow(unreachable_patterns)]
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::InvalidConfig { reason, .. } => {
                write!(f, "Invalid GELF channel configuration: {}", reason)
            }
            Error::Encoding { source, .. } => {
                write!(f, "Failed to encode a GELF message: {}", source)
            }
            Error::DeliveryFailed {
                failures,
                attempted,
                ..
            } => {
                write!(
                    f,
                    "Delivery failed on {} of {} transport(s)",
                    failures.len(),
                    attempted
                )?;
                for failure in failures {
                    write!(f, "; {}", failure)?;
                }
                Ok(())
            }
            Error::EmptyProcessorStack { .. } => {
                write!(f, "You tried to pop from an empty processor stack.")
            }
            Error::NoHostname { source, .. } => {
                write!(f, "Couldn't determine this system's hostname: {}", source)
            }
            Error::Transport { source, .. } => write!(f, "Transport error: {}", source),
            Error::TooManyChunks { len, chunks, .. } => write!(
                f,
                "A {}-byte payload would need {} chunks (the maximum is 128); dropped",
                len, chunks
            ),
            _ => write!(f, "Other gelf-channel error"),
        }
    }
}

impl std::fmt::Debug for Error {
    #[allow(unreachable_patterns)]
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::InvalidConfig { back, .. } => write!(f, "{}\n{:?}", self, back),
            Error::Encoding { back, .. } => write!(f, "{}\n{:?}", self, back),
            Error::DeliveryFailed { back, .. } => write!(f, "{}\n{:?}", self, back),
            Error::EmptyProcessorStack { back } => write!(f, "{}\n{:?}", self, back),
            Error::NoHostname { back, .. } => write!(f, "{}\n{:?}", self, back),
            Error::Transport { back, .. } => write!(f, "{}\n{:?}", self, back),
            Error::TooManyChunks { back, .. } => write!(f, "{}\n{:?}", self, back),
            err => write!(f, "gelf-channel error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    #[allow(unreachable_patterns)]
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Encoding { source, .. }
            | Error::NoHostname { source, .. }
            | Error::Transport { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn display() {
        let err = Error::EmptyProcessorStack {
            back: Backtrace::new(),
        };
        assert_eq!(
            format!("{}", err),
            "You tried to pop from an empty processor stack."
        );

        let err = Error::DeliveryFailed {
            failures: vec![Error::TooManyChunks {
                len: 2_000_000,
                chunks: 246,
                back: Backtrace::new(),
            }],
            attempted: 2,
            back: Backtrace::new(),
        };
        let text = format!("{}", err);
        assert!(text.starts_with("Delivery failed on 1 of 2 transport(s); "));
        assert!(text.contains("246 chunks"));

        let err = Error::invalid_config("missing `host`");
        assert_eq!(
            format!("{}", err),
            "Invalid GELF channel configuration: missing `host`"
        );
    }
}

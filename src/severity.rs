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
//! Log record severities.
//!
//! [`Severity`] names the eight syslog severity levels that GELF borrows for its `level` field.
//! Unlike the constants in `<syslog.h>`, severities here compare by importance: a more severe
//! level is *greater* than a less severe one, so that "at least as severe as the threshold"
//! reads as `severity >= threshold`.

use crate::error::{Error, Result};

type StdResult<T, E> = std::result::Result<T, E>;

/// The eight severity levels defined by RFC [5424] (& used as-is by GELF). The discriminants
/// duplicate the syslog numeric values: 0 is the most severe, 7 the least.
///
/// [5424]: https://datatracker.ietf.org/doc/html/rfc5424
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    /// system is unusable
    Emergency = 0,
    /// action must be taken immediately
    Alert = 1,
    /// critical conditions
    Critical = 2,
    /// error conditions
    Error = 3,
    /// warning conditions
    Warning = 4,
    /// normal, but significant condition
    Notice = 5,
    /// informational message
    Info = 6,
    /// debug-level message
    Debug = 7,
}

impl Severity {
    /// All severities, least severe first.
    pub const ALL: [Severity; 8] = [
        Severity::Debug,
        Severity::Info,
        Severity::Notice,
        Severity::Warning,
        Severity::Error,
        Severity::Critical,
        Severity::Alert,
        Severity::Emergency,
    ];

    /// The syslog numeric value (the GELF `level` field)
    pub fn syslog(self) -> u8 {
        self as u8
    }

    /// Map a syslog numeric value back to a [`Severity`]; anything outside 0-7 is treated as
    /// [`Severity::Warning`].
    pub fn from_syslog(level: u8) -> Severity {
        match level {
            0 => Severity::Emergency,
            1 => Severity::Alert,
            2 => Severity::Critical,
            3 => Severity::Error,
            4 => Severity::Warning,
            5 => Severity::Notice,
            6 => Severity::Info,
            7 => Severity::Debug,
            _ => Severity::Warning,
        }
    }

    /// Lower-case name, as accepted by [`str::parse`]
    pub fn name(self) -> &'static str {
        match self {
            Severity::Emergency => "emergency",
            Severity::Alert => "alert",
            Severity::Critical => "critical",
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Notice => "notice",
            Severity::Info => "info",
            Severity::Debug => "debug",
        }
    }
}

impl std::default::Default for Severity {
    fn default() -> Self {
        Severity::Warning
    }
}

impl std::cmp::PartialOrd for Severity {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl std::cmp::Ord for Severity {
    // Lower syslog values are *more* severe.
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        other.syslog().cmp(&self.syslog())
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> StdResult<(), std::fmt::Error> {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Severity {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "emergency" | "emerg" => Ok(Severity::Emergency),
            "alert" => Ok(Severity::Alert),
            "critical" | "crit" => Ok(Severity::Critical),
            "error" | "err" => Ok(Severity::Error),
            "warning" | "warn" => Ok(Severity::Warning),
            "notice" => Ok(Severity::Notice),
            "info" | "informational" => Ok(Severity::Info),
            "debug" => Ok(Severity::Debug),
            _ => Err(Error::invalid_config(format!("unknown level '{}'", s))),
        }
    }
}

/// The mapping from [`tracing`] levels; `tracing` has no notion of notice or anything more severe
/// than an error.
///
/// [`tracing`]: https://docs.rs/tracing/latest/tracing/index.html
impl std::convert::From<&tracing::Level> for Severity {
    fn from(level: &tracing::Level) -> Self {
        match *level {
            tracing::Level::TRACE | tracing::Level::DEBUG => Severity::Debug,
            tracing::Level::INFO => Severity::Info,
            tracing::Level::WARN => Severity::Warning,
            tracing::Level::ERROR => Severity::Error,
        }
    }
}

#[cfg(test)]
mod severity_tests {
    use super::*;

    #[test]
    fn ordering() {
        assert!(Severity::Emergency > Severity::Alert);
        assert!(Severity::Error > Severity::Warning);
        assert!(Severity::Notice > Severity::Info);
        assert!(Severity::Info > Severity::Debug);
        let mut sorted = Severity::ALL;
        sorted.sort();
        assert_eq!(sorted, Severity::ALL);
    }

    #[test]
    fn syslog_values() {
        assert_eq!(Severity::Emergency.syslog(), 0);
        assert_eq!(Severity::Warning.syslog(), 4);
        assert_eq!(Severity::Debug.syslog(), 7);
        for s in Severity::ALL {
            assert_eq!(Severity::from_syslog(s.syslog()), s);
        }
        assert_eq!(Severity::from_syslog(8), Severity::Warning);
        assert_eq!(Severity::from_syslog(255), Severity::Warning);
    }

    #[test]
    fn parsing() {
        assert_eq!("notice".parse::<Severity>().unwrap(), Severity::Notice);
        assert_eq!("WARN".parse::<Severity>().unwrap(), Severity::Warning);
        assert_eq!(" Emergency ".parse::<Severity>().unwrap(), Severity::Emergency);
        assert!("verbose".parse::<Severity>().is_err());
        assert_eq!(format!("{}", Severity::Critical), "critical");
    }

    #[test]
    fn from_tracing() {
        assert_eq!(Severity::from(&tracing::Level::TRACE), Severity::Debug);
        assert_eq!(Severity::from(&tracing::Level::WARN), Severity::Warning);
        assert_eq!(Severity::from(&tracing::Level::ERROR), Severity::Error);
    }
}

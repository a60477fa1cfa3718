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

//! The GELF transport layer.
//!
//! This module defines the [`Transport`] trait that all implementations must support, as well as
//! the two network implementations GELF defines:
//!
//! - [`UdpTransport`]: connectionless & best-effort; payloads too large for one datagram are split
//!   into chunks (see [`chunk`](crate::chunk))
//! - [`TcpTransport`]: a persistent stream on which each message is terminated by a single null
//!   byte
//!
//! Neither performs any I/O at construction: sockets are created on the first call to
//! [`Transport::send`].
//!
//! # Examples
//!
//! ```rust
//! use gelf_channel::transport::{Transport, TransportKind, UdpTransport};
//! let transpo = UdpTransport::new("graylog.example.com", 12201);
//! assert_eq!(transpo.config().map(|c| c.kind), Some(TransportKind::Udp));
//! ```

use crate::{
    chunk::{self, CHUNK_HEADER_LEN, CHUNK_SIZE_LAN, MAX_CHUNK_SIZE},
    error::{Error, Result},
};

use backtrace::Backtrace;
use tracing::debug;

use std::{
    io::Write,
    net::{SocketAddr, TcpStream, ToSocketAddrs, UdpSocket},
    sync::{Mutex, MutexGuard},
    time::Duration,
};

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                     transport description                                      //
////////////////////////////////////////////////////////////////////////////////////////////////////

/// The two flavors of GELF transport
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TransportKind {
    Udp,
    Tcp,
}

impl std::default::Default for TransportKind {
    fn default() -> Self {
        TransportKind::Udp
    }
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            TransportKind::Udp => "udp",
            TransportKind::Tcp => "tcp",
        })
    }
}

impl std::str::FromStr for TransportKind {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "udp" => Ok(TransportKind::Udp),
            "tcp" => Ok(TransportKind::Tcp),
            _ => Err(Error::invalid_config(format!(
                "unknown transport '{}' (expected 'udp' or 'tcp')",
                s
            ))),
        }
    }
}

/// Where & how a network transport delivers; fixed at construction
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportConfig {
    pub kind: TransportKind,
    pub host: String,
    pub port: u16,
}

impl std::fmt::Display for TransportConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}://{}:{}", self.kind, self.host, self.port)
    }
}

impl TransportConfig {
    fn resolve(&self) -> Result<Vec<SocketAddr>> {
        let addrs: Vec<SocketAddr> = (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(transport_error)?
            .collect();
        if addrs.is_empty() {
            Err(Error::Transport {
                source: format!("{} resolved to no addresses", self).into(),
                back: Backtrace::new(),
            })
        } else {
            Ok(addrs)
        }
    }
}

fn transport_error(err: std::io::Error) -> Error {
    Error::Transport {
        source: Box::new(err),
        back: Backtrace::new(),
    }
}

// A poisoned lock just means some other thread panicked mid-send; the socket slot is still usable.
fn lock<T>(slot: &Mutex<T>) -> MutexGuard<'_, T> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                      transport mechanisms                                      //
////////////////////////////////////////////////////////////////////////////////////////////////////

/// Operations all transport layers must support.
pub trait Transport: Send + Sync {
    /// Send one complete (serialized & possibly compressed) GELF payload; any framing or chunking
    /// is the implementation's responsibility.
    fn send(&self, buf: &[u8]) -> Result<()>;
    /// Describe this transport's destination, if it has one
    fn config(&self) -> Option<&TransportConfig> {
        None
    }
    /// Release any socket this transport is holding; the next send will acquire a new one.
    fn close(&self) {}
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&self, buf: &[u8]) -> Result<()> {
        (**self).send(buf)
    }
    fn config(&self) -> Option<&TransportConfig> {
        (**self).config()
    }
    fn close(&self) {
        (**self).close()
    }
}

/// Sending GELF messages via UDP datagrams.
pub struct UdpTransport {
    config: TransportConfig,
    chunk_size: usize,
    socket: Mutex<Option<UdpSocket>>,
}

impl UdpTransport {
    /// Construct a [`Transport`] implementation via UDP at `host`:`port`, using the LAN chunk size.
    pub fn new<S: Into<String>>(host: S, port: u16) -> UdpTransport {
        UdpTransport {
            config: TransportConfig {
                kind: TransportKind::Udp,
                host: host.into(),
                port,
            },
            chunk_size: CHUNK_SIZE_LAN,
            socket: Mutex::new(None),
        }
    }
    /// Construct a [`Transport`] implementation via UDP whose datagrams will never exceed
    /// `chunk_size` bytes.
    pub fn with_chunk_size<S: Into<String>>(
        host: S,
        port: u16,
        chunk_size: usize,
    ) -> Result<UdpTransport> {
        if chunk_size <= CHUNK_HEADER_LEN || chunk_size > MAX_CHUNK_SIZE {
            return Err(Error::invalid_config(format!(
                "chunk size must be between {} and {} bytes (got {})",
                CHUNK_HEADER_LEN + 1,
                MAX_CHUNK_SIZE,
                chunk_size
            )));
        }
        let mut transport = UdpTransport::new(host, port);
        transport.chunk_size = chunk_size;
        Ok(transport)
    }
    /// Construct a [`Transport`] implementation via UDP at localhost:12201
    pub fn local() -> UdpTransport {
        UdpTransport::new("localhost", 12201)
    }
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }
    fn open(&self) -> Result<UdpSocket> {
        let addrs = self.config.resolve()?;
        // Bind to any available port on an address of the same family as the collector...
        let local: SocketAddr = if addrs[0].is_ipv4() {
            ([0, 0, 0, 0], 0).into()
        } else {
            ([0u16; 8], 0).into()
        };
        let socket = UdpSocket::bind(local).map_err(transport_error)?;
        // and connect to the collector:
        socket.connect(&addrs[..]).map_err(transport_error)?;
        Ok(socket)
    }
}

impl Transport for UdpTransport {
    fn send(&self, buf: &[u8]) -> Result<()> {
        let mut guard = lock(&self.socket);
        let socket = match guard.take() {
            Some(socket) => socket,
            None => self.open()?,
        };
        let socket: &UdpSocket = guard.insert(socket);
        if buf.len() <= self.chunk_size {
            socket.send(buf).map_err(transport_error)?;
            return Ok(());
        }
        // Chunks of a message are useless without their siblings, so bail on the first failure.
        for chunk in chunk::split(buf, self.chunk_size, rand::random())? {
            socket.send(&chunk.to_datagram()).map_err(transport_error)?;
        }
        Ok(())
    }
    fn config(&self) -> Option<&TransportConfig> {
        Some(&self.config)
    }
    fn close(&self) {
        *lock(&self.socket) = None;
    }
}

/// Sending GELF messages via a TCP stream
///
/// The connection is established on first use & kept open. Should a write fail, the connection is
/// dropped & re-established once, and the write retried; if *that* fails the error is returned &
/// the next send will start over with a fresh connection.
pub struct TcpTransport {
    config: TransportConfig,
    timeout: Option<Duration>,
    stream: Mutex<Option<TcpStream>>,
}

impl TcpTransport {
    /// Construct a [`Transport`] implementation via TCP at `host`:`port`.
    pub fn new<S: Into<String>>(host: S, port: u16) -> TcpTransport {
        TcpTransport {
            config: TransportConfig {
                kind: TransportKind::Tcp,
                host: host.into(),
                port,
            },
            timeout: None,
            stream: Mutex::new(None),
        }
    }
    /// Bound connection establishment & each write by `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> TcpTransport {
        self.timeout = Some(timeout);
        self
    }
    /// Construct a [`Transport`] implementation via TCP at localhost:12201
    pub fn local() -> TcpTransport {
        TcpTransport::new("localhost", 12201)
    }
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
    /// True if a connection is currently established
    pub fn is_connected(&self) -> bool {
        lock(&self.stream).is_some()
    }
    fn connect(&self) -> Result<TcpStream> {
        let addrs = self.config.resolve()?;
        let stream = match self.timeout {
            Some(timeout) => connect_any(&addrs, timeout).map_err(transport_error)?,
            None => TcpStream::connect(&addrs[..]).map_err(transport_error)?,
        };
        stream
            .set_write_timeout(self.timeout)
            .map_err(transport_error)?;
        Ok(stream)
    }
}

fn connect_any(addrs: &[SocketAddr], timeout: Duration) -> std::io::Result<TcpStream> {
    let mut last_err = std::io::Error::new(
        std::io::ErrorKind::AddrNotAvailable,
        "no addresses to connect to",
    );
    for addr in addrs {
        match TcpStream::connect_timeout(addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(err) => last_err = err,
        }
    }
    Err(last_err)
}

fn write_frame(stream: &mut TcpStream, frame: &[u8]) -> std::io::Result<()> {
    stream.write_all(frame)?;
    stream.flush()
}

impl Transport for TcpTransport {
    fn send(&self, buf: &[u8]) -> Result<()> {
        let mut frame = Vec::with_capacity(buf.len() + 1);
        frame.extend_from_slice(buf);
        frame.push(0);

        let mut guard = lock(&self.stream);
        if let Some(stream) = guard.as_mut() {
            match write_frame(stream, &frame) {
                Ok(()) => return Ok(()),
                Err(err) => debug!("write to {} failed ({}); reconnecting", self.config, err),
            }
            *guard = None;
        }

        let mut stream = self.connect()?;
        write_frame(&mut stream, &frame).map_err(transport_error)?;
        *guard = Some(stream);
        Ok(())
    }
    fn config(&self) -> Option<&TransportConfig> {
        Some(&self.config)
    }
    fn close(&self) {
        *lock(&self.stream) = None;
    }
}

#[cfg(test)]
mod test {

    use super::*;

    use crate::chunk::Chunk;

    use std::{
        io::Read,
        net::{Shutdown, TcpListener},
        thread,
    };

    #[test]
    fn kinds() {
        assert_eq!("UDP".parse::<TransportKind>().unwrap(), TransportKind::Udp);
        assert_eq!("tcp".parse::<TransportKind>().unwrap(), TransportKind::Tcp);
        assert!("http".parse::<TransportKind>().is_err());
        assert_eq!(TransportKind::default(), TransportKind::Udp);
        assert_eq!(
            format!("{}", UdpTransport::new("127.0.0.2", 12202).config().unwrap()),
            "udp://127.0.0.2:12202"
        );
    }

    #[test]
    fn construction_does_no_io() {
        // Neither of these hosts exist, but we shouldn't find that out until we try to send.
        let udp = UdpTransport::new("no-such-host.invalid", 12201);
        assert!(udp.send(b"{}").is_err());
        let tcp = TcpTransport::new("no-such-host.invalid", 12201);
        assert!(!tcp.is_connected());
        assert!(tcp.send(b"{}").is_err());
        assert!(!tcp.is_connected());
    }

    #[test]
    fn bad_chunk_size() {
        assert!(UdpTransport::with_chunk_size("127.0.0.1", 12201, 12).is_err());
        assert!(UdpTransport::with_chunk_size("127.0.0.1", 12201, MAX_CHUNK_SIZE + 1).is_err());
        assert!(UdpTransport::with_chunk_size("127.0.0.1", 12201, MAX_CHUNK_SIZE).is_ok());
        assert_eq!(
            UdpTransport::with_chunk_size("127.0.0.1", 12201, 13)
                .unwrap()
                .chunk_size(),
            13
        );
    }

    #[test]
    fn udp_single_datagram() {
        let server = UdpSocket::bind("127.0.0.1:0").unwrap();
        let port = server.local_addr().unwrap().port();
        let transport = UdpTransport::new("127.0.0.1", port);
        transport.send(b"{\"short_message\":\"hi\"}").unwrap();

        let mut buf = [0u8; 65536];
        let n = server.recv(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"{\"short_message\":\"hi\"}");
    }

    #[test]
    fn udp_chunked() {
        let server = UdpSocket::bind("127.0.0.1:0").unwrap();
        let port = server.local_addr().unwrap().port();
        let transport = UdpTransport::with_chunk_size("127.0.0.1", port, 512).unwrap();
        let payload: Vec<u8> = (0..5000u32).map(|i| (i % 256) as u8).collect();
        transport.send(&payload).unwrap();

        let expected = 5000usize.div_ceil(512 - CHUNK_HEADER_LEN);
        let mut rebuilt = Vec::new();
        let mut ids = Vec::new();
        let mut buf = [0u8; 65536];
        for i in 0..expected {
            let n = server.recv(&mut buf).unwrap();
            assert!(n <= 512);
            let chunk = Chunk::parse(&buf[..n]).unwrap();
            // Loopback preserves order
            assert_eq!(chunk.sequence_number() as usize, i);
            assert_eq!(chunk.sequence_count() as usize, expected);
            ids.push(chunk.message_id());
            rebuilt.extend_from_slice(chunk.fragment());
        }
        assert!(ids.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(rebuilt, payload);
    }

    #[test]
    fn udp_too_many_chunks() {
        let server = UdpSocket::bind("127.0.0.1:0").unwrap();
        let port = server.local_addr().unwrap().port();
        let transport = UdpTransport::with_chunk_size("127.0.0.1", port, 13).unwrap();
        assert!(matches!(
            transport.send(&[b'x'; 129]),
            Err(Error::TooManyChunks { .. })
        ));
    }

    #[test]
    fn tcp_reconnects_only_once() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let transport = TcpTransport::new("127.0.0.1", port).with_timeout(Duration::from_secs(5));
        transport.send(b"one").unwrap();
        assert!(transport.is_connected());

        // Take the collector away entirely: the open connection dies & there's nothing to
        // reconnect to.
        let (conn, _) = listener.accept().unwrap();
        drop(conn);
        drop(listener);

        // The first write or two may still be accepted by the kernel; after that the send must
        // fail (rather than keep trying) & leave the transport disconnected.
        let mut outcome = Ok(());
        for _ in 0..10 {
            thread::sleep(Duration::from_millis(50));
            outcome = transport.send(b"two");
            if outcome.is_err() {
                break;
            }
        }
        assert!(matches!(outcome, Err(Error::Transport { .. })));
        assert!(!transport.is_connected());
    }

    #[test]
    fn tcp_framing_and_reconnect() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = thread::spawn(move || {
            // First connection: read one frame, then hang up.
            let (mut conn, _) = listener.accept().unwrap();
            let mut first = Vec::new();
            let mut byte = [0u8; 1];
            loop {
                conn.read_exact(&mut byte).unwrap();
                first.push(byte[0]);
                if byte[0] == 0 {
                    break;
                }
            }
            conn.shutdown(Shutdown::Both).unwrap();
            drop(conn);
            // Second connection: read until the client goes away.
            let (mut conn, _) = listener.accept().unwrap();
            let mut rest = Vec::new();
            conn.read_to_end(&mut rest).unwrap();
            (first, rest)
        });

        let transport = TcpTransport::new("127.0.0.1", port).with_timeout(Duration::from_secs(5));
        assert!(!transport.is_connected());
        transport.send(b"one").unwrap();
        assert!(transport.is_connected());

        // Writes on a connection the peer has closed may be accepted by the kernel once before
        // failing; keep sending until the transport notices & moves to a new connection.
        let mut sent = Vec::new();
        for msg in [&b"two"[..], &b"three"[..], &b"four"[..], &b"five"[..]] {
            transport.send(msg).unwrap();
            sent.push(msg);
            thread::sleep(Duration::from_millis(50));
        }
        transport.close();
        assert!(!transport.is_connected());

        let (first, rest) = server.join().unwrap();
        assert_eq!(first, b"one\0");
        // Whatever arrived on the new connection is a sequence of complete, null-terminated frames
        // in send order.
        assert_eq!(rest.last(), Some(&0u8));
        let frames: Vec<&[u8]> = rest[..rest.len() - 1].split(|b| *b == 0).collect();
        assert!(!frames.is_empty());
        let tail: Vec<&[u8]> = sent[sent.len() - frames.len()..].to_vec();
        assert_eq!(frames, tail);
    }
}

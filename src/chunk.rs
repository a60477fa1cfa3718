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
//! GELF UDP chunking.
//!
//! A GELF payload too large for a single datagram is split into at most [`MAX_CHUNKS`] chunks,
//! each prefixed with a twelve byte header:
//!
//! ```text
//!  0      2              10    11    12
//!  +------+--------------+-----+-----+-------------------
//!  | 1e0f | message id   | seq | cnt | fragment ...
//!  +------+--------------+-----+-----+-------------------
//! ```
//!
//! All chunks of one message carry the same message id; the collector reassembles the fragments in
//! sequence order. Payloads that fit in a single datagram are sent without any header at all.

use crate::error::{Error, Result};

use backtrace::Backtrace;
use bytes::{BufMut, Bytes, BytesMut};

/// Magic bytes that open every chunk
pub const CHUNK_MAGIC: [u8; 2] = [0x1e, 0x0f];
/// Magic (2) + message id (8) + sequence number (1) + sequence count (1)
pub const CHUNK_HEADER_LEN: usize = 12;
/// Graylog discards messages with more chunks than this
pub const MAX_CHUNKS: usize = 128;
/// The largest UDP payload IPv4 can carry; no datagram may exceed this
pub const MAX_CHUNK_SIZE: usize = 65507;
/// Datagram size suitable for a local network (jumbo-frame friendly)
pub const CHUNK_SIZE_LAN: usize = 8154;
/// Datagram size suitable for the open internet (fits a 1500 byte MTU)
pub const CHUNK_SIZE_WAN: usize = 1420;

/// One chunk of a GELF message, borrowing its fragment from the original payload
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chunk<'a> {
    message_id: [u8; 8],
    sequence_number: u8,
    sequence_count: u8,
    fragment: &'a [u8],
}

impl<'a> Chunk<'a> {
    pub fn message_id(&self) -> [u8; 8] {
        self.message_id
    }
    pub fn sequence_number(&self) -> u8 {
        self.sequence_number
    }
    pub fn sequence_count(&self) -> u8 {
        self.sequence_count
    }
    pub fn fragment(&self) -> &'a [u8] {
        self.fragment
    }
    /// Lay this chunk out as a datagram: header followed by fragment
    pub fn to_datagram(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(CHUNK_HEADER_LEN + self.fragment.len());
        buf.put_slice(&CHUNK_MAGIC);
        buf.put_slice(&self.message_id);
        buf.put_u8(self.sequence_number);
        buf.put_u8(self.sequence_count);
        buf.put_slice(self.fragment);
        buf.freeze()
    }
    /// Recognize a chunked datagram; returns `None` for anything else (including a datagram
    /// holding an entire, unchunked, message).
    pub fn parse(datagram: &'a [u8]) -> Option<Chunk<'a>> {
        if datagram.len() < CHUNK_HEADER_LEN || datagram[..2] != CHUNK_MAGIC {
            return None;
        }
        let mut message_id = [0u8; 8];
        message_id.copy_from_slice(&datagram[2..10]);
        Some(Chunk {
            message_id,
            sequence_number: datagram[10],
            sequence_count: datagram[11],
            fragment: &datagram[CHUNK_HEADER_LEN..],
        })
    }
}

/// Split `payload` into chunks whose datagrams are no larger than `chunk_size` bytes.
///
/// Payloads of `chunk_size` bytes or fewer don't need chunking; callers should check for that
/// first (this function would return a single chunk). Fails with [`Error::TooManyChunks`] rather
/// than produce more than [`MAX_CHUNKS`] chunks.
pub fn split(payload: &[u8], chunk_size: usize, message_id: [u8; 8]) -> Result<Vec<Chunk<'_>>> {
    if chunk_size <= CHUNK_HEADER_LEN {
        return Err(Error::invalid_config(format!(
            "a chunk size of {} leaves no room for data",
            chunk_size
        )));
    }
    let fragment_len = chunk_size - CHUNK_HEADER_LEN;
    let count = payload.len().div_ceil(fragment_len).max(1);
    if count > MAX_CHUNKS {
        return Err(Error::TooManyChunks {
            len: payload.len(),
            chunks: count,
            back: Backtrace::new(),
        });
    }
    Ok(payload
        .chunks(fragment_len)
        .enumerate()
        .map(|(i, fragment)| Chunk {
            message_id,
            sequence_number: i as u8,
            sequence_count: count as u8,
            fragment,
        })
        .collect())
}

#[cfg(test)]
mod test {

    use super::*;

    const ID: [u8; 8] = [1, 2, 3, 4, 5, 6, 7, 8];

    #[test]
    fn header_layout() {
        let chunks = split(b"abcdef", 16, ID).unwrap();
        assert_eq!(chunks.len(), 2);
        let dg = chunks[1].to_datagram();
        assert_eq!(
            &dg[..],
            &[0x1e, 0x0f, 1, 2, 3, 4, 5, 6, 7, 8, 1, 2, b'e', b'f'][..]
        );
        let parsed = Chunk::parse(&dg).unwrap();
        assert_eq!(parsed, chunks[1]);
        assert!(Chunk::parse(b"{\"version\":\"1.1\"}").is_none());
    }

    #[test]
    fn chunks_respect_size_and_share_an_id() {
        let payload: Vec<u8> = (0..20_000u32).map(|i| (i % 251) as u8).collect();
        let chunks = split(&payload, CHUNK_SIZE_WAN, ID).unwrap();
        assert_eq!(chunks.len(), 15); // ceil(20000 / 1408)
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.message_id(), ID);
            assert_eq!(chunk.sequence_number() as usize, i);
            assert_eq!(chunk.sequence_count() as usize, chunks.len());
            assert!(chunk.to_datagram().len() <= CHUNK_SIZE_WAN);
        }
        let rebuilt: Vec<u8> = chunks.iter().flat_map(|c| c.fragment().to_vec()).collect();
        assert_eq!(rebuilt, payload);
    }

    #[test]
    fn chunk_limit() {
        let fragment = 100 - CHUNK_HEADER_LEN;
        let payload = vec![b'x'; fragment * MAX_CHUNKS];
        assert_eq!(split(&payload, 100, ID).unwrap().len(), MAX_CHUNKS);

        let payload = vec![b'x'; fragment * MAX_CHUNKS + 1];
        assert!(matches!(
            split(&payload, 100, ID),
            Err(Error::TooManyChunks { chunks: 129, .. })
        ));
    }

    #[test]
    fn tiny_chunk_size() {
        assert!(matches!(
            split(b"abc", CHUNK_HEADER_LEN, ID),
            Err(Error::InvalidConfig { .. })
        ));
    }
}

//! Fixed-size packet codec.
//!
//! Encoding and decoding are total: any identifier and any text can be
//! encoded, and any byte buffer decodes to some packet. Text longer than
//! [`PACKET_DATA_SIZE`] is truncated at the last UTF-8 boundary that fits.

use crate::opcode::Opcode;
use crate::{FILLER, PACKET_DATA_SIZE, PACKET_ID_SIZE, PACKET_SIZE};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier carried by a packet and echoed by its response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PacketId(i32);

impl PacketId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(raw: i32) -> Self {
        Self(raw)
    }

    /// The raw identifier.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }

    /// The identifier that follows this one, wrapping at `i32::MAX`.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for PacketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for PacketId {
    fn from(raw: i32) -> Self {
        Self(raw)
    }
}

impl From<PacketId> for i32 {
    fn from(id: PacketId) -> Self {
        id.0
    }
}

/// One wire packet: identifier plus a zero-filled payload.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Packet {
    id: PacketId,
    data: [u8; PACKET_DATA_SIZE],
}

impl Packet {
    /// Build a text packet, truncating `text` to the payload bound.
    #[must_use]
    pub fn new(id: PacketId, text: &str) -> Self {
        let mut data = [FILLER; PACKET_DATA_SIZE];
        let fitted = truncate_to_boundary(text, PACKET_DATA_SIZE);
        data[..fitted.len()].copy_from_slice(fitted.as_bytes());
        Self { id, data }
    }

    /// Build a packet around an already laid out payload.
    #[must_use]
    pub const fn from_raw(id: PacketId, data: [u8; PACKET_DATA_SIZE]) -> Self {
        Self { id, data }
    }

    /// Build a binary command: opcode byte followed by the argument text.
    #[must_use]
    pub fn command(id: PacketId, opcode: Opcode, argument: &str) -> Self {
        let mut data = [FILLER; PACKET_DATA_SIZE];
        data[0] = opcode.as_byte();
        let fitted = truncate_to_boundary(argument, PACKET_DATA_SIZE - 1);
        data[1..=fitted.len()].copy_from_slice(fitted.as_bytes());
        Self { id, data }
    }

    /// Build a numeric response holding `value` in the first eight payload bytes.
    #[must_use]
    pub fn with_f64(id: PacketId, value: f64) -> Self {
        let mut data = [FILLER; PACKET_DATA_SIZE];
        data[..8].copy_from_slice(&value.to_le_bytes());
        Self { id, data }
    }

    /// An empty payload answering `id`.
    #[must_use]
    pub fn empty(id: PacketId) -> Self {
        Self::from_raw(id, [FILLER; PACKET_DATA_SIZE])
    }

    /// Packet identifier.
    #[must_use]
    pub const fn id(&self) -> PacketId {
        self.id
    }

    /// Raw payload bytes.
    #[must_use]
    pub const fn data(&self) -> &[u8; PACKET_DATA_SIZE] {
        &self.data
    }

    /// Payload as text, cut at the first filler byte.
    #[must_use]
    pub fn text(&self) -> String {
        text_until_filler(&self.data)
    }

    /// Opcode of a binary command, if the first byte names one.
    #[must_use]
    pub fn opcode(&self) -> Option<Opcode> {
        Opcode::from_byte(self.data[0])
    }

    /// Argument text of a binary command.
    #[must_use]
    pub fn argument(&self) -> String {
        text_until_filler(&self.data[1..])
    }

    /// First eight payload bytes read as a little-endian `f64`.
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&self.data[..8]);
        f64::from_le_bytes(raw)
    }

    /// Encode into exactly [`PACKET_SIZE`] bytes.
    #[must_use]
    pub fn encode(&self) -> [u8; PACKET_SIZE] {
        let mut out = [FILLER; PACKET_SIZE];
        out[..PACKET_ID_SIZE].copy_from_slice(&self.id.get().to_le_bytes());
        out[PACKET_ID_SIZE..].copy_from_slice(&self.data);
        out
    }

    /// Encode into a shareable buffer.
    #[must_use]
    pub fn to_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(&self.encode())
    }

    /// Decode an encoded packet.
    #[must_use]
    pub fn decode(bytes: &[u8; PACKET_SIZE]) -> Self {
        let mut id = [0u8; PACKET_ID_SIZE];
        id.copy_from_slice(&bytes[..PACKET_ID_SIZE]);
        let mut data = [FILLER; PACKET_DATA_SIZE];
        data.copy_from_slice(&bytes[PACKET_ID_SIZE..]);
        Self {
            id: PacketId::new(i32::from_le_bytes(id)),
            data,
        }
    }

    /// Decode a buffer of any length.
    ///
    /// Short buffers are zero-padded and long buffers are cut to [`PACKET_SIZE`].
    #[must_use]
    pub fn from_slice(bytes: &[u8]) -> Self {
        let mut buf = [FILLER; PACKET_SIZE];
        let len = bytes.len().min(PACKET_SIZE);
        buf[..len].copy_from_slice(&bytes[..len]);
        Self::decode(&buf)
    }
}

impl fmt::Debug for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Packet")
            .field("id", &self.id)
            .field("text", &self.text())
            .finish()
    }
}

/// Longest prefix of `text` that fits in `max` bytes without splitting a character.
fn truncate_to_boundary(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

fn text_until_filler(bytes: &[u8]) -> String {
    let end = bytes
        .iter()
        .position(|&b| b == FILLER)
        .unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

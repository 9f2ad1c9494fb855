//! The single-packet codec: packet types, the `Packet` value, and the
//! text / binary / base64 encodings of one packet.
//!
//! A payload is a sequence of these; see [`crate::payload`] for the
//! framing that strings several packets together.

use crate::error::DecodeError;
use base64::{decode as base64_decode, encode as base64_encode};

/// The engine.io protocol version this codec speaks. The protocol has
/// no negotiation; v2 is always emitted.
pub const PROTOCOL_VERSION: u8 = 2;

/// A packet's symbolic role, and its wire code (0-6).
///
/// The ordering of the variants is load-bearing: [`PacketType::CODES`]
/// indexes into it by wire code, so reordering the variants changes
/// the wire format.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
#[repr(u8)]
pub enum PacketType {
    /// Sent by the server when a new connection is opened.
    Open = 0,

    /// Sent to request the shutdown of the connection.
    Close = 1,

    /// A ping message. The receiver answers with a `Pong` carrying the
    /// same data.
    Ping = 2,

    /// The answer to a `Ping`.
    Pong = 3,

    /// An actual data message.
    Message = 4,

    /// Requests that the other side flush its cache on the old
    /// transport and switch to the upgraded one.
    Upgrade = 5,

    /// Used to force a polling cycle.
    Noop = 6,
}

impl PacketType {
    /// All seven packet types, ordered by wire code. Used by
    /// [`PacketType::from_code`] as the code -> name table.
    pub const CODES: [PacketType; 7] = [
        PacketType::Open,
        PacketType::Close,
        PacketType::Ping,
        PacketType::Pong,
        PacketType::Message,
        PacketType::Upgrade,
        PacketType::Noop,
    ];

    /// The packet's wire code, 0-6.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Looks up a `PacketType` by its wire code. Any code outside
    /// `[0, 6]` is invalid.
    pub fn from_code(code: u8) -> Result<PacketType, DecodeError> {
        PacketType::CODES
            .get(code as usize)
            .copied()
            .ok_or(DecodeError::InvalidPacketType)
    }

    /// Parses a `PacketType` from its ASCII decimal digit.
    pub fn from_digit(ch: char) -> Result<PacketType, DecodeError> {
        let digit = ch.to_digit(10).ok_or(DecodeError::InvalidPacketType)?;
        PacketType::from_code(digit as u8)
    }

    /// The ASCII decimal digit this type encodes to in text form.
    pub fn to_digit(self) -> char {
        (b'0' + self.code()) as char
    }
}

/// A packet's optional payload data.
///
/// Engine.io's JS implementation distinguishes a text string from a
/// `Buffer`/`ArrayBuffer`; Rust has no such split, so both binary
/// representations collapse into the single `Bytes` variant here.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PacketData {
    /// UTF-8 text data.
    Str(String),

    /// Opaque binary data.
    Bytes(Vec<u8>),
}

/// One engine.io packet: a type tag plus optional data.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Packet {
    pub packet_type: PacketType,
    pub data: Option<PacketData>,
}

impl Packet {
    /// Constructs a new `Packet`.
    pub fn new(packet_type: PacketType, data: Option<PacketData>) -> Packet {
        Packet { packet_type, data }
    }

    /// Constructs a `Packet` with no payload data.
    pub fn empty(packet_type: PacketType) -> Packet {
        Packet::new(packet_type, None)
    }

    /// Constructs a `Packet` with string data.
    pub fn with_str(packet_type: PacketType, data: &str) -> Packet {
        Packet::with_string(packet_type, data.to_owned())
    }

    /// Constructs a `Packet` with string data.
    pub fn with_string(packet_type: PacketType, data: String) -> Packet {
        Packet::new(packet_type, Some(PacketData::Str(data)))
    }

    /// Constructs a `Packet` with binary data.
    pub fn with_binary(packet_type: PacketType, data: Vec<u8>) -> Packet {
        Packet::new(packet_type, Some(PacketData::Bytes(data)))
    }
}

/// The result of encoding a packet or payload: either text (the
/// common case, and the only form a `supports_binary = false`
/// transport ever sees) or raw bytes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Encoded {
    Str(String),
    Bytes(Vec<u8>),
}

impl Encoded {
    /// Borrows the encoded text, if this is the `Str` variant.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Encoded::Str(s) => Some(s),
            Encoded::Bytes(_) => None,
        }
    }

    /// Borrows the encoded bytes, whichever variant this is (text is
    /// viewed as its UTF-8 byte representation).
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Encoded::Str(s) => s.as_bytes(),
            Encoded::Bytes(b) => b,
        }
    }
}

/// A decoder's preference for how binary packet data should be
/// delivered.
///
/// This mirrors the JS API's `binaryType` option (`"buffer"` vs.
/// `"arraybuffer"`). Since [`PacketData::Bytes`] is Rust's only
/// representation of binary data, the two variants decode identically
/// here; the type is kept on decoder signatures for contract
/// compatibility with callers migrating from the JS-flavored API.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub enum BinaryType {
    Buffer,
    ArrayBuffer,
}

impl Default for BinaryType {
    fn default() -> BinaryType {
        BinaryType::Buffer
    }
}

/// An undecoded packet or payload buffer, tagged by whether the
/// transport delivered it as text or as raw bytes.
///
/// Decoding dispatches on this tag exactly as the reference
/// implementation dispatches on the runtime type of its input.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Input<'a> {
    Text(&'a str),
    Bytes(&'a [u8]),
}

/// Encodes a single packet.
///
/// * If the packet carries binary data and `supports_binary` is
///   `false`, the data is base64-wrapped into text (see
///   [`encode_base64_packet`]).
/// * If the packet carries binary data and `supports_binary` is
///   `true`, the result is the type code byte followed by the raw
///   data bytes.
/// * Otherwise (text or absent data) the result is the ASCII type
///   digit followed by the text, if any.
pub fn encode_packet(packet: &Packet, supports_binary: bool) -> Encoded {
    match &packet.data {
        Some(PacketData::Bytes(bytes)) => {
            if supports_binary {
                let mut out = Vec::with_capacity(1 + bytes.len());
                out.push(packet.packet_type.code());
                out.extend_from_slice(bytes);
                Encoded::Bytes(out)
            } else {
                Encoded::Str(encode_base64_packet(packet))
            }
        }
        Some(PacketData::Str(text)) => {
            let mut out = String::with_capacity(1 + text.len());
            out.push(packet.packet_type.to_digit());
            out.push_str(text);
            Encoded::Str(out)
        }
        None => {
            let mut out = String::with_capacity(1);
            out.push(packet.packet_type.to_digit());
            Encoded::Str(out)
        }
    }
}

/// Encodes a packet's binary data as a base64 text sidecar:
/// `b<type digit><base64 data>`.
///
/// If the packet has no data (or text data), the base64 portion is
/// simply empty / the text is encoded as its own UTF-8 bytes
/// respectively; in practice this function is only ever called for
/// packets carrying [`PacketData::Bytes`].
pub fn encode_base64_packet(packet: &Packet) -> String {
    let raw: &[u8] = match &packet.data {
        Some(PacketData::Bytes(bytes)) => bytes,
        Some(PacketData::Str(text)) => text.as_bytes(),
        None => &[],
    };
    let mut out = String::with_capacity(2 + raw.len() * 4 / 3 + 4);
    out.push('b');
    out.push(packet.packet_type.to_digit());
    out.push_str(&base64_encode(raw));
    out
}

/// Decodes a single packet from text or binary input.
///
/// See the module documentation for the grammar. `binary_type` only
/// affects callers migrating from the JS API; see [`BinaryType`].
pub fn decode_packet(input: Input<'_>, binary_type: BinaryType) -> Result<Packet, DecodeError> {
    let result = match input {
        Input::Text(text) => decode_text_packet(text, binary_type),
        Input::Bytes(bytes) => decode_binary_packet(bytes, binary_type),
    };
    match &result {
        Ok(packet) => log::trace!("decoded packet of type {:?}", packet.packet_type),
        Err(err) => log::debug!("failed to decode packet: {}", err),
    }
    result
}

fn decode_text_packet(text: &str, binary_type: BinaryType) -> Result<Packet, DecodeError> {
    let mut chars = text.chars();
    match chars.next() {
        Some('b') => decode_base64_packet(chars.as_str(), binary_type),
        Some(ch) => {
            let packet_type = PacketType::from_digit(ch)?;
            let rest = chars.as_str();
            if rest.is_empty() {
                Ok(Packet::empty(packet_type))
            } else {
                Ok(Packet::with_str(packet_type, rest))
            }
        }
        None => Err(DecodeError::InvalidPacketType),
    }
}

fn decode_binary_packet(bytes: &[u8], _binary_type: BinaryType) -> Result<Packet, DecodeError> {
    let (&code, rest) = bytes.split_first().ok_or(DecodeError::InvalidPacketType)?;
    let packet_type = PacketType::from_code(code)?;
    Ok(Packet::with_binary(packet_type, rest.to_vec()))
}

/// Decodes a base64-wrapped packet: the first character is the type
/// digit, the remainder is standard (RFC 4648, padded) base64.
///
/// `binary_type` is accepted for API symmetry with [`decode_packet`]
/// but has no effect; see [`BinaryType`].
pub fn decode_base64_packet(text: &str, _binary_type: BinaryType) -> Result<Packet, DecodeError> {
    let mut chars = text.chars();
    let type_char = chars.next().ok_or(DecodeError::InvalidPacketType)?;
    let packet_type = PacketType::from_digit(type_char)?;
    let data = base64_decode(chars.as_str())?;
    Ok(Packet::with_binary(packet_type, data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packet_type_from_code() {
        assert_eq!(PacketType::Ping, PacketType::from_code(2).unwrap());
        assert_eq!(PacketType::Ping, PacketType::from_digit('2').unwrap());
    }

    #[test]
    fn packet_type_from_code_out_of_range() {
        assert_eq!(
            DecodeError::InvalidPacketType,
            PacketType::from_code(7).unwrap_err()
        );
        assert_eq!(
            DecodeError::InvalidPacketType,
            PacketType::from_digit('7').unwrap_err()
        );
    }

    #[test]
    fn packet_type_to_digit() {
        assert_eq!(PacketType::Open.to_digit(), '0');
        assert_eq!(PacketType::Close.to_digit(), '1');
        assert_eq!(PacketType::Ping.to_digit(), '2');
        assert_eq!(PacketType::Pong.to_digit(), '3');
        assert_eq!(PacketType::Message.to_digit(), '4');
        assert_eq!(PacketType::Upgrade.to_digit(), '5');
        assert_eq!(PacketType::Noop.to_digit(), '6');
    }

    const BINARY_PAYLOAD: [u8; 9] = [1, 2, 3, 4, 6, 7, 8, 9, 10];
    const BINARY_PAYLOAD_B64: &str = "AQIDBAYHCAkK";
    const STRING_PAYLOAD: &str = "Hello World";

    #[test]
    fn encode_text_packet() {
        let p = Packet::with_str(PacketType::Message, STRING_PAYLOAD);
        assert_eq!(
            encode_packet(&p, false),
            Encoded::Str(format!("4{}", STRING_PAYLOAD))
        );
    }

    #[test]
    fn encode_binary_packet_supports_binary() {
        let p = Packet::with_binary(PacketType::Message, BINARY_PAYLOAD.to_vec());
        let mut expected = vec![PacketType::Message.code()];
        expected.extend_from_slice(&BINARY_PAYLOAD);
        assert_eq!(encode_packet(&p, true), Encoded::Bytes(expected));
    }

    #[test]
    fn encode_binary_packet_base64_fallback() {
        let p = Packet::with_binary(PacketType::Message, BINARY_PAYLOAD.to_vec());
        assert_eq!(
            encode_packet(&p, false),
            Encoded::Str(format!("b4{}", BINARY_PAYLOAD_B64))
        );
    }

    #[test]
    fn encode_empty_packet() {
        let p = Packet::empty(PacketType::Ping);
        assert_eq!(encode_packet(&p, false), Encoded::Str("2".to_owned()));
    }

    #[test]
    fn decode_text_packet_roundtrip() {
        let p = Packet::with_str(PacketType::Message, STRING_PAYLOAD);
        let text = match encode_packet(&p, false) {
            Encoded::Str(s) => s,
            Encoded::Bytes(_) => panic!("expected text encoding"),
        };
        let decoded = decode_packet(Input::Text(&text), BinaryType::Buffer).unwrap();
        assert_eq!(p, decoded);
    }

    #[test]
    fn decode_binary_packet_roundtrip() {
        let p = Packet::with_binary(PacketType::Message, BINARY_PAYLOAD.to_vec());
        let bytes = match encode_packet(&p, true) {
            Encoded::Bytes(b) => b,
            Encoded::Str(_) => panic!("expected binary encoding"),
        };
        let decoded = decode_packet(Input::Bytes(&bytes), BinaryType::Buffer).unwrap();
        assert_eq!(p, decoded);
    }

    #[test]
    fn decode_base64_packet_roundtrip() {
        let p = Packet::with_binary(PacketType::Message, BINARY_PAYLOAD.to_vec());
        let text = match encode_packet(&p, false) {
            Encoded::Str(s) => s,
            Encoded::Bytes(_) => panic!("expected text encoding"),
        };
        let decoded = decode_packet(Input::Text(&text), BinaryType::Buffer).unwrap();
        assert_eq!(p, decoded);
    }

    #[test]
    fn decode_empty_string_packet() {
        let p = decode_packet(Input::Text("4"), BinaryType::Buffer).unwrap();
        assert_eq!(p.packet_type, PacketType::Message);
        assert_eq!(p.data, None);
    }

    #[test]
    fn decode_empty_binary_packet() {
        let p = decode_packet(Input::Text("b4"), BinaryType::Buffer).unwrap();
        assert_eq!(p.packet_type, PacketType::Message);
        assert_eq!(p.data, Some(PacketData::Bytes(Vec::new())));
    }

    #[test]
    fn decode_unknown_type_character() {
        assert_eq!(
            decode_packet(Input::Text("9hello"), BinaryType::Buffer).unwrap_err(),
            DecodeError::InvalidPacketType
        );
    }

    #[test]
    fn decode_non_digit_type_character() {
        assert_eq!(
            decode_packet(Input::Text("xhello"), BinaryType::Buffer).unwrap_err(),
            DecodeError::InvalidPacketType
        );
    }

    #[test]
    fn decode_binary_packet_out_of_range_type() {
        assert_eq!(
            decode_packet(Input::Bytes(&[9, 1, 2, 3]), BinaryType::Buffer).unwrap_err(),
            DecodeError::InvalidPacketType
        );
    }

    #[test]
    fn decode_empty_input() {
        assert_eq!(
            decode_packet(Input::Text(""), BinaryType::Buffer).unwrap_err(),
            DecodeError::InvalidPacketType
        );
        assert_eq!(
            decode_packet(Input::Bytes(&[]), BinaryType::Buffer).unwrap_err(),
            DecodeError::InvalidPacketType
        );
    }

    #[test]
    fn decode_bad_base64() {
        let err = decode_packet(Input::Text("b4not valid base64!!"), BinaryType::Buffer)
            .unwrap_err();
        assert!(matches!(err, DecodeError::Base64(_)));
    }
}

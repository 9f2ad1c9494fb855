//! A codec for the engine.io v2 wire protocol.
//!
//! This crate implements only the packet and payload framing:
//! encoding and decoding a single [`Packet`] in text, binary, or
//! base64 form, and framing a sequence of packets into a payload
//! using either the text `<len>:<data>` grammar or the binary
//! `<kind><digits>0xFF<body>` grammar. The transport that carries
//! these bytes (HTTP long-polling, WebSocket), the handshake, and the
//! heartbeat schedule are all out of scope — they are expected to
//! call into this crate with already-assembled packets or raw
//! buffers.
//!
//! ```
//! use engineio_codec::{packet, Packet, PacketType};
//!
//! let message = Packet::with_str(PacketType::Message, "hello world");
//! let encoded = packet::encode_packet(&message, false);
//! assert_eq!(encoded.as_str(), Some("4hello world"));
//! ```

pub mod error;
pub mod packet;
pub mod payload;

pub use error::DecodeError;
pub use packet::{
    decode_base64_packet, decode_packet, encode_base64_packet, encode_packet, BinaryType, Encoded,
    Input, Packet, PacketData, PacketType, PROTOCOL_VERSION,
};
pub use payload::{
    decode_binary_payload, decode_payload, decode_payload_to_vec, decode_text_payload,
    encode_binary_payload, encode_payload, encode_text_payload,
};

//! The payload codec: framing several packets into one transport
//! message, in either of engine.io's two payload grammars.
//!
//! The text grammar is `<len>:<data>` segments concatenated back to
//! back, where `<len>` counts the characters of `<data>`. The binary
//! grammar is `<kind><digits>0xFF<body>` segments, where `<kind>` and
//! `<digits>` are raw numeric bytes rather than ASCII digit
//! characters. See [`encode_binary_payload`] for the exact shape.

use crate::error::DecodeError;
use crate::packet::{decode_packet, encode_packet, BinaryType, Encoded, Input, Packet};

/// A length-prefixed or kind-tagged framing error the binary decoder
/// uses to reject a malformed "kind" header byte. Reuses
/// [`DecodeError::InvalidPacketType`] since the kind byte, like a type
/// code, identifies which branch of the grammar a segment takes.
const INVALID_KIND: DecodeError = DecodeError::InvalidPacketType;

/// Encodes a payload for a transport that does or does not support
/// binary framing, per the `supports_binary` capability flag.
pub fn encode_payload(packets: &[Packet], supports_binary: bool) -> Encoded {
    if supports_binary {
        Encoded::Bytes(encode_binary_payload(packets))
    } else {
        Encoded::Str(encode_text_payload(packets))
    }
}

/// Decodes a payload, dispatching on whether `input` is text or raw
/// bytes, and invokes `cb` once per decoded packet with
/// `(result, index, total)`.
///
/// Returning `false` from `cb` stops further callbacks for a text
/// payload. The binary decoder always delivers every packet (or the
/// single error) since it must materialize the whole payload before
/// the total packet count is known.
pub fn decode_payload<F>(input: Input<'_>, binary_type: BinaryType, cb: F)
where
    F: FnMut(Result<Packet, DecodeError>, usize, usize) -> bool,
{
    match input {
        Input::Text(text) => decode_text_payload_cb(text, binary_type, cb),
        Input::Bytes(bytes) => decode_binary_payload_cb(bytes, binary_type, cb),
    }
}

/// Decodes a payload directly to a `Vec<Packet>`, without the
/// callback indirection. The primary, ergonomic entry point for
/// callers that don't need early cancellation or incremental
/// progress. Like every decode path in this module, a failure is
/// logged at debug level before being returned.
pub fn decode_payload_to_vec(
    input: Input<'_>,
    binary_type: BinaryType,
) -> Result<Vec<Packet>, DecodeError> {
    match input {
        Input::Text(text) => decode_text_payload(text, binary_type),
        Input::Bytes(bytes) => decode_binary_payload(bytes, binary_type),
    }
}

/// Encodes packets using the `<len>:<data>` text grammar. An empty
/// packet list encodes to the literal `"0:"`, matching the reference
/// implementation rather than an empty string.
pub fn encode_text_payload(packets: &[Packet]) -> String {
    if packets.is_empty() {
        return "0:".to_owned();
    }

    let mut out = String::new();
    for packet in packets {
        let body = match encode_packet(packet, false) {
            Encoded::Str(text) => text,
            Encoded::Bytes(_) => unreachable!("text payload packets never encode to raw bytes"),
        };
        out.push_str(&body.chars().count().to_string());
        out.push(':');
        out.push_str(&body);
    }
    out
}

/// Decodes a text payload directly to a `Vec<Packet>`.
///
/// The whole payload is parsed before any packet is returned, since
/// this crate's `(index, total)` callback contract (see
/// [`decode_text_payload_cb`]) requires the total packet count to be
/// known up front — a deliberate departure from the reference
/// decoder, which can report a running byte cursor without finishing
/// the scan.
pub fn decode_text_payload(text: &str, binary_type: BinaryType) -> Result<Vec<Packet>, DecodeError> {
    let chars: Vec<char> = text.chars().collect();
    let mut packets = Vec::new();

    let result = decode_text_payload_inner(&chars, &mut packets, binary_type);
    match result {
        Ok(()) => Ok(packets),
        Err(err) => {
            log::debug!("rejecting text payload: {}", err);
            Err(err)
        }
    }
}

fn decode_text_payload_inner(
    chars: &[char],
    packets: &mut Vec<Packet>,
    binary_type: BinaryType,
) -> Result<(), DecodeError> {
    let mut cursor = 0usize;
    let mut length_buf = String::new();

    while cursor < chars.len() {
        let ch = chars[cursor];
        if ch != ':' {
            length_buf.push(ch);
            cursor += 1;
            continue;
        }

        let n = parse_canonical_length(&length_buf)?;
        cursor += 1; // past ':'
        if cursor + n > chars.len() {
            return Err(DecodeError::UnexpectedEof);
        }

        if n > 0 {
            let body: String = chars[cursor..cursor + n].iter().collect();
            packets.push(decode_packet(Input::Text(&body), binary_type)?);
        }

        cursor += n;
        length_buf.clear();
    }

    if !length_buf.is_empty() {
        return Err(DecodeError::TrailingData);
    }

    Ok(())
}

/// Decodes a text payload, invoking `cb` per packet with
/// `(result, index, total)`. See [`decode_text_payload`] for why the
/// whole payload must parse successfully before the first callback
/// fires; `cb` returning `false` stops delivery of the remaining
/// already-decoded packets.
pub fn decode_text_payload_cb<F>(text: &str, binary_type: BinaryType, mut cb: F)
where
    F: FnMut(Result<Packet, DecodeError>, usize, usize) -> bool,
{
    match decode_text_payload(text, binary_type) {
        Ok(packets) => {
            let total = packets.len();
            for (index, packet) in packets.into_iter().enumerate() {
                if !cb(Ok(packet), index, total) {
                    break;
                }
            }
        }
        Err(err) => {
            cb(Err(err), 0, 1);
        }
    }
}

fn parse_canonical_length(length_buf: &str) -> Result<usize, DecodeError> {
    if length_buf.is_empty() {
        return Err(DecodeError::InvalidLengthPrefix);
    }
    let n: usize = length_buf
        .parse()
        .map_err(|_| DecodeError::InvalidLengthPrefix)?;
    if length_buf != n.to_string() {
        return Err(DecodeError::InvalidLengthPrefix);
    }
    Ok(n)
}

/// Encodes packets using the binary `<kind><digits>0xFF<body>`
/// grammar. `<kind>` is the raw byte `0` (text body) or `1` (binary
/// body); `<digits>` is the decimal length of `<body>`, one byte per
/// digit holding that digit's *numeric value* (`0x03`, not the ASCII
/// character `'3'`).
pub fn encode_binary_payload(packets: &[Packet]) -> Vec<u8> {
    let mut out = Vec::new();
    for packet in packets {
        match encode_packet(packet, true) {
            Encoded::Str(text) => {
                out.push(0);
                push_length_digits(&mut out, text.len());
                out.push(0xFF);
                out.extend_from_slice(text.as_bytes());
            }
            Encoded::Bytes(bytes) => {
                out.push(1);
                push_length_digits(&mut out, bytes.len());
                out.push(0xFF);
                out.extend_from_slice(&bytes);
            }
        }
    }
    out
}

fn push_length_digits(out: &mut Vec<u8>, len: usize) {
    for ch in len.to_string().chars() {
        out.push(ch.to_digit(10).expect("decimal formatting yields only digit chars") as u8);
    }
}

/// Decodes a binary payload directly to a `Vec<Packet>`.
pub fn decode_binary_payload(bytes: &[u8], binary_type: BinaryType) -> Result<Vec<Packet>, DecodeError> {
    let mut packets = Vec::new();
    let result = decode_binary_payload_inner(bytes, &mut packets, binary_type);
    match result {
        Ok(()) => Ok(packets),
        Err(err) => {
            log::debug!("rejecting binary payload: {}", err);
            Err(err)
        }
    }
}

fn decode_binary_payload_inner(
    bytes: &[u8],
    packets: &mut Vec<Packet>,
    binary_type: BinaryType,
) -> Result<(), DecodeError> {
    let mut cursor = 0usize;

    while cursor < bytes.len() {
        let is_string = match bytes[cursor] {
            0 => true,
            1 => false,
            _ => return Err(INVALID_KIND),
        };
        cursor += 1;

        let mut digits = String::new();
        loop {
            let byte = *bytes.get(cursor).ok_or(DecodeError::UnexpectedEof)?;
            cursor += 1;
            if byte == 0xFF {
                break;
            }
            if byte > 9 {
                return Err(DecodeError::InvalidLengthPrefix);
            }
            digits.push((b'0' + byte) as char);
        }
        if digits.is_empty() {
            return Err(DecodeError::InvalidLengthPrefix);
        }
        let len: usize = digits
            .parse()
            .map_err(|_| DecodeError::InvalidLengthPrefix)?;

        if cursor + len > bytes.len() {
            return Err(DecodeError::UnexpectedEof);
        }
        let body = &bytes[cursor..cursor + len];
        let packet = if is_string {
            let text = std::str::from_utf8(body)?;
            decode_packet(Input::Text(text), binary_type)?
        } else {
            decode_packet(Input::Bytes(body), binary_type)?
        };
        packets.push(packet);
        cursor += len;
    }

    Ok(())
}

/// Decodes a binary payload, invoking `cb` per packet with
/// `(result, index, total)`. Unlike the text decoder, there is no
/// early-cancellation path: the whole buffer must be materialized to
/// even find the packet boundaries, so `cb`'s return value is ignored.
pub fn decode_binary_payload_cb<F>(bytes: &[u8], binary_type: BinaryType, mut cb: F)
where
    F: FnMut(Result<Packet, DecodeError>, usize, usize) -> bool,
{
    match decode_binary_payload(bytes, binary_type) {
        Ok(packets) => {
            let total = packets.len();
            for (index, packet) in packets.into_iter().enumerate() {
                cb(Ok(packet), index, total);
            }
        }
        Err(err) => {
            cb(Err(err), 0, 1);
        }
    }
}

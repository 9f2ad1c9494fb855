//! Error types produced by the packet and payload codecs.

use std::str::Utf8Error;

use base64::DecodeError as Base64Error;
use thiserror::Error;

/// The error type for all decode operations in this crate.
///
/// This replaces the reference engine.io implementation's convention of
/// returning a sentinel `(type=error, data="parser error")` packet on
/// malformed input: every decode function here returns a proper
/// `Result`, but the "reject the whole payload on the first error"
/// policy is preserved (see [`crate::payload`]).
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum DecodeError {
    /// The leading character (text) or byte (binary) did not identify a
    /// valid packet type in `[0, 6]`.
    #[error("invalid or unknown packet type")]
    InvalidPacketType,

    /// A length prefix was missing, non-numeric, or not in canonical
    /// decimal form (e.g. a leading zero).
    #[error("malformed length prefix")]
    InvalidLengthPrefix,

    /// A declared length ran past the end of the available input.
    #[error("input ended before the declared length was satisfied")]
    UnexpectedEof,

    /// Trailing input remained after the last complete segment was
    /// consumed (e.g. digits with no following `:`, or no `0xFF`
    /// terminator).
    #[error("trailing data did not form a complete segment")]
    TrailingData,

    /// The base64 sidecar of a binary packet could not be decoded.
    #[error("invalid base64 data: {0}")]
    Base64(#[from] Base64Error),

    /// A binary payload declared a text-kind segment whose bytes were
    /// not valid UTF-8.
    #[error("invalid UTF-8 in packet body: {0}")]
    Utf8(#[from] Utf8Error),
}

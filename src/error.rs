use alloc::string::String;

use crate::numbers::NumberKind;

/// Result type used throughout this crate.
pub type Result<T> = core::result::Result<T, Error>;

/// Error type for `BinaryReader` and `BinaryWriter`.
///
/// Every variant carries the structured context needed to assert on it precisely; the `Display`
/// implementation only renders that context.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    /// A read needed more bytes than the stream (or the caller's budget) had left.
    #[error(transparent)]
    EndOfStream(#[from] EndOfStreamError),

    /// Malformed UTF-8 was found while decoding characters or strings.
    #[error(transparent)]
    InvalidUtf8Character(#[from] InvalidUtf8CharacterError),

    /// An encoding token that is not supported.
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    /// A value to be written does not fit the type it is written as.
    #[error(transparent)]
    OutOfBounds(#[from] OutOfBoundsError),

    /// A parameter is structurally invalid.
    #[error(transparent)]
    InvalidArgument(#[from] InvalidArgumentError),

    /// A maximal 4-byte sequence decoded to a value past U+10FFFF. This cannot come from
    /// well-formed UTF-8 and means the input is corrupt.
    #[error("UTF-8 decode: code point {code_point:#x} at position {position} exceeds the Unicode range")]
    CodePointOutOfRange {
        /// Position of the leading byte of the sequence.
        position: usize,
        /// The decoded value.
        code_point: u32,
    },
}

/// The ways a read can run out of data.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum EndOfStreamError {
    /// A fixed-size read found fewer bytes than it needs.
    #[error("{operation} expects {expected} bytes to be left in the stream, but only {remaining} byte(s) are remaining.")]
    NotEnoughBytes {
        /// The reader method that failed.
        operation: &'static str,
        /// Bytes the operation needs.
        expected: usize,
        /// Bytes left in the stream.
        remaining: usize,
    },

    /// A character or string read started at the end of the stream.
    #[error("{operation} requires at least one byte to be left in the stream, but 0 bytes are remaining.")]
    NoBytesLeft {
        /// The reader method that failed.
        operation: &'static str,
    },

    /// The stream ended in the middle of a 7-bit encoded length prefix.
    #[error("read_string ran out of stream when reading length prefix.")]
    PrefixTruncated,

    /// A 7-bit encoded length prefix did not terminate within 5 bytes.
    #[error("read_string encountered a string prefix that takes more than 5 bytes")]
    PrefixTooLong,

    /// The length prefix announces more bytes than the stream holds.
    #[error("read_string failed when trying to read string of length {expected} byte(s), only {remaining} byte(s) are remaining.")]
    StringTooLong {
        /// Byte length from the prefix.
        expected: usize,
        /// Bytes left after the prefix.
        remaining: usize,
    },

    /// A UTF-8 sequence runs past the end of the buffer.
    #[error("Utf8 sequence at position {position} is {expected} bytes long, but only {remaining} byte(s) are left in the buffer.")]
    Utf8NotEnoughBytesInBuffer {
        /// Position of the leading byte.
        position: usize,
        /// Length announced by the leading byte.
        expected: usize,
        /// Bytes from the leading byte to the end of the buffer.
        remaining: usize,
    },

    /// A UTF-8 sequence runs past the number of bytes the caller allowed to be read.
    #[error("Utf8 sequence at position {position} is {expected} bytes long, but only {allowed} more byte(s) are allowed to be read.")]
    Utf8NotEnoughBytesAllowed {
        /// Position of the leading byte.
        position: usize,
        /// Length announced by the leading byte.
        expected: usize,
        /// Bytes from the leading byte to the end of the budget.
        allowed: usize,
    },
}

/// Malformed UTF-8.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum InvalidUtf8CharacterError {
    /// The byte cannot start a UTF-8 sequence.
    #[error("Invalid leading byte found at position {position}, expected prefix of 0x, 110x, 1110x or 11110x, got '{byte:08b}' instead.")]
    InvalidLeadingByte {
        /// Position of the byte.
        position: usize,
        /// The byte.
        byte: u8,
    },

    /// A byte inside a multi-byte sequence is not of the form `10xxxxxx`.
    #[error("Byte #{byte_number} in UTF8 sequence starting at {sequence_start} was expected to be a continuation byte, got '{byte:08b}' instead.")]
    NotContinuationByte {
        /// Position of the leading byte.
        sequence_start: usize,
        /// 1-based index of the bad byte within the sequence (the leading byte is #1).
        byte_number: usize,
        /// The bad byte.
        byte: u8,
    },

    /// The sequence encodes a UTF-16 surrogate, which is not a Unicode scalar value.
    #[error("Utf8 sequence at position {position} encodes the surrogate {code_point:#06x}, which is not a valid character.")]
    Surrogate {
        /// Position of the leading byte.
        position: usize,
        /// The decoded surrogate.
        code_point: u32,
    },
}

/// An encoding token that is not one of the supported encodings.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("'{encoding}' is not a supported encoding, use one of {supported} instead.", supported = crate::Encoding::SUPPORTED)]
pub struct EncodingError {
    /// The rejected token.
    pub encoding: String,
}

/// A value outside the inclusive range of the type it is written as.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("Number of type '{kind}' must be between {min} and {max}, got {value} instead.", min = .kind.min_str(), max = .kind.max_str())]
pub struct OutOfBoundsError {
    /// The type the value was written as.
    pub kind: NumberKind,
    /// The rejected value, as given.
    pub value: String,
}

/// A structurally invalid parameter.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct InvalidArgumentError {
    /// Human-readable description.
    pub message: String,
    /// Name of the parameter.
    pub argument: &'static str,
    /// The rejected value, rendered with `Debug`/`Display`.
    pub value: String,
}

impl InvalidArgumentError {
    pub(crate) fn new(
        message: impl Into<String>,
        argument: &'static str,
        value: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            argument,
            value: value.into(),
        }
    }
}

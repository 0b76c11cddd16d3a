//! Strict UTF-8 encoding and incremental decoding.
//!
//! The decoder classifies each sequence by its leading byte and checks every continuation byte,
//! so that a malformed stream is reported at the exact byte that broke it. Like .NET's decoder
//! (and unlike `core::str::from_utf8`) it does not reject overlong forms.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use crate::error::{EndOfStreamError, Error, InvalidArgumentError, InvalidUtf8CharacterError, Result};

const CONTINUATION_MASK: u8 = 0b1100_0000;
const CONTINUATION_PREFIX: u8 = 0b1000_0000;

/// Returns `true` if `byte` has the form `10xxxxxx`.
#[inline(always)]
pub fn is_continuation_byte(byte: u8) -> bool {
    (byte & CONTINUATION_MASK) == CONTINUATION_PREFIX
}

/// Returns the length of the sequence that `lead` starts, or `None` if `lead` cannot start one.
#[inline(always)]
pub fn sequence_len(lead: u8) -> Option<usize> {
    match lead {
        0x00..=0x7f => Some(1),
        0xc0..=0xdf => Some(2),
        0xe0..=0xef => Some(3),
        0xf0..=0xf7 => Some(4),
        _ => None,
    }
}

/// Appends the UTF-8 encoding of `code_points` to `out`.
///
/// Every element must be a Unicode scalar value (not a surrogate, not above U+10FFFF). On error
/// `out` is left untouched and the error names the index of the first bad element.
pub fn encode_code_points(code_points: &[u32], out: &mut Vec<u8>) -> Result<()> {
    let start = out.len();
    for (index, &code_point) in code_points.iter().enumerate() {
        let Some(c) = char::from_u32(code_point) else {
            out.truncate(start);
            return Err(InvalidArgumentError::new(
                format!(
                    "Codepoint at position #{index} in the UTF-8 data-to-write is not valid, \
                     should be a Unicode scalar value."
                ),
                "code_points",
                format!("{code_point:#x}"),
            )
            .into());
        };
        out.extend_from_slice(c.encode_utf8(&mut [0; 4]).as_bytes());
    }
    Ok(())
}

/// Decodes the code point that starts at `position`.
///
/// `limit` is the end of the range the caller allows to be consumed; it is clamped to
/// `data.len()`. Returns the character and the position just past it.
pub fn decode_char(data: &[u8], position: usize, limit: usize) -> Result<(char, usize)> {
    let limit = limit.min(data.len());
    let Some(&lead) = data[..limit].get(position) else {
        return Err(EndOfStreamError::NoBytesLeft {
            operation: "decode_char",
        }
        .into());
    };
    if lead < 0x80 {
        return Ok((lead as char, position + 1));
    }

    let Some(len) = sequence_len(lead) else {
        tracing::trace!(position, lead, "invalid UTF-8 leading byte");
        return Err(InvalidUtf8CharacterError::InvalidLeadingByte {
            position,
            byte: lead,
        }
        .into());
    };

    let remaining = data.len() - position;
    if remaining < len {
        return Err(EndOfStreamError::Utf8NotEnoughBytesInBuffer {
            position,
            expected: len,
            remaining,
        }
        .into());
    }

    let allowed = limit - position;
    if allowed < len {
        return Err(EndOfStreamError::Utf8NotEnoughBytesAllowed {
            position,
            expected: len,
            allowed,
        }
        .into());
    }

    // The leading byte keeps 7 - len payload bits.
    let mut code_point = (lead & (0x7f >> len)) as u32;
    for (i, &byte) in data[position + 1..position + len].iter().enumerate() {
        if !is_continuation_byte(byte) {
            tracing::trace!(position, byte, "invalid UTF-8 continuation byte");
            return Err(InvalidUtf8CharacterError::NotContinuationByte {
                sequence_start: position,
                byte_number: i + 2,
                byte,
            }
            .into());
        }
        code_point = (code_point << 6) | (byte & 0x3f) as u32;
    }

    match char::from_u32(code_point) {
        Some(c) => Ok((c, position + len)),
        None if code_point > char::MAX as u32 => Err(Error::CodePointOutOfRange {
            position,
            code_point,
        }),
        None => Err(InvalidUtf8CharacterError::Surrogate {
            position,
            code_point,
        }
        .into()),
    }
}

/// The result of decoding a run of characters.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Decoded {
    /// The decoded text.
    pub text: String,
    /// Number of characters in `text`.
    pub chars: usize,
    /// Position just past the last decoded byte.
    pub end: usize,
}

/// Decodes characters starting at `position` until `max_chars` characters have been decoded or
/// `limit` is reached, whichever comes first.
pub fn decode(data: &[u8], mut position: usize, max_chars: usize, limit: usize) -> Result<Decoded> {
    let limit = limit.min(data.len());
    let mut text = String::new();
    let mut chars = 0;

    while position < limit && chars < max_chars {
        let (c, next) = decode_char(data, position, limit)?;
        text.push(c);
        chars += 1;
        position = next;
    }

    Ok(Decoded {
        text,
        chars,
        end: position,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(data: &[u8]) -> Result<Decoded> {
        decode(data, 0, usize::MAX, data.len())
    }

    #[test]
    fn sequence_lengths() {
        assert_eq!(sequence_len(b'a'), Some(1));
        assert_eq!(sequence_len(0b1100_0000), Some(2));
        assert_eq!(sequence_len(0b1110_0000), Some(3));
        assert_eq!(sequence_len(0b1111_0000), Some(4));
        assert_eq!(sequence_len(0b1000_0000), None);
        assert_eq!(sequence_len(0b1111_1000), None);
        assert_eq!(sequence_len(0xff), None);
    }

    #[test]
    fn one_of_each_length() {
        let s = "a\u{e9}\u{20ac}\u{1f600}";
        let decoded = decode_all(s.as_bytes()).unwrap();
        assert_eq!(decoded.text, s);
        assert_eq!(decoded.chars, 4);
        assert_eq!(decoded.end, 1 + 2 + 3 + 4);
    }

    #[test]
    fn overlong_forms_are_accepted() {
        let decoded = decode_all(&[0xc0, 0x80]).unwrap();
        assert_eq!(decoded.text, "\0");
    }

    #[test]
    fn stops_at_max_chars() {
        let decoded = decode(b"abcdef", 1, 3, 6).unwrap();
        assert_eq!(decoded.text, "bcd");
        assert_eq!(decoded.end, 4);
    }

    #[test]
    fn invalid_leading_bytes() {
        for byte in [0x80, 0xbf, 0xf8, 0xff] {
            assert_eq!(
                decode_all(&[b'x', byte, b'y']),
                Err(InvalidUtf8CharacterError::InvalidLeadingByte { position: 1, byte }.into())
            );
        }
    }

    #[test]
    fn buffer_is_checked_before_budget() {
        assert_eq!(
            decode_char(&[0xe2, 0x82], 0, 1),
            Err(EndOfStreamError::Utf8NotEnoughBytesInBuffer {
                position: 0,
                expected: 3,
                remaining: 2,
            }
            .into())
        );
        assert_eq!(
            decode_char(&[b'a', 0xe2, 0x82, 0xac], 1, 3),
            Err(EndOfStreamError::Utf8NotEnoughBytesAllowed {
                position: 1,
                expected: 3,
                allowed: 2,
            }
            .into())
        );
    }

    #[test]
    fn bad_continuation_byte_is_numbered_within_its_sequence() {
        assert_eq!(
            decode_all(&[b'a', 0xf0, 0x9f, 0x98, 0x41]),
            Err(InvalidUtf8CharacterError::NotContinuationByte {
                sequence_start: 1,
                byte_number: 4,
                byte: 0x41,
            }
            .into())
        );
        assert_eq!(
            decode_all(&[0xc3, 0xc3]),
            Err(InvalidUtf8CharacterError::NotContinuationByte {
                sequence_start: 0,
                byte_number: 2,
                byte: 0xc3,
            }
            .into())
        );
    }

    #[test]
    fn surrogates_are_rejected() {
        assert_eq!(
            decode_all(&[0xed, 0xa0, 0x80]),
            Err(InvalidUtf8CharacterError::Surrogate {
                position: 0,
                code_point: 0xd800,
            }
            .into())
        );
    }

    #[test]
    fn beyond_unicode_range_is_fatal() {
        assert_eq!(
            decode_all(&[0xf4, 0x90, 0x80, 0x80]),
            Err(Error::CodePointOutOfRange {
                position: 0,
                code_point: 0x110000,
            })
        );
        assert_eq!(
            decode_all(&[0xf7, 0xbf, 0xbf, 0xbf]),
            Err(Error::CodePointOutOfRange {
                position: 0,
                code_point: 0x1fffff,
            })
        );
    }

    #[test]
    fn nothing_left_to_decode() {
        let no_bytes: Result<(char, usize)> = Err(EndOfStreamError::NoBytesLeft {
            operation: "decode_char",
        }
        .into());
        assert_eq!(decode_char(&[], 0, 0), no_bytes);
        assert_eq!(decode_char(b"ab", 2, 5), no_bytes);
        assert_eq!(decode_char(b"ab", 1, 1), no_bytes);
        assert_eq!(decode_char(b"ab", 1, 10), Ok(('b', 2)));
    }

    #[test]
    fn encode() {
        let mut out = Vec::new();
        encode_code_points(&[0x41, 0xe9, 0x20ac, 0x1f600], &mut out).unwrap();
        assert_eq!(out, "A\u{e9}\u{20ac}\u{1f600}".as_bytes());
    }

    #[test]
    fn encode_rejects_non_scalar_values() {
        let mut out = b"keep".to_vec();
        let err = encode_code_points(&[0x41, 0x110000], &mut out).unwrap_err();
        let Error::InvalidArgument(err) = err else {
            panic!("expected InvalidArgument, got {err:?}");
        };
        assert_eq!(err.argument, "code_points");
        assert_eq!(err.value, "0x110000");
        assert!(err.message.contains("#1"));
        assert_eq!(out, b"keep");

        assert!(encode_code_points(&[0xdfff], &mut out).is_err());
    }
}

//! The variable-length integer that .NET's `BinaryWriter` puts in front of strings.
//!
//! Each byte encodes 7 bits of the integer, least significant bits first, and 1 bit (the high
//! bit) indicating whether there are more bytes following this one.

use alloc::vec::Vec;

use crate::error::{EndOfStreamError, Result};

const MORE: u8 = 0x80;
const MASK: u8 = 0x7f;

/// An encoded 32-bit value never needs more than this many bytes.
pub const MAX_ENCODED_LEN: usize = 5;

/// Reads a 7-bit encoded integer from `data`, starting at `position`. Returns the value and the
/// position just past the prefix.
///
/// Because 32 is not evenly divisible by 7, the fifth byte has some meaningless bits in it. Those
/// bits are discarded rather than rejected, which matches the .NET implementation.
pub fn read_7bit_encoded_int(data: &[u8], mut position: usize) -> Result<(u32, usize)> {
    let mut shift: u32 = 0;
    let mut n: u32 = 0;

    loop {
        // A sixth byte means the stream is corrupt; this is checked before running out of data.
        if shift == 7 * MAX_ENCODED_LEN as u32 {
            return Err(EndOfStreamError::PrefixTooLong.into());
        }

        let Some(&b) = data.get(position) else {
            return Err(EndOfStreamError::PrefixTruncated.into());
        };
        position += 1;

        n |= ((b & MASK) as u32) << shift;

        if (b & MORE) == 0 {
            break;
        }

        shift += 7;
    }

    Ok((n, position))
}

/// Appends `value` to `out` as a 7-bit encoded integer.
pub fn write_7bit_encoded_int(value: u32, out: &mut Vec<u8>) {
    let mut n = value;

    while n >= MORE as u32 {
        out.push((n as u8 & MASK) | MORE);
        n >>= 7;
    }
    out.push(n as u8);
}

/// Number of bytes `write_7bit_encoded_int` emits for `value`.
pub fn encoded_len(value: u32) -> usize {
    let significant_bits = 32 - value.leading_zeros() as usize;
    significant_bits.div_ceil(7).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    const CASES: &[(u32, &[u8])] = &[
        (0, &[0x00]),
        (1, &[0x01]),
        (127, &[0x7f]),
        (128, &[0x80, 0x01]),
        (255, &[0xff, 0x01]),
        (256, &[0x80, 0x02]),
        (12345, &[0xb9, 0x60]),
        (0x001f_ffff, &[0xff, 0xff, 0x7f]),
        (0x0020_0000, &[0x80, 0x80, 0x80, 0x01]),
        (0x7fff_ffff, &[0xff, 0xff, 0xff, 0xff, 0x07]),
        (0xffff_ffff, &[0xff, 0xff, 0xff, 0xff, 0x0f]),
    ];

    #[test]
    fn encode() {
        for &(x, bytes) in CASES {
            let mut out = Vec::new();
            write_7bit_encoded_int(x, &mut out);
            assert_eq!(out, bytes, "x = {x} (0x{x:x})");
            assert_eq!(encoded_len(x), bytes.len(), "x = {x} (0x{x:x})");
        }
    }

    #[test]
    fn decode() {
        for &(expected_x, bytes) in CASES {
            let decoded = read_7bit_encoded_int(bytes, 0).unwrap();
            assert_eq!(decoded, (expected_x, bytes.len()), "x = {expected_x} (0x{expected_x:x})");
        }
    }

    #[test]
    fn decode_at_offset() {
        assert_eq!(read_7bit_encoded_int(&[0xaa, 0x80, 0x01, 0xbb], 1), Ok((128, 3)));
    }

    #[test]
    fn fifth_byte_extra_bits_are_ignored() {
        assert_eq!(
            read_7bit_encoded_int(&[0xff, 0xff, 0xff, 0xff, 0x7f], 0),
            Ok((0xffff_ffff, 5))
        );
    }

    #[test]
    fn too_long() {
        // Five continuation bytes are rejected whether or not more data follows.
        for data in [
            &[0x81, 0x81, 0x81, 0x81, 0x81, 0x81][..],
            &[0x80, 0x80, 0x80, 0x80, 0x80][..],
        ] {
            assert_eq!(
                read_7bit_encoded_int(data, 0),
                Err(Error::EndOfStream(EndOfStreamError::PrefixTooLong))
            );
        }
    }

    #[test]
    fn truncated() {
        for data in [&[][..], &[0x80][..], &[0xff, 0xff, 0xff, 0xff][..]] {
            assert_eq!(
                read_7bit_encoded_int(data, 0),
                Err(Error::EndOfStream(EndOfStreamError::PrefixTruncated))
            );
        }
    }
}

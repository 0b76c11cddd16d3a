use alloc::string::{String, ToString};

use zerocopy::byteorder::{BE, F32, F64, I16, I32, I64, LE, U16, U32, U64};

use crate::error::{EndOfStreamError, InvalidArgumentError, Result};
use crate::{int7, utf8, Encoding, Endianness};

/// Reads values from a slice of bytes. The values are encoded using the rules defined by .NET's
/// `System.IO.BinaryWriter`, optionally with big-endian byte order.
///
/// Most simple fixed-size types are encoded using the in-memory byte representation of the type,
/// in the reader's byte order. Strings are UTF-8, prefixed with their length in bytes encoded as
/// a 7-bit variable-length integer.
///
/// The reader keeps a cursor into the slice. To read a sub-range of a larger buffer, hand the
/// reader that sub-slice; `len()` and `position()` are then relative to it.
///
/// Reads are all-or-nothing: when a `read_*` method fails, `position()` is the same as it was
/// before the call.
#[derive(Clone, Debug)]
pub struct BinaryReader<'a> {
    data: &'a [u8],
    position: usize,
    endianness: Endianness,
}

macro_rules! read_fixed {
    ($($(#[$attr:meta])* $name:ident -> $ty:ty as $wire:ident;)*) => {
        $(
            $(#[$attr])*
            #[inline(always)]
            pub fn $name(&mut self) -> Result<$ty> {
                let bytes = self.take_cbytes(stringify!($name))?;
                Ok(match self.endianness {
                    Endianness::Little => $wire::<LE>::from_bytes(bytes).get(),
                    Endianness::Big => $wire::<BE>::from_bytes(bytes).get(),
                })
            }
        )*
    };
}

impl<'a> BinaryReader<'a> {
    /// Creates a little-endian reader positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_endianness(data, Endianness::Little)
    }

    /// Creates a reader with the given byte order, positioned at the start of `data`.
    pub fn with_endianness(data: &'a [u8], endianness: Endianness) -> Self {
        Self {
            data,
            position: 0,
            endianness,
        }
    }

    /// Length of the stream, in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the stream has no bytes at all.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Current position in the stream, from which the next read happens.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Moves the cursor. Positions past the end of the stream are clamped to `len()`.
    pub fn set_position(&mut self, position: usize) {
        if position > self.data.len() {
            tracing::debug!(position, len = self.data.len(), "clamping reader position");
        }
        self.position = position.min(self.data.len());
    }

    /// Returns `true` once every byte has been read (`position() == len()`).
    pub fn is_end_of_stream(&self) -> bool {
        self.position >= self.data.len()
    }

    /// Number of bytes left to read.
    pub fn remaining_bytes(&self) -> usize {
        self.data.len() - self.position
    }

    /// The bytes that have not been read yet.
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.position..]
    }

    /// Byte order used for multi-byte values.
    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// Changes the byte order used by subsequent reads.
    pub fn set_endianness(&mut self, endianness: Endianness) {
        self.endianness = endianness;
    }

    fn ensure_remaining(&self, expected: usize, operation: &'static str) -> Result<()> {
        let remaining = self.remaining_bytes();
        if remaining < expected {
            tracing::trace!(operation, expected, remaining, "read past end of stream");
            return Err(EndOfStreamError::NotEnoughBytes {
                operation,
                expected,
                remaining,
            }
            .into());
        }
        Ok(())
    }

    fn take_cbytes<const N: usize>(&mut self, operation: &'static str) -> Result<[u8; N]> {
        self.ensure_remaining(N, operation)?;
        let mut bytes = [0u8; N];
        bytes.copy_from_slice(&self.data[self.position..self.position + N]);
        self.position += N;
        Ok(bytes)
    }

    /// Reads a slice of bytes whose length is `len`. This function returns a slice reference
    /// to the bytes; it does not copy them.
    #[inline(always)]
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        self.ensure_remaining(len, "read_bytes")?;
        let bytes = &self.data[self.position..self.position + len];
        self.position += len;
        Ok(bytes)
    }

    /// Reads a small array of bytes, with a constant length.
    #[inline(always)]
    pub fn read_cbytes<const N: usize>(&mut self) -> Result<[u8; N]> {
        self.take_cbytes("read_cbytes")
    }

    /// Reads a `bool`. Zero is `false`; any other value is `true`.
    #[inline(always)]
    pub fn read_bool(&mut self) -> Result<bool> {
        let [b] = self.take_cbytes("read_bool")?;
        Ok(b != 0)
    }

    /// Reads a single `u8` value.
    #[inline(always)]
    pub fn read_u8(&mut self) -> Result<u8> {
        let [b] = self.take_cbytes("read_u8")?;
        Ok(b)
    }

    /// Reads a single `i8` value (two's complement).
    #[inline(always)]
    pub fn read_i8(&mut self) -> Result<i8> {
        let [b] = self.take_cbytes("read_i8")?;
        Ok(b as i8)
    }

    read_fixed! {
        /// Reads an `i16` in the reader's byte order.
        read_i16 -> i16 as I16;
        /// Reads a `u16` in the reader's byte order.
        read_u16 -> u16 as U16;
        /// Reads an `i32` in the reader's byte order.
        read_i32 -> i32 as I32;
        /// Reads a `u32` in the reader's byte order.
        read_u32 -> u32 as U32;
        /// Reads an `i64` in the reader's byte order.
        read_i64 -> i64 as I64;
        /// Reads a `u64` in the reader's byte order.
        read_u64 -> u64 as U64;
        /// Reads an IEEE-754 single-precision float in the reader's byte order.
        read_f32 -> f32 as F32;
        /// Reads an IEEE-754 double-precision float in the reader's byte order.
        read_f64 -> f64 as F64;
    }

    /// Reads an `i64` and returns it as an exact decimal string.
    pub fn read_i64_string(&mut self) -> Result<String> {
        Ok(self.read_i64()?.to_string())
    }

    /// Reads a `u64` and returns it as an exact decimal string.
    pub fn read_u64_string(&mut self) -> Result<String> {
        Ok(self.read_u64()?.to_string())
    }

    /// Reads an `i64` and converts it to the nearest `f64`. Magnitudes above 2^53 lose precision;
    /// use [`read_i64`](Self::read_i64) or [`read_i64_string`](Self::read_i64_string) when that
    /// matters.
    pub fn read_i64_f64(&mut self) -> Result<f64> {
        Ok(self.read_i64()? as f64)
    }

    /// Reads a `u64` and converts it to the nearest `f64`. Values above 2^53 lose precision.
    pub fn read_u64_f64(&mut self) -> Result<f64> {
        Ok(self.read_u64()? as f64)
    }

    fn ensure_not_at_end(&self, operation: &'static str) -> Result<()> {
        if self.is_end_of_stream() {
            tracing::trace!(operation, "read past end of stream");
            return Err(EndOfStreamError::NoBytesLeft { operation }.into());
        }
        Ok(())
    }

    /// Reads a single character. It takes 1 to 4 bytes, as announced by the UTF-8 leading byte.
    pub fn read_char(&mut self, encoding: Encoding) -> Result<char> {
        let Encoding::Utf8 = encoding;
        self.ensure_not_at_end("read_char")?;

        let (c, end) = utf8::decode_char(self.data, self.position, self.data.len())?;
        self.position = end;
        Ok(c)
    }

    /// Reads up to `count` characters, stopping early if the stream ends on a character
    /// boundary.
    ///
    /// `count` must be at least 1. A character cut off by the end of the stream fails with
    /// [`EndOfStreamError::Utf8NotEnoughBytesInBuffer`].
    pub fn read_chars(&mut self, count: usize, encoding: Encoding) -> Result<String> {
        let Encoding::Utf8 = encoding;
        if count == 0 {
            return Err(
                InvalidArgumentError::new("Cannot read less than 1 character", "count", "0").into(),
            );
        }
        self.ensure_not_at_end("read_chars")?;

        let decoded = utf8::decode(self.data, self.position, count, self.data.len())?;
        self.position = decoded.end;
        Ok(decoded.text)
    }

    /// Reads as many whole characters as fit in the next `byte_count` bytes, or in the rest of
    /// the stream if it is shorter.
    ///
    /// A character that would extend past `byte_count` fails with
    /// [`EndOfStreamError::Utf8NotEnoughBytesAllowed`].
    pub fn read_char_bytes(&mut self, byte_count: usize, encoding: Encoding) -> Result<String> {
        let Encoding::Utf8 = encoding;
        self.ensure_not_at_end("read_char_bytes")?;

        let limit = self.position.saturating_add(byte_count);
        let decoded = utf8::decode(self.data, self.position, usize::MAX, limit)?;
        self.position = decoded.end;
        Ok(decoded.text)
    }

    /// Reads the length prefix and locates the payload of a length-prefixed string. Returns the
    /// payload range without moving the cursor.
    fn string_payload(&self) -> Result<(usize, usize)> {
        self.ensure_not_at_end("read_string")?;

        let (len, start) = int7::read_7bit_encoded_int(self.data, self.position)?;
        let len = len as usize;
        let remaining = self.data.len() - start;
        if remaining < len {
            tracing::trace!(expected = len, remaining, "string runs past end of stream");
            return Err(EndOfStreamError::StringTooLong {
                expected: len,
                remaining,
            }
            .into());
        }

        Ok((start, start + len))
    }

    /// Reads a string prefixed with its length in bytes, encoded as an integer seven bits at a
    /// time.
    ///
    /// The payload is decoded strictly; malformed UTF-8 fails with
    /// [`Error::InvalidUtf8Character`](crate::Error::InvalidUtf8Character).
    pub fn read_string(&mut self, encoding: Encoding) -> Result<String> {
        let Encoding::Utf8 = encoding;
        let (start, end) = self.string_payload()?;

        let decoded = utf8::decode(self.data, start, usize::MAX, end)?;
        debug_assert_eq!(decoded.end, end);

        self.position = end;
        Ok(decoded.text)
    }

    /// Reads a length-prefixed string and returns its payload bytes.
    ///
    /// This does not copy any data, and it does not validate the payload. Use
    /// [`read_string`](Self::read_string) to decode it.
    pub fn read_string_bytes(&mut self) -> Result<&'a [u8]> {
        let (start, end) = self.string_payload()?;
        self.position = end;
        Ok(&self.data[start..end])
    }

    /// Reads a length-prefixed string and returns its payload as a `bstr::BStr`.
    ///
    /// This does not copy any data. The caller must handle validating that the string is
    /// well-formed UTF-8, if necessary.
    #[cfg(feature = "bstr")]
    pub fn read_string_bstr(&mut self) -> Result<&'a bstr::BStr> {
        Ok(bstr::BStr::new(self.read_string_bytes()?))
    }
}


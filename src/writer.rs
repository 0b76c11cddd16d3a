use alloc::format;
use alloc::vec::Vec;

use zerocopy::byteorder::{BE, F32, F64, LE, U16, U32, U64};

use crate::error::{InvalidArgumentError, Result};
use crate::numbers::{self, Number, NumberKind};
use crate::{int7, utf8, Encoding, Endianness};

// The bit patterns of .NET's `float.NaN` and `double.NaN` (sign bit set, quiet).
const CANONICAL_NAN_F32: u32 = 0xffc0_0000;
const CANONICAL_NAN_F64: u64 = 0xfff8_0000_0000_0000;

/// Text accepted by the character and string `write_*` methods: either a Rust string or a
/// sequence of Unicode code points.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Text<'a> {
    /// A string slice. Always valid.
    Str(&'a str),
    /// Code points, validated when written.
    CodePoints(&'a [u32]),
}

impl<'a> From<&'a str> for Text<'a> {
    fn from(s: &'a str) -> Self {
        Self::Str(s)
    }
}

impl<'a> From<&'a alloc::string::String> for Text<'a> {
    fn from(s: &'a alloc::string::String) -> Self {
        Self::Str(s.as_str())
    }
}

impl<'a> From<&'a [u32]> for Text<'a> {
    fn from(code_points: &'a [u32]) -> Self {
        Self::CodePoints(code_points)
    }
}

impl<'a, const N: usize> From<&'a [u32; N]> for Text<'a> {
    fn from(code_points: &'a [u32; N]) -> Self {
        Self::CodePoints(code_points)
    }
}

impl<'a> From<&'a Vec<u32>> for Text<'a> {
    fn from(code_points: &'a Vec<u32>) -> Self {
        Self::CodePoints(code_points)
    }
}

/// Encodes binary values, using the same rules as .NET's `System.IO.BinaryWriter`, optionally
/// with big-endian byte order.
///
/// The writer owns a growable buffer and a cursor. Writes overwrite whatever is at the cursor and
/// extend the logical length when they go past it; moving the cursor back never discards bytes.
///
/// Numeric `write_*` methods take anything that converts into a [`Number`] and check it against
/// the range of the written type before touching the buffer.
#[derive(Clone, Debug, Default)]
pub struct BinaryWriter {
    /// Backing storage. Bytes at `len..` are stale leftovers of `clear()` or of writes made
    /// after moving the cursor back, and are never observable.
    out: Vec<u8>,
    len: usize,
    position: usize,
    endianness: Endianness,
}

macro_rules! write_int {
    ($($(#[$attr:meta])* $name:ident($kind:ident) as $ty:ty, $wire:ident;)*) => {
        $(
            $(#[$attr])*
            pub fn $name<'v>(&mut self, value: impl Into<Number<'v>>) -> Result<()> {
                let n = value.into().to_integer(NumberKind::$kind)? as $ty;
                match self.endianness {
                    Endianness::Little => self.write_cbytes($wire::<LE>::new(n).to_bytes()),
                    Endianness::Big => self.write_cbytes($wire::<BE>::new(n).to_bytes()),
                }
                Ok(())
            }
        )*
    };
}

impl BinaryWriter {
    /// Creates an empty little-endian writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty little-endian writer with room for `len` bytes.
    pub fn with_capacity(len: usize) -> Self {
        Self {
            out: Vec::with_capacity(len),
            ..Self::default()
        }
    }

    /// Creates an empty writer with the given byte order.
    pub fn with_endianness(endianness: Endianness) -> Self {
        Self {
            endianness,
            ..Self::default()
        }
    }

    /// Creates a writer that starts out holding a copy of `bytes`, with the cursor at 0.
    pub fn from_bytes(bytes: &[u8], endianness: Endianness) -> Self {
        Self {
            out: bytes.to_vec(),
            len: bytes.len(),
            position: 0,
            endianness,
        }
    }

    /// Creates a writer that starts out holding `values`, each checked to be a byte. The cursor
    /// is left at the end of the values.
    pub fn from_byte_values<'v, I>(values: I, endianness: Endianness) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<Number<'v>>,
    {
        let mut w = Self::with_endianness(endianness);
        w.write_byte_values(values)?;
        Ok(w)
    }

    /// Logical length: the number of bytes written so far, independent of the cursor.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Size of the backing storage. Informational only.
    pub fn capacity(&self) -> usize {
        self.out.capacity()
    }

    /// Current write position.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Moves the cursor. Positions past `len()` are clamped to `len()`.
    pub fn set_position(&mut self, position: usize) {
        if position > self.len {
            tracing::debug!(position, len = self.len, "clamping writer position");
        }
        self.position = position.min(self.len);
    }

    /// Byte order used for multi-byte values.
    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// Changes the byte order used by subsequent writes.
    pub fn set_endianness(&mut self, endianness: Endianness) {
        self.endianness = endianness;
    }

    /// Resets the cursor and the logical length to zero. The backing storage is kept.
    pub fn clear(&mut self) {
        self.position = 0;
        self.len = 0;
    }

    /// The bytes written so far.
    pub fn as_slice(&self) -> &[u8] {
        &self.out[..self.len]
    }

    /// Returns a copy of the bytes written so far. Later writes do not affect the copy.
    pub fn to_vec(&self) -> Vec<u8> {
        self.as_slice().to_vec()
    }

    /// Extracts the bytes written so far.
    pub fn into_vec(mut self) -> Vec<u8> {
        self.out.truncate(self.len);
        self.out
    }

    /// Advances the cursor by `n` bytes, growing the buffer as needed, and returns the bytes
    /// passed over so the caller can fill them.
    fn claim(&mut self, n: usize) -> &mut [u8] {
        let start = self.position;
        let end = start + n;
        if end > self.out.len() {
            self.out.resize(end, 0);
        }
        self.position = end;
        self.len = self.len.max(end);
        &mut self.out[start..end]
    }

    /// Writes `bytes` to the output at the cursor.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.claim(bytes.len()).copy_from_slice(bytes);
    }

    /// Writes a small, fixed-size array of bytes.
    pub fn write_cbytes<const N: usize>(&mut self, value: [u8; N]) {
        self.write_bytes(&value)
    }

    /// Writes `values`, each checked to be a byte. If any value is out of range, nothing is
    /// written and the error reports the first offending value.
    pub fn write_byte_values<'v, I>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<Number<'v>>,
    {
        let bytes = values
            .into_iter()
            .map(|v| Ok(v.into().to_integer(NumberKind::Byte)? as u8))
            .collect::<Result<Vec<u8>>>()?;
        self.write_bytes(&bytes);
        Ok(())
    }

    /// Writes one byte value `repeats` times.
    ///
    /// Fails with an invalid argument error if the buffer could not hold `repeats` more bytes
    /// past the cursor.
    pub fn write_same_byte<'v>(&mut self, value: impl Into<Number<'v>>, repeats: usize) -> Result<()> {
        let b = value.into().to_integer(NumberKind::Byte)? as u8;
        let end = self.position.checked_add(repeats);
        if !matches!(end, Some(end) if end <= isize::MAX as usize) {
            return Err(InvalidArgumentError::new(
                "Cannot write that many bytes",
                "repeats",
                format!("{repeats}"),
            )
            .into());
        }
        self.claim(repeats).fill(b);
        Ok(())
    }

    /// Writes a `bool` value. True is encoded as 1. False is encoded as 0.
    pub fn write_bool(&mut self, value: bool) {
        self.write_cbytes([value as u8])
    }

    /// Writes a single `u8` value, checked to be within `0..=255`.
    pub fn write_u8<'v>(&mut self, value: impl Into<Number<'v>>) -> Result<()> {
        let b = value.into().to_integer(NumberKind::Byte)? as u8;
        self.write_cbytes([b]);
        Ok(())
    }

    /// Writes a single `i8` value, checked to be within `-128..=127`.
    pub fn write_i8<'v>(&mut self, value: impl Into<Number<'v>>) -> Result<()> {
        let b = value.into().to_integer(NumberKind::SignedByte)? as i8;
        self.write_cbytes([b as u8]);
        Ok(())
    }

    write_int! {
        /// Writes an `i16` in the writer's byte order.
        write_i16(Short) as u16, U16;
        /// Writes a `u16` in the writer's byte order.
        write_u16(UnsignedShort) as u16, U16;
        /// Writes an `i32` in the writer's byte order.
        write_i32(Int) as u32, U32;
        /// Writes a `u32` in the writer's byte order.
        write_u32(UnsignedInt) as u32, U32;
    }

    /// Writes an `i64` in the writer's byte order.
    ///
    /// Accepts native integers, floats, and decimal strings such as `"-9223372036854775808"`;
    /// the string form keeps values that an `f64` cannot represent exactly. NaN and infinities
    /// are rejected as invalid arguments rather than as out of range.
    pub fn write_i64<'v>(&mut self, value: impl Into<Number<'v>>) -> Result<()> {
        let n = value.into().to_integer(NumberKind::Long)?;
        self.write_64_bits(n as i64 as u64);
        Ok(())
    }

    /// Writes a `u64` in the writer's byte order. Accepts the same inputs as
    /// [`write_i64`](Self::write_i64).
    pub fn write_u64<'v>(&mut self, value: impl Into<Number<'v>>) -> Result<()> {
        let n = value.into().to_integer(NumberKind::UnsignedLong)?;
        self.write_64_bits(n as u64);
        Ok(())
    }

    /// Emits a 64-bit value as its low and high 32-bit halves.
    fn write_64_bits(&mut self, bits: u64) {
        let low = bits as u32;
        let high = (bits >> 32) as u32;
        match self.endianness {
            Endianness::Little => {
                self.write_cbytes(U32::<LE>::new(low).to_bytes());
                self.write_cbytes(U32::<LE>::new(high).to_bytes());
            }
            Endianness::Big => {
                self.write_cbytes(U32::<BE>::new(high).to_bytes());
                self.write_cbytes(U32::<BE>::new(low).to_bytes());
            }
        }
    }

    /// Writes an IEEE-754 single-precision float in the writer's byte order.
    ///
    /// Finite values must lie within `±3.4028235e38`. Infinities are written as infinities, and
    /// every NaN is written as .NET's `float.NaN` (`0xFFC00000`).
    pub fn write_f32(&mut self, value: impl Into<f64>) -> Result<()> {
        let value = numbers::check_float(value.into())?;
        if value.is_nan() {
            self.write_u32_bits(CANONICAL_NAN_F32);
            return Ok(());
        }
        match self.endianness {
            Endianness::Little => self.write_cbytes(F32::<LE>::new(value).to_bytes()),
            Endianness::Big => self.write_cbytes(F32::<BE>::new(value).to_bytes()),
        }
        Ok(())
    }

    /// Writes an IEEE-754 double-precision float in the writer's byte order. Every NaN is
    /// written as .NET's `double.NaN` (`0xFFF8000000000000`).
    pub fn write_f64(&mut self, value: impl Into<f64>) {
        let value = value.into();
        if value.is_nan() {
            match self.endianness {
                Endianness::Little => self.write_cbytes(U64::<LE>::new(CANONICAL_NAN_F64).to_bytes()),
                Endianness::Big => self.write_cbytes(U64::<BE>::new(CANONICAL_NAN_F64).to_bytes()),
            }
            return;
        }
        match self.endianness {
            Endianness::Little => self.write_cbytes(F64::<LE>::new(value).to_bytes()),
            Endianness::Big => self.write_cbytes(F64::<BE>::new(value).to_bytes()),
        }
    }

    fn write_u32_bits(&mut self, bits: u32) {
        match self.endianness {
            Endianness::Little => self.write_cbytes(U32::<LE>::new(bits).to_bytes()),
            Endianness::Big => self.write_cbytes(U32::<BE>::new(bits).to_bytes()),
        }
    }

    /// Writes one character as raw UTF-8, without a length prefix.
    pub fn write_char(&mut self, value: char, encoding: Encoding) {
        let Encoding::Utf8 = encoding;
        self.write_bytes(value.encode_utf8(&mut [0; 4]).as_bytes());
    }

    /// Writes characters as raw UTF-8, without a length prefix.
    ///
    /// Code points that are not Unicode scalar values are rejected before anything is written.
    pub fn write_chars<'t>(&mut self, value: impl Into<Text<'t>>, encoding: Encoding) -> Result<()> {
        let Encoding::Utf8 = encoding;
        match value.into() {
            Text::Str(s) => self.write_bytes(s.as_bytes()),
            Text::CodePoints(code_points) => {
                let mut bytes = Vec::new();
                utf8::encode_code_points(code_points, &mut bytes)?;
                self.write_bytes(&bytes);
            }
        }
        Ok(())
    }

    /// Writes a string prefixed with its length in bytes, encoded as an integer seven bits at a
    /// time.
    pub fn write_string<'t>(&mut self, value: impl Into<Text<'t>>, encoding: Encoding) -> Result<()> {
        let Encoding::Utf8 = encoding;
        let encoded;
        let payload = match value.into() {
            Text::Str(s) => s.as_bytes(),
            Text::CodePoints(code_points) => {
                let mut bytes = Vec::new();
                utf8::encode_code_points(code_points, &mut bytes)?;
                encoded = bytes;
                &encoded[..]
            }
        };

        let len = i32::try_from(payload.len()).map_err(|_| {
            InvalidArgumentError::new(
                "The string is too long to be length-prefixed",
                "value",
                format!("{} bytes", payload.len()),
            )
        })?;

        let mut prefix = Vec::with_capacity(int7::encoded_len(len as u32));
        int7::write_7bit_encoded_int(len as u32, &mut prefix);
        self.write_bytes(&prefix);
        self.write_bytes(payload);
        Ok(())
    }
}

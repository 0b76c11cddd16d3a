//! Reads and writes buffers using the same encoding rules as .NET's `System.IO.BinaryReader` and
//! `System.IO.BinaryWriter`, with an optional big-endian byte order.
//!
//! * Integers are two's complement and exactly 1, 2, 4 or 8 bytes wide.
//! * Booleans are one byte: 0 or 1 when written, any nonzero value is `true` when read.
//! * Floats are IEEE-754 binary32/binary64. NaN is always written with .NET's bit pattern.
//! * Strings are UTF-8, prefixed with their length in bytes as a 7-bit encoded integer.
//!
//! Both [`BinaryReader`] and [`BinaryWriter`] work on in-memory buffers only.
//!
//! # References
//! * <https://learn.microsoft.com/en-us/dotnet/api/system.io.binarywriter.write?view=net-9.0>
//! * <https://learn.microsoft.com/en-us/dotnet/api/system.io.binaryreader?view=net-9.0>

#![cfg_attr(not(any(feature = "std", test)), no_std)]
#![forbid(unsafe_code)]
#![forbid(unused_must_use)]
#![warn(missing_docs)]

extern crate alloc;

mod encoding;
mod endianness;
mod error;
pub mod int7;
mod numbers;
mod reader;
pub mod utf8;
mod writer;


pub use encoding::Encoding;
pub use endianness::Endianness;
pub use error::{
    EncodingError, EndOfStreamError, Error, InvalidArgumentError, InvalidUtf8CharacterError,
    OutOfBoundsError, Result,
};
pub use numbers::{Number, NumberKind, FLOAT_MAX};
pub use reader::BinaryReader;
pub use writer::{BinaryWriter, Text};

use alloc::string::ToString;
use core::fmt;
use core::str::FromStr;

use crate::error::{Error, InvalidArgumentError};

/// Byte order of multi-byte integers and floats. Booleans and UTF-8 text are not affected.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Endianness {
    /// Least significant byte first. `2001` (`0x07D1`) is written as `D1 07`. This is the byte
    /// order of .NET's `BinaryWriter`.
    #[default]
    Little = 0,

    /// Most significant byte first. `2001` (`0x07D1`) is written as `07 D1`.
    Big = 1,
}

impl Endianness {
    fn invalid(value: impl ToString) -> Error {
        InvalidArgumentError::new(
            "`endianness` must be a value from the Endianness enum",
            "endianness",
            value.to_string(),
        )
        .into()
    }
}

impl TryFrom<u8> for Endianness {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Error> {
        match value {
            0 => Ok(Self::Little),
            1 => Ok(Self::Big),
            _ => Err(Self::invalid(value)),
        }
    }
}

impl FromStr for Endianness {
    type Err = Error;

    /// Accepts `little`/`le` and `big`/`be`, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Error> {
        if s.eq_ignore_ascii_case("little") || s.eq_ignore_ascii_case("le") {
            Ok(Self::Little)
        } else if s.eq_ignore_ascii_case("big") || s.eq_ignore_ascii_case("be") {
            Ok(Self::Big)
        } else {
            Err(Self::invalid(s))
        }
    }
}

impl fmt::Display for Endianness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Little => "little",
            Self::Big => "big",
        })
    }
}

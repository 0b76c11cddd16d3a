use alloc::string::ToString;
use core::fmt;
use core::str::FromStr;

use crate::error::EncodingError;

/// Text encoding used by the character and string methods.
///
/// UTF-8 is the only member. Tokens coming from outside the program (configuration, command
/// lines) are validated by parsing them with [`FromStr`].
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Encoding {
    /// UTF-8, as written by .NET's `BinaryWriter` by default.
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "utf8", alias = "utf-8"))]
    Utf8,
}

impl Encoding {
    /// Comma-separated list of accepted tokens, used in error messages.
    pub const SUPPORTED: &'static str = "utf8";
}

impl FromStr for Encoding {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, EncodingError> {
        if s.eq_ignore_ascii_case("utf8") || s.eq_ignore_ascii_case("utf-8") {
            Ok(Self::Utf8)
        } else {
            Err(EncodingError {
                encoding: s.to_string(),
            })
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Utf8 => f.write_str("utf8"),
        }
    }
}

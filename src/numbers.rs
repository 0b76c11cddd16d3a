//! Ranges of the fixed-width types and the checked numeric input accepted by `BinaryWriter`.

use alloc::format;
use alloc::string::{String, ToString};
use core::fmt;
use core::num::IntErrorKind;

use crate::error::{Error, InvalidArgumentError, OutOfBoundsError, Result};

/// Largest finite magnitude accepted by `write_f32`. Values between `f32::MAX` and this bound
/// round to `f32::MAX`.
pub const FLOAT_MAX: f64 = 3.4028235e38;

/// The numeric types that `BinaryWriter` range-checks before writing.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum NumberKind {
    /// `u8`
    Byte,
    /// `i8`
    SignedByte,
    /// `i16`
    Short,
    /// `u16`
    UnsignedShort,
    /// `i32`
    Int,
    /// `u32`
    UnsignedInt,
    /// `i64`
    Long,
    /// `u64`
    UnsignedLong,
    /// `f32`
    Float,
}

impl NumberKind {
    /// The name used in error messages.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Byte => "byte",
            Self::SignedByte => "signed byte",
            Self::Short => "short",
            Self::UnsignedShort => "unsigned short",
            Self::Int => "int",
            Self::UnsignedInt => "unsigned int",
            Self::Long => "long",
            Self::UnsignedLong => "unsigned long",
            Self::Float => "float",
        }
    }

    /// Inclusive range of an integer kind. `Float` has no integer range and returns `None`.
    pub const fn int_bounds(self) -> Option<(i128, i128)> {
        Some(match self {
            Self::Byte => (u8::MIN as i128, u8::MAX as i128),
            Self::SignedByte => (i8::MIN as i128, i8::MAX as i128),
            Self::Short => (i16::MIN as i128, i16::MAX as i128),
            Self::UnsignedShort => (u16::MIN as i128, u16::MAX as i128),
            Self::Int => (i32::MIN as i128, i32::MAX as i128),
            Self::UnsignedInt => (u32::MIN as i128, u32::MAX as i128),
            Self::Long => (i64::MIN as i128, i64::MAX as i128),
            Self::UnsignedLong => (u64::MIN as i128, u64::MAX as i128),
            Self::Float => return None,
        })
    }

    /// Lower bound, as printed in error messages.
    pub const fn min_str(self) -> &'static str {
        match self {
            Self::Byte | Self::UnsignedShort | Self::UnsignedInt | Self::UnsignedLong => "0",
            Self::SignedByte => "-128",
            Self::Short => "-32768",
            Self::Int => "-2147483648",
            Self::Long => "-9223372036854775808",
            Self::Float => "-3.4028235e38",
        }
    }

    /// Upper bound, as printed in error messages.
    pub const fn max_str(self) -> &'static str {
        match self {
            Self::Byte => "255",
            Self::SignedByte => "127",
            Self::Short => "32767",
            Self::UnsignedShort => "65535",
            Self::Int => "2147483647",
            Self::UnsignedInt => "4294967295",
            Self::Long => "9223372036854775807",
            Self::UnsignedLong => "18446744073709551615",
            Self::Float => "3.4028235e38",
        }
    }

    fn is_long(self) -> bool {
        matches!(self, Self::Long | Self::UnsignedLong)
    }
}

impl fmt::Display for NumberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A number handed to one of the range-checked `write_*` methods.
///
/// Any primitive integer or float converts into a `Number`, as does a `&str` holding a decimal
/// integer. Decimal strings let callers pass 64-bit values that an `f64` cannot hold exactly.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Number<'a> {
    /// An exact integer.
    Integer(i128),
    /// A float. NaN and infinities are always out of range for integer types.
    Float(f64),
    /// A decimal integer, optionally signed.
    Decimal(&'a str),
}

impl fmt::Display for Number<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::Decimal(s) => f.write_str(s),
        }
    }
}

macro_rules! number_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Number<'_> {
                fn from(value: $t) -> Self {
                    Self::Integer(value as i128)
                }
            }
        )*
    };
}

number_from_int!(u8, i8, u16, i16, u32, i32, u64, i64, usize, isize, i128);

impl From<f32> for Number<'_> {
    fn from(value: f32) -> Self {
        Self::Float(value as f64)
    }
}

impl From<f64> for Number<'_> {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl<'a> From<&'a str> for Number<'a> {
    fn from(value: &'a str) -> Self {
        Self::Decimal(value)
    }
}

impl<'a> From<&'a String> for Number<'a> {
    fn from(value: &'a String) -> Self {
        Self::Decimal(value.as_str())
    }
}

impl Number<'_> {
    /// Converts to an integer that lies within the inclusive range of `kind`.
    ///
    /// In-range floats with a fractional part are truncated toward zero.
    pub fn to_integer(self, kind: NumberKind) -> Result<i128> {
        let Some((min, max)) = kind.int_bounds() else {
            return Err(self.out_of_bounds(kind));
        };

        let n = match self {
            Self::Integer(n) => n,
            Self::Float(f) if !f.is_finite() => {
                if kind.is_long() {
                    return Err(InvalidArgumentError::new(
                        "Value cannot be infinite or NaN",
                        "value",
                        self.to_string(),
                    )
                    .into());
                }
                return Err(self.out_of_bounds(kind));
            }
            // Saturates, so huge magnitudes still land outside every range.
            Self::Float(f) => f.trunc() as i128,
            Self::Decimal(s) => match s.trim().parse::<i128>() {
                Ok(n) => n,
                Err(e) if matches!(e.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) => {
                    return Err(self.out_of_bounds(kind));
                }
                Err(_) => {
                    return Err(InvalidArgumentError::new(
                        format!("'{s}' is not a decimal integer"),
                        "value",
                        s,
                    )
                    .into());
                }
            },
        };

        if n < min || n > max {
            return Err(self.out_of_bounds(kind));
        }
        Ok(n)
    }

    pub(crate) fn out_of_bounds(self, kind: NumberKind) -> Error {
        tracing::trace!(kind = kind.name(), value = %self, "value out of range");
        OutOfBoundsError {
            kind,
            value: self.to_string(),
        }
        .into()
    }
}

/// Checks that a finite `value` fits in an `f32`. NaN and infinities pass through unchanged.
pub(crate) fn check_float(value: f64) -> Result<f32> {
    if value.is_finite() && !(-FLOAT_MAX..=FLOAT_MAX).contains(&value) {
        return Err(Number::Float(value).out_of_bounds(NumberKind::Float));
    }
    Ok(value as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn out_of_bounds(kind: NumberKind, value: &str) -> Error {
        Error::OutOfBounds(OutOfBoundsError {
            kind,
            value: value.into(),
        })
    }

    #[test]
    fn bounds_are_inclusive() {
        assert_eq!(Number::from(255).to_integer(NumberKind::Byte), Ok(255));
        assert_eq!(Number::from(0).to_integer(NumberKind::Byte), Ok(0));
        assert_eq!(
            Number::from(256).to_integer(NumberKind::Byte),
            Err(out_of_bounds(NumberKind::Byte, "256"))
        );
        assert_eq!(
            Number::from(-129).to_integer(NumberKind::SignedByte),
            Err(out_of_bounds(NumberKind::SignedByte, "-129"))
        );
        assert_eq!(
            Number::from(u64::MAX).to_integer(NumberKind::UnsignedLong),
            Ok(u64::MAX as i128)
        );
    }

    #[test]
    fn floats() {
        assert_eq!(Number::from(12.9).to_integer(NumberKind::Short), Ok(12));
        assert_eq!(Number::from(-12.9).to_integer(NumberKind::Short), Ok(-12));
        assert_eq!(
            Number::from(f64::NAN).to_integer(NumberKind::Int),
            Err(out_of_bounds(NumberKind::Int, "NaN"))
        );
        assert_eq!(
            Number::from(f64::MAX).to_integer(NumberKind::UnsignedInt),
            Err(out_of_bounds(NumberKind::UnsignedInt, &f64::MAX.to_string()))
        );
        // 2^63 is the nearest f64 to i64::MAX, and it is one past the range.
        assert!(matches!(
            Number::from(i64::MAX as f64).to_integer(NumberKind::Long),
            Err(Error::OutOfBounds(_))
        ));
    }

    #[test]
    fn non_finite_long_is_an_invalid_argument() {
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = Number::from(value).to_integer(NumberKind::Long).unwrap_err();
            let Error::InvalidArgument(err) = err else {
                panic!("expected InvalidArgument, got {err:?}");
            };
            assert_eq!(err.argument, "value");
        }
    }

    #[test]
    fn decimals() {
        assert_eq!(
            Number::from("18446744073709551615").to_integer(NumberKind::UnsignedLong),
            Ok(u64::MAX as i128)
        );
        assert_eq!(
            Number::from("-9223372036854775808").to_integer(NumberKind::Long),
            Ok(i64::MIN as i128)
        );
        assert_eq!(
            Number::from("18446744073709551616").to_integer(NumberKind::UnsignedLong),
            Err(out_of_bounds(NumberKind::UnsignedLong, "18446744073709551616"))
        );
        assert_eq!(
            Number::from("-1").to_integer(NumberKind::UnsignedLong),
            Err(out_of_bounds(NumberKind::UnsignedLong, "-1"))
        );
        // Past what i128 can hold: still a range problem, not a syntax problem.
        let huge = "1000000000000000000000000000000000000000000";
        assert_eq!(
            Number::from(huge).to_integer(NumberKind::Long),
            Err(out_of_bounds(NumberKind::Long, huge))
        );
        assert!(matches!(
            Number::from("12abc").to_integer(NumberKind::Long),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn message() {
        let err = Number::from(40000).to_integer(NumberKind::Short).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Number of type 'short' must be between -32768 and 32767, got 40000 instead."
        );
    }

    #[test]
    fn float_range() {
        assert_eq!(check_float(1.5), Ok(1.5));
        assert_eq!(check_float(FLOAT_MAX), Ok(f32::MAX));
        assert!(check_float(f64::NAN).unwrap().is_nan());
        assert_eq!(check_float(f64::NEG_INFINITY), Ok(f32::NEG_INFINITY));
        assert!(matches!(check_float(3.4028236e38), Err(Error::OutOfBounds(_))));
        assert!(matches!(check_float(-f64::MAX), Err(Error::OutOfBounds(_))));
    }
}

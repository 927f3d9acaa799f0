//! Fixed-point voltage scaling.
//!
//! The PCI-9111 reports a code where `2047 << 4` is full scale of the ±10V range.
//! We scale into an integer carrying `P` extra decimal digits rather than
//! using floats, so a reading always truncates the same way.

use core::{fmt, str::FromStr};

use thiserror::Error;

use crate::error::ConfigError;

/// Code corresponding to full scale, used as the scaling denominator.
pub const FULL_SCALE_DIVISOR: i64 = 2047 * 16;

/// Magnitude of the input range in volts.
pub const RANGE_VOLTS: i64 = 10;

/// Number of extra decimal digits carried by a [`FixedPointVoltage`].
///
/// At most [`Precision::MAX`], the largest value for which a full 16-bit code
/// scaled by `RANGE_VOLTS * 10^P` still fits an `i64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Precision(u8);

impl Precision {
    pub const MAX: u8 = 13;

    pub const fn new(digits: u8) -> Result<Self, ConfigError> {
        if digits > Self::MAX {
            Err(ConfigError::PrecisionTooLarge(digits))
        } else {
            Ok(Self(digits))
        }
    }

    pub const fn digits(&self) -> u8 {
        self.0
    }

    /// `10^P`
    pub const fn unit(&self) -> i64 {
        10i64.pow(self.0 as u32)
    }
}

impl Default for Precision {
    /// Four decimal places.
    fn default() -> Self {
        Self(4)
    }
}

impl TryFrom<u8> for Precision {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A voltage held as an integer scaled by `10^P`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedPointVoltage {
    value: i64,
    precision: Precision,
}

impl FixedPointVoltage {
    pub const fn new(value: i64, precision: Precision) -> Self {
        Self { value, precision }
    }

    /// Scale a conversion code. Division truncates toward zero.
    pub const fn from_code(code: i16, precision: Precision) -> Self {
        let scaled = code as i64 * RANGE_VOLTS * precision.unit();
        Self {
            value: scaled / FULL_SCALE_DIVISOR,
            precision,
        }
    }

    /// The scaled integer, i.e. volts times `10^P`.
    pub const fn value(&self) -> i64 {
        self.value
    }

    pub const fn precision(&self) -> Precision {
        self.precision
    }
}

impl fmt::Display for FixedPointVoltage {
    /// Writes the value with the decimal point `P` digits from the right, without unit.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.value < 0 { "-" } else { "" };
        let magnitude = self.value.unsigned_abs();
        let digits = self.precision.digits() as usize;
        if digits == 0 {
            return write!(f, "{sign}{magnitude}");
        }
        let unit = self.precision.unit() as u64;
        write!(
            f,
            "{sign}{}.{:0digits$}",
            magnitude / unit,
            magnitude % unit
        )
    }
}

/// Failure to read back a formatted voltage.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseVoltageError {
    #[error("No digits found")]
    Empty,
    #[error("Unexpected character in voltage")]
    InvalidDigit,
    #[error("Too many decimal places")]
    TooPrecise,
    #[error("Voltage out of range")]
    Overflow,
}

fn parse_digits(digits: &str) -> Result<i64, ParseVoltageError> {
    if digits.is_empty() {
        return Err(ParseVoltageError::Empty);
    }
    digits.bytes().try_fold(0i64, |acc, byte| {
        if !byte.is_ascii_digit() {
            return Err(ParseVoltageError::InvalidDigit);
        }
        acc.checked_mul(10)
            .and_then(|acc| acc.checked_add(i64::from(byte - b'0')))
            .ok_or(ParseVoltageError::Overflow)
    })
}

impl FromStr for FixedPointVoltage {
    type Err = ParseVoltageError;

    /// Accepts the output of [`fmt::Display`], optionally followed by ` V` and a line end.
    /// The number of fraction digits becomes the precision.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let s = s.strip_suffix('V').unwrap_or(s).trim_end();
        let (negative, s) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };

        let (integer, fraction) = s.split_once('.').unwrap_or((s, ""));
        if s.contains('.') && fraction.is_empty() {
            return Err(ParseVoltageError::Empty);
        }
        let digits = u8::try_from(fraction.len()).map_err(|_| ParseVoltageError::TooPrecise)?;
        let precision = Precision::new(digits).map_err(|_| ParseVoltageError::TooPrecise)?;

        let mut value = parse_digits(integer)?
            .checked_mul(precision.unit())
            .ok_or(ParseVoltageError::Overflow)?;
        if !fraction.is_empty() {
            value = value
                .checked_add(parse_digits(fraction)?)
                .ok_or(ParseVoltageError::Overflow)?;
        }
        if negative {
            value = -value;
        }
        Ok(Self { value, precision })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn precision(digits: u8) -> Precision {
        Precision::new(digits).unwrap()
    }

    #[test]
    fn test_full_code_conversion() {
        // 4095 * 10 * 10^4 = 409_500_000, / 32752 = 12503.05.. truncated.
        let volts = FixedPointVoltage::from_code(4095, precision(4));
        assert_eq!(volts.value(), 12503);

        let mut out: heapless::String<32> = heapless::String::new();
        core::fmt::write(&mut out, format_args!("{volts}")).unwrap();
        assert_eq!(out.as_str(), "1.2503");
    }

    #[test]
    fn test_zero_code() {
        let volts = FixedPointVoltage::from_code(0, precision(4));
        assert_eq!(volts.value(), 0);
        assert_eq!(volts.to_string(), "0.0000");
    }

    #[test]
    fn test_full_scale_is_ten_volts() {
        let volts = FixedPointVoltage::from_code(32752, precision(4));
        assert_eq!(volts.to_string(), "10.0000");

        let volts = FixedPointVoltage::from_code(-32752, precision(4));
        assert_eq!(volts.to_string(), "-10.0000");
    }

    #[test]
    fn test_truncates_toward_zero() {
        // 1 * 10 * 10^4 / 32752 = 3.05.. for both signs.
        assert_eq!(FixedPointVoltage::from_code(1, precision(4)).value(), 3);
        assert_eq!(FixedPointVoltage::from_code(-1, precision(4)).value(), -3);
        assert_eq!(
            FixedPointVoltage::from_code(-1, precision(4)).to_string(),
            "-0.0003"
        );
    }

    #[test]
    fn test_conversion_is_monotonic() {
        for digits in 0..=Precision::MAX {
            let mut previous = i64::MIN;
            for code in 0..=4095 {
                let value = FixedPointVoltage::from_code(code, precision(digits)).value();
                assert!(value >= previous, "P={digits} code={code}");
                previous = value;
            }
        }
    }

    #[test]
    fn test_max_precision_does_not_overflow() {
        let volts = FixedPointVoltage::from_code(i16::MIN, precision(Precision::MAX));
        assert!(volts.value() < 0);
        let volts = FixedPointVoltage::from_code(i16::MAX, precision(Precision::MAX));
        assert_eq!(volts.to_string(), "10.0045798729848");
    }

    #[test]
    fn test_zero_precision_has_no_point() {
        let volts = FixedPointVoltage::from_code(4095, precision(0));
        assert_eq!(volts.value(), 1);
        assert_eq!(volts.to_string(), "1");
    }

    #[test]
    fn test_small_values_are_zero_padded() {
        let volts = FixedPointVoltage::new(42, precision(4));
        assert_eq!(volts.to_string(), "0.0042");
    }

    #[test]
    fn test_format_round_trip() {
        let samples = [
            FixedPointVoltage::new(12503, precision(4)),
            FixedPointVoltage::new(-7, precision(4)),
            FixedPointVoltage::new(100_045_798_729_848, precision(13)),
            FixedPointVoltage::new(9, precision(0)),
            FixedPointVoltage::new(0, precision(2)),
        ];
        for volts in samples {
            let line = format!("{volts} V\n");
            let parsed: FixedPointVoltage = line.parse().unwrap();
            assert_eq!(parsed, volts, "{line:?}");
        }
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(
            "".parse::<FixedPointVoltage>(),
            Err(ParseVoltageError::Empty)
        );
        assert_eq!(
            "1.".parse::<FixedPointVoltage>(),
            Err(ParseVoltageError::Empty)
        );
        assert_eq!(
            "1.2x V".parse::<FixedPointVoltage>(),
            Err(ParseVoltageError::InvalidDigit)
        );
        assert_eq!(
            "0.12345678901234".parse::<FixedPointVoltage>(),
            Err(ParseVoltageError::TooPrecise)
        );
    }

    #[test]
    fn test_precision_limit() {
        assert!(Precision::new(13).is_ok());
        assert_eq!(Precision::new(14), Err(ConfigError::PrecisionTooLarge(14)));
    }
}

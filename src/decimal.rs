//! Exact decimal arithmetic for register scaling.
//!
//! Calibration constants are derived from divisions by powers of two and ten,
//! and a single unit of drift changes the integer written to the calibration
//! register. Values are therefore kept as an integer count of 10⁻²¹ units:
//! every `µA / 2¹⁵` is representable exactly, as is every product of a register
//! value with such an LSB.

use core::{
    cmp::Ordering,
    fmt::{self, Write},
    ops::{Add, Neg, Sub},
};

use heapless::String;

/// Capacity of rendered values, enough for any `i128` integer part.
pub const DECIMAL_TEXT_LEN: usize = 48;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rounding {
    /// Ties go away from zero.
    HalfUp,
    /// Any discarded digit rounds away from zero.
    Up,
}

/// Signed fixed-point number with 21 fractional digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Decimal(i128);

const fn pow10(exp: u32) -> i128 {
    let mut value = 1;
    let mut i = 0;
    while i < exp {
        value *= 10;
        i += 1;
    }
    value
}

impl Decimal {
    pub const FRACTION_DIGITS: u32 = 21;
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(pow10(Self::FRACTION_DIGITS));
    pub const HUNDRED: Self = Self(100 * pow10(Self::FRACTION_DIGITS));

    /// Creates a value from its count of 10⁻²¹ units.
    pub const fn from_scaled(scaled: i128) -> Self {
        Self(scaled)
    }

    pub const fn scaled(self) -> i128 {
        self.0
    }

    pub const fn from_integer(value: i64) -> Self {
        Self(value as i128 * pow10(Self::FRACTION_DIGITS))
    }

    /// `value × 10⁻³`
    pub const fn from_milli(value: i64) -> Self {
        Self(value as i128 * pow10(Self::FRACTION_DIGITS - 3))
    }

    /// `value × 10⁻⁶`
    pub const fn from_micro(value: i64) -> Self {
        Self(value as i128 * pow10(Self::FRACTION_DIGITS - 6))
    }

    pub const fn mul_int(self, factor: i128) -> Self {
        Self(self.0 * factor)
    }

    /// Division by an integer, truncating toward zero.
    pub const fn div_int(self, divisor: i128) -> Self {
        Self(self.0 / divisor)
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub const fn abs(self) -> Self {
        Self(self.0.abs())
    }

    pub fn clamp_to(self, min: Self, max: Self) -> Self {
        match (self.cmp(&min), self.cmp(&max)) {
            (Ordering::Less, _) => min,
            (_, Ordering::Greater) => max,
            _ => self,
        }
    }

    /// Rounds to `places` decimal places.
    ///
    /// ```rust
    /// # use ina219_ups::{Decimal, Rounding};
    /// let lsb = Decimal::from_scaled(97_656_250_000_000_000); // 0.00009765625
    /// assert_eq!(lsb.round_dp(5, Rounding::Up), Decimal::from_micro(100));
    ///
    /// let half = Decimal::from_micro(-5); // -0.000005
    /// assert_eq!(half.round_dp(5, Rounding::HalfUp), Decimal::from_micro(-10));
    /// ```
    pub const fn round_dp(self, places: u32, mode: Rounding) -> Self {
        if places >= Self::FRACTION_DIGITS {
            return self;
        }

        let step = pow10(Self::FRACTION_DIGITS - places);
        let magnitude = self.0.abs();
        let remainder = magnitude % step;

        let bump = match mode {
            Rounding::HalfUp => remainder * 2 >= step,
            Rounding::Up => remainder != 0,
        };

        let rounded = (magnitude / step + bump as i128) * step;
        if self.0 < 0 {
            Self(-rounded)
        } else {
            Self(rounded)
        }
    }

    pub fn to_f32(self) -> f32 {
        (self.0 as f64 / pow10(Self::FRACTION_DIGITS) as f64) as f32
    }

    /// Renders the value with exactly `places` decimal places, rounding half up.
    ///
    /// ```rust
    /// # use ina219_ups::Decimal;
    /// assert_eq!(Decimal::from_milli(1076).to_text(4).as_str(), "1.0760");
    /// assert_eq!(Decimal::from_micro(-123_456).to_text(4).as_str(), "-0.1235");
    /// assert_eq!(Decimal::from_integer(100).to_text(0).as_str(), "100");
    /// ```
    pub fn to_text(self, places: u32) -> String<DECIMAL_TEXT_LEN> {
        let mut text = String::new();
        // always fits: at most 39 integer digits, a sign, a point and the fraction
        _ = write!(text, "{}", self.display(places));
        text
    }

    pub const fn display(self, places: u32) -> DisplayDecimal {
        DisplayDecimal {
            value: self,
            places,
        }
    }
}

impl Add for Decimal {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Decimal {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Neg for Decimal {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

/// Fixed-precision rendering of a [`Decimal`].
#[derive(Debug, Clone, Copy)]
pub struct DisplayDecimal {
    value: Decimal,
    places: u32,
}

impl fmt::Display for DisplayDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let places = self.places.min(Decimal::FRACTION_DIGITS);
        let rounded = self.value.round_dp(places, Rounding::HalfUp);

        let one = pow10(Decimal::FRACTION_DIGITS);
        let magnitude = rounded.0.unsigned_abs();
        let integer = magnitude / one as u128;

        if rounded.is_negative() {
            f.write_char('-')?;
        }
        write!(f, "{}", integer)?;

        if places > 0 {
            let fraction =
                (magnitude % one as u128) / pow10(Decimal::FRACTION_DIGITS - places) as u128;
            write!(f, ".{:0width$}", fraction, width = places as usize)?;
        }

        Ok(())
    }
}

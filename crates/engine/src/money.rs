use std::{
    fmt,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
};

/// Signed money amount represented as **integer cents**.
///
/// Use this type for **all** monetary values in the engine (expense amounts,
/// splits, net balances) to avoid floating-point drift.
///
/// The value is signed:
/// - positive = owed to the participant / credit
/// - negative = owed by the participant / debit
///
/// # Examples
///
/// ```rust
/// use engine::MoneyCents;
///
/// let amount = MoneyCents::new(12_34);
/// assert_eq!(amount.cents(), 1234);
/// assert_eq!(amount.to_string(), "12.34");
/// ```
///
/// External input arrives as a decimal number with possibly more than two
/// fractional digits; [`MoneyCents::from_major`] rounds it to the nearest
/// cent, half away from zero:
///
/// ```rust
/// use engine::MoneyCents;
///
/// assert_eq!(MoneyCents::from_major(10.005).cents(), 1001);
/// assert_eq!(MoneyCents::from_major(-10.005).cents(), -1001);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct MoneyCents(i64);

impl MoneyCents {
    pub const ZERO: MoneyCents = MoneyCents(0);

    /// Creates a new amount from integer cents.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Rounds a decimal major-unit value to the nearest cent, half away from
    /// zero.
    ///
    /// The epsilon nudge compensates for binary representation error on
    /// values such as `10.005`, whose nearest `f64` sits just below the
    /// half-cent boundary.
    #[must_use]
    pub fn from_major(value: f64) -> Self {
        let scaled = value * 100.0;
        let nudged = scaled + scaled.signum() * 1e-7;
        Self(nudged.round() as i64)
    }

    /// Returns the amount in major units for serialization at the API
    /// boundary.
    #[must_use]
    pub fn to_major(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns the raw value in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Returns `true` if the amount is 0.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if the amount is positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Returns `true` if the amount is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Absolute value.
    #[must_use]
    pub const fn abs(self) -> Self {
        Self(self.0.abs())
    }
}

impl fmt::Display for MoneyCents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let major = abs / 100;
        let cents = abs % 100;
        write!(f, "{sign}{major}.{cents:02}")
    }
}

impl From<i64> for MoneyCents {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<MoneyCents> for i64 {
    fn from(value: MoneyCents) -> Self {
        value.0
    }
}

impl Add for MoneyCents {
    type Output = MoneyCents;

    fn add(self, rhs: MoneyCents) -> Self::Output {
        MoneyCents(self.0 + rhs.0)
    }
}

impl AddAssign for MoneyCents {
    fn add_assign(&mut self, rhs: MoneyCents) {
        self.0 += rhs.0;
    }
}

impl Sub for MoneyCents {
    type Output = MoneyCents;

    fn sub(self, rhs: MoneyCents) -> Self::Output {
        MoneyCents(self.0 - rhs.0)
    }
}

impl SubAssign for MoneyCents {
    fn sub_assign(&mut self, rhs: MoneyCents) {
        self.0 -= rhs.0;
    }
}

impl Neg for MoneyCents {
    type Output = MoneyCents;

    fn neg(self) -> Self::Output {
        MoneyCents(-self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_two_decimals() {
        assert_eq!(MoneyCents::new(0).to_string(), "0.00");
        assert_eq!(MoneyCents::new(1).to_string(), "0.01");
        assert_eq!(MoneyCents::new(10).to_string(), "0.10");
        assert_eq!(MoneyCents::new(1050).to_string(), "10.50");
        assert_eq!(MoneyCents::new(-1050).to_string(), "-10.50");
    }

    #[test]
    fn from_major_rounds_half_away_from_zero() {
        assert_eq!(MoneyCents::from_major(10.0).cents(), 1000);
        assert_eq!(MoneyCents::from_major(10.5).cents(), 1050);
        assert_eq!(MoneyCents::from_major(10.005).cents(), 1001);
        assert_eq!(MoneyCents::from_major(-10.005).cents(), -1001);
        assert_eq!(MoneyCents::from_major(66.666666).cents(), 6667);
        assert_eq!(MoneyCents::from_major(0.004).cents(), 0);
    }

    #[test]
    fn from_major_survives_binary_noise() {
        // 0.1 + 0.2 is not exactly 0.3 in binary floating point.
        assert_eq!(MoneyCents::from_major(0.1 + 0.2).cents(), 30);
        assert_eq!(MoneyCents::from_major(75.50).cents(), 7550);
    }

    #[test]
    fn to_major_round_trips_cents() {
        assert_eq!(MoneyCents::new(1234).to_major(), 12.34);
        assert_eq!(MoneyCents::new(-1).to_major(), -0.01);
    }
}

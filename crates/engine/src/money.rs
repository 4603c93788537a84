use std::{fmt, str::FromStr};

use rust_decimal::{Decimal, prelude::ToPrimitive};

use crate::EngineError;

/// An exact decimal amount.
///
/// The tracker is currency-agnostic, so there is no fixed number of
/// fractional digits. Values are kept normalized (`12.50` is stored and
/// shown as `12.5`).
///
/// ```rust
/// use engine::Money;
///
/// let amount: Money = "12.345".parse().unwrap();
/// assert_eq!(amount.to_string(), "12.345");
/// assert_eq!("1e2".parse::<Money>().unwrap().to_string(), "100");
/// assert!("12,5".parse::<Money>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    #[must_use]
    pub fn is_positive(self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(|sum| Money(sum.normalize()))
    }

    /// `self` as a percentage of `total`; `0.0` when `total` is not positive.
    #[must_use]
    pub fn percent_of(self, total: Money) -> f64 {
        if !total.is_positive() {
            return 0.0;
        }
        self.0
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|scaled| scaled.checked_div(total.0))
            .and_then(|share| share.to_f64())
            .unwrap_or(0.0)
    }

    /// The amount as a JSON number. May round past `f64` precision.
    #[must_use]
    pub fn to_f64(self) -> f64 {
        self.0.to_f64().unwrap_or_default()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for Money {
    type Err = EngineError;

    /// Parses a plain decimal literal: optional sign, digits with an optional
    /// `.` fraction, and an optional `e`/`E` exponent (`1e2`, `2.5E-1`).
    ///
    /// Anything else fails, including `,` separators, `NaN`, infinities and
    /// values outside the 28-digit range of the underlying decimal.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::Validation(format!("invalid amount: {s}"));
        let literal = s.trim();

        let (mantissa, exponent) = match literal.find(['e', 'E']) {
            Some(at) => (
                &literal[..at],
                literal[at + 1..].parse::<i32>().map_err(|_| invalid())?,
            ),
            None => (literal, 0),
        };

        let (negative, unsigned) = match mantissa.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, mantissa.strip_prefix('+').unwrap_or(mantissa)),
        };
        let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }
        if !whole.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let fraction = fraction.trim_end_matches('0');
        let digits = format!("{whole}{fraction}");
        let digits = digits.trim_start_matches('0');
        let mut value: i128 = if digits.is_empty() {
            0
        } else {
            digits.parse().map_err(|_| invalid())?
        };

        let mut scale = fraction.len() as i64 - i64::from(exponent);
        if scale < 0 {
            let factor = u32::try_from(-scale)
                .ok()
                .and_then(|exp| 10_i128.checked_pow(exp))
                .ok_or_else(invalid)?;
            value = value.checked_mul(factor).ok_or_else(invalid)?;
            scale = 0;
        }
        let scale = u32::try_from(scale).map_err(|_| invalid())?;
        if negative {
            value = -value;
        }

        Decimal::try_from_i128_with_scale(value, scale)
            .map(|decimal| Money(decimal.normalize()))
            .map_err(|_| invalid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    #[test]
    fn parses_any_precision() {
        assert_eq!(money("12.345").to_string(), "12.345");
        assert_eq!(money("0.001").to_string(), "0.001");
        assert_eq!(money("7").to_string(), "7");
        assert_eq!(money("12.50"), money("12.5"));
        assert_eq!(money("  2.30 ").to_string(), "2.3");
    }

    #[test]
    fn parses_sign_and_loose_points() {
        assert_eq!(money("+3"), money("3"));
        assert_eq!(money(".5"), money("0.5"));
        assert_eq!(money("5."), money("5"));
        assert!(!money("-4").is_positive());
        assert!(!money("-0").is_positive());
    }

    #[test]
    fn parses_exponents() {
        assert_eq!(money("1e2").to_string(), "100");
        assert_eq!(money("2.5E-1").to_string(), "0.25");
        assert_eq!(money("1.5e+3").to_string(), "1500");
        assert_eq!(money("1e21").to_string(), "1000000000000000000000");
    }

    #[test]
    fn rejects_non_numbers() {
        for raw in [
            "12,5", "", "-", ".", "abc", "1.2.3", "1e", "e5", "0x10", "NaN", "inf", "1 000",
        ] {
            assert!(raw.parse::<Money>().is_err(), "{raw:?} should not parse");
        }
    }

    #[test]
    fn rejects_out_of_range() {
        assert!("1e40".parse::<Money>().is_err());
        assert!("1e-40".parse::<Money>().is_err());
    }

    #[test]
    fn sums_and_shares() {
        let total = money("10.25").checked_add(money("39.75")).unwrap();
        assert_eq!(total, money("50"));
        assert_eq!(money("15").percent_of(total), 30.0);
        assert_eq!(money("5").percent_of(total), 10.0);
        assert_eq!(money("5").percent_of(Money::ZERO), 0.0);
    }

    #[test]
    fn to_f64_keeps_the_value() {
        assert_eq!(money("12.5").to_f64(), 12.5);
        assert_eq!(money("0.001").to_f64(), 0.001);
    }
}

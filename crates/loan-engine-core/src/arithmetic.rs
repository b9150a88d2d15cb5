//! Percentage, subtraction and division primitives, each followed by a cut
//! to a fixed number of fractional digits. This is the only place rounding
//! policy lives; every monetary value in the pipeline passes through here.
//!
//! All primitives use checked Decimal arithmetic and return `None` on
//! overflow so callers can attach the step that failed.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Rate};

const HUNDRED: Decimal = dec!(100);

/// How digits beyond the configured precision are discarded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rounding {
    /// Cut toward zero. The only mode the loan pipeline is specified for.
    #[default]
    TowardZero,
    HalfUp,
    HalfEven,
}

impl Rounding {
    fn strategy(self) -> RoundingStrategy {
        match self {
            Rounding::TowardZero => RoundingStrategy::ToZero,
            Rounding::HalfUp => RoundingStrategy::MidpointAwayFromZero,
            Rounding::HalfEven => RoundingStrategy::MidpointNearestEven,
        }
    }
}

/// Explicit precision setting threaded into every arithmetic call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Precision {
    pub decimal_places: u32,
    pub rounding: Rounding,
}

impl Default for Precision {
    fn default() -> Self {
        Precision {
            decimal_places: 2,
            rounding: Rounding::TowardZero,
        }
    }
}

impl Precision {
    pub fn describe(&self) -> String {
        format!(
            "rust_decimal_128bit, {} dp, {:?}",
            self.decimal_places, self.rounding
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TruncatingArithmetic {
    precision: Precision,
}

impl TruncatingArithmetic {
    pub fn new(precision: Precision) -> Self {
        TruncatingArithmetic { precision }
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// Cut `value` to the configured number of fractional digits, padding
    /// shorter values so every result carries exactly that scale.
    pub fn truncate(&self, value: Decimal) -> Money {
        let dp = self.precision.decimal_places;
        let mut cut = value.round_dp_with_strategy(dp, self.precision.rounding.strategy());
        if cut.scale() < dp {
            cut.rescale(dp);
        }
        cut
    }

    /// `truncate(amount * percent / 100)`
    pub fn percent_of(&self, amount: Money, percent: Rate) -> Option<Money> {
        amount
            .checked_mul(percent)
            .and_then(|v| v.checked_div(HUNDRED))
            .map(|v| self.truncate(v))
    }

    /// `truncate(minuend - subtrahend)`
    pub fn subtract(&self, minuend: Money, subtrahend: Money) -> Option<Money> {
        minuend.checked_sub(subtrahend).map(|v| self.truncate(v))
    }

    /// `truncate(value / divisor)`; `None` on a zero divisor.
    pub fn divide(&self, value: Money, divisor: Decimal) -> Option<Money> {
        value.checked_div(divisor).map(|v| self.truncate(v))
    }

    /// `truncate(value * factor)`
    pub fn multiply(&self, value: Money, factor: Decimal) -> Option<Money> {
        value.checked_mul(factor).map(|v| self.truncate(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arith() -> TruncatingArithmetic {
        TruncatingArithmetic::default()
    }

    #[test]
    fn test_truncate_never_rounds_up() {
        assert_eq!(arith().truncate(dec!(1.239)), dec!(1.23));
        assert_eq!(arith().truncate(dec!(1.995)), dec!(1.99));
        assert_eq!(arith().truncate(dec!(-1.239)), dec!(-1.23));
    }

    #[test]
    fn test_truncate_pads_to_two_places() {
        assert_eq!(arith().truncate(dec!(80000)).to_string(), "80000.00");
        assert_eq!(arith().truncate(dec!(0.5)).to_string(), "0.50");
    }

    #[test]
    fn test_truncate_is_idempotent() {
        for v in [
            dec!(0),
            dec!(0.001),
            dec!(12.3456789),
            dec!(-98765.4321),
            dec!(1234567890.129999),
        ] {
            let once = arith().truncate(v);
            assert_eq!(arith().truncate(once), once, "value {v}");
        }
    }

    #[test]
    fn test_percent_of_hundred_is_truncate() {
        for v in [dec!(0), dec!(10.005), dec!(99999.999), dec!(-3.14159)] {
            assert_eq!(arith().percent_of(v, dec!(100)), Some(arith().truncate(v)));
        }
    }

    #[test]
    fn test_percent_of() {
        // 333.33 * 7.5% = 24.99975
        assert_eq!(arith().percent_of(dec!(333.33), dec!(7.5)), Some(dec!(24.99)));
        assert_eq!(arith().percent_of(dec!(100000), dec!(20)), Some(dec!(20000.00)));
    }

    #[test]
    fn test_divide() {
        assert_eq!(arith().divide(dec!(80000), dec!(30)), Some(dec!(2666.66)));
        assert_eq!(arith().divide(dec!(2666.66), dec!(12)), Some(dec!(222.22)));
        assert_eq!(arith().divide(dec!(1), Decimal::ZERO), None);
    }

    #[test]
    fn test_overflow_is_none() {
        assert_eq!(arith().multiply(Decimal::MAX, dec!(2)), None);
        assert_eq!(arith().percent_of(Decimal::MAX, dec!(200)), None);
    }

    #[test]
    fn test_alternate_rounding_is_explicit() {
        let half_up = TruncatingArithmetic::new(Precision {
            decimal_places: 2,
            rounding: Rounding::HalfUp,
        });
        assert_eq!(half_up.truncate(dec!(1.995)), dec!(2.00));
        assert_eq!(arith().truncate(dec!(1.995)), dec!(1.99));
    }
}

//! Tiered property-insurance and mortgage-insurance (PMI) rates.
//!
//! Both tables are keyed by loan-to-value percent (100 minus the down
//! payment percent) and by loan period. Bands are gap-free: each one is an
//! interval with explicit endpoint inclusion, the outermost bands run to
//! the Decimal limits so out-of-range values still land somewhere.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::warn;

use crate::types::{LoanPeriod, Rate};

/// Rate used when the loan-to-value cannot be determined.
pub const DEFAULT_INSURANCE_RATE: Rate = dec!(0.32);

/// PMI is never charged at or below this loan-to-value.
pub const PMI_LTV_THRESHOLD: Decimal = dec!(80);

const HUNDRED: Decimal = dec!(100);

/// An interval of loan-to-value percentages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LtvInterval {
    pub lower: Decimal,
    pub lower_inclusive: bool,
    pub upper: Decimal,
    pub upper_inclusive: bool,
}

impl LtvInterval {
    const fn new(
        lower: Decimal,
        lower_inclusive: bool,
        upper: Decimal,
        upper_inclusive: bool,
    ) -> Self {
        LtvInterval {
            lower,
            lower_inclusive,
            upper,
            upper_inclusive,
        }
    }

    /// Everything strictly below `upper`.
    const fn below(upper: Decimal) -> Self {
        Self::new(Decimal::MIN, true, upper, false)
    }

    const fn exactly(value: Decimal) -> Self {
        Self::new(value, true, value, true)
    }

    /// `(lower, upper]`
    const fn left_open(lower: Decimal, upper: Decimal) -> Self {
        Self::new(lower, false, upper, true)
    }

    /// Everything strictly above `lower`.
    const fn above(lower: Decimal) -> Self {
        Self::new(lower, false, Decimal::MAX, true)
    }

    pub fn contains(&self, ltv: Decimal) -> bool {
        let above = if self.lower_inclusive {
            ltv >= self.lower
        } else {
            ltv > self.lower
        };
        let below = if self.upper_inclusive {
            ltv <= self.upper
        } else {
            ltv < self.upper
        };
        above && below
    }
}

/// One row of a rate table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateBand {
    pub ltv: LtvInterval,
    /// Loan periods up to and including this many years use `rate_within`.
    pub period_threshold_years: u32,
    pub rate_within: Rate,
    pub rate_beyond: Rate,
}

impl RateBand {
    const fn new(
        ltv: LtvInterval,
        period_threshold_years: u32,
        rate_within: Rate,
        rate_beyond: Rate,
    ) -> Self {
        RateBand {
            ltv,
            period_threshold_years,
            rate_within,
            rate_beyond,
        }
    }

    pub fn rate_for(&self, period: LoanPeriod) -> Rate {
        if period.years() <= self.period_threshold_years {
            self.rate_within
        } else {
            self.rate_beyond
        }
    }
}

pub const PROPERTY_INSURANCE_BANDS: [RateBand; 5] = [
    RateBand::new(LtvInterval::below(dec!(85)), 25, dec!(0.32), dec!(0.32)),
    RateBand::new(LtvInterval::exactly(dec!(85)), 25, dec!(0.21), dec!(0.32)),
    RateBand::new(LtvInterval::left_open(dec!(85), dec!(90)), 25, dec!(0.41), dec!(0.52)),
    RateBand::new(LtvInterval::left_open(dec!(90), dec!(95)), 25, dec!(0.67), dec!(0.78)),
    RateBand::new(LtvInterval::above(dec!(95)), 25, dec!(0.85), dec!(0.96)),
];

/// PMI bands above the threshold; anything at or below 80 has no PMI.
pub const PMI_BANDS: [RateBand; 4] = [
    RateBand::new(LtvInterval::left_open(PMI_LTV_THRESHOLD, dec!(85)), 20, dec!(0.19), dec!(0.32)),
    RateBand::new(LtvInterval::left_open(dec!(85), dec!(90)), 20, dec!(0.23), dec!(0.52)),
    RateBand::new(LtvInterval::left_open(dec!(90), dec!(95)), 20, dec!(0.26), dec!(0.78)),
    RateBand::new(LtvInterval::above(dec!(95)), 20, dec!(0.79), dec!(0.90)),
];

/// Loan-to-value derived from the down-payment text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanToValue {
    Known(Decimal),
    Unparseable(String),
}

impl LoanToValue {
    /// `100 - down payment`; a down payment whose complement overflows is
    /// treated as unparseable.
    pub fn from_down_payment(down_payment_percent: Decimal) -> Self {
        HUNDRED
            .checked_sub(down_payment_percent)
            .map(LoanToValue::Known)
            .unwrap_or_else(|| LoanToValue::Unparseable(down_payment_percent.to_string()))
    }

    /// Derive loan-to-value from raw text; unparseable text is kept as such.
    pub fn from_down_payment_text(text: &str) -> Self {
        match Decimal::from_str(text.trim()) {
            Ok(dp) => match Self::from_down_payment(dp) {
                LoanToValue::Unparseable(_) => LoanToValue::Unparseable(text.to_string()),
                known => known,
            },
            Err(_) => LoanToValue::Unparseable(text.to_string()),
        }
    }

    pub fn value(&self) -> Option<Decimal> {
        match self {
            LoanToValue::Known(v) => Some(*v),
            LoanToValue::Unparseable(_) => None,
        }
    }
}

/// Rates resolved for one loan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateQuote {
    pub loan_to_value: Option<Decimal>,
    pub property_insurance_rate: Rate,
    pub pmi_rate: Option<Rate>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct RateSchedule {
    insurance: &'static [RateBand],
    pmi: &'static [RateBand],
}

impl Default for RateSchedule {
    fn default() -> Self {
        RateSchedule::standard()
    }
}

impl RateSchedule {
    pub const fn standard() -> Self {
        RateSchedule {
            insurance: &PROPERTY_INSURANCE_BANDS,
            pmi: &PMI_BANDS,
        }
    }

    /// Property insurance rate; falls back to the minimum band default when
    /// the loan-to-value is unknown.
    pub fn property_insurance_rate(&self, ltv: &LoanToValue, period: LoanPeriod) -> Rate {
        match ltv {
            LoanToValue::Known(v) => self
                .insurance
                .iter()
                .find(|band| band.ltv.contains(*v))
                .map(|band| band.rate_for(period))
                .unwrap_or(DEFAULT_INSURANCE_RATE),
            LoanToValue::Unparseable(_) => DEFAULT_INSURANCE_RATE,
        }
    }

    /// PMI rate, or `None` when the loan-to-value is at or below 80 or unknown.
    pub fn pmi_rate(&self, ltv: &LoanToValue, period: LoanPeriod) -> Option<Rate> {
        let v = ltv.value()?;
        if v <= PMI_LTV_THRESHOLD {
            return None;
        }
        self.pmi
            .iter()
            .find(|band| band.ltv.contains(v))
            .map(|band| band.rate_for(period))
    }

    /// Resolve both rates, logging and collecting any soft degradation.
    pub fn quote(&self, ltv: &LoanToValue, period: LoanPeriod) -> RateQuote {
        let mut warnings = Vec::new();
        match ltv {
            LoanToValue::Unparseable(text) => {
                warn!(down_payment = %text, "loan-to-value unparseable, using default rates");
                warnings.push(format!(
                    "Loan-to-value could not be derived from '{text}'; \
                     property insurance rate defaulted to {DEFAULT_INSURANCE_RATE}% and PMI omitted"
                ));
            }
            LoanToValue::Known(v) if *v < Decimal::ZERO || *v > HUNDRED => {
                warn!(loan_to_value = %v, "loan-to-value outside 0-100, using outermost band");
                warnings.push(format!(
                    "Loan-to-value {v}% is outside 0-100; the nearest rate band was used"
                ));
            }
            LoanToValue::Known(_) => {}
        }

        RateQuote {
            loan_to_value: ltv.value(),
            property_insurance_rate: self.property_insurance_rate(ltv, period),
            pmi_rate: self.pmi_rate(ltv, period),
            warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn years(y: u32) -> LoanPeriod {
        LoanPeriod::new(y).unwrap()
    }

    fn ltv(v: Decimal) -> LoanToValue {
        LoanToValue::Known(v)
    }

    /// Walk every hundredth of a percent across [0, 100] and require exactly
    /// one band to match.
    fn assert_partitions(bands: &[RateBand], from: Decimal) {
        let mut v = from;
        while v <= HUNDRED {
            let hits = bands.iter().filter(|b| b.ltv.contains(v)).count();
            assert_eq!(hits, 1, "ltv {v} matched {hits} bands");
            v += dec!(0.005);
        }
    }

    #[test]
    fn test_insurance_bands_partition_range() {
        assert_partitions(&PROPERTY_INSURANCE_BANDS, Decimal::ZERO);
    }

    #[test]
    fn test_pmi_bands_partition_above_threshold() {
        assert_partitions(&PMI_BANDS, dec!(80.005));
        assert!(!PMI_BANDS.iter().any(|b| b.ltv.contains(PMI_LTV_THRESHOLD)));
    }

    #[test]
    fn test_insurance_boundaries() {
        let s = RateSchedule::standard();
        assert_eq!(s.property_insurance_rate(&ltv(dec!(85.00)), years(25)), dec!(0.21));
        assert_eq!(s.property_insurance_rate(&ltv(dec!(85.00)), years(26)), dec!(0.32));
        assert_eq!(s.property_insurance_rate(&ltv(dec!(85.01)), years(25)), dec!(0.41));
        assert_eq!(s.property_insurance_rate(&ltv(dec!(85.01)), years(26)), dec!(0.52));
        assert_eq!(s.property_insurance_rate(&ltv(dec!(84.99)), years(10)), dec!(0.32));
        assert_eq!(s.property_insurance_rate(&ltv(dec!(84.995)), years(10)), dec!(0.32));
        assert_eq!(s.property_insurance_rate(&ltv(dec!(90)), years(25)), dec!(0.41));
        assert_eq!(s.property_insurance_rate(&ltv(dec!(90.01)), years(30)), dec!(0.78));
        assert_eq!(s.property_insurance_rate(&ltv(dec!(95)), years(25)), dec!(0.67));
        assert_eq!(s.property_insurance_rate(&ltv(dec!(100)), years(25)), dec!(0.85));
        assert_eq!(s.property_insurance_rate(&ltv(dec!(100)), years(30)), dec!(0.96));
    }

    #[test]
    fn test_pmi_absent_at_or_below_eighty() {
        let s = RateSchedule::standard();
        for v in [dec!(0), dec!(50), dec!(79.99), dec!(80), dec!(-10)] {
            for y in [1, 15, 20, 21, 30, 40] {
                assert_eq!(s.pmi_rate(&ltv(v), years(y)), None, "ltv {v} period {y}");
            }
        }
    }

    #[test]
    fn test_pmi_tiers() {
        let s = RateSchedule::standard();
        assert_eq!(s.pmi_rate(&ltv(dec!(80.01)), years(20)), Some(dec!(0.19)));
        assert_eq!(s.pmi_rate(&ltv(dec!(85)), years(21)), Some(dec!(0.32)));
        assert_eq!(s.pmi_rate(&ltv(dec!(85.01)), years(20)), Some(dec!(0.23)));
        assert_eq!(s.pmi_rate(&ltv(dec!(90)), years(30)), Some(dec!(0.52)));
        assert_eq!(s.pmi_rate(&ltv(dec!(95)), years(15)), Some(dec!(0.26)));
        assert_eq!(s.pmi_rate(&ltv(dec!(95.01)), years(20)), Some(dec!(0.79)));
        assert_eq!(s.pmi_rate(&ltv(dec!(100)), years(30)), Some(dec!(0.90)));
    }

    #[test]
    fn test_unparseable_ltv_falls_back() {
        let s = RateSchedule::standard();
        let unknown = LoanToValue::from_down_payment_text("twenty");
        assert_eq!(unknown, LoanToValue::Unparseable("twenty".into()));
        let quote = s.quote(&unknown, years(30));
        assert_eq!(quote.property_insurance_rate, DEFAULT_INSURANCE_RATE);
        assert_eq!(quote.pmi_rate, None);
        assert_eq!(quote.loan_to_value, None);
        assert_eq!(quote.warnings.len(), 1);
    }

    #[test]
    fn test_ltv_from_down_payment_text() {
        assert_eq!(
            LoanToValue::from_down_payment_text("15.00"),
            LoanToValue::Known(dec!(85))
        );
        assert_eq!(LoanToValue::from_down_payment(dec!(20)).value(), Some(dec!(80)));
    }

    #[test]
    fn test_ltv_overflowing_down_payment_is_unparseable() {
        let ltv = LoanToValue::from_down_payment(Decimal::MIN);
        assert_eq!(ltv, LoanToValue::Unparseable(Decimal::MIN.to_string()));
        let quote = RateSchedule::standard().quote(&ltv, years(30));
        assert_eq!(quote.property_insurance_rate, DEFAULT_INSURANCE_RATE);
        assert_eq!(quote.warnings.len(), 1);
    }

    #[test]
    fn test_ltv_above_hundred_uses_top_band_and_warns() {
        let s = RateSchedule::standard();
        let quote = s.quote(&LoanToValue::from_down_payment(dec!(-5)), years(10));
        assert_eq!(quote.property_insurance_rate, dec!(0.85));
        assert_eq!(quote.pmi_rate, Some(dec!(0.79)));
        assert_eq!(quote.warnings.len(), 1);
    }
}

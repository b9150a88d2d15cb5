use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::LoanEngineError;
use crate::LoanEngineResult;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as percentages (0.32 = 0.32% per annum). Never as fractions.
pub type Rate = Decimal;

/// A percentage input kept alongside the text it was entered as.
///
/// The parsed value drives the arithmetic; the text is echoed back in some
/// display fields, so "5" and "5.00" stay distinguishable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Percentage {
    pub value: Decimal,
    pub text: String,
}

impl Percentage {
    /// Parse a required percentage field. Empty input is `MissingRequiredInput`.
    pub fn parse(field: &str, raw: &str) -> LoanEngineResult<Self> {
        let text = raw.trim();
        if text.is_empty() {
            return Err(LoanEngineError::MissingRequiredInput {
                field: field.to_string(),
            });
        }
        let value = Decimal::from_str(text).map_err(|e| LoanEngineError::InvalidNumericInput {
            field: field.to_string(),
            value: text.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Percentage {
            value,
            text: text.to_string(),
        })
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Loan term in whole years. Always greater than zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct LoanPeriod(u32);

impl LoanPeriod {
    pub fn new(years: u32) -> Option<Self> {
        (years > 0).then_some(LoanPeriod(years))
    }

    /// Parse a required loan-period field.
    pub fn parse(field: &str, raw: &str) -> LoanEngineResult<Self> {
        let text = raw.trim();
        if text.is_empty() {
            return Err(LoanEngineError::MissingRequiredInput {
                field: field.to_string(),
            });
        }
        let invalid = |reason: &str| LoanEngineError::InvalidNumericInput {
            field: field.to_string(),
            value: text.to_string(),
            reason: reason.to_string(),
        };
        let years: i64 = text
            .parse()
            .map_err(|_| invalid("must be a whole number of years"))?;
        u32::try_from(years)
            .ok()
            .and_then(LoanPeriod::new)
            .ok_or_else(|| invalid("must be a positive integer"))
    }

    pub fn years(self) -> u32 {
        self.0
    }

    pub fn as_decimal(self) -> Decimal {
        Decimal::from(self.0)
    }
}

impl TryFrom<u32> for LoanPeriod {
    type Error = String;

    fn try_from(years: u32) -> Result<Self, Self::Error> {
        LoanPeriod::new(years).ok_or_else(|| "loan period must be greater than zero".to_string())
    }
}

impl From<LoanPeriod> for u32 {
    fn from(p: LoanPeriod) -> u32 {
        p.0
    }
}

impl fmt::Display for LoanPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation. Carries no timing so output stays
/// identical across repeated runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    precision: String,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            precision,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_percentage_keeps_entered_text() {
        let p = Percentage::parse("down_payment_percent", " 5.00 ").unwrap();
        assert_eq!(p.value, dec!(5));
        assert_eq!(p.text, "5.00");
        assert_eq!(p.to_string(), "5.00");
    }

    #[test]
    fn test_percentage_empty_is_missing() {
        let err = Percentage::parse("annual_interest_rate_percent", "  ").unwrap_err();
        assert_eq!(
            err,
            LoanEngineError::MissingRequiredInput {
                field: "annual_interest_rate_percent".into()
            }
        );
    }

    #[test]
    fn test_percentage_rejects_text() {
        let err = Percentage::parse("down_payment_percent", "twenty").unwrap_err();
        assert!(matches!(err, LoanEngineError::InvalidNumericInput { .. }));
    }

    #[test]
    fn test_loan_period_must_be_positive() {
        assert_eq!(LoanPeriod::parse("loan_period_years", "30").unwrap().years(), 30);
        for bad in ["0", "-5", "2.5", "ten"] {
            let err = LoanPeriod::parse("loan_period_years", bad).unwrap_err();
            assert!(
                matches!(err, LoanEngineError::InvalidNumericInput { .. }),
                "{bad} should be rejected, got {err:?}"
            );
        }
        assert!(matches!(
            LoanPeriod::parse("loan_period_years", "").unwrap_err(),
            LoanEngineError::MissingRequiredInput { .. }
        ));
    }
}

//! Display text for record fields: names, location, echoed inputs and the
//! "A AND B" composites shown side by side on a record.

use rust_decimal::RoundingStrategy;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

use crate::types::{LoanPeriod, Percentage};

const NO_COMMA_TEXT: &str = "Invalid format: no comma found";

/// Trim, uppercase, and triple every space: "john doe" → "JOHN   DOE".
pub fn format_name(raw: &str) -> String {
    raw.trim().to_uppercase().replace(' ', "   ")
}

/// Formatted "CITY , STATE" text, or the no-comma sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationText {
    Formatted(String),
    NoCommaInLocation,
}

impl LocationText {
    pub fn as_str(&self) -> &str {
        match self {
            LocationText::Formatted(s) => s,
            LocationText::NoCommaInLocation => NO_COMMA_TEXT,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, LocationText::Formatted(_))
    }
}

impl fmt::Display for LocationText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// "new york, ny" → "NEW YORK , NY". Splits on the first comma only.
pub fn format_location(raw: &str) -> LocationText {
    let text = raw.trim().to_uppercase();
    match text.split_once(',') {
        Some((left, right)) => {
            LocationText::Formatted(format!("{} , {}", left.trim(), right.trim()))
        }
        None => {
            warn!(location = %raw, "location has no comma separator");
            LocationText::NoCommaInLocation
        }
    }
}

/// Down payment as echoed on a record: two decimals when entered with a
/// decimal point ("5.5" → "5.50"), the bare integer otherwise.
pub fn echo_down_payment(percent: &Percentage) -> String {
    if percent.text.contains('.') {
        let mut v = percent
            .value
            .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
        v.rescale(2);
        v.to_string()
    } else {
        percent.value.trunc().to_string()
    }
}

/// "<A> AND <B>"
pub fn pair(left: &str, right: &str) -> String {
    format!("{left} AND {right}")
}

/// "<period> YEARS AND <rate> %"
pub fn period_and_rate(period: LoanPeriod, rate: &Percentage) -> String {
    format!("{period} YEARS AND {} %", rate.value)
}

/// "<formatted purchase value> AND <down payment> %"
pub fn value_and_percent(formatted_value: &str, percent: &Percentage) -> String {
    format!("{formatted_value} AND {} %", echo_down_payment(percent))
}

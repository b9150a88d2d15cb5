//! Currency rendering.
//!
//! Two conventions that are never interchanged: the comma style used in
//! inline summaries (`1,234,567.89`) and the spaced-dollar style used by
//! record display fields (`$  1  ,  234  ,  567.89`). Both expect an
//! already-truncated amount and only cut, never round, any stray digits.

use rust_decimal::RoundingStrategy;
use serde::{Deserialize, Serialize};

use crate::types::Money;

/// Rendering of an absent amount in either style.
pub const NOT_APPLICABLE: &str = "NA";

const SPACED_PREFIX: &str = "$  ";
const SPACED_SEPARATOR: &str = "  ,  ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurrencyStyle {
    Comma,
    SpacedDollar,
}

impl CurrencyStyle {
    pub fn render(self, amount: Money) -> String {
        match self {
            CurrencyStyle::Comma => format_comma(amount),
            CurrencyStyle::SpacedDollar => format_spaced_dollar(amount),
        }
    }

    /// Render an optional amount; `None` becomes `NA`.
    pub fn render_opt(self, amount: Option<Money>) -> String {
        amount
            .map(|a| self.render(a))
            .unwrap_or_else(|| NOT_APPLICABLE.to_string())
    }
}

/// Sign, whole-number digit groups (most significant first) and the two
/// fractional digits of an amount.
struct Parts {
    negative: bool,
    groups: Vec<String>,
    fraction: String,
}

fn split_parts(amount: Money) -> Parts {
    let mut fixed = amount
        .abs()
        .round_dp_with_strategy(2, RoundingStrategy::ToZero);
    fixed.rescale(2);
    let text = fixed.to_string();
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let digits: Vec<char> = whole.chars().collect();
    let head = match digits.len() % 3 {
        0 => 3,
        n => n,
    };
    let mut groups = Vec::with_capacity(digits.len() / 3 + 1);
    groups.push(digits[..head.min(digits.len())].iter().collect());
    groups.extend(digits[head.min(digits.len())..].chunks(3).map(|c| c.iter().collect()));

    Parts {
        negative: amount.is_sign_negative() && !fixed.is_zero(),
        groups,
        fraction: fraction.to_string(),
    }
}

/// `1234567.89` → `1,234,567.89`
pub fn format_comma(amount: Money) -> String {
    let parts = split_parts(amount);
    format!(
        "{}{}.{}",
        if parts.negative { "-" } else { "" },
        parts.groups.join(","),
        parts.fraction
    )
}

/// `1234567.89` → `$  1  ,  234  ,  567.89`; `45.5` → `$  45.50`
pub fn format_spaced_dollar(amount: Money) -> String {
    let parts = split_parts(amount);
    format!(
        "{SPACED_PREFIX}{}{}.{}",
        if parts.negative { "-" } else { "" },
        parts.groups.join(SPACED_SEPARATOR),
        parts.fraction
    )
}

pub fn format_spaced_dollar_opt(amount: Option<Money>) -> String {
    CurrencyStyle::SpacedDollar.render_opt(amount)
}

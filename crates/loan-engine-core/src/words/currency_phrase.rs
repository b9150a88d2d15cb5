//! "<dollars words> dollars and <cents words> cents" → exact decimal.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::number_words::parse_number_words;
use crate::error::LoanEngineError;
use crate::types::Money;
use crate::LoanEngineResult;

const CENTS_PER_DOLLAR: u128 = 100;

/// A parsed currency phrase with its two integer halves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyAmount {
    pub dollars: u128,
    pub cents: u128,
    pub amount: Money,
}

/// Parse a currency phrase into an exact decimal amount.
pub fn parse_currency_phrase(input: &str) -> LoanEngineResult<Money> {
    parse_currency_phrase_parts(input).map(|parsed| parsed.amount)
}

/// Parse a currency phrase, keeping the dollar and cent integers.
///
/// A leading `$` is stripped. Matching is case-insensitive and requires
/// exactly one "dollars and" delimiter followed by words and a final "cents".
/// Cents above 99 are carried arithmetically.
pub fn parse_currency_phrase_parts(input: &str) -> LoanEngineResult<CurrencyAmount> {
    let text = input.trim();
    let text = text.strip_prefix('$').map(str::trim_start).unwrap_or(text);
    let tokens: Vec<&str> = text.split_whitespace().collect();

    let Some((last, body)) = tokens.split_last() else {
        return Err(LoanEngineError::phrase(input, "phrase is empty"));
    };
    if !last.eq_ignore_ascii_case("cents") {
        return Err(LoanEngineError::phrase(input, "phrase must end with 'cents'"));
    }
    if body.iter().any(|t| t.eq_ignore_ascii_case("cents")) {
        return Err(LoanEngineError::phrase(input, "'cents' must appear exactly once"));
    }

    let delimiters: Vec<usize> = body
        .windows(2)
        .enumerate()
        .filter(|(_, pair)| {
            pair[0].eq_ignore_ascii_case("dollars") && pair[1].eq_ignore_ascii_case("and")
        })
        .map(|(i, _)| i)
        .collect();
    let split = match delimiters.as_slice() {
        [i] => *i,
        [] => {
            return Err(LoanEngineError::phrase(
                input,
                "expected the form '<…> dollars and <…> cents'",
            ))
        }
        _ => {
            return Err(LoanEngineError::phrase(
                input,
                "'dollars and' must appear exactly once",
            ))
        }
    };

    let dollar_words = &body[..split];
    let cent_words = &body[split + 2..];
    if dollar_words.is_empty() {
        return Err(LoanEngineError::phrase(input, "no words before 'dollars'"));
    }
    if cent_words.is_empty() {
        return Err(LoanEngineError::phrase(input, "no words before 'cents'"));
    }

    let dollars = parse_number_words(&dollar_words.join(" "));
    let cents = parse_number_words(&cent_words.join(" "));
    if cents >= CENTS_PER_DOLLAR {
        warn!(cents = %cents, "cents value exceeds 99, carried into dollars");
    }

    let amount = dollars
        .checked_mul(CENTS_PER_DOLLAR)
        .and_then(|d| d.checked_add(cents))
        .and_then(|total| i128::try_from(total).ok())
        .and_then(|total| Decimal::try_from_i128_with_scale(total, 2).ok())
        .ok_or_else(|| LoanEngineError::phrase(input, "amount exceeds supported range"))?;

    Ok(CurrencyAmount {
        dollars,
        cents,
        amount,
    })
}

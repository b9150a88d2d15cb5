//! English number words to an unsigned magnitude.
//!
//! Tokens are accumulated into a hundreds group; "hundred" multiplies the
//! group, every larger scale word flushes the group into the running total.
//! Unknown tokens are skipped and word-order mistakes are not rejected, so
//! the parser never fails.

const ONES: &[(&str, u128)] = &[
    ("zero", 0),
    ("one", 1),
    ("two", 2),
    ("three", 3),
    ("four", 4),
    ("five", 5),
    ("six", 6),
    ("seven", 7),
    ("eight", 8),
    ("nine", 9),
    ("ten", 10),
    ("eleven", 11),
    ("twelve", 12),
    ("thirteen", 13),
    ("fourteen", 14),
    ("fifteen", 15),
    ("sixteen", 16),
    ("seventeen", 17),
    ("eighteen", 18),
    ("nineteen", 19),
];

const TENS: &[(&str, u128)] = &[
    ("twenty", 20),
    ("thirty", 30),
    ("forty", 40),
    ("fifty", 50),
    ("sixty", 60),
    ("seventy", 70),
    ("eighty", 80),
    ("ninety", 90),
];

const HUNDRED: u128 = 100;

const SCALES: &[(&str, u128)] = &[
    ("thousand", 1_000),
    ("million", 1_000_000),
    ("billion", 1_000_000_000),
    ("trillion", 1_000_000_000_000),
];

fn lookup(table: &[(&str, u128)], word: &str) -> Option<u128> {
    table
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(word))
        .map(|(_, v)| *v)
}

/// Split on anything that is not an ASCII letter, so "Twenty-Three" yields
/// two tokens.
fn tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_ascii_alphabetic())
        .filter(|w| !w.is_empty())
}

/// Parse a phrase such as "Four Hundred Seventy Three Thousand Nine".
///
/// Empty or entirely unrecognised input yields 0. Arithmetic saturates at
/// `u128::MAX`; callers converting to `Decimal` reject anything that large.
pub fn parse_number_words(text: &str) -> u128 {
    let mut total: u128 = 0;
    let mut group: u128 = 0;

    for word in tokens(text) {
        if let Some(v) = lookup(ONES, word).or_else(|| lookup(TENS, word)) {
            group = group.saturating_add(v);
        } else if word.eq_ignore_ascii_case("hundred") {
            group = group.saturating_mul(HUNDRED);
        } else if let Some(scale) = lookup(SCALES, word) {
            total = total.saturating_add(group.saturating_mul(scale));
            group = 0;
        }
    }

    total.saturating_add(group)
}

//! Spelled-out amounts: English number words and the
//! "<words> dollars and <words> cents" phrase built on top of them.

pub mod currency_phrase;
pub mod number_words;

pub use currency_phrase::{parse_currency_phrase, parse_currency_phrase_parts, CurrencyAmount};
pub use number_words::parse_number_words;

use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use std::str::FromStr;

use loan_engine_core::format::CurrencyStyle;
use loan_engine_core::pipeline::{calculate_loan, ConfigPreset, LoanApplication, PipelineConfig};
use loan_engine_core::rates::{LoanToValue, RateSchedule};
use loan_engine_core::words::parse_currency_phrase;
use loan_engine_core::LoanPeriod;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse_amount_arg(amount: &str) -> NapiResult<Decimal> {
    Decimal::from_str(amount.trim()).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Run the loan pipeline. `config_json` is either a full `PipelineConfig`
/// object or a preset name such as `"purchase_value_basis"`; omit it for
/// the loan-amount basis.
#[napi]
pub fn calculate(application_json: String, config_json: Option<String>) -> NapiResult<String> {
    let application: LoanApplication =
        serde_json::from_str(&application_json).map_err(to_napi_error)?;
    let config = match config_json {
        None => PipelineConfig::default(),
        Some(raw) => match serde_json::from_str::<PipelineConfig>(&raw) {
            Ok(config) => config,
            Err(_) => serde_json::from_str::<ConfigPreset>(&raw)
                .map_err(to_napi_error)?
                .config(),
        },
    };
    let output = calculate_loan(&application, &config).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Parsing and formatting
// ---------------------------------------------------------------------------

/// Parse a "<words> dollars and <words> cents" phrase to a decimal string.
#[napi]
pub fn parse_amount(phrase: String) -> NapiResult<String> {
    parse_currency_phrase(&phrase)
        .map(|amount| amount.to_string())
        .map_err(to_napi_error)
}

#[napi]
pub fn format_comma(amount: String) -> NapiResult<String> {
    Ok(CurrencyStyle::Comma.render(parse_amount_arg(&amount)?))
}

/// Spaced-dollar rendering; `null` renders as `NA`.
#[napi]
pub fn format_spaced_dollar(amount: Option<String>) -> NapiResult<String> {
    let amount = amount.as_deref().map(parse_amount_arg).transpose()?;
    Ok(CurrencyStyle::SpacedDollar.render_opt(amount))
}

// ---------------------------------------------------------------------------
// Rates
// ---------------------------------------------------------------------------

#[napi]
pub fn rate_quote(down_payment_percent: String, loan_period_years: u32) -> NapiResult<String> {
    let period = LoanPeriod::new(loan_period_years)
        .ok_or_else(|| to_napi_error("loan period must be greater than zero"))?;
    let ltv = LoanToValue::from_down_payment_text(&down_payment_percent);
    let quote = RateSchedule::standard().quote(&ltv, period);
    serde_json::to_string(&quote).map_err(to_napi_error)
}

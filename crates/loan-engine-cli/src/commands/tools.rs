use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::{json, Value};

use loan_engine_core::format::CurrencyStyle;
use loan_engine_core::rates::{LoanToValue, RateSchedule};
use loan_engine_core::words::parse_currency_phrase_parts;
use loan_engine_core::LoanPeriod;

/// Arguments for parsing a spelled-out amount
#[derive(Args)]
pub struct ParseAmountArgs {
    /// e.g. "Four Hundred dollars and Fifty cents"
    #[arg(long)]
    pub phrase: String,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StyleArg {
    /// 1,234.56
    Comma,
    /// $  1  ,  234.56
    Spaced,
}

impl From<StyleArg> for CurrencyStyle {
    fn from(s: StyleArg) -> Self {
        match s {
            StyleArg::Comma => CurrencyStyle::Comma,
            StyleArg::Spaced => CurrencyStyle::SpacedDollar,
        }
    }
}

/// Arguments for rendering an amount
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct FormatArgs {
    /// Amount, already truncated to two decimals
    #[arg(long)]
    pub amount: Decimal,

    #[arg(long, value_enum, default_value_t = StyleArg::Spaced)]
    pub style: StyleArg,
}

/// Arguments for a rate lookup
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct RatesArgs {
    /// Down payment % (loan-to-value is 100 minus this)
    #[arg(long)]
    pub down_payment: String,

    /// Loan period in whole years
    #[arg(long)]
    pub loan_period: u32,
}

pub fn run_parse_amount(args: ParseAmountArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let parsed = parse_currency_phrase_parts(&args.phrase)?;
    Ok(json!({
        "result": {
            "amount": parsed.amount.to_string(),
            "dollars": parsed.dollars.to_string(),
            "cents": parsed.cents.to_string(),
            "comma": CurrencyStyle::Comma.render(parsed.amount),
            "spaced": CurrencyStyle::SpacedDollar.render(parsed.amount),
        }
    }))
}

pub fn run_format(args: FormatArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let style = CurrencyStyle::from(args.style);
    Ok(json!({
        "result": {
            "amount": args.amount.to_string(),
            "formatted": style.render(args.amount),
        }
    }))
}

pub fn run_rates(args: RatesArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let period =
        LoanPeriod::new(args.loan_period).ok_or("--loan-period must be greater than zero")?;
    let ltv = LoanToValue::from_down_payment_text(&args.down_payment);
    let quote = RateSchedule::standard().quote(&ltv, period);
    Ok(json!({
        "result": {
            "loan_to_value": quote.loan_to_value.map(|v| v.to_string()),
            "property_insurance_rate": quote.property_insurance_rate.to_string(),
            "pmi_rate": quote.pmi_rate.map(|v| v.to_string()),
        },
        "warnings": quote.warnings,
    }))
}

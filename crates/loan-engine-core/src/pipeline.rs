//! Loan calculation pipeline.
//!
//! Threads a spelled-out purchase value through a fixed sequence of
//! truncated percentage steps: purchase-value reduction, down payment, loan
//! amount, principal, interest, insurance, PMI and the optional property
//! tax. Each step consumes only truncated values from earlier steps, and a
//! missing or malformed input aborts the run at the step that needs it.
//!
//! Call sites that historically differed (whether the total-interest
//! reduction applies, which amount insurance and PMI are charged on) are
//! expressed as [`PipelineConfig`] flags with named presets.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::arithmetic::{Precision, TruncatingArithmetic};
use crate::display::{
    format_location, format_name, pair, period_and_rate, value_and_percent, LocationText,
};
use crate::error::LoanEngineError;
use crate::format::{format_comma, format_spaced_dollar, format_spaced_dollar_opt};
use crate::rates::{LoanToValue, RateSchedule};
use crate::types::{with_metadata, ComputationOutput, LoanPeriod, Money, Percentage, Rate};
use crate::words::parse_currency_phrase_parts;
use crate::LoanEngineResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Fixed annual property tax rate, in percent, on the reduced assessment.
pub const PROPERTY_TAX_RATE: Rate = dec!(2);

/// Literal that disables the property-tax branch.
pub const NOT_APPLICABLE_INPUT: &str = "NA";

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Amount a rate is charged on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountBasis {
    LoanAmount,
    PurchaseValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub apply_total_interest_reduction: bool,
    pub insurance_basis: AmountBasis,
    pub pmi_basis: AmountBasis,
    #[serde(default)]
    pub precision: Precision,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig::loan_amount_basis()
    }
}

impl PipelineConfig {
    /// Insurance and PMI on the loan amount, total-interest reduction applied.
    pub fn loan_amount_basis() -> Self {
        PipelineConfig {
            apply_total_interest_reduction: true,
            insurance_basis: AmountBasis::LoanAmount,
            pmi_basis: AmountBasis::LoanAmount,
            precision: Precision::default(),
        }
    }

    /// Insurance and PMI on the reduced purchase value, total-interest
    /// reduction applied.
    pub fn purchase_value_basis() -> Self {
        PipelineConfig {
            insurance_basis: AmountBasis::PurchaseValue,
            pmi_basis: AmountBasis::PurchaseValue,
            ..PipelineConfig::loan_amount_basis()
        }
    }

    /// Loan-amount basis with the total-interest reduction skipped.
    pub fn without_interest_reduction() -> Self {
        PipelineConfig {
            apply_total_interest_reduction: false,
            ..PipelineConfig::loan_amount_basis()
        }
    }

    fn methodology(&self) -> &'static str {
        match (self.insurance_basis, self.apply_total_interest_reduction) {
            (AmountBasis::LoanAmount, true) => {
                "Truncating loan pipeline (loan amount basis, interest reduction applied)"
            }
            (AmountBasis::LoanAmount, false) => {
                "Truncating loan pipeline (loan amount basis, no interest reduction)"
            }
            (AmountBasis::PurchaseValue, true) => {
                "Truncating loan pipeline (purchase value basis, interest reduction applied)"
            }
            (AmountBasis::PurchaseValue, false) => {
                "Truncating loan pipeline (purchase value basis, no interest reduction)"
            }
        }
    }
}

/// Named configurations for callers that select by name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigPreset {
    #[default]
    LoanAmountBasis,
    PurchaseValueBasis,
    WithoutInterestReduction,
}

impl ConfigPreset {
    pub fn config(self) -> PipelineConfig {
        match self {
            ConfigPreset::LoanAmountBasis => PipelineConfig::loan_amount_basis(),
            ConfigPreset::PurchaseValueBasis => PipelineConfig::purchase_value_basis(),
            ConfigPreset::WithoutInterestReduction => PipelineConfig::without_interest_reduction(),
        }
    }
}

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// Raw input bundle as supplied by a form or file. Every field is text;
/// parsing happens inside the pipeline at the step that needs it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoanApplication {
    pub image_number: String,
    /// Operator who entered the record.
    pub username: String,
    pub customer_reference: String,
    pub customer_name: String,
    pub guarantor_name: String,
    pub guarantor_reference: String,
    /// "city, state" free text.
    pub city_state: String,
    /// e.g. "One Hundred Thousand dollars and Zero cents".
    pub purchase_value_phrase: String,
    pub purchase_value_reduction_percent: String,
    pub down_payment_percent: String,
    pub loan_period_years: String,
    pub annual_interest_rate_percent: String,
    pub monthly_principal_reduction_percent: String,
    pub total_interest_reduction_percent: String,
    /// `None`, empty or "NA" disables the property-tax branch.
    pub assessment_reduction_rate_percent: Option<String>,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Inline summary, every amount in comma style, percentages as entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommaSummary {
    /// Parsed purchase value
    pub original_amount: String,
    /// Purchase value reduction % as entered
    pub purchase_value_reduction_input: String,
    /// Purchase value after the reduction
    pub reduced_value: String,
    /// Reduced value carried into the loan (truncated to cents)
    pub excel_purchase_value: String,
    /// Down payment % as entered
    pub down_payment_input: String,
    /// Down payment amount
    pub down_payment_value: String,
    /// Purchase value less down payment
    pub loan_amount: String,
    /// Loan period in years as entered
    pub loan_period_input: String,
    /// Monthly principal reduction % as entered
    pub monthly_principal_reduction_input: String,
    /// Loan amount spread over the period, per year
    pub annual_principal: String,
    /// Annual principal over twelve months
    pub monthly_principal: String,
    /// Monthly principal after the reduction %
    pub final_principal: String,
}

/// Record display fields, amounts in spaced-dollar style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayFields {
    /// Upper-cased, word gaps widened
    pub customer_reference: String,
    pub customer_name: String,
    pub guarantor_name: String,
    pub guarantor_reference: String,
    /// Spaced "CITY , STATE", or the no-comma sentinel
    pub city_state: LocationText,
    /// "$ value AND down payment %"
    pub purchase_value_and_down_payment: String,
    /// "N YEARS AND rate %"
    pub loan_period_and_interest: String,
    /// Loan amount AND final monthly principal
    pub loan_amount_and_principal: String,
    /// Total interest for the period
    pub total_interest: String,
    /// Property tax for the period, or NA
    pub property_tax: String,
    /// Total interest AND property tax
    pub interest_and_property_tax: String,
    /// Monthly insurance AND annual PMI (NA when none)
    pub insurance_and_pmi: String,
}

/// Every intermediate and final amount of one run, plus its display text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    /// Purchase value parsed from the phrase
    pub original_amount: Money,
    /// Purchase value after the reduction %
    pub reduced_value: Money,
    /// Reduced value truncated to cents
    pub excel_purchase_value: Money,
    /// Down payment amount
    pub down_payment_value: Money,
    /// Amount financed
    pub loan_amount: Money,
    /// Principal repaid per year
    pub annual_principal: Money,
    /// Principal repaid per month
    pub monthly_principal: Money,
    /// Monthly principal after the reduction %
    pub final_principal: Money,
    /// Interest charged per year
    pub interest_per_annum: Money,
    /// Interest for the whole period before any reduction.
    pub gross_total_interest: Money,
    /// Interest for the whole period after the reduction, if applied
    pub total_interest_for_period: Money,
    /// 100 - down payment %; `None` when it could not be derived
    pub loan_to_value: Option<Decimal>,
    /// Property insurance rate (%)
    pub property_insurance_rate: Rate,
    /// Property insurance per month
    pub property_insurance_per_month: Money,
    /// PMI rate (%), `None` at or below 80% LTV
    pub pmi_rate: Option<Rate>,
    /// PMI per year
    pub pmi_per_annum: Option<Money>,
    /// Assessment rate % of the loan amount
    pub reduced_assessment_value: Option<Money>,
    /// Property tax per year
    pub property_tax_per_annum: Option<Money>,
    /// Property tax for the whole period
    pub property_tax_for_period: Option<Money>,
    /// Comma-style summary
    pub summary: CommaSummary,
    /// Spaced-dollar display text
    pub display: DisplayFields,
}

struct PropertyTax {
    reduced_assessment_value: Money,
    per_annum: Money,
    for_period: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run the pipeline once with the given configuration.
pub fn calculate_loan(
    application: &LoanApplication,
    config: &PipelineConfig,
) -> LoanEngineResult<ComputationOutput<CalculationResult>> {
    LoanCalculationPipeline::new(*config).run(application)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LoanCalculationPipeline {
    config: PipelineConfig,
    arithmetic: TruncatingArithmetic,
    rates: RateSchedule,
}

impl LoanCalculationPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        LoanCalculationPipeline {
            config,
            arithmetic: TruncatingArithmetic::new(config.precision),
            rates: RateSchedule::standard(),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn run(
        &self,
        app: &LoanApplication,
    ) -> LoanEngineResult<ComputationOutput<CalculationResult>> {
        let mut warnings: Vec<String> = Vec::new();
        let a = &self.arithmetic;

        // 1. Spelled-out purchase value
        let parsed = parse_currency_phrase_parts(&app.purchase_value_phrase)?;
        if parsed.cents > 99 {
            warnings.push(format!(
                "Cents value {} exceeds 99 and was carried into dollars",
                parsed.cents
            ));
        }
        let original_amount = parsed.amount;
        debug!(%original_amount, "parsed purchase value");

        // 2. Purchase value reduction
        let pv_reduction = Percentage::parse(
            "purchase_value_reduction_percent",
            &app.purchase_value_reduction_percent,
        )?;
        let reduced_value = checked(
            "reduced_value",
            a.percent_of(original_amount, pv_reduction.value),
        )?;
        let excel_purchase_value = checked(
            "excel_purchase_value",
            a.subtract(original_amount, reduced_value),
        )?;
        debug!(%reduced_value, %excel_purchase_value, "applied purchase value reduction");

        // 3. Down payment and loan amount
        let down_payment = Percentage::parse("down_payment_percent", &app.down_payment_percent)?;
        let down_payment_value = checked(
            "down_payment_value",
            a.percent_of(excel_purchase_value, down_payment.value),
        )?;
        let loan_amount = checked(
            "loan_amount",
            a.subtract(excel_purchase_value, down_payment_value),
        )?;
        debug!(%down_payment_value, %loan_amount, "derived loan amount");

        // 4. Principal
        let period = LoanPeriod::parse("loan_period_years", &app.loan_period_years)?;
        let principal_reduction = Percentage::parse(
            "monthly_principal_reduction_percent",
            &app.monthly_principal_reduction_percent,
        )?;
        let annual_principal = checked(
            "annual_principal",
            a.divide(loan_amount, period.as_decimal()),
        )?;
        let monthly_principal = checked(
            "monthly_principal",
            a.divide(annual_principal, MONTHS_PER_YEAR),
        )?;
        let final_principal = checked(
            "final_principal",
            a.percent_of(monthly_principal, principal_reduction.value),
        )?;
        debug!(%annual_principal, %monthly_principal, %final_principal, "derived principal");

        // 5. Interest
        let interest_rate = Percentage::parse(
            "annual_interest_rate_percent",
            &app.annual_interest_rate_percent,
        )?;
        let interest_per_annum = checked(
            "interest_per_annum",
            a.percent_of(loan_amount, interest_rate.value),
        )?;
        let gross_total_interest = checked(
            "total_interest_for_period",
            a.multiply(interest_per_annum, period.as_decimal()),
        )?;
        let total_interest_for_period = if self.config.apply_total_interest_reduction {
            let reduction = Percentage::parse(
                "total_interest_reduction_percent",
                &app.total_interest_reduction_percent,
            )?;
            checked(
                "total_interest_reduction",
                a.percent_of(gross_total_interest, reduction.value),
            )?
        } else {
            gross_total_interest
        };
        debug!(%interest_per_annum, %total_interest_for_period, "derived interest");

        // 6. Property insurance, 7. PMI
        let ltv = LoanToValue::from_down_payment_text(&down_payment.text);
        let quote = self.rates.quote(&ltv, period);
        warnings.extend(quote.warnings.iter().cloned());

        let insurance_base =
            self.basis(self.config.insurance_basis, loan_amount, excel_purchase_value);
        let insurance_per_annum = checked(
            "property_insurance",
            a.percent_of(insurance_base, quote.property_insurance_rate),
        )?;
        let property_insurance_per_month = checked(
            "property_insurance",
            a.divide(insurance_per_annum, MONTHS_PER_YEAR),
        )?;

        let pmi_base = self.basis(self.config.pmi_basis, loan_amount, excel_purchase_value);
        let pmi_per_annum = quote
            .pmi_rate
            .map(|rate| checked("pmi_per_annum", a.percent_of(pmi_base, rate)))
            .transpose()?;
        debug!(
            rate = %quote.property_insurance_rate,
            %property_insurance_per_month,
            pmi = ?pmi_per_annum,
            "derived insurance"
        );

        // 8. Optional property tax
        let property_tax = self.property_tax(app, loan_amount, period)?;

        let city_state = format_location(&app.city_state);
        if !city_state.is_valid() {
            warnings.push(format!(
                "City/state '{}' has no comma separator",
                app.city_state.trim()
            ));
        }

        let total_interest_text = format_spaced_dollar(total_interest_for_period);
        let property_tax_text =
            format_spaced_dollar_opt(property_tax.as_ref().map(|t| t.for_period));

        let display = DisplayFields {
            customer_reference: format_name(&app.customer_reference),
            customer_name: format_name(&app.customer_name),
            guarantor_name: format_name(&app.guarantor_name),
            guarantor_reference: format_name(&app.guarantor_reference),
            city_state,
            purchase_value_and_down_payment: value_and_percent(
                &format_spaced_dollar(excel_purchase_value),
                &down_payment,
            ),
            loan_period_and_interest: period_and_rate(period, &interest_rate),
            loan_amount_and_principal: pair(
                &format_spaced_dollar(loan_amount),
                &format_spaced_dollar(final_principal),
            ),
            interest_and_property_tax: pair(&total_interest_text, &property_tax_text),
            total_interest: total_interest_text,
            property_tax: property_tax_text,
            insurance_and_pmi: pair(
                &format_spaced_dollar(property_insurance_per_month),
                &format_spaced_dollar_opt(pmi_per_annum),
            ),
        };

        let summary = CommaSummary {
            original_amount: format_comma(original_amount),
            purchase_value_reduction_input: pv_reduction.text.clone(),
            reduced_value: format_comma(reduced_value),
            excel_purchase_value: format_comma(excel_purchase_value),
            down_payment_input: down_payment.text.clone(),
            down_payment_value: format_comma(down_payment_value),
            loan_amount: format_comma(loan_amount),
            loan_period_input: app.loan_period_years.trim().to_string(),
            monthly_principal_reduction_input: principal_reduction.text.clone(),
            annual_principal: format_comma(annual_principal),
            monthly_principal: format_comma(monthly_principal),
            final_principal: format_comma(final_principal),
        };

        let result = CalculationResult {
            original_amount,
            reduced_value,
            excel_purchase_value,
            down_payment_value,
            loan_amount,
            annual_principal,
            monthly_principal,
            final_principal,
            interest_per_annum,
            gross_total_interest,
            total_interest_for_period,
            loan_to_value: quote.loan_to_value,
            property_insurance_rate: quote.property_insurance_rate,
            property_insurance_per_month,
            pmi_rate: quote.pmi_rate,
            pmi_per_annum,
            reduced_assessment_value: property_tax.as_ref().map(|t| t.reduced_assessment_value),
            property_tax_per_annum: property_tax.as_ref().map(|t| t.per_annum),
            property_tax_for_period: property_tax.as_ref().map(|t| t.for_period),
            summary,
            display,
        };

        Ok(with_metadata(
            self.config.methodology(),
            &self.config,
            warnings,
            self.config.precision.describe(),
            result,
        ))
    }

    fn basis(&self, basis: AmountBasis, loan_amount: Money, purchase_value: Money) -> Money {
        match basis {
            AmountBasis::LoanAmount => loan_amount,
            AmountBasis::PurchaseValue => purchase_value,
        }
    }

    fn property_tax(
        &self,
        app: &LoanApplication,
        loan_amount: Money,
        period: LoanPeriod,
    ) -> LoanEngineResult<Option<PropertyTax>> {
        let raw = match app.assessment_reduction_rate_percent.as_deref().map(str::trim) {
            None | Some("") => return Ok(None),
            Some(t) if t.eq_ignore_ascii_case(NOT_APPLICABLE_INPUT) => return Ok(None),
            Some(t) => t,
        };
        let assessment_rate = Percentage::parse("assessment_reduction_rate_percent", raw)?;
        let a = &self.arithmetic;

        let reduced_assessment_value = checked(
            "reduced_assessment_value",
            a.percent_of(loan_amount, assessment_rate.value),
        )?;
        let per_annum = checked(
            "property_tax_per_annum",
            a.percent_of(reduced_assessment_value, PROPERTY_TAX_RATE),
        )?;
        let for_period = checked(
            "property_tax_for_period",
            a.multiply(per_annum, period.as_decimal()),
        )?;
        debug!(%reduced_assessment_value, %per_annum, %for_period, "derived property tax");

        Ok(Some(PropertyTax {
            reduced_assessment_value,
            per_annum,
            for_period,
        }))
    }
}

fn checked(step: &str, value: Option<Money>) -> LoanEngineResult<Money> {
    value.ok_or_else(|| {
        warn!(step, "arithmetic overflow, aborting calculation");
        LoanEngineError::overflow(step)
    })
}

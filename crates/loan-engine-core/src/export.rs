//! Spreadsheet row for a processed record.
//!
//! Field renames are the column headers, so a `csv::Writer` serialising
//! these rows emits the header line on its own.

use serde::{Deserialize, Serialize};

use crate::pipeline::{CalculationResult, LoanApplication};

pub const EXPORT_HEADERS: [&str; 13] = [
    "Image Number",
    "Serial Number",
    "Username",
    "Customer Reference Number",
    "Customer Name",
    "City, State",
    "Purchase Value and Down Payment",
    "Loan Period and Annual Interest",
    "Guarantor Name",
    "Guarantor Reference Number",
    "Loan Amount and Principal",
    "Total Interest for Loan Period and Property Tax for Loan Period",
    "Property Insurance per Month and PMI per Annum",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRecord {
    #[serde(rename = "Image Number")]
    pub image_number: String,
    #[serde(rename = "Serial Number")]
    pub serial_number: u64,
    #[serde(rename = "Username")]
    pub username: String,
    #[serde(rename = "Customer Reference Number")]
    pub customer_reference: String,
    #[serde(rename = "Customer Name")]
    pub customer_name: String,
    #[serde(rename = "City, State")]
    pub city_state: String,
    #[serde(rename = "Purchase Value and Down Payment")]
    pub purchase_value_and_down_payment: String,
    #[serde(rename = "Loan Period and Annual Interest")]
    pub loan_period_and_interest: String,
    #[serde(rename = "Guarantor Name")]
    pub guarantor_name: String,
    #[serde(rename = "Guarantor Reference Number")]
    pub guarantor_reference: String,
    #[serde(rename = "Loan Amount and Principal")]
    pub loan_amount_and_principal: String,
    #[serde(rename = "Total Interest for Loan Period and Property Tax for Loan Period")]
    pub interest_and_property_tax: String,
    #[serde(rename = "Property Insurance per Month and PMI per Annum")]
    pub insurance_and_pmi: String,
}

impl ExportRecord {
    pub fn new(app: &LoanApplication, serial_number: u64, result: &CalculationResult) -> Self {
        let d = &result.display;
        ExportRecord {
            image_number: app.image_number.trim().to_string(),
            serial_number,
            username: app.username.trim().to_string(),
            customer_reference: d.customer_reference.clone(),
            customer_name: d.customer_name.clone(),
            city_state: d.city_state.to_string(),
            purchase_value_and_down_payment: d.purchase_value_and_down_payment.clone(),
            loan_period_and_interest: d.loan_period_and_interest.clone(),
            guarantor_name: d.guarantor_name.clone(),
            guarantor_reference: d.guarantor_reference.clone(),
            loan_amount_and_principal: d.loan_amount_and_principal.clone(),
            interest_and_property_tax: d.interest_and_property_tax.clone(),
            insurance_and_pmi: d.insurance_and_pmi.clone(),
        }
    }

    /// Cells in header order.
    pub fn to_row(&self) -> [String; 13] {
        [
            self.image_number.clone(),
            self.serial_number.to_string(),
            self.username.clone(),
            self.customer_reference.clone(),
            self.customer_name.clone(),
            self.city_state.clone(),
            self.purchase_value_and_down_payment.clone(),
            self.loan_period_and_interest.clone(),
            self.guarantor_name.clone(),
            self.guarantor_reference.clone(),
            self.loan_amount_and_principal.clone(),
            self.interest_and_property_tax.clone(),
            self.insurance_and_pmi.clone(),
        ]
    }
}

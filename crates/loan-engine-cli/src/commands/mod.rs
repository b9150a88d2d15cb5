pub mod loan;
pub mod tools;

use clap::{Args, ValueEnum};
use loan_engine_core::pipeline::{ConfigPreset, PipelineConfig};

/// Named pipeline configuration, as accepted on the command line.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum PresetArg {
    /// Insurance and PMI on the loan amount
    #[default]
    LoanAmount,
    /// Insurance and PMI on the reduced purchase value
    PurchaseValue,
    /// Loan-amount basis without the total interest reduction
    NoInterestReduction,
}

impl From<PresetArg> for ConfigPreset {
    fn from(p: PresetArg) -> Self {
        match p {
            PresetArg::LoanAmount => ConfigPreset::LoanAmountBasis,
            PresetArg::PurchaseValue => ConfigPreset::PurchaseValueBasis,
            PresetArg::NoInterestReduction => ConfigPreset::WithoutInterestReduction,
        }
    }
}

/// Flags shared by every command that runs the pipeline.
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Pipeline configuration preset
    #[arg(long, value_enum, default_value_t = PresetArg::LoanAmount)]
    pub preset: PresetArg,

    /// Skip the total interest reduction step regardless of preset
    #[arg(long)]
    pub skip_total_interest_reduction: bool,
}

impl ConfigArgs {
    pub fn config(&self) -> PipelineConfig {
        let mut config = ConfigPreset::from(self.preset).config();
        if self.skip_total_interest_reduction {
            config.apply_total_interest_reduction = false;
        }
        config
    }
}

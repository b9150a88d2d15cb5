use clap::Args;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::info;

use loan_engine_core::export::ExportRecord;
use loan_engine_core::pipeline::{calculate_loan, LoanApplication, LoanCalculationPipeline};
use loan_engine_core::serial::{SerialRegistry, SerialSource};

use super::ConfigArgs;
use crate::input;

/// Arguments for a single loan calculation
#[derive(Args)]
pub struct CalculateArgs {
    /// Image identifier the record belongs to
    #[arg(long)]
    pub image_number: Option<String>,

    /// Operator entering the record
    #[arg(long)]
    pub username: Option<String>,

    #[arg(long)]
    pub customer_reference: Option<String>,

    #[arg(long)]
    pub customer_name: Option<String>,

    #[arg(long)]
    pub guarantor_name: Option<String>,

    #[arg(long)]
    pub guarantor_reference: Option<String>,

    /// "City, State" free text
    #[arg(long)]
    pub city_state: Option<String>,

    /// Spelled-out purchase value, e.g. "One Hundred Thousand dollars and Zero cents"
    #[arg(long)]
    pub purchase_value: Option<String>,

    /// Purchase value reduction %
    #[arg(long)]
    pub purchase_value_reduction: Option<String>,

    /// Down payment % (entered precision is echoed back)
    #[arg(long)]
    pub down_payment: Option<String>,

    /// Loan period in whole years
    #[arg(long)]
    pub loan_period: Option<String>,

    /// Annual interest rate %
    #[arg(long)]
    pub annual_interest: Option<String>,

    /// Monthly principal reduction %
    #[arg(long)]
    pub monthly_principal_reduction: Option<String>,

    /// Total interest reduction %
    #[arg(long)]
    pub total_interest_reduction: Option<String>,

    /// Assessment reduction rate %, or NA to skip property tax
    #[arg(long)]
    pub assessment_reduction: Option<String>,

    #[command(flatten)]
    pub config: ConfigArgs,

    /// Path to a JSON or YAML application file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

impl CalculateArgs {
    fn application(&self) -> LoanApplication {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        LoanApplication {
            image_number: text(&self.image_number),
            username: text(&self.username),
            customer_reference: text(&self.customer_reference),
            customer_name: text(&self.customer_name),
            guarantor_name: text(&self.guarantor_name),
            guarantor_reference: text(&self.guarantor_reference),
            city_state: text(&self.city_state),
            purchase_value_phrase: text(&self.purchase_value),
            purchase_value_reduction_percent: text(&self.purchase_value_reduction),
            down_payment_percent: text(&self.down_payment),
            loan_period_years: text(&self.loan_period),
            annual_interest_rate_percent: text(&self.annual_interest),
            monthly_principal_reduction_percent: text(&self.monthly_principal_reduction),
            total_interest_reduction_percent: text(&self.total_interest_reduction),
            assessment_reduction_rate_percent: self.assessment_reduction.clone(),
        }
    }
}

/// Arguments for batch export to CSV
#[derive(Args)]
pub struct ExportArgs {
    /// JSON or YAML file holding an array of applications
    #[arg(long)]
    pub input: Option<String>,

    /// Destination CSV file
    #[arg(long)]
    pub out: String,

    /// JSON or YAML map of image number to highest serial already issued
    #[arg(long)]
    pub seed: Option<String>,

    #[command(flatten)]
    pub config: ConfigArgs,
}

pub fn run_calculate(args: CalculateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let application: LoanApplication = match input::load(args.input.as_deref())? {
        Some(app) => app,
        None => {
            if args.purchase_value.is_none() {
                return Err("--purchase-value is required (or provide --input)".into());
            }
            args.application()
        }
    };

    let result = calculate_loan(&application, &args.config.config())?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_export(args: ExportArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let applications: Vec<LoanApplication> = input::load(args.input.as_deref())?
        .ok_or("--input <file> or stdin required for export")?;

    let serials = match args.seed.as_deref() {
        Some(path) => {
            let existing: HashMap<String, u64> = input::file::read_input(path)?;
            SerialRegistry::seeded(existing)
        }
        None => SerialRegistry::new(),
    };
    let pipeline = LoanCalculationPipeline::new(args.config.config());

    // Every record is calculated before the file is touched, so a failing
    // record leaves no output behind.
    let batch = build_batch(&pipeline, &serials, &applications)?;
    write_csv(Path::new(&args.out), &batch.records)?;
    info!(records = batch.records.len(), out = %args.out, "export written");

    Ok(json!({
        "result": {
            "records": batch.records.len(),
            "output": args.out,
        },
        "warnings": batch.warnings,
    }))
}

struct ExportBatch {
    records: Vec<ExportRecord>,
    warnings: Vec<String>,
}

fn build_batch(
    pipeline: &LoanCalculationPipeline,
    serials: &impl SerialSource,
    applications: &[LoanApplication],
) -> Result<ExportBatch, Box<dyn std::error::Error>> {
    let mut outputs = Vec::with_capacity(applications.len());
    for (index, app) in applications.iter().enumerate() {
        let output = pipeline
            .run(app)
            .map_err(|e| format!("record {} ({}): {}", index + 1, app.image_number, e))?;
        outputs.push(output);
    }

    // Serials are only drawn once the whole batch has succeeded.
    let mut records = Vec::with_capacity(outputs.len());
    let mut warnings = Vec::new();
    for (index, (app, output)) in applications.iter().zip(outputs).enumerate() {
        let serial = serials.next_serial(&app.image_number);
        records.push(ExportRecord::new(app, serial, &output.result));
        warnings.extend(
            output
                .warnings
                .into_iter()
                .map(|w| format!("record {}: {}", index + 1, w)),
        );
    }
    Ok(ExportBatch { records, warnings })
}

/// Write to a sibling temp file and rename it into place.
fn write_csv(out: &Path, records: &[ExportRecord]) -> Result<(), Box<dyn std::error::Error>> {
    let mut tmp = out.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let written = (|| -> Result<(), Box<dyn std::error::Error>> {
        let mut writer = csv::Writer::from_writer(File::create(&tmp)?);
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(())
    })();

    match written.and_then(|_| fs::rename(&tmp, out).map_err(Into::into)) {
        Ok(()) => Ok(()),
        Err(e) => {
            let _ = fs::remove_file(&tmp);
            Err(e)
        }
    }
}

use loan_engine_core::pipeline::{
    calculate_loan, AmountBasis, LoanApplication, LoanCalculationPipeline, PipelineConfig,
};
use loan_engine_core::LoanEngineError;
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use tracing_subscriber::fmt::format::FmtSpan;

// ===========================================================================
// Fixtures
// ===========================================================================

fn full_application() -> LoanApplication {
    // 423,500.50 purchase, 5% reduction, 15% down (LTV 85), 25 years
    LoanApplication {
        image_number: "IMG-2041".into(),
        username: "clerk".into(),
        customer_reference: "ref 77 a".into(),
        customer_name: "maria  lopez".into(),
        guarantor_name: "luis lopez".into(),
        guarantor_reference: "g 12".into(),
        city_state: " san antonio ,  tx ".into(),
        purchase_value_phrase:
            "Four Hundred Twenty Three Thousand Five Hundred dollars and Fifty cents".into(),
        purchase_value_reduction_percent: "5".into(),
        down_payment_percent: "15".into(),
        loan_period_years: "25".into(),
        annual_interest_rate_percent: "6.5".into(),
        monthly_principal_reduction_percent: "90".into(),
        total_interest_reduction_percent: "80".into(),
        assessment_reduction_rate_percent: Some("40".into()),
    }
}

fn simple_application() -> LoanApplication {
    LoanApplication {
        city_state: "new york, ny".into(),
        purchase_value_phrase: "One Hundred Thousand dollars and Zero cents".into(),
        purchase_value_reduction_percent: "0".into(),
        down_payment_percent: "20".into(),
        loan_period_years: "30".into(),
        annual_interest_rate_percent: "6".into(),
        monthly_principal_reduction_percent: "100".into(),
        total_interest_reduction_percent: "100".into(),
        ..LoanApplication::default()
    }
}

/// Route warnings from soft degradations to the test writer.
fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_span_events(FmtSpan::NONE)
        .with_test_writer()
        .finish();
    tracing::subscriber::set_default(subscriber)
}

// ===========================================================================
// Canonical (loan amount basis) pipeline
// ===========================================================================

#[test]
fn test_full_pipeline_amounts() {
    let out = calculate_loan(&full_application(), &PipelineConfig::loan_amount_basis()).unwrap();
    let r = &out.result;

    assert_eq!(r.original_amount, dec!(423500.50));
    assert_eq!(r.reduced_value, dec!(21175.02));
    assert_eq!(r.excel_purchase_value, dec!(402325.48));
    assert_eq!(r.down_payment_value, dec!(60348.82));
    assert_eq!(r.loan_amount, dec!(341976.66));
    assert_eq!(r.annual_principal, dec!(13679.06));
    assert_eq!(r.monthly_principal, dec!(1139.92));
    assert_eq!(r.final_principal, dec!(1025.92));
    assert_eq!(r.interest_per_annum, dec!(22228.48));
    assert_eq!(r.gross_total_interest, dec!(555712.00));
    assert_eq!(r.total_interest_for_period, dec!(444569.60));
    assert_eq!(r.loan_to_value, Some(dec!(85)));
    assert_eq!(r.property_insurance_rate, dec!(0.21));
    assert_eq!(r.property_insurance_per_month, dec!(59.84));
    assert_eq!(r.pmi_rate, Some(dec!(0.32)));
    assert_eq!(r.pmi_per_annum, Some(dec!(1094.32)));
    assert_eq!(r.reduced_assessment_value, Some(dec!(136790.66)));
    assert_eq!(r.property_tax_per_annum, Some(dec!(2735.81)));
    assert_eq!(r.property_tax_for_period, Some(dec!(68395.25)));
    assert!(out.warnings.is_empty(), "unexpected warnings: {:?}", out.warnings);
}

#[test]
fn test_full_pipeline_display_fields() {
    let out = calculate_loan(&full_application(), &PipelineConfig::default()).unwrap();
    let d = &out.result.display;

    assert_eq!(d.customer_name, "MARIA      LOPEZ");
    assert_eq!(d.customer_reference, "REF   77   A");
    assert_eq!(d.city_state.as_str(), "SAN ANTONIO , TX");
    assert_eq!(d.purchase_value_and_down_payment, "$  402  ,  325.48 AND 15 %");
    assert_eq!(d.loan_period_and_interest, "25 YEARS AND 6.5 %");
    assert_eq!(
        d.loan_amount_and_principal,
        "$  341  ,  976.66 AND $  1  ,  025.92"
    );
    assert_eq!(
        d.interest_and_property_tax,
        "$  444  ,  569.60 AND $  68  ,  395.25"
    );
    assert_eq!(d.insurance_and_pmi, "$  59.84 AND $  1  ,  094.32");
}

#[test]
fn test_comma_summary() {
    let out = calculate_loan(&full_application(), &PipelineConfig::default()).unwrap();
    let s = &out.result.summary;

    assert_eq!(s.original_amount, "423,500.50");
    assert_eq!(s.reduced_value, "21,175.02");
    assert_eq!(s.excel_purchase_value, "402,325.48");
    assert_eq!(s.down_payment_value, "60,348.82");
    assert_eq!(s.loan_amount, "341,976.66");
    assert_eq!(s.annual_principal, "13,679.06");
    assert_eq!(s.monthly_principal, "1,139.92");
    assert_eq!(s.final_principal, "1,025.92");
    assert_eq!(s.purchase_value_reduction_input, "5");
    assert_eq!(s.down_payment_input, "15");
}

#[test]
fn test_simple_loan_at_eighty_ltv() {
    let out = calculate_loan(&simple_application(), &PipelineConfig::default()).unwrap();
    let r = &out.result;
    assert_eq!(r.loan_amount, dec!(80000.00));
    assert_eq!(r.pmi_per_annum, None);
    assert_eq!(r.display.city_state.as_str(), "NEW YORK , NY");
    assert_eq!(r.display.property_tax, "NA");
}

// ===========================================================================
// Variants
// ===========================================================================

#[test]
fn test_purchase_value_basis_changes_only_insurance_and_pmi() {
    let app = full_application();
    let canonical = calculate_loan(&app, &PipelineConfig::loan_amount_basis()).unwrap().result;
    let pv = calculate_loan(&app, &PipelineConfig::purchase_value_basis()).unwrap().result;

    assert_eq!(pv.loan_amount, canonical.loan_amount);
    assert_eq!(pv.total_interest_for_period, canonical.total_interest_for_period);
    // 402325.48 * 0.21% = 844.88 → / 12 = 70.40
    assert_eq!(pv.property_insurance_per_month, dec!(70.40));
    // 402325.48 * 0.32% = 1287.44
    assert_eq!(pv.pmi_per_annum, Some(dec!(1287.44)));
}

#[test]
fn test_mixed_basis_config() {
    let config = PipelineConfig {
        pmi_basis: AmountBasis::PurchaseValue,
        ..PipelineConfig::loan_amount_basis()
    };
    let r = LoanCalculationPipeline::new(config)
        .run(&full_application())
        .unwrap()
        .result;
    assert_eq!(r.property_insurance_per_month, dec!(59.84));
    assert_eq!(r.pmi_per_annum, Some(dec!(1287.44)));
}

#[test]
fn test_without_interest_reduction() {
    let r = calculate_loan(&full_application(), &PipelineConfig::without_interest_reduction())
        .unwrap()
        .result;
    assert_eq!(r.total_interest_for_period, dec!(555712.00));
    assert_eq!(r.total_interest_for_period, r.gross_total_interest);
}

// ===========================================================================
// Failure policy
// ===========================================================================

#[test]
fn test_bad_phrase_aborts_before_anything_else() {
    let mut app = full_application();
    app.purchase_value_phrase = "four hundred thousand".into();
    app.down_payment_percent = String::new();
    let err = calculate_loan(&app, &PipelineConfig::default()).unwrap_err();
    assert!(matches!(err, LoanEngineError::InvalidPhraseFormat { .. }));
}

#[test]
fn test_missing_fields_reported_in_step_order() {
    let mut app = full_application();
    app.down_payment_percent = String::new();
    app.loan_period_years = String::new();
    let err = calculate_loan(&app, &PipelineConfig::default()).unwrap_err();
    assert_eq!(
        err,
        LoanEngineError::MissingRequiredInput {
            field: "down_payment_percent".into()
        }
    );
}

#[test]
fn test_non_numeric_percentage() {
    let mut app = full_application();
    app.monthly_principal_reduction_percent = "ninety".into();
    let err = calculate_loan(&app, &PipelineConfig::default()).unwrap_err();
    match err {
        LoanEngineError::InvalidNumericInput { field, value, .. } => {
            assert_eq!(field, "monthly_principal_reduction_percent");
            assert_eq!(value, "ninety");
        }
        other => panic!("expected InvalidNumericInput, got {other:?}"),
    }
}

#[test]
fn test_non_numeric_assessment_rate_is_an_error() {
    let mut app = full_application();
    app.assessment_reduction_rate_percent = Some("forty".into());
    assert!(matches!(
        calculate_loan(&app, &PipelineConfig::default()),
        Err(LoanEngineError::InvalidNumericInput { .. })
    ));
}

#[test]
fn test_zero_loan_period_rejected() {
    let mut app = full_application();
    app.loan_period_years = "0".into();
    assert!(matches!(
        calculate_loan(&app, &PipelineConfig::default()),
        Err(LoanEngineError::InvalidNumericInput { .. })
    ));
}

// ===========================================================================
// Soft degradations
// ===========================================================================

#[test]
fn test_location_without_comma_is_a_value_not_an_error() {
    let _guard = init_test_tracing();
    let mut app = simple_application();
    app.city_state = "springfield".into();
    let out = calculate_loan(&app, &PipelineConfig::default()).unwrap();
    assert!(!out.result.display.city_state.is_valid());
    assert_eq!(
        out.result.display.city_state.as_str(),
        "Invalid format: no comma found"
    );
    assert_eq!(out.warnings.len(), 1);
}

#[test]
fn test_cents_over_ninety_nine_warns() {
    let _guard = init_test_tracing();
    let mut app = simple_application();
    app.purchase_value_phrase = "One Hundred dollars and One Hundred Five cents".into();
    let out = calculate_loan(&app, &PipelineConfig::default()).unwrap();
    assert_eq!(out.result.original_amount, dec!(101.05));
    assert!(out.warnings.iter().any(|w| w.contains("105")));
}

#[test]
fn test_identical_inputs_give_identical_output() {
    let app = full_application();
    let a = serde_json::to_string(&calculate_loan(&app, &PipelineConfig::default()).unwrap())
        .unwrap();
    let b = serde_json::to_string(&calculate_loan(&app, &PipelineConfig::default()).unwrap())
        .unwrap();
    assert_eq!(a, b);
}

//! End-to-end generation and validation of the reference scenarios.

use chrono::NaiveDate;
use ct_core::tagging::tags;
use ct_core::{
    AdjustmentLine, CompanyIdentity, Document, FindingCode, GeneratorConfig, ProfitAndLoss,
    Reliefs, SectionKind, Sign, TaxAdjustments, TaxComputationInput, Taxonomy, ValidatorConfig,
    Validator, generate, generate_and_validate, render_ixbrl,
};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn company() -> CompanyIdentity {
    CompanyIdentity {
        name: "Acme Widgets Ltd".to_string(),
        registration_number: "01234567".to_string(),
        tax_reference: "1234567890".to_string(),
    }
}

fn scenario_a() -> TaxComputationInput {
    TaxComputationInput {
        company: company(),
        period_start: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
        period_end: NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
        profit_and_loss: ProfitAndLoss {
            turnover: dec!(332500),
            cost_of_sales: Some(dec!(165000)),
            gross_profit: Some(dec!(167500)),
            administrative_expenses: Some(dec!(85000)),
            distribution_costs: Some(dec!(25000)),
            operating_profit: Some(dec!(57500)),
            interest_receivable: Some(dec!(500)),
            interest_payable: Some(dec!(2000)),
            profit_before_tax: dec!(56000),
            ..ProfitAndLoss::default()
        },
        adjustments: TaxAdjustments {
            depreciation_add_back: Some(dec!(5000)),
            capital_allowances: Some(dec!(10640)),
            ..TaxAdjustments::default()
        },
        taxable_profit: dec!(50360),
        tax_rate: dec!(0.25),
        tax_due: dec!(12590),
        losses: None,
        reliefs: Reliefs::default(),
        dpl_tagged_in_accounts: false,
    }
}

fn scenario_b() -> TaxComputationInput {
    TaxComputationInput {
        company: company(),
        period_start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        period_end: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        profit_and_loss: ProfitAndLoss {
            turnover: dec!(48000),
            profit_before_tax: dec!(12000),
            ..ProfitAndLoss::default()
        },
        adjustments: TaxAdjustments::default(),
        taxable_profit: dec!(12000),
        tax_rate: dec!(0.19),
        tax_due: dec!(2280),
        losses: None,
        reliefs: Reliefs::default(),
        dpl_tagged_in_accounts: false,
    }
}

fn amount(
    document: &Document,
    tag: ct_core::TagName,
) -> Option<Decimal> {
    document.find_fact(tag).and_then(|f| f.signed_amount())
}

fn validate(
    document: &Document,
    input: &TaxComputationInput,
) -> ct_core::ValidationReport {
    let config = ValidatorConfig::default();
    let taxonomy = Taxonomy::default();
    Validator::new(&config, &taxonomy).validate(document, input)
}

// =============================================================================
// Scenario A: full detailed profit and loss with additions and deductions
// =============================================================================

#[test]
fn scenario_a_validates_cleanly() {
    let input = scenario_a();

    let (_, report) =
        generate_and_validate(&input, &GeneratorConfig::default(), &ValidatorConfig::default())
            .unwrap();

    assert_eq!(report.errors, vec![]);
    assert_eq!(report.warnings, vec![]);
}

#[test]
fn scenario_a_tags_reconciled_figures() {
    let document = generate(&scenario_a(), &GeneratorConfig::default()).unwrap();

    assert_eq!(amount(&document, tags::TURNOVER), Some(dec!(332500)));
    assert_eq!(amount(&document, tags::COST_OF_SALES), Some(dec!(-165000)));
    assert_eq!(amount(&document, tags::OPERATING_PROFIT), Some(dec!(57500)));
    assert_eq!(amount(&document, tags::PROFIT_BEFORE_TAX), Some(dec!(56000)));
    assert_eq!(amount(&document, tags::DEPRECIATION_ADD_BACK), Some(dec!(5000)));
    assert_eq!(amount(&document, tags::CAPITAL_ALLOWANCES), Some(dec!(-10640)));
    assert_eq!(amount(&document, tags::TAXABLE_PROFIT), Some(dec!(50360)));
    assert_eq!(amount(&document, tags::TAX_DUE), Some(dec!(12590)));
    assert_eq!(amount(&document, tags::TOTAL_TAX_PAYABLE), Some(dec!(12590)));
}

#[test]
fn scenario_a_contra_lines_are_stored_as_magnitudes() {
    let document = generate(&scenario_a(), &GeneratorConfig::default()).unwrap();
    let allowances = document.find_fact(tags::CAPITAL_ALLOWANCES).unwrap();

    assert_eq!(allowances.sign, Sign::Negative);
    assert_eq!(allowances.value.as_decimal(), Some(dec!(10640)));
}

#[test]
fn scenario_a_additions_precede_deductions() {
    let document = generate(&scenario_a(), &GeneratorConfig::default()).unwrap();
    let names: Vec<_> = document
        .section(SectionKind::TaxComputation)
        .unwrap()
        .facts
        .iter()
        .map(|f| f.name)
        .collect();

    assert_eq!(
        names,
        vec![
            tags::ACCOUNTING_PROFIT,
            tags::DEPRECIATION_ADD_BACK,
            tags::TOTAL_ADDITIONS,
            tags::CAPITAL_ALLOWANCES,
            tags::TOTAL_DEDUCTIONS,
            tags::TAXABLE_PROFIT,
            tags::TAX_RATE,
        ]
    );
}

#[test]
fn scenario_a_renders_every_fact() {
    let document = generate(&scenario_a(), &GeneratorConfig::default()).unwrap();
    let html = render_ixbrl(&document, &Taxonomy::default());

    let tagged = html.matches("<ix:nonFraction").count() + html.matches("<ix:nonNumeric").count();
    assert_eq!(tagged, document.fact_count());
    assert!(html.contains(r#"name="ct-comp:CapitalAllowances""#));
    assert!(html.contains(r#"sign="-">10,640</ix:nonFraction>"#));
    assert!(html.contains(r#"scale="-2" format="ixt:num-dot-decimal">25</ix:nonFraction>"#));
    assert_eq!(html.matches("<xbrli:context ").count(), document.contexts.len());
}

// =============================================================================
// Scenario B: minimal input
// =============================================================================

#[test]
fn scenario_b_minimal_input_validates() {
    let input = scenario_b();
    let document = generate(&input, &GeneratorConfig::default()).unwrap();

    let report = validate(&document, &input);

    assert!(report.is_submittable(), "{report}");
    assert!(report.warnings.is_empty());
}

#[test]
fn scenario_b_has_no_losses_section_but_both_contexts() {
    let document = generate(&scenario_b(), &GeneratorConfig::default()).unwrap();

    assert!(document.section(SectionKind::Losses).is_none());
    assert_eq!(document.contexts.len(), 2);
    assert_eq!(
        document.section(SectionKind::DetailedProfitAndLoss).unwrap().facts.len(),
        2
    );
}

// =============================================================================
// Scenario C: reliefs exceed tax due
// =============================================================================

#[test]
fn scenario_c_tax_payable_is_clamped_at_zero() {
    let mut input = scenario_b();
    input.profit_and_loss.profit_before_tax = dec!(4000);
    input.taxable_profit = dec!(4000);
    input.tax_rate = dec!(0.25);
    input.tax_due = dec!(1000);
    input.reliefs.rd_credits = Some(dec!(1500));

    let (document, report) =
        generate_and_validate(&input, &GeneratorConfig::default(), &ValidatorConfig::default())
            .unwrap();

    assert!(report.is_submittable(), "{report}");
    let payable = document.find_fact(tags::TOTAL_TAX_PAYABLE).unwrap();
    assert_eq!(payable.signed_amount(), Some(Decimal::ZERO));
    assert_eq!(payable.sign, Sign::Positive);
}

// =============================================================================
// Scenario D: taxable profit missing from the document
// =============================================================================

#[test]
fn scenario_d_missing_taxable_profit_is_the_only_error() {
    let input = scenario_a();
    let mut document = generate(&input, &GeneratorConfig::default()).unwrap();
    for section in &mut document.sections {
        section.facts.retain(|f| f.name != tags::TAXABLE_PROFIT);
    }

    let report = validate(&document, &input);

    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].code, FindingCode::TaxFactMissing);
    assert!(report.errors[0].message.contains("ProfitsChargeableToCorporationTax"));
    assert!(report.warnings.is_empty());
}

// =============================================================================
// List lines
// =============================================================================

#[test]
fn other_adjustment_lines_keep_caller_order() {
    let mut input = scenario_a();
    input.adjustments.other_additions = vec![
        AdjustmentLine::new("Fines and penalties", dec!(300)),
        AdjustmentLine::new("Political donations", dec!(200)),
    ];
    input.taxable_profit = dec!(50860);
    input.tax_due = dec!(12715);

    let (document, report) =
        generate_and_validate(&input, &GeneratorConfig::default(), &ValidatorConfig::default())
            .unwrap();

    assert!(report.is_submittable(), "{report}");
    let descriptions: Vec<_> = document
        .facts()
        .filter(|f| f.name == tags::OTHER_ADDITION_DESCRIPTION)
        .map(|f| f.value.to_string())
        .collect();
    assert_eq!(descriptions, vec!["Fines and penalties", "Political donations"]);
    assert_eq!(amount(&document, tags::TOTAL_ADDITIONS), Some(dec!(5500)));
}

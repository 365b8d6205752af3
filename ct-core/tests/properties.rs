//! Properties that hold for every valid input.

use chrono::NaiveDate;
use ct_core::calculations::TaxComputation;
use ct_core::tagging::tags;
use ct_core::{
    AdjustmentLine, CompanyIdentity, GenerationError, GeneratorConfig, InputError, LossFigures,
    ProfitAndLoss, Reliefs, SectionKind, TaxAdjustments, TaxComputationInput, Taxonomy, generate,
    render_ixbrl,
};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn base_input() -> TaxComputationInput {
    TaxComputationInput {
        company: CompanyIdentity {
            name: "Northwind Trading Ltd".to_string(),
            registration_number: "SC123456".to_string(),
            tax_reference: "9876543210".to_string(),
        },
        period_start: NaiveDate::from_ymd_opt(2023, 7, 1).unwrap(),
        period_end: NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
        profit_and_loss: ProfitAndLoss {
            turnover: dec!(250000),
            profit_before_tax: dec!(40000),
            ..ProfitAndLoss::default()
        },
        adjustments: TaxAdjustments::default(),
        taxable_profit: dec!(40000),
        tax_rate: dec!(0.25),
        tax_due: dec!(10000),
        losses: None,
        reliefs: Reliefs::default(),
        dpl_tagged_in_accounts: false,
    }
}

/// A spread of inputs touching every adjustment kind.
fn varied_inputs() -> Vec<TaxComputationInput> {
    let mut inputs = vec![base_input()];

    let mut with_adjustments = base_input();
    with_adjustments.adjustments = TaxAdjustments {
        depreciation_add_back: Some(dec!(1234.56)),
        disallowed_entertainment: Some(dec!(789.01)),
        other_additions: vec![AdjustmentLine::new("Fines", dec!(0.33))],
        capital_allowances: Some(dec!(15000)),
        losses_used: Some(dec!(2500.5)),
        other_deductions: vec![
            AdjustmentLine::new("Patent box", dec!(100.10)),
            AdjustmentLine::new("Grant income", dec!(99.99)),
        ],
    };
    inputs.push(with_adjustments);

    let mut loss_making = base_input();
    loss_making.profit_and_loss.profit_before_tax = dec!(-12000);
    loss_making.adjustments.capital_allowances = Some(dec!(3000));
    loss_making.losses = Some(LossFigures {
        brought_forward: Some(dec!(5000)),
        carried_forward: Some(dec!(20000)),
        carried_back: None,
    });
    inputs.push(loss_making);

    inputs
}

// =============================================================================
// Idempotence
// =============================================================================

#[test]
fn generating_twice_yields_identical_documents() {
    let config = GeneratorConfig::default();
    let taxonomy = Taxonomy::default();

    for input in varied_inputs() {
        let first = generate(&input, &config).unwrap();
        let second = generate(&input, &config).unwrap();

        assert_eq!(first.fact_list(), second.fact_list());
        assert_eq!(first, second);
        assert_eq!(render_ixbrl(&first, &taxonomy), render_ixbrl(&second, &taxonomy));
    }
}

// =============================================================================
// Reconciliation
// =============================================================================

#[test]
fn taxable_profit_reconciles_without_drift() {
    for input in varied_inputs() {
        let result = TaxComputation::new(&input).calculate();

        assert_eq!(
            result.taxable_profit,
            input.profit_and_loss.profit_before_tax + result.total_additions
                - result.total_deductions
        );
    }
}

#[test]
fn tagged_totals_match_recomputed_totals() {
    let config = GeneratorConfig::default();

    for input in varied_inputs().into_iter().skip(1) {
        let result = TaxComputation::new(&input).calculate();
        let document = generate(&input, &config).unwrap();

        let additions = document
            .find_fact(tags::TOTAL_ADDITIONS)
            .and_then(|f| f.signed_amount());
        let deductions = document
            .find_fact(tags::TOTAL_DEDUCTIONS)
            .and_then(|f| f.signed_amount());

        if !result.additions.is_empty() {
            assert_eq!(additions, Some(result.total_additions));
        }
        assert_eq!(deductions, Some(-result.total_deductions));
    }
}

// =============================================================================
// Precision
// =============================================================================

#[test]
fn numeric_facts_never_understate_their_precision() {
    let config = GeneratorConfig::default();

    for input in varied_inputs() {
        let document = generate(&input, &config).unwrap();

        for fact in document.facts().filter(|f| f.is_numeric()) {
            let amount = fact.value.as_decimal().unwrap();
            let decimals = fact.decimals.unwrap();
            assert!(
                i64::from(decimals) >= i64::from(amount.normalize().scale()),
                "{} = {amount} declared decimals={decimals}",
                fact.name
            );
        }
    }
}

#[test]
fn rendered_tax_due_in_pence_declares_pence_precision() {
    let mut input = base_input();
    input.profit_and_loss.profit_before_tax = dec!(1234.57);
    input.taxable_profit = dec!(1234.57);
    input.tax_rate = dec!(0.19);
    input.tax_due = dec!(234.57);

    let document = generate(&input, &GeneratorConfig::default()).unwrap();
    let html = render_ixbrl(&document, &Taxonomy::default());

    let tax_due = format!(
        r#"<ix:nonFraction name="{}" contextRef="c1" unitRef="GBP" decimals="2" scale="0" format="ixt:num-dot-decimal">234.57</ix:nonFraction>"#,
        tags::TAX_DUE
    );
    assert!(html.contains(&tax_due), "{html}");
}

// =============================================================================
// Tax payable
// =============================================================================

#[test]
fn tax_payable_is_never_negative() {
    for (due, credits, others) in [
        (dec!(1000), dec!(1500), vec![]),
        (dec!(1000), dec!(999.99), vec![dec!(0.02)]),
        (dec!(0), dec!(0), vec![dec!(10)]),
    ] {
        let mut input = base_input();
        input.tax_due = due;
        input.reliefs = Reliefs {
            rd_credits: Some(credits),
            other_reliefs: others
                .into_iter()
                .map(|amount| AdjustmentLine::new("Relief", amount))
                .collect(),
        };

        let result = TaxComputation::new(&input).calculate();

        assert_eq!(result.total_tax_payable, Decimal::ZERO);
    }
}

// =============================================================================
// Absence vs zero
// =============================================================================

#[test]
fn unset_optional_field_emits_no_fact() {
    let document = generate(&base_input(), &GeneratorConfig::default()).unwrap();

    assert!(document.find_fact(tags::COST_OF_SALES).is_none());
    assert!(document.find_fact(tags::CAPITAL_ALLOWANCES).is_none());
    assert!(document.find_fact(tags::RD_CREDITS).is_none());
}

#[test]
fn zero_optional_field_emits_one_zero_fact() {
    let mut input = base_input();
    input.profit_and_loss.cost_of_sales = Some(Decimal::ZERO);
    input.adjustments.capital_allowances = Some(Decimal::ZERO);
    input.reliefs.rd_credits = Some(Decimal::ZERO);

    let document = generate(&input, &GeneratorConfig::default()).unwrap();

    for tag in [tags::COST_OF_SALES, tags::CAPITAL_ALLOWANCES, tags::RD_CREDITS] {
        let matching: Vec<_> = document.facts().filter(|f| f.name == tag).collect();
        assert_eq!(matching.len(), 1, "{tag}");
        assert_eq!(matching[0].value.as_decimal(), Some(Decimal::ZERO));
    }
}

#[test]
fn loss_balances_use_period_end_instant() {
    let input = varied_inputs().remove(2);
    let document = generate(&input, &GeneratorConfig::default()).unwrap();

    let losses = document.section(SectionKind::Losses).unwrap();
    let carried = losses
        .facts
        .iter()
        .find(|f| f.name == tags::LOSSES_CARRIED_FORWARD)
        .unwrap();
    let context = document.context(&carried.context_ref).unwrap();

    assert_eq!(
        context.period,
        ct_core::Period::Instant {
            date: input.period_end
        }
    );
}

// =============================================================================
// Input errors abort generation
// =============================================================================

#[test]
fn negative_turnover_is_rejected_before_binding() {
    let mut input = base_input();
    input.profit_and_loss.turnover = dec!(-1);

    let err = generate(&input, &GeneratorConfig::default()).unwrap_err();

    assert_eq!(
        err,
        GenerationError::Input(InputError::NegativeAmount { field: "turnover" })
    );
}

#[test]
fn inverted_period_is_rejected() {
    let mut input = base_input();
    input.period_end = NaiveDate::from_ymd_opt(2023, 6, 30).unwrap();

    let err = generate(&input, &GeneratorConfig::default()).unwrap_err();

    assert!(matches!(
        err,
        GenerationError::Input(InputError::PeriodEndsBeforeStart { .. })
    ));
}

#[test]
fn amounts_beyond_range_are_rejected_before_computing() {
    let mut input = base_input();
    input.profit_and_loss.profit_before_tax = Decimal::MAX;
    input.adjustments.depreciation_add_back = Some(dec!(1));

    let err = generate(&input, &GeneratorConfig::default()).unwrap_err();

    assert_eq!(
        err,
        GenerationError::Input(InputError::AmountOutOfRange {
            field: "profit_before_tax"
        })
    );
}

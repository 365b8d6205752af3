//! Individual validation rules.
//!
//! Each rule is an independent observation over the same [`Inspection`]; a
//! rule never depends on another rule having passed and never touches the
//! document.

use std::collections::HashSet;

use rust_decimal::Decimal;

use crate::calculations::ComputationResult;
use crate::config::ValidatorConfig;
use crate::models::{
    Document, FindingCode, Period, Severity, TagName, TaxComputationInput, ValidationReport,
};
use crate::tagging::tags;

/// Everything a rule may look at.
pub(crate) struct Inspection<'a> {
    pub document: &'a Document,
    pub input: &'a TaxComputationInput,
    pub computation: &'a ComputationResult,
    pub config: &'a ValidatorConfig,
    pub rendered_bytes: usize,
}

impl Inspection<'_> {
    fn amount(
        &self,
        tag: TagName,
    ) -> Option<Decimal> {
        self.document.find_fact(tag).and_then(|f| f.signed_amount())
    }
}

pub(crate) type Rule = fn(&Inspection<'_>, &mut ValidationReport);

/// Every rule, in reporting order.
pub(crate) static RULES: &[Rule] = &[
    turnover_present,
    tax_facts_present,
    contexts_complete,
    taxable_profit_reconciles,
    tax_due_reconciles,
    size_within_ceiling,
    dpl_not_duplicated,
    contexts_resolve,
    units_resolve,
    facts_unique,
    dpl_arithmetic,
];

fn turnover_present(
    inspection: &Inspection<'_>,
    report: &mut ValidationReport,
) {
    if inspection.document.find_fact(tags::TURNOVER).is_none() {
        report.push(
            Severity::Error,
            FindingCode::DplTurnoverMissing,
            format!("detailed profit and loss has no {} fact", tags::TURNOVER),
        );
    }
}

fn tax_facts_present(
    inspection: &Inspection<'_>,
    report: &mut ValidationReport,
) {
    for tag in [tags::TAXABLE_PROFIT, tags::TAX_DUE] {
        if inspection.document.find_fact(tag).is_none() {
            report.push(
                Severity::Error,
                FindingCode::TaxFactMissing,
                format!("required fact {tag} is missing"),
            );
        }
    }
}

fn contexts_complete(
    inspection: &Inspection<'_>,
    report: &mut ValidationReport,
) {
    let contexts = &inspection.document.contexts;
    let plain = || contexts.iter().filter(|c| c.segment.is_none());
    let has_duration = plain().any(|c| matches!(c.period, Period::Duration { .. }));
    let has_instant = plain().any(|c| matches!(c.period, Period::Instant { .. }));

    if contexts.len() < 2 || !has_duration || !has_instant {
        report.push(
            Severity::Error,
            FindingCode::ContextsIncomplete,
            format!(
                "document needs a period context and an instant context, found {} context(s)",
                contexts.len()
            ),
        );
    }
}

fn taxable_profit_reconciles(
    inspection: &Inspection<'_>,
    report: &mut ValidationReport,
) {
    let Some(tagged) = inspection.amount(tags::TAXABLE_PROFIT) else {
        return;
    };
    let recomputed = inspection.computation.taxable_profit;
    if tagged != recomputed {
        report.push(
            Severity::Error,
            FindingCode::TaxableProfitMismatch,
            format!(
                "tagged taxable profit {tagged} does not match {recomputed} recomputed from profit before tax and adjustments"
            ),
        );
    }
}

fn tax_due_reconciles(
    inspection: &Inspection<'_>,
    report: &mut ValidationReport,
) {
    let Some(tagged) = inspection.amount(tags::TAX_DUE) else {
        return;
    };
    let expected = inspection.computation.tax_on_profit;
    if tagged != expected {
        report.push(
            Severity::Error,
            FindingCode::TaxDueMismatch,
            format!(
                "tagged tax due {tagged} does not match {expected} ({} at rate {})",
                inspection.computation.taxable_profit, inspection.input.tax_rate
            ),
        );
    }
}

fn size_within_ceiling(
    inspection: &Inspection<'_>,
    report: &mut ValidationReport,
) {
    let limit = inspection.config.max_document_bytes;
    if inspection.rendered_bytes > limit {
        report.push(
            Severity::Warning,
            FindingCode::DocumentTooLarge,
            format!(
                "rendered document is {} bytes, above the {limit} byte ceiling",
                inspection.rendered_bytes
            ),
        );
    }
}

fn dpl_not_duplicated(
    inspection: &Inspection<'_>,
    report: &mut ValidationReport,
) {
    if inspection.input.dpl_tagged_in_accounts {
        report.push(
            Severity::Warning,
            FindingCode::DplDuplicated,
            "detailed profit and loss is also tagged in the accounts; it must appear in only one document",
        );
    }
}

fn contexts_resolve(
    inspection: &Inspection<'_>,
    report: &mut ValidationReport,
) {
    let document = inspection.document;
    for fact in document.facts() {
        if document.context(&fact.context_ref).is_none() {
            report.push(
                Severity::Error,
                FindingCode::DanglingContext,
                format!("{} references unknown context {}", fact.name, fact.context_ref),
            );
        }
    }
}

fn units_resolve(
    inspection: &Inspection<'_>,
    report: &mut ValidationReport,
) {
    let document = inspection.document;
    for fact in document.facts().filter(|f| f.is_numeric()) {
        match &fact.unit_ref {
            None => report.push(
                Severity::Error,
                FindingCode::DanglingUnit,
                format!("numeric fact {} has no unit", fact.name),
            ),
            Some(unit) if document.unit(unit).is_none() => report.push(
                Severity::Error,
                FindingCode::DanglingUnit,
                format!("{} references unknown unit {unit}", fact.name),
            ),
            Some(_) => {}
        }
    }
}

fn facts_unique(
    inspection: &Inspection<'_>,
    report: &mut ValidationReport,
) {
    let mut seen = HashSet::new();
    for fact in inspection.document.facts() {
        if !seen.insert((fact.name, &fact.context_ref)) {
            report.push(
                Severity::Error,
                FindingCode::DuplicateFact,
                format!("{} appears more than once in context {}", fact.name, fact.context_ref),
            );
        }
    }
}

/// Subtotals supplied in the detailed profit and loss must agree with their
/// components. Contra lines already carry a negative sign, so each subtotal
/// is a plain sum of signed amounts.
fn dpl_arithmetic(
    inspection: &Inspection<'_>,
    report: &mut ValidationReport,
) {
    let amount = |tag| inspection.amount(tag);
    let sum = |components: &[TagName]| -> Decimal {
        components.iter().filter_map(|t| amount(*t)).sum()
    };

    let mut check = |subtotal: TagName, components: &[TagName]| {
        let Some(stated) = amount(subtotal) else {
            return;
        };
        let derived = sum(components);
        if stated != derived {
            report.push(
                Severity::Warning,
                FindingCode::DplArithmetic,
                format!("{subtotal} is {stated} but its components sum to {derived}"),
            );
        }
    };

    if amount(tags::COST_OF_SALES).is_some() {
        check(tags::GROSS_PROFIT, &[tags::TURNOVER, tags::COST_OF_SALES]);
    }
    check(
        tags::OPERATING_PROFIT,
        &[
            tags::TURNOVER,
            tags::COST_OF_SALES,
            tags::OTHER_OPERATING_INCOME,
            tags::ADMINISTRATIVE_EXPENSES,
            tags::DISTRIBUTION_COSTS,
        ],
    );
    if amount(tags::OPERATING_PROFIT).is_some() {
        check(
            tags::PROFIT_BEFORE_TAX,
            &[tags::OPERATING_PROFIT, tags::INTEREST_RECEIVABLE, tags::INTEREST_PAYABLE],
        );
    }
}

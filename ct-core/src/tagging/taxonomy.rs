//! Binding policy: which source field becomes which tagged fact.
//!
//! The table below is the single source of truth for tag names, section
//! placement, period shape, sign convention and presence. The binder walks
//! it in order, so the table order is also the fact order of the document.

use crate::models::{PeriodKind, SectionKind, TagName};

/// Every input or computed figure that can become a fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceField {
    CompanyName,
    RegistrationNumber,
    TaxReference,
    PeriodStart,
    PeriodEnd,

    Turnover,
    CostOfSales,
    GrossProfit,
    OtherOperatingIncome,
    AdministrativeExpenses,
    DistributionCosts,
    OperatingProfit,
    InterestReceivable,
    InterestPayable,
    ProfitBeforeTax,

    AccountingProfit,
    DepreciationAddBack,
    DisallowedEntertainment,
    OtherAddition,
    TotalAdditions,
    CapitalAllowances,
    OtherDeduction,
    TotalDeductions,
    TaxableProfit,
    TaxRate,

    TaxDue,
    RdCredits,
    OtherRelief,
    TotalTaxPayable,

    LossesBroughtForward,
    LossesUsed,
    LossesCarriedBack,
    LossesCarriedForward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Monetary,
    Ratio,
    Text,
    Date,
}

/// How the sign marker is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignRule {
    /// Negative only when the value itself is negative.
    Natural,
    /// Always negative: costs, deductions, reliefs.
    Contra,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// Always produces exactly one fact.
    Required,
    /// One fact when the source is set, none otherwise.
    Optional,
    /// One fact per caller-ordered line, each in its own segment context.
    PerLine {
        dimension: &'static str,
        description: TagName,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindingRule {
    pub field: SourceField,
    pub tag: TagName,
    pub section: SectionKind,
    pub period: PeriodKind,
    pub value: ValueKind,
    pub sign: SignRule,
    pub cardinality: Cardinality,
}

/// Element names referenced outside the table.
pub mod tags {
    use crate::models::TagName;

    pub const COMPANY_NAME: TagName = TagName::new("ct-comp", "CompanyName");
    pub const REGISTRATION_NUMBER: TagName = TagName::new("bus", "UKCompaniesHouseRegisteredNumber");
    pub const TAX_REFERENCE: TagName = TagName::new("ct-comp", "TaxReference");
    pub const PERIOD_START: TagName = TagName::new("ct-comp", "StartOfPeriodCoveredByReturn");
    pub const PERIOD_END: TagName = TagName::new("ct-comp", "EndOfPeriodCoveredByReturn");

    pub const TURNOVER: TagName = TagName::new("dpl", "TurnoverRevenue");
    pub const COST_OF_SALES: TagName = TagName::new("dpl", "CostSales");
    pub const GROSS_PROFIT: TagName = TagName::new("dpl", "GrossProfitLoss");
    pub const OTHER_OPERATING_INCOME: TagName = TagName::new("dpl", "OtherOperatingIncome");
    pub const ADMINISTRATIVE_EXPENSES: TagName = TagName::new("dpl", "AdministrativeExpenses");
    pub const DISTRIBUTION_COSTS: TagName = TagName::new("dpl", "DistributionCosts");
    pub const OPERATING_PROFIT: TagName = TagName::new("dpl", "OperatingProfitLoss");
    pub const INTEREST_RECEIVABLE: TagName = TagName::new("dpl", "InterestReceivableSimilarIncome");
    pub const INTEREST_PAYABLE: TagName = TagName::new("dpl", "InterestPayableSimilarCharges");
    pub const PROFIT_BEFORE_TAX: TagName =
        TagName::new("dpl", "ProfitLossOnOrdinaryActivitiesBeforeTax");

    pub const ACCOUNTING_PROFIT: TagName = TagName::new("ct-comp", "ProfitLossPerAccounts");
    pub const DEPRECIATION_ADD_BACK: TagName =
        TagName::new("ct-comp", "DepreciationAndAmortisationAddedBack");
    pub const DISALLOWED_ENTERTAINMENT: TagName = TagName::new("ct-comp", "DisallowableEntertaining");
    pub const OTHER_ADDITION: TagName = TagName::new("ct-comp", "OtherAdditionsToProfit");
    pub const OTHER_ADDITION_DESCRIPTION: TagName =
        TagName::new("ct-comp", "DescriptionOfOtherAddition");
    pub const TOTAL_ADDITIONS: TagName = TagName::new("ct-comp", "TotalAdditionsToProfit");
    pub const CAPITAL_ALLOWANCES: TagName = TagName::new("ct-comp", "CapitalAllowances");
    pub const OTHER_DEDUCTION: TagName = TagName::new("ct-comp", "OtherDeductionsFromProfit");
    pub const OTHER_DEDUCTION_DESCRIPTION: TagName =
        TagName::new("ct-comp", "DescriptionOfOtherDeduction");
    pub const TOTAL_DEDUCTIONS: TagName = TagName::new("ct-comp", "TotalDeductionsFromProfit");
    pub const TAXABLE_PROFIT: TagName = TagName::new("ct-comp", "ProfitsChargeableToCorporationTax");
    pub const TAX_RATE: TagName = TagName::new("ct-comp", "CorporationTaxRate");

    pub const TAX_DUE: TagName = TagName::new("ct-comp", "CorporationTaxChargeable");
    pub const RD_CREDITS: TagName = TagName::new("ct-comp", "RAndDExpenditureCredits");
    pub const OTHER_RELIEF: TagName = TagName::new("ct-comp", "OtherReliefsAndCredits");
    pub const OTHER_RELIEF_DESCRIPTION: TagName = TagName::new("ct-comp", "DescriptionOfOtherRelief");
    pub const TOTAL_TAX_PAYABLE: TagName = TagName::new("ct-comp", "TaxPayable");

    pub const LOSSES_BROUGHT_FORWARD: TagName = TagName::new("ct-comp", "TradingLossesBroughtForward");
    pub const LOSSES_USED: TagName = TagName::new("ct-comp", "TradingLossesUsedInPeriod");
    pub const LOSSES_CARRIED_BACK: TagName = TagName::new("ct-comp", "TradingLossesCarriedBack");
    pub const LOSSES_CARRIED_FORWARD: TagName = TagName::new("ct-comp", "TradingLossesCarriedForward");
}

const fn rule(
    field: SourceField,
    tag: TagName,
    section: SectionKind,
    period: PeriodKind,
    value: ValueKind,
    sign: SignRule,
    cardinality: Cardinality,
) -> BindingRule {
    BindingRule {
        field,
        tag,
        section,
        period,
        value,
        sign,
        cardinality,
    }
}

use Cardinality::{Optional, Required};
use PeriodKind::{Duration, Instant};
use SectionKind::*;
use SignRule::{Contra, Natural};
use SourceField as F;
use ValueKind::{Date, Monetary, Ratio, Text};

/// The binding policy, in document order.
#[rustfmt::skip]
pub static BINDING_RULES: &[BindingRule] = &[
    rule(F::CompanyName,             tags::COMPANY_NAME,             CompanyInformation,    Duration, Text,     Natural, Required),
    rule(F::RegistrationNumber,      tags::REGISTRATION_NUMBER,      CompanyInformation,    Duration, Text,     Natural, Required),
    rule(F::TaxReference,            tags::TAX_REFERENCE,            CompanyInformation,    Duration, Text,     Natural, Required),
    rule(F::PeriodStart,             tags::PERIOD_START,             CompanyInformation,    Duration, Date,     Natural, Required),
    rule(F::PeriodEnd,               tags::PERIOD_END,               CompanyInformation,    Duration, Date,     Natural, Required),

    rule(F::Turnover,                tags::TURNOVER,                 DetailedProfitAndLoss, Duration, Monetary, Natural, Required),
    rule(F::CostOfSales,             tags::COST_OF_SALES,            DetailedProfitAndLoss, Duration, Monetary, Contra,  Optional),
    rule(F::GrossProfit,             tags::GROSS_PROFIT,             DetailedProfitAndLoss, Duration, Monetary, Natural, Optional),
    rule(F::OtherOperatingIncome,    tags::OTHER_OPERATING_INCOME,   DetailedProfitAndLoss, Duration, Monetary, Natural, Optional),
    rule(F::AdministrativeExpenses,  tags::ADMINISTRATIVE_EXPENSES,  DetailedProfitAndLoss, Duration, Monetary, Contra,  Optional),
    rule(F::DistributionCosts,       tags::DISTRIBUTION_COSTS,       DetailedProfitAndLoss, Duration, Monetary, Contra,  Optional),
    rule(F::OperatingProfit,         tags::OPERATING_PROFIT,         DetailedProfitAndLoss, Duration, Monetary, Natural, Optional),
    rule(F::InterestReceivable,      tags::INTEREST_RECEIVABLE,      DetailedProfitAndLoss, Duration, Monetary, Natural, Optional),
    rule(F::InterestPayable,         tags::INTEREST_PAYABLE,         DetailedProfitAndLoss, Duration, Monetary, Contra,  Optional),
    rule(F::ProfitBeforeTax,         tags::PROFIT_BEFORE_TAX,        DetailedProfitAndLoss, Duration, Monetary, Natural, Required),

    rule(F::AccountingProfit,        tags::ACCOUNTING_PROFIT,        TaxComputation,        Duration, Monetary, Natural, Required),
    rule(F::DepreciationAddBack,     tags::DEPRECIATION_ADD_BACK,    TaxComputation,        Duration, Monetary, Natural, Optional),
    rule(F::DisallowedEntertainment, tags::DISALLOWED_ENTERTAINMENT, TaxComputation,        Duration, Monetary, Natural, Optional),
    rule(F::OtherAddition,           tags::OTHER_ADDITION,           TaxComputation,        Duration, Monetary, Natural,
        Cardinality::PerLine { dimension: "ct-comp:OtherAdditionsLineDimension", description: tags::OTHER_ADDITION_DESCRIPTION }),
    rule(F::TotalAdditions,          tags::TOTAL_ADDITIONS,          TaxComputation,        Duration, Monetary, Natural, Optional),
    rule(F::CapitalAllowances,       tags::CAPITAL_ALLOWANCES,       TaxComputation,        Duration, Monetary, Contra,  Optional),
    rule(F::OtherDeduction,          tags::OTHER_DEDUCTION,          TaxComputation,        Duration, Monetary, Contra,
        Cardinality::PerLine { dimension: "ct-comp:OtherDeductionsLineDimension", description: tags::OTHER_DEDUCTION_DESCRIPTION }),
    rule(F::TotalDeductions,         tags::TOTAL_DEDUCTIONS,         TaxComputation,        Duration, Monetary, Contra,  Optional),
    rule(F::TaxableProfit,           tags::TAXABLE_PROFIT,           TaxComputation,        Duration, Monetary, Natural, Required),
    rule(F::TaxRate,                 tags::TAX_RATE,                 TaxComputation,        Duration, Ratio,    Natural, Required),

    rule(F::TaxDue,                  tags::TAX_DUE,                  TaxLiability,          Duration, Monetary, Natural, Required),
    rule(F::RdCredits,               tags::RD_CREDITS,               TaxLiability,          Duration, Monetary, Contra,  Optional),
    rule(F::OtherRelief,             tags::OTHER_RELIEF,             TaxLiability,          Duration, Monetary, Contra,
        Cardinality::PerLine { dimension: "ct-comp:OtherReliefsLineDimension", description: tags::OTHER_RELIEF_DESCRIPTION }),
    rule(F::TotalTaxPayable,         tags::TOTAL_TAX_PAYABLE,        TaxLiability,          Duration, Monetary, Natural, Required),

    rule(F::LossesBroughtForward,    tags::LOSSES_BROUGHT_FORWARD,   Losses,                Instant,  Monetary, Natural, Optional),
    rule(F::LossesUsed,              tags::LOSSES_USED,              Losses,                Duration, Monetary, Contra,  Optional),
    rule(F::LossesCarriedBack,       tags::LOSSES_CARRIED_BACK,      Losses,                Duration, Monetary, Natural, Optional),
    rule(F::LossesCarriedForward,    tags::LOSSES_CARRIED_FORWARD,   Losses,                Instant,  Monetary, Natural, Optional),
];

/// Namespace bindings for every prefix used by [`BINDING_RULES`] and the
/// rendered document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Taxonomy {
    namespaces: Vec<(&'static str, &'static str)>,
}

impl Taxonomy {
    pub fn namespaces(&self) -> &[(&'static str, &'static str)] {
        &self.namespaces
    }

    pub fn namespace(
        &self,
        prefix: &str,
    ) -> Option<&'static str> {
        self.namespaces
            .iter()
            .find(|(p, _)| *p == prefix)
            .map(|(_, uri)| *uri)
    }

    pub fn rules(&self) -> &'static [BindingRule] {
        BINDING_RULES
    }

    pub fn rule_for(
        &self,
        field: SourceField,
    ) -> Option<&'static BindingRule> {
        BINDING_RULES.iter().find(|r| r.field == field)
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self {
            namespaces: vec![
                ("ct-comp", "http://www.hmrc.gov.uk/schemas/ct/comp/2023-01-01"),
                ("dpl", "http://www.hmrc.gov.uk/schemas/ct/dpl/2023-01-01"),
                ("bus", "http://xbrl.frc.org.uk/cd/2023-01-01/business"),
                ("xbrli", "http://www.xbrl.org/2003/instance"),
                ("xbrldi", "http://xbrl.org/2006/xbrldi"),
                ("iso4217", "http://www.xbrl.org/2003/iso4217"),
                ("ix", "http://www.xbrl.org/2013/inlineXBRL"),
                ("ixt", "http://www.xbrl.org/inlineXBRL/transformation/2020-02-12"),
                ("link", "http://www.xbrl.org/2003/linkbase"),
                ("xlink", "http://www.w3.org/1999/xlink"),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn every_source_field_has_exactly_one_rule() {
        let fields: HashSet<_> = BINDING_RULES.iter().map(|r| r.field).collect();

        assert_eq!(fields.len(), BINDING_RULES.len());
        assert_eq!(fields.len(), 33);
    }

    #[test]
    fn tags_are_unique() {
        let tags: HashSet<_> = BINDING_RULES.iter().map(|r| r.tag).collect();

        assert_eq!(tags.len(), BINDING_RULES.len());
    }

    #[test]
    fn rules_are_grouped_in_section_order() {
        let sections: Vec<_> = BINDING_RULES.iter().map(|r| r.section).collect();
        let mut sorted = sections.clone();
        sorted.sort();

        assert_eq!(sections, sorted);
    }

    #[test]
    fn balance_losses_use_instant_and_flows_use_duration() {
        let taxonomy = Taxonomy::default();

        for field in [SourceField::LossesBroughtForward, SourceField::LossesCarriedForward] {
            assert_eq!(taxonomy.rule_for(field).unwrap().period, PeriodKind::Instant);
        }
        for field in [SourceField::LossesUsed, SourceField::TaxableProfit, SourceField::TaxDue] {
            assert_eq!(taxonomy.rule_for(field).unwrap().period, PeriodKind::Duration);
        }
    }

    #[test]
    fn tax_rate_is_the_only_ratio() {
        let ratios: Vec<_> = BINDING_RULES
            .iter()
            .filter(|r| r.value == ValueKind::Ratio)
            .map(|r| r.field)
            .collect();

        assert_eq!(ratios, vec![SourceField::TaxRate]);
    }

    #[test]
    fn every_prefix_has_a_namespace() {
        let taxonomy = Taxonomy::default();

        for rule in BINDING_RULES {
            assert!(
                taxonomy.namespace(rule.tag.prefix).is_some(),
                "no namespace for {}",
                rule.tag
            );
        }
    }
}

use rust_decimal::Decimal;
use tracing::trace;

use super::registry::ContextRegistry;
use super::taxonomy::{BindingRule, Cardinality, SignRule, SourceField, Taxonomy, ValueKind};
use crate::calculations::ComputationResult;
use crate::config::GeneratorConfig;
use crate::error::BindingError;
use crate::models::{
    AdjustmentLine, ContextRef, Fact, FactValue, Measure, PeriodKind, SectionKind, Sign, TagName,
    TaxComputationInput, UnitRef,
};

/// Unit, sign and precision metadata attached to a fact at bind time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindOptions {
    pub unit: Option<UnitRef>,
    pub sign: Sign,
    pub decimals: Option<i32>,
    pub scale: i32,
}

impl BindOptions {
    /// Options for a non-numeric fact.
    pub fn non_numeric() -> Self {
        Self::default()
    }

    pub fn numeric(
        unit: UnitRef,
        decimals: i32,
    ) -> Self {
        Self {
            unit: Some(unit),
            decimals: Some(decimals),
            ..Self::default()
        }
    }

    pub fn with_sign(
        mut self,
        sign: Sign,
    ) -> Self {
        self.sign = sign;
        self
    }

    pub fn with_scale(
        mut self,
        scale: i32,
    ) -> Self {
        self.scale = scale;
        self
    }
}

/// A bound fact and the section it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundFact {
    pub section: SectionKind,
    pub fact: Fact,
}

/// What a source field holds for a particular input.
enum SourceValue<'i> {
    Absent,
    Single(FactValue),
    Lines(&'i [AdjustmentLine]),
}

/// Turns input and computed figures into facts according to the binding
/// table.
#[derive(Debug)]
pub struct FactBinder<'a> {
    registry: ContextRegistry,
    config: &'a GeneratorConfig,
    taxonomy: &'a Taxonomy,
}

impl<'a> FactBinder<'a> {
    pub fn new(
        registry: ContextRegistry,
        config: &'a GeneratorConfig,
        taxonomy: &'a Taxonomy,
    ) -> Self {
        Self {
            registry,
            config,
            taxonomy,
        }
    }

    /// Binds a single value.
    ///
    /// Numeric values are expected as magnitudes; the sign travels in
    /// `options`.
    ///
    /// # Errors
    ///
    /// [`BindingError`] when `context_ref` or the requested unit was never
    /// registered.
    pub fn bind(
        &self,
        name: TagName,
        context_ref: &ContextRef,
        value: FactValue,
        options: BindOptions,
    ) -> Result<Fact, BindingError> {
        self.registry.context(context_ref)?;
        if let Some(unit) = &options.unit {
            self.registry.unit(unit)?;
        }

        trace!(fact = %name, context = %context_ref, %value, "bound fact");

        Ok(Fact {
            name,
            context_ref: context_ref.clone(),
            unit_ref: options.unit,
            value,
            sign: options.sign,
            decimals: options.decimals,
            scale: options.scale,
        })
    }

    /// Walks every binding rule in table order.
    ///
    /// Optional sources that are unset produce no fact; a source set to zero
    /// produces a zero-valued fact.
    ///
    /// # Errors
    ///
    /// [`BindingError`] if a rule refers to an unregistered context or unit.
    pub fn bind_all(
        &mut self,
        input: &TaxComputationInput,
        computation: &ComputationResult,
    ) -> Result<Vec<BoundFact>, BindingError> {
        let mut bound = Vec::new();
        for rule in self.taxonomy.rules() {
            self.bind_rule(rule, input, computation, &mut bound)?;
        }
        Ok(bound)
    }

    pub fn registry(&self) -> &ContextRegistry {
        &self.registry
    }

    pub fn into_registry(self) -> ContextRegistry {
        self.registry
    }

    fn bind_rule(
        &mut self,
        rule: &BindingRule,
        input: &TaxComputationInput,
        computation: &ComputationResult,
        out: &mut Vec<BoundFact>,
    ) -> Result<(), BindingError> {
        let base_context = match rule.period {
            PeriodKind::Duration => self.registry.period_context().clone(),
            PeriodKind::Instant => self.registry.instant_context().clone(),
        };

        match (source_value(rule.field, input, computation), rule.cardinality) {
            (SourceValue::Absent, _) => Ok(()),
            (SourceValue::Single(value), Cardinality::Required | Cardinality::Optional) => {
                let fact = self.bind_value(rule, &base_context, value)?;
                out.push(BoundFact {
                    section: rule.section,
                    fact,
                });
                Ok(())
            }
            (
                SourceValue::Lines(items),
                Cardinality::PerLine {
                    dimension,
                    description,
                },
            ) => {
                for (idx, line) in items.iter().enumerate() {
                    let context = self.registry.register_segment_context(
                        &base_context,
                        dimension,
                        (idx + 1).to_string(),
                    )?;
                    let text = self.bind(
                        description,
                        &context,
                        FactValue::Text(line.description.clone()),
                        BindOptions::non_numeric(),
                    )?;
                    let amount =
                        self.bind_value(rule, &context, FactValue::Monetary(line.amount))?;
                    out.push(BoundFact {
                        section: rule.section,
                        fact: text,
                    });
                    out.push(BoundFact {
                        section: rule.section,
                        fact: amount,
                    });
                }
                Ok(())
            }
            _ => Err(BindingError::MissingRule(rule.field)),
        }
    }

    /// Applies the rule's unit, sign and precision conventions to `value`.
    fn bind_value(
        &mut self,
        rule: &BindingRule,
        context: &ContextRef,
        value: FactValue,
    ) -> Result<Fact, BindingError> {
        let options = match rule.value {
            ValueKind::Text | ValueKind::Date => BindOptions::non_numeric(),
            ValueKind::Monetary => BindOptions::numeric(
                self.registry.currency_unit().clone(),
                self.config.monetary_decimals,
            ),
            ValueKind::Ratio => {
                let pure = self.registry.register_unit(Measure::Pure);
                BindOptions::numeric(pure, self.config.ratio_decimals).with_scale(-2)
            }
        };

        let (value, sign) = split_sign(value, rule.sign);
        let options = BindOptions {
            decimals: options.decimals.map(|d| precision(&value, d)),
            ..options
        };
        self.bind(rule.tag, context, value, options.with_sign(sign))
    }
}

/// `decimals` never claims less precision than the value carries, so a
/// consumer rounding to it reads back exactly the value that was reconciled.
fn precision(
    value: &FactValue,
    configured: i32,
) -> i32 {
    value.as_decimal().map_or(configured, |amount| {
        let carried = i32::try_from(amount.normalize().scale()).unwrap_or(configured);
        configured.max(carried)
    })
}

/// Separates a numeric value into magnitude and sign marker.
fn split_sign(
    value: FactValue,
    rule: SignRule,
) -> (FactValue, Sign) {
    let Some(amount) = value.as_decimal() else {
        return (value, Sign::Positive);
    };
    let sign = match (rule, amount < Decimal::ZERO) {
        (SignRule::Contra, _) | (SignRule::Natural, true) => Sign::Negative,
        (SignRule::Natural, false) => Sign::Positive,
    };
    let magnitude = amount.abs();
    let value = match value {
        FactValue::Ratio(_) => FactValue::Ratio(magnitude),
        _ => FactValue::Monetary(magnitude),
    };
    (value, sign)
}

fn money(value: Option<Decimal>) -> SourceValue<'static> {
    value.map_or(SourceValue::Absent, |d| SourceValue::Single(FactValue::Monetary(d)))
}

fn lines(lines: &[AdjustmentLine]) -> SourceValue<'_> {
    if lines.is_empty() {
        SourceValue::Absent
    } else {
        SourceValue::Lines(lines)
    }
}

/// Reads the figure a source field refers to. This is an accessor, not
/// policy: presence, sign and placement come from the binding table.
fn source_value<'i>(
    field: SourceField,
    input: &'i TaxComputationInput,
    computation: &ComputationResult,
) -> SourceValue<'i> {
    let pl = &input.profit_and_loss;
    let adj = &input.adjustments;
    let losses = input.losses.as_ref();

    match field {
        SourceField::CompanyName => SourceValue::Single(FactValue::Text(input.company.name.clone())),
        SourceField::RegistrationNumber => {
            SourceValue::Single(FactValue::Text(
                input.company.registration_number.trim().to_string(),
            ))
        }
        SourceField::TaxReference => {
            SourceValue::Single(FactValue::Text(input.company.tax_reference.trim().to_string()))
        }
        SourceField::PeriodStart => SourceValue::Single(FactValue::Date(input.period_start)),
        SourceField::PeriodEnd => SourceValue::Single(FactValue::Date(input.period_end)),

        SourceField::Turnover => money(Some(pl.turnover)),
        SourceField::CostOfSales => money(pl.cost_of_sales),
        SourceField::GrossProfit => money(pl.gross_profit),
        SourceField::OtherOperatingIncome => money(pl.other_operating_income),
        SourceField::AdministrativeExpenses => money(pl.administrative_expenses),
        SourceField::DistributionCosts => money(pl.distribution_costs),
        SourceField::OperatingProfit => money(pl.operating_profit),
        SourceField::InterestReceivable => money(pl.interest_receivable),
        SourceField::InterestPayable => money(pl.interest_payable),
        SourceField::ProfitBeforeTax | SourceField::AccountingProfit => {
            money(Some(pl.profit_before_tax))
        }

        SourceField::DepreciationAddBack => money(adj.depreciation_add_back),
        SourceField::DisallowedEntertainment => money(adj.disallowed_entertainment),
        SourceField::OtherAddition => lines(&adj.other_additions),
        SourceField::TotalAdditions => {
            money((!computation.additions.is_empty()).then_some(computation.total_additions))
        }
        SourceField::CapitalAllowances => money(adj.capital_allowances),
        SourceField::OtherDeduction => lines(&adj.other_deductions),
        SourceField::TotalDeductions => {
            money((!computation.deductions.is_empty()).then_some(computation.total_deductions))
        }
        SourceField::TaxableProfit => money(Some(input.taxable_profit)),
        SourceField::TaxRate => SourceValue::Single(FactValue::Ratio(input.tax_rate)),

        SourceField::TaxDue => money(Some(input.tax_due)),
        SourceField::RdCredits => money(input.reliefs.rd_credits),
        SourceField::OtherRelief => lines(&input.reliefs.other_reliefs),
        SourceField::TotalTaxPayable => money(Some(computation.total_tax_payable)),

        SourceField::LossesBroughtForward => money(losses.and_then(|l| l.brought_forward)),
        SourceField::LossesUsed => money(adj.losses_used),
        SourceField::LossesCarriedBack => money(losses.and_then(|l| l.carried_back)),
        SourceField::LossesCarriedForward => money(losses.and_then(|l| l.carried_forward)),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::calculations::TaxComputation;
    use crate::models::{
        CompanyIdentity, EntityIdentifier, LossFigures, ProfitAndLoss, Reliefs, TaxAdjustments,
    };
    use crate::tagging::taxonomy::tags;

    fn test_input() -> TaxComputationInput {
        TaxComputationInput {
            company: CompanyIdentity {
                name: "Acme Widgets Ltd".to_string(),
                registration_number: "01234567".to_string(),
                tax_reference: "1234567890".to_string(),
            },
            period_start: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
            period_end: NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
            profit_and_loss: ProfitAndLoss {
                turnover: dec!(100000),
                profit_before_tax: dec!(20000),
                ..ProfitAndLoss::default()
            },
            adjustments: TaxAdjustments::default(),
            taxable_profit: dec!(20000),
            tax_rate: dec!(0.25),
            tax_due: dec!(5000),
            losses: None,
            reliefs: Reliefs::default(),
            dpl_tagged_in_accounts: false,
        }
    }

    fn registry_for(input: &TaxComputationInput) -> ContextRegistry {
        ContextRegistry::new(
            EntityIdentifier {
                scheme: "http://www.companieshouse.gov.uk/".to_string(),
                identifier: input.company.registration_number.clone(),
            },
            input.period_start,
            input.period_end,
            "GBP",
        )
    }

    fn bind(input: &TaxComputationInput) -> Vec<BoundFact> {
        let config = GeneratorConfig::default();
        let taxonomy = Taxonomy::default();
        let computation = TaxComputation::new(input).calculate();
        let mut binder = FactBinder::new(registry_for(input), &config, &taxonomy);
        binder.bind_all(input, &computation).unwrap()
    }

    fn find(
        facts: &[BoundFact],
        tag: TagName,
    ) -> Vec<&Fact> {
        facts.iter().filter(|b| b.fact.name == tag).map(|b| &b.fact).collect()
    }

    // =========================================================================
    // bind tests
    // =========================================================================

    #[test]
    fn bind_rejects_unknown_context() {
        let input = test_input();
        let config = GeneratorConfig::default();
        let taxonomy = Taxonomy::default();
        let binder = FactBinder::new(registry_for(&input), &config, &taxonomy);

        let result = binder.bind(
            tags::TURNOVER,
            &ContextRef("c99".to_string()),
            FactValue::Monetary(dec!(1)),
            BindOptions::numeric(UnitRef("GBP".to_string()), 0),
        );

        assert_eq!(
            result,
            Err(BindingError::UnknownContext(ContextRef("c99".to_string())))
        );
    }

    #[test]
    fn bind_rejects_unknown_unit() {
        let input = test_input();
        let config = GeneratorConfig::default();
        let taxonomy = Taxonomy::default();
        let binder = FactBinder::new(registry_for(&input), &config, &taxonomy);
        let period = binder.registry().period_context().clone();

        let result = binder.bind(
            tags::TURNOVER,
            &period,
            FactValue::Monetary(dec!(1)),
            BindOptions::numeric(UnitRef("EUR".to_string()), 0),
        );

        assert_eq!(result, Err(BindingError::UnknownUnit(UnitRef("EUR".to_string()))));
    }

    // =========================================================================
    // presence tests
    // =========================================================================

    #[test]
    fn minimal_input_binds_only_required_facts() {
        let facts = bind(&test_input());
        let names: Vec<String> = facts.iter().map(|b| b.fact.name.to_string()).collect();

        assert_eq!(
            names,
            vec![
                "ct-comp:CompanyName",
                "bus:UKCompaniesHouseRegisteredNumber",
                "ct-comp:TaxReference",
                "ct-comp:StartOfPeriodCoveredByReturn",
                "ct-comp:EndOfPeriodCoveredByReturn",
                "dpl:TurnoverRevenue",
                "dpl:ProfitLossOnOrdinaryActivitiesBeforeTax",
                "ct-comp:ProfitLossPerAccounts",
                "ct-comp:ProfitsChargeableToCorporationTax",
                "ct-comp:CorporationTaxRate",
                "ct-comp:CorporationTaxChargeable",
                "ct-comp:TaxPayable",
            ]
        );
    }

    #[test]
    fn zero_valued_optional_produces_one_zero_fact() {
        let mut input = test_input();
        input.profit_and_loss.interest_payable = Some(dec!(0));

        let facts = bind(&input);
        let interest = find(&facts, tags::INTEREST_PAYABLE);

        assert_eq!(interest.len(), 1);
        assert_eq!(interest[0].value, FactValue::Monetary(dec!(0)));
    }

    #[test]
    fn totals_appear_only_with_lines() {
        let mut input = test_input();
        input.adjustments.capital_allowances = Some(dec!(10640));

        let facts = bind(&input);

        assert!(find(&facts, tags::TOTAL_ADDITIONS).is_empty());
        assert_eq!(find(&facts, tags::TOTAL_DEDUCTIONS).len(), 1);
    }

    // =========================================================================
    // sign / unit / context tests
    // =========================================================================

    #[test]
    fn contra_lines_carry_negative_marker_not_negative_value() {
        let mut input = test_input();
        input.profit_and_loss.cost_of_sales = Some(dec!(165000));

        let facts = bind(&input);
        let cost = find(&facts, tags::COST_OF_SALES)[0];

        assert_eq!(cost.value, FactValue::Monetary(dec!(165000)));
        assert_eq!(cost.sign, Sign::Negative);
        assert_eq!(cost.signed_amount(), Some(dec!(-165000)));
    }

    #[test]
    fn negative_profit_becomes_magnitude_with_sign() {
        let mut input = test_input();
        input.profit_and_loss.profit_before_tax = dec!(-4200);

        let facts = bind(&input);
        let pbt = find(&facts, tags::PROFIT_BEFORE_TAX)[0];

        assert_eq!(pbt.value, FactValue::Monetary(dec!(4200)));
        assert_eq!(pbt.sign, Sign::Negative);
    }

    #[test]
    fn tax_rate_is_a_pure_ratio_scaled_to_percent() {
        let facts = bind(&test_input());
        let rate = find(&facts, tags::TAX_RATE)[0];

        assert_eq!(rate.unit_ref, Some(UnitRef("pure".to_string())));
        assert_eq!(rate.value, FactValue::Ratio(dec!(0.25)));
        assert_eq!(rate.scale, -2);
        assert_eq!(rate.decimals, Some(4));
    }

    #[test]
    fn whole_pound_amounts_keep_configured_decimals() {
        let facts = bind(&test_input());
        let tax_due = find(&facts, tags::TAX_DUE)[0];

        assert_eq!(tax_due.decimals, Some(0));
    }

    #[test]
    fn amounts_with_pence_declare_two_decimals() {
        let mut input = test_input();
        input.taxable_profit = dec!(1234.57);
        input.tax_rate = dec!(0.19);
        input.tax_due = dec!(234.57);

        let facts = bind(&input);
        let tax_due = find(&facts, tags::TAX_DUE)[0];

        assert_eq!(tax_due.value, FactValue::Monetary(dec!(234.57)));
        assert_eq!(tax_due.decimals, Some(2));
    }

    #[test]
    fn trailing_zeros_do_not_raise_decimals() {
        let mut input = test_input();
        input.tax_due = dec!(5000.00);

        let facts = bind(&input);

        assert_eq!(find(&facts, tags::TAX_DUE)[0].decimals, Some(0));
    }

    #[test]
    fn identity_facts_are_trimmed_like_the_entity() {
        let mut input = test_input();
        input.company.registration_number = " 01234567 ".to_string();
        input.company.tax_reference = "1234567890  ".to_string();

        let facts = bind(&input);

        assert_eq!(
            find(&facts, tags::REGISTRATION_NUMBER)[0].value,
            FactValue::Text("01234567".to_string())
        );
        assert_eq!(
            find(&facts, tags::TAX_REFERENCE)[0].value,
            FactValue::Text("1234567890".to_string())
        );
    }

    #[test]
    fn text_facts_have_no_unit_or_decimals() {
        let facts = bind(&test_input());
        let name = find(&facts, tags::COMPANY_NAME)[0];

        assert_eq!(name.unit_ref, None);
        assert_eq!(name.decimals, None);
    }

    #[test]
    fn loss_balances_use_instant_context() {
        let mut input = test_input();
        input.losses = Some(LossFigures {
            brought_forward: Some(dec!(8000)),
            carried_forward: Some(dec!(5000)),
            carried_back: None,
        });
        input.adjustments.losses_used = Some(dec!(3000));

        let facts = bind(&input);

        assert_eq!(find(&facts, tags::LOSSES_BROUGHT_FORWARD)[0].context_ref.as_str(), "c2");
        assert_eq!(find(&facts, tags::LOSSES_CARRIED_FORWARD)[0].context_ref.as_str(), "c2");
        assert_eq!(find(&facts, tags::LOSSES_USED)[0].context_ref.as_str(), "c1");
        assert!(find(&facts, tags::LOSSES_CARRIED_BACK).is_empty());
    }

    #[test]
    fn list_lines_get_their_own_segment_contexts_in_caller_order() {
        let mut input = test_input();
        input.adjustments.other_additions = vec![
            AdjustmentLine::new("Fines", dec!(200)),
            AdjustmentLine::new("Donations", dec!(100)),
        ];

        let facts = bind(&input);
        let amounts = find(&facts, tags::OTHER_ADDITION);
        let descriptions = find(&facts, tags::OTHER_ADDITION_DESCRIPTION);

        assert_eq!(amounts.len(), 2);
        assert_eq!(amounts[0].value, FactValue::Monetary(dec!(200)));
        assert_eq!(amounts[1].value, FactValue::Monetary(dec!(100)));
        assert_eq!(descriptions[0].value, FactValue::Text("Fines".to_string()));
        assert_eq!(amounts[0].context_ref, descriptions[0].context_ref);
        assert_ne!(amounts[0].context_ref, amounts[1].context_ref);
    }
}

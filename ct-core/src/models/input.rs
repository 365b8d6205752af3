//! The populated tax computation record handed to the generator.
//!
//! A `TaxComputationInput` is built once per filing attempt by whatever
//! collects the figures (a loader, an API handler, a test) and is treated as
//! immutable for the duration of generation. [`TaxComputationInput::check`]
//! is the fail-fast gate run before any fact binding happens.

use std::sync::LazyLock;

use chrono::{Datelike, Months, NaiveDate};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::InputError;

/// Companies House numbers: eight digits, or a two-letter prefix
/// (SC, NI, OC, ...) followed by six digits.
static REGISTRATION_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\d{8}|[A-Z]{2}\d{6})$").expect("valid regex"));

/// Largest magnitude accepted for any amount (10^15). Every sum and product
/// the engine forms from amounts within it stays inside `Decimal` range.
const MAX_AMOUNT: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

/// Unique Taxpayer Reference: ten digits.
static TAX_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{10}$").expect("valid regex"));

/// Identity of the company the computation belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyIdentity {
    /// Registered legal name.
    pub name: String,
    /// Companies House registration number.
    pub registration_number: String,
    /// Corporation tax UTR.
    pub tax_reference: String,
}

/// Detailed profit and loss figures for the accounting period.
///
/// Only `turnover` and `profit_before_tax` are mandatory. Costs are supplied
/// as positive magnitudes; the binder marks them as contra amounts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitAndLoss {
    pub turnover: Decimal,
    #[serde(default)]
    pub cost_of_sales: Option<Decimal>,
    #[serde(default)]
    pub gross_profit: Option<Decimal>,
    #[serde(default)]
    pub other_operating_income: Option<Decimal>,
    #[serde(default)]
    pub administrative_expenses: Option<Decimal>,
    #[serde(default)]
    pub distribution_costs: Option<Decimal>,
    #[serde(default)]
    pub operating_profit: Option<Decimal>,
    #[serde(default)]
    pub interest_receivable: Option<Decimal>,
    #[serde(default)]
    pub interest_payable: Option<Decimal>,
    pub profit_before_tax: Decimal,
}

/// A caller-described adjustment or relief line. Order within a list is
/// significant and is preserved all the way to the rendered document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentLine {
    pub description: String,
    pub amount: Decimal,
}

impl AdjustmentLine {
    pub fn new(
        description: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        Self {
            description: description.into(),
            amount,
        }
    }
}

/// Adjustments that take accounting profit to taxable profit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxAdjustments {
    #[serde(default)]
    pub depreciation_add_back: Option<Decimal>,
    #[serde(default)]
    pub disallowed_entertainment: Option<Decimal>,
    #[serde(default)]
    pub other_additions: Vec<AdjustmentLine>,
    #[serde(default)]
    pub capital_allowances: Option<Decimal>,
    #[serde(default)]
    pub losses_used: Option<Decimal>,
    #[serde(default)]
    pub other_deductions: Vec<AdjustmentLine>,
}

/// Trading loss balances.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LossFigures {
    #[serde(default)]
    pub brought_forward: Option<Decimal>,
    #[serde(default)]
    pub carried_forward: Option<Decimal>,
    #[serde(default)]
    pub carried_back: Option<Decimal>,
}

impl LossFigures {
    /// True when no balance is set at all.
    pub fn is_empty(&self) -> bool {
        self.brought_forward.is_none() && self.carried_forward.is_none() && self.carried_back.is_none()
    }
}

/// Reliefs and credits set against the tax due.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reliefs {
    #[serde(default)]
    pub rd_credits: Option<Decimal>,
    #[serde(default)]
    pub other_reliefs: Vec<AdjustmentLine>,
}

/// Everything needed to tag one corporation tax computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxComputationInput {
    pub company: CompanyIdentity,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub profit_and_loss: ProfitAndLoss,
    #[serde(default)]
    pub adjustments: TaxAdjustments,
    /// Taxable profit as computed by the caller.
    pub taxable_profit: Decimal,
    /// Main rate as a fraction, e.g. `0.25`.
    pub tax_rate: Decimal,
    /// Corporation tax due as computed by the caller.
    pub tax_due: Decimal,
    #[serde(default)]
    pub losses: Option<LossFigures>,
    #[serde(default)]
    pub reliefs: Reliefs,
    /// Set when the detailed profit and loss is also tagged in the
    /// companion accounts document.
    #[serde(default)]
    pub dpl_tagged_in_accounts: bool,
}

impl TaxComputationInput {
    /// Rejects malformed or inconsistent input.
    ///
    /// Runs before any fact binding. The first violation found is returned
    /// with the offending field named.
    ///
    /// # Errors
    ///
    /// Returns [`InputError`] when identity fields are blank or malformed,
    /// the period is inverted or longer than twelve months, the rate is not
    /// a fraction in `[0, 1]`, a non-profit amount is negative, any amount
    /// exceeds 10^15 in magnitude, or an adjustment line has no description.
    pub fn check(&self) -> Result<(), InputError> {
        self.check_company()?;
        self.check_period()?;

        if self.tax_rate < Decimal::ZERO || self.tax_rate > Decimal::ONE {
            return Err(InputError::RateOutOfRange(self.tax_rate));
        }

        for (field, value) in self.non_negative_amounts() {
            if value < Decimal::ZERO {
                return Err(InputError::NegativeAmount { field });
            }
        }

        for (field, value) in self.non_negative_amounts().into_iter().chain(self.profit_amounts()) {
            if value.abs() > MAX_AMOUNT {
                return Err(InputError::AmountOutOfRange { field });
            }
        }

        for (list, lines) in [
            ("other_additions", &self.adjustments.other_additions),
            ("other_deductions", &self.adjustments.other_deductions),
            ("other_reliefs", &self.reliefs.other_reliefs),
        ] {
            for (idx, line) in lines.iter().enumerate() {
                if line.description.trim().is_empty() {
                    return Err(InputError::BlankAdjustmentDescription { list, line: idx + 1 });
                }
                if line.amount < Decimal::ZERO {
                    return Err(InputError::NegativeAmount { field: list });
                }
                if line.amount > MAX_AMOUNT {
                    return Err(InputError::AmountOutOfRange { field: list });
                }
            }
        }

        Ok(())
    }

    /// True when any loss figure (including losses used) is supplied.
    pub fn has_loss_data(&self) -> bool {
        self.adjustments.losses_used.is_some()
            || self.losses.as_ref().is_some_and(|l| !l.is_empty())
    }

    fn check_company(&self) -> Result<(), InputError> {
        if self.company.name.trim().is_empty() {
            return Err(InputError::MissingCompanyName);
        }
        if !REGISTRATION_NUMBER.is_match(self.company.registration_number.trim()) {
            return Err(InputError::InvalidRegistrationNumber(
                self.company.registration_number.clone(),
            ));
        }
        if !TAX_REFERENCE.is_match(self.company.tax_reference.trim()) {
            return Err(InputError::InvalidTaxReference(self.company.tax_reference.clone()));
        }
        Ok(())
    }

    fn check_period(&self) -> Result<(), InputError> {
        let (start, end) = (self.period_start, self.period_end);
        if end < start {
            return Err(InputError::PeriodEndsBeforeStart { start, end });
        }

        // An accounting period for corporation tax never exceeds twelve months.
        // When the anniversary is clamped to a shorter month (29 Feb, 31st)
        // the twelve months run to the end of that month.
        let anniversary = start
            .checked_add_months(Months::new(12))
            .ok_or(InputError::PeriodTooLong { start, end })?;
        let latest_end = if anniversary.day() == start.day() {
            anniversary
                .pred_opt()
                .ok_or(InputError::PeriodTooLong { start, end })?
        } else {
            anniversary
        };
        if end > latest_end {
            return Err(InputError::PeriodTooLong { start, end });
        }
        Ok(())
    }

    /// Profit lines, which may legitimately be negative.
    fn profit_amounts(&self) -> Vec<(&'static str, Decimal)> {
        let pl = &self.profit_and_loss;
        [
            ("gross_profit", pl.gross_profit),
            ("operating_profit", pl.operating_profit),
            ("profit_before_tax", Some(pl.profit_before_tax)),
            ("taxable_profit", Some(self.taxable_profit)),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|v| (field, v)))
        .collect()
    }

    /// Amounts that may never be negative. Profit lines (gross, operating,
    /// pre-tax, taxable) are excluded because a loss is a legitimate value.
    fn non_negative_amounts(&self) -> Vec<(&'static str, Decimal)> {
        let pl = &self.profit_and_loss;
        let adj = &self.adjustments;
        let mut amounts = vec![
            ("turnover", Some(pl.turnover)),
            ("cost_of_sales", pl.cost_of_sales),
            ("other_operating_income", pl.other_operating_income),
            ("administrative_expenses", pl.administrative_expenses),
            ("distribution_costs", pl.distribution_costs),
            ("interest_receivable", pl.interest_receivable),
            ("interest_payable", pl.interest_payable),
            ("depreciation_add_back", adj.depreciation_add_back),
            ("disallowed_entertainment", adj.disallowed_entertainment),
            ("capital_allowances", adj.capital_allowances),
            ("losses_used", adj.losses_used),
            ("tax_due", Some(self.tax_due)),
            ("rd_credits", self.reliefs.rd_credits),
        ];
        if let Some(losses) = &self.losses {
            amounts.push(("losses_brought_forward", losses.brought_forward));
            amounts.push(("losses_carried_forward", losses.carried_forward));
            amounts.push(("losses_carried_back", losses.carried_back));
        }

        amounts
            .into_iter()
            .filter_map(|(field, value)| value.map(|v| (field, v)))
            .collect()
    }
}

//! Corporation tax computation arithmetic.
//!
//! Recomputes, independently of the caller, the figures a tagged computation
//! must reconcile to.
//!
//! # Computation Structure
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Profit before tax (from the detailed profit and loss) |
//! | 2    | Additions: depreciation add-back, disallowed entertainment, other additions (caller order) |
//! | 3    | Deductions: capital allowances, losses used in period, other deductions (caller order) |
//! | 4    | Taxable profit (Step 1 + Step 2 - Step 3) |
//! | 5    | Tax on profit (max(Step 4, 0) x rate, rounded to pence) |
//! | 6    | Reliefs: R&D credits + other reliefs |
//! | 7    | Total tax payable (tax due - Step 6, minimum 0) |
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use rust_decimal_macros::dec;
//! use ct_core::calculations::TaxComputation;
//! use ct_core::models::*;
//!
//! let input = TaxComputationInput {
//!     company: CompanyIdentity {
//!         name: "Acme Widgets Ltd".to_string(),
//!         registration_number: "01234567".to_string(),
//!         tax_reference: "1234567890".to_string(),
//!     },
//!     period_start: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
//!     period_end: NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
//!     profit_and_loss: ProfitAndLoss {
//!         turnover: dec!(332500),
//!         profit_before_tax: dec!(56000),
//!         ..ProfitAndLoss::default()
//!     },
//!     adjustments: TaxAdjustments {
//!         depreciation_add_back: Some(dec!(5000)),
//!         capital_allowances: Some(dec!(10640)),
//!         ..TaxAdjustments::default()
//!     },
//!     taxable_profit: dec!(50360),
//!     tax_rate: dec!(0.25),
//!     tax_due: dec!(12590),
//!     losses: None,
//!     reliefs: Reliefs::default(),
//!     dpl_tagged_in_accounts: false,
//! };
//!
//! let result = TaxComputation::new(&input).calculate();
//!
//! assert_eq!(result.taxable_profit, dec!(50360));
//! assert_eq!(result.tax_on_profit, dec!(12590));
//! assert_eq!(result.total_tax_payable, dec!(12590));
//! ```

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::calculations::common::{floor_at_zero, round_to_pence, sum_present};
use crate::models::{AdjustmentLine, TaxComputationInput};

/// One contributing line of a total, kept for traceability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComputationLine {
    pub label: String,
    pub amount: Decimal,
}

impl ComputationLine {
    fn new(
        label: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        Self {
            label: label.into(),
            amount,
        }
    }
}

/// Result of the computation. Every figure here is derived from the input
/// alone and never from the caller's own totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComputationResult {
    /// Addition lines in computation order.
    pub additions: Vec<ComputationLine>,
    pub total_additions: Decimal,

    /// Deduction lines in computation order.
    pub deductions: Vec<ComputationLine>,
    pub total_deductions: Decimal,

    /// Profit before tax + total additions - total deductions.
    pub taxable_profit: Decimal,

    /// Tax at the supplied rate on a non-negative taxable profit.
    pub tax_on_profit: Decimal,

    /// R&D credits plus other reliefs.
    pub total_reliefs: Decimal,

    /// Tax due less reliefs, never below zero.
    pub total_tax_payable: Decimal,
}

/// Calculator over a single input record.
#[derive(Debug, Clone, Copy)]
pub struct TaxComputation<'a> {
    input: &'a TaxComputationInput,
}

impl<'a> TaxComputation<'a> {
    pub fn new(input: &'a TaxComputationInput) -> Self {
        Self { input }
    }

    /// Runs every step of the computation.
    ///
    /// The computation is total: it never fails, because input shape errors
    /// are rejected earlier by [`TaxComputationInput::check`].
    pub fn calculate(&self) -> ComputationResult {
        let additions = self.addition_lines();
        let total_additions = Self::total(&additions);

        let deductions = self.deduction_lines();
        let total_deductions = Self::total(&deductions);

        let taxable_profit = self.taxable_profit(total_additions, total_deductions);
        let tax_on_profit = self.tax_on_profit(taxable_profit);

        let total_reliefs = self.total_reliefs();
        let total_tax_payable = self.total_tax_payable(self.input.tax_due, total_reliefs);

        debug!(
            %total_additions,
            %total_deductions,
            %taxable_profit,
            %total_tax_payable,
            "computation recalculated"
        );

        ComputationResult {
            additions,
            total_additions,
            deductions,
            total_deductions,
            taxable_profit,
            tax_on_profit,
            total_reliefs,
            total_tax_payable,
        }
    }

    /// Addition lines: fixed lines first, then caller-ordered others.
    fn addition_lines(&self) -> Vec<ComputationLine> {
        let adj = &self.input.adjustments;
        let mut lines = Vec::new();

        if let Some(amount) = adj.depreciation_add_back {
            lines.push(ComputationLine::new("Depreciation added back", amount));
        }
        if let Some(amount) = adj.disallowed_entertainment {
            lines.push(ComputationLine::new("Disallowed entertainment", amount));
        }
        lines.extend(Self::list_lines(&adj.other_additions));
        lines
    }

    /// Deduction lines: fixed lines first, then caller-ordered others.
    fn deduction_lines(&self) -> Vec<ComputationLine> {
        let adj = &self.input.adjustments;
        let mut lines = Vec::new();

        if let Some(amount) = adj.capital_allowances {
            lines.push(ComputationLine::new("Capital allowances", amount));
        }
        if let Some(amount) = adj.losses_used {
            lines.push(ComputationLine::new("Losses used in period", amount));
        }
        lines.extend(Self::list_lines(&adj.other_deductions));
        lines
    }

    fn list_lines(lines: &[AdjustmentLine]) -> impl Iterator<Item = ComputationLine> + '_ {
        lines
            .iter()
            .map(|l| ComputationLine::new(l.description.clone(), l.amount))
    }

    fn total(lines: &[ComputationLine]) -> Decimal {
        lines.iter().map(|l| l.amount).sum()
    }

    fn taxable_profit(
        &self,
        total_additions: Decimal,
        total_deductions: Decimal,
    ) -> Decimal {
        self.input.profit_and_loss.profit_before_tax + total_additions - total_deductions
    }

    fn tax_on_profit(
        &self,
        taxable_profit: Decimal,
    ) -> Decimal {
        round_to_pence(floor_at_zero(taxable_profit) * self.input.tax_rate)
    }

    fn total_reliefs(&self) -> Decimal {
        let reliefs = &self.input.reliefs;
        sum_present(
            std::iter::once(reliefs.rd_credits)
                .chain(reliefs.other_reliefs.iter().map(|l| Some(l.amount))),
        )
    }

    /// Excess relief is not carried anywhere; payable stops at zero.
    fn total_tax_payable(
        &self,
        tax_due: Decimal,
        total_reliefs: Decimal,
    ) -> Decimal {
        floor_at_zero(tax_due - total_reliefs)
    }
}

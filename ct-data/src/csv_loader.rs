//! CSV loader for batches of computation records.
//!
//! ## CSV Format
//!
//! One record per row. Column order does **not** matter (headers are matched
//! by name). Adjustment and relief *lists* cannot be expressed in a flat row;
//! use the TOML format for records that need them.
//!
//! | Column                     | Required | Type    | Notes                       |
//! |----------------------------|----------|---------|-----------------------------|
//! | `company_name`             | yes      | string  |                             |
//! | `registration_number`      | yes      | string  | 8 digits or 2 letters + 6   |
//! | `tax_reference`            | yes      | string  | 10 digits                   |
//! | `period_start`             | yes      | date    | `YYYY-MM-DD`                |
//! | `period_end`               | yes      | date    | `YYYY-MM-DD`                |
//! | `turnover`                 | yes      | decimal |                             |
//! | `cost_of_sales`            | no       | decimal | Leave cell empty for `None` |
//! | `gross_profit`             | no       | decimal | Leave cell empty for `None` |
//! | `other_operating_income`   | no       | decimal | Leave cell empty for `None` |
//! | `administrative_expenses`  | no       | decimal | Leave cell empty for `None` |
//! | `distribution_costs`       | no       | decimal | Leave cell empty for `None` |
//! | `operating_profit`         | no       | decimal | Leave cell empty for `None` |
//! | `interest_receivable`      | no       | decimal | Leave cell empty for `None` |
//! | `interest_payable`         | no       | decimal | Leave cell empty for `None` |
//! | `profit_before_tax`        | yes      | decimal | may be negative             |
//! | `depreciation_add_back`    | no       | decimal | Leave cell empty for `None` |
//! | `disallowed_entertainment` | no       | decimal | Leave cell empty for `None` |
//! | `capital_allowances`       | no       | decimal | Leave cell empty for `None` |
//! | `losses_used`              | no       | decimal | Leave cell empty for `None` |
//! | `taxable_profit`           | yes      | decimal |                             |
//! | `tax_rate`                 | yes      | decimal | fraction, e.g. `0.25`       |
//! | `tax_due`                  | yes      | decimal |                             |
//! | `rd_credits`               | no       | decimal | Leave cell empty for `None` |
//! | `losses_brought_forward`   | no       | decimal | Leave cell empty for `None` |
//! | `losses_carried_forward`   | no       | decimal | Leave cell empty for `None` |
//! | `losses_carried_back`      | no       | decimal | Leave cell empty for `None` |
//! | `dpl_tagged_in_accounts`   | no       | bool    | `true`/`false`, default false |
//!
//! ### Minimal example
//!
//! ```csv
//! company_name,registration_number,tax_reference,period_start,period_end,turnover,profit_before_tax,taxable_profit,tax_rate,tax_due
//! Acme Widgets Ltd,01234567,1234567890,2024-04-01,2025-03-31,100000,20000,20000,0.25,5000
//! ```
use std::path::Path;

use chrono::NaiveDate;
use ct_core::{
    CompanyIdentity, LossFigures, ProfitAndLoss, Reliefs, TaxAdjustments, TaxComputationInput,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{LoadError, checked, read_file};

// ---------------------------------------------------------------------------
// Serde-compatible row that mirrors the CSV layout exactly
// ---------------------------------------------------------------------------

/// Amounts are parsed from the cell text rather than through csv's numeric
/// inference, which goes via `f64`.
#[derive(Debug, Deserialize)]
struct CsvRow {
    company_name: String,
    registration_number: String,
    tax_reference: String,
    period_start: NaiveDate,
    period_end: NaiveDate,
    #[serde(with = "rust_decimal::serde::str")]
    turnover: Decimal,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    cost_of_sales: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    gross_profit: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    other_operating_income: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    administrative_expenses: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    distribution_costs: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    operating_profit: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    interest_receivable: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    interest_payable: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::str")]
    profit_before_tax: Decimal,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    depreciation_add_back: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    disallowed_entertainment: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    capital_allowances: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    losses_used: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::str")]
    taxable_profit: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    tax_rate: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    tax_due: Decimal,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    rd_credits: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    losses_brought_forward: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    losses_carried_forward: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    losses_carried_back: Option<Decimal>,
    dpl_tagged_in_accounts: Option<bool>,
}

// ---------------------------------------------------------------------------
// Core loader
// ---------------------------------------------------------------------------

/// Convert a single CSV row into a record. The losses block is only present
/// when at least one balance column is filled.
fn convert_row(row: CsvRow) -> TaxComputationInput {
    let losses = LossFigures {
        brought_forward: row.losses_brought_forward,
        carried_forward: row.losses_carried_forward,
        carried_back: row.losses_carried_back,
    };

    TaxComputationInput {
        company: CompanyIdentity {
            name: row.company_name,
            registration_number: row.registration_number,
            tax_reference: row.tax_reference,
        },
        period_start: row.period_start,
        period_end: row.period_end,
        profit_and_loss: ProfitAndLoss {
            turnover: row.turnover,
            cost_of_sales: row.cost_of_sales,
            gross_profit: row.gross_profit,
            other_operating_income: row.other_operating_income,
            administrative_expenses: row.administrative_expenses,
            distribution_costs: row.distribution_costs,
            operating_profit: row.operating_profit,
            interest_receivable: row.interest_receivable,
            interest_payable: row.interest_payable,
            profit_before_tax: row.profit_before_tax,
        },
        adjustments: TaxAdjustments {
            depreciation_add_back: row.depreciation_add_back,
            disallowed_entertainment: row.disallowed_entertainment,
            capital_allowances: row.capital_allowances,
            losses_used: row.losses_used,
            ..TaxAdjustments::default()
        },
        taxable_profit: row.taxable_profit,
        tax_rate: row.tax_rate,
        tax_due: row.tax_due,
        losses: (!losses.is_empty()).then_some(losses),
        reliefs: Reliefs {
            rd_credits: row.rd_credits,
            ..Reliefs::default()
        },
        dpl_tagged_in_accounts: row.dpl_tagged_in_accounts.unwrap_or(false),
    }
}

/// Parse CSV text and return the checked records in file order.
///
/// # Errors
///
/// * [`LoadError::Csv`] if the CSV is structurally invalid or a required
///   field cannot be deserialised.
/// * [`LoadError::InvalidRecord`] if a row fails input checks; `row` is
///   1-based, header excluded.
pub fn load_from_str(input: &str) -> Result<Vec<TaxComputationInput>, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(false)
        .from_reader(input.as_bytes());

    reader
        .deserialize::<CsvRow>()
        .enumerate()
        .map(|(idx, result)| {
            let row = result?;
            checked(convert_row(row), idx + 1)
        })
        .collect()
}

/// Read a file from disk and delegate to [`load_from_str`].
///
/// # Errors
///
/// [`LoadError::Io`] when the file cannot be read, otherwise as
/// [`load_from_str`].
pub fn load_from_file(path: &Path) -> Result<Vec<TaxComputationInput>, LoadError> {
    load_from_str(&read_file(path)?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

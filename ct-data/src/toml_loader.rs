//! TOML loader for a single computation record.
//!
//! The document mirrors [`TaxComputationInput`] field for field. Optional
//! figures are simply left out; adjustment and relief lists are arrays of
//! tables and keep their order.
//!
//! ```toml
//! taxable_profit = "50360"
//! tax_rate = "0.25"
//! tax_due = "12590"
//! period_start = "2024-04-01"
//! period_end = "2025-03-31"
//!
//! [company]
//! name = "Acme Widgets Ltd"
//! registration_number = "01234567"
//! tax_reference = "1234567890"
//!
//! [profit_and_loss]
//! turnover = "332500"
//! profit_before_tax = "56000"
//!
//! [[adjustments.other_additions]]
//! description = "Fines and penalties"
//! amount = "300"
//! ```
//!
//! Amounts may be written as strings or numbers; strings keep exact decimal
//! precision. Dates are quoted ISO-8601 strings.

use std::path::Path;

use ct_core::TaxComputationInput;

use crate::{LoadError, checked, read_file};

/// Parse and check one record.
///
/// # Errors
///
/// * [`LoadError::Toml`] when the text is not valid TOML or does not match
///   the record layout.
/// * [`LoadError::InvalidRecord`] when the record fails input checks.
pub fn load_from_str(input: &str) -> Result<TaxComputationInput, LoadError> {
    let record: TaxComputationInput = toml::from_str(input)?;
    checked(record, 1)
}

/// Read a file from disk and delegate to [`load_from_str`].
///
/// # Errors
///
/// [`LoadError::Io`] when the file cannot be read, otherwise as
/// [`load_from_str`].
pub fn load_from_file(path: &Path) -> Result<TaxComputationInput, LoadError> {
    load_from_str(&read_file(path)?)
}

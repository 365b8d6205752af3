//! Errors that abort generation.
//!
//! Validation findings are not errors; they live in
//! [`ValidationReport`](crate::models::ValidationReport).

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{ContextRef, UnitRef};
use crate::tagging::SourceField;

/// Malformed or inconsistent input, detected before any fact is bound.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("company name must not be blank")]
    MissingCompanyName,

    #[error("'{0}' is not a valid company registration number")]
    InvalidRegistrationNumber(String),

    #[error("'{0}' is not a valid ten-digit tax reference")]
    InvalidTaxReference(String),

    #[error("accounting period ends ({end}) before it starts ({start})")]
    PeriodEndsBeforeStart { start: NaiveDate, end: NaiveDate },

    #[error("accounting period {start} to {end} is longer than twelve months")]
    PeriodTooLong { start: NaiveDate, end: NaiveDate },

    #[error("tax rate must be a fraction between 0 and 1, got {0}")]
    RateOutOfRange(Decimal),

    #[error("{field} must not be negative")]
    NegativeAmount { field: &'static str },

    #[error("{field} is outside the supported range")]
    AmountOutOfRange { field: &'static str },

    #[error("line {line} of {list} has no description")]
    BlankAdjustmentDescription { list: &'static str, line: usize },
}

/// A fact could not be produced because something it depends on was never
/// registered. Unreachable when the registry is used as intended.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BindingError {
    #[error("context {0} was never registered")]
    UnknownContext(ContextRef),

    #[error("unit {0} was never registered")]
    UnknownUnit(UnitRef),

    #[error("no binding rule for {0:?}")]
    MissingRule(SourceField),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GenerationError {
    #[error("invalid input: {0}")]
    Input(#[from] InputError),

    #[error("internal binding failure: {0}")]
    Binding(#[from] BindingError),
}

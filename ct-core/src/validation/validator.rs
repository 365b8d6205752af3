use tracing::debug;

use super::rules::{Inspection, RULES};
use crate::calculations::TaxComputation;
use crate::config::ValidatorConfig;
use crate::models::{Document, TaxComputationInput, ValidationReport};
use crate::tagging::{Taxonomy, render_ixbrl};

/// Checks a generated document against the input it was generated from.
///
/// Validation is purely observational: every rule runs, findings are
/// collected rather than short-circuited, and the document is never
/// modified. Taxable profit and tax due are reconciled against figures the
/// engine recomputes from `input`, not against the input's own claims.
#[derive(Debug, Clone, Copy)]
pub struct Validator<'a> {
    config: &'a ValidatorConfig,
    taxonomy: &'a Taxonomy,
}

impl<'a> Validator<'a> {
    pub fn new(
        config: &'a ValidatorConfig,
        taxonomy: &'a Taxonomy,
    ) -> Self {
        Self { config, taxonomy }
    }

    pub fn validate(
        &self,
        document: &Document,
        input: &TaxComputationInput,
    ) -> ValidationReport {
        let computation = TaxComputation::new(input).calculate();
        let rendered_bytes = render_ixbrl(document, self.taxonomy).len();

        let inspection = Inspection {
            document,
            input,
            computation: &computation,
            config: self.config,
            rendered_bytes,
        };

        let mut report = ValidationReport::new();
        for rule in RULES {
            rule(&inspection, &mut report);
        }

        debug!(
            errors = report.errors.len(),
            warnings = report.warnings.len(),
            rendered_bytes,
            "validated document"
        );
        report
    }
}

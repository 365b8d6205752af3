//! Tagged corporation tax computations.
//!
//! [`generate`] turns a [`TaxComputationInput`] into a sectioned
//! [`Document`] of tagged facts; [`Validator`] checks a document against the
//! input it came from; [`render_ixbrl`] serialises a document for
//! submission.

pub mod calculations;
pub mod config;
pub mod error;
pub mod models;
pub mod tagging;
pub mod validation;

use tracing::{info, warn};

pub use config::{GeneratorConfig, ValidatorConfig};
pub use error::{BindingError, GenerationError, InputError};
pub use models::*;
pub use tagging::{Taxonomy, render_ixbrl};
pub use validation::Validator;

use calculations::TaxComputation;
use tagging::{ContextRegistry, DocumentAssembler, FactBinder};

/// Builds the tagged document for one computation.
///
/// Input is checked before anything is bound. Identical input and config
/// always produce an identical document.
///
/// # Errors
///
/// [`GenerationError::Input`] for malformed input;
/// [`GenerationError::Binding`] if a fact refers to an unregistered context
/// or unit.
pub fn generate(
    input: &TaxComputationInput,
    config: &GeneratorConfig,
) -> Result<Document, GenerationError> {
    input.check()?;

    let computation = TaxComputation::new(input).calculate();
    let taxonomy = Taxonomy::default();
    let registry = ContextRegistry::new(
        EntityIdentifier {
            scheme: config.entity_scheme.clone(),
            identifier: input.company.registration_number.trim().to_string(),
        },
        input.period_start,
        input.period_end,
        &config.currency,
    );

    let mut binder = FactBinder::new(registry, config, &taxonomy);
    let facts = binder.bind_all(input, &computation)?;
    let registry = binder.into_registry();
    let document = DocumentAssembler::new(config).assemble(input, facts, &registry);

    info!(
        company = %input.company.name,
        period_end = %input.period_end,
        facts = document.fact_count(),
        contexts = document.contexts.len(),
        sections = document.sections.len(),
        "generated computation document"
    );
    Ok(document)
}

/// [`generate`] followed by validation against the same input.
///
/// # Errors
///
/// As [`generate`]. Validation findings are returned in the report, never
/// as an error.
pub fn generate_and_validate(
    input: &TaxComputationInput,
    generator: &GeneratorConfig,
    validator: &ValidatorConfig,
) -> Result<(Document, ValidationReport), GenerationError> {
    let document = generate(input, generator)?;
    let taxonomy = Taxonomy::default();
    let report = Validator::new(validator, &taxonomy).validate(&document, input);

    if !report.is_submittable() {
        warn!(
            company = %input.company.name,
            errors = report.errors.len(),
            codes = ?report.codes(),
            "document failed validation"
        );
    }
    Ok((document, report))
}

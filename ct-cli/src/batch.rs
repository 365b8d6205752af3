//! Parallel generation over a batch of records.
//!
//! Each record is generated and validated on the blocking pool; records
//! share nothing but the read-only configuration.

use std::sync::Arc;

use ct_core::{Document, GenerationError, TaxComputationInput, ValidationReport};
use thiserror::Error;
use tracing::{debug, error};

use crate::config::CliConfig;

/// One record to process, labelled for reporting.
#[derive(Debug, Clone)]
pub struct Job {
    pub label: String,
    pub input: TaxComputationInput,
}

/// Why a record produced no document.
#[derive(Debug, Error)]
pub enum JobError {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("generation task aborted: {0}")]
    Aborted(String),
}

#[derive(Debug)]
pub struct Outcome {
    pub label: String,
    pub input: TaxComputationInput,
    pub result: Result<(Document, ValidationReport), JobError>,
}

impl Outcome {
    /// Generated, and the report has no errors.
    pub fn succeeded(&self) -> bool {
        self.result
            .as_ref()
            .is_ok_and(|(_, report)| report.is_submittable())
    }
}

/// Generates and validates every job, returning one outcome per job in job
/// order.
pub async fn run(
    jobs: Vec<Job>,
    config: Arc<CliConfig>,
) -> Vec<Outcome> {
    run_with(jobs, move |input| {
        ct_core::generate_and_validate(input, &config.generator, &config.validator)
    })
    .await
}

/// Runs `generate` for each job on the blocking pool. A task that panics
/// still yields an outcome, failed with [`JobError::Aborted`].
async fn run_with<F>(
    jobs: Vec<Job>,
    generate: F,
) -> Vec<Outcome>
where
    F: Fn(&TaxComputationInput) -> Result<(Document, ValidationReport), GenerationError>
        + Send
        + Sync
        + 'static,
{
    let total = jobs.len();
    let generate = Arc::new(generate);
    let handles: Vec<_> = jobs
        .into_iter()
        .map(|job| {
            let generate = Arc::clone(&generate);
            let input = job.input.clone();
            let handle = tokio::task::spawn_blocking(move || generate(&input));
            (job, handle)
        })
        .collect();

    let mut outcomes = Vec::with_capacity(total);
    for (job, handle) in handles {
        let result = match handle.await {
            Ok(result) => result.map_err(JobError::from),
            Err(e) => {
                error!(record = %job.label, error = %e, "generation task failed");
                Err(JobError::Aborted(e.to_string()))
            }
        };
        outcomes.push(Outcome {
            label: job.label,
            input: job.input,
            result,
        });
    }

    debug!(jobs = total, "batch finished");
    outcomes
}

/// Number of outcomes that did not generate a submittable document.
pub fn failures(outcomes: &[Outcome]) -> usize {
    outcomes.iter().filter(|o| !o.succeeded()).count()
}

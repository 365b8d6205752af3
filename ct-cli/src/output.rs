//! Writing generated artifacts to disk.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use ct_core::{Document, FactRecord, TaxComputationInput, Taxonomy, ValidationReport, render_ixbrl};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Inline XBRL page only.
    Xhtml,
    /// JSON fact list only.
    Facts,
    /// Both artifacts.
    Both,
}

impl OutputFormat {
    fn xhtml(self) -> bool {
        matches!(self, Self::Xhtml | Self::Both)
    }

    fn facts(self) -> bool {
        matches!(self, Self::Facts | Self::Both)
    }
}

/// The machine-checkable form written next to the rendered page.
#[derive(Debug, Serialize)]
struct FactListFile<'a> {
    company: &'a str,
    registration_number: &'a str,
    period_end: chrono::NaiveDate,
    facts: Vec<FactRecord>,
    report: &'a ValidationReport,
}

/// `<registration number>_<period end>`, e.g. `01234567_2025-03-31`.
pub fn artifact_stem(input: &TaxComputationInput) -> String {
    format!(
        "{}_{}",
        input.company.registration_number.trim(),
        input.period_end.format("%Y-%m-%d")
    )
}

/// One stem per input, in order. Inputs sharing a registration number and
/// period end get a 1-based `_<n>` suffix so no artifact overwrites another.
pub fn unique_stems<'a>(inputs: impl IntoIterator<Item = &'a TaxComputationInput>) -> Vec<String> {
    let stems: Vec<String> = inputs.into_iter().map(artifact_stem).collect();

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for stem in &stems {
        *counts.entry(stem.as_str()).or_default() += 1;
    }

    let mut seen: HashMap<&str, usize> = HashMap::new();
    stems
        .iter()
        .map(|stem| {
            if counts[stem.as_str()] == 1 {
                return stem.clone();
            }
            let n = seen.entry(stem.as_str()).or_default();
            *n += 1;
            format!("{stem}_{n}")
        })
        .collect()
}

/// Writes the requested artifacts under `stem` and returns the paths written.
pub fn write_artifacts(
    dir: &Path,
    stem: &str,
    format: OutputFormat,
    input: &TaxComputationInput,
    document: &Document,
    report: &ValidationReport,
    taxonomy: &Taxonomy,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory: {}", dir.display()))?;

    let mut written = Vec::new();

    if format.xhtml() {
        let path = dir.join(format!("{stem}.xhtml"));
        std::fs::write(&path, render_ixbrl(document, taxonomy))
            .with_context(|| format!("failed to write {}", path.display()))?;
        written.push(path);
    }

    if format.facts() {
        let path = dir.join(format!("{stem}.facts.json"));
        let file = FactListFile {
            company: &input.company.name,
            registration_number: &input.company.registration_number,
            period_end: input.period_end,
            facts: document.fact_list(),
            report,
        };
        let json = serde_json::to_string_pretty(&file).context("failed to serialise fact list")?;
        std::fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))?;
        written.push(path);
    }

    for path in &written {
        info!(path = %path.display(), "wrote artifact");
    }
    Ok(written)
}

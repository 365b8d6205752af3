use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// Stable identifiers for validation findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FindingCode {
    DplTurnoverMissing,
    TaxFactMissing,
    ContextsIncomplete,
    TaxableProfitMismatch,
    TaxDueMismatch,
    DocumentTooLarge,
    DplDuplicated,
    DanglingContext,
    DanglingUnit,
    DuplicateFact,
    DplArithmetic,
}

impl FindingCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DplTurnoverMissing => "DPL_TURNOVER_MISSING",
            Self::TaxFactMissing => "TAX_FACT_MISSING",
            Self::ContextsIncomplete => "CONTEXTS_INCOMPLETE",
            Self::TaxableProfitMismatch => "TAXABLE_PROFIT_MISMATCH",
            Self::TaxDueMismatch => "TAX_DUE_MISMATCH",
            Self::DocumentTooLarge => "DOCUMENT_TOO_LARGE",
            Self::DplDuplicated => "DPL_DUPLICATED",
            Self::DanglingContext => "DANGLING_CONTEXT",
            Self::DanglingUnit => "DANGLING_UNIT",
            Self::DuplicateFact => "DUPLICATE_FACT",
            Self::DplArithmetic => "DPL_ARITHMETIC",
        }
    }
}

impl fmt::Display for FindingCode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub code: FindingCode,
    pub message: String,
}

/// Outcome of validating a document against its input.
///
/// Any error means the document must not be submitted; warnings are
/// advisory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub errors: Vec<Finding>,
    pub warnings: Vec<Finding>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &mut self,
        severity: Severity,
        code: FindingCode,
        message: impl Into<String>,
    ) {
        let finding = Finding {
            code,
            message: message.into(),
        };
        match severity {
            Severity::Error => self.errors.push(finding),
            Severity::Warning => self.warnings.push(finding),
        }
    }

    pub fn is_submittable(&self) -> bool {
        self.errors.is_empty()
    }

    /// Codes of every finding, errors first.
    pub fn codes(&self) -> Vec<FindingCode> {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .map(|f| f.code)
            .collect()
    }

    pub fn has_code(
        &self,
        code: FindingCode,
    ) -> bool {
        self.errors.iter().chain(self.warnings.iter()).any(|f| f.code == code)
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        writeln!(
            f,
            "{} error(s), {} warning(s)",
            self.errors.len(),
            self.warnings.len()
        )?;
        for finding in &self.errors {
            writeln!(f, "  error   [{}] {}", finding.code, finding.message)?;
        }
        for finding in &self.warnings {
            writeln!(f, "  warning [{}] {}", finding.code, finding.message)?;
        }
        Ok(())
    }
}

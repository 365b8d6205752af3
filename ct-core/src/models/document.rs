use chrono::NaiveDate;
use serde::Serialize;

use super::{Context, ContextRef, Fact, FactRecord, TagName, Unit, UnitRef};

/// Document sections, declared in rendering order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    CompanyInformation,
    DetailedProfitAndLoss,
    TaxComputation,
    TaxLiability,
    Losses,
}

impl SectionKind {
    pub const ALL: [SectionKind; 5] = [
        Self::CompanyInformation,
        Self::DetailedProfitAndLoss,
        Self::TaxComputation,
        Self::TaxLiability,
        Self::Losses,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Self::CompanyInformation => "Company Information",
            Self::DetailedProfitAndLoss => "Detailed Profit and Loss",
            Self::TaxComputation => "Tax Computation",
            Self::TaxLiability => "Tax Liability",
            Self::Losses => "Losses",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub kind: SectionKind,
    pub facts: Vec<Fact>,
}

/// Descriptive header carried alongside the facts; not itself tagged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentHeader {
    pub title: String,
    pub company_name: String,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub schema_refs: Vec<String>,
}

/// An assembled computation document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    pub header: DocumentHeader,
    pub contexts: Vec<Context>,
    pub units: Vec<Unit>,
    pub sections: Vec<Section>,
}

impl Document {
    /// All facts in document order.
    pub fn facts(&self) -> impl Iterator<Item = &Fact> {
        self.sections.iter().flat_map(|s| s.facts.iter())
    }

    /// First fact carrying `name`, in document order.
    pub fn find_fact(
        &self,
        name: TagName,
    ) -> Option<&Fact> {
        self.facts().find(|f| f.name == name)
    }

    pub fn section(
        &self,
        kind: SectionKind,
    ) -> Option<&Section> {
        self.sections.iter().find(|s| s.kind == kind)
    }

    pub fn context(
        &self,
        id: &ContextRef,
    ) -> Option<&Context> {
        self.contexts.iter().find(|c| &c.id == id)
    }

    pub fn unit(
        &self,
        id: &UnitRef,
    ) -> Option<&Unit> {
        self.units.iter().find(|u| &u.id == id)
    }

    /// The flat fact sequence used for round-trip and determinism checks.
    pub fn fact_list(&self) -> Vec<FactRecord> {
        self.facts().map(Fact::to_record).collect()
    }

    pub fn fact_count(&self) -> usize {
        self.sections.iter().map(|s| s.facts.len()).sum()
    }
}

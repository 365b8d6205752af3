mod context;
mod document;
mod fact;
mod input;
mod report;
mod unit;

pub use context::{Context, ContextKey, ContextRef, EntityIdentifier, Period, PeriodKind, Segment};
pub use document::{Document, DocumentHeader, Section, SectionKind};
pub use fact::{Fact, FactRecord, FactValue, Sign, TagName};
pub use input::{
    AdjustmentLine, CompanyIdentity, LossFigures, ProfitAndLoss, Reliefs, TaxAdjustments,
    TaxComputationInput,
};
pub use report::{Finding, FindingCode, Severity, ValidationReport};
pub use unit::{Measure, Unit, UnitRef};

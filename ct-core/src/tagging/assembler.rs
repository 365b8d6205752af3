use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use super::binder::BoundFact;
use super::registry::ContextRegistry;
use crate::config::GeneratorConfig;
use crate::models::{Document, DocumentHeader, Section, SectionKind, TaxComputationInput};

/// Arranges bound facts into the sectioned document.
///
/// Sections follow [`SectionKind`] order. Within a section facts keep the
/// order the binder produced them in, which is the binding-table order with
/// caller-ordered list lines expanded in place. The losses section is left
/// out entirely when it has no facts.
#[derive(Debug, Clone, Copy)]
pub struct DocumentAssembler<'a> {
    config: &'a GeneratorConfig,
}

impl<'a> DocumentAssembler<'a> {
    pub fn new(config: &'a GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn assemble(
        &self,
        input: &TaxComputationInput,
        facts: Vec<BoundFact>,
        registry: &ContextRegistry,
    ) -> Document {
        let mut by_section: BTreeMap<SectionKind, Vec<_>> = BTreeMap::new();
        for bound in facts {
            by_section.entry(bound.section).or_default().push(bound.fact);
        }

        let sections: Vec<Section> = SectionKind::ALL
            .into_iter()
            .filter_map(|kind| {
                let facts = by_section.remove(&kind)?;
                debug!(section = kind.title(), facts = facts.len(), "assembled section");
                Some(Section { kind, facts })
            })
            .collect();

        let referenced_contexts: HashSet<_> = sections
            .iter()
            .flat_map(|s| s.facts.iter())
            .map(|f| &f.context_ref)
            .collect();
        let contexts = registry
            .contexts()
            .iter()
            .filter(|c| {
                &c.id == registry.period_context()
                    || &c.id == registry.instant_context()
                    || referenced_contexts.contains(&c.id)
            })
            .cloned()
            .collect();

        let referenced_units: HashSet<_> = sections
            .iter()
            .flat_map(|s| s.facts.iter())
            .filter_map(|f| f.unit_ref.as_ref())
            .collect();
        let units = registry
            .units()
            .iter()
            .filter(|u| referenced_units.contains(&u.id))
            .cloned()
            .collect();

        Document {
            header: self.header(input),
            contexts,
            units,
            sections,
        }
    }

    fn header(
        &self,
        input: &TaxComputationInput,
    ) -> DocumentHeader {
        let title = self.config.title.clone().unwrap_or_else(|| {
            format!(
                "{} - corporation tax computation for the period ended {}",
                input.company.name,
                input.period_end.format("%-d %B %Y")
            )
        });

        DocumentHeader {
            title,
            company_name: input.company.name.clone(),
            period_start: input.period_start,
            period_end: input.period_end,
            schema_refs: self.config.schema_refs.clone(),
        }
    }
}

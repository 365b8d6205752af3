use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::error::BindingError;
use crate::models::{
    Context, ContextKey, ContextRef, EntityIdentifier, Measure, Period, Segment, Unit, UnitRef,
};

/// Deduplicating registry of the contexts and units a document's facts
/// refer to.
///
/// Registration is idempotent: registering the same logical context or unit
/// twice returns the reference handed out the first time. Context ids are
/// assigned in registration order (`c1`, `c2`, ...), so a fixed registration
/// sequence always yields the same ids.
#[derive(Debug, Clone)]
pub struct ContextRegistry {
    entity: EntityIdentifier,
    contexts: Vec<Context>,
    context_index: HashMap<ContextKey, ContextRef>,
    units: Vec<Unit>,
    unit_index: HashMap<Measure, UnitRef>,
    period_context: ContextRef,
    instant_context: ContextRef,
    currency_unit: UnitRef,
}

impl ContextRegistry {
    /// Creates a registry with the accounting-period duration context, the
    /// period-end instant context and the reporting currency unit already
    /// registered.
    pub fn new(
        entity: EntityIdentifier,
        period_start: NaiveDate,
        period_end: NaiveDate,
        currency: &str,
    ) -> Self {
        let mut registry = Self {
            entity: entity.clone(),
            contexts: Vec::new(),
            context_index: HashMap::new(),
            units: Vec::new(),
            unit_index: HashMap::new(),
            period_context: ContextRef::default(),
            instant_context: ContextRef::default(),
            currency_unit: UnitRef::default(),
        };

        registry.period_context = registry.register_context(
            entity.clone(),
            Period::Duration {
                start: period_start,
                end: period_end,
            },
            None,
        );
        registry.instant_context =
            registry.register_context(entity, Period::Instant { date: period_end }, None);
        registry.currency_unit = registry.register_unit(Measure::Currency(currency.to_string()));

        registry
    }

    pub fn entity(&self) -> &EntityIdentifier {
        &self.entity
    }

    /// The accounting-period duration context.
    pub fn period_context(&self) -> &ContextRef {
        &self.period_context
    }

    /// The period-end instant context.
    pub fn instant_context(&self) -> &ContextRef {
        &self.instant_context
    }

    pub fn currency_unit(&self) -> &UnitRef {
        &self.currency_unit
    }

    /// Returns the reference for `(entity, period, segment)`, registering a
    /// new context only if none exists yet.
    pub fn register_context(
        &mut self,
        entity: EntityIdentifier,
        period: Period,
        segment: Option<Segment>,
    ) -> ContextRef {
        let key = ContextKey {
            entity,
            period,
            segment,
        };
        if let Some(existing) = self.context_index.get(&key) {
            return existing.clone();
        }

        let id = ContextRef(format!("c{}", self.contexts.len() + 1));
        debug!(context = %id, period = ?key.period, "registered context");

        self.contexts.push(Context {
            id: id.clone(),
            entity: key.entity.clone(),
            period: key.period,
            segment: key.segment.clone(),
        });
        self.context_index.insert(key, id.clone());
        id
    }

    /// Same period as `base`, separated by a typed segment member.
    ///
    /// # Errors
    ///
    /// [`BindingError::UnknownContext`] if `base` was never registered.
    pub fn register_segment_context(
        &mut self,
        base: &ContextRef,
        dimension: &str,
        member: impl Into<String>,
    ) -> Result<ContextRef, BindingError> {
        let base = self.context(base)?;
        let (entity, period) = (base.entity.clone(), base.period);
        Ok(self.register_context(
            entity,
            period,
            Some(Segment {
                dimension: dimension.to_string(),
                member: member.into(),
            }),
        ))
    }

    /// Returns the reference for `measure`, registering it on first use.
    pub fn register_unit(
        &mut self,
        measure: Measure,
    ) -> UnitRef {
        if let Some(existing) = self.unit_index.get(&measure) {
            return existing.clone();
        }

        let id = measure.unit_id();
        debug!(unit = %id, "registered unit");

        self.units.push(Unit {
            id: id.clone(),
            measure: measure.clone(),
        });
        self.unit_index.insert(measure, id.clone());
        id
    }

    /// # Errors
    ///
    /// [`BindingError::UnknownContext`] if `id` was never registered.
    pub fn context(
        &self,
        id: &ContextRef,
    ) -> Result<&Context, BindingError> {
        self.contexts
            .iter()
            .find(|c| &c.id == id)
            .ok_or_else(|| BindingError::UnknownContext(id.clone()))
    }

    /// # Errors
    ///
    /// [`BindingError::UnknownUnit`] if `id` was never registered.
    pub fn unit(
        &self,
        id: &UnitRef,
    ) -> Result<&Unit, BindingError> {
        self.units
            .iter()
            .find(|u| &u.id == id)
            .ok_or_else(|| BindingError::UnknownUnit(id.clone()))
    }

    pub fn contexts(&self) -> &[Context] {
        &self.contexts
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }
}

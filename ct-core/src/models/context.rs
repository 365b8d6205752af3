use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier of a registered context, e.g. `c1`.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextRef(pub String);

impl ContextRef {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContextRef {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The reporting entity: an identifier within an identifier scheme.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityIdentifier {
    pub scheme: String,
    pub identifier: String,
}

/// Time dimension of a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Period {
    Duration { start: NaiveDate, end: NaiveDate },
    Instant { date: NaiveDate },
}

/// Whether a fact is measured over a period or at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodKind {
    Duration,
    Instant,
}

impl Period {
    pub fn kind(&self) -> PeriodKind {
        match self {
            Self::Duration { .. } => PeriodKind::Duration,
            Self::Instant { .. } => PeriodKind::Instant,
        }
    }
}

/// A typed dimension member that separates otherwise identical contexts,
/// used for the individual lines of caller-ordered lists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Segment {
    /// Qualified dimension name, e.g. `ct-comp:OtherAdditionsLineDimension`.
    pub dimension: String,
    /// Member value, e.g. the 1-based line number.
    pub member: String,
}

/// Deduplication key of a context.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContextKey {
    pub entity: EntityIdentifier,
    pub period: Period,
    pub segment: Option<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    pub id: ContextRef,
    pub entity: EntityIdentifier,
    pub period: Period,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segment: Option<Segment>,
}

impl Context {
    pub fn key(&self) -> ContextKey {
        ContextKey {
            entity: self.entity.clone(),
            period: self.period,
            segment: self.segment.clone(),
        }
    }
}

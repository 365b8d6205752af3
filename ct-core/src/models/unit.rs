use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a registered unit, e.g. `GBP` or `pure`.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitRef(pub String);

impl UnitRef {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnitRef {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "code", rename_all = "lowercase")]
pub enum Measure {
    /// ISO 4217 currency, e.g. `GBP`.
    Currency(String),
    /// Dimensionless ratio.
    Pure,
}

impl Measure {
    /// The id a unit of this measure is registered under.
    pub fn unit_id(&self) -> UnitRef {
        match self {
            Self::Currency(code) => UnitRef(code.to_ascii_uppercase()),
            Self::Pure => UnitRef("pure".to_string()),
        }
    }

    /// Qualified measure name as it appears in the unit definition.
    pub fn qualified_name(&self) -> String {
        match self {
            Self::Currency(code) => format!("iso4217:{}", code.to_ascii_uppercase()),
            Self::Pure => "xbrli:pure".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitRef,
    pub measure: Measure,
}

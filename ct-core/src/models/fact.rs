use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};

use super::{ContextRef, UnitRef};

/// A schema-qualified element name such as `ct-comp:TaxableProfit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TagName {
    pub prefix: &'static str,
    pub local: &'static str,
}

impl TagName {
    pub const fn new(
        prefix: &'static str,
        local: &'static str,
    ) -> Self {
        Self { prefix, local }
    }
}

impl fmt::Display for TagName {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}:{}", self.prefix, self.local)
    }
}

impl Serialize for TagName {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Sign convention marker. Values are stored as magnitudes; a negative fact
/// carries `Sign::Negative` instead of a negative literal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sign {
    #[default]
    Positive,
    Negative,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum FactValue {
    Monetary(Decimal),
    Ratio(Decimal),
    Text(String),
    Date(NaiveDate),
}

impl FactValue {
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Monetary(_) | Self::Ratio(_))
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Self::Monetary(d) | Self::Ratio(d) => Some(*d),
            Self::Text(_) | Self::Date(_) => None,
        }
    }
}

impl fmt::Display for FactValue {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Monetary(d) | Self::Ratio(d) => write!(f, "{d}"),
            Self::Text(s) => f.write_str(s),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

/// A single tagged data point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fact {
    pub name: TagName,
    pub context_ref: ContextRef,
    pub unit_ref: Option<UnitRef>,
    pub value: FactValue,
    pub sign: Sign,
    /// Precision indicator; `None` for non-numeric facts.
    pub decimals: Option<i32>,
    /// Power of ten the displayed number is scaled by (`-2` for percentages).
    pub scale: i32,
}

impl Fact {
    pub fn is_numeric(&self) -> bool {
        self.value.is_numeric()
    }

    /// The numeric value with the sign marker applied.
    pub fn signed_amount(&self) -> Option<Decimal> {
        self.value.as_decimal().map(|d| match self.sign {
            Sign::Positive => d,
            Sign::Negative => -d,
        })
    }

    pub fn to_record(&self) -> FactRecord {
        FactRecord {
            name: self.name.to_string(),
            context: self.context_ref.to_string(),
            unit: self.unit_ref.as_ref().map(ToString::to_string),
            value: self.value.to_string(),
            sign: self.sign,
            decimals: self.decimals,
        }
    }
}

/// Flat, machine-checkable form of a fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactRecord {
    pub name: String,
    pub context: String,
    #[serde(default)]
    pub unit: Option<String>,
    pub value: String,
    pub sign: Sign,
    #[serde(default)]
    pub decimals: Option<i32>,
}

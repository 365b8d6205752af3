use serde::{Deserialize, Serialize};

/// Settings that shape a generated document without changing its figures.
///
/// | field               | default                                   |
/// |---------------------|-------------------------------------------|
/// | `currency`          | `GBP`                                     |
/// | `monetary_decimals` | `0` (whole pounds)                        |
/// | `ratio_decimals`    | `4`                                       |
/// | `entity_scheme`     | Companies House identifier scheme         |
/// | `schema_refs`       | computational and DPL taxonomy entry points |
///
/// The two `decimals` settings are a floor; a value carrying pence is tagged
/// with the precision it actually has.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub currency: String,
    pub monetary_decimals: i32,
    pub ratio_decimals: i32,
    pub entity_scheme: String,
    pub schema_refs: Vec<String>,
    /// Overrides the default "<company> tax computation" page title.
    pub title: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            currency: "GBP".to_string(),
            monetary_decimals: 0,
            ratio_decimals: 4,
            entity_scheme: "http://www.companieshouse.gov.uk/".to_string(),
            schema_refs: vec![
                "https://www.hmrc.gov.uk/schemas/ct/comp/2023-01-01/ct-comp-2023.xsd".to_string(),
                "https://www.hmrc.gov.uk/schemas/ct/dpl/2023-01-01/dpl-2023.xsd".to_string(),
            ],
            title: None,
        }
    }
}

/// Operational limits applied by the validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Rendered size above which a document is flagged for alternate
    /// transport.
    pub max_document_bytes: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_document_bytes: 5 * 1024 * 1024,
        }
    }
}

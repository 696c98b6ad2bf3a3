//! Analysis result models matching the backend `full-analysis` response.
//!
//! Every field is optional. The backend fills sections from scrapers that
//! may time out or fail independently, so renderers must cope with any
//! subset being present.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::lenient;
use crate::error::{ClientError, ClientResult};

/// Structured analysis returned by `POST /full-analysis`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AnalysisResult {
    #[serde(default, deserialize_with = "lenient::text")]
    pub inn: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub dosage_form: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub dosage: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub administration_mode: Option<String>,
    #[serde(default, deserialize_with = "lenient::record")]
    pub literature: Option<Literature>,
    #[serde(default, deserialize_with = "lenient::record")]
    pub pk_parameters: Option<PkParameters>,
    #[serde(default, deserialize_with = "lenient::record")]
    pub design_recommendation: Option<DesignRecommendation>,
    #[serde(default, deserialize_with = "lenient::record")]
    pub sample_size: Option<SampleSize>,
    #[serde(default, deserialize_with = "lenient::record_map")]
    pub regulatory_check: Option<BTreeMap<String, Compliance>>,
}

// =============================================================================
// Literature
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Literature {
    #[serde(default, deserialize_with = "lenient::record")]
    pub pubmed: Option<PubMedResults>,
    #[serde(default, deserialize_with = "lenient::record")]
    pub drugbank: Option<DrugBankEntry>,
    #[serde(default, deserialize_with = "lenient::record")]
    pub grls: Option<GrlsResults>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PubMedResults {
    #[serde(default, deserialize_with = "lenient::list")]
    pub articles: Vec<Article>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub count: Option<f64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub search_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Article {
    #[serde(default, deserialize_with = "lenient::text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient::text_list")]
    pub authors: Vec<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub year: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DrugBankEntry {
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub pharmacokinetics: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub search_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GrlsResults {
    #[serde(default, deserialize_with = "lenient::list")]
    pub registered_drugs: Vec<RegisteredDrug>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub count: Option<f64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub search_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RegisteredDrug {
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub dosage_form: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub manufacturer: Option<String>,
}

// =============================================================================
// Pharmacokinetics
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PkParameters {
    #[serde(default, deserialize_with = "lenient::record")]
    pub cmax: Option<Measurement>,
    #[serde(default, deserialize_with = "lenient::record")]
    pub auc: Option<Measurement>,
    #[serde(default, deserialize_with = "lenient::record")]
    pub tmax: Option<Measurement>,
    #[serde(default, deserialize_with = "lenient::record")]
    pub t_half: Option<Measurement>,
    #[serde(default, deserialize_with = "lenient::record")]
    pub cvintra: Option<Measurement>,
}

/// A reported value with its unit.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Measurement {
    #[serde(default, deserialize_with = "lenient::number")]
    pub value: Option<f64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub unit: Option<String>,
}

// =============================================================================
// Design and sample size
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DesignRecommendation {
    #[serde(default, deserialize_with = "lenient::text")]
    pub recommended_design: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub rationale: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub cvintra: Option<f64>,
    /// Where the CVintra came from: `user_input`, `database` or `pubmed`.
    #[serde(default, deserialize_with = "lenient::text")]
    pub cvintra_source: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SampleSize {
    #[serde(default, deserialize_with = "lenient::text")]
    pub design: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub cvintra: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub base_sample_size: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub dropout_rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub final_sample_size: Option<f64>,
    #[serde(default, deserialize_with = "lenient::text_list")]
    pub calculation_steps: Vec<String>,
}

// =============================================================================
// Regulatory
// =============================================================================

/// Compliance verdict for one jurisdiction.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Compliance {
    #[serde(default, deserialize_with = "lenient::flag")]
    pub compliant: Option<bool>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub requirements: Option<String>,
}

// =============================================================================
// Retained document
// =============================================================================

/// A successful analysis: the parsed view plus the JSON object exactly as
/// the backend sent it, so a later synopsis request can resend every field.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisDocument {
    result: AnalysisResult,
    fields: Map<String, Value>,
}

impl AnalysisDocument {
    /// Parse a response body. Anything but a JSON object is malformed.
    pub fn from_value(value: Value) -> ClientResult<Self> {
        let fields = match value {
            Value::Object(fields) => fields,
            other => {
                return Err(ClientError::MalformedResponse(format!(
                    "expected a JSON object, got {}",
                    json_kind(&other)
                )))
            }
        };

        let result = AnalysisResult::deserialize(Value::Object(fields.clone()))
            .map_err(|e| ClientError::MalformedResponse(e.to_string()))?;

        Ok(Self { result, fields })
    }

    pub fn from_slice(body: &[u8]) -> ClientResult<Self> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| ClientError::MalformedResponse(e.to_string()))?;
        Self::from_value(value)
    }

    pub fn result(&self) -> &AnalysisResult {
        &self.result
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

//! Form surface: raw field values as the user typed them, and the
//! request they are normalized into.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Raw form state. Every field is the untrimmed text of its input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub inn: String,
    pub dosage_form: String,
    pub dosage: String,
    pub administration_mode: String,
    pub cvintra: String,
    pub output_format: OutputFormat,
}

impl FormState {
    pub fn with_inn(inn: impl Into<String>) -> Self {
        Self {
            inn: inn.into(),
            ..Self::default()
        }
    }
}

/// Synopsis document formats accepted by the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Docx,
    Json,
    #[default]
    Markdown,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Docx => "docx",
            Self::Json => "json",
            Self::Markdown => "markdown",
        }
    }

    /// Extension of the saved file; the format name itself.
    pub fn extension(&self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "docx" => Ok(Self::Docx),
            "json" => Ok(Self::Json),
            "markdown" | "md" => Ok(Self::Markdown),
            other => Err(format!(
                "unknown output format '{}', expected docx, json or markdown",
                other
            )),
        }
    }
}

/// Body of `POST /full-analysis`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisRequest {
    pub inn: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dosage_form: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dosage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub administration_mode: Option<String>,
    /// Explicit `null` on the wire when absent; the backend then looks the value up.
    pub cvintra: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_format: Option<OutputFormat>,
}

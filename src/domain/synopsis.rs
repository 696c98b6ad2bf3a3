//! Synopsis generation request and the saved document it produces.

use serde::Serialize;
use serde_json::{Map, Value};
use std::path::PathBuf;

use super::form::OutputFormat;

/// Body of `POST /generate-full-synopsis`: analysis fields plus the format.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SynopsisRequest {
    #[serde(flatten)]
    fields: Map<String, Value>,
    output_format: OutputFormat,
}

impl SynopsisRequest {
    pub fn new(mut fields: Map<String, Value>, output_format: OutputFormat) -> Self {
        fields.remove("output_format");
        Self {
            fields,
            output_format,
        }
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output_format
    }

    /// Drug identifier carried by the request, if any.
    pub fn inn(&self) -> Option<&str> {
        self.fields
            .get("inn")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// A synopsis written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedDocument {
    pub path: PathBuf,
    pub bytes: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn format_replaces_any_carried_output_format() {
        let fields = json!({"inn": "ibuprofen", "output_format": "docx"});
        let request = SynopsisRequest::new(
            fields.as_object().cloned().unwrap_or_default(),
            OutputFormat::Json,
        );
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body, json!({"inn": "ibuprofen", "output_format": "json"}));
        assert_eq!(request.inn(), Some("ibuprofen"));
    }
}

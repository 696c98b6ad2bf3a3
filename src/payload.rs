//! Payload builder: turns raw form state into API request bodies.

use serde_json::{Map, Value};

use crate::domain::{AnalysisDocument, AnalysisRequest, FormState, OutputFormat, SynopsisRequest};
use crate::error::{ClientError, ClientResult};

pub const MISSING_INN_MESSAGE: &str = "Please enter the drug INN";

/// Build the `full-analysis` request from the current form.
///
/// Fails with [`ClientError::Validation`] when the INN is blank.
pub fn build_request(form: &FormState) -> ClientResult<AnalysisRequest> {
    let inn = form.inn.trim();
    if inn.is_empty() {
        return Err(ClientError::validation(MISSING_INN_MESSAGE));
    }

    Ok(AnalysisRequest {
        inn: inn.to_string(),
        dosage_form: optional_text(&form.dosage_form),
        dosage: optional_text(&form.dosage),
        administration_mode: optional_text(&form.administration_mode),
        cvintra: parse_cvintra(&form.cvintra),
        output_format: None,
    })
}

/// Parse the CVintra field. Blank, unparseable and non-finite input is absent.
pub fn parse_cvintra(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Build the `generate-full-synopsis` request.
///
/// A retained analysis is resent as-is so the synopsis covers the
/// literature, PK, design, sample size and regulatory sections already
/// fetched. Without one the request is built from the form alone.
pub fn build_synopsis_request(
    retained: Option<&AnalysisDocument>,
    form: &FormState,
    format: OutputFormat,
) -> ClientResult<SynopsisRequest> {
    let fields = match retained {
        Some(document) => {
            let mut fields = document.fields().clone();
            if fields.get("pk_parameters").map_or(true, Value::is_null) {
                fields.insert("pk_parameters".to_string(), Value::Object(Map::new()));
            }
            fields
        }
        None => request_fields(build_request(form)?),
    };

    Ok(SynopsisRequest::new(fields, format))
}

/// Same wire shape as a serialized [`AnalysisRequest`].
fn request_fields(request: AnalysisRequest) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert("inn".to_string(), Value::from(request.inn));
    for (key, value) in [
        ("dosage_form", request.dosage_form),
        ("dosage", request.dosage),
        ("administration_mode", request.administration_mode),
    ] {
        if let Some(value) = value {
            fields.insert(key.to_string(), Value::from(value));
        }
    }
    fields.insert(
        "cvintra".to_string(),
        request.cvintra.map_or(Value::Null, Value::from),
    );
    fields
}

fn optional_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn blank_inn_is_rejected() {
        let err = build_request(&FormState::with_inn("   ")).unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
        assert_eq!(err.user_message(), MISSING_INN_MESSAGE);
    }

    #[test]
    fn empty_cvintra_is_absent_not_zero() {
        assert_eq!(parse_cvintra(""), None);
        assert_eq!(parse_cvintra("  "), None);
        assert_eq!(parse_cvintra("abc"), None);
        assert_eq!(parse_cvintra("NaN"), None);
        assert_eq!(parse_cvintra("inf"), None);
    }

    #[test]
    fn finite_cvintra_round_trips() {
        assert_eq!(parse_cvintra("12.5"), Some(12.5));
        assert_eq!(parse_cvintra(" 30 "), Some(30.0));
        assert_eq!(parse_cvintra("0"), Some(0.0));
    }

    #[test]
    fn request_trims_and_drops_blank_optionals() {
        let form = FormState {
            inn: " ibuprofen ".to_string(),
            dosage_form: "tablet".to_string(),
            dosage: "".to_string(),
            administration_mode: "fasted".to_string(),
            cvintra: "12.5".to_string(),
            output_format: OutputFormat::Docx,
        };
        let request = build_request(&form).unwrap();
        assert_eq!(request.inn, "ibuprofen");
        assert_eq!(request.dosage_form.as_deref(), Some("tablet"));
        assert_eq!(request.dosage, None);
        assert_eq!(request.administration_mode.as_deref(), Some("fasted"));
        assert_eq!(request.cvintra, Some(12.5));
        assert_eq!(request.output_format, None);
    }

    #[test]
    fn synopsis_reuses_retained_analysis() {
        let document = AnalysisDocument::from_value(json!({
            "inn": "ibuprofen",
            "literature": {"pubmed": {"count": 7}},
            "design_recommendation": {"recommended_design": "2x2 crossover"},
            "sample_size": {"final_sample_size": 24},
            "regulatory_check": {"ema": {"compliant": true}}
        }))
        .unwrap();

        // Empty form: the retained analysis must be used, not the form
        let request =
            build_synopsis_request(Some(&document), &FormState::default(), OutputFormat::Docx)
                .unwrap();
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(body["inn"], "ibuprofen");
        assert_eq!(body["literature"]["pubmed"]["count"], 7);
        assert_eq!(body["design_recommendation"]["recommended_design"], "2x2 crossover");
        assert_eq!(body["sample_size"]["final_sample_size"], 24);
        assert_eq!(body["regulatory_check"]["ema"]["compliant"], true);
        assert_eq!(body["pk_parameters"], json!({}));
        assert_eq!(body["output_format"], "docx");
    }

    #[test]
    fn synopsis_without_analysis_uses_form() {
        let mut form = FormState::with_inn("metformin");
        form.cvintra = "25".to_string();
        let request = build_synopsis_request(None, &form, OutputFormat::Markdown).unwrap();
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["inn"], "metformin");
        assert_eq!(body["cvintra"], 25.0);
        assert_eq!(body["output_format"], "markdown");
        assert!(body.get("literature").is_none());
    }

    #[test]
    fn form_fields_match_analysis_request() {
        let mut form = FormState::with_inn(" metformin ");
        form.dosage = "500 mg".to_string();
        let request = build_request(&form).unwrap();

        let fields = request_fields(request.clone());

        assert_eq!(Value::Object(fields.clone()), serde_json::to_value(&request).unwrap());
        assert_eq!(fields["cvintra"], Value::Null);
        assert!(!fields.contains_key("dosage_form"));
    }

    #[test]
    fn synopsis_without_analysis_requires_inn() {
        let err = build_synopsis_request(None, &FormState::default(), OutputFormat::Json)
            .unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }
}

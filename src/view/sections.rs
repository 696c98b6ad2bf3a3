//! Per-section renderers for the results region.
//!
//! Each renderer takes its optional sub-document and never assumes any
//! field is present: absent values become placeholders. The markup lives
//! in `templates/sections/`.

use askama::Template;
use std::collections::BTreeMap;

use super::markup::{format_number, href, number_or, preview, text_or, truncate_chars, DASH};
use crate::domain::{
    Article, Compliance, DesignRecommendation, DrugBankEntry, GrlsResults, Literature,
    Measurement, PkParameters, PubMedResults, RegisteredDrug, SampleSize,
};

const DRUGBANK_PREVIEW_CHARS: usize = 400;

pub const PK_DEFAULTS_NOTICE: &str = "Parameters not reported in the literature are replaced by default values. \
     Values are extracted from PubMed articles; verify them against the original publications.";

/// Jurisdictions with a display label, in display order.
const KNOWN_JURISDICTIONS: [(&str, &str); 3] = [
    ("decision_85", "Decision No. 85 (EAEU)"),
    ("ema", "EMA Guidelines"),
    ("fda", "FDA Guidance"),
];

// =============================================================================
// Literature
// =============================================================================

struct ArticleRow {
    title: String,
    authors: String,
    year: String,
    url: String,
}

impl From<&Article> for ArticleRow {
    fn from(article: &Article) -> Self {
        let authors = if article.authors.is_empty() {
            "Unknown".to_string()
        } else {
            article.authors.join(", ")
        };
        Self {
            title: text_or(article.title.as_deref(), "No title"),
            authors,
            year: text_or(article.year.as_deref(), "N/A"),
            url: href(article.url.as_deref()),
        }
    }
}

struct RegisteredRow {
    name: String,
    dosage_form: String,
    manufacturer: String,
}

impl From<&RegisteredDrug> for RegisteredRow {
    fn from(drug: &RegisteredDrug) -> Self {
        Self {
            name: text_or(drug.name.as_deref(), DASH),
            dosage_form: text_or(drug.dosage_form.as_deref(), DASH),
            manufacturer: text_or(drug.manufacturer.as_deref(), DASH),
        }
    }
}

#[derive(Template)]
#[template(path = "sections/literature.html")]
struct LiteratureSection {
    articles: Vec<ArticleRow>,
    article_total: usize,
    pubmed_count: Option<String>,
    pubmed_search_url: Option<String>,
    /// Pharmacokinetics preview; when present the entry is shown in full.
    drugbank_pharmacokinetics: Option<String>,
    drugbank_named: bool,
    drugbank_name: String,
    drugbank_href: String,
    drugbank_link: Option<String>,
    registered: Vec<RegisteredRow>,
    registered_total: usize,
}

pub fn render_literature(literature: Option<&Literature>) -> askama::Result<String> {
    let pubmed: Option<&PubMedResults> = literature.and_then(|l| l.pubmed.as_ref());
    let drugbank: Option<&DrugBankEntry> = literature.and_then(|l| l.drugbank.as_ref());
    let grls: Option<&GrlsResults> = literature.and_then(|l| l.grls.as_ref());

    let articles = pubmed.map(|p| p.articles.as_slice()).unwrap_or_default();
    let drugs = grls.map(|g| g.registered_drugs.as_slice()).unwrap_or_default();

    let drugbank_name = drugbank.and_then(|d| d.name.as_deref());
    let drugbank_link = drugbank
        .and_then(|d| d.url.as_deref().or(d.search_url.as_deref()))
        .map(str::to_string);

    LiteratureSection {
        articles: preview(articles).iter().map(ArticleRow::from).collect(),
        article_total: articles.len(),
        pubmed_count: pubmed.and_then(|p| p.count).map(format_number),
        pubmed_search_url: pubmed.and_then(|p| p.search_url.clone()),
        drugbank_pharmacokinetics: drugbank
            .and_then(|d| d.pharmacokinetics.as_deref())
            .map(|pk| truncate_chars(pk, DRUGBANK_PREVIEW_CHARS)),
        drugbank_named: drugbank_name.is_some(),
        drugbank_name: text_or(drugbank_name, DASH),
        drugbank_href: href(drugbank_link.as_deref()),
        drugbank_link,
        registered: preview(drugs).iter().map(RegisteredRow::from).collect(),
        registered_total: drugs.len(),
    }
    .render()
}

// =============================================================================
// Pharmacokinetics
// =============================================================================

struct PkRow {
    label: &'static str,
    value: String,
    unit: String,
}

#[derive(Template)]
#[template(path = "sections/pk.html")]
struct PkSection {
    rows: Vec<PkRow>,
    notice: &'static str,
}

pub fn render_pk(pk: Option<&PkParameters>) -> askama::Result<String> {
    let rows = match pk {
        Some(pk) => [
            ("Cmax", pk.cmax.as_ref(), "N/A"),
            ("AUC", pk.auc.as_ref(), "N/A"),
            ("Tmax", pk.tmax.as_ref(), "N/A"),
            ("T½", pk.t_half.as_ref(), "N/A"),
            ("CVintra", pk.cvintra.as_ref(), "%"),
        ]
        .into_iter()
        .filter_map(|(label, m, default_unit): (&'static str, Option<&Measurement>, &str)| {
            let m = m.filter(|m| m.value.is_some())?;
            Some(PkRow {
                label,
                value: number_or(m.value, DASH),
                unit: text_or(m.unit.as_deref(), default_unit),
            })
        })
        .collect(),
        None => Vec::new(),
    };

    PkSection {
        rows,
        notice: PK_DEFAULTS_NOTICE,
    }
    .render()
}

// =============================================================================
// Design and sample size
// =============================================================================

#[derive(Template)]
#[template(path = "sections/design.html")]
struct DesignSection {
    recommended: String,
    rationale: String,
    cvintra: Option<String>,
    cvintra_source: &'static str,
}

pub fn render_design(design: Option<&DesignRecommendation>) -> askama::Result<String> {
    let cvintra_source = match design.and_then(|d| d.cvintra_source.as_deref()) {
        Some("user_input") => "entered by user",
        Some("database") => "reference database",
        Some("pubmed") => "PubMed",
        _ => "unknown",
    };

    DesignSection {
        recommended: text_or(
            design.and_then(|d| d.recommended_design.as_deref()),
            "Insufficient data",
        ),
        rationale: text_or(design.and_then(|d| d.rationale.as_deref()), DASH),
        cvintra: design.and_then(|d| d.cvintra).map(format_number),
        cvintra_source,
    }
    .render()
}

#[derive(Template)]
#[template(path = "sections/sample_size.html")]
struct SampleSizeSection<'a> {
    design: String,
    cvintra: String,
    base_size: String,
    dropout: String,
    final_size: String,
    steps: &'a [String],
}

pub fn render_sample_size(sample: Option<&SampleSize>) -> askama::Result<String> {
    let percent = |v: Option<f64>| match v {
        Some(v) => format!("{}%", format_number(v)),
        None => DASH.to_string(),
    };

    SampleSizeSection {
        design: text_or(sample.and_then(|s| s.design.as_deref()), DASH),
        cvintra: percent(sample.and_then(|s| s.cvintra)),
        base_size: number_or(sample.and_then(|s| s.base_sample_size), DASH),
        dropout: percent(sample.and_then(|s| s.dropout_rate)),
        final_size: match sample.and_then(|s| s.final_sample_size) {
            Some(n) => format!("{} participants", format_number(n)),
            None => DASH.to_string(),
        },
        steps: sample.map(|s| s.calculation_steps.as_slice()).unwrap_or_default(),
    }
    .render()
}

// =============================================================================
// Regulatory
// =============================================================================

struct JurisdictionRow {
    label: String,
    css_class: &'static str,
    verdict: &'static str,
    requirements: String,
}

impl JurisdictionRow {
    fn new(label: String, compliance: &Compliance) -> Self {
        let (css_class, verdict) = match compliance.compliant {
            Some(true) => ("compliant", "✅ Compliant"),
            Some(false) => ("non-compliant", "❌ Not compliant"),
            None => ("unknown", DASH),
        };
        Self {
            label,
            css_class,
            verdict,
            requirements: text_or(compliance.requirements.as_deref(), DASH),
        }
    }
}

#[derive(Template)]
#[template(path = "sections/regulatory.html")]
struct RegulatorySection {
    jurisdictions: Vec<JurisdictionRow>,
}

pub fn render_regulatory(
    regulatory: Option<&BTreeMap<String, Compliance>>,
) -> askama::Result<String> {
    let jurisdictions = match regulatory {
        Some(checks) => {
            let known = KNOWN_JURISDICTIONS
                .iter()
                .filter_map(|(key, label)| checks.get(*key).map(|c| (label.to_string(), c)));
            let others = checks
                .iter()
                .filter(|(key, _)| !KNOWN_JURISDICTIONS.iter().any(|(k, _)| *k == key.as_str()))
                .map(|(key, c)| (key.to_uppercase(), c));
            known
                .chain(others)
                .map(|(label, compliance)| JurisdictionRow::new(label, compliance))
                .collect()
        }
        None => Vec::new(),
    };

    RegulatorySection { jurisdictions }.render()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(n: usize) -> Article {
        Article {
            title: Some(format!("Study {}", n)),
            authors: vec!["Smith J".to_string(), "Doe A".to_string()],
            year: Some("2020".to_string()),
            url: Some(format!("https://pubmed.ncbi.nlm.nih.gov/{}", n)),
        }
    }

    #[test]
    fn every_renderer_tolerates_missing_sections() {
        let literature = render_literature(None).unwrap();
        assert!(literature.contains("No articles found"));
        assert!(literature.contains("No data found"));
        assert!(render_pk(None).unwrap().contains("No PK parameters found"));
        assert!(render_design(None).unwrap().contains("Insufficient data"));
        assert!(render_sample_size(None).unwrap().contains(DASH));
        assert!(render_regulatory(None).unwrap().contains("No data found"));
    }

    #[test]
    fn renderers_tolerate_empty_sections() {
        let empty = Literature::default();
        assert!(render_literature(Some(&empty))
            .unwrap()
            .contains("Not found in the GRLS register"));
        assert!(render_pk(Some(&PkParameters::default()))
            .unwrap()
            .contains("No PK parameters found"));
        assert!(render_design(Some(&DesignRecommendation::default()))
            .unwrap()
            .contains("Insufficient data"));
        assert!(render_sample_size(Some(&SampleSize::default()))
            .unwrap()
            .contains(DASH));
        assert!(render_regulatory(Some(&BTreeMap::new())).unwrap().contains("No data found"));
    }

    #[test]
    fn pubmed_shows_at_most_five_articles() {
        let literature = Literature {
            pubmed: Some(PubMedResults {
                articles: (1..=7).map(article).collect(),
                count: Some(7.0),
                search_url: None,
            }),
            ..Literature::default()
        };

        let html = render_literature(Some(&literature)).unwrap();

        assert_eq!(html.matches("<li class=\"article\">").count(), 5);
        assert!(html.contains("Study 5"));
        assert!(!html.contains("Study 6"));
        assert!(html.contains("Showing 5 of 7 articles"));
        assert!(html.contains("<strong>PubMed articles:</strong> 7"));
    }

    #[test]
    fn article_without_fields_uses_placeholders() {
        let literature = Literature {
            pubmed: Some(PubMedResults {
                articles: vec![Article::default()],
                ..PubMedResults::default()
            }),
            ..Literature::default()
        };
        let html = render_literature(Some(&literature)).unwrap();
        assert!(html.contains("No title"));
        assert!(html.contains("Unknown (N/A)"));
        assert!(html.contains("href=\"#\""));
        assert!(!html.contains("preview-note"));
    }

    #[test]
    fn grls_previews_registered_products() {
        let literature = Literature {
            grls: Some(GrlsResults {
                registered_drugs: (0..6)
                    .map(|i| RegisteredDrug {
                        name: Some(format!("Brand {}", i)),
                        dosage_form: None,
                        manufacturer: Some("Pharma".to_string()),
                    })
                    .collect(),
                ..GrlsResults::default()
            }),
            ..Literature::default()
        };
        let html = render_literature(Some(&literature)).unwrap();
        assert!(html.contains("Found 6 registered products"));
        assert_eq!(html.matches("<li class=\"registered-drug\">").count(), 5);
        assert!(html.contains("Brand 0</strong> - — (Pharma)"));
        assert!(html.contains("Showing 5 of 6 registered products"));
    }

    #[test]
    fn drugbank_pharmacokinetics_is_previewed() {
        let literature = Literature {
            drugbank: Some(DrugBankEntry {
                name: Some("Ibuprofen".to_string()),
                pharmacokinetics: Some("x".repeat(500)),
                url: None,
                search_url: Some("https://go.drugbank.com/drugs/search?q=ibuprofen".to_string()),
            }),
            ..Literature::default()
        };
        let html = render_literature(Some(&literature)).unwrap();
        assert!(html.contains(&format!("{}…", "x".repeat(400))));
        assert!(!html.contains(&"x".repeat(401)));
        assert!(html.contains("search?q=ibuprofen"));
        assert!(html.contains("Open in DrugBank"));
    }

    #[test]
    fn drugbank_name_only_links_to_search() {
        let literature = Literature {
            drugbank: Some(DrugBankEntry {
                name: Some("Ibuprofen".to_string()),
                search_url: Some("https://go.drugbank.com/drugs/search?q=ibuprofen".to_string()),
                ..DrugBankEntry::default()
            }),
            ..Literature::default()
        };
        let html = render_literature(Some(&literature)).unwrap();
        assert!(html.contains("<strong>Ibuprofen</strong>"));
        assert!(html.contains("Search DrugBank"));
        assert!(!html.contains("Pharmacokinetics:"));
    }

    #[test]
    fn pk_table_lists_only_present_parameters() {
        let pk = PkParameters {
            cmax: Some(Measurement {
                value: Some(12.3),
                unit: Some("µg/mL".to_string()),
            }),
            // Unit without a value is not a reported parameter
            auc: Some(Measurement {
                value: None,
                unit: Some("h·µg/mL".to_string()),
            }),
            ..PkParameters::default()
        };

        let html = render_pk(Some(&pk)).unwrap();

        assert_eq!(html.matches("<tr class=\"pk-row\">").count(), 1);
        assert!(html.contains("<td><strong>Cmax</strong></td><td>12.3</td><td>µg/mL</td>"));
        assert!(!html.contains("AUC"));
        assert!(html.contains(PK_DEFAULTS_NOTICE));
    }

    #[test]
    fn cvintra_row_defaults_to_percent() {
        let pk = PkParameters {
            cvintra: Some(Measurement {
                value: Some(23.0),
                unit: None,
            }),
            ..PkParameters::default()
        };
        assert!(render_pk(Some(&pk)).unwrap().contains("<td>23</td><td>%</td>"));
    }

    #[test]
    fn design_shows_cvintra_source() {
        let design = DesignRecommendation {
            recommended_design: Some("2×2 Cross-over".to_string()),
            rationale: None,
            cvintra: Some(20.0),
            cvintra_source: Some("database".to_string()),
        };
        let html = render_design(Some(&design)).unwrap();
        assert!(html.contains("<h4>2×2 Cross-over</h4>"));
        assert!(html.contains("20% (source: reference database)"));
    }

    #[test]
    fn sample_size_renders_values_and_steps() {
        let sample = SampleSize {
            design: Some("2×2 Cross-over".to_string()),
            cvintra: Some(25.0),
            base_sample_size: Some(20.0),
            dropout_rate: Some(20.0),
            final_sample_size: Some(26.0),
            calculation_steps: vec!["1. σ² = 0.0606".to_string(), "2. ln(θ₁) = -0.2231".to_string()],
        };
        let html = render_sample_size(Some(&sample)).unwrap();
        assert!(html.contains("26 participants"));
        assert!(html.contains("<td>CVintra</td><td>25%</td>"));
        assert_eq!(html.matches("<li>").count(), 2);
    }

    #[test]
    fn regulatory_orders_known_jurisdictions_first() {
        let mut checks = BTreeMap::new();
        checks.insert(
            "anvisa".to_string(),
            Compliance {
                compliant: Some(false),
                requirements: None,
            },
        );
        checks.insert(
            "fda".to_string(),
            Compliance {
                compliant: Some(true),
                requirements: Some("BE must be demonstrated".to_string()),
            },
        );
        checks.insert("ema".to_string(), Compliance::default());

        let html = render_regulatory(Some(&checks)).unwrap();

        let ema = html.find("EMA Guidelines").unwrap();
        let fda = html.find("FDA Guidance").unwrap();
        let anvisa = html.find("ANVISA").unwrap();
        assert!(ema < fda && fda < anvisa);
        assert!(html.contains("✅ Compliant"));
        assert!(html.contains("❌ Not compliant"));
        assert!(html.contains("BE must be demonstrated"));
    }

    #[test]
    fn backend_text_is_escaped() {
        let design = DesignRecommendation {
            recommended_design: Some("<script>alert(1)</script>".to_string()),
            ..DesignRecommendation::default()
        };
        let html = render_design(Some(&design)).unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));

        let literature = Literature {
            pubmed: Some(PubMedResults {
                articles: vec![Article {
                    title: Some("AUC & Cmax <b>".to_string()),
                    url: Some("\" onmouseover=\"x".to_string()),
                    ..Article::default()
                }],
                ..PubMedResults::default()
            }),
            ..Literature::default()
        };
        let html = render_literature(Some(&literature)).unwrap();
        assert!(html.contains("AUC &amp; Cmax &lt;b&gt;"));
        assert!(!html.contains("\" onmouseover"));
    }
}

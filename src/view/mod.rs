//! Declarative page rendering.
//!
//! The page is a pure function of the controller's snapshot: every render
//! computes the full visible output, so no region can be left stale.

pub mod markup;
pub mod sections;

use askama::Template;
use std::sync::Arc;

use crate::domain::{AnalysisDocument, SavedDocument};

/// UI state driven by the view controller.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum UiState {
    #[default]
    Idle,
    Loading,
    Success(Arc<AnalysisDocument>),
    Error(String),
}

impl UiState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Success(_) => "success",
            Self::Error(_) => "error",
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error(msg) => Some(msg),
            _ => None,
        }
    }
}

/// Everything the page shows at one instant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewSnapshot {
    pub state: UiState,
    /// Most recently saved synopsis, shown until the next action starts.
    pub download: Option<SavedDocument>,
}

/// Rendered markup for the results region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsView {
    pub literature: String,
    pub pk: String,
    pub design: String,
    pub sample_size: String,
    pub regulatory: String,
}

/// Visible regions of the page. A `None` region is hidden.
#[derive(Debug, Clone, Default, PartialEq, Eq, Template)]
#[template(path = "page.html")]
pub struct PageView {
    pub loading: bool,
    pub error: Option<String>,
    pub results: Option<ResultsView>,
    pub download: Option<SavedDocument>,
}

pub fn render_page(snapshot: &ViewSnapshot) -> askama::Result<PageView> {
    let results = match &snapshot.state {
        UiState::Success(document) => {
            let result = document.result();
            Some(ResultsView {
                literature: sections::render_literature(result.literature.as_ref())?,
                pk: sections::render_pk(result.pk_parameters.as_ref())?,
                design: sections::render_design(result.design_recommendation.as_ref())?,
                sample_size: sections::render_sample_size(result.sample_size.as_ref())?,
                regulatory: sections::render_regulatory(result.regulatory_check.as_ref())?,
            })
        }
        _ => None,
    };

    let download = match snapshot.state {
        UiState::Loading | UiState::Error(_) => None,
        _ => snapshot.download.clone(),
    };

    Ok(PageView {
        loading: snapshot.state.is_loading(),
        error: snapshot.state.error_message().map(str::to_string),
        results,
        download,
    })
}

impl PageView {
    /// Standalone HTML document containing only the visible regions.
    pub fn to_html(&self) -> askama::Result<String> {
        self.render()
    }
}

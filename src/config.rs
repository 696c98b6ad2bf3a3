use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use url::Url;

/// Backend address used when neither an explicit base URL nor a page origin is configured.
pub const LOOPBACK_API_BASE: &str = "http://127.0.0.1:8000/api";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Staging,
    Prod,
}

impl Environment {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "prod" | "production" => Self::Prod,
            "staging" => Self::Staging,
            _ => Self::Dev,
        }
    }

    pub fn is_dev(&self) -> bool {
        matches!(self, Self::Dev)
    }

    pub fn is_prod(&self) -> bool {
        matches!(self, Self::Prod)
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub env: Environment,

    // Analysis API
    pub api_base_url: String,
    pub api_timeout_seconds: Option<u64>,
    pub health_timeout_seconds: u64,

    // Saved synopsis documents
    pub download_dir: PathBuf,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let env = Environment::from_str(&env::var("ENV").unwrap_or_else(|_| "dev".to_string()));

        // Analysis API
        let explicit_base = env::var("API_BASE_URL").ok();
        let origin = env::var("APP_ORIGIN").ok();
        let api_base_url = resolve_api_base(explicit_base.as_deref(), origin.as_deref())?;

        // Unset means no timeout on analysis calls
        let api_timeout_seconds = env::var("API_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok());
        let health_timeout_seconds = env::var("HEALTH_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        let download_dir = env::var("DOWNLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("downloads"));

        Ok(Settings {
            env,
            api_base_url,
            api_timeout_seconds,
            health_timeout_seconds,
            download_dir,
        })
    }

    /// Replace the API base with an explicitly supplied one.
    pub fn with_api_base(mut self, base: &str) -> Result<Self> {
        self.api_base_url = resolve_api_base(Some(base), None)?;
        Ok(self)
    }
}

/// Resolve the analysis API prefix.
///
/// An explicit base wins. Otherwise a served page talks to `{origin}/api`
/// on its own host, and a page without an origin (opened from disk, where
/// browsers report the literal `"null"`) falls back to the loopback backend.
pub fn resolve_api_base(explicit: Option<&str>, origin: Option<&str>) -> Result<String> {
    let candidate = match (non_blank(explicit), non_blank(origin)) {
        (Some(base), _) => base.to_string(),
        (None, Some(origin)) if origin != "null" => {
            format!("{}/api", origin.trim_end_matches('/'))
        }
        _ => LOOPBACK_API_BASE.to_string(),
    };

    Url::parse(&candidate).with_context(|| format!("Invalid API base URL: {}", candidate))?;

    Ok(candidate.trim_end_matches('/').to_string())
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

use anyhow::{bail, Context, Result};
use std::env;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://movie-api-production-3803.up.railway.app/api/movies";

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogConfig {
    pub base_url: String,
    /// `None` leaves the transport default in place.
    pub timeout: Option<Duration>,
}

impl CatalogConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base_url(&base_url.into()),
            timeout: None,
        }
    }

    pub fn from_env() -> Result<Self> {
        let base_url = env::var("CATALOG_API_URL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let timeout = parse_timeout(env::var("CATALOG_TIMEOUT_SECS").ok().as_deref())?;
        Ok(Self {
            base_url: normalize_base_url(&base_url),
            timeout,
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = normalize_base_url(base_url);
        self
    }
}

fn parse_timeout(raw: Option<&str>) -> Result<Option<Duration>> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    let secs: u64 = raw
        .parse()
        .with_context(|| format!("CATALOG_TIMEOUT_SECS is not a number: {raw}"))?;
    if secs == 0 {
        bail!("CATALOG_TIMEOUT_SECS must be at least 1 (unset it to use no timeout)");
    }
    Ok(Some(Duration::from_secs(secs)))
}

fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

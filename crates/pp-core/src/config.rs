//! Engine configuration with environment overrides.

use crate::ErrorKind;
use crate::LocatorError;
use crate::LocatorResult;
use std::time::Duration;

pub const PROXY_URL_ENV: &str = "PINPOINT_PROXY_URL";
pub const DEBOUNCE_MS_ENV: &str = "PINPOINT_DEBOUNCE_MS";
pub const FETCH_TIMEOUT_MS_ENV: &str = "PINPOINT_FETCH_TIMEOUT_MS";
pub const PRESENTATION_ENV: &str = "PINPOINT_PRESENTATION";

const DEFAULT_PROXY_ENDPOINT: &str = "http://localhost:3000/proxy";

/// How a click on a highlighted match is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PresentationMode {
    /// Keep the full indexed table and move to the page holding the clicked match.
    #[default]
    IndexedTable,
    /// Replace the table with a one-row detail view of the clicked match.
    DetailRow,
}

impl PresentationMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::IndexedTable => "table",
            Self::DetailRow => "detail",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "table" | "indexed" => Some(Self::IndexedTable),
            "detail" | "row" => Some(Self::DetailRow),
            _ => None,
        }
    }
}

/// Runtime knobs for the locator engine and its proxy client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Proxy endpoint; the target page URL is passed in its `url` query parameter.
    pub proxy_endpoint: String,
    /// Quiet period after the last keystroke before a search runs.
    pub debounce_quiet_period: Duration,
    pub min_query_chars: usize,
    /// Socket connect/read/write timeout for the proxy fetch.
    pub fetch_timeout: Duration,
    pub presentation_mode: PresentationMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            proxy_endpoint: DEFAULT_PROXY_ENDPOINT.to_owned(),
            debounce_quiet_period: Duration::from_millis(300),
            min_query_chars: 3,
            fetch_timeout: Duration::from_secs(10),
            presentation_mode: PresentationMode::IndexedTable,
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by `PINPOINT_*` environment variables.
    pub fn from_env() -> LocatorResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> LocatorResult<Self> {
        let mut config = Self::default();

        if let Some(endpoint) = lookup(PROXY_URL_ENV) {
            config.proxy_endpoint = endpoint.trim().to_owned();
        }

        if let Some(raw) = lookup(DEBOUNCE_MS_ENV) {
            config.debounce_quiet_period = parse_millis(DEBOUNCE_MS_ENV, &raw)?;
        }

        if let Some(raw) = lookup(FETCH_TIMEOUT_MS_ENV) {
            config.fetch_timeout = parse_millis(FETCH_TIMEOUT_MS_ENV, &raw)?;
        }

        if let Some(raw) = lookup(PRESENTATION_ENV) {
            config.presentation_mode = PresentationMode::from_name(&raw).ok_or_else(|| {
                LocatorError::new(
                    ErrorKind::Config,
                    "config.presentation_invalid",
                    format!("{PRESENTATION_ENV} must be `table` or `detail`, got `{raw}`"),
                )
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> LocatorResult<()> {
        if self.proxy_endpoint.is_empty() {
            return Err(LocatorError::new(
                ErrorKind::Config,
                "config.proxy_endpoint_empty",
                "proxy endpoint must not be empty",
            ));
        }

        if self.min_query_chars == 0 {
            return Err(LocatorError::new(
                ErrorKind::Config,
                "config.min_query_chars_zero",
                "minimum query length must be at least one character",
            ));
        }

        if self.fetch_timeout.is_zero() {
            return Err(LocatorError::new(
                ErrorKind::Config,
                "config.fetch_timeout_zero",
                "fetch timeout must be non-zero",
            ));
        }

        Ok(())
    }
}

fn parse_millis(name: &str, raw: &str) -> LocatorResult<Duration> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|error| {
            LocatorError::new(
                ErrorKind::Config,
                "config.duration_invalid",
                format!("{name} must be a whole number of milliseconds, got `{raw}`: {error}"),
            )
        })
}

use std::env;
use url::Url;

const DEFAULT_PORT: u16 = 4030;
const DEFAULT_RATE_LIMIT_RPM: u64 = 120;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
const MIN_TOKEN_LEN: usize = 32;

#[derive(Clone)]
pub struct ProviderConfig {
    /// Server port
    pub port: u16,
    /// Swiss Bitcoin Pay API base URL
    pub sbp_api_url: String,
    /// Wix REST base URL for secrets, site URLs and event submission
    pub platform_api_url: String,
    /// Bearer token presented to the Wix REST API
    pub platform_api_token: String,
    /// Bearer token Wix must present on the provider endpoints
    pub platform_token: Vec<u8>,
    /// Bearer token required for /metrics (None = forbidden unless opted in)
    pub metrics_token: Option<Vec<u8>>,
    /// Serve /metrics without a token when none is configured
    pub public_metrics: bool,
    /// Rate limit requests per minute per IP
    pub rate_limit_rpm: u64,
    /// Timeout for every outbound request
    pub http_timeout_secs: u64,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("port", &self.port)
            .field("sbp_api_url", &self.sbp_api_url)
            .field("platform_api_url", &self.platform_api_url)
            .field("platform_api_token", &"[REDACTED]")
            .field("platform_token", &"[REDACTED]")
            .field(
                "metrics_token",
                &self.metrics_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("public_metrics", &self.public_metrics)
            .field("rate_limit_rpm", &self.rate_limit_rpm)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .finish()
    }
}

impl ProviderConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match var("PORT") {
            Some(p) => p.trim().parse().map_err(|_| ConfigError::InvalidPort(p))?,
            None => DEFAULT_PORT,
        };

        let sbp_api_url = var("SBP_API_URL").unwrap_or_else(|| sbp::API_URL.to_string());
        Url::parse(&sbp_api_url).map_err(|_| ConfigError::InvalidUrl(sbp_api_url.clone()))?;

        let platform_api_url =
            var("PLATFORM_API_URL").ok_or(ConfigError::MissingRequired("PLATFORM_API_URL"))?;
        Url::parse(&platform_api_url)
            .map_err(|_| ConfigError::InvalidUrl(platform_api_url.clone()))?;

        let platform_api_token =
            var("PLATFORM_API_TOKEN").ok_or(ConfigError::MissingRequired("PLATFORM_API_TOKEN"))?;

        let platform_token = var("PLATFORM_TOKEN")
            .ok_or(ConfigError::MissingRequired("PLATFORM_TOKEN"))?
            .into_bytes();
        if platform_token.len() < MIN_TOKEN_LEN {
            tracing::warn!(
                "PLATFORM_TOKEN is only {} bytes (minimum {MIN_TOKEN_LEN} recommended); \
                 use `openssl rand -hex 32` to generate a secure token",
                platform_token.len()
            );
        }

        let metrics_token = var("METRICS_TOKEN").map(String::into_bytes);
        let public_metrics = match var("SBP_PUBLIC_METRICS") {
            Some(v) => parse_flag(&v).ok_or(ConfigError::InvalidFlag("SBP_PUBLIC_METRICS", v))?,
            None => false,
        };
        match (&metrics_token, public_metrics) {
            (Some(_), true) => {
                tracing::warn!("SBP_PUBLIC_METRICS ignored: METRICS_TOKEN is set");
            }
            (None, true) => tracing::info!("/metrics is public (SBP_PUBLIC_METRICS)"),
            (None, false) => {
                tracing::warn!("METRICS_TOKEN not set; /metrics is disabled unless SBP_PUBLIC_METRICS=true");
            }
            (Some(_), false) => {}
        }

        let rate_limit_rpm = var("RATE_LIMIT_RPM")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(DEFAULT_RATE_LIMIT_RPM);

        let http_timeout_secs = var("HTTP_TIMEOUT_SECS")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);

        Ok(Self {
            port,
            sbp_api_url,
            platform_api_url,
            platform_api_token,
            platform_token,
            metrics_token,
            public_metrics,
            rate_limit_rpm,
            http_timeout_secs,
        })
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingRequired(&'static str),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("invalid port: {0}")]
    InvalidPort(String),

    #[error("invalid value for {0}: {1:?} (expected true/false/1/0)")]
    InvalidFlag(&'static str, String),
}

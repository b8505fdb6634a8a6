/// Swiss Bitcoin Pay production API.
pub const API_URL: &str = "https://api.swiss-bitcoin-pay.ch";

/// Header carrying `sha256=<hex>` on both outbound calls and inbound webhooks.
pub const SIG_HEADER: &str = "sbp-sig";

/// Header carrying the merchant API key on outbound calls.
pub const API_KEY_HEADER: &str = "api-key";

/// Prefix of every signature header value.
pub const SIG_PREFIX: &str = "sha256=";

/// Name of the merchant HMAC secret in the Wix secret vault.
pub const SECRET_NAME: &str = "sbp_hmacSecret";

pub const SECRET_DESCRIPTION: &str = "SBP HMAC Secret";

/// Path of the webhook endpoint, appended to the published site URL.
pub const WEBHOOK_PATH: &str = "/_functions/updateTransaction/";

/// Invoice settlement delay sent with every checkout (processor-defined unit).
pub const SETTLEMENT_DELAY: u32 = 60;

/// Wix reason code attached to an expired invoice.
pub const INVOICE_EXPIRED_REASON_CODE: u32 = 3035;
pub const INVOICE_EXPIRED_ERROR_CODE: &str = "INVOICE_EXPIRED";
pub const INVOICE_EXPIRED_MESSAGE: &str = "Invoice expired";

pub const REFUND_NOT_SUPPORTED_REASON_CODE: u32 = 404;
pub const REFUND_NOT_SUPPORTED_ERROR_CODE: &str = "REFUND_NOT_SUPPORTED";
pub const REFUND_NOT_SUPPORTED_MESSAGE: &str = "Refund not supported";

/// Runtime processor configuration. Lets tests and staging point the adapter
/// at a different SBP deployment without touching the constants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorConfig {
    pub api_url: String,
    pub settlement_delay: u32,
    pub on_chain: bool,
}

impl Default for ProcessorConfig {
    /// Defaults to the SBP production API.
    fn default() -> Self {
        Self {
            api_url: API_URL.to_string(),
            settlement_delay: SETTLEMENT_DELAY,
            on_chain: true,
        }
    }
}

impl ProcessorConfig {
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Join an endpoint path onto the API base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_url.trim_end_matches('/'), path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slash() {
        let config = ProcessorConfig::default().with_api_url("http://127.0.0.1:9999/");
        assert_eq!(config.endpoint("/checkout"), "http://127.0.0.1:9999/checkout");
    }

    #[test]
    fn default_points_at_production() {
        let config = ProcessorConfig::default();
        assert_eq!(config.endpoint("/hmac-check"), format!("{API_URL}/hmac-check"));
        assert_eq!(config.settlement_delay, 60);
        assert!(config.on_chain);
    }
}

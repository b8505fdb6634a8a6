//! HTTP client for the Swiss Bitcoin Pay API.
//!
//! Every request body is serialized once; those exact bytes are both signed
//! (`sbp-sig`) and sent.

use std::time::Duration;

use crate::constants::{ProcessorConfig, API_KEY_HEADER, SIG_HEADER};
use crate::error::SbpError;
use crate::hmac;
use crate::payment::{
    CheckoutResponse, Credentials, HmacCheckRequest, HmacCheckResponse, InvoiceRequest,
};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Outcome of `POST /hmac-check`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HmacCheck {
    /// Whether SBP answered with a 2xx status.
    pub accepted: bool,
    pub account_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ProcessorClient {
    client: reqwest::Client,
    config: ProcessorConfig,
}

impl ProcessorClient {
    pub fn new(config: ProcessorConfig) -> Result<Self, SbpError> {
        Self::with_timeout(config, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(config: ProcessorConfig, timeout: Duration) -> Result<Self, SbpError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| SbpError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    async fn post_signed(
        &self,
        path: &str,
        credentials: &Credentials,
        body: Vec<u8>,
    ) -> Result<reqwest::Response, SbpError> {
        let url = self.config.endpoint(path);
        let sig = hmac::signature_header(credentials.hmac_secret.as_bytes(), &body);

        self.client
            .post(&url)
            .header("Content-Type", "application/json")
            .header(API_KEY_HEADER, credentials.api_key.as_str())
            .header(SIG_HEADER, sig)
            .body(body)
            .send()
            .await
            .map_err(|e| SbpError::Http(format!("{path} request failed: {e}")))
    }

    /// Ask SBP to validate the merchant's key and secret.
    ///
    /// Only transport failures are errors; the caller decides what a
    /// rejected check means.
    pub async fn hmac_check(&self, credentials: &Credentials) -> Result<HmacCheck, SbpError> {
        let body = serde_json::to_vec(&HmacCheckRequest { test: true })?;
        let resp = self.post_signed("/hmac-check", credentials, body).await?;

        let accepted = resp.status().is_success();
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| SbpError::Http(format!("/hmac-check body read failed: {e}")))?;
        let parsed: HmacCheckResponse = serde_json::from_slice(&bytes).unwrap_or_default();

        Ok(HmacCheck {
            accepted,
            account_name: parsed.account_name,
        })
    }

    /// Create an invoice and return its id and hosted checkout URL.
    pub async fn create_checkout(
        &self,
        credentials: &Credentials,
        invoice: &InvoiceRequest,
    ) -> Result<CheckoutResponse, SbpError> {
        let body = serde_json::to_vec(invoice)?;
        let resp = self.post_signed("/checkout", credentials, body).await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SbpError::Http(format!("checkout rejected with status {status}")));
        }

        resp.json::<CheckoutResponse>()
            .await
            .map_err(|e| SbpError::Http(format!("checkout response parse failed: {e}")))
    }
}

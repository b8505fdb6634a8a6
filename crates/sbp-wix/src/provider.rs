//! Outbound adapter: the three Wix payment-provider operations.
//!
//! Each call is independent and stateless. The only state touched is the
//! merchant secret in the Wix vault (on connect) and the SBP invoice (on
//! create).

use std::sync::Arc;

use crate::constants::{ProcessorConfig, SECRET_DESCRIPTION, SECRET_NAME, WEBHOOK_PATH};
use crate::currency::{self, MajorAmount};
use crate::error::SbpError;
use crate::payment::{
    ConnectAccountRequest, ConnectAccountResponse, CreateTransactionRequest,
    CreateTransactionResponse, InvoiceData, InvoiceExtra, InvoiceItem, InvoiceRequest, Order,
    RefundTransactionRequest, RefundTransactionResponse, WebhookTarget,
};
use crate::platform::{self, NewSecret, SecretStore, SiteUrls};
use crate::processor_client::ProcessorClient;

/// Webhook callback URL for a published site.
pub fn webhook_url(site_url: &str) -> String {
    format!("{}{}", site_url.trim_end_matches('/'), WEBHOOK_PATH)
}

/// Translate a Wix order into an SBP invoice request.
///
/// Amounts are divided by `10^(digits + 1)` for the order currency; a
/// currency missing from the table fails the whole request.
pub fn build_invoice(
    config: &ProcessorConfig,
    order: &Order,
    wix_transaction_id: &str,
    webhook_url: String,
) -> Result<InvoiceRequest, SbpError> {
    let description = &order.description;
    let divider = currency::divider(&description.currency)?;

    let items = description
        .items
        .iter()
        .map(|item| InvoiceItem {
            name: item.name.clone(),
            quantity: item.quantity,
            unit_price_with_vat: MajorAmount::from_minor(item.price, divider),
        })
        .collect();

    Ok(InvoiceRequest {
        amount: MajorAmount::from_minor(description.total_amount as f64, divider),
        unit: description.currency.clone(),
        title: format!("Wix Order {}", order.id),
        redirect_after_paid: order.return_urls.success_url.clone(),
        delay: config.settlement_delay,
        on_chain: config.on_chain,
        webhook: WebhookTarget { url: webhook_url },
        invoice_data: InvoiceData { items },
        extra: InvoiceExtra {
            wix_transaction_id: wix_transaction_id.to_string(),
        },
    })
}

pub struct PaymentProvider {
    processor: ProcessorClient,
    secrets: Arc<dyn SecretStore>,
    site_urls: Arc<dyn SiteUrls>,
}

impl PaymentProvider {
    pub fn new(
        processor: ProcessorClient,
        secrets: Arc<dyn SecretStore>,
        site_urls: Arc<dyn SiteUrls>,
    ) -> Self {
        Self {
            processor,
            secrets,
            site_urls,
        }
    }

    pub fn secrets(&self) -> &Arc<dyn SecretStore> {
        &self.secrets
    }

    /// Verify the merchant's credentials with SBP and store the HMAC secret.
    ///
    /// The secret is stored even when SBP rejects the check; the rejection is
    /// only logged.
    pub async fn connect_account(
        &self,
        request: &ConnectAccountRequest,
    ) -> Result<ConnectAccountResponse, SbpError> {
        let credentials = &request.credentials;
        let check = self.processor.hmac_check(credentials).await?;

        if !check.accepted {
            tracing::warn!(
                api_key = %credentials.api_key,
                "SBP hmac-check rejected the credentials; storing them anyway"
            );
        }

        platform::upsert_secret(
            self.secrets.as_ref(),
            &NewSecret {
                name: SECRET_NAME.to_string(),
                description: SECRET_DESCRIPTION.to_string(),
                value: credentials.hmac_secret.clone(),
            },
        )
        .await?;

        tracing::info!(
            account_name = check.account_name.as_deref().unwrap_or("unknown"),
            "merchant account connected"
        );

        Ok(ConnectAccountResponse {
            credentials: credentials.clone(),
            account_name: check.account_name,
        })
    }

    /// Create an SBP invoice for a Wix order.
    pub async fn create_transaction(
        &self,
        request: &CreateTransactionRequest,
    ) -> Result<CreateTransactionResponse, SbpError> {
        let urls = self.site_urls.list_published_site_urls().await?;
        let site_url = platform::primary_site_url(&urls)
            .ok_or_else(|| SbpError::Platform("no primary published site url".to_string()))?;

        let invoice = build_invoice(
            self.processor.config(),
            &request.order,
            &request.wix_transaction_id,
            webhook_url(site_url),
        )?;

        let checkout = self
            .processor
            .create_checkout(&request.merchant_credentials, &invoice)
            .await?;

        tracing::info!(
            wix_transaction_id = %request.wix_transaction_id,
            invoice_id = %checkout.id,
            currency = %invoice.unit,
            amount = invoice.amount.value(),
            "invoice created"
        );

        Ok(CreateTransactionResponse {
            plugin_transaction_id: checkout.id,
            redirect_url: checkout.checkout_url,
        })
    }

    /// Refunds are not supported by SBP; always declined, SBP is never called.
    pub fn refund_transaction(&self, request: &RefundTransactionRequest) -> RefundTransactionResponse {
        tracing::info!(
            plugin_transaction_id = %request.plugin_transaction_id,
            "refund declined: not supported"
        );
        RefundTransactionResponse::not_supported(request.plugin_transaction_id.as_str())
    }
}

//! Invoice webhook verification and translation.
//!
//! SBP signs each callback body with the merchant's HMAC secret and sends
//! `sbp-sig: sha256=<hex>`. The raw body bytes are the HMAC input; the body is
//! only parsed after the signature checks out.

use thiserror::Error;

use crate::hmac;
use crate::payment::{InvoiceStatus, InvoiceWebhook, TransactionEvent};

#[derive(Debug, Error)]
pub enum WebhookError {
    /// Received header and computed digest differ. Both values are kept for
    /// the audit log; neither reveals the secret.
    #[error("signature mismatch: received {received:?}, computed {computed:?}")]
    SignatureMismatch { received: String, computed: String },

    #[error("invalid webhook body: {0}")]
    InvalidBody(String),
}

/// Authenticate a raw webhook body, then parse it.
pub fn verify_and_parse(
    secret: &[u8],
    raw_body: &[u8],
    signature: &str,
) -> Result<InvoiceWebhook, WebhookError> {
    if !hmac::verify_signature_header(secret, raw_body, signature) {
        return Err(WebhookError::SignatureMismatch {
            received: signature.to_string(),
            computed: hmac::signature_header(secret, raw_body),
        });
    }

    serde_json::from_slice(raw_body).map_err(|e| WebhookError::InvalidBody(e.to_string()))
}

/// The Wix transaction event an invoice update maps to, if any.
///
/// `settled` approves the transaction, `expired` declines it with
/// `INVOICE_EXPIRED`; every other status is acknowledged without an event.
/// The invoice id and `extra.wixTransactionId` are only required for the two
/// statuses that produce an event.
pub fn transaction_event(webhook: &InvoiceWebhook) -> Result<Option<TransactionEvent>, WebhookError> {
    if let InvoiceStatus::Other(_) = webhook.status {
        return Ok(None);
    }

    let invoice_id = webhook
        .id
        .as_deref()
        .ok_or_else(|| WebhookError::InvalidBody(format!("{} invoice without id", webhook.status)))?;
    let wix_transaction_id = webhook
        .extra
        .as_ref()
        .map(|extra| extra.wix_transaction_id.as_str())
        .ok_or_else(|| {
            WebhookError::InvalidBody(format!(
                "{} invoice without extra.wixTransactionId",
                webhook.status
            ))
        })?;

    let event = match webhook.status {
        InvoiceStatus::Expired => TransactionEvent::invoice_expired(wix_transaction_id, invoice_id),
        _ => TransactionEvent::approved(wix_transaction_id, invoice_id),
    };
    Ok(Some(event))
}

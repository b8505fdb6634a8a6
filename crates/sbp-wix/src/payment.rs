//! Wire types for both sides of the adapter.
//!
//! Wix-facing types mirror the payment-provider SPI (`camelCase`, Wix field
//! names). SBP-facing types mirror the checkout API. Unknown fields are
//! ignored everywhere so either side can grow its payloads.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{
    INVOICE_EXPIRED_ERROR_CODE, INVOICE_EXPIRED_MESSAGE, INVOICE_EXPIRED_REASON_CODE,
    REFUND_NOT_SUPPORTED_ERROR_CODE, REFUND_NOT_SUPPORTED_MESSAGE,
    REFUND_NOT_SUPPORTED_REASON_CODE,
};
use crate::currency::MajorAmount;

// ---------------------------------------------------------------------------
// Merchant credentials
// ---------------------------------------------------------------------------

/// Merchant-entered SBP credentials.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub api_key: String,
    pub hmac_secret: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, hmac_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            hmac_secret: hmac_secret.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("hmac_secret", &"[REDACTED]")
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Wix payment-provider SPI
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub name: String,
    pub quantity: u32,
    /// Unit price, same integer scale as `OrderDescription::total_amount`.
    /// Wix sends it as a decimal string.
    #[serde(deserialize_with = "serde_num::f64_from_number_or_string")]
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDescription {
    /// ISO 4217 code; must be present in the currency table.
    pub currency: String,
    #[serde(deserialize_with = "serde_num::u64_from_number_or_string")]
    pub total_amount: u64,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnUrls {
    pub success_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: String,
    pub description: OrderDescription,
    pub return_urls: ReturnUrls,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectAccountRequest {
    pub credentials: Credentials,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectAccountResponse {
    pub credentials: Credentials,
    /// Read from the SBP `hmac-check` response; `None` when SBP sent none.
    pub account_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionRequest {
    pub wix_transaction_id: String,
    pub order: Order,
    pub merchant_credentials: Credentials,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionResponse {
    /// SBP invoice id.
    pub plugin_transaction_id: String,
    /// SBP hosted checkout page.
    pub redirect_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundTransactionRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wix_refund_id: Option<String>,
    pub plugin_transaction_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundTransactionResponse {
    pub plugin_refund_id: String,
    pub reason_code: u32,
    pub error_code: String,
    pub error_message: String,
}

impl RefundTransactionResponse {
    /// SBP has no refund API; every refund is declined with this result.
    pub fn not_supported(plugin_transaction_id: impl Into<String>) -> Self {
        Self {
            plugin_refund_id: plugin_transaction_id.into(),
            reason_code: REFUND_NOT_SUPPORTED_REASON_CODE,
            error_code: REFUND_NOT_SUPPORTED_ERROR_CODE.to_string(),
            error_message: REFUND_NOT_SUPPORTED_MESSAGE.to_string(),
        }
    }
}

/// Transaction state update submitted back to Wix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionEvent {
    pub wix_transaction_id: String,
    pub plugin_transaction_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason_code: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl TransactionEvent {
    /// Successful payment: no error fields.
    pub fn approved(
        wix_transaction_id: impl Into<String>,
        plugin_transaction_id: impl Into<String>,
    ) -> Self {
        Self {
            wix_transaction_id: wix_transaction_id.into(),
            plugin_transaction_id: plugin_transaction_id.into(),
            reason_code: None,
            error_code: None,
            error_message: None,
        }
    }

    /// The SBP invoice expired before it was paid.
    pub fn invoice_expired(
        wix_transaction_id: impl Into<String>,
        plugin_transaction_id: impl Into<String>,
    ) -> Self {
        Self {
            wix_transaction_id: wix_transaction_id.into(),
            plugin_transaction_id: plugin_transaction_id.into(),
            reason_code: Some(INVOICE_EXPIRED_REASON_CODE),
            error_code: Some(INVOICE_EXPIRED_ERROR_CODE.to_string()),
            error_message: Some(INVOICE_EXPIRED_MESSAGE.to_string()),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.error_code.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPayload {
    pub transaction: TransactionEvent,
}

/// Body of the Wix `submitEvent` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitEventRequest {
    pub event: EventPayload,
}

impl From<TransactionEvent> for SubmitEventRequest {
    fn from(transaction: TransactionEvent) -> Self {
        Self {
            event: EventPayload { transaction },
        }
    }
}

// ---------------------------------------------------------------------------
// Swiss Bitcoin Pay checkout API
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HmacCheckRequest {
    pub test: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HmacCheckResponse {
    #[serde(default)]
    pub account_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookTarget {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceItem {
    pub name: String,
    pub quantity: u32,
    pub unit_price_with_vat: MajorAmount,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceData {
    pub items: Vec<InvoiceItem>,
}

/// Correlation metadata round-tripped through the SBP invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceExtra {
    pub wix_transaction_id: String,
}

/// Body of `POST /checkout`. Field order is the order sent on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRequest {
    pub amount: MajorAmount,
    pub unit: String,
    pub title: String,
    pub redirect_after_paid: String,
    pub delay: u32,
    pub on_chain: bool,
    pub webhook: WebhookTarget,
    pub invoice_data: InvoiceData,
    pub extra: InvoiceExtra,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub id: String,
    pub checkout_url: String,
}

/// Invoice status as reported by SBP. Statuses this adapter does not act on
/// are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InvoiceStatus {
    Settled,
    Expired,
    Other(String),
}

impl From<String> for InvoiceStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "settled" => InvoiceStatus::Settled,
            "expired" => InvoiceStatus::Expired,
            _ => InvoiceStatus::Other(s),
        }
    }
}

impl From<InvoiceStatus> for String {
    fn from(status: InvoiceStatus) -> Self {
        status.as_str().to_string()
    }
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &str {
        match self {
            InvoiceStatus::Settled => "settled",
            InvoiceStatus::Expired => "expired",
            InvoiceStatus::Other(s) => s,
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Invoice webhook body posted by SBP. Untrusted until its signature checks out.
///
/// `id` and `extra` are only needed for statuses that produce an event, so
/// they may be absent on the others.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InvoiceWebhook {
    #[serde(default)]
    pub id: Option<String>,
    pub status: InvoiceStatus,
    #[serde(default)]
    pub extra: Option<InvoiceExtra>,
    #[serde(default, deserialize_with = "serde_num::opt_f64_from_number_or_string")]
    pub amount: Option<f64>,
}

mod serde_num {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(serde_json::Number),
        String(String),
    }

    pub fn f64_from_number_or_string<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        match NumberOrString::deserialize(d)? {
            NumberOrString::Number(n) => n
                .as_f64()
                .ok_or_else(|| D::Error::custom("number out of range")),
            NumberOrString::String(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| D::Error::custom(format!("invalid decimal: {s:?}"))),
        }
    }

    pub fn u64_from_number_or_string<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
        match NumberOrString::deserialize(d)? {
            NumberOrString::Number(n) => n
                .as_u64()
                .ok_or_else(|| D::Error::custom(format!("expected a non-negative integer, got {n}"))),
            NumberOrString::String(s) => s
                .trim()
                .parse::<u64>()
                .map_err(|_| D::Error::custom(format!("invalid integer: {s:?}"))),
        }
    }

    pub fn opt_f64_from_number_or_string<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<f64>, D::Error> {
        match Option::<NumberOrString>::deserialize(d)? {
            None => Ok(None),
            Some(NumberOrString::Number(n)) => Ok(n.as_f64()),
            Some(NumberOrString::String(s)) => Ok(s.trim().parse::<f64>().ok()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn credentials_debug_redacts_secret() {
        let creds = Credentials::new("key-123", "super-secret");
        let debug = format!("{creds:?}");
        assert!(debug.contains("key-123"));
        assert!(!debug.contains("super-secret"));
    }

    #[test]
    fn order_accepts_string_amounts() {
        let order: Order = serde_json::from_value(json!({
            "_id": "order-1",
            "description": {
                "currency": "EUR",
                "totalAmount": "1999",
                "items": [{ "name": "Coffee", "quantity": 2, "price": "999.5" }]
            },
            "returnUrls": { "successUrl": "https://shop.example/thanks" }
        }))
        .unwrap();
        assert_eq!(order.id, "order-1");
        assert_eq!(order.description.total_amount, 1999);
        assert_eq!(order.description.items[0].price, 999.5);
        assert_eq!(order.return_urls.success_url, "https://shop.example/thanks");
    }

    #[test]
    fn order_accepts_numeric_amounts() {
        let desc: OrderDescription = serde_json::from_value(json!({
            "currency": "JPY",
            "totalAmount": 500,
            "items": [{ "name": "Tea", "quantity": 1, "price": 500 }]
        }))
        .unwrap();
        assert_eq!(desc.total_amount, 500);
        assert_eq!(desc.items[0].price, 500.0);
    }

    #[test]
    fn negative_total_is_rejected() {
        let err = serde_json::from_value::<OrderDescription>(json!({
            "currency": "EUR",
            "totalAmount": -5
        }));
        assert!(err.is_err());
    }

    #[test]
    fn transaction_event_omits_absent_error_fields() {
        let approved = serde_json::to_value(SubmitEventRequest::from(TransactionEvent::approved(
            "wix-1", "inv-1",
        )))
        .unwrap();
        assert_eq!(
            approved,
            json!({ "event": { "transaction": {
                "wixTransactionId": "wix-1",
                "pluginTransactionId": "inv-1"
            }}})
        );

        let expired = serde_json::to_value(TransactionEvent::invoice_expired("wix-1", "inv-1"))
            .unwrap();
        assert_eq!(expired["reasonCode"], 3035);
        assert_eq!(expired["errorCode"], "INVOICE_EXPIRED");
        assert_eq!(expired["errorMessage"], "Invoice expired");
    }

    #[test]
    fn invoice_status_keeps_unknown_values() {
        let hook: InvoiceWebhook = serde_json::from_value(json!({
            "id": "inv-9",
            "status": "unconfirmed",
            "extra": { "wixTransactionId": "wix-9" },
            "amount": 12.5,
            "somethingNew": true
        }))
        .unwrap();
        assert_eq!(hook.status, InvoiceStatus::Other("unconfirmed".to_string()));
        assert_eq!(hook.status.to_string(), "unconfirmed");
        assert_eq!(hook.amount, Some(12.5));
        assert_eq!(hook.id.as_deref(), Some("inv-9"));
    }

    #[test]
    fn invoice_webhook_tolerates_missing_correlation() {
        let hook: InvoiceWebhook = serde_json::from_value(json!({ "status": "unpaid" })).unwrap();
        assert_eq!(hook.id, None);
        assert_eq!(hook.extra, None);
        assert_eq!(hook.amount, None);
    }

    #[test]
    fn refund_not_supported_shape() {
        let resp = serde_json::to_value(RefundTransactionResponse::not_supported("inv-3")).unwrap();
        assert_eq!(
            resp,
            json!({
                "pluginRefundId": "inv-3",
                "reasonCode": 404,
                "errorCode": "REFUND_NOT_SUPPORTED",
                "errorMessage": "Refund not supported"
            })
        );
    }

    #[test]
    fn connect_response_serializes_missing_account_name_as_null() {
        let resp = ConnectAccountResponse {
            credentials: Credentials::new("k", "s"),
            account_name: None,
        };
        let v = serde_json::to_value(resp).unwrap();
        assert!(v["accountName"].is_null());
        assert_eq!(v["credentials"]["hmacSecret"], "s");
    }
}

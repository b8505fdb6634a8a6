use std::sync::Arc;

use sbp::platform::EventSink;
use sbp::PaymentProvider;

/// Shared application state for the provider server.
pub struct AppState {
    pub provider: PaymentProvider,
    /// Where translated webhook outcomes are submitted.
    pub events: Arc<dyn EventSink>,
    /// Bearer token Wix presents on the /v1 provider endpoints.
    pub platform_token: Vec<u8>,
    /// Separate bearer token for /metrics.
    pub metrics_token: Option<Vec<u8>>,
    /// Serve /metrics unauthenticated when no metrics token is set.
    pub public_metrics: bool,
}

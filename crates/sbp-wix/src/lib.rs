//! Swiss Bitcoin Pay payment-provider adapter for Wix.
//!
//! Bridges the Wix payment-provider lifecycle to the Swiss Bitcoin Pay (SBP)
//! hosted checkout API, and translates SBP invoice webhooks back into Wix
//! transaction events.
//!
//! # Pieces
//!
//! - **Signer** ([`hmac`]): HMAC-SHA256 over the exact request bytes, sent and
//!   received as `sbp-sig: sha256=<hex>`
//! - **Outbound adapter** ([`PaymentProvider`]): connect account, create
//!   transaction (SBP invoice), refund (always declined)
//! - **Webhook translator** ([`webhook`]): verifies a callback and maps
//!   `settled` / `expired` invoices onto [`TransactionEvent`]s
//!
//! Wix-side collaborators (secret vault, site URLs, event submission) are the
//! traits in [`platform`]; the HTTP service binds them to real endpoints.
//!
//! # Quick example (signing)
//!
//! ```
//! let header = sbp::hmac::signature_header(b"merchant-secret", br#"{"test":true}"#);
//! assert!(header.starts_with("sha256="));
//! assert!(sbp::hmac::verify_signature_header(
//!     b"merchant-secret",
//!     br#"{"test":true}"#,
//!     &header,
//! ));
//! ```

// Core types
pub mod constants;
pub mod currency;
pub mod error;
pub mod hmac;
pub mod payment;
pub mod security;

// Translation and collaborators
pub mod platform;
pub mod plugin_config;
pub mod webhook;

// HTTP
pub mod processor_client;
pub mod provider;

// Re-exports
pub use constants::ProcessorConfig;
pub use constants::*;
pub use error::SbpError;
pub use payment::*;
pub use plugin_config::{plugin_config, PluginConfig};
pub use processor_client::ProcessorClient;
pub use provider::PaymentProvider;
pub use webhook::WebhookError;

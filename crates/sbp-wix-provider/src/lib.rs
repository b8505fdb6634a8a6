//! Swiss Bitcoin Pay payment provider service for Wix.
//!
//! Hosts the invoice webhook that SBP calls on status changes and the
//! platform-facing provider endpoints (connect account, create transaction,
//! refund). Adapter logic lives in the core [`sbp`] crate; this crate provides
//! the HTTP server, configuration, metrics and the REST binding of the Wix
//! platform ports.
//!
//! # Modules
//!
//! - [`routes`]: HTTP endpoints (webhook, provider, config, health, metrics)
//! - [`state`]: Shared [`AppState`](state::AppState)
//! - [`config`]: Environment configuration
//! - [`error`]: JSON error responses for the provider endpoints
//! - [`platform_client`]: Wix REST implementation of the platform traits
//! - [`metrics`]: Prometheus metrics for webhook and outbound operations

pub mod config;
pub mod error;
pub mod metrics;
pub mod platform_client;
pub mod routes;
pub mod state;

use actix_web::{get, post, web, HttpRequest, HttpResponse};
use serde::de::DeserializeOwned;
use std::time::Instant;

use sbp::webhook::{self, WebhookError};
use sbp::{
    ConnectAccountRequest, CreateTransactionRequest, RefundTransactionRequest, SubmitEventRequest,
    SECRET_NAME, SIG_HEADER,
};

use crate::error::ApiError;
use crate::metrics;
use crate::state::AppState;

/// Register every endpoint of the provider service.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource(["/_functions/updateTransaction/", "/_functions/updateTransaction"])
            .route(web::post().to(update_transaction)),
    )
    .service(health)
    .service(metrics_endpoint)
    .service(plugin_config)
    .service(connect_account)
    .service(create_transaction)
    .service(refund_transaction);
}

/// Constant-time byte comparison, delegating to [`sbp::security`].
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    sbp::security::constant_time_eq(a, b)
}

/// Check the platform bearer token on a provider endpoint.
fn authorize(req: &HttpRequest, state: &AppState) -> Result<(), ApiError> {
    let header = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok());

    let Some(header) = header else {
        tracing::warn!("platform token missing on provider endpoint");
        return Err(ApiError::Unauthorized("authentication required"));
    };

    let authorized = header
        .strip_prefix("Bearer ")
        .map(|t| constant_time_eq(t.as_bytes(), &state.platform_token))
        .unwrap_or(false);

    if authorized {
        Ok(())
    } else {
        tracing::warn!("platform token rejected on provider endpoint");
        Err(ApiError::Unauthorized("authentication failed"))
    }
}

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(error = %e, "rejecting malformed request body");
        ApiError::InvalidRequest("invalid request body".to_string())
    })
}

/// SBP invoice callback.
///
/// The body is taken as raw bytes: the signature covers exactly what was
/// received, so it must not be re-serialized before verification.
pub async fn update_transaction(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Bytes,
) -> HttpResponse {
    let secret = match state.provider.secrets().get_secret_value(SECRET_NAME).await {
        Ok(secret) => secret,
        Err(e) => {
            metrics::WEBHOOK_REQUESTS.with_label_values(&["error"]).inc();
            tracing::error!(error = %e, "failed to load the SBP HMAC secret");
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "internal error"
            }));
        }
    };

    // A missing header is an empty signature, which fails the length check.
    let signature = req
        .headers()
        .get(SIG_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let verified = webhook::verify_and_parse(secret.value.as_bytes(), &body, signature)
        .and_then(|invoice| webhook::transaction_event(&invoice).map(|event| (invoice, event)));
    let (invoice, event) = match verified {
        Ok(verified) => verified,
        Err(WebhookError::SignatureMismatch { received, computed }) => {
            metrics::SIGNATURE_FAILURES.inc();
            metrics::WEBHOOK_REQUESTS
                .with_label_values(&["invalid_signature"])
                .inc();
            tracing::warn!(
                received = %received,
                computed = %computed,
                "SBP callback rejected: request body digest does not match sbp-sig"
            );
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": "invalid signature"
            }));
        }
        Err(WebhookError::InvalidBody(e)) => {
            metrics::WEBHOOK_REQUESTS
                .with_label_values(&["invalid_body"])
                .inc();
            tracing::warn!(error = %e, "SBP callback verified but body is malformed");
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": "invalid webhook body"
            }));
        }
    };

    let invoice_id = invoice.id.as_deref().unwrap_or_default();
    let Some(event) = event else {
        metrics::WEBHOOK_REQUESTS.with_label_values(&["ignored"]).inc();
        tracing::debug!(
            invoice_id,
            status = %invoice.status,
            "SBP callback acknowledged without event"
        );
        return HttpResponse::Ok().json(serde_json::json!({}));
    };

    let outcome = if event.is_failure() { "expired" } else { "settled" };
    let wix_transaction_id = event.wix_transaction_id.clone();
    let request = SubmitEventRequest::from(event);

    let started = Instant::now();
    let submitted = state.events.submit_event(&request).await;
    metrics::record_outbound("submit_event", submitted.is_ok(), started);

    match submitted {
        Ok(()) => {
            metrics::WEBHOOK_REQUESTS.with_label_values(&[outcome]).inc();
            tracing::info!(
                wix_transaction_id = %wix_transaction_id,
                invoice_id,
                outcome,
                "transaction event submitted"
            );
            HttpResponse::Ok().json(serde_json::json!({}))
        }
        Err(e) => {
            metrics::WEBHOOK_REQUESTS.with_label_values(&["error"]).inc();
            tracing::error!(
                wix_transaction_id = %wix_transaction_id,
                error = %e,
                "failed to submit transaction event"
            );
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "internal error"
            }))
        }
    }
}

#[get("/health")]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": "sbp-provider",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[get("/metrics")]
pub async fn metrics_endpoint(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    match &state.metrics_token {
        Some(token) => {
            let authorized = req
                .headers()
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "))
                .map(|t| constant_time_eq(t.as_bytes(), token))
                .unwrap_or(false);

            if !authorized {
                return HttpResponse::Unauthorized().json(serde_json::json!({
                    "error": "unauthorized",
                    "message": "Valid Bearer token required for /metrics"
                }));
            }
        }
        None => {
            if !state.public_metrics {
                return HttpResponse::Forbidden().json(serde_json::json!({
                    "error": "forbidden",
                    "message": "Set METRICS_TOKEN or SBP_PUBLIC_METRICS=true to access /metrics"
                }));
            }
        }
    }
    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(metrics::metrics_output())
}

/// Static descriptor rendered in the Wix dashboard.
#[get("/v1/config")]
pub async fn plugin_config() -> HttpResponse {
    HttpResponse::Ok().json(sbp::plugin_config())
}

#[post("/v1/connect-account")]
pub async fn connect_account(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    authorize(&req, &state)?;
    let request: ConnectAccountRequest = parse_body(&body)?;

    let started = Instant::now();
    let result = state.provider.connect_account(&request).await;
    metrics::record_outbound("connect_account", result.is_ok(), started);

    Ok(HttpResponse::Ok().json(result?))
}

#[post("/v1/create-transaction")]
pub async fn create_transaction(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    authorize(&req, &state)?;
    let request: CreateTransactionRequest = parse_body(&body)?;

    let started = Instant::now();
    let result = state.provider.create_transaction(&request).await;
    metrics::record_outbound("create_transaction", result.is_ok(), started);

    Ok(HttpResponse::Ok().json(result?))
}

#[post("/v1/refund-transaction")]
pub async fn refund_transaction(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    authorize(&req, &state)?;
    let request: RefundTransactionRequest = parse_body(&body)?;
    Ok(HttpResponse::Ok().json(state.provider.refund_transaction(&request)))
}

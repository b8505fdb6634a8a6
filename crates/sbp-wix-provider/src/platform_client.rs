//! Wix REST binding of the platform traits (secrets, site URLs, events).

use std::time::Duration;

use futures::future::BoxFuture;
use reqwest::{Method, Response};
use serde::{Deserialize, Serialize};
use url::Url;

use sbp::platform::{
    EventSink, NewSecret, SecretInfo, SecretStore, SecretValue, SiteUrl, SiteUrls,
};
use sbp::{SbpError, SubmitEventRequest};

#[derive(Deserialize)]
struct SecretList {
    #[serde(default)]
    secrets: Vec<SecretInfo>,
}

#[derive(Deserialize)]
struct CreatedSecret {
    id: String,
}

#[derive(Serialize)]
struct SecretBody<'a> {
    secret: &'a NewSecret,
}

#[derive(Deserialize)]
struct PublishedSiteUrls {
    #[serde(default)]
    urls: Vec<SiteUrl>,
}

#[derive(Clone)]
pub struct PlatformClient {
    client: reqwest::Client,
    base_url: Url,
    token: String,
}

impl std::fmt::Debug for PlatformClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformClient")
            .field("base_url", &self.base_url.as_str())
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl PlatformClient {
    pub fn new(base_url: &str, token: impl Into<String>, timeout: Duration) -> Result<Self, SbpError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| SbpError::Config(format!("invalid platform URL: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(SbpError::Config("platform URL cannot be a base".to_string()));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| SbpError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url,
            token: token.into(),
        })
    }

    /// Base URL with `segments` appended, each percent-encoded.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
    ) -> Result<Response, SbpError> {
        let url = self.url(segments);
        let mut request = self
            .client
            .request(method.clone(), url.clone())
            .bearer_auth(&self.token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| SbpError::Platform(format!("{method} {} failed: {e}", url.path())))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SbpError::Platform(format!(
                "{method} {} returned {status}",
                url.path()
            )));
        }
        Ok(resp)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, segments: &[&str]) -> Result<T, SbpError> {
        self.send::<()>(Method::GET, segments, None)
            .await?
            .json()
            .await
            .map_err(|e| SbpError::Platform(format!("response parse failed: {e}")))
    }
}

impl SecretStore for PlatformClient {
    fn list_secret_info(&self) -> BoxFuture<'_, Result<Vec<SecretInfo>, SbpError>> {
        Box::pin(async move {
            let list: SecretList = self.get_json(&["secrets"]).await?;
            Ok(list.secrets)
        })
    }

    fn create_secret<'a>(
        &'a self,
        secret: &'a NewSecret,
    ) -> BoxFuture<'a, Result<String, SbpError>> {
        Box::pin(async move {
            let created: CreatedSecret = self
                .send(Method::POST, &["secrets"], Some(&SecretBody { secret }))
                .await?
                .json()
                .await
                .map_err(|e| SbpError::Platform(format!("response parse failed: {e}")))?;
            Ok(created.id)
        })
    }

    fn update_secret<'a>(
        &'a self,
        id: &'a str,
        secret: &'a NewSecret,
    ) -> BoxFuture<'a, Result<(), SbpError>> {
        Box::pin(async move {
            self.send(Method::PATCH, &["secrets", id], Some(&SecretBody { secret }))
                .await?;
            Ok(())
        })
    }

    fn get_secret_value<'a>(
        &'a self,
        name: &'a str,
    ) -> BoxFuture<'a, Result<SecretValue, SbpError>> {
        Box::pin(async move {
            self.get_json(&["secrets", name, "value"])
                .await
                .map_err(|e| SbpError::SecretStore(e.to_string()))
        })
    }
}

impl SiteUrls for PlatformClient {
    fn list_published_site_urls(&self) -> BoxFuture<'_, Result<Vec<SiteUrl>, SbpError>> {
        Box::pin(async move {
            let published: PublishedSiteUrls = self.get_json(&["site", "published-urls"]).await?;
            Ok(published.urls)
        })
    }
}

impl EventSink for PlatformClient {
    fn submit_event<'a>(
        &'a self,
        event: &'a SubmitEventRequest,
    ) -> BoxFuture<'a, Result<(), SbpError>> {
        Box::pin(async move {
            self.send(Method::POST, &["payment-provider", "events"], Some(event))
                .await?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client_for(server: &mockito::ServerGuard, base_path: &str) -> PlatformClient {
        PlatformClient::new(
            &format!("{}{base_path}", server.url()),
            "platform-api-token",
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn new_secret(value: &str) -> NewSecret {
        NewSecret {
            name: sbp::SECRET_NAME.to_string(),
            description: sbp::SECRET_DESCRIPTION.to_string(),
            value: value.to_string(),
        }
    }

    #[tokio::test]
    async fn lists_secrets_with_bearer_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/secrets")
            .match_header("authorization", "Bearer platform-api-token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"secrets":[{"_id":"s-1","name":"sbp_hmacSecret"}]}"#)
            .create_async()
            .await;

        let infos = client_for(&server, "/api/").list_secret_info().await.unwrap();
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].id, "s-1");
        assert_eq!(infos[0].name, "sbp_hmacSecret");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn create_and_update_send_secret_body() {
        let mut server = mockito::Server::new_async().await;
        let create = server
            .mock("POST", "/secrets")
            .match_body(Matcher::PartialJsonString(
                r#"{"secret":{"name":"sbp_hmacSecret","value":"one"}}"#.to_string(),
            ))
            .with_status(201)
            .with_body(r#"{"id":"s-9"}"#)
            .create_async()
            .await;
        let update = server
            .mock("PATCH", "/secrets/s-9")
            .match_body(Matcher::PartialJsonString(
                r#"{"secret":{"value":"two"}}"#.to_string(),
            ))
            .with_status(200)
            .create_async()
            .await;

        let client = client_for(&server, "");
        let id = client.create_secret(&new_secret("one")).await.unwrap();
        assert_eq!(id, "s-9");
        client.update_secret(&id, &new_secret("two")).await.unwrap();
        create.assert_async().await;
        update.assert_async().await;
    }

    #[tokio::test]
    async fn upsert_through_http_updates_existing() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/secrets")
            .with_status(200)
            .with_body(r#"{"secrets":[{"_id":"s-1","name":"sbp_hmacSecret"}]}"#)
            .create_async()
            .await;
        let update = server
            .mock("PATCH", "/secrets/s-1")
            .with_status(200)
            .expect(1)
            .create_async()
            .await;
        let create = server.mock("POST", "/secrets").expect(0).create_async().await;

        let client = client_for(&server, "");
        sbp::platform::upsert_secret(&client, &new_secret("rotated"))
            .await
            .unwrap();
        update.assert_async().await;
        create.assert_async().await;
    }

    #[tokio::test]
    async fn secret_value_failure_is_a_secret_store_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/secrets/sbp_hmacSecret/value")
            .with_status(404)
            .create_async()
            .await;

        let err = client_for(&server, "")
            .get_secret_value(sbp::SECRET_NAME)
            .await
            .unwrap_err();
        assert!(matches!(err, SbpError::SecretStore(_)));
    }

    #[tokio::test]
    async fn reads_secret_value() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/secrets/sbp_hmacSecret/value")
            .with_status(200)
            .with_body(r#"{"value":"merchant-secret"}"#)
            .create_async()
            .await;

        let secret = client_for(&server, "")
            .get_secret_value(sbp::SECRET_NAME)
            .await
            .unwrap();
        assert_eq!(secret.value, "merchant-secret");
    }

    #[tokio::test]
    async fn lists_published_site_urls() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/site/published-urls")
            .with_status(200)
            .with_body(
                r#"{"urls":[{"url":"https://b.example","primary":false},{"url":"https://a.example","primary":true}]}"#,
            )
            .create_async()
            .await;

        let urls = client_for(&server, "").list_published_site_urls().await.unwrap();
        assert_eq!(
            sbp::platform::primary_site_url(&urls),
            Some("https://a.example")
        );
    }

    #[tokio::test]
    async fn submits_event_and_maps_failures() {
        let mut server = mockito::Server::new_async().await;
        let ok = server
            .mock("POST", "/payment-provider/events")
            .match_body(Matcher::Json(serde_json::json!({
                "event": {"transaction": {
                    "wixTransactionId": "wix-1",
                    "pluginTransactionId": "inv_1"
                }}
            })))
            .with_status(200)
            .create_async()
            .await;

        let client = client_for(&server, "");
        let event = SubmitEventRequest::from(sbp::TransactionEvent::approved("wix-1", "inv_1"));
        client.submit_event(&event).await.unwrap();
        ok.assert_async().await;

        server
            .mock("POST", "/payment-provider/events")
            .with_status(503)
            .create_async()
            .await;
        let event = SubmitEventRequest::from(sbp::TransactionEvent::approved("wix-2", "inv_2"));
        let err = client.submit_event(&event).await.unwrap_err();
        assert!(matches!(err, SbpError::Platform(_)));
    }

    #[tokio::test]
    async fn redirects_are_not_followed() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/site/published-urls")
            .with_status(302)
            .with_header("location", "https://elsewhere.example/")
            .create_async()
            .await;

        let err = client_for(&server, "")
            .list_published_site_urls()
            .await
            .unwrap_err();
        assert!(matches!(err, SbpError::Platform(_)));
    }
}

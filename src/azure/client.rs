//! Azure Resource Manager HTTP client.
//!
//! A thin reqwest wrapper over the management endpoint: token acquisition,
//! status triage, and subscription listing. The deployment validate call
//! lives in [`super::validation`]. Every request shares one bearer token,
//! acquired once and read-only afterwards. Calls are bounded by a client
//! timeout and are never retried: a single call failure is a final verdict
//! for the affected resource within one run.

use reqwest::{header, Client, Response};
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, trace};

use crate::error::{AzureError, CloudgateError, Result};

use super::credentials::CredentialSource;
use super::subscriptions::Subscription;

/// Azure management API base URL (public cloud).
const MANAGEMENT_API_URL: &str = "https://management.azure.com";

/// Entra login base URL (public cloud).
const LOGIN_URL: &str = "https://login.microsoftonline.com";

/// OAuth scope for the management API.
const MANAGEMENT_SCOPE: &str = "https://management.azure.com/.default";

/// API version for the subscriptions endpoint.
const SUBSCRIPTIONS_API_VERSION: &str = "2020-01-01";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Azure management API client.
#[derive(Debug)]
pub struct AzureClient {
    /// HTTP client.
    client: Client,
    /// Credential source for token acquisition.
    credentials: CredentialSource,
    /// Bearer token, acquired once per client.
    token: OnceCell<String>,
    /// Management endpoint base URL.
    management_url: String,
    /// Login endpoint base URL.
    login_url: String,
}

/// OAuth token response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Subscription list response envelope.
#[derive(Debug, Deserialize)]
struct SubscriptionListResponse {
    #[serde(default)]
    value: Vec<Subscription>,
}

impl AzureClient {
    /// Creates a new management API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(credentials: CredentialSource) -> Result<Self> {
        Self::with_timeout(credentials, DEFAULT_TIMEOUT_SECS)
    }

    /// Creates a client with a custom per-call timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_timeout(credentials: CredentialSource, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AzureError::network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            credentials,
            token: OnceCell::new(),
            management_url: String::from(MANAGEMENT_API_URL),
            login_url: String::from(LOGIN_URL),
        })
    }

    /// Overrides the management endpoint (sovereign clouds, test servers).
    #[must_use]
    pub fn with_management_url(mut self, url: impl Into<String>) -> Self {
        self.management_url = url.into();
        self
    }

    /// Overrides the login endpoint (sovereign clouds, test servers).
    #[must_use]
    pub fn with_login_url(mut self, url: impl Into<String>) -> Self {
        self.login_url = url.into();
        self
    }

    /// Returns the management endpoint base URL.
    #[must_use]
    pub fn management_url(&self) -> &str {
        &self.management_url
    }

    /// Returns the HTTP client.
    pub(super) const fn http(&self) -> &Client {
        &self.client
    }

    /// Returns the bearer token, acquiring it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`AzureError::AuthenticationFailed`] if the token exchange is
    /// rejected.
    pub(super) async fn bearer_token(&self) -> Result<&str> {
        let token = self
            .token
            .get_or_try_init(|| self.acquire_token())
            .await?;
        Ok(token.as_str())
    }

    /// Acquires a fresh token from the credential source.
    async fn acquire_token(&self) -> Result<String> {
        match &self.credentials {
            CredentialSource::StaticToken(token) => Ok(token.clone()),
            CredentialSource::ClientSecret {
                tenant_id,
                client_id,
                client_secret,
            } => {
                debug!("Acquiring management token for tenant {tenant_id}");

                let url = format!("{}/{}/oauth2/v2.0/token", self.login_url, tenant_id);
                let form = [
                    ("grant_type", "client_credentials"),
                    ("client_id", client_id.as_str()),
                    ("client_secret", client_secret.as_str()),
                    ("scope", MANAGEMENT_SCOPE),
                ];

                let response = self
                    .client
                    .post(&url)
                    .form(&form)
                    .send()
                    .await
                    .map_err(|e| AzureError::network(format!("Token request failed: {e}")))?;

                if !response.status().is_success() {
                    let body = response.text().await.unwrap_or_default();
                    return Err(CloudgateError::Azure(AzureError::AuthenticationFailed {
                        message: format!("Token exchange rejected: {body}"),
                    }));
                }

                let token: TokenResponse = response.json().await.map_err(|e| {
                    AzureError::invalid_response(format!("Failed to parse token response: {e}"))
                })?;

                Ok(token.access_token)
            }
        }
    }

    /// Triage for management API response statuses shared by all calls.
    ///
    /// Auth statuses and rate limiting become typed errors; other non-success
    /// statuses are left for the caller, which may need the body.
    pub(super) async fn check_auth_status(response: Response) -> Result<Response> {
        let status = response.status();

        if status.as_u16() == 401 || status.as_u16() == 403 {
            let body = response.text().await.unwrap_or_default();
            return Err(CloudgateError::Azure(AzureError::AuthenticationFailed {
                message: format!("{status}: {body}"),
            }));
        }

        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or_default();
            let retry_after = if retry_after == 0 { 60 } else { retry_after };

            return Err(CloudgateError::Azure(AzureError::RateLimited {
                retry_after_secs: retry_after,
            }));
        }

        Ok(response)
    }

    /// Lists subscriptions visible to the credentials.
    ///
    /// # Errors
    ///
    /// Returns [`AzureError::NoSubscriptions`] when the credentials can see
    /// none, and transport/auth errors otherwise.
    pub async fn list_subscriptions(&self) -> Result<Vec<Subscription>> {
        let token = self.bearer_token().await?;
        let url = format!(
            "{}/subscriptions?api-version={SUBSCRIPTIONS_API_VERSION}",
            self.management_url
        );
        trace!("GET {url}");

        let response = self
            .client
            .get(&url)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .send()
            .await
            .map_err(|e| AzureError::network(format!("Subscription request failed: {e}")))?;

        let response = Self::check_auth_status(response).await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CloudgateError::Azure(AzureError::api_error(
                status.as_u16(),
                body,
            )));
        }

        let list: SubscriptionListResponse = response.json().await.map_err(|e| {
            AzureError::invalid_response(format!("Failed to parse subscription list: {e}"))
        })?;

        if list.value.is_empty() {
            return Err(CloudgateError::Azure(AzureError::NoSubscriptions));
        }

        debug!("Found {} subscriptions", list.value.len());
        Ok(list.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> AzureClient {
        AzureClient::new(CredentialSource::StaticToken(String::from("test-token")))
            .expect("client")
            .with_management_url(server.uri())
    }

    #[tokio::test]
    async fn test_list_subscriptions() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/subscriptions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "value": [
                    { "subscriptionId": "sub-1", "displayName": "Production" },
                    { "subscriptionId": "sub-2", "displayName": "Sandbox" }
                ]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let subs = client.list_subscriptions().await.expect("subscriptions");

        assert_eq!(subs.len(), 2);
        assert_eq!(subs[0].subscription_id, "sub-1");
        assert_eq!(subs[1].display_name, "Sandbox");
    }

    #[tokio::test]
    async fn test_empty_subscription_list_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/subscriptions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "value": [] })),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        match client.list_subscriptions().await {
            Err(CloudgateError::Azure(AzureError::NoSubscriptions)) => {}
            other => panic!("expected NoSubscriptions, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unauthorized_is_a_credential_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/subscriptions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("token expired"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.list_subscriptions().await.expect_err("401 error");
        assert!(err.is_credential());
    }

    #[tokio::test]
    async fn test_client_credentials_token_exchange() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/my-tenant/oauth2/v2.0/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "exchanged-token",
                "token_type": "Bearer",
                "expires_in": 3599
            })))
            .mount(&server)
            .await;

        let client = AzureClient::new(CredentialSource::ClientSecret {
            tenant_id: String::from("my-tenant"),
            client_id: String::from("app-id"),
            client_secret: String::from("app-secret"),
        })
        .expect("client")
        .with_login_url(server.uri());

        let token = client.bearer_token().await.expect("token");
        assert_eq!(token, "exchanged-token");
    }
}

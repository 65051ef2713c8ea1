//! HTTP client for the food-ordering REST API

use crate::{
    config::ApiConfig,
    credentials::CredentialStore,
    error::ApiError,
    navigator::{Navigator, Route},
    transport::{ApiRequest, BoxFuture, Transport},
};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::sync::Arc;

/// The single HTTP client shared by every container
///
/// Every call reads the bearer token from the [`CredentialStore`]. A 401
/// response clears the token and asks the [`Navigator`] for the login route
/// before the error is returned to the caller.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    credentials: Arc<dyn CredentialStore>,
    navigator: Arc<dyn Navigator>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client from configuration
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Transport` if the underlying HTTP client cannot be built
    pub fn new(
        config: &ApiConfig,
        credentials: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials,
            navigator,
        })
    }

    /// Base URL requests are sent to
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Credential store consulted before every request
    #[must_use]
    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.credentials
    }

    /// Send one request and decode the JSON response body
    ///
    /// # Errors
    ///
    /// - `ApiError::Timeout` / `ApiError::Transport` when no response arrives
    /// - `ApiError::Unauthorized` on 401, after the token has been cleared
    /// - `ApiError::Server` for every other non-2xx status
    /// - `ApiError::Decode` when a 2xx body is not JSON
    #[tracing::instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    pub async fn send(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self.client.request(request.method, url);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = self.credentials.get() {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::debug!(error = %e, "Request did not complete");
            ApiError::from_reqwest(&e)
        })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            self.expire_session();
            // The rejection stands even when its body cannot be read
            let text = response.text().await.unwrap_or_else(|e| {
                tracing::debug!(error = %e, "Unreadable 401 body");
                String::new()
            });
            return Err(ApiError::Unauthorized {
                body: error_body(&text),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| ApiError::from_reqwest(&e))?;

        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), "Request rejected");
            return Err(ApiError::Server {
                status: status.as_u16(),
                body: error_body(&text).unwrap_or(Value::Null),
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }

    fn expire_session(&self) {
        tracing::info!("Session rejected (401), clearing stored token");
        if let Err(e) = self.credentials.clear() {
            tracing::warn!(error = %e, "Failed to clear stored token");
        }
        self.navigator.navigate(Route::Login);
    }
}

/// Parsed JSON body, the raw text as a JSON string, or `None` when empty
fn error_body(text: &str) -> Option<Value> {
    if text.trim().is_empty() {
        return None;
    }
    Some(serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string())))
}

impl Transport for ApiClient {
    fn execute(&self, request: ApiRequest) -> BoxFuture<'_, Result<Value, ApiError>> {
        Box::pin(self.send(request))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::credentials::MemoryCredentialStore;
    use crate::navigator::ChannelNavigator;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(
        server: &MockServer,
        credentials: Arc<MemoryCredentialStore>,
    ) -> (ApiClient, tokio::sync::mpsc::UnboundedReceiver<Route>) {
        let (navigator, routes) = ChannelNavigator::channel();
        let config = ApiConfig::default().with_base_url(server.uri());
        let client = ApiClient::new(&config, credentials, Arc::new(navigator)).unwrap();
        (client, routes)
    }

    #[tokio::test]
    async fn attaches_bearer_token_when_stored() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cart"))
            .and(header("authorization", "Bearer jwt-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "ok",
                "payload": null
            })))
            .expect(1)
            .mount(&server)
            .await;

        let credentials = Arc::new(MemoryCredentialStore::with_token("jwt-1"));
        let (client, _routes) = client_for(&server, credentials);

        let body = client.send(ApiRequest::get("/cart")).await.unwrap();
        assert_eq!(body["message"], "ok");
    }

    #[tokio::test]
    async fn omits_authorization_without_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/restaurants"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"payload": []})))
            .mount(&server)
            .await;

        let (client, _routes) = client_for(&server, Arc::new(MemoryCredentialStore::new()));
        client
            .send(ApiRequest::get("/restaurants").with_query("page", 1))
            .await
            .unwrap();

        let received = server.received_requests().await.unwrap();
        assert_eq!(received.len(), 1);
        assert!(!received[0].headers.contains_key("authorization"));
    }

    #[tokio::test]
    async fn unauthorized_clears_token_and_navigates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user/profile"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"message": "Token expired"})),
            )
            .mount(&server)
            .await;

        let credentials = Arc::new(MemoryCredentialStore::with_token("stale"));
        let (client, mut routes) = client_for(&server, Arc::clone(&credentials));

        let err = client
            .send(ApiRequest::get("/user/profile"))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ApiError::Unauthorized {
                body: Some(json!({"message": "Token expired"}))
            }
        );
        assert_eq!(credentials.get(), None);
        assert_eq!(routes.try_recv().ok(), Some(Route::Login));
    }

    #[tokio::test]
    async fn truncated_unauthorized_body_still_expires_session() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        // Promises more body than it sends, then hangs up
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buffer = [0_u8; 4096];
            socket.read(&mut buffer).await.unwrap();
            socket
                .write_all(b"HTTP/1.1 401 Unauthorized\r\ncontent-length: 64\r\n\r\n{\"mess")
                .await
                .unwrap();
            socket.shutdown().await.unwrap();
        });

        let credentials = Arc::new(MemoryCredentialStore::with_token("stale"));
        let (navigator, mut routes) = ChannelNavigator::channel();
        let config = ApiConfig::default().with_base_url(format!("http://{address}"));
        let client = ApiClient::new(&config, credentials.clone(), Arc::new(navigator)).unwrap();

        let err = client.send(ApiRequest::get("/cart")).await.unwrap_err();
        server.await.unwrap();

        assert!(matches!(err, ApiError::Unauthorized { .. }));
        assert_eq!(credentials.get(), None);
        assert_eq!(routes.try_recv().ok(), Some(Route::Login));
    }

    #[tokio::test]
    async fn server_errors_keep_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/user/register"))
            .respond_with(
                ResponseTemplate::new(409).set_body_json(json!({"message": "Email taken"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/category"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let (client, _routes) = client_for(&server, Arc::new(MemoryCredentialStore::new()));

        let err = client
            .send(ApiRequest::post("/user/register").with_body(json!({})))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ApiError::Server {
                status: 409,
                body: json!({"message": "Email taken"})
            }
        );

        let err = client.send(ApiRequest::get("/category")).await.unwrap_err();
        assert_eq!(
            err,
            ApiError::Server {
                status: 500,
                body: json!("boom")
            }
        );
    }

    #[tokio::test]
    async fn empty_success_body_is_null() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/cart/clear"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let (client, _routes) = client_for(&server, Arc::new(MemoryCredentialStore::new()));
        let body = client.send(ApiRequest::delete("/cart/clear")).await.unwrap();
        assert_eq!(body, Value::Null);
    }

    #[tokio::test]
    async fn slow_responses_time_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cart"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let (navigator, _routes) = ChannelNavigator::channel();
        let config = ApiConfig::default()
            .with_base_url(server.uri())
            .with_timeout(Duration::from_millis(50));
        let client = ApiClient::new(
            &config,
            Arc::new(MemoryCredentialStore::new()),
            Arc::new(navigator),
        )
        .unwrap();

        let err = client.send(ApiRequest::get("/cart")).await.unwrap_err();
        assert_eq!(err, ApiError::Timeout);
    }
}

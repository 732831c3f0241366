#[cfg(test)]
#[path = "client_test.rs"]
mod tests;

use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use reqwest::Method;
use reqwest::RequestBuilder;
use reqwest::Response;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::status_message;
use crate::domain::models::ApiResponse;
use crate::domain::models::NotifiedError;
use crate::domain::models::DEFAULT_ERROR_MESSAGE;
use crate::domain::services::Credentials;
use crate::domain::services::Notifier;

/// Query for endpoints that take no parameters.
pub const NO_QUERY: &[(&str, &str)] = &[];

/// Authenticated access to the lingx REST API. Every failure is surfaced
/// once as an error notification before being returned.
pub struct ApiClient {
    url: String,
    credentials: Credentials,
    notifier: Notifier,
    client: reqwest::Client,
    // No overall timeout, it would cut long running streams short.
    stream_client: reqwest::Client,
}

impl ApiClient {
    pub fn new(
        url: &str,
        timeout_ms: u64,
        credentials: Credentials,
        notifier: Notifier,
    ) -> Result<ApiClient> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()?;
        let stream_client = reqwest::Client::builder().build()?;

        return Ok(ApiClient {
            url: url.trim_end_matches('/').to_string(),
            credentials,
            notifier,
            client,
            stream_client,
        });
    }

    pub fn from_config(credentials: Credentials, notifier: Notifier) -> Result<ApiClient> {
        return ApiClient::new(
            &Config::get(ConfigKey::ApiURL),
            Config::get(ConfigKey::RequestTimeout).parse::<u64>()?,
            credentials,
            notifier,
        );
    }

    pub fn credentials(&self) -> &Credentials {
        return &self.credentials;
    }

    fn request(&self, client: &reqwest::Client, method: Method, path: &str) -> RequestBuilder {
        let mut req = client.request(method, format!("{url}{path}", url = self.url));

        let token = self.credentials.token();
        if !token.is_empty() {
            req = req.header("Authorization", token);
        }

        return req;
    }

    fn fail(&self, text: &str) -> anyhow::Error {
        self.notifier.error(text);
        return anyhow::Error::new(NotifiedError(text.to_string()));
    }

    async fn execute(&self, req: RequestBuilder) -> Result<Response> {
        let res = match req.send().await {
            Ok(res) => res,
            Err(err) => {
                tracing::error!(error = ?err, "Request did not complete");
                if err.is_timeout() {
                    return Err(self.fail(status_message(408)));
                }
                return Err(self.fail(DEFAULT_ERROR_MESSAGE));
            }
        };

        let status = res.status().as_u16();
        if !res.status().is_success() {
            tracing::error!(status, url = %res.url(), "Request failed");
            return Err(self.fail(status_message(status)));
        }

        return Ok(res);
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T> {
        let res = self.execute(req).await?;
        let body = match res.bytes().await {
            Ok(body) => body,
            Err(err) => {
                tracing::error!(error = ?err, "Failed to read response body");
                return Err(self.fail(DEFAULT_ERROR_MESSAGE));
            }
        };

        let envelope = if body.is_empty() {
            ApiResponse::default()
        } else {
            match serde_json::from_slice::<ApiResponse>(&body) {
                Ok(envelope) => envelope,
                Err(err) => {
                    tracing::error!(error = ?err, "Response is not a valid envelope");
                    return Err(self.fail(DEFAULT_ERROR_MESSAGE));
                }
            }
        };

        if !envelope.is_success() {
            tracing::warn!(code = envelope.code, "Request was rejected");
            return Err(self.fail(&envelope.error_message()));
        }

        return Ok(serde_json::from_value::<T>(envelope.data)?);
    }

    pub async fn get<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<T> {
        let req = self.request(&self.client, Method::GET, path).query(query);
        return self.send(req).await;
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let req = self.request(&self.client, Method::POST, path).json(body);
        return self.send(req).await;
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let req = self.request(&self.client, Method::PUT, path).json(body);
        return self.send(req).await;
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let req = self.request(&self.client, Method::PATCH, path).json(body);
        return self.send(req).await;
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let req = self.request(&self.client, Method::DELETE, path);
        return self.send(req).await;
    }

    /// Downloads a raw file body. These endpoints skip the JSON envelope.
    pub async fn get_bytes<Q: Serialize + ?Sized>(&self, path: &str, query: &Q) -> Result<Vec<u8>> {
        let req = self.request(&self.client, Method::GET, path).query(query);
        let res = self.execute(req).await?;

        return Ok(res.bytes().await?.to_vec());
    }

    /// Opens a server-sent events stream. The caller owns reading the body.
    pub async fn post_stream<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Response> {
        let req = self
            .request(&self.stream_client, Method::POST, path)
            .header("Accept", "text/event-stream")
            .json(body);

        return self.execute(req).await;
    }

    pub fn ensure_authenticated(&self) -> Result<()> {
        if !self.credentials.is_authenticated() {
            bail!("Not logged in. Run `lingx login` first.");
        }

        return Ok(());
    }
}

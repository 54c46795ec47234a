use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::error::HttpError;

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Transport seam used by every resource operation.
///
/// Paths are relative to the API root; the implementation decides how the
/// root is resolved and how requests are authenticated. Each call is a single
/// request/response round trip.
#[allow(async_fn_in_trait)]
pub trait HttpClient {
    /// GET `path` with `query` serialized into the query string.
    /// Pass `&()` when there are no parameters.
    async fn get<T, Q>(&self, path: &str, query: &Q) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized;

    /// POST `body` as JSON to `path`.
    async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized;

    /// POST that creates a resource in the collection at `path`.
    async fn create<T, B>(&self, path: &str, body: &B) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.post(path, body).await
    }

    /// DELETE the resource at `path`. Any response body is discarded.
    async fn delete(&self, path: &str) -> Result<(), HttpError>;
}

/// [`HttpClient`] over `reqwest`, authenticating with a bearer token.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    access_token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, access_token: Option<String>) -> Result<Self, HttpError> {
        Self::with_timeouts(base_url, access_token, DEFAULT_CONNECT_TIMEOUT, DEFAULT_TIMEOUT)
    }

    pub fn with_timeouts(
        base_url: impl Into<String>,
        access_token: Option<String>,
        connect_timeout: Duration,
        timeout: Duration,
    ) -> Result<Self, HttpError> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            access_token: access_token.filter(|t| !t.is_empty()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Joins `path` onto the base URL; a leading `/` on `path` is ignored.
    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match &self.access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Sends the request and returns the body of a successful response.
    async fn send(&self, method: Method, path: &str, builder: RequestBuilder) -> Result<Vec<u8>, HttpError> {
        let response = builder.send().await?;
        let status = response.status();
        debug!(%method, path, status = status.as_u16(), "api response");

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!(%method, path, status = status.as_u16(), "api request failed");
            return Err(HttpError::from_status(status.as_u16(), path, message));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

impl HttpClient for ApiClient {
    async fn get<T, Q>(&self, path: &str, query: &Q) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let pairs = query_pairs(&serde_json::to_value(query)?);
        let builder = self.request(Method::GET, path).query(&pairs);
        let body = self.send(Method::GET, path, builder).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let builder = self.request(Method::POST, path).json(body);
        let body = self.send(Method::POST, path, builder).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn delete(&self, path: &str) -> Result<(), HttpError> {
        let builder = self.request(Method::DELETE, path);
        self.send(Method::DELETE, path, builder).await?;
        Ok(())
    }
}

/// Flattens a serialized query object into `key=value` pairs.
///
/// Nulls are dropped, arrays repeat the key, and nested objects are sent as
/// their JSON text.
fn query_pairs(value: &Value) -> Vec<(String, String)> {
    let Value::Object(map) = value else {
        return Vec::new();
    };
    let mut pairs = Vec::new();
    for (key, value) in map {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                for item in items {
                    pairs.push((key.clone(), scalar(item)));
                }
            }
            other => pairs.push((key.clone(), scalar(other))),
        }
    }
    pairs
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

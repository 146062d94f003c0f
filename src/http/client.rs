use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use url::Url;
use uuid::Uuid;

use super::cancel::CancelToken;
use crate::api::pagination::PageRequest;
use crate::config::ApiConfig;
use crate::error::{ClientError, ClientResult};

/// A single request against the workbench API, relative to the base URL
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// `offset` carries the page number, not a row offset
    pub fn page(self, page: PageRequest) -> Self {
        self.query("limit", page.limit).query("offset", page.page)
    }

    pub fn json<B: Serialize>(mut self, body: &B) -> ClientResult<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }
}

/// Thin wrapper over reqwest: bearer auth, JSON headers, error mapping
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: Url,
    log_requests: bool,
}

impl HttpClient {
    pub fn new(base_url: &str, timeout: Duration) -> ClientResult<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| ClientError::Config(format!("invalid API URL '{}': {}", base_url, e)))?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("workbench-client/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url,
            log_requests: false,
        })
    }

    pub fn from_config(config: &ApiConfig) -> ClientResult<Self> {
        let mut client = Self::new(&config.base_url, config.timeout())?;
        client.log_requests = config.enable_request_logging;
        Ok(client)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint_url(&self, request: &ApiRequest) -> ClientResult<Url> {
        // Plain concatenation keeps any path prefix on the base URL (Url::join would drop it)
        let raw = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            request.path.trim_start_matches('/')
        );
        let mut url = Url::parse(&raw)
            .map_err(|e| ClientError::Config(format!("invalid endpoint '{}': {}", request.path, e)))?;

        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(request.query.iter());
        }
        Ok(url)
    }

    /// Send a request and decode the JSON response into `T`. An empty body
    /// decodes as JSON `null`, so `()` and `Value` work for 204 responses.
    pub async fn send<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
        bearer: Option<&str>,
        cancel: &CancelToken,
    ) -> ClientResult<T> {
        let url = self.endpoint_url(&request)?;
        let request_id = Uuid::new_v4();

        let mut builder = self
            .client
            .request(request.method.clone(), url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .header("X-Request-Id", request_id.to_string());

        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let log_requests = self.log_requests;
        cancel
            .run(async move {
                let response = builder.send().await?;
                let status = response.status();
                let text = response.text().await?;

                if log_requests {
                    tracing::debug!(
                        %request_id,
                        method = %request.method,
                        path = %request.path,
                        status = status.as_u16(),
                        "workbench api request"
                    );
                }

                if !status.is_success() {
                    return Err(ClientError::from_response(status.as_u16(), &text));
                }
                decode_body(&text)
            })
            .await
    }
}

fn decode_body<T: DeserializeOwned>(text: &str) -> ClientResult<T> {
    let text = if text.trim().is_empty() { "null" } else { text };
    Ok(serde_json::from_str(text)?)
}

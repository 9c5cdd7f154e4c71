//! HTTP client for sending filters to a server.

use crate::config::{ClientConfig, HttpMethod};
use crate::encoder::{build_filter_url, encode_filter_body, DEFAULT_PARAM};
use crate::error::{ConfigError, TransportError};
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use serde_json::Value;
use sieve_core::FilterRoot;
use std::time::Duration;

/// Where and how one filter request goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterRequest {
    pub url: String,
    pub method: HttpMethod,
    /// Query parameter name; ignored for POST.
    pub param: String,
}

impl FilterRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: HttpMethod::Get,
            param: DEFAULT_PARAM.to_string(),
        }
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: HttpMethod::Post,
            param: DEFAULT_PARAM.to_string(),
        }
    }

    pub fn with_param(mut self, param: impl Into<String>) -> Self {
        self.param = param.into();
        self
    }
}

impl From<&ClientConfig> for FilterRequest {
    fn from(config: &ClientConfig) -> Self {
        Self {
            url: config.base_url.clone(),
            method: config.method,
            param: config.query_param_name.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FilterClient {
    client: reqwest::Client,
    headers: HeaderMap,
}

impl FilterClient {
    /// Client with no extra headers and no timeout.
    pub fn try_new() -> Result<Self, ConfigError> {
        Ok(Self {
            client: reqwest::Client::builder().build()?,
            headers: HeaderMap::new(),
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout_ms) = config.request_timeout_ms {
            builder = builder.timeout(Duration::from_millis(timeout_ms));
        }
        Ok(Self {
            client: builder.build()?,
            headers: config.header_map()?,
        })
    }

    /// Build the request without sending it.
    pub fn build_request(
        &self,
        root: &FilterRoot,
        request: &FilterRequest,
    ) -> Result<reqwest::Request, TransportError> {
        let builder = match request.method {
            HttpMethod::Get => self
                .client
                .get(build_filter_url(root, &request.url, &request.param)),
            HttpMethod::Post => self
                .client
                .post(&request.url)
                .header(CONTENT_TYPE, "application/json")
                .body(encode_filter_body(root)),
        };
        Ok(builder.headers(self.headers.clone()).build()?)
    }

    /// Send one filter request and parse the JSON response.
    ///
    /// An empty success body parses as `null`. No retries.
    pub async fn send(
        &self,
        root: &FilterRoot,
        request: &FilterRequest,
    ) -> Result<Value, TransportError> {
        let built = self.build_request(root, request)?;
        tracing::debug!(method = %request.method, url = %built.url(), "Sending filter request");

        let response = self.client.execute(built).await.map_err(|err| {
            tracing::warn!(url = %request.url, error = %err, "Filter request failed");
            TransportError::from(err)
        })?;
        parse_response(response).await
    }
}

async fn parse_response(response: reqwest::Response) -> Result<Value, TransportError> {
    let status = response.status();
    let text = response.text().await?;
    if !status.is_success() {
        tracing::warn!(status = status.as_u16(), "Filter request rejected");
        return Err(TransportError::Status {
            status: status.as_u16(),
            body: text,
        });
    }
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&text)?)
}

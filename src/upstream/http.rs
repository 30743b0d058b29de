//! HTTP range store speaking a spreadsheet "values" API:
//! `GET {base}/values/{range}` and `PUT {base}/values/{range}`, both with a
//! `{"values": [[...], ...]}` body.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};

use super::{RangeStoreError, RemoteRangeStore, Rows};

/// Connection settings for [`HttpRangeStore`].
#[derive(Debug, Clone)]
pub struct HttpRangeStoreConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout: Duration,
}

impl HttpRangeStoreConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug)]
pub struct HttpRangeStore {
    base_url: Url,
    token: Option<String>,
    http_client: reqwest::Client,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Rows,
}

#[derive(Serialize)]
struct ValueRangeRef<'a> {
    values: &'a Rows,
}

impl HttpRangeStore {
    pub fn new(config: HttpRangeStoreConfig) -> Result<Self, RangeStoreError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| RangeStoreError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(RangeStoreError::InvalidUrl(config.base_url));
        }

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RangeStoreError::Network(e.to_string()))?;

        Ok(Self {
            base_url,
            token: config.token,
            http_client,
        })
    }

    /// `{base}/values/{range}` with the range percent-encoded as one segment.
    fn range_url(&self, range: &str) -> Result<Url, RangeStoreError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| RangeStoreError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push("values")
            .push(range);
        Ok(url)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn check_status(
        range: &str,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, RangeStoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RangeStoreError::Unauthorized,
            StatusCode::NOT_FOUND => RangeStoreError::NotFound(range.to_string()),
            StatusCode::TOO_MANY_REQUESTS => RangeStoreError::RateLimited,
            _ => RangeStoreError::Upstream {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            },
        })
    }
}

#[async_trait]
impl RemoteRangeStore for HttpRangeStore {
    async fn fetch(&self, range: &str) -> Result<Rows, RangeStoreError> {
        let url = self.range_url(range)?;

        let response = self
            .authorize(self.http_client.get(url))
            .send()
            .await
            .map_err(|e| RangeStoreError::Network(e.to_string()))?;
        let response = Self::check_status(range, response).await?;

        let body: ValueRange = response
            .json()
            .await
            .map_err(|e| RangeStoreError::Decode(e.to_string()))?;

        Ok(body.values)
    }

    async fn write(&self, range: &str, rows: Rows) -> Result<(), RangeStoreError> {
        let url = self.range_url(range)?;

        let response = self
            .authorize(self.http_client.put(url))
            .json(&ValueRangeRef { values: &rows })
            .send()
            .await
            .map_err(|e| RangeStoreError::Network(e.to_string()))?;
        Self::check_status(range, response).await?;

        Ok(())
    }

    fn store_name(&self) -> &'static str {
        "http"
    }
}

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;

use crate::error::HttpError;

/// Accept header for metadata requests.
pub const ACCEPT_JSON: &str = "application/json";

/// Accept header for image requests.
pub const ACCEPT_IMAGE: &str = "image/*";

/// A fully buffered response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
  pub status: u16,
  pub headers: BTreeMap<String, String>,
  pub body: Bytes,
}

impl FetchResponse {
  pub fn new(status: u16, headers: BTreeMap<String, String>, body: impl Into<Bytes>) -> Self {
    Self {
      status,
      headers,
      body: body.into(),
    }
  }

  /// Whether the status is in the 2xx range.
  pub fn is_success(&self) -> bool {
    (200..300).contains(&self.status)
  }

  /// Decode the body as JSON.
  pub fn json<T: DeserializeOwned>(&self) -> Result<T, HttpError> {
    Ok(serde_json::from_slice(&self.body)?)
  }
}

/// Capability to GET a remote resource.
#[async_trait]
pub trait Fetcher: Send + Sync {
  /// Issue a GET with the given `Accept` header and buffer the response.
  async fn get(&self, url: &str, accept: &str) -> Result<FetchResponse, HttpError>;
}

/// Options for [`ReqwestFetcher`].
#[derive(Debug, Clone)]
pub struct FetcherOptions {
  pub timeout: Duration,
  pub user_agent: String,
}

impl Default for FetcherOptions {
  fn default() -> Self {
    Self {
      timeout: Duration::from_secs(30),
      user_agent: format!("vitrine/{}", env!("CARGO_PKG_VERSION")),
    }
  }
}

/// [`Fetcher`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
  client: Client,
}

impl ReqwestFetcher {
  pub fn new() -> Result<Self, HttpError> {
    Self::with_options(FetcherOptions::default())
  }

  pub fn with_options(options: FetcherOptions) -> Result<Self, HttpError> {
    let client = Client::builder()
      .timeout(options.timeout)
      .user_agent(options.user_agent)
      .build()?;
    Ok(Self { client })
  }
}

#[async_trait]
impl Fetcher for ReqwestFetcher {
  async fn get(&self, url: &str, accept: &str) -> Result<FetchResponse, HttpError> {
    let parsed = url::Url::parse(url).map_err(|source| HttpError::InvalidUrl {
      url: url.to_string(),
      source,
    })?;

    let response = self
      .client
      .get(parsed)
      .header(ACCEPT, accept)
      .send()
      .await?;

    let status = response.status().as_u16();
    let headers: BTreeMap<String, String> = response
      .headers()
      .iter()
      .filter_map(|(k, v)| {
        v.to_str()
          .ok()
          .map(|val| (k.as_str().to_string(), val.to_string()))
      })
      .collect();

    let body = response.bytes().await?;

    Ok(FetchResponse {
      status,
      headers,
      body,
    })
  }
}

use thiserror::Error;

/// Errors that can occur while fetching a remote resource.
#[derive(Debug, Error)]
pub enum HttpError {
  /// The URL could not be parsed.
  #[error("invalid url '{url}': {source}")]
  InvalidUrl {
    url: String,
    #[source]
    source: url::ParseError,
  },

  /// The request failed before a response arrived.
  #[error("http error: {0}")]
  Request(#[from] reqwest::Error),

  /// The response body was not the expected JSON.
  #[error("failed to decode response body: {0}")]
  Decode(#[from] serde_json::Error),
}

use vitrine_http::HttpError;

/// Errors from building a provider registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
  #[error("a registry needs at least one provider")]
  Empty,

  #[error("provider '{name}' registered twice")]
  Duplicate { name: String },
}

/// Failures inside a provider operation. Logged, never returned.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ProviderError {
  #[error("request failed: {0}")]
  Http(#[from] HttpError),

  #[error("'{url}' returned status {status}")]
  Status { url: String, status: u16 },
}

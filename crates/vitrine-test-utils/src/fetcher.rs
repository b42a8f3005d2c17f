use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use vitrine_http::{FetchResponse, Fetcher, HttpError};

/// A canned response for one URL.
#[derive(Debug, Clone)]
pub struct Route {
  pub status: u16,
  pub content_type: String,
  pub body: Bytes,
}

impl Route {
  /// `200` with a JSON body.
  pub fn json(value: &serde_json::Value) -> Self {
    Self {
      status: 200,
      content_type: "application/json".to_string(),
      body: Bytes::from(value.to_string()),
    }
  }

  /// `200` with an image body.
  pub fn image(bytes: &[u8]) -> Self {
    Self {
      status: 200,
      content_type: "image/jpeg".to_string(),
      body: Bytes::copy_from_slice(bytes),
    }
  }

  /// `200` with a body that is not valid JSON.
  pub fn garbage() -> Self {
    Self {
      status: 200,
      content_type: "text/html".to_string(),
      body: Bytes::from_static(b"<html>oops</html>"),
    }
  }

  /// An empty response with the given status.
  pub fn status(status: u16) -> Self {
    Self {
      status,
      content_type: "text/plain".to_string(),
      body: Bytes::new(),
    }
  }
}

#[derive(Default)]
struct Script {
  routes: HashMap<String, Route>,
  hits: HashMap<String, usize>,
}

/// [`Fetcher`] that answers from a routing table and counts every request.
///
/// Unrouted URLs answer `404`. Routes can be changed while the fetcher is
/// shared, so a test can flip an endpoint from `403` to `200` mid-run.
#[derive(Default)]
pub struct ScriptedFetcher {
  script: Mutex<Script>,
  latency: Option<Duration>,
}

impl ScriptedFetcher {
  pub fn new() -> Self {
    Self::default()
  }

  /// Delay every response, so concurrent callers overlap.
  pub fn with_latency(mut self, latency: Duration) -> Self {
    self.latency = Some(latency);
    self
  }

  /// Set (or replace) the response for `url`.
  pub fn route(&self, url: impl Into<String>, route: Route) -> &Self {
    self.lock().routes.insert(url.into(), route);
    self
  }

  /// Number of requests made for `url`.
  pub fn fetch_count(&self, url: &str) -> usize {
    self.lock().hits.get(url).copied().unwrap_or(0)
  }

  /// Number of requests made for any URL.
  pub fn total_fetches(&self) -> usize {
    self.lock().hits.values().sum()
  }

  fn lock(&self) -> MutexGuard<'_, Script> {
    self.script.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
  async fn get(&self, url: &str, _accept: &str) -> Result<FetchResponse, HttpError> {
    let route = {
      let mut script = self.lock();
      *script.hits.entry(url.to_string()).or_default() += 1;
      script.routes.get(url).cloned()
    };

    if let Some(latency) = self.latency {
      tokio::time::sleep(latency).await;
    }

    let route = route.unwrap_or_else(|| Route::status(404));
    let mut headers = BTreeMap::new();
    headers.insert("content-type".to_string(), route.content_type);
    Ok(FetchResponse::new(route.status, headers, route.body))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use vitrine_http::ACCEPT_JSON;

  #[tokio::test]
  async fn test_routes_and_counts() {
    let fetcher = ScriptedFetcher::new();
    fetcher.route("https://a", Route::json(&serde_json::json!([1, 2])));

    let response = fetcher.get("https://a", ACCEPT_JSON).await.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.json::<Vec<u32>>().unwrap(), vec![1, 2]);

    let missing = fetcher.get("https://b", ACCEPT_JSON).await.unwrap();
    assert_eq!(missing.status, 404);

    fetcher.get("https://a", ACCEPT_JSON).await.unwrap();
    assert_eq!(fetcher.fetch_count("https://a"), 2);
    assert_eq!(fetcher.fetch_count("https://b"), 1);
    assert_eq!(fetcher.total_fetches(), 3);
  }
}

//! Remote fetch capability.
//!
//! Providers never talk to `reqwest` directly; they hold an
//! `Arc<dyn Fetcher>`. Production wiring uses [`ReqwestFetcher`], tests swap
//! in a scripted fetcher that counts requests.
//!
//! A non-2xx status is a normal [`FetchResponse`], not an error. Callers
//! decide what a status means (the museum API, for one, signals rate
//! limiting with `403`).

mod error;
mod fetcher;

pub use error::HttpError;
pub use fetcher::{
  ACCEPT_IMAGE, ACCEPT_JSON, FetchResponse, Fetcher, FetcherOptions, ReqwestFetcher,
};

//! Vitrine Store
//!
//! Storage collaborators for the vitrine core. Two independent stores live
//! here:
//!
//! - [`KvStore`] is the durable key-value store. Values are pre-serialized
//!   strings and the store never interprets them.
//! - [`BlobStore`] holds raw image responses, partitioned into namespaces.
//!   A [`Namespace`] handle scopes reads and writes to one partition.
//!
//! Both come with an in-memory implementation (tests, ephemeral runs) and a
//! filesystem implementation rooted in the vitrine data directory.

mod blob;
mod error;
mod fs;
mod kv;

pub use blob::{BlobStore, InMemoryBlobStore, Namespace, StoredResponse};
pub use error::StoreError;
pub use fs::{FsBlobStore, FsKvStore};
pub use kv::{InMemoryKvStore, KvStore};

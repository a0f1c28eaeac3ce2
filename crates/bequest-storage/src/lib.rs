//! Bequest Storage
//!
//! Permanent-storage access for the claim pipeline:
//!
//! - [`locator`]: the fixed ordered list of textual encodings of the on-chain
//!   32-byte storage locator
//! - [`gateway`]: HTTP gateway client (metadata probe + payload download)
//!   behind the [`Gateway`] trait
//! - [`resolve`]: ordered-fallback resolution and retrieval

pub mod gateway;
pub mod locator;
pub mod resolve;

pub use gateway::{Gateway, GatewayError, HttpGateway, TxMetadata, DEFAULT_GATEWAY};
pub use locator::LocatorEncoding;
pub use resolve::{fetch, resolve_and_fetch, ResolvedLocator, RetrievedAsset, StorageError};

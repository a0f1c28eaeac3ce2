//! Bequest Claim Pipeline
//!
//! Claim verification and two-layer decryption for inheritance records:
//! confirm on-chain claimability, resolve the storage locator, recover the
//! per-asset symmetric key (ECDH + HKDF + AES-GCM over the published blob
//! layout), download and decrypt the asset, and write it out once.
//!
//! The pipeline is a pure async function over injected collaborators
//! ([`ChainReader`], [`KeyService`], [`Gateway`]); a concurrent host may run
//! independent claims in parallel, but a single claim has no internal
//! concurrency and shares no key material with any other.
//!
//! # Example
//!
//! ```ignore
//! use bequest_claim::{claim, ClaimRequest, HttpKeyService};
//! use bequest_chain::{default_endpoints, ChainClient};
//! use bequest_storage::HttpGateway;
//!
//! let chain = ChainClient::new(default_endpoints(network), contract, network)?;
//! let keys = HttpKeyService::new("https://keys.example.org");
//! let gateway = HttpGateway::new(bequest_storage::DEFAULT_GATEWAY);
//!
//! let receipt = claim(&chain, &keys, &gateway, &secret_key, &request).await?;
//! println!("wrote {} bytes to {}", receipt.bytes_written, receipt.path.display());
//! ```

pub mod error;
pub mod gate;
pub mod keyservice;
pub mod persist;
pub mod pipeline;

pub use error::ClaimError;
pub use gate::{check_claimable, ChainReader};
pub use keyservice::{HttpKeyService, KeyService, KeyServiceError};
pub use pipeline::{claim, recover_key_only, ClaimReceipt, ClaimRequest};

// Re-exported so callers of the pipeline don't need direct storage/chain deps
pub use bequest_storage::Gateway;

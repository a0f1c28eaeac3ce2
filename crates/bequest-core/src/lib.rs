//! Bequest Core
//!
//! Shared types and the cryptographic half of the claim pipeline:
//!
//! - **Types**: inheritance IDs, chain addresses, networks, record lifecycle
//! - **ECIES key recovery**: secp256k1 ECDH + HKDF-SHA256 + AES-256-GCM over
//!   a fixed-layout encrypted key blob
//! - **Asset encryption**: AES-256-GCM with a nonce-prefix / tag-suffix layout
//!
//! Everything here is a pure transform over byte inputs; no network or disk
//! access. The recovered symmetric key only ever lives in memory and is
//! zeroized on drop.

pub mod asset;
pub mod ecies;
pub mod types;

pub use asset::{decrypt_asset, seal_asset, AssetCryptError};
pub use ecies::{recover_symmetric_key, seal_symmetric_key, EciesError, EncryptedKeyBlob};
pub use types::{Address, InheritanceId, InheritanceRecord, Network, RecordState, SymmetricKey};

// Re-export so downstream crates agree on the curve implementation
pub use secp256k1;

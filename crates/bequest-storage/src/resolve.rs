//! Ordered-fallback locator resolution and asset retrieval.
//!
//! Each encoding in [`LocatorEncoding::ORDER`] is probed at most once.
//! Resolution ([`resolve`]) stops at the first encoding whose existence probe
//! succeeds. Retrieval ([`fetch`]) downloads the resolved id and, if the
//! download fails, falls through to the encodings *after* it in the order —
//! the ones before it already failed their probe and are never repeated.

use thiserror::Error;

use crate::gateway::{Gateway, TxMetadata};
use crate::locator::LocatorEncoding;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage locator unresolvable: no encoding passed the existence probe")]
    LocatorUnresolvable,

    #[error("Asset unavailable: every resolvable encoding failed to download")]
    AssetUnavailable,
}

/// A locator that passed the existence probe under one encoding.
#[derive(Debug, Clone)]
pub struct ResolvedLocator {
    pub encoding: LocatorEncoding,
    pub tx_id: String,
    pub metadata: TxMetadata,
}

/// A fully retrieved (still encrypted) asset payload.
#[derive(Debug, Clone)]
pub struct RetrievedAsset {
    pub encoding: LocatorEncoding,
    pub tx_id: String,
    pub bytes: Vec<u8>,
    /// Extension inferred from the Content-Type tag.
    pub extension: String,
}

/// Probe the encodings in order; the first that resolves wins.
pub async fn resolve<G: Gateway + ?Sized>(
    gateway: &G,
    locator: &[u8; 32],
) -> Result<ResolvedLocator, StorageError> {
    for encoding in LocatorEncoding::ORDER {
        let tx_id = encoding.encode(locator);
        match gateway.probe(&tx_id).await {
            Ok(metadata) => {
                tracing::info!(%encoding, tx_id, "locator resolved");
                return Ok(ResolvedLocator {
                    encoding,
                    tx_id,
                    metadata,
                });
            }
            Err(e) => {
                tracing::debug!(%encoding, tx_id, error = %e, "probe failed");
            }
        }
    }
    Err(StorageError::LocatorUnresolvable)
}

/// Download the asset for a resolved locator.
///
/// Tries the resolved id first. On download failure, continues with the
/// encodings after it in [`LocatorEncoding::ORDER`] (probe, then download),
/// sharing the resolver's failure path without repeating an encoding.
pub async fn fetch<G: Gateway + ?Sized>(
    gateway: &G,
    locator: &[u8; 32],
    resolved: &ResolvedLocator,
) -> Result<RetrievedAsset, StorageError> {
    let start = LocatorEncoding::ORDER
        .iter()
        .position(|&e| e == resolved.encoding)
        .unwrap_or(0);

    for &encoding in &LocatorEncoding::ORDER[start..] {
        let (tx_id, metadata) = if encoding == resolved.encoding {
            (resolved.tx_id.clone(), resolved.metadata.clone())
        } else {
            let tx_id = encoding.encode(locator);
            match gateway.probe(&tx_id).await {
                Ok(metadata) => (tx_id, metadata),
                Err(e) => {
                    tracing::debug!(%encoding, tx_id, error = %e, "probe failed");
                    continue;
                }
            }
        };

        match gateway.download(&tx_id).await {
            Ok(bytes) => {
                tracing::info!(%encoding, tx_id, size = bytes.len(), "asset downloaded");
                return Ok(RetrievedAsset {
                    encoding,
                    tx_id,
                    bytes,
                    extension: metadata.extension(),
                });
            }
            Err(e) => {
                tracing::warn!(%encoding, tx_id, error = %e, "download failed, trying next encoding");
            }
        }
    }

    Err(StorageError::AssetUnavailable)
}

/// Resolve and download in one pass.
pub async fn resolve_and_fetch<G: Gateway + ?Sized>(
    gateway: &G,
    locator: &[u8; 32],
) -> Result<RetrievedAsset, StorageError> {
    let resolved = resolve(gateway, locator).await?;
    fetch(gateway, locator, &resolved).await
}

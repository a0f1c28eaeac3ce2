//! The claim pipeline: a pure async function from claim parameters to a
//! decrypted, persisted asset.
//!
//! Stage order is fixed and strictly sequential; each stage's output is a
//! precondition for the next:
//!
//! ```text
//! ClaimGate -> LocatorResolver -> SymmetricKeyRecovery -> AssetRetrieval
//!           -> AssetDecryption -> persist
//! ```
//!
//! No stage retries another's failure. Cryptographic failures are never
//! retried at all — re-running an authentication failure with the same
//! inputs cannot succeed. Network retry lives inside the chain client
//! (endpoint rotation) and the storage layer (encoding fallback), both
//! bounded.

use bequest_core::secp256k1::SecretKey;
use bequest_core::types::{Address, InheritanceId, Network};
use bequest_core::{decrypt_asset, recover_symmetric_key, EncryptedKeyBlob};
use bequest_storage::{resolve, Gateway};
use std::path::PathBuf;

use crate::error::ClaimError;
use crate::gate::{check_claimable, ChainReader};
use crate::keyservice::KeyService;
use crate::persist::write_asset;

/// Parameters for one claim. The beneficiary secret key is passed separately
/// so this struct stays loggable.
#[derive(Debug, Clone)]
pub struct ClaimRequest {
    pub inheritance_id: InheritanceId,
    pub network: Network,
    /// The caller's on-chain identity, checked against the record.
    pub caller: Address,
    /// Proceed past a beneficiary-identity mismatch (still warned).
    pub override_identity: bool,
    /// Directory the decrypted asset is written into.
    pub output_dir: PathBuf,
}

/// Outcome of a successful claim.
#[derive(Debug, Clone)]
pub struct ClaimReceipt {
    /// Where the decrypted asset was written.
    pub path: PathBuf,
    pub bytes_written: u64,
    pub extension: String,
    /// Which locator encoding resolved on the storage network.
    pub encoding: bequest_storage::LocatorEncoding,
    pub tx_id: String,
}

/// Run one claim end to end.
///
/// Holds the recovered symmetric key in memory only between key recovery and
/// asset decryption; it is zeroized on drop. Fails closed at the first
/// terminal error with no partial output.
pub async fn claim<C, K, G>(
    chain: &C,
    keys: &K,
    gateway: &G,
    secret: &SecretKey,
    request: &ClaimRequest,
) -> Result<ClaimReceipt, ClaimError>
where
    C: ChainReader + ?Sized,
    K: KeyService + ?Sized,
    G: Gateway + ?Sized,
{
    tracing::info!(
        id = %request.inheritance_id,
        network = %request.network,
        "starting claim"
    );

    // 1. Gate: on-chain state and identity
    let record = check_claimable(
        chain,
        &request.inheritance_id,
        request.caller,
        request.override_identity,
    )
    .await?;

    // 2. Resolve the storage locator (existence probe only)
    let resolved = resolve::resolve(gateway, &record.storage_locator).await?;

    // 3. Recover the asset symmetric key from the distribution service
    let blob_bytes = keys
        .fetch_encrypted_key(&request.inheritance_id, request.network)
        .await?
        .ok_or(ClaimError::KeyNotFound)?;
    let blob = EncryptedKeyBlob::from_bytes(&blob_bytes)?;
    let symmetric_key = recover_symmetric_key(&blob, secret)?;

    // 4. Download the ciphertext, resuming the encoding fallback if needed
    let asset = resolve::fetch(gateway, &record.storage_locator, &resolved).await?;

    // 5. Authenticate-and-decrypt the payload
    let plaintext = decrypt_asset(&asset.bytes, &symmetric_key)?;

    // 6. Persist: the pipeline's only side effect
    let (path, bytes_written) = write_asset(
        &request.output_dir,
        &request.inheritance_id,
        &asset.extension,
        &plaintext,
    )?;

    Ok(ClaimReceipt {
        path,
        bytes_written,
        extension: asset.extension,
        encoding: asset.encoding,
        tx_id: asset.tx_id,
    })
}

/// Recover just the symmetric key for a record, without touching storage.
///
/// Used by tooling that wants to verify key material ahead of the full
/// claim. Same gate and recovery semantics as [`claim`].
pub async fn recover_key_only<C, K>(
    chain: &C,
    keys: &K,
    secret: &SecretKey,
    request: &ClaimRequest,
) -> Result<bequest_core::SymmetricKey, ClaimError>
where
    C: ChainReader + ?Sized,
    K: KeyService + ?Sized,
{
    check_claimable(
        chain,
        &request.inheritance_id,
        request.caller,
        request.override_identity,
    )
    .await?;

    let blob_bytes = keys
        .fetch_encrypted_key(&request.inheritance_id, request.network)
        .await?
        .ok_or(ClaimError::KeyNotFound)?;
    let blob = EncryptedKeyBlob::from_bytes(&blob_bytes)?;
    Ok(recover_symmetric_key(&blob, secret)?)
}
